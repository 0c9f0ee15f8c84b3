use serde::Serialize;

use crate::portfolio::cumulative_gains::CumulativeCapitalGains;
use crate::portfolio::summary::PortfolioSummary;
use crate::portfolio::AcbResult;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSecurityReport<'a> {
    pub security: &'a str,
    #[serde(flatten)]
    pub acb: &'a AcbResult,
}

/// The raw engine results, for consumption by other programs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub securities: Vec<JsonSecurityReport<'a>>,
    pub aggregate_gains: Vec<&'a CumulativeCapitalGains>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_summary: Option<&'a PortfolioSummary>,
}

pub fn write_json_report(
    report: &JsonReport,
    w: &mut dyn std::io::Write,
) -> Result<(), super::model::Error> {
    serde_json::to_writer_pretty(&mut *w, report).map_err(|e| e.to_string())?;
    writeln!(w).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use crate::portfolio::model::tx::testlib::{buy, tx_default};
    use crate::portfolio::{compute_acb, Currency, Tx};

    use super::{write_json_report, JsonReport, JsonSecurityReport};

    #[test]
    fn test_write_json_report() {
        let txs = vec![Tx { action_specifics: buy(2.0, 1000, 0), ..tx_default() }];
        let acb = compute_acb(&txs, &Currency::usd());
        let report = JsonReport {
            securities: vec![JsonSecurityReport { security: "FOO", acb: &acb }],
            aggregate_gains: vec![],
            portfolio_summary: None,
        };

        let mut out = Vec::<u8>::new();
        write_json_report(&report, &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["securities"][0]["security"], "FOO");
        assert_eq!(v["securities"][0]["totalShares"], 2.0);
        assert_eq!(v["securities"][0]["costBasePerShareCents"], 500.0);
        assert_eq!(v["securities"][0]["currency"], "USD");
        assert!(v["securities"][0]["capitalGains"].as_array().unwrap().is_empty());
        assert!(v.get("portfolioSummary").is_none());
    }
}
