use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::bookkeeping::{AcbResult, SecuritySummary};
use super::{CapitalGain, Currency, Security, SecurityLedger, Tx, TxId};

/// A Tx paired with the gain it realized, if it was a sale.
#[derive(PartialEq, Clone, Debug)]
pub struct AnnotatedTx<'a> {
    pub tx: &'a Tx,
    pub capital_gain: Option<&'a CapitalGain>,
}

/// Joins the gains in `acb` back onto `txs` by transaction id.
pub fn annotate_txs<'a>(txs: &'a [Tx], acb: &'a AcbResult) -> Vec<AnnotatedTx<'a>> {
    let gains_by_id: HashMap<&TxId, &CapitalGain> = acb
        .capital_gains
        .iter()
        .map(|g| (&g.transaction_id, g))
        .collect();

    txs.iter()
        .map(|tx| AnnotatedTx {
            tx,
            capital_gain: gains_by_id.get(&tx.id).copied(),
        })
        .collect()
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSecuritySummary {
    pub security: Security,
    pub currency: Currency,
    pub summary: SecuritySummary,
}

#[derive(PartialEq, Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    // Sorted by security
    pub securities: Vec<PortfolioSecuritySummary>,
    // Amounts in different currencies are never combined.
    pub total_cost_base_by_currency: BTreeMap<Currency, f64>,
}

pub fn summarize_portfolio(ledgers: &[SecurityLedger]) -> PortfolioSummary {
    let mut securities: Vec<PortfolioSecuritySummary> = ledgers
        .iter()
        .map(|l| PortfolioSecuritySummary {
            security: l.security().to_string(),
            currency: l.currency().clone(),
            summary: l.summary(),
        })
        .collect();
    securities.sort_by(|a, b| a.security.cmp(&b.security));

    let mut total_cost_base_by_currency = BTreeMap::<Currency, f64>::new();
    for s in &securities {
        *total_cost_base_by_currency
            .entry(s.currency.clone())
            .or_insert(0.0) += s.summary.total_cost_base;
    }

    PortfolioSummary {
        securities,
        total_cost_base_by_currency,
    }
}

#[cfg(test)]
mod tests {
    use crate::portfolio::model::tx::testlib::{buy, sell, tx_default};
    use crate::portfolio::{Currency, SecurityLedger, Tx};

    use super::{annotate_txs, summarize_portfolio};

    fn ledger(sec: &str, curr: &str, specs: Vec<crate::portfolio::TxActionSpecifics>)
        -> SecurityLedger {
        let mut l = SecurityLedger::new(sec, curr).unwrap();
        for (i, s) in specs.into_iter().enumerate() {
            l.append(Tx {
                id: format!("{}", i).as_str().into(),
                security: sec.to_string(),
                action_specifics: s,
                ..tx_default()
            }).unwrap();
        }
        l
    }

    #[test]
    fn test_annotate_txs() {
        let l = ledger("FOO", "CAD", vec![
            buy(10.0, 1000, 0), sell(5.0, 800, 0), sell(1.0, 100, 0)]);
        let acb = l.compute_acb();
        let annotated = annotate_txs(l.ordered_txs(), &acb);
        assert_eq!(annotated.len(), 3);
        assert!(annotated[0].capital_gain.is_none());
        assert_eq!(annotated[1].capital_gain.unwrap().gain_or_loss, 300.0);
        assert_eq!(annotated[2].capital_gain.unwrap().gain_or_loss, 0.0);
        assert_eq!(annotated[2].tx.id.as_str(), "2");
    }

    #[test]
    fn test_summarize_portfolio() {
        let ledgers = vec![
            ledger("ZZZ", "USD", vec![buy(1.0, 500, 0)]),
            ledger("AAA", "CAD", vec![buy(2.0, 1000, 100)]),
            ledger("MMM", "CAD", vec![buy(4.0, 2000, 0), sell(2.0, 1500, 0)]),
            ledger("EMPTY", "USD", vec![]),
        ];
        let summary = summarize_portfolio(&ledgers);
        let secs: Vec<&str> =
            summary.securities.iter().map(|s| s.security.as_str()).collect();
        assert_eq!(secs, vec!["AAA", "EMPTY", "MMM", "ZZZ"]);
        assert_eq!(summary.securities[0].summary.cost_base_per_share, 550.0);
        assert_eq!(summary.securities[1].summary.total_shares, 0.0);

        let totals: Vec<(&str, f64)> = summary
            .total_cost_base_by_currency
            .iter()
            .map(|(c, v)| (c.as_str(), *v))
            .collect();
        assert_eq!(totals, vec![("CAD", 2100.0), ("USD", 500.0)]);
        assert_eq!(summary.securities[3].currency, Currency::usd());
    }
}
