use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::{AcbResult, Currency, Security};

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeCapitalGains {
    pub currency: Currency,
    pub capital_gains_total: f64,
    pub capital_gains_years_totals: BTreeMap<i32, f64>,
}

impl CumulativeCapitalGains {
    fn new(currency: Currency) -> Self {
        CumulativeCapitalGains {
            currency,
            capital_gains_total: 0.0,
            capital_gains_years_totals: BTreeMap::new(),
        }
    }

    fn add(&mut self, year: i32, gain: f64) {
        self.capital_gains_total += gain;
        *self.capital_gains_years_totals.entry(year).or_insert(0.0) += gain;
    }
}

/// Totals the gains of a single security, overall and per (UTC) year.
pub fn calc_security_cumulative_capital_gains(acb: &AcbResult) -> CumulativeCapitalGains {
    let mut gains = CumulativeCapitalGains::new(acb.currency.clone());
    for g in &acb.capital_gains {
        gains.add(g.date.year(), g.gain_or_loss);
    }
    gains
}

/// Aggregates the gains of several securities. Securities in different
/// currencies are totalled separately.
pub fn calc_cumulative_capital_gains(
    sec_gains: &HashMap<Security, CumulativeCapitalGains>,
) -> BTreeMap<Currency, CumulativeCapitalGains> {
    let mut totals = BTreeMap::<Currency, CumulativeCapitalGains>::new();

    for gains in sec_gains.values() {
        let curr_total = totals
            .entry(gains.currency.clone())
            .or_insert_with(|| CumulativeCapitalGains::new(gains.currency.clone()));
        for (year, year_gains) in &gains.capital_gains_years_totals {
            curr_total.add(*year, *year_gains);
        }
    }

    totals
}
