use serde::Serialize;

use crate::portfolio::{CapitalGain, Currency, Tx, TxDelta};

use super::delta_list::{final_per_share_acb, txs_to_delta_list};

/// Final totals for a single security.
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySummary {
    pub total_shares: f64,
    pub total_cost_base: f64,
    pub cost_base_per_share: f64,
    pub currency: Currency,
}

impl SecuritySummary {
    pub fn empty(currency: Currency) -> Self {
        SecuritySummary {
            total_shares: 0.0,
            total_cost_base: 0.0,
            cost_base_per_share: 0.0,
            currency,
        }
    }
}

/// The result of folding a security's ledger.
/// All amounts are in (fractional) cents of `currency`.
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcbResult {
    pub total_shares: f64,
    pub total_cost_base: f64,
    #[serde(rename = "costBasePerShareCents")]
    pub cost_base_per_share: f64,
    pub currency: Currency,
    // In ledger order
    pub capital_gains: Vec<CapitalGain>,
}

impl AcbResult {
    pub fn from_deltas(deltas: &[TxDelta], currency: &Currency) -> AcbResult {
        let final_status = deltas.last().map(|d| d.post_status).unwrap_or_default();
        AcbResult {
            total_shares: final_status.share_balance,
            total_cost_base: final_status.total_acb,
            cost_base_per_share: final_per_share_acb(deltas),
            currency: currency.clone(),
            capital_gains: deltas
                .iter()
                .filter_map(|d| d.capital_gain.clone())
                .collect(),
        }
    }

    pub fn summary(&self) -> SecuritySummary {
        SecuritySummary {
            total_shares: self.total_shares,
            total_cost_base: self.total_cost_base,
            cost_base_per_share: self.cost_base_per_share,
            currency: self.currency.clone(),
        }
    }

    pub fn total_gain_or_loss(&self) -> f64 {
        self.capital_gains.iter().map(|g| g.gain_or_loss).sum()
    }
}

/// Computes the ACB and realized capital gains for a single security.
///
/// `txs` must be in ascending sort_order. They are not re-sorted here.
/// The result is a pure function of `txs` and `currency`.
pub fn compute_acb(txs: &[Tx], currency: &Currency) -> AcbResult {
    let deltas = txs_to_delta_list(txs, currency);
    AcbResult::from_deltas(&deltas, currency)
}
