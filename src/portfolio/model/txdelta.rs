use serde::Serialize;
use time::OffsetDateTime;

use crate::util::math::per_held_share;

use super::currency::Currency;
use super::tx::{Tx, TxId};

/// The running state of a security's pool of shares.
/// Amounts are in (fractional) cents.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct PortfolioSecurityStatus {
    // May go negative if more shares are sold than are held.
    pub share_balance: f64,
    pub total_acb: f64,
}

impl PortfolioSecurityStatus {
    pub fn per_share_acb(&self) -> f64 {
        per_held_share(self.total_acb, self.share_balance)
    }
}

/// The realized result of a single sale.
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGain {
    pub transaction_id: TxId,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub num_shares: f64,
    pub sell_price_per_share: f64,
    #[serde(rename = "acbPerShareAtSale")]
    pub acb_per_share: f64,
    pub gain_or_loss: f64,
    pub currency: Currency,
}

#[derive(PartialEq, Clone, Debug)]
pub struct TxDelta {
    pub tx: Tx,
    pub pre_status: PortfolioSecurityStatus,
    pub post_status: PortfolioSecurityStatus,
    pub capital_gain: Option<CapitalGain>,
}

impl TxDelta {
    pub fn acb_delta(&self) -> f64 {
        self.post_status.total_acb - self.pre_status.total_acb
    }

    pub fn share_balance_delta(&self) -> f64 {
        self.post_status.share_balance - self.pre_status.share_balance
    }
}
