use crate::portfolio::{
    AcquireTxSpecifics, CapitalGain, Currency, PortfolioSecurityStatus,
    RocTxSpecifics, SellTxSpecifics, Tx, TxActionSpecifics, TxDelta,
};
use crate::util::math::{per_held_share, safe_div};

fn acquire(
    pre: &PortfolioSecurityStatus,
    specs: &AcquireTxSpecifics,
) -> PortfolioSecurityStatus {
    PortfolioSecurityStatus {
        share_balance: pre.share_balance + specs.shares,
        total_acb: pre.total_acb + specs.total_cost(),
    }
}

// Everything here is computed from the pre-sale state.
fn sell(
    tx: &Tx,
    pre: &PortfolioSecurityStatus,
    specs: &SellTxSpecifics,
    currency: &Currency,
) -> (PortfolioSecurityStatus, CapitalGain) {
    let acb_per_share = pre.per_share_acb();
    let sell_price_per_share = safe_div(specs.net_proceeds(), specs.shares);
    let gain_or_loss = (sell_price_per_share - acb_per_share) * specs.shares;

    let share_balance = pre.share_balance - specs.shares;
    if share_balance < 0.0 {
        tracing::warn!(
            "Sell of {} shares of {} (tx {}) exceeds the holdings ({}). \
            Share balance is now {}",
            specs.shares, tx.security, tx.id, pre.share_balance, share_balance
        );
    }
    // Only a sale of the whole (positive) holding empties the pool.
    let total_acb = if share_balance == 0.0 && pre.share_balance > 0.0 {
        0.0
    } else {
        (pre.total_acb - acb_per_share * specs.shares).max(0.0)
    };

    let gain = CapitalGain {
        transaction_id: tx.id.clone(),
        date: tx.date,
        num_shares: specs.shares,
        sell_price_per_share,
        acb_per_share,
        gain_or_loss,
        currency: currency.clone(),
    };
    (PortfolioSecurityStatus { share_balance, total_acb }, gain)
}

fn return_of_capital(
    tx: &Tx,
    pre: &PortfolioSecurityStatus,
    specs: &RocTxSpecifics,
) -> PortfolioSecurityStatus {
    if pre.share_balance <= 0.0 {
        tracing::warn!(
            "Return of capital on {} (tx {}) with no shares held. \
            It has no effect",
            tx.security, tx.id
        );
        return *pre;
    }
    // The ACB can be reduced to zero, but never below it.
    let reduction =
        (specs.amount_per_held_share * pre.share_balance).min(pre.total_acb);
    PortfolioSecurityStatus {
        share_balance: pre.share_balance,
        total_acb: pre.total_acb - reduction,
    }
}

/// Applies a single Tx to the running status of its security.
pub fn delta_for_tx(
    tx: &Tx,
    pre_status: PortfolioSecurityStatus,
    currency: &Currency,
) -> TxDelta {
    let mut capital_gain: Option<CapitalGain> = None;

    let post_status = match &tx.action_specifics {
        TxActionSpecifics::Buy(specs)
        | TxActionSpecifics::RiDiv(specs)
        | TxActionSpecifics::RiCGDist(specs) => acquire(&pre_status, specs),
        TxActionSpecifics::Sell(specs) => {
            let (post, gain) = sell(tx, &pre_status, specs, currency);
            capital_gain = Some(gain);
            post
        }
        TxActionSpecifics::Roc(specs) => return_of_capital(tx, &pre_status, specs),
    };

    tracing::debug!(
        "delta_for_tx: {} {} {}: shares {} -> {}, acb {} -> {}",
        tx.security,
        tx.id,
        tx.action(),
        pre_status.share_balance,
        post_status.share_balance,
        pre_status.total_acb,
        post_status.total_acb
    );

    TxDelta {
        tx: tx.clone(),
        pre_status,
        post_status,
        capital_gain,
    }
}

/// Folds txs, which must all be of the same security and already be in
/// ascending sort_order, into one delta per Tx.
///
/// Never fails. Degenerate input (eg. overselling) is carried through
/// arithmetically and logged.
pub fn txs_to_delta_list(txs: &[Tx], currency: &Currency) -> Vec<TxDelta> {
    let mut deltas = Vec::<TxDelta>::with_capacity(txs.len());
    let mut status = PortfolioSecurityStatus::default();

    for tx in txs {
        let delta = delta_for_tx(tx, status, currency);
        tracing::trace!("txs_to_delta_list: adding delta: {:#?}", delta);
        status = delta.post_status;
        deltas.push(delta);
    }

    deltas
}

/// ACB per share of the final status of a delta list (0 if no shares held).
pub fn final_per_share_acb(deltas: &[TxDelta]) -> f64 {
    deltas.last().map_or(0.0, |d| {
        per_held_share(d.post_status.total_acb, d.post_status.share_balance)
    })
}

// MARK: tests
