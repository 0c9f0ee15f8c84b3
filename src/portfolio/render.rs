use std::collections::BTreeMap;

use itertools::Itertools;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::util::decimal::to_string_min_precision;

use super::cumulative_gains::CumulativeCapitalGains;
use super::summary::PortfolioSummary;
use super::{AcbResult, Currency, TxActionSpecifics, TxDelta};

#[derive(Default, Debug)]
pub struct RenderTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<String>,
    pub notes: Vec<String>,
    pub errors: Vec<String>,
}

const SHARES_MAX_PRECISION: u32 = 6;

fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

pub fn shares_str(shares: f64) -> String {
    match Decimal::from_f64(shares) {
        Some(d) => to_string_min_precision(&d.round_dp(SHARES_MAX_PRECISION), 0),
        None => shares.to_string(),
    }
}

fn plus_prefix(v: f64, s: String) -> String {
    if v > 0.0 {
        format!("+{s}")
    } else {
        s
    }
}

fn year_totals_str<F: Fn(f64) -> String>(gains: &CumulativeCapitalGains, fmt: F) -> String {
    let mut lines = vec![format!("Total: {}", fmt(gains.capital_gains_total))];
    for (year, total) in &gains.capital_gains_years_totals {
        lines.push(format!("{}: {}", year, fmt(*total)));
    }
    lines.join("\n")
}

/// Renders the transactions of a single security, with the running
/// share balance and ACB after each.
pub fn render_tx_table_model(
    deltas: &[TxDelta],
    gains: &CumulativeCapitalGains,
    render_full_values: bool,
) -> RenderTable {
    let mut table = RenderTable::default();
    table.header = strs(&[
        "Security", "Date", "TX", "Amount", "Shares", "Amt/Share", "Commission",
        "Cap. Gain", "Share Balance", "ACB +/-", "New ACB", "New ACB/Share",
        "Memo",
    ]);

    let curr = &gains.currency;
    let fmt = |v: f64| curr.format_cents(v, render_full_values);
    let dash = || "-".to_string();

    for d in deltas {
        let tx = &d.tx;
        let specs = &tx.action_specifics;
        let (amount, amount_per_share) = match specs {
            TxActionSpecifics::Roc(roc) => (
                fmt(roc.amount_per_held_share * d.pre_status.share_balance.max(0.0)),
                fmt(roc.amount_per_held_share),
            ),
            _ => {
                let shares = specs.shares().unwrap_or_default();
                (
                    fmt(specs.total_amount() as f64),
                    fmt(crate::util::math::safe_div(specs.total_amount() as f64, shares)),
                )
            }
        };

        table.rows.push(vec![
            tx.security.clone(),
            tx.date.date().to_string(),
            tx.action().pretty_str().to_string(),
            amount,
            specs.shares().map(shares_str).unwrap_or_else(dash),
            amount_per_share,
            match specs {
                TxActionSpecifics::Roc(_) => dash(),
                _ => fmt(specs.commission() as f64),
            },
            d.capital_gain.as_ref().map(|g| fmt(g.gain_or_loss)).unwrap_or_else(dash),
            shares_str(d.post_status.share_balance),
            plus_prefix(d.acb_delta(), fmt(d.acb_delta())),
            fmt(d.post_status.total_acb),
            fmt(d.post_status.per_share_acb()),
            tx.memo.clone(),
        ]);

        if d.post_status.share_balance < 0.0 && d.pre_status.share_balance >= 0.0 {
            table.errors.push(format!(
                "Share balance of {} became negative ({}) after {} on {}",
                tx.security,
                shares_str(d.post_status.share_balance),
                tx.id,
                tx.date.date()
            ));
        }
        if let TxActionSpecifics::Roc(_) = specs {
            if d.pre_status.share_balance <= 0.0 {
                table.notes.push(format!(
                    " Return of capital {} on {} had no shares to apply to",
                    tx.id,
                    tx.date.date()
                ));
            }
        }
    }

    let mut footer = vec![String::new(); table.header.len()];
    footer[6] = "Total Gain/Loss".to_string();
    footer[7] = year_totals_str(gains, fmt);
    table.footer = footer;

    table
}

/// Renders the realized gain of every sale in a security's ledger.
pub fn render_gains_table_model(acb: &AcbResult, render_full_values: bool) -> RenderTable {
    let mut table = RenderTable::default();
    table.header = strs(&[
        "TX ID", "Date", "Shares", "Price/Share", "ACB/Share", "Gain/Loss",
    ]);
    let fmt = |v: f64| acb.currency.format_cents(v, render_full_values);

    for g in &acb.capital_gains {
        table.rows.push(vec![
            g.transaction_id.to_string(),
            g.date.date().to_string(),
            shares_str(g.num_shares),
            fmt(g.sell_price_per_share),
            fmt(g.acb_per_share),
            fmt(g.gain_or_loss),
        ]);
    }
    table.footer = vec![
        String::new(), String::new(), String::new(), String::new(),
        "Total".to_string(), fmt(acb.total_gain_or_loss()),
    ];
    table
}

pub fn render_portfolio_summary_model(
    summary: &PortfolioSummary,
    render_full_values: bool,
) -> RenderTable {
    let mut table = RenderTable::default();
    table.header = strs(&["Security", "Shares", "Total ACB", "ACB/Share"]);

    for s in &summary.securities {
        let fmt = |v: f64| s.currency.format_cents(v, render_full_values);
        table.rows.push(vec![
            s.security.clone(),
            shares_str(s.summary.total_shares),
            fmt(s.summary.total_cost_base),
            fmt(s.summary.cost_base_per_share),
        ]);
    }

    let totals = summary
        .total_cost_base_by_currency
        .iter()
        .map(|(curr, total)| curr.format_cents(*total, render_full_values))
        .join("\n");
    table.footer = vec![String::new(), "Total".to_string(), totals, String::new()];
    table
}

/// Gains across all securities, by year. Each currency is totalled
/// separately.
pub fn render_aggregate_capital_gains(
    gains: &BTreeMap<Currency, CumulativeCapitalGains>,
    render_full_values: bool,
) -> RenderTable {
    let mut table = RenderTable::default();
    table.header = strs(&["Year", "Currency", "Capital Gains"]);

    for (curr, curr_gains) in gains {
        for (year, total) in &curr_gains.capital_gains_years_totals {
            table.rows.push(vec![
                year.to_string(),
                curr.to_string(),
                curr.format_cents(*total, render_full_values),
            ]);
        }
        table.rows.push(vec![
            "Since inception".to_string(),
            curr.to_string(),
            curr.format_cents(curr_gains.capital_gains_total, render_full_values),
        ]);
    }
    table
}
