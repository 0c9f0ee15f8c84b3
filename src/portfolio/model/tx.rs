use std::fmt::Display;

use serde::Serialize;
use time::OffsetDateTime;

use super::currency::Currency;

pub type Error = String;

pub type Security = String;

/// An integral amount in the minor unit of a currency (eg. cents).
pub type Cents = i64;

/// Opaque transaction identifier, unique within a security's ledger.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        TxId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TxId {
    fn from(value: &str) -> Self {
        TxId::new(value)
    }
}

impl Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TxAction {
    Buy,
    Sell,
    Roc,
    RiDiv, // Reinvested dividend
    RiCGDist, // Reinvested capital gains distribution
}

impl TxAction {
    pub fn pretty_str(&self) -> &'static str {
        match self {
            TxAction::Buy => "Buy",
            TxAction::Sell => "Sell",
            TxAction::Roc => "RoC",
            TxAction::RiDiv => "RiDiv",
            TxAction::RiCGDist => "RiCGDist",
        }
    }
}

impl Display for TxAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_str())
    }
}

impl std::str::FromStr for TxAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "buy" => Ok(TxAction::Buy),
            "sell" => Ok(TxAction::Sell),
            "roc" | "return of capital" => Ok(TxAction::Roc),
            "ridiv" | "reinvested dividend" => Ok(TxAction::RiDiv),
            "ricgdist" | "reinvested capital gains distribution" => {
                Ok(TxAction::RiCGDist)
            }
            _ => Err(format!("Invalid action '{s}'")),
        }
    }
}

/// Payload shared by the acquisition-like actions (Buy, RiDiv, RiCGDist).
#[derive(PartialEq, Clone, Debug)]
pub struct AcquireTxSpecifics {
    pub shares: f64,
    pub total_amount: Cents,
    pub commission: Cents,
}

impl AcquireTxSpecifics {
    /// What gets added to the cost base.
    pub fn total_cost(&self) -> f64 {
        // The i64 sum of two valid amounts may overflow.
        self.total_amount as f64 + self.commission as f64
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct SellTxSpecifics {
    pub shares: f64,
    pub total_amount: Cents,
    pub commission: Cents,
}

impl SellTxSpecifics {
    pub fn net_proceeds(&self) -> f64 {
        self.total_amount as f64 - self.commission as f64
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct RocTxSpecifics {
    // In (fractional) cents
    pub amount_per_held_share: f64,
}

#[derive(PartialEq, Clone, Debug)]
pub enum TxActionSpecifics {
    Buy(AcquireTxSpecifics),
    Sell(SellTxSpecifics),
    Roc(RocTxSpecifics),
    RiDiv(AcquireTxSpecifics),
    RiCGDist(AcquireTxSpecifics),
}

/// The loosely-typed fields of a transaction, as they arrive from a user
/// or a file. Validated into TxActionSpecifics.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct TxFields {
    pub shares: Option<f64>,
    pub total_amount: Cents,
    pub amount_per_share: Option<f64>,
    pub commission: Option<Cents>,
}

impl TxActionSpecifics {
    /// Builds the specifics for `action`, applying the ledger's shape rules:
    ///  - shares may never be zero, and are required for all but RoC
    ///  - total amount and commission may not be negative
    ///  - RoC requires a non-negative amount per share
    ///
    /// For RoC, shares and the total amount are dropped (the total is fixed
    /// at 0), and any amount per share on other actions is ignored.
    pub fn try_from_fields(action: TxAction, fields: TxFields) -> Result<Self, Error> {
        if fields.shares == Some(0.0) {
            return Err("Number of shares cannot be zero".to_string());
        }
        if action != TxAction::Roc && fields.shares.is_none() {
            return Err("Number of shares is required for this transaction type".to_string());
        }
        if fields.total_amount < 0 {
            return Err("Total amount cannot be negative".to_string());
        }
        let commission = fields.commission.unwrap_or(0);
        if commission < 0 {
            return Err("Commission fee cannot be negative".to_string());
        }

        let shares = fields.shares.unwrap_or_default();
        let acquire = || AcquireTxSpecifics {
            shares,
            total_amount: fields.total_amount,
            commission,
        };

        Ok(match action {
            TxAction::Buy => TxActionSpecifics::Buy(acquire()),
            TxAction::RiDiv => TxActionSpecifics::RiDiv(acquire()),
            TxAction::RiCGDist => TxActionSpecifics::RiCGDist(acquire()),
            TxAction::Sell => TxActionSpecifics::Sell(SellTxSpecifics {
                shares,
                total_amount: fields.total_amount,
                commission,
            }),
            TxAction::Roc => {
                let amount_per_share = fields.amount_per_share.ok_or_else(|| {
                    "Return of capital per share is required for return of \
                    capital transactions".to_string()
                })?;
                if amount_per_share < 0.0 {
                    return Err("Return of capital per share cannot be negative".to_string());
                }
                TxActionSpecifics::Roc(RocTxSpecifics {
                    amount_per_held_share: amount_per_share,
                })
            }
        })
    }

    pub fn action(&self) -> TxAction {
        match self {
            TxActionSpecifics::Buy(_) => TxAction::Buy,
            TxActionSpecifics::Sell(_) => TxAction::Sell,
            TxActionSpecifics::Roc(_) => TxAction::Roc,
            TxActionSpecifics::RiDiv(_) => TxAction::RiDiv,
            TxActionSpecifics::RiCGDist(_) => TxAction::RiCGDist,
        }
    }

    /// None for RoC, which does not act on the share count.
    pub fn shares(&self) -> Option<f64> {
        match self {
            TxActionSpecifics::Buy(s)
            | TxActionSpecifics::RiDiv(s)
            | TxActionSpecifics::RiCGDist(s) => Some(s.shares),
            TxActionSpecifics::Sell(s) => Some(s.shares),
            TxActionSpecifics::Roc(_) => None,
        }
    }

    pub fn total_amount(&self) -> Cents {
        match self {
            TxActionSpecifics::Buy(s)
            | TxActionSpecifics::RiDiv(s)
            | TxActionSpecifics::RiCGDist(s) => s.total_amount,
            TxActionSpecifics::Sell(s) => s.total_amount,
            TxActionSpecifics::Roc(_) => 0,
        }
    }

    pub fn commission(&self) -> Cents {
        match self {
            TxActionSpecifics::Buy(s)
            | TxActionSpecifics::RiDiv(s)
            | TxActionSpecifics::RiCGDist(s) => s.commission,
            TxActionSpecifics::Sell(s) => s.commission,
            TxActionSpecifics::Roc(_) => 0,
        }
    }

    pub fn amount_per_share(&self) -> Option<f64> {
        match self {
            TxActionSpecifics::Roc(s) => Some(s.amount_per_held_share),
            _ => None,
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct Tx {
    pub id: TxId,
    pub security: Security,
    // Display only. Processing order is determined by sort_order.
    pub date: OffsetDateTime,
    pub sort_order: i64,
    pub action_specifics: TxActionSpecifics,
    pub memo: String,
}

impl Tx {
    pub fn action(&self) -> TxAction {
        self.action_specifics.action()
    }
}

/// Stable sort by sort_order. Txs with equal sort orders keep their
/// relative positions.
pub fn sort_txs_by_sort_order(txs: &mut [Tx]) {
    txs.sort_by_key(|tx| tx.sort_order);
}

/// A CSV row (or any other loosely-typed input), before validation.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct CsvTx {
    pub security: Option<String>,
    pub id: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub sort_order: Option<i64>,
    pub action: Option<TxAction>,
    pub shares: Option<f64>,
    pub total_amount: Option<Cents>,
    pub amount_per_share: Option<f64>,
    pub commission: Option<Cents>,
    pub currency: Option<Currency>,
    pub memo: Option<String>,

    // The absolute order in which the Tx was read from file.
    pub read_index: u32,
}

/// Converts a CsvTx into a Tx. Security, id, date and action must all be
/// present. A missing sort order becomes 0, and is expected to be assigned
/// by the ledger (see SecurityLedger::append).
impl TryFrom<CsvTx> for Tx {
    type Error = Error;

    fn try_from(csv_tx: CsvTx) -> Result<Self, Self::Error> {
        let security = match csv_tx.security {
            Some(s) if !s.trim().is_empty() => s.trim().to_uppercase(),
            _ => return Err("Transaction has no security".to_string()),
        };
        let id = match csv_tx.id {
            Some(id) if !id.trim().is_empty() => TxId::new(id.trim()),
            _ => return Err("Transaction has no id".to_string()),
        };
        let date = csv_tx.date.ok_or_else(|| "Transaction has no date".to_string())?;
        let action = csv_tx.action.ok_or_else(|| "Transaction has no action".to_string())?;

        let action_specifics = TxActionSpecifics::try_from_fields(
            action,
            TxFields {
                shares: csv_tx.shares,
                total_amount: csv_tx.total_amount.unwrap_or(0),
                amount_per_share: csv_tx.amount_per_share,
                commission: csv_tx.commission,
            },
        )?;

        Ok(Tx {
            id,
            security,
            date,
            sort_order: csv_tx.sort_order.unwrap_or(0),
            action_specifics,
            memo: csv_tx.memo.unwrap_or_default(),
        })
    }
}
