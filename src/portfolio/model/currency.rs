use std::fmt::Display;

use serde::{Serialize, Serializer};

use crate::util::decimal::{
    cents_to_dollars, dollar_precision_str, to_string_min_precision,
    with_thousands_separators,
};

pub type Error = String;

#[derive(Clone, Debug)]
enum CurrImpl {
    Static(&'static str),
    Dyn(String),
}

/// An opaque currency code. Codes are trimmed and upper-cased, but are not
/// checked against any list of real currencies.
#[derive(Clone, Debug)]
pub struct Currency(CurrImpl);

impl Currency {
    pub fn new(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "" => Currency::default(),
            "CAD" => Currency::cad(),
            "USD" => Currency::usd(),
            other => Currency(CurrImpl::Dyn(other.to_string())),
        }
    }

    /// Like new, but an empty code is an error rather than the default.
    pub fn try_new(s: &str) -> Result<Self, Error> {
        if s.trim().is_empty() {
            return Err("Currency cannot be empty".to_string());
        }
        Ok(Currency::new(s))
    }

    pub fn cad() -> Self {
        Currency(CurrImpl::Static("CAD"))
    }

    pub fn usd() -> Self {
        Currency(CurrImpl::Static("USD"))
    }

    pub fn is_default(&self) -> bool {
        *self == Currency::default()
    }

    pub fn as_str(&self) -> &str {
        match &self.0 {
            CurrImpl::Static(s) => s,
            CurrImpl::Dyn(s) => s.as_str(),
        }
    }

    /// Renders a cent amount in this currency, eg. "$1,234.56" (CAD) or
    /// "-$0.50 USD". With full_precision, no rounding to the cent is done.
    pub fn format_cents(&self, cents: f64, full_precision: bool) -> String {
        let dollars = match cents_to_dollars(cents) {
            Some(d) => d,
            None => return format!("{} {}", cents, self),
        };
        let unsigned = if full_precision {
            to_string_min_precision(&dollars.abs(), 2)
        } else {
            dollar_precision_str(&dollars.abs())
        };
        // Avoid "-$0.00" for tiny negative values.
        let sign = if dollars.is_sign_negative() && unsigned.chars().any(|c| c != '0' && c != '.') {
            "-"
        } else {
            ""
        };
        let suffix = if self.is_default() {
            String::new()
        } else {
            format!(" {}", self)
        };
        format!("{}${}{}", sign, with_thousands_separators(&unsigned), suffix)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::cad()
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Currency {}

impl std::hash::Hash for Currency {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl PartialOrd for Currency {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Currency {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

// Auto-implements to_string()
impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
