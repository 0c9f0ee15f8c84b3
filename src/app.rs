pub mod approot;
pub mod input_parse;
pub mod outfmt;

pub use approot::*;

// Version is of the format 0.YY.MM[.i], or 0.year.month.optional_minor_increment
pub const ACB_LEDGER_VERSION: &str = "0.26.10";
