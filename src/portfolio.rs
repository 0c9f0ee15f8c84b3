pub mod bookkeeping;
pub mod csv_common;
pub mod cumulative_gains;
pub mod io;
pub mod ledger;
pub mod model;
pub mod render;
pub mod summary;

pub use self::bookkeeping::{compute_acb, AcbResult, SecuritySummary};
pub use self::ledger::SecurityLedger;
pub use self::model::currency::*;
pub use self::model::tx::*;
pub use self::model::txdelta::*;
