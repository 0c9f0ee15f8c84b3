mod acb;
mod delta_list;

pub use acb::*;
pub use delta_list::*;
