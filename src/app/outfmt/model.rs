use crate::portfolio::render::RenderTable;

/// Which report a table is. Writers use it for titles and file names.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputType {
    Transactions,
    CapitalGains,
    PortfolioSummary,
    AggregateGains,
}

pub type Error = String;

/// A sink for rendered report tables (console, CSV directory, ...).
/// `name` is the security for per-security tables, and empty otherwise.
pub trait AcbWriter {
    fn print_render_table(
        &mut self,
        out_type: OutputType,
        name: &str,
        table_model: &RenderTable,
    ) -> Result<(), Error>;
}
