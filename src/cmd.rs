use clap::Parser;

use crate::app::input_parse::parse_security_currencies;
use crate::app::{run_acb_app_to_console, Options};
use crate::portfolio::csv_common::CsvCol;
use crate::portfolio::Currency;
use crate::util::date::parse_dyn_date_format;
use crate::util::rw::{DescribedReader, WriteHandle};
use crate::write_errln;

const ABOUT: &str = "Adjusted cost base (ACB) and capital gains calculator";

fn get_long_about() -> String {
    format!("\
Computes the adjusted cost base (ACB) and realized capital gains of each
security in one or more transaction ledgers, using the Canadian average
cost method.

Each CSV provided should contain a header with these column names:
{}
Only security, date, action and shares (except for return of capital) are
required. Amounts are in dollars of the security's currency.

Transactions are processed in ascending sort order, and rows without a
sort order are appended after the others, in the order they were read.
Dates are only used for display and for yearly gain totals.

Securities are never converted between currencies. Totals in different
currencies are reported separately.",
        CsvCol::export_order_cols().join(", "))
}

#[derive(Parser, Debug)]
#[command(version = crate::app::ACB_LEDGER_VERSION,
          about = ABOUT, long_about = get_long_about())]
pub struct Args {
    #[arg(required = true)]
    pub csv_files: Vec<String>,

    /// Print verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Format of how dates appear in the csv file.
    /// The default accepts "[year]-[month]-[day]" or RFC 3339 timestamps.
    ///
    /// See https://time-rs.github.io/book/api/format-description.html
    #[arg(long)]
    pub date_fmt: Option<String>,

    /// Currency of securities whose transactions do not specify one
    #[arg(long, default_value = "CAD")]
    pub currency: String,

    /// Currency of a specific security.
    ///
    /// Formatted as SYM:CURRENCY. Eg. SPY:USD . May be provided multiple times.
    #[arg(short = 'c', long)]
    pub security_currency: Vec<String>,

    /// Print all digits in output values
    #[arg(long, default_value_t = false)]
    pub print_full_values: bool,

    /// Also print a summary of the final holdings of all securities
    #[arg(long, default_value_t = false)]
    pub portfolio_summary: bool,

    /// Write output as CSV to the specified directory.
    #[arg(short = 'd', long, conflicts_with = "json")]
    pub csv_output_dir: Option<String>,

    /// Write the raw results as JSON to stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Args {
    pub fn to_options(&self) -> Result<Options, String> {
        let date_format = match &self.date_fmt {
            Some(fmt) => Some(parse_dyn_date_format(fmt)
                .map_err(|e| format!("Invalid date format '{fmt}': {e}"))?),
            None => None,
        };
        Ok(Options {
            render_full_dollar_values: self.print_full_values,
            date_format,
            default_currency: Currency::try_new(&self.currency)?,
            security_currencies: parse_security_currencies(&self.security_currency)?,
            csv_output_dir: self.csv_output_dir.clone(),
            json_output: self.json,
            portfolio_summary: self.portfolio_summary,
        })
    }
}

/// Returned Err is for exit code determination only.
pub fn command_main() -> Result<(), ()> {
    let args = Args::parse();

    if args.verbose {
        crate::tracing::enable_trace_env("acb_ledger=info");
    }
    crate::tracing::setup_tracing();
    crate::log::set_verbose(args.verbose);

    let mut err_printer = WriteHandle::stderr_write_handle();

    let options = match args.to_options() {
        Ok(o) => o,
        Err(e) => {
            write_errln!(err_printer, "Error: {}", e);
            return Err(());
        }
    };

    let csv_file_readers: Vec<DescribedReader> = args
        .csv_files
        .iter()
        .map(|f| DescribedReader::from_file_path(f.into()))
        .collect();

    tracing::debug!("command_main: args: {:#?}", args);
    run_acb_app_to_console(csv_file_readers, options, err_printer)
}
