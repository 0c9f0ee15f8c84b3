use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use crate::{
    app::outfmt::csv::CsvWriter,
    portfolio::{
        bookkeeping::txs_to_delta_list,
        cumulative_gains::{
            calc_cumulative_capital_gains, calc_security_cumulative_capital_gains,
            CumulativeCapitalGains,
        },
        io::{
            tx_csv::{parse_tx_csv, TxCsvParseOptions},
            tx_loader::{load_ledgers, LedgerLoadOptions},
        },
        render::{
            render_aggregate_capital_gains, render_gains_table_model,
            render_portfolio_summary_model, render_tx_table_model, RenderTable,
        },
        summary::{summarize_portfolio, PortfolioSummary},
        AcbResult, Currency, Security, SecurityLedger, TxDelta,
    },
    util::{date::DynDateFormat, rw::{DescribedReader, WriteHandle}},
    verbose, verboseln, write_errln,
};

use super::outfmt::{
    json::{write_json_report, JsonReport, JsonSecurityReport},
    model::{AcbWriter, OutputType},
    text::TextWriter,
};

pub type Error = String;

#[derive(Default, Debug)]
pub struct Options {
    pub render_full_dollar_values: bool,
    pub date_format: Option<DynDateFormat>,
    pub default_currency: Currency,
    pub security_currencies: HashMap<Security, Currency>,
    pub csv_output_dir: Option<String>,
    pub json_output: bool,
    pub portfolio_summary: bool,
}

/// Reads all ledger CSVs and splits them into validated, ordered ledgers,
/// one per security.
pub fn run_acb_app_to_ledgers(
    csv_file_readers: Vec<DescribedReader>,
    options: &Options,
    mut err_printer: WriteHandle,
) -> Result<Vec<SecurityLedger>, Error> {
    let parse_options = TxCsvParseOptions {
        date_format: options.date_format.clone(),
    };

    let mut all_csv_txs = Vec::new();
    let mut global_read_index: u32 = 0;
    for mut csv_reader in csv_file_readers {
        verbose!("Reading {}... ", csv_reader.desc());
        let mut csv_txs = parse_tx_csv(
            &mut csv_reader, global_read_index, &parse_options, &mut err_printer)?;
        verboseln!("{} rows", csv_txs.len());
        global_read_index += csv_txs.len() as u32;
        all_csv_txs.append(&mut csv_txs);
    }

    load_ledgers(all_csv_txs, &LedgerLoadOptions {
        default_currency: options.default_currency.clone(),
        security_currencies: options.security_currencies.clone(),
    })
}

pub struct SecurityResult {
    pub ledger: SecurityLedger,
    pub deltas: Vec<TxDelta>,
    pub acb: AcbResult,
    pub gains: CumulativeCapitalGains,
}

pub struct AppResults {
    // Sorted by security
    pub securities: Vec<SecurityResult>,
    pub aggregate_gains: BTreeMap<Currency, CumulativeCapitalGains>,
    pub portfolio_summary: Option<PortfolioSummary>,
}

/// Folds each security's ledger independently, then aggregates.
pub fn run_acb_app_to_results(
    csv_file_readers: Vec<DescribedReader>,
    options: &Options,
    err_printer: WriteHandle,
) -> Result<AppResults, Error> {
    let ledgers = run_acb_app_to_ledgers(csv_file_readers, options, err_printer)?;

    let portfolio_summary = if options.portfolio_summary {
        Some(summarize_portfolio(&ledgers))
    } else {
        None
    };

    let securities: Vec<SecurityResult> = ledgers
        .into_iter()
        .map(|ledger| {
            let deltas = txs_to_delta_list(ledger.ordered_txs(), ledger.currency());
            let acb = AcbResult::from_deltas(&deltas, ledger.currency());
            let gains = calc_security_cumulative_capital_gains(&acb);
            SecurityResult { ledger, deltas, acb, gains }
        })
        .collect();

    let sec_gains: HashMap<Security, CumulativeCapitalGains> = securities
        .iter()
        .map(|s| (s.ledger.security().to_string(), s.gains.clone()))
        .collect();
    let aggregate_gains = calc_cumulative_capital_gains(&sec_gains);

    Ok(AppResults {
        securities,
        aggregate_gains,
        portfolio_summary,
    })
}

pub struct AppRenderResult {
    // (security, transactions table, gains table). Sorted by security.
    pub security_tables: Vec<(Security, RenderTable, RenderTable)>,
    pub aggregate_gains_table: RenderTable,
    pub portfolio_summary_table: Option<RenderTable>,
}

/// Renders the results into generic render models, so that they can be fed
/// to alternate output formatters (like to console or CSV).
pub fn render_app_results(results: &AppResults, render_full_dollar_values: bool)
    -> AppRenderResult {

    let security_tables = results
        .securities
        .iter()
        .map(|s| {
            (
                s.ledger.security().to_string(),
                render_tx_table_model(&s.deltas, &s.gains, render_full_dollar_values),
                render_gains_table_model(&s.acb, render_full_dollar_values),
            )
        })
        .collect();

    AppRenderResult {
        security_tables,
        aggregate_gains_table: render_aggregate_capital_gains(
            &results.aggregate_gains, render_full_dollar_values),
        portfolio_summary_table: results.portfolio_summary.as_ref().map(
            |s| render_portfolio_summary_model(s, render_full_dollar_values)),
    }
}

pub fn run_acb_app_to_render_model(
    csv_file_readers: Vec<DescribedReader>,
    options: &Options,
    err_printer: WriteHandle,
) -> Result<AppRenderResult, Error> {
    let results = run_acb_app_to_results(csv_file_readers, options, err_printer)?;
    Ok(render_app_results(&results, options.render_full_dollar_values))
}

fn write_render_result(render_res: &AppRenderResult, writer: &mut dyn AcbWriter)
    -> Result<Vec<Security>, Error> {

    let mut secs_with_errors = Vec::<Security>::new();
    for (sec, tx_table, gains_table) in &render_res.security_tables {
        writer.print_render_table(OutputType::Transactions, sec, tx_table)
            .map_err(|err| format!("Rendering transactions for {sec}: {err}"))?;
        writer.print_render_table(OutputType::CapitalGains, sec, gains_table)
            .map_err(|err| format!("Rendering capital gains for {sec}: {err}"))?;
        if !tx_table.errors.is_empty() {
            secs_with_errors.push(sec.clone());
        }
    }

    writer.print_render_table(
        OutputType::AggregateGains, "", &render_res.aggregate_gains_table)
        .map_err(|err| format!("Rendering aggregate gains: {err}"))?;

    if let Some(table) = &render_res.portfolio_summary_table {
        writer.print_render_table(OutputType::PortfolioSummary, "", table)
            .map_err(|err| format!("Rendering portfolio summary: {err}"))?;
    }

    Ok(secs_with_errors)
}

/// Returned Err is for exit code determination only.
/// All errors are written to err_printer.
pub fn run_acb_app_to_writer(
    writer: &mut dyn AcbWriter,
    csv_file_readers: Vec<DescribedReader>,
    options: &Options,
    mut err_printer: WriteHandle,
) -> Result<AppRenderResult, ()> {
    let render_res = match run_acb_app_to_render_model(
        csv_file_readers, options, err_printer.clone()) {
        Ok(render_res) => render_res,
        Err(e) => {
            write_errln!(err_printer, "{}", e);
            return Err(());
        }
    };

    match write_render_result(&render_res, writer) {
        Ok(secs_with_errors) => {
            if !secs_with_errors.is_empty() {
                write_errln!(
                    err_printer,
                    "\n[!] There are errors for the following securities: {}",
                    secs_with_errors.join(", ")
                );
            }
        }
        Err(e) => {
            write_errln!(err_printer, "{}", e);
            return Err(());
        }
    }

    Ok(render_res)
}

/// Writes the raw results as JSON instead of rendering tables.
pub fn run_acb_app_to_json(
    out: &mut dyn Write,
    csv_file_readers: Vec<DescribedReader>,
    options: &Options,
    mut err_printer: WriteHandle,
) -> Result<(), ()> {
    let results = match run_acb_app_to_results(
        csv_file_readers, options, err_printer.clone()) {
        Ok(r) => r,
        Err(e) => {
            write_errln!(err_printer, "{}", e);
            return Err(());
        }
    };

    let report = JsonReport {
        securities: results
            .securities
            .iter()
            .map(|s| JsonSecurityReport { security: s.ledger.security(), acb: &s.acb })
            .collect(),
        aggregate_gains: results.aggregate_gains.values().collect(),
        portfolio_summary: results.portfolio_summary.as_ref(),
    };
    write_json_report(&report, out).map_err(|e| {
        write_errln!(err_printer, "{}", e);
    })
}

pub fn run_acb_app_to_console(
    csv_file_readers: Vec<DescribedReader>,
    options: Options,
    mut err_printer: WriteHandle,
) -> Result<(), ()> {
    verboseln!("Processing {} ledger file(s)", csv_file_readers.len());

    if options.json_output {
        let mut out = WriteHandle::stdout_write_handle();
        return run_acb_app_to_json(&mut out, csv_file_readers, &options, err_printer);
    }

    let mut writer: Box<dyn AcbWriter> = match &options.csv_output_dir {
        Some(dir_path) => match CsvWriter::new(dir_path) {
            Ok(w) => Box::new(w),
            Err(e) => {
                write_errln!(err_printer, "{e}");
                return Err(());
            }
        },
        None => Box::new(TextWriter::new(WriteHandle::stdout_write_handle())),
    };

    run_acb_app_to_writer(writer.as_mut(), csv_file_readers, &options, err_printer)
        .map(|_| ())
}

// MARK: Tests
#[cfg(test)]
mod tests {
    use crate::{
        app::outfmt::{model::AcbWriter, text::TextWriter},
        portfolio::{io::tx_csv::testlib::csv_reader, render::RenderTable, Currency},
        testlib::assert_re,
        util::rw::WriteHandle,
    };

    use super::{run_acb_app_to_json, run_acb_app_to_render_model, run_acb_app_to_writer, Options};

    const HEADER: &str = "security,date,action,shares,total amount,amount/share,commission";

    fn smoke_test_render(render_table: &RenderTable) {
        let wh = if std::env::var("VERBOSE").unwrap_or_default().is_empty() {
            WriteHandle::empty_write_handle()
        } else {
            WriteHandle::stderr_write_handle()
        };
        let mut w = TextWriter::new(wh);
        w.print_render_table(
            crate::app::outfmt::model::OutputType::Transactions,
            "Dummy table", render_table).unwrap();
    }

    fn get_total_cap_gain(render_table: &RenderTable) -> &str {
        render_table.footer[7].split('\n').next().unwrap()
    }

    #[test]
    fn test_same_day_buy_sells_across_files() {
        for split in [3, 1, 2] {
            let rows = [
                "FOO,2016-01-03,Buy,20,30,,",
                "FOO,2016-01-03,Sell,5,8,,",
                "FOO,2016-01-03,Buy,5,8.50,,",
            ];
            let mut first = vec![HEADER];
            first.extend(&rows[..split]);
            let mut readers = vec![csv_reader(&first)];
            if split < rows.len() {
                let mut second = vec![HEADER];
                second.extend(&rows[split..]);
                readers.push(csv_reader(&second));
            }

            let render_res = run_acb_app_to_render_model(
                readers, &Options::default(), WriteHandle::empty_write_handle()).unwrap();
            assert_eq!(render_res.security_tables.len(), 1);
            let (sec, tx_table, gains_table) = &render_res.security_tables[0];
            smoke_test_render(tx_table);
            assert_eq!(sec, "FOO");
            assert_eq!(tx_table.rows.len(), 3);
            assert_eq!(Vec::<String>::new(), tx_table.errors);
            assert_eq!("Total: $0.50", get_total_cap_gain(tx_table));
            assert_eq!(gains_table.rows.len(), 1);
        }
    }

    #[test]
    fn test_negative_shares() {
        let readers = vec![csv_reader(&[HEADER, "FOO,2016-01-03,Sell,5,8,,"])];
        let (err_printer, err_buff) = WriteHandle::string_buff_write_handle();
        let (out, _) = WriteHandle::string_buff_write_handle();
        let mut writer = TextWriter::new(out);
        let render_res = run_acb_app_to_writer(
            &mut writer, readers, &Options::default(), err_printer).unwrap();

        let (_, tx_table, _) = &render_res.security_tables[0];
        assert_eq!(tx_table.rows.len(), 1);
        assert_re("became negative", &tx_table.errors[0]);
        assert_eq!("Total: $8.00", get_total_cap_gain(tx_table));
        assert_re("errors for the following securities: FOO", err_buff.borrow().as_str());
    }

    #[test]
    fn test_fractional_shares() {
        let readers = vec![csv_reader(&[
            HEADER,
            "FOO,2016-01-03,Buy,0.1,0.16,,",
            "FOO,2016-01-03,Sell,0.05,0.085,,",
            "FOO,2016-01-04,Sell,0.05,0.085,,",
        ])];

        let render_res = run_acb_app_to_render_model(
            readers, &Options::default(), WriteHandle::empty_write_handle()).unwrap();
        let (_, tx_table, _) = &render_res.security_tables[0];
        assert_eq!(tx_table.rows.len(), 3);
        assert_eq!(Vec::<String>::new(), tx_table.errors);
        assert_eq!("Total: $0.02", get_total_cap_gain(tx_table));
        assert_eq!(tx_table.rows[2][8], "0");
    }

    #[test]
    fn test_portfolio_summary_and_currencies() {
        let readers = vec![csv_reader(&[
            "security,date,action,shares,total amount,currency",
            "VFV,2020-05-01,buy,10,1000,",
            "SPY,2020-05-01,buy,1,300,USD",
        ])];
        let options = Options { portfolio_summary: true, ..Options::default() };
        let render_res = run_acb_app_to_render_model(
            readers, &options, WriteHandle::empty_write_handle()).unwrap();

        let secs: Vec<&str> =
            render_res.security_tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(secs, vec!["SPY", "VFV"]);
        let summary = render_res.portfolio_summary_table.unwrap();
        assert_eq!(summary.rows[0], vec!["SPY", "1", "$300.00 USD", "$300.00 USD"]);
        assert_eq!(summary.rows[1], vec!["VFV", "10", "$1,000.00", "$100.00"]);
    }

    #[test]
    fn test_load_error() {
        let readers = vec![csv_reader(&[HEADER, "FOO,2016-01-03,Buy,,10,,"])];
        let (err_printer, err_buff) = WriteHandle::string_buff_write_handle();
        let (out, out_buff) = WriteHandle::string_buff_write_handle();
        let mut writer = TextWriter::new(out);
        assert!(run_acb_app_to_writer(
            &mut writer, readers, &Options::default(), err_printer).is_err());
        assert_eq!(
            err_buff.borrow().as_str(),
            "Invalid transaction 1 of FOO: Number of shares is required for this \
             transaction type\n"
        );
        assert_eq!(out_buff.borrow().as_str(), "");
    }

    #[test]
    fn test_json_output() {
        let readers = vec![csv_reader(&[
            HEADER,
            "FOO,2016-01-03,Buy,10,100,,",
            "FOO,2016-02-03,Sell,5,60,,",
        ])];
        let options = Options {
            default_currency: Currency::usd(),
            ..Options::default()
        };
        let mut out = Vec::<u8>::new();
        run_acb_app_to_json(&mut out, readers, &options, WriteHandle::empty_write_handle())
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let foo = &v["securities"][0];
        assert_eq!(foo["security"], "FOO");
        assert_eq!(foo["currency"], "USD");
        assert_eq!(foo["totalShares"], 5.0);
        assert_eq!(foo["capitalGains"][0]["gainOrLoss"], 1000.0);
        assert_eq!(v["aggregateGains"][0]["capitalGainsTotal"], 1000.0);
        assert_eq!(v["aggregateGains"][0]["capitalGainsYearsTotals"]["2016"], 1000.0);
    }
}
