use std::borrow::BorrowMut;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, Time};

use crate::portfolio::csv_common::CsvCol;
use crate::portfolio::{CsvTx, Currency, SecurityLedger, Tx, TxAction};
use crate::util::date::{parse_utc_timestamp, DynDateFormat};
use crate::util::decimal::{
    cents_to_dollars, dollars_to_cents, dollars_to_fractional_cents,
    to_string_min_precision,
};
use crate::util::rw::{DescribedReader, WriteHandle};
use crate::write_errln;

type Error = String;

fn csvtx_from_csv_values(
    mut values: HashMap<&str, String>,
    read_index: u32,
    parse_options: &TxCsvParseOptions,
) -> Result<CsvTx, Error> {
    let parse_decimal = |value: &str, field_name: &str| {
        Decimal::from_str(value).map_err(|e| {
            format!(
                "Failed to parse number for {} ('{}'): {}",
                field_name, value, e
            )
        })
    };
    let parse_f64 = |value: &str, field_name: &str| -> Result<f64, Error> {
        parse_decimal(value, field_name)?.to_f64().ok_or_else(|| {
            format!("Number for {} is out of range ('{}')", field_name, value)
        })
    };
    let parse_cents = |value: &str, field_name: &str| -> Result<i64, Error> {
        dollars_to_cents(&parse_decimal(value, field_name)?)
    };

    Ok(CsvTx {
        security: values.remove(CsvCol::SECURITY),
        id: values.remove(CsvCol::ID),
        date: match values.remove(CsvCol::DATE) {
            Some(s) => Some(
                parse_utc_timestamp(&s, &parse_options.date_format).map_err(|e| {
                    format!("Failed to parse {} \"{}\": {}", CsvCol::DATE, s, e)
                })?,
            ),
            None => None,
        },
        sort_order: match values.remove(CsvCol::SORT_ORDER) {
            Some(s) => Some(i64::from_str(&s).map_err(|e| {
                format!("Failed to parse {} ('{}'): {}", CsvCol::SORT_ORDER, s, e)
            })?),
            None => None,
        },
        action: match values.remove(CsvCol::ACTION) {
            Some(s) => Some(TxAction::from_str(&s)?),
            None => None,
        },
        shares: match values.remove(CsvCol::SHARES) {
            Some(s) => Some(parse_f64(&s, CsvCol::SHARES)?),
            None => None,
        },
        total_amount: match values.remove(CsvCol::TOTAL_AMOUNT) {
            Some(s) => Some(parse_cents(&s, CsvCol::TOTAL_AMOUNT)?),
            None => None,
        },
        amount_per_share: match values.remove(CsvCol::AMOUNT_PER_SHARE) {
            Some(s) => Some(dollars_to_fractional_cents(&parse_decimal(
                &s,
                CsvCol::AMOUNT_PER_SHARE,
            )?)?),
            None => None,
        },
        commission: match values.remove(CsvCol::COMMISSION) {
            Some(s) => Some(parse_cents(&s, CsvCol::COMMISSION)?),
            None => None,
        },
        currency: values.remove(CsvCol::CURRENCY).map(|s| Currency::new(&s)),
        memo: values.remove(CsvCol::MEMO),
        read_index,
    })
}

#[derive(Default)]
pub struct TxCsvParseOptions {
    pub date_format: Option<DynDateFormat>,
}

/// Parses the rows of a ledger CSV.
///
/// Column names are case-insensitive. Unrecognized columns are ignored,
/// with a warning written to err_stream.
/// Rows without an id are given their (1-based) global read position
/// as an id.
pub fn parse_tx_csv(
    desc_reader: &mut DescribedReader,
    initial_global_read_index: u32,
    parse_options: &TxCsvParseOptions,
    err_stream: &mut WriteHandle,
) -> Result<Vec<CsvTx>, Error> {
    let mut reader_box = desc_reader
        .reader()
        .map_err(|e| format!("Failed to read {}: {}", desc_reader.desc(), e))?;
    let reader: &mut dyn Read = reader_box.borrow_mut();

    let mut csv_r = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let csv_desc = desc_reader.desc();

    let mut col_index_to_name: HashMap<usize, &'static str> = HashMap::new();
    let mut found_col_names: HashSet<&'static str> = HashSet::new();

    let col_names = CsvCol::get_csv_cols();

    let headers_res = csv_r
        .headers()
        .map_err(|e| format!("Error in csv headers of {csv_desc}: {e}"))?;
    for (i, col) in headers_res.iter().enumerate() {
        let lower_col = col.to_lowercase();
        let san_col = lower_col.trim();
        match col_names.get(san_col) {
            Some(static_str) => {
                if !found_col_names.insert(static_str) {
                    return Err(format!(
                        "{csv_desc} contains column '{san_col}' more than once"
                    ));
                }
                col_index_to_name.insert(i, static_str);
            }
            None => {
                write_errln!(
                    err_stream,
                    "Warning: Unrecognized column in {csv_desc}: {san_col}"
                );
            }
        }
    }

    let col_index_to_name = col_index_to_name;

    let mut txs = Vec::<CsvTx>::new();

    let mut global_row_index = initial_global_read_index;

    for (i, record_res) in csv_r.records().enumerate() {
        // Start at 1 for the user, and include header.
        let row_num = i + 2;

        let record = record_res.map_err(|e| {
            format!("Error reading csv record in {csv_desc} at row {row_num}: {e}")
        })?;

        let mut tx_values = HashMap::<&'static str, String>::new();
        for (i, col_val) in record.iter().enumerate() {
            if col_val.trim().is_empty() {
                continue;
            }
            // Columns which were not recognized are ignored.
            if let Some(col_name) = col_index_to_name.get(&i) {
                tx_values.insert(col_name, col_val.trim().to_string());
            }
        }

        let mut tx =
            csvtx_from_csv_values(tx_values, global_row_index, parse_options)
                .map_err(|e| format!("Error on row {row_num} of {csv_desc}: {e}"))?;
        if tx.id.is_none() {
            tx.id = Some((global_row_index + 1).to_string());
        }
        txs.push(tx);

        global_row_index += 1;
    }

    tracing::info!("parse_tx_csv: read {} rows from {}", txs.len(), csv_desc);
    Ok(txs)
}

fn cents_str(cents: f64) -> String {
    cents_to_dollars(cents)
        .map(|d| to_string_min_precision(&d, 2))
        .unwrap_or_else(|| cents.to_string())
}

fn date_str(date: &OffsetDateTime) -> String {
    if date.time() == Time::MIDNIGHT {
        return date.date().to_string();
    }
    date.format(&Rfc3339).unwrap_or_else(|_| date.date().to_string())
}

pub struct PlainCsvTable {
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

fn tx_csv_record(tx: &Tx, currency: &Currency, headers: &[&'static str]) -> Vec<String> {
    let specs = &tx.action_specifics;
    headers
        .iter()
        .map(|col| match *col {
            CsvCol::SECURITY => tx.security.clone(),
            CsvCol::ID => tx.id.to_string(),
            CsvCol::DATE => date_str(&tx.date),
            CsvCol::SORT_ORDER => tx.sort_order.to_string(),
            CsvCol::ACTION => tx.action().pretty_str().to_lowercase(),
            CsvCol::SHARES => specs
                .shares()
                .and_then(Decimal::from_f64)
                .map(|d| to_string_min_precision(&d, 0))
                .unwrap_or_default(),
            CsvCol::TOTAL_AMOUNT => match specs.shares() {
                Some(_) => cents_str(specs.total_amount() as f64),
                None => String::new(),
            },
            CsvCol::AMOUNT_PER_SHARE => {
                specs.amount_per_share().map(cents_str).unwrap_or_default()
            }
            CsvCol::COMMISSION => match specs.commission() {
                0 => String::new(),
                c => cents_str(c as f64),
            },
            CsvCol::CURRENCY => currency.to_string(),
            CsvCol::MEMO => tx.memo.clone(),
            _ => String::new(),
        })
        .collect()
}

pub fn ledgers_to_csv_table(ledgers: &[SecurityLedger]) -> PlainCsvTable {
    let header: Vec<&'static str> = CsvCol::export_order_cols().to_vec();
    let rows = ledgers
        .iter()
        .flat_map(|l| {
            l.ordered_txs()
                .iter()
                .map(|tx| tx_csv_record(tx, l.currency(), &header))
                .collect::<Vec<_>>()
        })
        .collect();
    PlainCsvTable { header, rows }
}

/// Writes ledgers in the same format read by parse_tx_csv.
pub fn write_ledgers_to_csv(
    ledgers: &[SecurityLedger],
    writer: &mut dyn std::io::Write,
) -> Result<(), csv::Error> {
    let table = ledgers_to_csv_table(ledgers);

    let mut csv_w = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    csv_w.write_record(&table.header)?;
    for row in &table.rows {
        csv_w.write_record(row)?;
    }
    csv_w.flush()?;
    Ok(())
}

#[cfg(test)]
pub mod testlib {
    use crate::util::rw::DescribedReader;

    pub fn csv_reader(lines: &[&str]) -> DescribedReader {
        let mut text = lines.join("\n");
        text.push('\n');
        DescribedReader::from_string("test.csv".to_string(), text)
    }
}

#[cfg(test)]
mod tests {
    use crate::portfolio::io::tx_loader::{load_ledgers, LedgerLoadOptions};
    use crate::portfolio::{Currency, TxAction};
    use crate::testlib::{assert_approx_eq, assert_re, assert_vec_eq};
    use crate::util::date::parse_dyn_date_format;
    use crate::util::date::pub_testlib::doy_datetime;
    use crate::util::rw::WriteHandle;

    use super::testlib::csv_reader;
    use super::{parse_tx_csv, write_ledgers_to_csv, TxCsvParseOptions};

    #[test]
    fn test_parse_tx_csv_basic() {
        let mut reader = csv_reader(&[
            "Security,ID,Date,Sort Order,Action,Shares,Total Amount,Amount/Share,Commission,Currency,Memo",
            "foo,b1,2024-01-03,1,Buy,10,1000.005,,9.99,usd,first buy",
            "foo,,2024-01-04,,return_of_capital,,,0.123,,,",
            "foo,,2024-01-05,,Reinvested Dividend,0.5,51.50,,,,",
        ]);
        let (mut err_stream, buff) = WriteHandle::string_buff_write_handle();
        let txs = parse_tx_csv(
            &mut reader, 10, &TxCsvParseOptions::default(), &mut err_stream).unwrap();
        assert_eq!(buff.borrow().as_str(), "");
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].security.as_deref(), Some("foo"));
        assert_eq!(txs[0].id.as_deref(), Some("b1"));
        assert_eq!(txs[0].date, Some(doy_datetime(2024, 2)));
        assert_eq!(txs[0].sort_order, Some(1));
        assert_eq!(txs[0].action, Some(TxAction::Buy));
        assert_eq!(txs[0].shares, Some(10.0));
        assert_eq!(txs[0].total_amount, Some(100001));
        assert_eq!(txs[0].commission, Some(999));
        assert_eq!(txs[0].currency, Some(Currency::usd()));
        assert_eq!(txs[0].memo.as_deref(), Some("first buy"));
        assert_eq!(txs[0].read_index, 10);

        assert_eq!(txs[1].id.as_deref(), Some("12"));
        assert_eq!(txs[1].sort_order, None);
        assert_eq!(txs[1].action, Some(TxAction::Roc));
        assert_eq!(txs[1].shares, None);
        assert_approx_eq(txs[1].amount_per_share.unwrap(), 12.3);
        assert_eq!(txs[1].currency, None);
        assert_eq!(txs[1].memo, None);

        assert_eq!(txs[2].action, Some(TxAction::RiDiv));
        assert_eq!(txs[2].total_amount, Some(5150));
    }

    #[test]
    fn test_custom_date_format() {
        let mut reader = csv_reader(&["security,date,action,shares", "FOO,03/01/2024,buy,1"]);
        let opts = TxCsvParseOptions {
            date_format: Some(parse_dyn_date_format("[day]/[month]/[year]").unwrap()),
        };
        let txs = parse_tx_csv(
            &mut reader, 0, &opts, &mut WriteHandle::empty_write_handle()).unwrap();
        assert_eq!(txs[0].date, Some(doy_datetime(2024, 2)));
    }

    #[test]
    fn test_unknown_columns() {
        let mut reader = csv_reader(&[
            "security,action,shares,Exchange Rate,split ratio",
            "FOO,buy,1,1.3,2-for-1",
        ]);
        let (mut err_stream, buff) = WriteHandle::string_buff_write_handle();
        let txs = parse_tx_csv(
            &mut reader, 0, &TxCsvParseOptions::default(), &mut err_stream).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(
            buff.borrow().as_str(),
            "Warning: Unrecognized column in test.csv: exchange rate\n\
             Warning: Unrecognized column in test.csv: split ratio\n"
        );
    }

    #[test]
    fn test_parse_tx_csv_fatal_errors() {
        let parse = |lines: &[&str]| {
            parse_tx_csv(
                &mut csv_reader(lines), 0, &TxCsvParseOptions::default(),
                &mut WriteHandle::empty_write_handle(),
            ).unwrap_err()
        };

        assert_eq!(
            parse(&["security,action", "FOO,split"]),
            "Error on row 2 of test.csv: Invalid action 'split'"
        );
        assert_re(
            r"^Error on row 3 of test.csv: Failed to parse number for shares \('x'\)",
            &parse(&["security,shares", "FOO,1", "FOO,x"]),
        );
        assert_re(
            r#"^Error on row 2 of test.csv: Failed to parse date "2024-13-01""#,
            &parse(&["security,date", "FOO,2024-13-01"]),
        );
        assert_re(
            r"^Error on row 2 of test.csv: Failed to parse sort order \('1.5'\)",
            &parse(&["security,sort order", "FOO,1.5"]),
        );
        assert_eq!(
            parse(&["security,Security", "FOO,BAR"]),
            "test.csv contains column 'security' more than once"
        );
        assert_re(
            r"^Error reading csv record in test.csv at row 2",
            &parse(&["security,shares", "FOO,1,2"]),
        );
    }

    #[test]
    fn test_write_ledgers_to_csv() {
        let mut reader = csv_reader(&[
            "security,id,date,sort order,action,shares,total amount,amount/share,commission,currency,memo",
            "FOO,a,2024-01-03,1,buy,10,1000,,9.99,USD,first",
            "FOO,b,2024-01-04T12:30:00Z,2,roc,,,0.12,,USD,",
            "FOO,c,2024-01-05,3,sell,2.5,300.10,,,USD,",
        ]);
        let csv_txs = parse_tx_csv(
            &mut reader, 0, &TxCsvParseOptions::default(),
            &mut WriteHandle::empty_write_handle()).unwrap();
        let ledgers = load_ledgers(csv_txs, &LedgerLoadOptions::default()).unwrap();

        let mut out = Vec::<u8>::new();
        write_ledgers_to_csv(&ledgers, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_vec_eq(lines, vec![
            "security,id,date,sort order,action,shares,total amount,amount/share,commission,currency,memo",
            "FOO,a,2024-01-03,1,buy,10,1000.00,,9.99,USD,first",
            "FOO,b,2024-01-04T12:30:00Z,2,roc,,,0.12,,USD,",
            "FOO,c,2024-01-05,3,sell,2.5,300.10,,,USD,",
        ]);
    }
}
