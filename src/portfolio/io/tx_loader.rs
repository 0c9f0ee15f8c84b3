use std::collections::{BTreeMap, HashMap};

use crate::portfolio::ledger::normalize_security_name;
use crate::portfolio::{CsvTx, Currency, Security, SecurityLedger, Tx};

type Error = String;

#[derive(Default)]
pub struct LedgerLoadOptions {
    // Used for securities whose rows do not specify a currency.
    pub default_currency: Currency,
    pub security_currencies: HashMap<Security, Currency>,
}

fn resolve_currency(
    security: &str,
    csv_txs: &[CsvTx],
    options: &LedgerLoadOptions,
) -> Result<Currency, Error> {
    let mut found: Option<Currency> = options.security_currencies.get(security).cloned();
    for tx in csv_txs {
        let Some(curr) = &tx.currency else { continue };
        match &found {
            Some(f) if f != curr => {
                return Err(format!(
                    "Transactions of {} have mixed currencies ({} and {})",
                    security, f, curr
                ));
            }
            Some(_) => (),
            None => found = Some(curr.clone()),
        }
    }
    Ok(found.unwrap_or_else(|| options.default_currency.clone()))
}

fn tx_id_for_err(csv_tx: &CsvTx) -> String {
    csv_tx.id.clone().unwrap_or_else(|| format!("#{}", csv_tx.read_index + 1))
}

/// Groups CsvTxs by security and validates them into ledgers, sorted
/// by security.
///
/// Within a security, rows with an explicit sort order are placed first,
/// and the remaining rows are then appended in the order they were read.
pub fn load_ledgers(
    mut csv_txs: Vec<CsvTx>,
    options: &LedgerLoadOptions,
) -> Result<Vec<SecurityLedger>, Error> {
    csv_txs.sort_by_key(|t| t.read_index);

    let mut by_security = BTreeMap::<Security, Vec<CsvTx>>::new();
    for csv_tx in csv_txs {
        let security = normalize_security_name(
            csv_tx.security.as_deref().unwrap_or_default(),
        )
        .map_err(|e| format!("Invalid transaction {}: {}", tx_id_for_err(&csv_tx), e))?;
        by_security.entry(security).or_default().push(csv_tx);
    }

    let mut ledgers = Vec::with_capacity(by_security.len());
    for (security, sec_csv_txs) in by_security {
        let currency = resolve_currency(&security, &sec_csv_txs, options)?;
        let mut ledger = SecurityLedger::new(&security, currency.as_str())?;

        let mut to_append = Vec::<Tx>::new();
        for csv_tx in sec_csv_txs {
            let id = tx_id_for_err(&csv_tx);
            let has_sort_order = csv_tx.sort_order.is_some();
            let tx = Tx::try_from(csv_tx)
                .map_err(|e| format!("Invalid transaction {} of {}: {}", id, security, e))?;
            if has_sort_order {
                ledger.insert(tx)?;
            } else {
                to_append.push(tx);
            }
        }
        for tx in to_append {
            ledger.append(tx)?;
        }

        tracing::info!(
            "load_ledgers: loaded {} transactions of {} ({})",
            ledger.len(), security, currency
        );
        ledgers.push(ledger);
    }

    Ok(ledgers)
}
