use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;

use super::bookkeeping::{compute_acb, AcbResult, SecuritySummary};
use super::{
    sort_txs_by_sort_order, Currency, Security, Tx, TxActionSpecifics, TxId,
};

type Error = String;

/// An in-memory, ordered ledger of the transactions of a single security.
///
/// Txs are always kept in ascending sort_order, so ordered_txs() can be fed
/// directly to compute_acb.
#[derive(Clone, Debug)]
pub struct SecurityLedger {
    security: Security,
    currency: Currency,
    txs: Vec<Tx>,
}

lazy_static! {
    static ref EXTRA_SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Trims, upper-cases, and collapses inner whitespace to a single space.
pub fn normalize_security_name(name: &str) -> Result<Security, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Security name cannot be empty".to_string());
    }
    Ok(EXTRA_SPACE_RE.replace_all(name, " ").to_uppercase())
}

impl SecurityLedger {
    pub fn new(security: &str, currency: &str) -> Result<SecurityLedger, Error> {
        Ok(SecurityLedger {
            security: normalize_security_name(security)?,
            currency: Currency::try_new(currency)?,
            txs: Vec::new(),
        })
    }

    pub fn security(&self) -> &str {
        &self.security
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn ordered_txs(&self) -> &[Tx] {
        &self.txs
    }

    pub fn get(&self, id: &TxId) -> Option<&Tx> {
        self.txs.iter().find(|tx| tx.id == *id)
    }

    fn index_of(&self, id: &TxId) -> Result<usize, Error> {
        self.txs
            .iter()
            .position(|tx| tx.id == *id)
            .ok_or_else(|| format!("No transaction with id {} in {}", id, self.security))
    }

    fn next_sort_order(&self) -> i64 {
        self.txs.iter().map(|tx| tx.sort_order).max().unwrap_or(0) + 1
    }

    fn check_new_tx(&self, tx: &Tx) -> Result<(), Error> {
        if normalize_security_name(&tx.security)? != self.security {
            return Err(format!(
                "Transaction {} is for {}, not {}",
                tx.id, tx.security, self.security
            ));
        }
        if self.get(&tx.id).is_some() {
            return Err(format!(
                "Duplicate transaction id {} in {}",
                tx.id, self.security
            ));
        }
        Ok(())
    }

    /// Adds tx at the end of the ledger. Its sort_order is replaced with
    /// one past the current maximum.
    pub fn append(&mut self, mut tx: Tx) -> Result<&Tx, Error> {
        self.check_new_tx(&tx)?;
        tx.security = self.security.clone();
        tx.sort_order = self.next_sort_order();
        tracing::debug!(
            "SecurityLedger::append: {} {} at {}",
            self.security, tx.id, tx.sort_order
        );
        self.txs.push(tx);
        Ok(&self.txs[self.txs.len() - 1])
    }

    /// Adds tx, keeping its sort_order. A tx with the same sort_order as
    /// existing ones is placed after them.
    pub fn insert(&mut self, mut tx: Tx) -> Result<(), Error> {
        self.check_new_tx(&tx)?;
        tx.security = self.security.clone();
        let pos = self.txs.partition_point(|t| t.sort_order <= tx.sort_order);
        self.txs.insert(pos, tx);
        Ok(())
    }

    /// Replaces the date and action of an existing tx. Its position in the
    /// ledger is unchanged.
    pub fn update(
        &mut self,
        id: &TxId,
        date: OffsetDateTime,
        action_specifics: TxActionSpecifics,
    ) -> Result<(), Error> {
        let idx = self.index_of(id)?;
        let tx = &mut self.txs[idx];
        tx.date = date;
        tx.action_specifics = action_specifics;
        Ok(())
    }

    pub fn set_memo(&mut self, id: &TxId, memo: &str) -> Result<(), Error> {
        let idx = self.index_of(id)?;
        self.txs[idx].memo = memo.to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: &TxId) -> Result<Tx, Error> {
        let idx = self.index_of(id)?;
        Ok(self.txs.remove(idx))
    }

    /// Assigns sort orders 1..=n to the listed txs, in list order.
    /// Txs not listed keep their current sort order.
    pub fn reorder(&mut self, ids: &[TxId]) -> Result<(), Error> {
        if let Some(dup) = ids.iter().duplicates().next() {
            return Err(format!("Transaction {} is listed more than once", dup));
        }
        for id in ids {
            self.index_of(id)?;
        }

        for (i, id) in ids.iter().enumerate() {
            let idx = self.index_of(id)?;
            self.txs[idx].sort_order = i as i64 + 1;
        }
        sort_txs_by_sort_order(&mut self.txs);
        Ok(())
    }

    pub fn compute_acb(&self) -> AcbResult {
        compute_acb(&self.txs, &self.currency)
    }

    pub fn summary(&self) -> SecuritySummary {
        self.compute_acb().summary()
    }
}
