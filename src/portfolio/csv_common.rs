use std::collections::HashSet;

pub struct CsvCol();
impl CsvCol {
    pub const SECURITY: &'static str = "security";
    pub const ID: &'static str = "id";
    pub const DATE: &'static str = "date";
    pub const SORT_ORDER: &'static str = "sort order";
    pub const ACTION: &'static str = "action";
    pub const SHARES: &'static str = "shares";
    pub const TOTAL_AMOUNT: &'static str = "total amount";
    pub const AMOUNT_PER_SHARE: &'static str = "amount/share";
    pub const COMMISSION: &'static str = "commission";
    pub const CURRENCY: &'static str = "currency";
    pub const MEMO: &'static str = "memo";

    pub fn get_csv_cols() -> HashSet<&'static str> {
        HashSet::from(CsvCol::export_order_cols())
    }

    pub fn export_order_cols() -> [&'static str; 11] {
        [
            CsvCol::SECURITY,
            CsvCol::ID,
            CsvCol::DATE,
            CsvCol::SORT_ORDER,
            CsvCol::ACTION,
            CsvCol::SHARES,
            CsvCol::TOTAL_AMOUNT,
            CsvCol::AMOUNT_PER_SHARE,
            CsvCol::COMMISSION,
            CsvCol::CURRENCY,
            CsvCol::MEMO,
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::portfolio::csv_common::CsvCol;

    #[test]
    fn test_export_order_cols() {
        let cols = CsvCol::export_order_cols();
        assert_eq!(CsvCol::get_csv_cols().len(), cols.len());
        assert_eq!(cols[0], CsvCol::SECURITY);
    }
}
