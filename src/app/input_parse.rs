use std::collections::HashMap;

use crate::portfolio::{ledger::normalize_security_name, Currency, Security};

pub type Error = String;

/// Takes a list of security currency strings, each formatted as:
/// SYM:CURRENCY. Eg. VFV:CAD
pub fn parse_security_currencies(
    security_currencies: &Vec<String>,
) -> Result<HashMap<Security, Currency>, Error> {
    let mut currencies = HashMap::<Security, Currency>::with_capacity(
        security_currencies.len());
    for opt in security_currencies {
        let (symbol, curr) = opt
            .split_once(':')
            .ok_or_else(|| format!("Invalid security currency format '{opt}'"))?;
        let symbol = normalize_security_name(symbol)
            .map_err(|e| format!("Invalid security currency '{opt}'. {e}"))?;
        let curr = Currency::try_new(curr)
            .map_err(|e| format!("Invalid security currency '{opt}'. {e}"))?;

        if let Some(prev) = currencies.get(&symbol) {
            if *prev != curr {
                return Err(format!(
                    "Conflicting currencies for {symbol} ({prev} and {curr})"));
            }
        }
        currencies.insert(symbol, curr);
    }

    Ok(currencies)
}

#[cfg(test)]
mod tests {
    use crate::portfolio::Currency;

    use super::parse_security_currencies;

    #[test]
    fn test_parse_security_currencies() {
        let res = parse_security_currencies(&vec![
            "vfv:cad".to_string(),
            " SPY : usd".to_string(),
            "SPY:USD".to_string(),
        ]).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res["VFV"], Currency::cad());
        assert_eq!(res["SPY"], Currency::usd());

        // Errors
        assert_eq!(
            parse_security_currencies(&vec!["FOO".to_string()]).unwrap_err(),
            "Invalid security currency format 'FOO'");
        assert_eq!(
            parse_security_currencies(&vec![":USD".to_string()]).unwrap_err(),
            "Invalid security currency ':USD'. Security name cannot be empty");
        assert_eq!(
            parse_security_currencies(&vec!["FOO: ".to_string()]).unwrap_err(),
            "Invalid security currency 'FOO: '. Currency cannot be empty");
        assert_eq!(
            parse_security_currencies(&vec![
                "FOO:USD".to_string(), "foo:CAD".to_string()]).unwrap_err(),
            "Conflicting currencies for FOO (USD and CAD)");
    }
}
