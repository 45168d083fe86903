use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal flag, accepting the Brazilian comma form.
///
/// `8,47` reads as `8.47`. When both separators appear (`1.234,56`) the dots
/// are thousands separators and are dropped.
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    Decimal::from_str(&normalized).map_err(|e| format!("invalid decimal '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_dot_and_comma_decimals() {
        assert_eq!(parse_decimal("8.47").unwrap(), dec!(8.47));
        assert_eq!(parse_decimal("8,47").unwrap(), dec!(8.47));
        assert_eq!(parse_decimal(" 250000 ").unwrap(), dec!(250000));
        assert_eq!(parse_decimal("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("-0,5").unwrap(), dec!(-0.5));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_decimal("8,4,7").is_err());
        assert!(parse_decimal("abc").is_err());
    }
}
