//! Rupee amount formatting

/// Currency symbol used when rendering amounts
pub const CURRENCY_SYMBOL: &str = "₹";

/// Format an amount as `₹1,234.50`, or `-₹1,234.50` for negatives
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!(
        "{}{}{}.{}",
        sign,
        CURRENCY_SYMBOL,
        group_thousands(whole),
        fraction
    )
}

/// Insert commas every three digits from the right
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_positive() {
        assert_eq!(format_currency(1234.5), "₹1,234.50");
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(999.999), "₹1,000.00");
        assert_eq!(format_currency(1234567.891), "₹1,234,567.89");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_currency(-1234.5), "-₹1,234.50");
        assert_eq!(format_currency(-15.0), "-₹15.00");
    }

    #[test]
    fn test_format_rounds_to_zero_without_sign() {
        assert_eq!(format_currency(-0.001), "₹0.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
