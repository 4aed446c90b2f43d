//! Currency formatting for display
//!
//! Amounts are plain `f64` magnitudes. Currencies are labels only: nothing
//! here converts between them.

/// Replace NaN and infinities with 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Floor a year or quantity divisor to 1
///
/// Zero, negative and NaN values all give 1.
pub fn divisor(value: f64) -> f64 {
    // f64::max returns the other operand when one side is NaN
    value.max(1.0)
}

/// Display symbol for a currency code, if it has a well-known one
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_uppercase().as_str() {
        "JPY" => Some("¥"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "CNY" => Some("CN¥"),
        "KRW" => Some("₩"),
        _ => None,
    }
}

/// Format with no fraction digits, e.g. `¥3,504`
pub fn format_currency(value: f64, currency: &str) -> String {
    format_amount(value, currency, 0)
}

/// Format with `digits` fraction digits and thousands separators
pub fn format_amount(value: f64, currency: &str, digits: usize) -> String {
    let value = finite_or_zero(value);
    let number = group_thousands(value.abs(), digits);
    let sign = if value < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None if currency.trim().is_empty() => format!("{}{}", sign, number),
        None => format!("{}{} {}", sign, currency.trim().to_uppercase(), number),
    }
}

/// Plain number with thousands separators and fixed fraction digits
pub fn group_thousands(value: f64, digits: usize) -> String {
    let formatted = format!("{:.*}", digits, finite_or_zero(value));
    let (negative, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, formatted.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
