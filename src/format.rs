//! Number formatting used in the report text and chart labels.

/// Formats an amount as dollars with thousands separators, e.g. `$12,345.60`.
pub fn currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }
    let fixed = format!("{:.2}", amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("${}{}.{}", sign, group_thousands(whole), fraction)
}

/// Formats an amount as dollars without separators, e.g. `$12345.60`.
pub fn currency_compact(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
