use rust_decimal::Decimal;

/// Formats a monetary estimate for reports as `NGN 1,234,567.89`.
///
/// Absent values render as `N/A`, matching every other optional column in
/// the export tables.
pub fn format_ngn(amount: Option<Decimal>) -> String {
    match amount {
        Some(value) => format!("NGN {}", thousands(value)),
        None => "N/A".to_string(),
    }
}

/// Renders a decimal with two fixed decimal places and `,` thousands
/// separators in the integer part.
fn thousands(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let raw = format!("{:.2}", rounded);

    let (number, negative) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw.as_str(), false),
    };
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
