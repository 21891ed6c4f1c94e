/// Whole US dollars with thousands separators, e.g. `$1,234,567`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// A fraction rendered as a percentage, e.g. `0.125` with one digit is `12.5%`.
pub fn format_percentage(value: f64, digits: usize) -> String {
    format!("{:.*}%", digits, value * 100.0)
}

pub fn format_ratio(value: f64) -> String {
    format!("{value:.2}x")
}
