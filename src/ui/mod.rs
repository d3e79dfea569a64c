//! Presentation layer: sidebar, KPI strip, charts, tables.

pub mod panels;
pub mod plot;
pub mod table;

/// Brazilian money formatting: `1234567.89` → `1.234.567,89`.
pub fn format_money(v: f64) -> String {
    let raw = format!("{:.2}", v.abs());
    let (int_part, frac) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{},{frac}", group_thousands(int_part))
}

/// Count formatting with `.` thousands separators: `12345` → `12.345`.
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_uses_brazilian_separators() {
        assert_eq!(format_money(1234567.891), "1.234.567,89");
        assert_eq!(format_money(0.0), "0,00");
        assert_eq!(format_money(-42.5), "-42,50");
        assert_eq!(format_money(999.0), "999,00");
    }

    #[test]
    fn counts_group_thousands() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1234), "1.234");
        assert_eq!(format_count(1234567), "1.234.567");
    }
}
