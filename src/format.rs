//! Display strings shared by the KPI cards and chart labels.

/// Rounds half-way values toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// `"5m 0s"` from whole seconds.
pub fn duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// `"+$1,234"` or `"-$56"`.
pub fn signed_currency(amount: i64) -> String {
    let sign = if amount >= 0 { "+" } else { "-" };
    format!("{sign}${}", grouped(amount.unsigned_abs()))
}

/// `"$1,234"` or `"-$56"`.
pub fn currency(amount: i64) -> String {
    if amount < 0 {
        format!("-${}", grouped(amount.unsigned_abs()))
    } else {
        format!("${}", grouped(amount.unsigned_abs()))
    }
}

pub fn one_decimal(value: f64) -> String {
    format!("{value:.1}")
}

pub fn attempts_label(attempts: u32) -> String {
    if attempts == 1 {
        "1 attempt".to_string()
    } else {
        format!("{attempts} attempts")
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(0.0, 1), 0.0);
    }

    #[test]
    fn duration_display() {
        assert_eq!(duration(300), "5m 0s");
        assert_eq!(duration(59), "0m 59s");
        assert_eq!(duration(3725), "62m 5s");
    }

    #[test]
    fn currency_display() {
        assert_eq!(signed_currency(150), "+$150");
        assert_eq!(signed_currency(0), "+$0");
        assert_eq!(signed_currency(-1234567), "-$1,234,567");
        assert_eq!(currency(1000), "$1,000");
        assert_eq!(currency(-999), "-$999");
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html(r#"<b class="x">Tom & Jerry's</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn attempt_labels() {
        assert_eq!(attempts_label(1), "1 attempt");
        assert_eq!(attempts_label(0), "0 attempts");
        assert_eq!(attempts_label(3), "3 attempts");
    }
}
