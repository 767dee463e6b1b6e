//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "DD MMM YYYY", "pt") // -> "15 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, locale: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    // Month-name tokens are substituted with sentinels so that chrono's own
    // (English-only) month formatting never kicks in.
    let format = format.replace("MMMM", "\u{1}").replace("MMM", "\u{2}");
    let chrono_format = moment_to_chrono_format(&format);
    let rendered = date.format(&chrono_format).to_string();

    let month = date.month0() as usize;
    rendered
        .replace('\u{1}', month_name(locale, month))
        .replace('\u{2}', month_abbr(locale, month))
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Format a publication timestamp for display: convert into the configured
/// timezone, then apply the localized display format
pub fn display_date(
    date: &DateTime<FixedOffset>,
    timezone: &str,
    format: &str,
    locale: &str,
) -> String {
    match timezone.parse::<chrono_tz::Tz>() {
        Ok(tz) => format_date(&date.with_timezone(&tz), format, locale),
        Err(_) => format_date(date, format, locale),
    }
}

/// Parse a timestamp as the content API emits it
///
/// The API writes offsets without a colon (`+0000`), which RFC 3339 parsing
/// rejects, so that form is tried first.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Two-digit month (month names are handled before this runs)
        ("MM", "%m"),
        // Day of month
        ("DD", "%d"),
        ("D", "%-d"),
        // Hour
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
        // Timezone
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}

/// Abbreviated month name for a zero-based month index
fn month_abbr(locale: &str, month0: usize) -> &'static str {
    const PT: [&str; 12] = [
        "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
    ];
    const EN: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let table = if locale.starts_with("pt") { &PT } else { &EN };
    table[month0.min(11)]
}

/// Full month name for a zero-based month index
fn month_name(locale: &str, month0: usize) -> &'static str {
    const PT: [&str; 12] = [
        "janeiro",
        "fevereiro",
        "março",
        "abril",
        "maio",
        "junho",
        "julho",
        "agosto",
        "setembro",
        "outubro",
        "novembro",
        "dezembro",
    ];
    const EN: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    let table = if locale.starts_with("pt") { &PT } else { &EN };
    table[month0.min(11)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_timestamp() {
        let date = parse_timestamp("2021-03-15T19:25:28+0000").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-03-15T19:25:28+00:00");
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        assert!(parse_timestamp("2021-03-15T19:25:28+00:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_format_date_localized() {
        let date = parse_timestamp("2021-03-15T19:25:28+0000").unwrap();
        assert_eq!(format_date(&date, "DD MMM YYYY", "pt"), "15 mar 2021");
        assert_eq!(format_date(&date, "DD MMM YYYY", "en"), "15 Mar 2021");
        assert_eq!(format_date(&date, "DD MMMM YYYY", "pt"), "15 março 2021");
    }

    #[test]
    fn test_display_date_converts_timezone() {
        // 01:00 UTC is still the previous evening in São Paulo
        let date = parse_timestamp("2021-03-16T01:00:00+0000").unwrap();
        assert_eq!(
            display_date(&date, "America/Sao_Paulo", "DD MMM YYYY", "pt"),
            "15 mar 2021"
        );
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }

    #[test]
    fn test_date_xml() {
        let date = parse_timestamp("2021-03-15T19:25:28+0000").unwrap();
        assert_eq!(date_xml(&date), "2021-03-15T19:25:28+00:00");
    }
}
