use chrono::{Datelike, Days, Duration, Local, NaiveDate, Weekday};

/// Weekday names and abbreviations, scanned in this order. The scan is a
/// substring test, so the first entry found in the text wins even if the text
/// names several days.
const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("mon", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("tue", Weekday::Tue),
    ("tues", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("wed", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("thu", Weekday::Thu),
    ("thur", Weekday::Thu),
    ("thurs", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("fri", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sat", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("sun", Weekday::Sun),
];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a free-text due date relative to the local calendar day.
///
/// Returns `None` for anything it does not recognise; callers treat that as
/// "no due date".
pub fn parse_due_date(input: &str) -> Option<NaiveDate> {
    parse_due_date_on(input, today())
}

/// Same as [`parse_due_date`] with an explicit reference day.
///
/// Forms are tried in order, first match wins:
/// `YYYY-MM-DD`, `today`/`tomorrow`/`yesterday`, `in N day(s)`,
/// `in a week`/`in N week(s)`, `next week`, `end of week`/`eow`,
/// `end of month`/`eom`, `end of day`/`eod`, then weekday names with an
/// optional `next` or `this` qualifier.
pub fn parse_due_date_on(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = input.trim().to_lowercase();

    // 1. ISO date
    if is_iso_shaped(&text) {
        if let Ok(d) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            return Some(d);
        }
    }

    // 2. Reserved keywords
    match text.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    // 3. Relative days / weeks
    if let Some(count) = relative_count(&text, "day", false) {
        return today.checked_add_days(Days::new(count));
    }
    if let Some(count) = relative_count(&text, "week", true) {
        return today.checked_add_days(Days::new(count.checked_mul(7)?));
    }

    // 4. Named anchors
    match text.as_str() {
        "next week" => return Some(next_monday(today)),
        "end of week" | "eow" => return Some(end_of_week(today)),
        "end of month" | "eom" => return end_of_month(today),
        "end of day" | "eod" => return Some(today),
        _ => {}
    }

    // 5. Weekday phrases (fri, next fri, this fri)
    parse_weekday_phrase(&text, today)
}

fn is_iso_shaped(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Matches `in N <unit>` / `in N <unit>s` at the start of the text. With
/// `allow_article`, `in a <unit>` counts as one. Anything after the unit is
/// ignored.
fn relative_count(text: &str, unit: &str, allow_article: bool) -> Option<u64> {
    let rest = text.strip_prefix("in ")?;
    let (count_str, tail) = rest.split_once(' ')?;
    if !tail.starts_with(unit) {
        return None;
    }
    if allow_article && count_str == "a" {
        return Some(1);
    }
    if count_str.is_empty() || !count_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    count_str.parse().ok()
}

/// The Monday strictly after `today`.
fn next_monday(today: NaiveDate) -> NaiveDate {
    let mut days = (7 - today.weekday().num_days_from_monday() as i64) % 7;
    if days == 0 {
        days = 7;
    }
    today + Duration::days(days)
}

/// The coming Friday, or `today` when it already is Friday.
fn end_of_week(today: NaiveDate) -> NaiveDate {
    let days = (Weekday::Fri.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    today + Duration::days(days)
}

fn end_of_month(today: NaiveDate) -> Option<NaiveDate> {
    let first_of_next = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
    };
    first_of_next.pred_opt()
}

fn parse_weekday_phrase(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (_, target) = WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| text.contains(name))?;

    let mut days_ahead = target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64;

    if text.contains("next") {
        // The occurrence after the upcoming one.
        if days_ahead <= 0 {
            days_ahead += 7;
        }
        days_ahead += 7;
    } else if text.contains("this") {
        // Monday-to-Sunday week containing today; may be in the past.
    } else if days_ahead <= 0 {
        days_ahead += 7;
    }

    Some(today + Duration::days(days_ahead))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2026-10-21 is a Wednesday.
    fn wed() -> NaiveDate {
        d(2026, 10, 21)
    }

    #[test]
    fn test_iso_format() {
        assert_eq!(parse_due_date_on("2026-01-20", wed()), Some(d(2026, 1, 20)));
        assert_eq!(parse_due_date_on("  2024-02-29 ", wed()), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_invalid_iso_is_none() {
        assert_eq!(parse_due_date_on("2025-02-30", wed()), None);
        assert_eq!(parse_due_date_on("2025-13-01", wed()), None);
        assert_eq!(parse_due_date_on("2025-1-5", wed()), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_due_date_on("today", wed()), Some(wed()));
        assert_eq!(parse_due_date_on("TOMORROW", wed()), Some(d(2026, 10, 22)));
        assert_eq!(parse_due_date_on("Yesterday", wed()), Some(d(2026, 10, 20)));
        assert_eq!(parse_due_date_on("eod", wed()), Some(wed()));
        assert_eq!(parse_due_date_on("end of day", wed()), Some(wed()));
    }

    #[test]
    fn test_relative_days_and_weeks() {
        assert_eq!(parse_due_date_on("in 3 days", wed()), Some(d(2026, 10, 24)));
        assert_eq!(parse_due_date_on("in 1 day", wed()), Some(d(2026, 10, 22)));
        assert_eq!(parse_due_date_on("in 0 days", wed()), Some(wed()));
        assert_eq!(parse_due_date_on("in a week", wed()), Some(d(2026, 10, 28)));
        assert_eq!(parse_due_date_on("in 2 weeks", wed()), Some(d(2026, 11, 4)));
        assert_eq!(parse_due_date_on("in some days", wed()), None);
    }

    #[test]
    fn test_next_week_is_following_monday() {
        assert_eq!(parse_due_date_on("next week", wed()), Some(d(2026, 10, 26)));
        // From a Monday it jumps a full week.
        assert_eq!(parse_due_date_on("next week", d(2026, 10, 19)), Some(d(2026, 10, 26)));
    }

    #[test]
    fn test_end_of_week() {
        assert_eq!(parse_due_date_on("end of week", wed()), Some(d(2026, 10, 23)));
        assert_eq!(parse_due_date_on("eow", d(2026, 10, 23)), Some(d(2026, 10, 23)));
        assert_eq!(parse_due_date_on("eow", d(2026, 10, 24)), Some(d(2026, 10, 30)));
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(parse_due_date_on("eom", d(2026, 2, 15)), Some(d(2026, 2, 28)));
        assert_eq!(parse_due_date_on("end of month", d(2026, 12, 20)), Some(d(2026, 12, 31)));
        assert_eq!(parse_due_date_on("eom", d(2024, 2, 1)), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_bare_weekday_is_strictly_future() {
        assert_eq!(parse_due_date_on("friday", wed()), Some(d(2026, 10, 23)));
        assert_eq!(parse_due_date_on("mon", wed()), Some(d(2026, 10, 26)));
        assert_eq!(parse_due_date_on("wednesday", wed()), Some(d(2026, 10, 28)));
    }

    #[test]
    fn test_next_weekday() {
        assert_eq!(parse_due_date_on("next friday", wed()), Some(d(2026, 10, 30)));
        assert_eq!(parse_due_date_on("next wednesday", wed()), Some(d(2026, 11, 4)));
        assert_eq!(parse_due_date_on("next monday", wed()), Some(d(2026, 11, 2)));
    }

    #[test]
    fn test_this_weekday_stays_in_current_week() {
        assert_eq!(parse_due_date_on("this friday", wed()), Some(d(2026, 10, 23)));
        assert_eq!(parse_due_date_on("this monday", wed()), Some(d(2026, 10, 19)));
        assert_eq!(parse_due_date_on("this wed", wed()), Some(wed()));
    }

    #[test]
    fn test_weekday_substring_quirks() {
        // Enumeration order decides between several names.
        assert_eq!(parse_due_date_on("friday or monday", wed()), Some(d(2026, 10, 26)));
        // "month" contains "mon".
        assert_eq!(parse_due_date_on("next month", wed()), Some(d(2026, 11, 2)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_due_date_on("gibberish", wed()), None);
        assert_eq!(parse_due_date_on("", wed()), None);
    }

    #[test]
    fn test_parse_due_date_uses_local_today() {
        assert_eq!(parse_due_date("today"), Some(today()));
    }
}
