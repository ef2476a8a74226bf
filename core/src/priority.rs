use chrono::NaiveDate;

use crate::model::task::Priority;
use crate::time::today;

const HIGH_KEYWORDS: &[&str] = &[
    "urgent", "asap", "critical", "emergency", "important", "deadline", "must", "blocker", "p0",
    "p1",
];

const MEDIUM_KEYWORDS: &[&str] = &["soon", "this week", "review", "follow up", "check"];

const WORK_TAGS: &[&str] = &["work", "job", "meeting", "project"];

/// Guesses a priority from the title, due date and tags, relative to today.
pub fn infer_priority(title: &str, due: Option<NaiveDate>, tags: &[String]) -> Priority {
    infer_priority_on(title, due, tags, today())
}

/// Rules, first hit wins:
/// 1. high keyword in the title (substring) or as a whole tag
/// 2. due today or earlier
/// 3. due within the next 7 days
/// 4. medium keyword in the title
/// 5. work-ish tag
/// 6. otherwise low
pub fn infer_priority_on(
    title: &str,
    due: Option<NaiveDate>,
    tags: &[String],
    today: NaiveDate,
) -> Priority {
    let title = title.to_lowercase();
    let tags: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();

    if HIGH_KEYWORDS
        .iter()
        .any(|k| title.contains(k) || tags.iter().any(|t| t == k))
    {
        return Priority::High;
    }

    if let Some(due) = due {
        let days_until = (due - today).num_days();
        if days_until <= 0 {
            return Priority::High;
        }
        if days_until <= 7 {
            return Priority::Medium;
        }
    }

    if MEDIUM_KEYWORDS.iter().any(|k| title.contains(k)) {
        return Priority::Medium;
    }

    if WORK_TAGS.iter().any(|w| tags.iter().any(|t| t == w)) {
        return Priority::Medium;
    }

    Priority::Low
}
