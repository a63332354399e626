//! Value formatting shared by the templates.

use chrono::{DateTime, FixedOffset, Utc};

/// Split user text into lines; templates join them with `<br />`.
#[must_use]
pub fn text_lines(s: &str) -> Vec<String> {
    s.replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(str::to_string)
        .collect()
}

/// Human-readable age of a timestamp ("5 minutes ago").
#[must_use]
pub fn relative_time(then: &DateTime<FixedOffset>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(then.with_timezone(&Utc)).num_seconds();
    if seconds < 1 {
        return "just now".to_string();
    }

    let (count, unit) = match seconds {
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 604_800 => (s / 86_400, "day"),
        s if s < 2_592_000 => (s / 604_800, "week"),
        s if s < 31_536_000 => (s / 2_592_000, "month"),
        s => (s / 31_536_000, "year"),
    };

    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
