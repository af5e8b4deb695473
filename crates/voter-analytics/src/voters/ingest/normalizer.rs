use chrono::NaiveDate;

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const TRUTHY: [&str; 5] = ["TRUE", "T", "YES", "Y", "1"];

pub(crate) fn clean_text(value: &str) -> String {
    value.trim().to_string()
}

pub(crate) fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accepts `MM/DD/YYYY` or `YYYY-MM-DD`; anything else is treated as absent.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

pub(crate) fn parse_flag(value: &str) -> bool {
    let normalized = value.trim().to_ascii_uppercase();
    TRUTHY.contains(&normalized.as_str())
}

/// Empty scores default to zero. `None` means the value is present but not a
/// non-negative integer.
pub(crate) fn parse_score(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse::<u32>().ok()
}
