//! Baseline detection patterns.

use super::Category;

/// Honorific followed by two or more capitalized tokens ("Dr. Jane Doe").
pub const HONORIFIC_NAME: &str =
    r"\b(?:Dr|Mr|Mrs|Ms|Miss|Mx|Prof)\.?\s+[A-Z][a-z]+(?:[\s-]+[A-Z][a-z]+)+\b";

/// Two or three capitalized tokens ("Jane Doe", "Mary Ann Smith").
pub const BARE_NAME: &str = r"\b[A-Z][a-z]+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\b";

/// Slash-delimited dates ("01/15/2023", "3/7/85").
pub const SLASH_DATE: &str = r"\b\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})\b";

/// Long-form month-first dates ("January 15, 2023").
pub const LONG_DATE_MONTH_FIRST: &str = r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b";

/// Long-form day-first dates ("15 January 2023").
pub const LONG_DATE_DAY_FIRST: &str = r"\b\d{1,2}(?:st|nd|rd|th)?\s+(?:January|February|March|April|May|June|July|August|September|October|November|December),?\s+\d{4}\b";

/// ISO-8601 calendar dates ("2023-01-15").
pub const ISO_DATE: &str = r"\b\d{4}-\d{2}-\d{2}\b";

/// Institution and organization terms matched case-insensitively.
pub const DEFAULT_INSTITUTION_TERMS: &[&str] = &[
    "Medical Center",
    "Health System",
    "Medical Group",
    "Hospital",
    "Clinic",
    "Infirmary",
    "Health Center",
    "Rehabilitation Center",
    "Nursing Home",
    "University",
    "Institute",
];

/// Baseline regex rules in evaluation order. Institution terms follow them.
pub(super) fn default_patterns() -> [(&'static str, Category, &'static str); 6] {
    [
        ("honorific_name", Category::Name, HONORIFIC_NAME),
        ("bare_name", Category::Name, BARE_NAME),
        ("slash_date", Category::Date, SLASH_DATE),
        ("long_date_month_first", Category::Date, LONG_DATE_MONTH_FIRST),
        ("long_date_day_first", Category::Date, LONG_DATE_DAY_FIRST),
        ("iso_date", Category::Date, ISO_DATE),
    ]
}
