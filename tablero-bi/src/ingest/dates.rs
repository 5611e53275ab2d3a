//! Day-first date parsing and month label normalization

use chrono::NaiveDate;
use tablero_common::months::MONTHS;

/// Parse a day-first date string (`DD/MM/YYYY` primary, `DD-MM-YYYY`
/// fallback). `None` on anything else; unparseable dates are excluded
/// from month-keyed aggregation and counted by the caller.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d-%m-%Y"))
        .ok()
}

/// Canonical month name of a valid date. Pure table lookup; month0 is
/// always within 0..12 for a NaiveDate.
pub fn canonical_month(date: NaiveDate) -> &'static str {
    use chrono::Datelike;
    MONTHS[date.month0() as usize]
}

/// Normalize a free-text month label ("Enero", "FEBRERO 2026") to the
/// canonical month name. `None` when the label matches no month.
pub fn normalize_month_label(raw: &str) -> Option<&'static str> {
    let label = raw.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }
    MONTHS.iter().find(|m| label.starts_with(*m)).copied()
}
