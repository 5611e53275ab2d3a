//! Canonical month table
//!
//! Grouping by month always uses these twelve fixed lowercase Spanish
//! identifiers. Locale-provided month names are never consulted: month
//! formatting through the OS locale silently produces English (or empty)
//! names on hosts without an es_CO locale, which corrupts month-keyed
//! grouping. The static table makes the mapping deterministic everywhere.

/// The twelve canonical month names, indexed by calendar month - 1.
pub const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Map a calendar month number (1-12) to its canonical name.
///
/// Returns `None` for out-of-range input rather than panicking; callers
/// treat an unmappable month like an unparseable date (excluded from
/// month-keyed aggregation).
pub fn month_name(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTHS[(month - 1) as usize])
    } else {
        None
    }
}
