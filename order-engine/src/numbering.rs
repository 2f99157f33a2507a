//! Human-readable order numbers: `SO` + `YYYYMMDD` + a zero-padded sequence.
//!
//! The sequence is global (one past the highest order id), not a per-day
//! counter, so numbers keep increasing across days.

use chrono::NaiveDate;

pub const ORDER_NUMBER_PREFIX: &str = "SO";

/// Minimum width of the sequence suffix.
pub const SEQUENCE_WIDTH: usize = 4;

const DATE_FORMAT: &str = "%Y%m%d";

/// Sequence for the next order given the highest existing id.
pub fn next_sequence(latest_id: Option<i64>) -> i64 {
    latest_id.map_or(1, |id| id.max(0) + 1)
}

pub fn format_order_number(date: NaiveDate, sequence: i64) -> String {
    format!(
        "{}{}{:0width$}",
        ORDER_NUMBER_PREFIX,
        date.format(DATE_FORMAT),
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Split an order number back into its date and sequence.
pub fn parse_order_number(value: &str) -> Option<(NaiveDate, i64)> {
    let rest = value.strip_prefix(ORDER_NUMBER_PREFIX)?;
    if rest.len() < 8 + SEQUENCE_WIDTH || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (date, sequence) = rest.split_at(8);
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let sequence = sequence.parse().ok()?;
    Some((date, sequence))
}
