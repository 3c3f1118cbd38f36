//! `expires` attribute dates, in the RFC 1123 form browsers emit
//! (`Thu, 01 Jan 1970 00:00:00 GMT`).

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const EXPIRES_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Formats `at` (converted to UTC) for an `expires=` segment.
pub fn format_expires(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    at.format(EXPIRES_FORMAT).unwrap_or_else(|e| {
        log::warn!("Cannot format cookie expiry {at}: {e}");
        String::new()
    })
}

/// Parses an `expires=` value written by [`format_expires`].
pub fn parse_expires(value: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(value.trim(), EXPIRES_FORMAT)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
