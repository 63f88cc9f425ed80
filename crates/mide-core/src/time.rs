use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn now_utc_rfc3339() -> Result<String, time::error::Format> {
    OffsetDateTime::now_utc().format(&Rfc3339)
}

/// Compact id for locally created reservations, unique per nanosecond.
pub fn local_reservation_id() -> String {
    format!("local-{}", OffsetDateTime::now_utc().unix_timestamp_nanos())
}
