use crate::models::SchedulingError;

/// Parse a zero-padded 24-hour "HH:MM" string into minutes since midnight.
pub fn time_to_minutes(time: &str) -> Result<i32, SchedulingError> {
    let malformed = || SchedulingError::MalformedTime(time.to_string());

    let (hh, mm) = time.split_once(':').ok_or_else(malformed)?;
    if hh.len() != 2 || mm.len() != 2 {
        return Err(malformed());
    }

    let hours: i32 = hh.parse().map_err(|_| malformed())?;
    let minutes: i32 = mm.parse().map_err(|_| malformed())?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(malformed());
    }

    Ok(hours * 60 + minutes)
}

/// Inverse of `time_to_minutes`, zero-padded.
pub fn minutes_to_time(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Half-open interval overlap: touching endpoints do not count.
pub fn intervals_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && a_end > b_start
}

/// Map key used by the bulk checker: "HH:MM-HH:MM".
pub fn slot_key(start_minutes: i32, end_minutes: i32) -> String {
    format!("{}-{}", minutes_to_time(start_minutes), minutes_to_time(end_minutes))
}
