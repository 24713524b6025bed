//! The five independent conflict detectors.
//!
//! Every detector is a pure function over the requested slot and the day
//! snapshot, so the whole rule layer can be tested without any store access.
//! All five run unconditionally for every request; nothing short-circuits,
//! which keeps the diagnostics complete and the suggestion input honest.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    Conflict, ConflictType, ConflictingItem, SchedulingError, Session, Therapist, WeeklySchedule,
};
use crate::services::timeslot::{intervals_overlap, minutes_to_time, time_to_minutes};

/// A requested booking interval in minute offsets, half-open.
#[derive(Debug, Clone, Copy)]
pub struct RequestedSlot {
    pub start: i32,
    pub end: i32,
    pub exclude_session_id: Option<Uuid>,
}

impl RequestedSlot {
    pub fn new(
        start_time: &str,
        duration_minutes: i32,
        exclude_session_id: Option<Uuid>,
    ) -> Result<Self, SchedulingError> {
        if duration_minutes <= 0 {
            return Err(SchedulingError::ValidationError(
                "Session duration must be positive".to_string(),
            ));
        }
        let start = time_to_minutes(start_time)?;
        Ok(Self {
            start,
            end: start + duration_minutes,
            exclude_session_id,
        })
    }

    pub fn duration(&self) -> i32 {
        self.end - self.start
    }
}

/// A weekly schedule row with its time-of-day strings parsed once.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleWindow {
    pub schedule_id: Uuid,
    pub start: i32,
    pub end: i32,
    pub break_window: Option<(i32, i32)>,
}

impl ScheduleWindow {
    pub fn from_schedule(schedule: &WeeklySchedule) -> Result<Self, SchedulingError> {
        let start = time_to_minutes(&schedule.start_time)?;
        let end = time_to_minutes(&schedule.end_time)?;

        let break_window = match (&schedule.break_start, &schedule.break_end) {
            (Some(break_start), Some(break_end)) => {
                Some((time_to_minutes(break_start)?, time_to_minutes(break_end)?))
            }
            _ => None,
        };

        Ok(Self {
            schedule_id: schedule.id,
            start,
            end,
            break_window,
        })
    }
}

/// Rule 1: the therapist must have an active schedule for this day-of-week.
pub fn check_schedule_exists(date: NaiveDate, window: Option<&ScheduleWindow>) -> Option<Conflict> {
    if window.is_some() {
        return None;
    }

    Some(Conflict::error(
        ConflictType::TherapistUnavailable,
        format!(
            "Therapist is not scheduled to work on {}",
            date.format("%A")
        ),
    ))
}

/// Rule 2: the requested interval must sit fully inside working hours.
pub fn check_working_hours(slot: &RequestedSlot, window: Option<&ScheduleWindow>) -> Option<Conflict> {
    let window = window?;

    if slot.start >= window.start && slot.end <= window.end {
        return None;
    }

    Some(
        Conflict::error(
            ConflictType::WorkingHours,
            format!(
                "Requested slot {} to {} is outside working hours {} to {}",
                minutes_to_time(slot.start),
                minutes_to_time(slot.end),
                minutes_to_time(window.start),
                minutes_to_time(window.end)
            ),
        )
        .with_item(ConflictingItem {
            id: Some(window.schedule_id),
            item_type: "weekly_schedule".to_string(),
            start_time: minutes_to_time(window.start),
            end_time: minutes_to_time(window.end),
            description: "Scheduled working hours".to_string(),
        }),
    )
}

/// Rule 3: the requested interval must not overlap the break window.
pub fn check_break_overlap(slot: &RequestedSlot, window: Option<&ScheduleWindow>) -> Option<Conflict> {
    let window = window?;
    let (break_start, break_end) = window.break_window?;

    if !intervals_overlap(slot.start, slot.end, break_start, break_end) {
        return None;
    }

    Some(
        Conflict::error(
            ConflictType::BreakConflict,
            format!(
                "Requested slot overlaps the therapist's break from {} to {}",
                minutes_to_time(break_start),
                minutes_to_time(break_end)
            ),
        )
        .with_item(ConflictingItem {
            id: Some(window.schedule_id),
            item_type: "break".to_string(),
            start_time: minutes_to_time(break_start),
            end_time: minutes_to_time(break_end),
            description: "Scheduled break".to_string(),
        }),
    )
}

/// Rule 4: one conflict per overlapping occupying session, not just the first.
pub fn check_session_overlaps(
    slot: &RequestedSlot,
    sessions: &[Session],
) -> Result<Vec<Conflict>, SchedulingError> {
    let mut conflicts = Vec::new();

    for session in sessions {
        if !session.is_occupying() {
            continue;
        }
        if slot.exclude_session_id == Some(session.id) {
            continue;
        }

        let session_start = time_to_minutes(&session.scheduled_time)?;
        let session_end = session_start + session.duration_minutes;

        if !intervals_overlap(slot.start, slot.end, session_start, session_end) {
            continue;
        }

        let patient = session.patient_name.as_deref().unwrap_or("another patient");
        let service = session.service_type.as_deref().unwrap_or("session");

        conflicts.push(
            Conflict::error(
                ConflictType::ExistingSession,
                format!(
                    "Overlaps an existing {} booking for {} at {}",
                    service, patient, session.scheduled_time
                ),
            )
            .with_item(ConflictingItem {
                id: Some(session.id),
                item_type: "session".to_string(),
                start_time: minutes_to_time(session_start),
                end_time: minutes_to_time(session_end),
                description: format!("{} with {}", service, patient),
            }),
        );
    }

    Ok(conflicts)
}

/// Rule 5: the therapist record itself must allow bookings.
pub fn check_therapist_status(therapist: Option<&Therapist>) -> Option<Conflict> {
    let message = match therapist {
        None => "Therapist record could not be found",
        Some(t) if !t.is_active => "Therapist account is inactive",
        Some(t) if !t.can_take_consultations => "Therapist is not currently taking consultations",
        Some(_) => return None,
    };

    Some(Conflict::error(
        ConflictType::TherapistUnavailable,
        message,
    ))
}

/// Occupying session intervals in minute offsets, for the search loops.
pub fn occupied_intervals(
    sessions: &[Session],
    exclude_session_id: Option<Uuid>,
) -> Result<Vec<(i32, i32)>, SchedulingError> {
    sessions
        .iter()
        .filter(|s| s.is_occupying() && exclude_session_id != Some(s.id))
        .map(|s| {
            let start = time_to_minutes(&s.scheduled_time)?;
            Ok((start, start + s.duration_minutes))
        })
        .collect()
}

/// Whether a candidate slot sits inside working hours and clears both the
/// break window and every occupied interval. Shared by the suggestion
/// generator and the resolver search loops.
pub fn slot_is_clear(
    window: &ScheduleWindow,
    occupied: &[(i32, i32)],
    start: i32,
    duration_minutes: i32,
) -> bool {
    let end = start + duration_minutes;

    if start < window.start || end > window.end {
        return false;
    }

    if let Some((break_start, break_end)) = window.break_window {
        if intervals_overlap(start, end, break_start, break_end) {
            return false;
        }
    }

    !occupied
        .iter()
        .any(|&(busy_start, busy_end)| intervals_overlap(start, end, busy_start, busy_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn schedule_with_break() -> WeeklySchedule {
        WeeklySchedule {
            id: Uuid::new_v4(),
            therapist_id: Uuid::new_v4(),
            day_of_week: 1,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            break_start: Some("12:00".to_string()),
            break_end: Some("13:00".to_string()),
            is_active: true,
        }
    }

    fn session_at(time: &str, duration: i32, status: SessionStatus) -> Session {
        Session {
            id: Uuid::new_v4(),
            therapist_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: Some("Alex Moore".to_string()),
            service_type: Some("Physiotherapy".to_string()),
            scheduled_date: monday(),
            scheduled_time: time.to_string(),
            duration_minutes: duration,
            status,
        }
    }

    fn slot(start_time: &str, duration: i32) -> RequestedSlot {
        RequestedSlot::new(start_time, duration, None).unwrap()
    }

    #[test]
    fn missing_schedule_names_the_weekday() {
        let conflict = check_schedule_exists(monday(), None).unwrap();
        assert_eq!(conflict.conflict_type, ConflictType::TherapistUnavailable);
        assert!(conflict.message.contains("Monday"));
        assert!(conflict.is_blocking());
    }

    #[test]
    fn present_schedule_produces_no_existence_conflict() {
        let window = ScheduleWindow::from_schedule(&schedule_with_break()).unwrap();
        assert!(check_schedule_exists(monday(), Some(&window)).is_none());
    }

    #[test]
    fn slot_outside_working_hours_is_flagged_with_bounds() {
        let window = ScheduleWindow::from_schedule(&schedule_with_break()).unwrap();
        let conflict = check_working_hours(&slot("16:45", 30), Some(&window)).unwrap();

        assert_eq!(conflict.conflict_type, ConflictType::WorkingHours);
        let item = conflict.conflicting_item.unwrap();
        assert_eq!(item.start_time, "09:00");
        assert_eq!(item.end_time, "17:00");
    }

    #[test]
    fn slot_inside_working_hours_passes() {
        let window = ScheduleWindow::from_schedule(&schedule_with_break()).unwrap();
        assert!(check_working_hours(&slot("09:00", 60), Some(&window)).is_none());
        // ending exactly at close of day is allowed (half-open interval)
        assert!(check_working_hours(&slot("16:30", 30), Some(&window)).is_none());
    }

    #[test]
    fn break_overlap_blocks_even_with_no_sessions() {
        let window = ScheduleWindow::from_schedule(&schedule_with_break()).unwrap();
        let conflict = check_break_overlap(&slot("12:30", 30), Some(&window)).unwrap();
        assert_eq!(conflict.conflict_type, ConflictType::BreakConflict);
        assert!(conflict.is_blocking());
    }

    #[test]
    fn slot_touching_break_does_not_conflict() {
        let window = ScheduleWindow::from_schedule(&schedule_with_break()).unwrap();
        assert!(check_break_overlap(&slot("11:00", 60), Some(&window)).is_none());
        assert!(check_break_overlap(&slot("13:00", 60), Some(&window)).is_none());
    }

    #[test]
    fn every_overlapping_session_yields_its_own_conflict() {
        let sessions = vec![
            session_at("10:00", 60, SessionStatus::Scheduled),
            session_at("10:45", 30, SessionStatus::InProgress),
            session_at("10:00", 60, SessionStatus::Cancelled),
        ];

        let conflicts = check_session_overlaps(&slot("10:30", 60), &sessions).unwrap();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .all(|c| c.conflict_type == ConflictType::ExistingSession));
    }

    #[test]
    fn excluded_session_is_ignored() {
        let session = session_at("10:00", 60, SessionStatus::Scheduled);
        let slot = RequestedSlot::new("10:00", 60, Some(session.id)).unwrap();

        let conflicts = check_session_overlaps(&slot, &[session]).unwrap();
        assert!(conflicts.is_empty());
    }

    #[test]
    fn therapist_status_reasons_are_specific() {
        assert!(check_therapist_status(None)
            .unwrap()
            .message
            .contains("could not be found"));

        let inactive = Therapist {
            id: Uuid::new_v4(),
            full_name: "Dana Reeves".to_string(),
            is_active: false,
            can_take_consultations: true,
        };
        assert!(check_therapist_status(Some(&inactive))
            .unwrap()
            .message
            .contains("inactive"));

        let closed_books = Therapist {
            is_active: true,
            can_take_consultations: false,
            ..inactive.clone()
        };
        assert!(check_therapist_status(Some(&closed_books))
            .unwrap()
            .message
            .contains("consultations"));

        let bookable = Therapist {
            is_active: true,
            can_take_consultations: true,
            ..inactive
        };
        assert!(check_therapist_status(Some(&bookable)).is_none());
    }

    #[test]
    fn slot_is_clear_honors_bounds_break_and_sessions() {
        let window = ScheduleWindow::from_schedule(&schedule_with_break()).unwrap();
        let occupied = vec![(600, 660)]; // 10:00-11:00

        assert!(slot_is_clear(&window, &occupied, 540, 60)); // 09:00 free
        assert!(!slot_is_clear(&window, &occupied, 630, 30)); // inside session
        assert!(!slot_is_clear(&window, &occupied, 735, 30)); // crosses break
        assert!(!slot_is_clear(&window, &occupied, 510, 30)); // before opening
        assert!(!slot_is_clear(&window, &occupied, 1005, 30)); // past closing
    }
}
