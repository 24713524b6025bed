//! Alternative-slot proposals for a request that could not be booked.
//!
//! Deliberately greedy nearest-fit: one candidate per direction, first match
//! wins. This bounds the work to one pass over the working day and keeps the
//! proposals closest to what the caller originally asked for.

use uuid::Uuid;

use crate::models::{SchedulingError, SuggestionPriority, TimeSlotSuggestion};
use crate::services::rules::{occupied_intervals, slot_is_clear, ScheduleWindow};
use crate::services::snapshot::DaySnapshot;
use crate::services::timeslot::minutes_to_time;

const SUGGESTION_STEP_MINUTES: i32 = 30;

pub fn generate_suggestions(
    snapshot: &DaySnapshot,
    requested_start: i32,
    duration_minutes: i32,
    exclude_session_id: Option<Uuid>,
) -> Result<Vec<TimeSlotSuggestion>, SchedulingError> {
    // Without a schedule there is no working day to anchor suggestions on.
    let schedule = match &snapshot.schedule {
        Some(schedule) => schedule,
        None => return Ok(Vec::new()),
    };

    let window = ScheduleWindow::from_schedule(schedule)?;
    let occupied = occupied_intervals(&snapshot.sessions, exclude_session_id)?;

    let mut suggestions = Vec::new();

    // Walk backward from the requested minute, nearest candidate first.
    let mut earlier = requested_start - SUGGESTION_STEP_MINUTES;
    while earlier >= window.start {
        if slot_is_clear(&window, &occupied, earlier, duration_minutes) {
            suggestions.push(TimeSlotSuggestion {
                time: minutes_to_time(earlier),
                duration_minutes,
                reason: "Earlier time slot available".to_string(),
                priority: SuggestionPriority::Medium,
            });
            break;
        }
        earlier -= SUGGESTION_STEP_MINUTES;
    }

    // Walk forward independently of the backward result.
    let mut later = requested_start + SUGGESTION_STEP_MINUTES;
    while later + duration_minutes <= window.end {
        if slot_is_clear(&window, &occupied, later, duration_minutes) {
            suggestions.push(TimeSlotSuggestion {
                time: minutes_to_time(later),
                duration_minutes,
                reason: "Later time slot available".to_string(),
                priority: SuggestionPriority::Medium,
            });
            break;
        }
        later += SUGGESTION_STEP_MINUTES;
    }

    // Fully booked day: point at the schedule start as a low-priority hint.
    if suggestions.is_empty() {
        suggestions.push(TimeSlotSuggestion {
            time: minutes_to_time(window.start),
            duration_minutes,
            reason: "Consider scheduling on a different day".to_string(),
            priority: SuggestionPriority::Low,
        });
    }

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, SessionStatus, WeeklySchedule};
    use crate::services::timeslot::time_to_minutes;
    use chrono::NaiveDate;

    fn snapshot(break_window: bool, sessions: Vec<Session>) -> DaySnapshot {
        DaySnapshot {
            schedule: Some(WeeklySchedule {
                id: Uuid::new_v4(),
                therapist_id: Uuid::new_v4(),
                day_of_week: 1,
                start_time: "09:00".to_string(),
                end_time: "17:00".to_string(),
                break_start: break_window.then(|| "12:00".to_string()),
                break_end: break_window.then(|| "13:00".to_string()),
                is_active: true,
            }),
            sessions,
            therapist: None,
        }
    }

    fn session_at(time: &str, duration: i32) -> Session {
        Session {
            id: Uuid::new_v4(),
            therapist_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: None,
            service_type: None,
            scheduled_date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            scheduled_time: time.to_string(),
            duration_minutes: duration,
            status: SessionStatus::Scheduled,
        }
    }

    #[test]
    fn proposes_nearest_slot_on_each_side_of_the_break() {
        let snapshot = snapshot(true, vec![]);
        let requested = time_to_minutes("12:30").unwrap();

        let suggestions = generate_suggestions(&snapshot, requested, 30, None).unwrap();

        let times: Vec<&str> = suggestions.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["11:30", "13:00"]);
        assert!(suggestions
            .iter()
            .all(|s| s.priority == SuggestionPriority::Medium));
    }

    #[test]
    fn earlier_before_later_in_the_output() {
        let snapshot = snapshot(false, vec![session_at("10:00", 60)]);
        let requested = time_to_minutes("10:30").unwrap();

        let suggestions = generate_suggestions(&snapshot, requested, 30, None).unwrap();

        assert_eq!(suggestions[0].reason, "Earlier time slot available");
        assert_eq!(suggestions[0].time, "09:30");
        assert_eq!(suggestions[1].reason, "Later time slot available");
        assert_eq!(suggestions[1].time, "11:00");
    }

    #[test]
    fn fully_booked_day_falls_back_to_a_low_priority_hint() {
        // One session papers over the whole working day.
        let snapshot = snapshot(false, vec![session_at("09:00", 480)]);
        let requested = time_to_minutes("10:00").unwrap();

        let suggestions = generate_suggestions(&snapshot, requested, 30, None).unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].priority, SuggestionPriority::Low);
        assert_eq!(suggestions[0].time, "09:00");
        assert!(suggestions[0].reason.contains("different day"));
    }

    #[test]
    fn no_schedule_means_no_anchor_and_no_suggestions() {
        let snapshot = DaySnapshot {
            schedule: None,
            sessions: vec![],
            therapist: None,
        };

        let suggestions = generate_suggestions(&snapshot, 600, 30, None).unwrap();
        assert!(suggestions.is_empty());
    }
}
