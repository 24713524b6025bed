//! Single-slot and bulk availability checking.
//!
//! Orchestrates the five rule checks over one day snapshot, aggregates their
//! conflicts into a verdict, and fails closed when the store cannot be read:
//! an unverifiable slot is reported as unavailable, never as free.

use std::collections::HashMap;

use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{
    AvailabilityCheck, AvailabilityRequest, BulkAvailabilityRequest, Conflict, ConflictType,
    SchedulingError,
};
use crate::services::rules::{
    check_break_overlap, check_schedule_exists, check_session_overlaps, check_therapist_status,
    check_working_hours, RequestedSlot, ScheduleWindow,
};
use crate::services::snapshot::{DaySnapshot, SnapshotLoader};
use crate::services::suggestions::generate_suggestions;
use crate::services::timeslot::slot_key;

pub struct AvailabilityService {
    loader: SnapshotLoader,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            loader: SnapshotLoader::new(config),
        }
    }

    /// Check one requested slot. Infrastructure faults never escape: the
    /// result is fail-closed instead.
    pub async fn check_availability(
        &self,
        request: &AvailabilityRequest,
        auth_token: &str,
    ) -> AvailabilityCheck {
        debug!(
            "Checking availability for therapist {} on {} at {} for {} minutes",
            request.therapist_id, request.date, request.start_time, request.duration_minutes
        );

        let snapshot = match self
            .loader
            .load(request.therapist_id, request.date, auth_token)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Failing closed for therapist {} on {}: {}",
                    request.therapist_id, request.date, e
                );
                return Self::fail_closed();
            }
        };

        match evaluate_snapshot(&snapshot, request) {
            Ok(check) => check,
            Err(e) => {
                warn!(
                    "Failing closed for therapist {} on {}: {}",
                    request.therapist_id, request.date, e
                );
                Self::fail_closed()
            }
        }
    }

    /// Evaluate a set of candidate slots for one therapist/day against a
    /// single snapshot read. Slots are independent: a free slot in the map
    /// reserves nothing against its siblings.
    pub async fn check_bulk(
        &self,
        request: &BulkAvailabilityRequest,
        auth_token: &str,
    ) -> HashMap<String, AvailabilityCheck> {
        debug!(
            "Bulk availability check for therapist {} on {}: {} slots",
            request.therapist_id,
            request.date,
            request.slots.len()
        );

        let snapshot = self
            .loader
            .load(request.therapist_id, request.date, auth_token)
            .await;

        let mut results = HashMap::with_capacity(request.slots.len());

        for candidate in &request.slots {
            let single = AvailabilityRequest {
                therapist_id: request.therapist_id,
                date: request.date,
                start_time: candidate.start_time.clone(),
                duration_minutes: candidate.duration_minutes,
                exclude_session_id: None,
                service_type: None,
                patient_id: None,
            };

            let check = match &snapshot {
                Ok(snapshot) => {
                    evaluate_snapshot(snapshot, &single).unwrap_or_else(|e| {
                        warn!("Failing closed for slot {}: {}", candidate.start_time, e);
                        Self::fail_closed()
                    })
                }
                Err(e) => {
                    warn!("Failing closed for slot {}: {}", candidate.start_time, e);
                    Self::fail_closed()
                }
            };

            let key = match RequestedSlot::new(&candidate.start_time, candidate.duration_minutes, None)
            {
                Ok(slot) => slot_key(slot.start, slot.end),
                // Unparseable candidate: key it verbatim so the caller still
                // sees one entry per requested slot.
                Err(_) => format!("{}-{}", candidate.start_time, candidate.duration_minutes),
            };

            results.insert(key, check);
        }

        results
    }

    fn fail_closed() -> AvailabilityCheck {
        AvailabilityCheck {
            available: false,
            reason: Some("Availability could not be verified".to_string()),
            conflicts: vec![Conflict::error(
                ConflictType::TherapistUnavailable,
                "Unable to verify therapist availability",
            )],
            suggestions: vec![],
        }
    }
}

/// Pure evaluation of one request against one snapshot. Runs all five rule
/// checks unconditionally and derives the verdict from conflict severities.
pub fn evaluate_snapshot(
    snapshot: &DaySnapshot,
    request: &AvailabilityRequest,
) -> Result<AvailabilityCheck, SchedulingError> {
    let slot = RequestedSlot::new(
        &request.start_time,
        request.duration_minutes,
        request.exclude_session_id,
    )?;

    let window = snapshot
        .schedule
        .as_ref()
        .map(ScheduleWindow::from_schedule)
        .transpose()?;

    let mut conflicts: Vec<Conflict> = Vec::new();
    conflicts.extend(check_schedule_exists(request.date, window.as_ref()));
    conflicts.extend(check_working_hours(&slot, window.as_ref()));
    conflicts.extend(check_break_overlap(&slot, window.as_ref()));
    conflicts.extend(check_session_overlaps(&slot, &snapshot.sessions)?);
    conflicts.extend(check_therapist_status(snapshot.therapist.as_ref()));

    let available = !conflicts.iter().any(Conflict::is_blocking);

    let suggestions = if conflicts.is_empty() {
        vec![]
    } else {
        generate_suggestions(
            snapshot,
            slot.start,
            slot.duration(),
            request.exclude_session_id,
        )?
    };

    let reason = if conflicts.is_empty() {
        None
    } else if available {
        Some("Booking is possible but has warnings".to_string())
    } else {
        Some("Scheduling conflicts prevent booking this time slot".to_string())
    };

    if !available {
        warn!(
            "Slot {} on {} rejected with {} conflict(s)",
            request.start_time,
            request.date,
            conflicts.len()
        );
    }

    Ok(AvailabilityCheck {
        available,
        reason,
        conflicts,
        suggestions,
    })
}
