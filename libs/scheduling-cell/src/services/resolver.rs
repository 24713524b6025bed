//! Automatic replacement-slot search.
//!
//! Widens outward from the caller's preferred time in 15-minute steps, trying
//! the earlier shift before the later one at each distance, then falls back to
//! a linear scan of the whole working day. Stops at the day boundary: picking
//! a different calendar day is the caller's decision, not the resolver's.

use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{ResolveRequest, SchedulingError, SlotResolution};
use crate::services::rules::{occupied_intervals, slot_is_clear, ScheduleWindow};
use crate::services::snapshot::SnapshotLoader;
use crate::services::timeslot::{minutes_to_time, time_to_minutes};

const SHIFT_STEP_MINUTES: i32 = 15;
const SCAN_STEP_MINUTES: i32 = 15;
const DEFAULT_MAX_SHIFT_MINUTES: i32 = 60;

pub struct ConflictResolverService {
    loader: SnapshotLoader,
}

impl ConflictResolverService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            loader: SnapshotLoader::new(config),
        }
    }

    /// Find the first fully free slot for the requested duration. Like the
    /// availability checker, infrastructure faults fail closed.
    pub async fn resolve(&self, request: &ResolveRequest, auth_token: &str) -> SlotResolution {
        match self.try_resolve(request, auth_token).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(
                    "Resolver failing closed for therapist {} on {}: {}",
                    request.therapist_id, request.date, e
                );
                SlotResolution::unresolved("Unable to verify therapist availability")
            }
        }
    }

    async fn try_resolve(
        &self,
        request: &ResolveRequest,
        auth_token: &str,
    ) -> Result<SlotResolution, SchedulingError> {
        if request.duration_minutes <= 0 {
            return Err(SchedulingError::ValidationError(
                "Session duration must be positive".to_string(),
            ));
        }

        let snapshot = self
            .loader
            .load(request.therapist_id, request.date, auth_token)
            .await?;

        let schedule = match &snapshot.schedule {
            Some(schedule) => schedule,
            None => {
                return Ok(SlotResolution::unresolved(
                    "Therapist is not available on this day",
                ))
            }
        };

        let window = ScheduleWindow::from_schedule(schedule)?;
        let occupied = occupied_intervals(&snapshot.sessions, None)?;
        let duration = request.duration_minutes;

        let preferences = request.preferences.clone().unwrap_or_default();
        let max_shift = preferences
            .max_time_shift_minutes
            .unwrap_or(DEFAULT_MAX_SHIFT_MINUTES);

        if let Some(preferred) = preferences.preferred_time.as_deref() {
            let preferred = time_to_minutes(preferred)?;
            debug!(
                "Widening search around {} (max shift {} minutes)",
                minutes_to_time(preferred),
                max_shift
            );

            let mut shift = 0;
            while shift <= max_shift {
                // Earlier candidate is tried before the later one.
                if slot_is_clear(&window, &occupied, preferred - shift, duration) {
                    return Ok(resolved(request, preferred - shift, shift, "earlier"));
                }
                if shift > 0 && slot_is_clear(&window, &occupied, preferred + shift, duration) {
                    return Ok(resolved(request, preferred + shift, shift, "later"));
                }
                shift += SHIFT_STEP_MINUTES;
            }
        }

        // Preference exhausted (or absent): first free slot of the day wins.
        let mut start = window.start;
        while start + duration <= window.end {
            if slot_is_clear(&window, &occupied, start, duration) {
                debug!("Linear scan found {}", minutes_to_time(start));
                return Ok(SlotResolution {
                    resolved: true,
                    suggested_time: Some(minutes_to_time(start)),
                    suggested_date: Some(request.date),
                    reason: "Found first available slot".to_string(),
                });
            }
            start += SCAN_STEP_MINUTES;
        }

        Ok(SlotResolution::unresolved(
            "No available slots found for this day",
        ))
    }
}

fn resolved(request: &ResolveRequest, start: i32, shift: i32, direction: &str) -> SlotResolution {
    let reason = if shift == 0 {
        "Found available slot at the preferred time".to_string()
    } else {
        format!("Found available slot {} minutes {}", shift, direction)
    };

    SlotResolution {
        resolved: true,
        suggested_time: Some(minutes_to_time(start)),
        suggested_date: Some(request.date),
        reason,
    }
}
