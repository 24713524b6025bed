// libs/scheduling-cell/src/handlers.rs
use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AvailabilityCheck, AvailabilityRequest, BulkAvailabilityRequest, ResolveRequest,
    SchedulingError, SlotResolution,
};
use crate::services::availability::AvailabilityService;
use crate::services::resolver::ConflictResolverService;
use crate::services::timeslot;

/// Check a single requested slot for one therapist/date.
///
/// The body of the response is always a full `AvailabilityCheck`; callers
/// must read `available` and `conflicts`, never infer availability from the
/// status code alone.
#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityCheck>, AppError> {
    let token = auth.token();
    validate_slot(&request.start_time, request.duration_minutes)?;

    let service = AvailabilityService::new(&state);
    let check = service.check_availability(&request, token).await;

    Ok(Json(check))
}

/// Check a set of candidate slots for one therapist/day in one call.
/// Each slot is evaluated independently; nothing is reserved.
#[axum::debug_handler]
pub async fn check_bulk_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BulkAvailabilityRequest>,
) -> Result<Json<HashMap<String, AvailabilityCheck>>, AppError> {
    let token = auth.token();

    for slot in &request.slots {
        validate_slot(&slot.start_time, slot.duration_minutes)?;
    }

    let service = AvailabilityService::new(&state);
    let results = service.check_bulk(&request, token).await;

    Ok(Json(results))
}

/// Find a replacement slot around an optional preferred time.
#[axum::debug_handler]
pub async fn resolve_conflict(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<SlotResolution>, AppError> {
    let token = auth.token();

    if request.duration_minutes <= 0 {
        return Err(AppError::ValidationError(
            "Session duration must be positive".to_string(),
        ));
    }
    if let Some(preferred) = request
        .preferences
        .as_ref()
        .and_then(|p| p.preferred_time.as_deref())
    {
        timeslot::time_to_minutes(preferred).map_err(bad_request)?;
    }

    let resolver = ConflictResolverService::new(&state);
    let resolution = resolver.resolve(&request, token).await;

    Ok(Json(resolution))
}

fn validate_slot(start_time: &str, duration_minutes: i32) -> Result<(), AppError> {
    timeslot::time_to_minutes(start_time).map_err(bad_request)?;

    if duration_minutes <= 0 {
        return Err(AppError::ValidationError(
            "Session duration must be positive".to_string(),
        ));
    }

    Ok(())
}

fn bad_request(e: SchedulingError) -> AppError {
    AppError::BadRequest(e.to_string())
}
