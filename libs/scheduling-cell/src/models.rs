// libs/scheduling-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveDate;
use std::fmt;

// ==============================================================================
// STORE SNAPSHOT MODELS (read-only inputs owned by other cells)
// ==============================================================================

/// One recurring availability window per (therapist, day-of-week).
/// Only rows with `is_active = true` are consulted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: Uuid,
    pub therapist_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: Option<String>,
    pub service_type: Option<String>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub duration_minutes: i32,
    pub status: SessionStatus,
}

impl Session {
    /// Whether this session reserves calendar time.
    pub fn is_occupying(&self) -> bool {
        matches!(self.status, SessionStatus::Scheduled | SessionStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Scheduled => write!(f, "SCHEDULED"),
            SessionStatus::InProgress => write!(f, "IN_PROGRESS"),
            SessionStatus::Completed => write!(f, "COMPLETED"),
            SessionStatus::Cancelled => write!(f, "CANCELLED"),
            SessionStatus::NoShow => write!(f, "NO_SHOW"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Therapist {
    pub id: Uuid,
    pub full_name: String,
    pub is_active: bool,
    pub can_take_consultations: bool,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub duration_minutes: i32,
    /// Session being edited, ignored during overlap checks.
    pub exclude_session_id: Option<Uuid>,
    // Carried through for collaborator-specific extensions, never evaluated here.
    pub service_type: Option<String>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub reason: Option<String>,
    pub conflicts: Vec<Conflict>,
    pub suggestions: Vec<TimeSlotSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAvailabilityRequest {
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<SlotCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub start_time: String,
    pub duration_minutes: i32,
}

// ==============================================================================
// CONFLICT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    ScheduleConflict,
    BreakConflict,
    WorkingHours,
    ExistingSession,
    TherapistUnavailable,
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::ScheduleConflict => write!(f, "SCHEDULE_CONFLICT"),
            ConflictType::BreakConflict => write!(f, "BREAK_CONFLICT"),
            ConflictType::WorkingHours => write!(f, "WORKING_HOURS"),
            ConflictType::ExistingSession => write!(f, "EXISTING_SESSION"),
            ConflictType::TherapistUnavailable => write!(f, "THERAPIST_UNAVAILABLE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub message: String,
    pub conflicting_item: Option<ConflictingItem>,
}

impl Conflict {
    pub fn error(conflict_type: ConflictType, message: impl Into<String>) -> Self {
        Self {
            conflict_type,
            severity: ConflictSeverity::Error,
            message: message.into(),
            conflicting_item: None,
        }
    }

    pub fn with_item(mut self, item: ConflictingItem) -> Self {
        self.conflicting_item = Some(item);
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == ConflictSeverity::Error
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictingItem {
    pub id: Option<Uuid>,
    pub item_type: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
}

// ==============================================================================
// SUGGESTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotSuggestion {
    pub time: String,
    pub duration_minutes: i32,
    pub reason: String,
    pub priority: SuggestionPriority,
}

// ==============================================================================
// RESOLUTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub preferences: Option<ResolvePreferences>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvePreferences {
    pub preferred_time: Option<String>,
    /// How far from the preferred time the resolver may shift, in minutes.
    /// Defaults to 60.
    pub max_time_shift_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotResolution {
    pub resolved: bool,
    pub suggested_time: Option<String>,
    pub suggested_date: Option<NaiveDate>,
    pub reason: String,
}

impl SlotResolution {
    pub fn unresolved(reason: impl Into<String>) -> Self {
        Self {
            resolved: false,
            suggested_time: None,
            suggested_date: None,
            reason: reason.into(),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SchedulingError {
    #[error("Malformed time string: {0}")]
    MalformedTime(String),

    #[error("Therapist not found")]
    TherapistNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
