use chrono::{Datelike, NaiveDate, Weekday};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{SchedulingError, Session, Therapist, WeeklySchedule};

/// Everything one evaluation needs, read in a single logical fetch.
/// The engine treats this as an immutable snapshot; it never writes.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    pub schedule: Option<WeeklySchedule>,
    pub sessions: Vec<Session>,
    pub therapist: Option<Therapist>,
}

/// Map a calendar date to the schedule table's day index (0 = Sunday).
pub fn day_of_week_index(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

pub struct SnapshotLoader {
    supabase: SupabaseClient,
}

impl SnapshotLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn load(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<DaySnapshot, SchedulingError> {
        debug!("Loading day snapshot for therapist {} on {}", therapist_id, date);

        let schedule = self.get_schedule_for_day(therapist_id, date, auth_token).await?;
        let sessions = self.get_occupying_sessions(therapist_id, date, auth_token).await?;
        let therapist = self.get_therapist(therapist_id, auth_token).await?;

        Ok(DaySnapshot {
            schedule,
            sessions,
            therapist,
        })
    }

    /// At most one active schedule per (therapist, day-of-week) is consulted.
    async fn get_schedule_for_day(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Option<WeeklySchedule>, SchedulingError> {
        let path = format!(
            "/rest/v1/weekly_schedules?therapist_id=eq.{}&day_of_week=eq.{}&is_active=eq.true&limit=1",
            therapist_id,
            day_of_week_index(date)
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    SchedulingError::DatabaseError(format!("Failed to parse weekly schedule: {}", e))
                })
            })
            .transpose()
    }

    /// Only sessions in an occupying status reserve calendar time.
    async fn get_occupying_sessions(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Session>, SchedulingError> {
        let path = format!(
            "/rest/v1/sessions?therapist_id=eq.{}&scheduled_date=eq.{}&status=in.(SCHEDULED,IN_PROGRESS)&order=scheduled_time.asc",
            therapist_id, date
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    SchedulingError::DatabaseError(format!("Failed to parse session: {}", e))
                })
            })
            .collect()
    }

    async fn get_therapist(
        &self,
        therapist_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Therapist>, SchedulingError> {
        let path = format!("/rest/v1/therapists?id=eq.{}&limit=1", therapist_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    SchedulingError::DatabaseError(format!("Failed to parse therapist: {}", e))
                })
            })
            .transpose()
    }
}
