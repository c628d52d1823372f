//! Appointment model, status state machine, and request payloads

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::hhmm;

/// Upper bound on the ranked staff preference list a booking may carry
pub const MAX_STAFF_PREFERENCES: usize = 3;

/// Appointment entity — a booking of one service at one company
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    /// The booking customer.
    pub user_id: Uuid,
    /// Immutable after creation, together with `service_id`.
    pub company_id: Uuid,
    pub service_id: Uuid,
    /// The staff member bound by the assignment workflow, if any.
    pub staff_id: Option<Uuid>,
    /// Ranked staff preferences supplied by the booking user; entries may go
    /// stale when staff leave and are dropped at resolution time.
    pub staff_preferences: Vec<Uuid>,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment lifecycle status
///
/// The happy path is linear: `pending -> confirmed -> completed`.
/// `cancelled` is reachable from either non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled appointments cannot change status again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Whether the directed transition graph permits `self -> next`.
    ///
    /// Writing the current status again is permitted and treated as a no-op
    /// by callers.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if self == next {
            return true;
        }

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New appointment payload
///
/// `user_id` is honored only when an admin or owner books on a customer's
/// behalf; otherwise the booking user comes from the session. Date and time
/// arrive as strings and go through validation before parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub user_id: Option<Uuid>,
    pub company_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: String,
    pub appointment_time: String,
    pub notes: Option<String>,
    pub staff_id: Option<Uuid>,
    pub staff_preferences: Option<Vec<Uuid>>,
}

/// Validated appointment data, ready for insertion
#[derive(Debug, Clone)]
pub struct NewAppointmentRecord {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub notes: Option<String>,
    pub staff_id: Option<Uuid>,
    pub staff_preferences: Vec<Uuid>,
}

/// Generic appointment update payload
///
/// `status`, `staff_id` and `staff_preferences` are restricted fields:
/// accepted from admins and owners, stripped from anyone else before the
/// write.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointment {
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub staff_id: Option<Uuid>,
    pub staff_preferences: Option<Vec<Uuid>>,
}

impl UpdateAppointment {
    /// Remove the fields only admins and owners may write.
    ///
    /// Returns the names of the fields that were dropped so the caller can
    /// log what a non-privileged request tried to touch.
    pub fn strip_restricted(&mut self) -> Vec<&'static str> {
        let mut stripped = Vec::new();
        if self.status.take().is_some() {
            stripped.push("status");
        }
        if self.staff_id.take().is_some() {
            stripped.push("staffId");
        }
        if self.staff_preferences.take().is_some() {
            stripped.push("staffPreferences");
        }
        stripped
    }
}

/// Status update payload — the assignment workflow endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentStatus {
    pub status: AppointmentStatus,
    pub staff_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_backward_and_skipping_transitions_rejected() {
        use AppointmentStatus::*;
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn test_terminal_states() {
        use AppointmentStatus::*;
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Confirmed.is_terminal());
        // Writing the same status again is a permitted no-op.
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_status_wire_format() {
        let status: AppointmentStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(status, AppointmentStatus::Confirmed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"confirmed\"");
        assert!("nope".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_strip_restricted_drops_privileged_fields_only() {
        let mut update = UpdateAppointment {
            notes: Some("running late".to_string()),
            status: Some(AppointmentStatus::Completed),
            staff_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let stripped = update.strip_restricted();

        assert_eq!(stripped, vec!["status", "staffId"]);
        assert!(update.status.is_none());
        assert!(update.staff_id.is_none());
        assert!(update.staff_preferences.is_none());
        assert_eq!(update.notes.as_deref(), Some("running late"));
    }

    #[test]
    fn test_strip_restricted_is_a_noop_for_plain_updates() {
        let mut update = UpdateAppointment {
            appointment_date: Some("2026-03-14".to_string()),
            notes: Some("x".to_string()),
            ..Default::default()
        };

        assert!(update.strip_restricted().is_empty());
        assert_eq!(update.appointment_date.as_deref(), Some("2026-03-14"));
    }
}
