//! Staff model and related payloads
//!
//! A staff record wraps a user account and scopes it to exactly one company;
//! the same account may be staffed at several companies through separate
//! records, but never twice at the same one.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::hhmm_opt;

/// Staff entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: Uuid,
    /// The underlying user account; immutable after creation.
    pub user_id: Uuid,
    /// The company this record belongs to; immutable after creation.
    pub company_id: Uuid,
    #[serde(with = "hhmm_opt")]
    pub working_hours_start: Option<NaiveTime>,
    #[serde(with = "hhmm_opt")]
    pub working_hours_end: Option<NaiveTime>,
    pub skills: Option<String>,
    pub professional_qualifications: Option<String>,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Staff lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    Active,
    Inactive,
    Suspended,
    Terminated,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
            StaffStatus::Suspended => "suspended",
            StaffStatus::Terminated => "terminated",
        }
    }
}

impl FromStr for StaffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StaffStatus::Active),
            "inactive" => Ok(StaffStatus::Inactive),
            "suspended" => Ok(StaffStatus::Suspended),
            "terminated" => Ok(StaffStatus::Terminated),
            other => Err(format!("Unknown staff status: {}", other)),
        }
    }
}

impl fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New staff creation payload
///
/// Working hours arrive as `HH:MM` strings and are validated before they
/// reach the repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub skills: Option<String>,
    pub professional_qualifications: Option<String>,
}

/// Staff update payload; `user_id` and `company_id` are immutable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaff {
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub skills: Option<String>,
    pub professional_qualifications: Option<String>,
    pub status: Option<StaffStatus>,
}
