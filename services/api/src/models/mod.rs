//! API models for the appointment management service

pub mod appointment;
pub mod company;
pub mod role;
pub mod service;
pub mod staff;
pub mod user;

// Re-export for convenience
pub use appointment::{
    Appointment, AppointmentStatus, MAX_STAFF_PREFERENCES, NewAppointment, NewAppointmentRecord,
    UpdateAppointment, UpdateAppointmentStatus,
};
pub use company::{Company, CompanyStatus, NewCompany, UpdateCompanyStatus};
pub use role::Role;
pub use service::{NewService, Service, ServiceStatus, UpdateService};
pub use staff::{NewStaff, Staff, StaffStatus, UpdateStaff};
pub use user::UserAccount;

/// Serde helpers for `HH:MM` wire times
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serde helpers for optional `HH:MM` wire times
pub(crate) mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_some(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|s| NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
