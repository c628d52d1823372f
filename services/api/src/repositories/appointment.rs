//! Appointment repository for database operations

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, NewAppointmentRecord};

const APPOINTMENT_COLUMNS: &str = r#"id, user_id, company_id, service_id, staff_id,
       staff_preferences, appointment_date, appointment_time, status, notes,
       created_at, updated_at"#;

fn appointment_from_row(row: &PgRow) -> Result<Appointment> {
    Ok(Appointment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        company_id: row.get("company_id"),
        service_id: row.get("service_id"),
        staff_id: row.get("staff_id"),
        staff_preferences: row.get("staff_preferences"),
        appointment_date: row.get("appointment_date"),
        appointment_time: row.get("appointment_time"),
        status: row
            .get::<String, _>("status")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Appointment repository for database operations
#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    /// Create a new appointment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new appointment in `pending` status
    pub async fn create(&self, record: &NewAppointmentRecord) -> Result<Appointment> {
        info!(
            "Creating appointment for user {} at company {}",
            record.user_id, record.company_id
        );

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO appointments (user_id, company_id, service_id, staff_id,
                                      staff_preferences, appointment_date, appointment_time,
                                      status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(record.user_id)
        .bind(record.company_id)
        .bind(record.service_id)
        .bind(record.staff_id)
        .bind(&record.staff_preferences)
        .bind(record.appointment_date)
        .bind(record.appointment_time)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;

        appointment_from_row(&row)
    }

    /// Find an appointment by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        let row = sqlx::query(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    /// List every appointment (admin scope)
    pub async fn list_all(&self) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            ORDER BY appointment_date DESC, appointment_time DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    /// List a company's appointments (owner scope)
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE company_id = $1
            ORDER BY appointment_date DESC, appointment_time DESC
            "#
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    /// List a customer's own appointments (user scope)
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE user_id = $1
            ORDER BY appointment_date DESC, appointment_time DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    /// List the appointments assigned to any staff record of a user account
    /// (staff scope)
    pub async fn list_by_staff_user(&self, user_id: Uuid) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments a
            WHERE a.staff_id IN (SELECT id FROM staff WHERE user_id = $1)
            ORDER BY appointment_date DESC, appointment_time DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    /// Partially update an appointment; absent fields keep their stored
    /// values. `company_id` and `service_id` are immutable and have no
    /// parameters here at all.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_fields(
        &self,
        id: Uuid,
        appointment_date: Option<NaiveDate>,
        appointment_time: Option<NaiveTime>,
        notes: Option<&str>,
        status: Option<AppointmentStatus>,
        staff_id: Option<Uuid>,
        staff_preferences: Option<&[Uuid]>,
    ) -> Result<Option<Appointment>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE appointments
            SET appointment_date = COALESCE($2, appointment_date),
                appointment_time = COALESCE($3, appointment_time),
                notes = COALESCE($4, notes),
                status = COALESCE($5, status),
                staff_id = COALESCE($6, staff_id),
                staff_preferences = COALESCE($7, staff_preferences),
                updated_at = now()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(appointment_date)
        .bind(appointment_time)
        .bind(notes)
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(staff_id)
        .bind(staff_preferences.map(|p| p.to_vec()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    /// Set status and staff binding in one write
    ///
    /// This is the assignment workflow's storage primitive: confirming an
    /// appointment and binding its staff member must be a single observable
    /// transition.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        staff_id: Option<Uuid>,
    ) -> Result<Option<Appointment>> {
        info!("Setting appointment {} status to {}", id, status);

        let row = sqlx::query(&format!(
            r#"
            UPDATE appointments
            SET status = $2,
                staff_id = COALESCE($3, staff_id),
                updated_at = now()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    /// Delete an appointment
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting appointment {}", id);

        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
