//! Staff repository for database operations

use anyhow::Result;
use chrono::NaiveTime;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Staff, UpdateStaff};

fn staff_from_row(row: &PgRow) -> Result<Staff> {
    Ok(Staff {
        id: row.get("id"),
        user_id: row.get("user_id"),
        company_id: row.get("company_id"),
        working_hours_start: row.get("working_hours_start"),
        working_hours_end: row.get("working_hours_end"),
        skills: row.get("skills"),
        professional_qualifications: row.get("professional_qualifications"),
        status: row
            .get::<String, _>("status")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Staff repository for database operations
#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    /// Create a new staff repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the full roster of a company, regardless of status
    ///
    /// Status filtering is a presentation concern; the resolver and the
    /// assignment dialog want every row.
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Staff>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, company_id, working_hours_start, working_hours_end,
                   skills, professional_qualifications, status, created_at, updated_at
            FROM staff
            WHERE company_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(staff_from_row).collect()
    }

    /// Find a staff record by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, company_id, working_hours_start, working_hours_end,
                   skills, professional_qualifications, status, created_at, updated_at
            FROM staff
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(staff_from_row).transpose()
    }

    /// Find the staff record for a user at a company, if one exists
    pub async fn find_by_company_and_user(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Staff>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, company_id, working_hours_start, working_hours_end,
                   skills, professional_qualifications, status, created_at, updated_at
            FROM staff
            WHERE company_id = $1 AND user_id = $2
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(staff_from_row).transpose()
    }

    /// Create a new staff record in `active` status
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        working_hours_start: Option<NaiveTime>,
        working_hours_end: Option<NaiveTime>,
        skills: Option<&str>,
        professional_qualifications: Option<&str>,
    ) -> Result<Staff> {
        info!("Staffing user {} at company {}", user_id, company_id);

        let row = sqlx::query(
            r#"
            INSERT INTO staff (company_id, user_id, working_hours_start, working_hours_end,
                               skills, professional_qualifications, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'active')
            RETURNING id, user_id, company_id, working_hours_start, working_hours_end,
                      skills, professional_qualifications, status, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(working_hours_start)
        .bind(working_hours_end)
        .bind(skills)
        .bind(professional_qualifications)
        .fetch_one(&self.pool)
        .await?;

        staff_from_row(&row)
    }

    /// Partially update a staff record; `user_id` and `company_id` never change
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateStaff,
        working_hours_start: Option<NaiveTime>,
        working_hours_end: Option<NaiveTime>,
    ) -> Result<Option<Staff>> {
        let row = sqlx::query(
            r#"
            UPDATE staff
            SET working_hours_start = COALESCE($2, working_hours_start),
                working_hours_end = COALESCE($3, working_hours_end),
                skills = COALESCE($4, skills),
                professional_qualifications = COALESCE($5, professional_qualifications),
                status = COALESCE($6, status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, company_id, working_hours_start, working_hours_end,
                      skills, professional_qualifications, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(working_hours_start)
        .bind(working_hours_end)
        .bind(&payload.skills)
        .bind(&payload.professional_qualifications)
        .bind(payload.status.map(|s| s.as_str().to_string()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(staff_from_row).transpose()
    }

    /// Delete a staff record
    ///
    /// Appointments bound to this staff member keep existing but lose the
    /// binding; ids left inside preference lists go stale and are dropped at
    /// resolution time. Both steps run in one transaction.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting staff record {}", id);

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE appointments SET staff_id = NULL, updated_at = now() WHERE staff_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
