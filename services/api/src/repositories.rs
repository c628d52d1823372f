//! Repositories for database operations

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Company, CompanyStatus, NewCompany, NewService, Service, UpdateService, UserAccount,
    role::Role,
};

pub mod appointment;
pub mod staff;

fn company_from_row(row: &PgRow) -> Result<Company> {
    Ok(Company {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        status: row
            .get::<String, _>("status")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        owner_user_id: row.get("owner_user_id"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn service_from_row(row: &PgRow) -> Result<Service> {
    Ok(Service {
        id: row.get("id"),
        company_id: row.get("company_id"),
        name: row.get("name"),
        description: row.get("description"),
        duration: row.get("duration"),
        price: row.get("price"),
        status: row
            .get::<String, _>("status")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn user_from_row(row: &PgRow) -> Result<UserAccount> {
    Ok(UserAccount {
        id: row.get("id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        role: Role::try_from(row.get::<i16, _>("role") as i64)
            .map_err(|e| anyhow::anyhow!(e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Company repository for database operations
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Create a new company repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new company in `pending` status
    pub async fn create(&self, owner_user_id: Uuid, payload: &NewCompany) -> Result<Company> {
        info!("Creating company {} for owner {}", payload.name, owner_user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO companies (name, email, phone, address, status, owner_user_id, category, subcategory)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7)
            RETURNING id, name, email, phone, address, status, owner_user_id, category, subcategory,
                      created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(owner_user_id)
        .bind(&payload.category)
        .bind(&payload.subcategory)
        .fetch_one(&self.pool)
        .await?;

        company_from_row(&row)
    }

    /// Find a company by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, status, owner_user_id, category, subcategory,
                   created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(company_from_row).transpose()
    }

    /// Find the company owned by a user, if any
    pub async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Option<Company>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, status, owner_user_id, category, subcategory,
                   created_at, updated_at
            FROM companies
            WHERE owner_user_id = $1
            "#,
        )
        .bind(owner_user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(company_from_row).transpose()
    }

    /// List all companies (admin directory)
    pub async fn list_all(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, status, owner_user_id, category, subcategory,
                   created_at, updated_at
            FROM companies
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(company_from_row).collect()
    }

    /// Set the company lifecycle status (admin action)
    pub async fn set_status(&self, id: Uuid, status: CompanyStatus) -> Result<Option<Company>> {
        info!("Setting company {} status to {}", id, status);

        let row = sqlx::query(
            r#"
            UPDATE companies
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, phone, address, status, owner_user_id, category, subcategory,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(company_from_row).transpose()
    }
}

/// Service catalog repository for database operations
#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    /// Create a new service repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new service in `active` status
    pub async fn create(&self, payload: &NewService) -> Result<Service> {
        info!(
            "Creating service {} for company {}",
            payload.name, payload.company_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO services (company_id, name, description, duration, price, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING id, company_id, name, description, duration, price, status,
                      created_at, updated_at
            "#,
        )
        .bind(payload.company_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.duration)
        .bind(payload.price)
        .fetch_one(&self.pool)
        .await?;

        service_from_row(&row)
    }

    /// Find a service by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, name, description, duration, price, status,
                   created_at, updated_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(service_from_row).transpose()
    }

    /// List the services of a company
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Service>> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, name, description, duration, price, status,
                   created_at, updated_at
            FROM services
            WHERE company_id = $1
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(service_from_row).collect()
    }

    /// Partially update a service; absent fields keep their stored values
    pub async fn update(&self, id: Uuid, payload: &UpdateService) -> Result<Option<Service>> {
        let row = sqlx::query(
            r#"
            UPDATE services
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                duration = COALESCE($4, duration),
                price = COALESCE($5, price),
                status = COALESCE($6, status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, company_id, name, description, duration, price, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.duration)
        .bind(payload.price)
        .bind(payload.status.map(|s| s.as_str().to_string()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(service_from_row).transpose()
    }

    /// Delete a service
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting service {}", id);

        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// User account repository (read model maintained by the auth provider)
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user account by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        let row = sqlx::query(
            r#"
            SELECT id, display_name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// List all user accounts (admin directory)
    pub async fn list_all(&self) -> Result<Vec<UserAccount>> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_name, email, role, created_at, updated_at
            FROM users
            ORDER BY display_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// List customer accounts not yet staffed at the given company
    ///
    /// Used when an owner picks whom to add as new staff; accounts already
    /// staffed there are excluded so the same user cannot be staffed twice.
    pub async fn list_available_for_company(&self, company_id: Uuid) -> Result<Vec<UserAccount>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.display_name, u.email, u.role, u.created_at, u.updated_at
            FROM users u
            WHERE u.role = $1
              AND NOT EXISTS (
                  SELECT 1 FROM staff s
                  WHERE s.user_id = u.id AND s.company_id = $2
              )
            ORDER BY u.display_name
            "#,
        )
        .bind(Role::User.as_i64() as i16)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// List every customer account, without the staffing exclusion
    pub async fn list_customers(&self) -> Result<Vec<UserAccount>> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_name, email, role, created_at, updated_at
            FROM users
            WHERE role = $1
            ORDER BY display_name
            "#,
        )
        .bind(Role::User.as_i64() as i16)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }
}
