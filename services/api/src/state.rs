//! Application state shared across handlers

use common::cache::RequestCache;
use sqlx::PgPool;

use crate::{
    jwt::TokenVerifier,
    models::Appointment,
    repositories::{
        CompanyRepository, ServiceRepository, UserRepository,
        appointment::AppointmentRepository, staff::StaffRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub verifier: TokenVerifier,
    pub appointment_repository: AppointmentRepository,
    pub staff_repository: StaffRepository,
    pub company_repository: CompanyRepository,
    pub service_repository: ServiceRepository,
    pub user_repository: UserRepository,
    /// Coalesces bursts of identical listing requests into one load.
    pub listing_cache: RequestCache<Vec<Appointment>>,
}
