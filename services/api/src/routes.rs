//! API service routes
//!
//! All routes except the health check sit behind the bearer-token middleware.
//! Handlers enforce the role scoping described by the role model: admins see
//! everything, owners manage their own company, staff see their assignments,
//! and customers see their own bookings.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use common::cache::request_key;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{
        Appointment, AppointmentStatus, Company, CompanyStatus, NewAppointment,
        NewAppointmentRecord, NewCompany, NewService, NewStaff, Role, Service, ServiceStatus,
        Staff, UpdateAppointment, UpdateAppointmentStatus, UpdateCompanyStatus, UpdateService,
        UpdateStaff,
    },
    resolver,
    state::AppState,
    validation,
};

/// Roster partition returned to the assignment dialog
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOptions {
    /// Staff the booking user asked for, in roster order.
    pub preferred: Vec<Staff>,
    /// The rest of the roster.
    pub other: Vec<Staff>,
    /// Pre-selected staff member, if any still resolves.
    pub suggested: Option<Uuid>,
}

/// Query parameters for the available-users listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUsersQuery {
    pub company_id: Uuid,
    /// Owners may browse every customer account instead of only the
    /// not-yet-staffed ones.
    #[serde(default)]
    pub all: bool,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/appointments",
            post(create_appointment).get(list_appointments),
        )
        .route("/appointments/all", get(list_all_appointments))
        .route(
            "/appointments/:id",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/appointments/:id/status", put(update_appointment_status))
        .route(
            "/appointments/:id/assignment-options",
            get(assignment_options),
        )
        .route("/staff", post(create_staff))
        .route("/staff/:id", put(update_staff).delete(delete_staff))
        .route("/staff/company/:company_id", get(list_staff_by_company))
        .route("/staff/available-users", get(list_available_users))
        .route("/companies", post(create_company).get(list_companies))
        .route("/companies/:id", get(get_company))
        .route("/companies/:id/status", put(update_company_status))
        .route("/services", post(create_service))
        .route("/services/:id", put(update_service).delete(delete_service))
        .route(
            "/services/company/:company_id",
            get(list_services_by_company),
        )
        .route("/users", get(list_users))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "salonflow-api"
    }))
}

// ---------------------------------------------------------------------------
// Shared lookups and permission checks
// ---------------------------------------------------------------------------

async fn load_appointment(state: &AppState, id: Uuid) -> ApiResult<Appointment> {
    state
        .appointment_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load appointment: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))
}

async fn load_company(state: &AppState, id: Uuid) -> ApiResult<Company> {
    state
        .company_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load company: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))
}

async fn load_service(state: &AppState, id: Uuid) -> ApiResult<Service> {
    state
        .service_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load service: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
}

async fn load_staff(state: &AppState, id: Uuid) -> ApiResult<Staff> {
    state
        .staff_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load staff record: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Staff member not found".to_string()))
}

/// The company the authenticated owner manages
async fn owned_company(state: &AppState, auth: &AuthUser) -> ApiResult<Company> {
    state
        .company_repository
        .find_by_owner(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to load owner's company: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::Permission("You do not manage a company".to_string()))
}

/// Admins may manage any company; owners only their own.
async fn ensure_company_manager(
    state: &AppState,
    auth: &AuthUser,
    company_id: Uuid,
) -> ApiResult<()> {
    match auth.role {
        Role::Admin => Ok(()),
        Role::Owner => {
            let company = owned_company(state, auth).await?;
            if company.id == company_id {
                Ok(())
            } else {
                Err(ApiError::Permission(
                    "You may only manage your own company".to_string(),
                ))
            }
        }
        _ => Err(ApiError::Permission(
            "Administrator or owner access required".to_string(),
        )),
    }
}

/// A staff binding must stay within the appointment's company.
async fn ensure_staff_of_company(
    state: &AppState,
    staff_id: Uuid,
    company_id: Uuid,
) -> ApiResult<Staff> {
    let staff = load_staff(state, staff_id).await?;
    if staff.company_id != company_id {
        return Err(ApiError::Validation(
            "Staff member does not belong to this company".to_string(),
        ));
    }
    Ok(staff)
}

/// Read access: admin, company owner, assigned staff, or the booking user.
async fn ensure_can_view_appointment(
    state: &AppState,
    auth: &AuthUser,
    appointment: &Appointment,
) -> ApiResult<()> {
    match auth.role {
        Role::Admin => Ok(()),
        Role::Owner => {
            let company = owned_company(state, auth).await?;
            if company.id == appointment.company_id {
                Ok(())
            } else {
                Err(ApiError::Permission(
                    "You may only view your own company's appointments".to_string(),
                ))
            }
        }
        Role::Staff => {
            if let Some(staff_id) = appointment.staff_id {
                let staff = load_staff(state, staff_id).await?;
                if staff.user_id == auth.id {
                    return Ok(());
                }
            }
            Err(ApiError::Permission(
                "You may only view appointments assigned to you".to_string(),
            ))
        }
        Role::User => {
            if appointment.user_id == auth.id {
                Ok(())
            } else {
                Err(ApiError::Permission(
                    "You may only view your own appointments".to_string(),
                ))
            }
        }
    }
}

/// Write access for the generic update/delete paths. Staff members have no
/// write access at all; customers only touch their own bookings.
async fn ensure_can_modify_appointment(
    state: &AppState,
    auth: &AuthUser,
    appointment: &Appointment,
) -> ApiResult<()> {
    match auth.role {
        Role::Admin => Ok(()),
        Role::Owner => {
            let company = owned_company(state, auth).await?;
            if company.id == appointment.company_id {
                Ok(())
            } else {
                Err(ApiError::Permission(
                    "You may only manage your own company's appointments".to_string(),
                ))
            }
        }
        Role::Staff => Err(ApiError::Permission(
            "Staff members cannot modify appointments".to_string(),
        )),
        Role::User => {
            if appointment.user_id == auth.id {
                Ok(())
            } else {
                Err(ApiError::Permission(
                    "You may only modify your own appointments".to_string(),
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

/// Create a new appointment (always `pending`)
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<NewAppointment>,
) -> ApiResult<impl IntoResponse> {
    let appointment_date =
        validation::validate_date(&payload.appointment_date).map_err(ApiError::Validation)?;
    let appointment_time =
        validation::validate_time(&payload.appointment_time).map_err(ApiError::Validation)?;

    if let Some(notes) = &payload.notes {
        validation::validate_notes(notes).map_err(ApiError::Validation)?;
    }

    let staff_preferences = payload.staff_preferences.clone().unwrap_or_default();
    validation::validate_staff_preferences(&staff_preferences).map_err(ApiError::Validation)?;

    let company = load_company(&state, payload.company_id).await?;
    if company.status != CompanyStatus::Active {
        return Err(ApiError::Validation(
            "Company is not accepting appointments".to_string(),
        ));
    }

    let service = load_service(&state, payload.service_id).await?;
    if service.company_id != company.id {
        return Err(ApiError::Validation(
            "Service does not belong to this company".to_string(),
        ));
    }
    if service.status != ServiceStatus::Active {
        return Err(ApiError::Validation("Service is not active".to_string()));
    }

    if let Some(staff_id) = payload.staff_id {
        ensure_staff_of_company(&state, staff_id, company.id).await?;
    }

    // Only admins and owners book on a customer's behalf; everyone else
    // books for themselves no matter what the payload claims.
    let user_id = if auth.role.can_manage_appointments() {
        payload.user_id.unwrap_or(auth.id)
    } else {
        auth.id
    };

    let record = NewAppointmentRecord {
        user_id,
        company_id: company.id,
        service_id: service.id,
        appointment_date,
        appointment_time,
        notes: payload.notes,
        staff_id: payload.staff_id,
        staff_preferences,
    };

    let appointment = state
        .appointment_repository
        .create(&record)
        .await
        .map_err(|e| {
            error!("Failed to create appointment: {}", e);
            ApiError::Internal
        })?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Role-scoped appointment listing
///
/// Bursts of identical listings share one database load through the
/// coalescing cache; the key carries the viewer scope so different viewers
/// never share a flight.
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let appointments = match auth.role {
        Role::Admin => {
            let repo = state.appointment_repository.clone();
            state
                .listing_cache
                .coalesce(&request_key("GET", "/appointments", "all"), || async move {
                    repo.list_all().await.map_err(|e| {
                        error!("Failed to list appointments: {}", e);
                        ApiError::Internal
                    })
                })
                .await?
        }
        Role::Owner => {
            let company = owned_company(&state, &auth).await?;
            let repo = state.appointment_repository.clone();
            let scope = format!("company:{}", company.id);
            state
                .listing_cache
                .coalesce(&request_key("GET", "/appointments", &scope), || async move {
                    repo.list_by_company(company.id).await.map_err(|e| {
                        error!("Failed to list company appointments: {}", e);
                        ApiError::Internal
                    })
                })
                .await?
        }
        Role::Staff => {
            let repo = state.appointment_repository.clone();
            let user_id = auth.id;
            let scope = format!("staff:{}", user_id);
            state
                .listing_cache
                .coalesce(&request_key("GET", "/appointments", &scope), || async move {
                    repo.list_by_staff_user(user_id).await.map_err(|e| {
                        error!("Failed to list staff appointments: {}", e);
                        ApiError::Internal
                    })
                })
                .await?
        }
        Role::User => {
            let repo = state.appointment_repository.clone();
            let user_id = auth.id;
            let scope = format!("user:{}", user_id);
            state
                .listing_cache
                .coalesce(&request_key("GET", "/appointments", &scope), || async move {
                    repo.list_by_user(user_id).await.map_err(|e| {
                        error!("Failed to list user appointments: {}", e);
                        ApiError::Internal
                    })
                })
                .await?
        }
    };

    Ok(Json(appointments))
}

/// Explicit admin-only listing of every appointment
pub async fn list_all_appointments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    if !auth.role.is_admin() {
        return Err(ApiError::Permission(
            "Administrator access required".to_string(),
        ));
    }

    let repo = state.appointment_repository.clone();
    let appointments = state
        .listing_cache
        .coalesce(
            &request_key("GET", "/appointments/all", "all"),
            || async move {
                repo.list_all().await.map_err(|e| {
                    error!("Failed to list appointments: {}", e);
                    ApiError::Internal
                })
            },
        )
        .await?;

    Ok(Json(appointments))
}

/// Get an appointment by ID
pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let appointment = load_appointment(&state, id).await?;
    ensure_can_view_appointment(&state, &auth, &appointment).await?;

    Ok(Json(appointment))
}

/// Generic appointment update
///
/// Customers may move their own booking (`date`, `time`, `notes`); the
/// restricted fields are stripped from their payloads before the write.
/// Admins and owners may additionally set `status`, `staff_id` and
/// `staff_preferences`, subject to the transition graph and the
/// same-company rule.
pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateAppointment>,
) -> ApiResult<impl IntoResponse> {
    let appointment = load_appointment(&state, id).await?;
    ensure_can_modify_appointment(&state, &auth, &appointment).await?;

    if !auth.role.can_manage_appointments() {
        let stripped = payload.strip_restricted();
        if !stripped.is_empty() {
            warn!(
                "Stripped restricted fields {:?} from appointment {} update by user {}",
                stripped, appointment.id, auth.id
            );
        }
    }

    let appointment_date = payload
        .appointment_date
        .as_deref()
        .map(validation::validate_date)
        .transpose()
        .map_err(ApiError::Validation)?;
    let appointment_time = payload
        .appointment_time
        .as_deref()
        .map(validation::validate_time)
        .transpose()
        .map_err(ApiError::Validation)?;

    if let Some(notes) = &payload.notes {
        validation::validate_notes(notes).map_err(ApiError::Validation)?;
    }
    if let Some(preferences) = &payload.staff_preferences {
        validation::validate_staff_preferences(preferences).map_err(ApiError::Validation)?;
    }

    if let Some(next) = payload.status {
        if !appointment.status.can_transition_to(next) {
            return Err(ApiError::Validation(format!(
                "Cannot move an appointment from {} to {}",
                appointment.status, next
            )));
        }
        if next == AppointmentStatus::Confirmed
            && payload.staff_id.is_none()
            && appointment.staff_id.is_none()
        {
            return Err(ApiError::Validation(
                "Please select a staff member".to_string(),
            ));
        }
    }

    if let Some(staff_id) = payload.staff_id {
        ensure_staff_of_company(&state, staff_id, appointment.company_id).await?;
    }

    let updated = state
        .appointment_repository
        .update_fields(
            appointment.id,
            appointment_date,
            appointment_time,
            payload.notes.as_deref(),
            payload.status,
            payload.staff_id,
            payload.staff_preferences.as_deref(),
        )
        .await
        .map_err(|e| {
            error!("Failed to update appointment: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?;

    Ok(Json(updated))
}

/// The assignment workflow: set status and bind staff in one transition
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentStatus>,
) -> ApiResult<impl IntoResponse> {
    let appointment = load_appointment(&state, id).await?;
    ensure_company_manager(&state, &auth, appointment.company_id).await?;

    if payload.status == AppointmentStatus::Confirmed
        && payload.staff_id.is_none()
        && appointment.staff_id.is_none()
    {
        return Err(ApiError::Validation(
            "Please select a staff member".to_string(),
        ));
    }

    if !appointment.status.can_transition_to(payload.status) {
        return Err(ApiError::Validation(format!(
            "Cannot move an appointment from {} to {}",
            appointment.status, payload.status
        )));
    }

    if let Some(staff_id) = payload.staff_id {
        ensure_staff_of_company(&state, staff_id, appointment.company_id).await?;
    }

    let updated = state
        .appointment_repository
        .update_status(appointment.id, payload.status, payload.staff_id)
        .await
        .map_err(|e| {
            error!("Failed to update appointment status: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?;

    Ok(Json(updated))
}

/// Roster partition and staff suggestion for the assignment dialog
pub async fn assignment_options(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let appointment = load_appointment(&state, id).await?;
    ensure_company_manager(&state, &auth, appointment.company_id).await?;

    let roster = state
        .staff_repository
        .list_by_company(appointment.company_id)
        .await
        .map_err(|e| {
            error!("Failed to load company roster: {}", e);
            ApiError::Internal
        })?;

    let resolved = resolver::resolve(&roster, &appointment.staff_preferences);
    let suggested = resolver::suggest(&roster, &appointment.staff_preferences, appointment.staff_id);

    Ok(Json(AssignmentOptions {
        preferred: resolved.preferred,
        other: resolved.other,
        suggested,
    }))
}

/// Delete an appointment
pub async fn delete_appointment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let appointment = load_appointment(&state, id).await?;
    ensure_can_modify_appointment(&state, &auth, &appointment).await?;

    let deleted = state
        .appointment_repository
        .delete(appointment.id)
        .await
        .map_err(|e| {
            error!("Failed to delete appointment: {}", e);
            ApiError::Internal
        })?;

    if !deleted {
        return Err(ApiError::NotFound("Appointment not found".to_string()));
    }

    Ok(Json(json!({"message": "Appointment deleted successfully"})))
}

// ---------------------------------------------------------------------------
// Staff directory
// ---------------------------------------------------------------------------

/// Add a user to a company's roster
pub async fn create_staff(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<NewStaff>,
) -> ApiResult<impl IntoResponse> {
    load_company(&state, payload.company_id).await?;
    ensure_company_manager(&state, &auth, payload.company_id).await?;

    let working_hours_start = payload
        .working_hours_start
        .as_deref()
        .map(validation::validate_time)
        .transpose()
        .map_err(ApiError::Validation)?;
    let working_hours_end = payload
        .working_hours_end
        .as_deref()
        .map(validation::validate_time)
        .transpose()
        .map_err(ApiError::Validation)?;
    validation::validate_working_hours(working_hours_start, working_hours_end)
        .map_err(ApiError::Validation)?;

    state
        .user_repository
        .find_by_id(payload.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let already_staffed = state
        .staff_repository
        .find_by_company_and_user(payload.company_id, payload.user_id)
        .await
        .map_err(|e| {
            error!("Failed to check existing staffing: {}", e);
            ApiError::Internal
        })?;
    if already_staffed.is_some() {
        return Err(ApiError::Conflict(
            "User is already a staff member at this company".to_string(),
        ));
    }

    let staff = state
        .staff_repository
        .create(
            payload.company_id,
            payload.user_id,
            working_hours_start,
            working_hours_end,
            payload.skills.as_deref(),
            payload.professional_qualifications.as_deref(),
        )
        .await
        .map_err(|e| {
            error!("Failed to create staff record: {}", e);
            ApiError::Internal
        })?;

    Ok((StatusCode::CREATED, Json(staff)))
}

/// Partially update a staff record
pub async fn update_staff(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStaff>,
) -> ApiResult<impl IntoResponse> {
    let staff = load_staff(&state, id).await?;
    ensure_company_manager(&state, &auth, staff.company_id).await?;

    let working_hours_start = payload
        .working_hours_start
        .as_deref()
        .map(validation::validate_time)
        .transpose()
        .map_err(ApiError::Validation)?;
    let working_hours_end = payload
        .working_hours_end
        .as_deref()
        .map(validation::validate_time)
        .transpose()
        .map_err(ApiError::Validation)?;

    // Validate the hours as they will be stored, not just the new values.
    validation::validate_working_hours(
        working_hours_start.or(staff.working_hours_start),
        working_hours_end.or(staff.working_hours_end),
    )
    .map_err(ApiError::Validation)?;

    let updated = state
        .staff_repository
        .update(staff.id, &payload, working_hours_start, working_hours_end)
        .await
        .map_err(|e| {
            error!("Failed to update staff record: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Staff member not found".to_string()))?;

    Ok(Json(updated))
}

/// Remove a staff record; bound appointments lose the binding
pub async fn delete_staff(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let staff = load_staff(&state, id).await?;
    ensure_company_manager(&state, &auth, staff.company_id).await?;

    let deleted = state.staff_repository.delete(staff.id).await.map_err(|e| {
        error!("Failed to delete staff record: {}", e);
        ApiError::Internal
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Staff member not found".to_string()));
    }

    Ok(Json(json!({"message": "Staff member removed successfully"})))
}

/// Full roster of a company, regardless of staff status
pub async fn list_staff_by_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    load_company(&state, company_id).await?;

    let staff = state
        .staff_repository
        .list_by_company(company_id)
        .await
        .map_err(|e| {
            error!("Failed to list staff: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(staff))
}

/// Customer accounts an owner can still staff at their company
pub async fn list_available_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AvailableUsersQuery>,
) -> ApiResult<impl IntoResponse> {
    load_company(&state, query.company_id).await?;
    ensure_company_manager(&state, &auth, query.company_id).await?;

    let users = if query.all {
        state.user_repository.list_customers().await
    } else {
        state
            .user_repository
            .list_available_for_company(query.company_id)
            .await
    }
    .map_err(|e| {
        error!("Failed to list available users: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(users))
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// Register a company; it starts `pending` until an admin activates it
pub async fn create_company(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<NewCompany>,
) -> ApiResult<impl IntoResponse> {
    if !auth.role.is_owner() {
        return Err(ApiError::Permission("Owner access required".to_string()));
    }

    let existing = state
        .company_repository
        .find_by_owner(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to check existing company: {}", e);
            ApiError::Internal
        })?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Owner already manages a company".to_string(),
        ));
    }

    let company = state
        .company_repository
        .create(auth.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create company: {}", e);
            ApiError::Internal
        })?;

    Ok((StatusCode::CREATED, Json(company)))
}

/// Admin-only company directory
pub async fn list_companies(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    if !auth.role.is_admin() {
        return Err(ApiError::Permission(
            "Administrator access required".to_string(),
        ));
    }

    let companies = state.company_repository.list_all().await.map_err(|e| {
        error!("Failed to list companies: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(companies))
}

/// Get a company by ID (admin or its owner)
pub async fn get_company(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let company = load_company(&state, id).await?;

    if !auth.role.is_admin() && company.owner_user_id != auth.id {
        return Err(ApiError::Permission(
            "You may only view your own company".to_string(),
        ));
    }

    Ok(Json(company))
}

/// Admin-only company lifecycle transition
pub async fn update_company_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyStatus>,
) -> ApiResult<impl IntoResponse> {
    if !auth.role.is_admin() {
        return Err(ApiError::Permission(
            "Administrator access required".to_string(),
        ));
    }

    let company = state
        .company_repository
        .set_status(id, payload.status)
        .await
        .map_err(|e| {
            error!("Failed to update company status: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(company))
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Add a service to a company's catalog
pub async fn create_service(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<NewService>,
) -> ApiResult<impl IntoResponse> {
    load_company(&state, payload.company_id).await?;
    ensure_company_manager(&state, &auth, payload.company_id).await?;
    validation::validate_price(payload.price).map_err(ApiError::Validation)?;

    let service = state
        .service_repository
        .create(&payload)
        .await
        .map_err(|e| {
            error!("Failed to create service: {}", e);
            ApiError::Internal
        })?;

    Ok((StatusCode::CREATED, Json(service)))
}

/// Partially update a service
pub async fn update_service(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateService>,
) -> ApiResult<impl IntoResponse> {
    let service = load_service(&state, id).await?;
    ensure_company_manager(&state, &auth, service.company_id).await?;

    if let Some(price) = payload.price {
        validation::validate_price(price).map_err(ApiError::Validation)?;
    }

    let updated = state
        .service_repository
        .update(service.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update service: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a service
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let service = load_service(&state, id).await?;
    ensure_company_manager(&state, &auth, service.company_id).await?;

    let deleted = state
        .service_repository
        .delete(service.id)
        .await
        .map_err(|e| {
            error!("Failed to delete service: {}", e);
            ApiError::Internal
        })?;

    if !deleted {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }

    Ok(Json(json!({"message": "Service deleted successfully"})))
}

/// A company's service catalog (any authenticated caller)
pub async fn list_services_by_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    load_company(&state, company_id).await?;

    let services = state
        .service_repository
        .list_by_company(company_id)
        .await
        .map_err(|e| {
            error!("Failed to list services: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(services))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Admin-only user directory
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    if !auth.role.is_admin() {
        return Err(ApiError::Permission(
            "Administrator access required".to_string(),
        ));
    }

    let users = state.user_repository.list_all().await.map_err(|e| {
        error!("Failed to list users: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_options_wire_format() {
        let options = AssignmentOptions {
            preferred: vec![],
            other: vec![],
            suggested: None,
        };

        let value = serde_json::to_value(&options).unwrap();
        assert!(value.get("preferred").is_some());
        assert!(value.get("other").is_some());
        assert!(value.get("suggested").is_some());
    }

    #[test]
    fn test_available_users_query_defaults() {
        let query: AvailableUsersQuery = serde_json::from_str(
            r#"{"companyId":"8c2df548-1f9e-4f7b-a3e2-47fbd1f98e10"}"#,
        )
        .unwrap();
        assert!(!query.all);
    }
}
