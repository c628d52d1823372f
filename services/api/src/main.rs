use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod jwt;
mod middleware;
mod models;
mod repositories;
mod resolver;
mod routes;
mod state;
mod validation;

use common::cache::RequestCache;
use common::database::{DatabaseConfig, init_pool};

use crate::{
    jwt::{JwtConfig, TokenVerifier},
    repositories::{
        CompanyRepository, ServiceRepository, UserRepository,
        appointment::AppointmentRepository, staff::StaffRepository,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting appointment service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply pending schema migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    // Initialize the token verifier
    let jwt_config = JwtConfig::from_env()?;
    let verifier = TokenVerifier::new(&jwt_config)?;

    // Initialize repositories
    let appointment_repository = AppointmentRepository::new(pool.clone());
    let staff_repository = StaffRepository::new(pool.clone());
    let company_repository = CompanyRepository::new(pool.clone());
    let service_repository = ServiceRepository::new(pool.clone());
    let user_repository = UserRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        verifier,
        appointment_repository,
        staff_repository,
        company_repository,
        service_repository,
        user_repository,
        listing_cache: RequestCache::new(),
    };

    info!("Appointment service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Appointment service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
