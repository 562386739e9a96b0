use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool};
use linkcart_api::jwt::{JwtConfig, JwtService};
use linkcart_api::maintenance;
use linkcart_api::routes;
use linkcart_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Linkcart API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    let app_state = AppState::new(pool, jwt_service);

    // The scheduler stops when dropped, so hold on to it.
    let _scheduler =
        maintenance::start_reset_code_sweeper(app_state.user_repository.clone()).await?;

    info!("Linkcart API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!("Linkcart API service listening on {}", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
