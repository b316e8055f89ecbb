use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use api::jwt::{JwtConfig, JwtService};
use api::routes;
use api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting VolunTrack API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply pending migrations
    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    let app_state = AppState::new(pool, jwt_service);

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("VolunTrack API service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
