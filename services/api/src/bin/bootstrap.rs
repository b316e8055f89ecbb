//! One-shot bootstrap command: seeds the default departments and the
//! initial coordinator account. Safe to run repeatedly.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use api::models::user::RegisterRequest;
use api::repositories::{DepartmentRepository, UserRepository};

const DEFAULT_DEPARTMENTS: [&str; 4] = ["Logistics", "Outreach", "Fundraising", "Cleanup"];

const COORDINATOR_USERNAME: &str = "coordinator";
const COORDINATOR_EMAIL: &str = "coordinator@voluntrack.local";
const COORDINATOR_PASSWORD: &str = "coordinator123";

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    let department_repository = DepartmentRepository::new(pool.clone());
    let user_repository = UserRepository::new(pool.clone());

    let mut first_department = None;
    for name in DEFAULT_DEPARTMENTS {
        let department = department_repository.get_or_create(name).await?;
        info!("Department ready: {}", department.name);
        first_department.get_or_insert(department);
    }

    let coordinator = match user_repository
        .find_by_username_or_email(COORDINATOR_USERNAME)
        .await?
    {
        Some(user) => {
            info!("Coordinator account already exists: {}", user.username);
            user
        }
        None => {
            let user = user_repository
                .create(&RegisterRequest {
                    username: COORDINATOR_USERNAME.to_string(),
                    email: COORDINATOR_EMAIL.to_string(),
                    password: COORDINATOR_PASSWORD.to_string(),
                    first_name: "Default".to_string(),
                    last_name: "Coordinator".to_string(),
                })
                .await?;
            info!("Created coordinator account: {}", user.username);
            user
        }
    };

    let department_id = first_department.map(|d| d.id);
    user_repository
        .set_coordinator(coordinator.id, true, department_id)
        .await?;

    info!("Bootstrap complete");
    Ok(())
}
