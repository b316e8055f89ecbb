//! Application state shared across handlers

use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::repositories::{
    ContributionRepository, DepartmentRepository, EventRepository, ReportRepository,
    SignupRepository, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub department_repository: DepartmentRepository,
    pub event_repository: EventRepository,
    pub signup_repository: SignupRepository,
    pub contribution_repository: ContributionRepository,
    pub report_repository: ReportRepository,
}

impl AppState {
    /// Build the state with one repository per aggregate over a shared pool
    pub fn new(pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            department_repository: DepartmentRepository::new(pool.clone()),
            event_repository: EventRepository::new(pool.clone()),
            signup_repository: SignupRepository::new(pool.clone()),
            contribution_repository: ContributionRepository::new(pool.clone()),
            report_repository: ReportRepository::new(pool.clone()),
            db_pool: pool,
            jwt_service,
        }
    }
}
