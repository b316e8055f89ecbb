//! Integration tests for the signup and contribution workflows
//!
//! These tests run against a real PostgreSQL database and exercise the
//! capacity, duplicate-signup, and approval invariants end to end. Every
//! test creates its own users, departments, and events, so they can run
//! against a shared database in any order.

use chrono::{Duration, Utc};
use common::database::{DatabaseConfig, init_pool};
use sqlx::PgPool;
use uuid::Uuid;

use api::error::ApiError;
use api::middleware::AuthUser;
use api::models::contribution::{ContributionRequest, ContributionStatus};
use api::models::department::Department;
use api::models::event::{Event, EventRequest};
use api::models::user::RegisterRequest;
use api::repositories::{
    ContributionRepository, DepartmentRepository, EventRepository, ReportRepository,
    SignupRepository, UserRepository,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn setup_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

async fn create_volunteer(pool: &PgPool) -> Result<AuthUser, Box<dyn std::error::Error>> {
    let username = unique("vol");
    let user = UserRepository::new(pool.clone())
        .create(&RegisterRequest {
            username: username.clone(),
            email: format!("{username}@example.org"),
            password: "volunteer-pass-1".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .await?;

    Ok(AuthUser {
        id: user.id,
        username: user.username,
        is_coordinator: false,
        department_id: None,
    })
}

async fn create_coordinator(
    pool: &PgPool,
    department_id: Option<Uuid>,
) -> Result<AuthUser, Box<dyn std::error::Error>> {
    let volunteer = create_volunteer(pool).await?;
    UserRepository::new(pool.clone())
        .set_coordinator(volunteer.id, true, department_id)
        .await?;

    Ok(AuthUser {
        is_coordinator: true,
        department_id,
        ..volunteer
    })
}

async fn create_department(pool: &PgPool) -> Result<Department, Box<dyn std::error::Error>> {
    let department = DepartmentRepository::new(pool.clone())
        .get_or_create(&unique("dept"))
        .await?;
    Ok(department)
}

async fn create_event(
    pool: &PgPool,
    created_by: Uuid,
    capacity: i32,
) -> Result<Event, Box<dyn std::error::Error>> {
    let event = EventRepository::new(pool.clone())
        .create(
            created_by,
            &EventRequest {
                title: unique("event"),
                description: String::new(),
                department_id: None,
                date: Utc::now() + Duration::days(7),
                location: "Community hall".to_string(),
                capacity,
            },
        )
        .await?;
    Ok(event)
}

fn pending_contribution(department_id: Uuid, hours: f64) -> ContributionRequest {
    ContributionRequest {
        event_id: None,
        department_id,
        date: Utc::now().date_naive(),
        hours,
        description: "Sorting donations".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_capacity_enforced_for_last_spot() -> TestResult {
    let pool = setup_pool().await?;
    let signups = SignupRepository::new(pool.clone());
    let events = EventRepository::new(pool.clone());

    let coordinator = create_coordinator(&pool, None).await?;
    let event = create_event(&pool, coordinator.id, 2).await?;

    let first = create_volunteer(&pool).await?;
    let second = create_volunteer(&pool).await?;
    let third = create_volunteer(&pool).await?;

    signups.signup(first.id, event.id).await?;
    signups.signup(second.id, event.id).await?;

    let result = signups.signup(third.id, event.id).await;
    assert!(matches!(result, Err(ApiError::EventFull)));

    let view = events.find_by_id(event.id).await?.unwrap();
    assert_eq!(view.confirmed_count, 2);
    assert_eq!(view.remaining_capacity, Some(0));
    assert!(view.is_full);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_unlimited_capacity_accepts_everyone() -> TestResult {
    let pool = setup_pool().await?;
    let signups = SignupRepository::new(pool.clone());

    let coordinator = create_coordinator(&pool, None).await?;
    let event = create_event(&pool, coordinator.id, 0).await?;

    for _ in 0..3 {
        let volunteer = create_volunteer(&pool).await?;
        signups.signup(volunteer.id, event.id).await?;
    }

    let view = EventRepository::new(pool.clone())
        .find_by_id(event.id)
        .await?
        .unwrap();
    assert_eq!(view.confirmed_count, 3);
    assert_eq!(view.remaining_capacity, None);
    assert!(!view.is_full);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_duplicate_signup_rejected() -> TestResult {
    let pool = setup_pool().await?;
    let signups = SignupRepository::new(pool.clone());

    let coordinator = create_coordinator(&pool, None).await?;
    let event = create_event(&pool, coordinator.id, 5).await?;
    let volunteer = create_volunteer(&pool).await?;

    signups.signup(volunteer.id, event.id).await?;

    let result = signups.signup(volunteer.id, event.id).await;
    assert!(matches!(result, Err(ApiError::AlreadySignedUp)));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_cancel_and_resignup_reuses_row() -> TestResult {
    let pool = setup_pool().await?;
    let signups = SignupRepository::new(pool.clone());

    let coordinator = create_coordinator(&pool, None).await?;
    let event = create_event(&pool, coordinator.id, 5).await?;
    let volunteer = create_volunteer(&pool).await?;

    let original = signups.signup(volunteer.id, event.id).await?;
    signups.cancel(original.id, volunteer.id).await?;

    // Cancelling twice comes back as NotFound.
    let result = signups.cancel(original.id, volunteer.id).await;
    assert!(matches!(result, Err(ApiError::NotFound)));

    // Re-signing flips the existing row back instead of inserting a new one.
    let renewed = signups.signup(volunteer.id, event.id).await?;
    assert_eq!(renewed.id, original.id);
    assert!(signups.is_signed_up(volunteer.id, event.id).await?);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_event_contribution_requires_signup() -> TestResult {
    let pool = setup_pool().await?;
    let contributions = ContributionRepository::new(pool.clone());
    let signups = SignupRepository::new(pool.clone());

    let department = create_department(&pool).await?;
    let coordinator = create_coordinator(&pool, None).await?;
    let event = create_event(&pool, coordinator.id, 5).await?;
    let volunteer = create_volunteer(&pool).await?;

    let mut request = pending_contribution(department.id, 2.5);
    request.event_id = Some(event.id);

    let result = contributions.submit(&volunteer, &request).await;
    assert!(matches!(result, Err(ApiError::NotSignedUp)));

    signups.signup(volunteer.id, event.id).await?;
    let contribution = contributions.submit(&volunteer, &request).await?;
    assert_eq!(contribution.status, ContributionStatus::Pending);

    // Coordinators can log hours against an event without a signup.
    let logged = contributions.submit(&coordinator, &request).await?;
    assert_eq!(logged.event_id, Some(event.id));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_review_is_single_shot() -> TestResult {
    let pool = setup_pool().await?;
    let contributions = ContributionRepository::new(pool.clone());

    let department = create_department(&pool).await?;
    let coordinator = create_coordinator(&pool, None).await?;
    let volunteer = create_volunteer(&pool).await?;

    let contribution = contributions
        .submit(&volunteer, &pending_contribution(department.id, 4.0))
        .await?;

    let approved = contributions.approve(contribution.id, coordinator.id).await?;
    assert_eq!(approved.status, ContributionStatus::Approved);
    assert_eq!(approved.approved_by, Some(coordinator.id));
    assert!(approved.approved_at.is_some());

    let result = contributions.approve(contribution.id, coordinator.id).await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));

    let result = contributions
        .reject(contribution.id, coordinator.id, "too late")
        .await;
    assert!(matches!(result, Err(ApiError::InvalidState(_))));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_reject_and_revert_clears_metadata() -> TestResult {
    let pool = setup_pool().await?;
    let contributions = ContributionRepository::new(pool.clone());

    let department = create_department(&pool).await?;
    let coordinator = create_coordinator(&pool, None).await?;
    let volunteer = create_volunteer(&pool).await?;

    let contribution = contributions
        .submit(&volunteer, &pending_contribution(department.id, 1.5))
        .await?;

    let rejected = contributions
        .reject(contribution.id, coordinator.id, "No matching shift on record")
        .await?;
    assert_eq!(rejected.status, ContributionStatus::Rejected);
    assert_eq!(rejected.rejection_reason, "No matching shift on record");
    assert_eq!(rejected.approved_by, Some(coordinator.id));

    let reverted = contributions
        .set_status(contribution.id, ContributionStatus::Pending, coordinator.id)
        .await?;
    assert_eq!(reverted.status, ContributionStatus::Pending);
    assert_eq!(reverted.approved_by, None);
    assert_eq!(reverted.approved_at, None);
    assert_eq!(reverted.rejection_reason, "");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_report_aggregation_rounds_to_two_decimals() -> TestResult {
    let pool = setup_pool().await?;
    let contributions = ContributionRepository::new(pool.clone());
    let reports = ReportRepository::new(pool.clone());

    let department = create_department(&pool).await?;
    let coordinator = create_coordinator(&pool, None).await?;
    let volunteer = create_volunteer(&pool).await?;

    for hours in [2.0, 3.0, 5.0] {
        let contribution = contributions
            .submit(&volunteer, &pending_contribution(department.id, hours))
            .await?;
        contributions.approve(contribution.id, coordinator.id).await?;
    }

    assert_eq!(reports.user_total_hours(volunteer.id).await?, 10.0);

    let totals = reports.department_totals(None, None).await?;
    let department_total = totals
        .iter()
        .find(|t| t.department == department.name)
        .expect("department missing from totals");
    assert_eq!(department_total.hours, 10.0);

    // 10 hours over 3 contributions averages to 3.33, not a long tail.
    let averages = reports.department_averages(None, None).await?;
    let department_average = averages
        .iter()
        .find(|a| a.department == department.name)
        .expect("department missing from averages");
    assert_eq!(department_average.avg_hours, 3.33);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_concurrent_signups_for_last_spot() -> TestResult {
    let pool = setup_pool().await?;
    let signups = SignupRepository::new(pool.clone());

    let coordinator = create_coordinator(&pool, None).await?;
    let event = create_event(&pool, coordinator.id, 1).await?;
    let first = create_volunteer(&pool).await?;
    let second = create_volunteer(&pool).await?;

    // Both requests race for the single remaining spot on separate
    // connections; the event row lock serializes them.
    let (a, b) = tokio::join!(
        signups.signup(first.id, event.id),
        signups.signup(second.id, event.id)
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, ApiError::EventFull));
        }
    }

    let view = EventRepository::new(pool.clone())
        .find_by_id(event.id)
        .await?
        .unwrap();
    assert_eq!(view.confirmed_count, 1);
    assert!(view.is_full);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_promotion_keeps_target_department() -> TestResult {
    let pool = setup_pool().await?;
    let users = UserRepository::new(pool.clone());

    let own_department = create_department(&pool).await?;
    let other_department = create_department(&pool).await?;
    let volunteer = create_volunteer(&pool).await?;

    // Give the target a department of their own, then demote them again.
    users
        .set_coordinator(volunteer.id, true, Some(own_department.id))
        .await?;
    users.set_coordinator(volunteer.id, false, None).await?;

    // Re-promotion by a coordinator from another department must not
    // overwrite the target's existing assignment.
    let promoted = users
        .set_coordinator(volunteer.id, true, Some(other_department.id))
        .await?;
    assert!(promoted.is_coordinator);
    assert_eq!(promoted.department_id, Some(own_department.id));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_promote_and_demote_keep_department_assignment() -> TestResult {
    let pool = setup_pool().await?;
    let users = UserRepository::new(pool.clone());

    let department = create_department(&pool).await?;
    let coordinator = create_coordinator(&pool, Some(department.id)).await?;
    let volunteer = create_volunteer(&pool).await?;

    // Promotion inherits the promoting coordinator's department.
    let promoted = users
        .set_coordinator(volunteer.id, true, coordinator.department_id)
        .await?;
    assert!(promoted.is_coordinator);
    assert_eq!(promoted.department_id, Some(department.id));

    // Demotion leaves the department assignment in place.
    let demoted = users.set_coordinator(volunteer.id, false, None).await?;
    assert!(!demoted.is_coordinator);
    assert_eq!(demoted.department_id, Some(department.id));

    Ok(())
}
