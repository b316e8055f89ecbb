//! Repositories for database operations
//!
//! One repository per aggregate, each owning a clone of the shared pool.
//! Queries are runtime sqlx queries; cross-request invariants (signup
//! capacity, approval metadata) are enforced here with transactions and
//! conditional updates.

pub mod contribution;
pub mod department;
pub mod event;
pub mod report;
pub mod signup;
pub mod user;

pub use contribution::ContributionRepository;
pub use department::DepartmentRepository;
pub use event::EventRepository;
pub use report::ReportRepository;
pub use signup::SignupRepository;
pub use user::UserRepository;
