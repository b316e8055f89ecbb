//! VolunTrack API service: accounts, events, signups, contributions,
//! and reports over a shared PostgreSQL pool.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
