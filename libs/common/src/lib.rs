//! Common library for the VolunTrack application
//!
//! This crate provides shared functionality used across the VolunTrack
//! services, including database connectivity and error handling.

pub mod database;
pub mod error;
