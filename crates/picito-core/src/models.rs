//! Domain models for Picito.
//!
//! These are the core types shared across all crates.

pub mod identity;
pub mod membership;
pub mod organization;
pub mod project;
pub mod role;
pub mod setting;
pub mod user;
