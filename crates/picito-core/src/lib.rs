//! Picito Core — domain models, role tables, invariants and repository
//! traits shared by every other crate.

pub mod error;
pub mod models;
pub mod ownership;
pub mod permission;
pub mod repository;
pub mod slug;
pub mod validation;

pub use error::{PicitoError, PicitoResult};
