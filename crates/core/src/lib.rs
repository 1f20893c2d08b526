//! `rockparade-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod datetime;
pub mod error;
pub mod id;

pub use datetime::format_registration_date;
pub use error::{DomainError, DomainResult, FormErrors};
pub use id::{BandId, Login};
