//! # Warehouse Core
//!
//! Foundational types shared by every crate of the warehouse API:
//!
//! - [`errors`]: [`AppError`], the single error type handlers return
//! - [`pagination`]: list query parameters and response metadata
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: date/month wire formats used by stock forms and snapshots

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
