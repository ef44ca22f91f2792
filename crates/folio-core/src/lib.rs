//! Core types and trait definitions for the folio portfolio backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod about;
pub mod account;
pub mod clock;
pub mod contact;
pub mod error;
pub mod id;
pub mod ordering;
pub mod project;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use id::ObjectId;
