//! # Board Core
//!
//! The domain layer of the bulletin board.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod paging;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::PostService;
