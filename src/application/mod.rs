//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls and enforce business rules, giving
//! HTTP handlers and the admin CLI a single entry point.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link lifecycle: shorten, resolve, stats, delete

pub mod services;
