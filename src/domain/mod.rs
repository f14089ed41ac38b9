//! Domain layer containing business entities and logic.
//!
//! It defines entities, repository interfaces, and the background workers
//! that sit beside the request path, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Injectable time source for expiry checks
//! - [`hit_event`] - Resolution event model
//! - [`hit_worker`] - Asynchronous hit counter worker
//! - [`purge_worker`] - Periodic removal of soft-deleted rows
//!
//! # Hit Counting Flow
//!
//! 1. [`crate::application::services::LinkService::resolve`] finds a live link
//! 2. A [`hit_event::HitEvent`] is pushed into a bounded channel (non-blocking)
//! 3. [`hit_worker::run_hit_worker`] applies the increment with retry logic
//! 4. The counter is persisted via [`repositories::LinkRepository::increment_hit_by_id`]

pub mod clock;
pub mod entities;
pub mod hit_event;
pub mod hit_worker;
pub mod purge_worker;
pub mod repositories;
