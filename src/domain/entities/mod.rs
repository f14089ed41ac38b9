//! Core domain entities.
//!
//! - [`Link`] - A shortened URL mapping
//! - [`NewLink`] - Input for creating a link
//! - [`LinkStatus`] - Derived `live`/`expired`/`deleted` state

pub mod link;

pub use link::{Link, LinkStatus, NewLink};
