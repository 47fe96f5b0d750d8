//! # naming
//!
//! Collision-free block names for exported configuration.
//!
//! When live resources are exported into declarative configuration, each
//! one needs a block name derived from its human-readable display name.
//! Display names collide (two dashboards called "Overview"), differ only in
//! case, or come back already suffixed from a previous export. This crate
//! turns such a stream of candidates into unique, stable names.
//!
//! ## Example
//!
//! ```
//! use naming::{NameAllocator, resource_name, sanitize};
//!
//! let names = NameAllocator::new().with_replace(resource_name);
//!
//! // Names already present in hand-written files are never reused
//! names.block("Overview");
//!
//! let name = names.next(&sanitize("Overview")).unwrap();
//! assert_eq!(name, "Overview_1");
//!
//! // Detect two resources being written under the same name
//! assert!(!names.mark_emitted(&name));
//! assert!(names.mark_emitted(&name));
//! ```

#![warn(missing_docs)]

pub mod allocator;
pub mod error;
pub mod replace;
pub mod sanitize;

pub use allocator::{DEFAULT_MAX_ATTEMPTS, NameAllocator, base_name};
pub use error::{Error, Result};
pub use replace::{Replace, default_replace, resource_name};
pub use sanitize::{is_valid_identifier, sanitize};
