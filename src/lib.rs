//! # annotation-scanner
//!
//! Finds compiled Java classes under a build output directory that carry a
//! given annotation.
//!
//! ## Architecture
//!
//! - **scanner**: Scope set, directory walk and match collection
//! - **naming**: Candidate filtering and package/path/identifier conversions
//! - **registry**: Identifier-to-annotation lookup loaded from a JSON manifest
//! - **locale**: Numeric log message codes and their localized texts
//! - **error**: Public error types
//! - **config**: Root, manifest, locale and log filter resolution for the CLI

pub mod cli;
pub mod config;
pub mod error;
pub mod locale;
pub mod naming;
pub mod registry;
pub mod scanner;

pub use error::{ResolveError, ScanError};
pub use locale::Locale;
pub use registry::{Marker, MarkerRegistry, ResolvedType, TypeResolver};
pub use scanner::{Candidate, Scanner};
