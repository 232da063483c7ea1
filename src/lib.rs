//! # pkgsieve - selector-based exclusion filtering for Kubernetes package manifests
//!
//! pkgsieve reads multi-document YAML manifest streams, applies the
//! configured exclusion selectors to every CustomResourceDefinition it
//! finds, and re-emits the surviving documents untouched. Definitions are
//! the only kind ever considered for exclusion; everything else in the
//! stream always passes through.
//!
//! ```bash
//! # keep example.org definitions, drop every other definition in the stream
//! pkgsieve filter --exclude group=example.org package.yaml
//! ```

pub mod cli;
pub mod config;
pub mod diag;
pub mod filter;
pub mod manifest;

pub use cli::{Cli, Output};
pub use config::FilterConfig;
pub use diag::{DiagnosticSink, MemorySink, TracingSink};
pub use filter::{FilterStats, ResourceFilter, ResourceSelector};
pub use manifest::PackageObject;

/// Result type alias for pkgsieve operations
pub type Result<T> = anyhow::Result<T>;
