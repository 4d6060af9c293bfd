//! # tfops-engine
//!
//! Reconciliation engine driving Terraform runs (plan / apply / destroy) as
//! Kubernetes-style workloads.
//!
//! For each parent resource the engine computes, on every invocation, the
//! complete desired set of child resources (one worker pod plus supporting
//! objects) and a replacement status document, given only the parent's spec,
//! its last status, and a snapshot of its live children. It never issues
//! create/update/delete calls; an external framework performs the
//! live-to-desired diff and applies it.
//!
//! ## Guarantees
//!
//! - **Idempotent**: repeated calls with unchanged inputs produce unchanged
//!   outputs, safe under at-least-once delivery
//! - **Stateless**: all persisted state lives in the returned status, so a
//!   restarted operator resumes mid-flight runs cleanly
//! - **Gate-ordered**: missing dependencies surface as distinct pending
//!   states in a fixed order, never as failures
//!
//! ## Example
//!
//! ```rust,ignore
//! use tfops_core::{DesiredChildren, RunKind, RunStatus};
//! use tfops_engine::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::new("acme-prod"));
//! let mut status = parent.status.clone().unwrap_or_default();
//! let mut desired = DesiredChildren::new();
//! let next = engine.reconcile(
//!     &resources,
//!     RunKind::Apply,
//!     &parent,
//!     &mut status,
//!     &children,
//!     &mut desired,
//! )?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod deps;
pub mod detect;
pub mod error;
pub mod metrics;
pub mod pod;
pub mod reconcile;
pub mod source;
pub mod track;

pub use config::EngineConfig;
pub use deps::{ExternalResources, Unavailable};
pub use error::{Error, Result};
pub use reconcile::Engine;
pub use source::{ConfigMapSourceData, SourceBundle};
pub use track::PodCounts;
