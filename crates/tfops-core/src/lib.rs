//! # tfops-core
//!
//! Shared resource model for the Terraform run reconciliation engine.
//!
//! This crate defines the documents exchanged between the orchestration
//! framework and the engine:
//!
//! - **Identity**: the run's kind and `{namespace}-{name}` workspace
//! - **State**: the closed lifecycle enum with fixed wire identifiers
//! - **Spec / Status**: the parent resource's declarative spec and the
//!   status document the engine fully replaces on every invocation
//! - **Children**: the read-only snapshot of live child objects and the
//!   append-only desired-children list with its claim model
//!
//! ## Crate Boundary
//!
//! `tfops-core` holds only data contracts. The reconciliation logic lives in
//! `tfops-engine`; transports and the diff/apply framework are external
//! collaborators that consume these types as JSON.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod children;
pub mod error;
pub mod id;
pub mod resource;
pub mod spec;
pub mod state;
pub mod status;

pub use children::{ChildResource, ChildrenSnapshot, DesiredChildren};
pub use error::{Error, Result};
pub use id::{RunIdentity, RunKind};
pub use resource::{RunResource, SyncRequest, SyncResponse};
pub use spec::RunSpec;
pub use state::RunState;
pub use status::{
    Condition, ConditionStatus, ConditionType, OutputVar, PodStatusSummary, RunStatus,
    SourcesStatus,
};
