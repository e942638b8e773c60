//! Core data model shared by every router crate.
//!
//! Mirrors `neuron-types`' role in the framework this workspace is
//! grounded on: a dependency-free crate of plain, serde-friendly types
//! that the registry, classifier, adapters, engine, and tool framework
//! all build on.

#![deny(missing_docs)]

pub mod error;
pub mod model;
pub mod classification;
pub mod execution;
pub mod tool;

pub use error::{ErrorKind, RouterError};
pub use model::{BackendAddress, BackendKind, Capability, DescriptorError, ModelDescriptor, SpeedClass};
pub use classification::{Category, Complexity, TaskClassification};
pub use execution::ExecutionResult;
pub use tool::{
    ParameterSpec, ParameterType, ResourceProfile, SecurityScope, ToolCategory, ToolManifest,
    ToolResult, TrustLevel,
};
