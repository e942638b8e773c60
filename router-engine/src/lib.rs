#![deny(missing_docs)]
//! Adapter pool, router, and execution engine: the request path from
//! classified text to a generated response.

mod engine;
mod pool;
mod router;

pub use engine::{EngineStats, ExecuteOptions, ExecutionEngine, ModelStats};
pub use pool::AdapterPool;
pub use router::{Router, RouterStats, RoutingOptions, Strategy};
