#![deny(missing_docs)]
//! A small set of compiled-in tool bodies.
//!
//! Rust has no runtime class loading, so "enumerate classes implementing
//! the tool contract" is realized as a fixed map of builtin names to
//! zero-argument constructors. A discovered tool-unit manifest names one
//! of these keys; the registry looks it up and instantiates it, so
//! discovery stays data-driven even though construction stays inside the
//! type system.

mod current_time;
mod echo;
mod word_count;

pub use current_time::CurrentTimeTool;
pub use echo::EchoTool;
pub use word_count::WordCountTool;

use std::collections::HashMap;
use std::sync::Arc;

use router_tool::ToolDyn;

/// A zero-argument constructor for one builtin tool.
pub type ToolFactory = fn() -> Arc<dyn ToolDyn>;

/// The compiled-in name → constructor map that tool-unit manifests
/// resolve their `builtin` key against.
#[must_use]
pub fn factories() -> HashMap<&'static str, ToolFactory> {
    let mut map: HashMap<&'static str, ToolFactory> = HashMap::new();
    map.insert("echo", || Arc::new(EchoTool::new()));
    map.insert("current_time", || Arc::new(CurrentTimeTool::new()));
    map.insert("word_count", || Arc::new(WordCountTool::new()));
    map
}
