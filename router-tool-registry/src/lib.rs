#![deny(missing_docs)]
//! Filesystem-driven discovery of tool-unit manifests.
//!
//! Walks one subdirectory per [`ToolCategory`], resolves each `*.toml`
//! unit's `builtin` key against the compiled-in factory map, and wraps
//! the constructed tool in a [`ToolPipeline`]. Grounded on the pack's
//! `walkdir`-based directory-walk idiom (the same crate the registry's
//! own test fixtures in the broader corpus build on with `tempfile`).

mod manifest;
mod report;

pub use manifest::ToolUnitManifest;
pub use report::{LoadFailure, LoadReport};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use router_tool::{ApprovalGate, ToolPipeline};
use router_types::{ErrorKind, ToolCategory, TrustLevel};
use walkdir::WalkDir;

const ALL_CATEGORIES: &[ToolCategory] = &[
    ToolCategory::Utility,
    ToolCategory::Data,
    ToolCategory::Web,
    ToolCategory::Development,
    ToolCategory::Automation,
    ToolCategory::System,
    ToolCategory::Knowledge,
];

/// A projection of a tool's manifest used by `ListAll`/`ListByCategory`.
#[derive(Debug, Clone)]
pub struct ManifestSummary {
    /// The tool's unique name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Discovery/category grouping.
    pub category: ToolCategory,
    /// How strictly this tool should be treated.
    pub trust_level: TrustLevel,
    /// Whether the approval gate must be consulted before execution.
    pub requires_confirmation: bool,
}

/// Tool instances indexed by name and category, built from a single
/// startup filesystem scan.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<ToolPipeline>>,
}

impl ToolRegistry {
    /// Walk `root`'s category subdirectories and instantiate every
    /// resolvable unit. Per-unit failures are recorded, not propagated.
    #[must_use]
    pub fn discover(root: &Path, approval_gate: Arc<dyn ApprovalGate>) -> (Self, LoadReport) {
        let factories = router_builtin_tools::factories();
        let mut tools = HashMap::new();
        let mut report = LoadReport::default();

        for category in ALL_CATEGORIES {
            let category_dir = root.join(category.directory_name());
            if !category_dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&category_dir).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() || entry.path().extension().and_then(|e| e.to_str()) != Some("toml") {
                    continue;
                }
                let path = entry.path().to_path_buf();
                match load_unit(&path, &factories, *category, Arc::clone(&approval_gate)) {
                    Ok((name, pipeline)) => {
                        if tools.contains_key(&name) {
                            report.failed.push(LoadFailure {
                                unit_path: path.display().to_string(),
                                error_message: format!("tool name `{name}` is already registered; later unit rejected"),
                                error_kind: ErrorKind::Validation,
                            });
                            continue;
                        }
                        tools.insert(name, pipeline);
                        report.loaded_count += 1;
                    }
                    Err(failure) => {
                        tracing::warn!(unit_path = %path.display(), error = %failure.error_message, "tool unit failed to load");
                        report.failed.push(failure);
                    }
                }
            }
        }

        (Self { tools }, report)
    }

    /// Look up one tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ToolPipeline>> {
        self.tools.get(name).cloned()
    }

    /// Every registered tool's manifest summary.
    #[must_use]
    pub fn list_all(&self) -> Vec<ManifestSummary> {
        self.tools.values().map(|p| summarize(p)).collect()
    }

    /// Manifest summaries for tools in `category`.
    #[must_use]
    pub fn list_by_category(&self, category: ToolCategory) -> Vec<ManifestSummary> {
        self.tools
            .values()
            .map(|p| summarize(p))
            .filter(|s| s.category == category)
            .collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn summarize(pipeline: &ToolPipeline) -> ManifestSummary {
    let manifest = pipeline.manifest();
    ManifestSummary {
        name: manifest.name.clone(),
        description: manifest.description.clone(),
        category: manifest.category,
        trust_level: manifest.trust_level,
        requires_confirmation: manifest.requires_confirmation,
    }
}

fn load_unit(
    path: &Path,
    factories: &HashMap<&'static str, router_builtin_tools::ToolFactory>,
    category: ToolCategory,
    approval_gate: Arc<dyn ApprovalGate>,
) -> Result<(String, Arc<ToolPipeline>), LoadFailure> {
    let fail = |message: String| LoadFailure {
        unit_path: path.display().to_string(),
        error_message: message,
        error_kind: ErrorKind::Validation,
    };

    let text = std::fs::read_to_string(path).map_err(|e| fail(format!("could not read unit: {e}")))?;
    let unit: ToolUnitManifest = toml::from_str(&text).map_err(|e| fail(format!("invalid unit manifest: {e}")))?;

    let factory = factories
        .get(unit.builtin.as_str())
        .ok_or_else(|| fail(format!("unknown builtin `{}`", unit.builtin)))?;

    let tool = factory();
    if tool.manifest().name != unit.name {
        return Err(fail(format!(
            "unit declares name `{}` but builtin `{}` constructs a tool named `{}`",
            unit.name,
            unit.builtin,
            tool.manifest().name
        )));
    }
    if tool.manifest().category != category {
        return Err(fail(format!(
            "unit `{}` sits under `{}` but its tool declares category {:?}",
            unit.name,
            category.directory_name(),
            tool.manifest().category
        )));
    }

    let name = tool.manifest().name.clone();
    Ok((name, Arc::new(ToolPipeline::new(tool, approval_gate))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_tool::{ApprovalDecision, ToolCall, ToolContext};
    use std::future::Future;
    use std::pin::Pin;

    struct AlwaysApprove;
    impl ApprovalGate for AlwaysApprove {
        fn request<'a>(&'a self, _call: &'a ToolCall, _ctx: &'a ToolContext) -> Pin<Box<dyn Future<Output = ApprovalDecision> + Send + 'a>> {
            Box::pin(async { ApprovalDecision::Approved })
        }
    }

    fn write_unit(dir: &Path, category: ToolCategory, file_name: &str, name: &str, builtin: &str) {
        let category_dir = dir.join(category.directory_name());
        std::fs::create_dir_all(&category_dir).unwrap();
        std::fs::write(
            category_dir.join(file_name),
            format!("name = \"{name}\"\nbuiltin = \"{builtin}\"\n"),
        )
        .unwrap();
    }

    #[test]
    fn discovers_valid_units_across_categories() {
        let dir = tempfile::tempdir().unwrap();
        write_unit(dir.path(), ToolCategory::Utility, "echo.toml", "echo", "echo");
        write_unit(dir.path(), ToolCategory::Data, "wc.toml", "word_count", "word_count");

        let (registry, report) = ToolRegistry::discover(dir.path(), Arc::new(AlwaysApprove));
        assert_eq!(report.loaded_count, 2);
        assert!(report.failed.is_empty());
        assert_eq!(registry.len(), 2);
        assert!(registry.get("echo").is_some());
        assert_eq!(registry.list_by_category(ToolCategory::Data).len(), 1);
    }

    #[test]
    fn unknown_builtin_is_recorded_without_aborting_discovery() {
        let dir = tempfile::tempdir().unwrap();
        write_unit(dir.path(), ToolCategory::Utility, "bad.toml", "ghost", "nonexistent_builtin");
        write_unit(dir.path(), ToolCategory::Utility, "good.toml", "echo", "echo");

        let (registry, report) = ToolRegistry::discover(dir.path(), Arc::new(AlwaysApprove));
        assert_eq!(report.loaded_count, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_name_rejects_the_later_unit() {
        let dir = tempfile::tempdir().unwrap();
        write_unit(dir.path(), ToolCategory::Utility, "a.toml", "echo", "echo");
        write_unit(dir.path(), ToolCategory::Utility, "z.toml", "echo", "echo");

        let (registry, report) = ToolRegistry::discover(dir.path(), Arc::new(AlwaysApprove));
        assert_eq!(registry.len(), 1);
        assert_eq!(report.loaded_count, 1);
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn missing_root_yields_an_empty_registry() {
        let (registry, report) = ToolRegistry::discover(Path::new("/does/not/exist"), Arc::new(AlwaysApprove));
        assert!(registry.is_empty());
        assert_eq!(report.loaded_count, 0);
    }
}
