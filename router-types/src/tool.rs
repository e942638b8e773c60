//! Tool manifest and result-envelope types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Broad grouping used for discovery and `ListByCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// General-purpose utility tools.
    Utility,
    /// Structured-data manipulation.
    Data,
    /// Network/web-facing tools.
    Web,
    /// Software development tools.
    Development,
    /// Workflow/automation tools.
    Automation,
    /// Host/system-level tools.
    System,
    /// Knowledge lookup tools.
    Knowledge,
}

impl ToolCategory {
    /// The filesystem subdirectory name this category is discovered under.
    #[must_use]
    pub fn directory_name(self) -> &'static str {
        match self {
            Self::Utility => "utility_tools",
            Self::Data => "data_tools",
            Self::Web => "web_tools",
            Self::Development => "dev_tools",
            Self::Automation => "automation_tools",
            Self::System => "system_tools",
            Self::Knowledge => "knowledge_tools",
        }
    }
}

/// How much a tool's trust is established, driving security-middleware strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Shipped and maintained with the core.
    Core,
    /// Reviewed third-party tool.
    Verified,
    /// Unreviewed or externally supplied tool.
    Untrusted,
}

/// What a tool may touch, used by the security middleware's policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityScope {
    /// Reads without mutating anything.
    ReadOnly,
    /// Reads and writes application-owned data.
    ReadWrite,
    /// Modifies host system state.
    SystemModify,
    /// Performs network access.
    NetworkAccess,
    /// Spawns subprocesses.
    ProcessSpawn,
}

/// What kind of resource a tool is expected to consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceProfile {
    /// Bounded CPU, returns quickly.
    CpuLight,
    /// Unbounded/heavy CPU use.
    CpuIntensive,
    /// Disk or other local I/O bound.
    IoIntensive,
    /// Network-bound; must honor cancellation.
    NetworkIntensive,
}

/// The JSON-ish type of one tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// A UTF-8 string.
    String,
    /// A signed integer.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean.
    Bool,
    /// One of a fixed set of string values.
    Enum,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

/// The declared shape of one tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// The parameter's name, as it appears in the call's parameter map.
    pub name: String,
    /// The parameter's declared type.
    pub type_tag: ParameterType,
    /// Whether the parameter must be present.
    pub required: bool,
    /// The default value substituted when `required` is `false` and the
    /// caller omitted this parameter.
    pub default: Option<serde_json::Value>,
    /// Allowed values, when `type_tag` is `Enum`.
    pub enum_values: Option<Vec<String>>,
    /// Inclusive lower bound, for numeric types.
    pub min: Option<f64>,
    /// Inclusive upper bound, for numeric types.
    pub max: Option<f64>,
    /// Human-readable description.
    pub description: String,
}

impl ParameterSpec {
    /// A required parameter with no range/enum constraints.
    #[must_use]
    pub fn required(name: impl Into<String>, type_tag: ParameterType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag,
            required: true,
            default: None,
            enum_values: None,
            min: None,
            max: None,
            description: description.into(),
        }
    }

    /// An optional parameter with a default value.
    #[must_use]
    pub fn optional(
        name: impl Into<String>,
        type_tag: ParameterType,
        default: serde_json::Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_tag,
            required: false,
            default: Some(default),
            enum_values: None,
            min: None,
            max: None,
            description: description.into(),
        }
    }

    /// Attach an enum value set (builder-style, mirrors the pack's
    /// `#[must_use] fn with_x(mut self, ...) -> Self` convention).
    #[must_use]
    pub fn with_enum_values(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Attach a numeric range.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// The immutable, structured declaration of one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolManifest {
    /// Unique name across the registry.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Discovery/category grouping.
    pub category: ToolCategory,
    /// Whether the approval gate must be consulted before execution.
    pub requires_confirmation: bool,
    /// How strictly the security middleware and approval gate should treat this tool.
    pub trust_level: TrustLevel,
    /// What the tool may touch.
    pub security_scope: std::collections::BTreeSet<SecurityScope>,
    /// What kind of resource the tool is expected to consume.
    pub resource_profile: ResourceProfile,
    /// The tool's parameters, in declaration order.
    pub parameters: Vec<ParameterSpec>,
}

impl ToolManifest {
    /// Whether this tool touches any scope in `{SystemModify, ReadWrite, ProcessSpawn}`,
    /// the set that `tools_require_confirmation` forces confirmation for.
    #[must_use]
    pub fn touches_sensitive_scope(&self) -> bool {
        self.security_scope.iter().any(|s| {
            matches!(
                s,
                SecurityScope::SystemModify | SecurityScope::ReadWrite | SecurityScope::ProcessSpawn
            )
        })
    }
}

/// The uniform success/error envelope every tool call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the call succeeded.
    pub success: bool,
    /// Present if and only if `success`.
    pub value: Option<serde_json::Value>,
    /// Present if and only if `!success`.
    pub error_message: Option<String>,
    /// The error classification, present if and only if `!success`.
    pub error_kind: Option<crate::error::ErrorKind>,
    /// Free-form, never-authoritative diagnostic context.
    pub diagnostics: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    /// Build a successful result.
    #[must_use]
    pub fn success(value: serde_json::Value) -> Self {
        Self {
            success: true,
            value: Some(value),
            error_message: None,
            error_kind: None,
            diagnostics: HashMap::new(),
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failure(kind: crate::error::ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error_message: Some(message.into()),
            error_kind: Some(kind),
            diagnostics: HashMap::new(),
        }
    }

    /// Attach a diagnostic entry (builder-style).
    #[must_use]
    pub fn with_diagnostic(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.diagnostics.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_names_match_category() {
        assert_eq!(ToolCategory::Utility.directory_name(), "utility_tools");
        assert_eq!(ToolCategory::Data.directory_name(), "data_tools");
        assert_eq!(ToolCategory::Web.directory_name(), "web_tools");
        assert_eq!(ToolCategory::Development.directory_name(), "dev_tools");
        assert_eq!(ToolCategory::Automation.directory_name(), "automation_tools");
        assert_eq!(ToolCategory::Knowledge.directory_name(), "knowledge_tools");
    }

    #[test]
    fn sensitive_scope_detection() {
        let manifest = ToolManifest {
            name: "writer".into(),
            description: "writes files".into(),
            category: ToolCategory::System,
            requires_confirmation: false,
            trust_level: TrustLevel::Verified,
            security_scope: [SecurityScope::ReadWrite].into_iter().collect(),
            resource_profile: ResourceProfile::IoIntensive,
            parameters: vec![],
        };
        assert!(manifest.touches_sensitive_scope());
    }

    #[test]
    fn read_only_scope_is_not_sensitive() {
        let manifest = ToolManifest {
            name: "reader".into(),
            description: "reads files".into(),
            category: ToolCategory::Utility,
            requires_confirmation: false,
            trust_level: TrustLevel::Core,
            security_scope: [SecurityScope::ReadOnly].into_iter().collect(),
            resource_profile: ResourceProfile::IoIntensive,
            parameters: vec![],
        };
        assert!(!manifest.touches_sensitive_scope());
    }

    #[test]
    fn success_and_failure_are_mutually_exclusive() {
        let ok = ToolResult::success(serde_json::json!({"x": 1}));
        assert!(ok.success);
        assert!(ok.value.is_some());
        assert!(ok.error_message.is_none());

        let err = ToolResult::failure(crate::error::ErrorKind::Validation, "missing field x");
        assert!(!err.success);
        assert!(err.value.is_none());
        assert!(err.error_message.is_some());
    }
}
