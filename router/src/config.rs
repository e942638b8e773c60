//! Typed configuration surface, loaded once at startup.
//!
//! One `RouterConfig` covers every recognized option and its effect,
//! grounded on `brain::BrainConfig`'s "load from path or fall back to
//! a bundled default" shape. Unlike `BrainConfig`, most fields here are
//! consumed by the core (not a chat front-end), so the two
//! chat-interface-only fields are carried through unused by anything
//! in this workspace.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use router_engine::Strategy;
use router_types::{BackendAddress, BackendKind, Capability, DescriptorError, ModelDescriptor, SpeedClass};
use serde::{Deserialize, Serialize};

/// Error loading or validating a [`RouterConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file was not valid TOML for this shape.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A `models` entry failed descriptor validation.
    #[error("invalid model entry `{id}`: {source}")]
    InvalidModel {
        /// The offending entry's `id`.
        id: String,
        /// The underlying validation failure.
        source: DescriptorError,
    },
    /// A network-backed model entry gave no explicit address and none
    /// was found in `backend_http_base_urls` for its `backend_kind`.
    #[error("model `{id}` has backend_kind {backend_kind:?} but no backend_address and no matching backend_http_base_urls entry")]
    MissingBaseUrl {
        /// The offending entry's `id`.
        id: String,
        /// The entry's declared backend kind.
        backend_kind: BackendKind,
    },
}

/// One configured model, minus the `available` flag (always `true` at
/// registration) and with `backend_address` optional — network-backed
/// entries may omit it and inherit `backend_http_base_urls` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfigEntry {
    /// Unique identifier across the registry.
    pub id: String,
    /// Which transport/adapter variant serves this model.
    pub backend_kind: BackendKind,
    /// Human-readable name.
    pub display_name: String,
    /// Parameter-count label (e.g. `"8B"`).
    #[serde(default)]
    pub param_size_label: String,
    /// Quantization label (e.g. `"Q4_K_M"`).
    #[serde(default)]
    pub quant_label: String,
    /// Capabilities this model is fit for.
    pub capabilities: BTreeSet<Capability>,
    /// Latency bucket for short responses.
    pub speed_class: SpeedClass,
    /// Context window size, in tokens.
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    /// Measured throughput, if known.
    #[serde(default)]
    pub tokens_per_second: Option<u32>,
    /// Minimum host memory required, in GB.
    #[serde(default)]
    pub resource_floor_gb: u32,
    /// General-purpose quality score in `[0, 1]`.
    pub quality_general: f32,
    /// Code quality score in `[0, 1]`.
    #[serde(default)]
    pub quality_code: f32,
    /// Reasoning quality score in `[0, 1]`.
    #[serde(default)]
    pub quality_reasoning: f32,
    /// Relative cost in `[0, 1]`.
    pub cost: f32,
    /// Explicit address; required for `InProcess`, optional for the
    /// HTTP kinds (falls back to `backend_http_base_urls`).
    #[serde(default)]
    pub backend_address: Option<BackendAddress>,
}

fn default_context_window() -> u32 {
    8192
}

fn backend_kind_key(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::HttpChat => "HttpChat",
        BackendKind::HttpCompletion => "HttpCompletion",
        BackendKind::InProcess => "InProcess",
    }
}

/// A single typed configuration record covering every recognized option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Chat-interface credential; unused by the core.
    pub telegram_bot_token: Option<String>,
    /// Chat-interface principal allow-list entry; unused by the core.
    pub telegram_user_id: Option<String>,
    /// Network base address per backend kind (keyed by `{:?}` of
    /// [`BackendKind`], e.g. `"HttpChat"` — TOML table keys are always
    /// strings, so the kind isn't deserialized directly as a map key),
    /// used to resolve model entries that omit an explicit
    /// `backend_address`.
    pub backend_http_base_urls: HashMap<String, String>,
    /// Default strategy when none is supplied at the call site.
    pub routing_strategy: Strategy,
    /// Upper bound on `cost` applied by `Quality` and `CostOptimized`.
    pub routing_max_cost: f32,
    /// If true, every tool touching a sensitive scope requires
    /// confirmation regardless of its own manifest.
    pub tools_require_confirmation: bool,
    /// Rate limiter: admissions per window, per principal.
    pub rate_limit_messages: u32,
    /// Rate limiter: window length, in seconds.
    pub rate_limit_window_seconds: u64,
    /// Default deadline for `RouteAndExecute`/`ExecuteTool`, in seconds.
    pub default_request_deadline_seconds: u64,
    /// Emitted log verbosity (`tracing_subscriber::EnvFilter` syntax).
    pub log_level: String,
    /// Filesystem root the tool registry walks at startup.
    pub tool_root: PathBuf,
    /// URL schemes the sanitizer accepts.
    pub sanitizer_allowed_url_schemes: Vec<String>,
    /// Hosts the sanitizer always rejects.
    pub sanitizer_suspicious_domains: Vec<String>,
    /// The models to register at startup.
    pub models: Vec<ModelConfigEntry>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_user_id: None,
            backend_http_base_urls: HashMap::new(),
            routing_strategy: Strategy::Auto,
            routing_max_cost: 1.0,
            tools_require_confirmation: false,
            rate_limit_messages: 20,
            rate_limit_window_seconds: 60,
            default_request_deadline_seconds: 30,
            log_level: "info".to_string(),
            tool_root: PathBuf::from("tools"),
            sanitizer_allowed_url_schemes: vec!["https".to_string(), "http".to_string()],
            sanitizer_suspicious_domains: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Load a config from `path`, parsed as TOML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Build the startup [`ModelDescriptor`] set, resolving each
    /// network-backed entry's address against `backend_http_base_urls`
    /// when the entry itself gave none.
    pub fn build_descriptors(&self) -> Result<Vec<ModelDescriptor>, ConfigError> {
        self.models.iter().map(|entry| self.build_descriptor(entry)).collect()
    }

    fn build_descriptor(&self, entry: &ModelConfigEntry) -> Result<ModelDescriptor, ConfigError> {
        let backend_address = match &entry.backend_address {
            Some(address) => address.clone(),
            None => match self.backend_http_base_urls.get(backend_kind_key(entry.backend_kind)) {
                Some(url) => BackendAddress::Network { url: url.clone() },
                None => {
                    return Err(ConfigError::MissingBaseUrl {
                        id: entry.id.clone(),
                        backend_kind: entry.backend_kind,
                    })
                }
            },
        };

        ModelDescriptor::new(
            entry.id.clone(),
            entry.backend_kind,
            entry.display_name.clone(),
            entry.param_size_label.clone(),
            entry.quant_label.clone(),
            entry.capabilities.clone(),
            entry.speed_class,
            entry.context_window,
            entry.tokens_per_second,
            entry.resource_floor_gb,
            entry.quality_general,
            entry.quality_code,
            entry.quality_reasoning,
            entry.cost,
            backend_address,
        )
        .map_err(|source| ConfigError::InvalidModel { id: entry.id.clone(), source })
    }
}
