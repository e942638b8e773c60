//! `ModelDescriptor` and the enums that make up its capability profile.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The transport family a model is served over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Ollama-style chat API (`/api/chat`, `/api/tags`).
    HttpChat,
    /// OpenAI-compatible completion API (`/chat/completions`, `/models`).
    HttpCompletion,
    /// A model artifact loaded and run in-process.
    InProcess,
}

/// A tag on a descriptor indicating fitness for a class of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Capability {
    /// General-purpose chat and instruction following.
    General,
    /// Source code generation, review, and debugging.
    Code,
    /// Arithmetic and mathematical reasoning.
    Math,
    /// Multi-step logical reasoning.
    Reasoning,
    /// Low-latency short-response generation.
    Speed,
    /// Image understanding.
    Vision,
    /// Structured tool/function calling.
    FunctionCalling,
}

/// Canonical latency bucket for a model's short-response time.
///
/// Lower bounds (seconds) per spec: `UltraFast` < 0.5, `Fast` 0.5–1.5,
/// `Medium` 1.5–3, `Slow` 3–5, `VerySlow` > 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeedClass {
    /// Sub-500ms short responses.
    UltraFast,
    /// 0.5–1.5s short responses.
    Fast,
    /// 1.5–3s short responses.
    Medium,
    /// 3–5s short responses.
    Slow,
    /// Over 5s short responses.
    VerySlow,
}

impl SpeedClass {
    /// The rank used by `PickFastest`: `UltraFast` = 0 … `VerySlow` = 4.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::UltraFast => 0,
            Self::Fast => 1,
            Self::Medium => 2,
            Self::Slow => 3,
            Self::VerySlow => 4,
        }
    }
}

/// Network-vs-in-process addressing for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendAddress {
    /// A base URL for HTTP-backed models.
    Network {
        /// The backend's base URL.
        url: String,
    },
    /// A local artifact path and prompt template tag for in-process models.
    InProcess {
        /// Filesystem path to the model artifact.
        model_path: String,
        /// Which prompt template to render with (see `router-adapters`).
        prompt_format_tag: String,
    },
}

/// Errors constructing or validating a [`ModelDescriptor`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// A quality score or cost was outside `[0, 1]`.
    #[error("{field} must be in [0,1], got {value}")]
    OutOfUnitRange {
        /// The offending field name.
        field: &'static str,
        /// The offending value, formatted for display.
        value: String,
    },
    /// `backend_kind` and `backend_address` disagree (e.g. `InProcess`
    /// descriptor carrying a `Network` address).
    #[error("backend_kind {backend_kind:?} requires a matching backend_address variant")]
    AddressMismatch {
        /// The declared backend kind.
        backend_kind: BackendKind,
    },
    /// A network backend's address was not a syntactically valid URL.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Immutable-after-registration catalog entry for one model.
///
/// The only field mutated after construction is `available`, flipped by
/// health probes; every other field is set once at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique identifier across the registry.
    pub id: String,
    /// Which transport/adapter variant serves this model.
    pub backend_kind: BackendKind,
    /// Human-readable name.
    pub display_name: String,
    /// Parameter-count label (e.g. `"8B"`).
    pub param_size_label: String,
    /// Quantization label (e.g. `"Q4_K_M"`).
    pub quant_label: String,
    /// Capabilities this model is fit for.
    pub capabilities: BTreeSet<Capability>,
    /// Latency bucket for short responses.
    pub speed_class: SpeedClass,
    /// Context window size, in tokens.
    pub context_window: u32,
    /// Measured throughput, if known.
    pub tokens_per_second: Option<u32>,
    /// Minimum host memory required, in GB.
    pub resource_floor_gb: u32,
    /// General-purpose quality score in `[0, 1]`.
    pub quality_general: f32,
    /// Code quality score in `[0, 1]`.
    pub quality_code: f32,
    /// Reasoning quality score in `[0, 1]`.
    pub quality_reasoning: f32,
    /// Relative cost in `[0, 1]`.
    pub cost: f32,
    /// Network base URL or in-process artifact path + prompt format tag.
    pub backend_address: BackendAddress,
    /// Whether the model is currently usable; flipped by health probes.
    pub available: bool,
}

impl ModelDescriptor {
    /// Construct a descriptor, validating its invariants: quality/cost
    /// scores in `[0,1]`, `InProcess` carries an in-process address,
    /// network backends carry a syntactically valid URL.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        backend_kind: BackendKind,
        display_name: impl Into<String>,
        param_size_label: impl Into<String>,
        quant_label: impl Into<String>,
        capabilities: BTreeSet<Capability>,
        speed_class: SpeedClass,
        context_window: u32,
        tokens_per_second: Option<u32>,
        resource_floor_gb: u32,
        quality_general: f32,
        quality_code: f32,
        quality_reasoning: f32,
        cost: f32,
        backend_address: BackendAddress,
    ) -> Result<Self, DescriptorError> {
        for (field, value) in [
            ("quality_general", quality_general),
            ("quality_code", quality_code),
            ("quality_reasoning", quality_reasoning),
            ("cost", cost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DescriptorError::OutOfUnitRange {
                    field,
                    value: value.to_string(),
                });
            }
        }

        match (&backend_kind, &backend_address) {
            (BackendKind::InProcess, BackendAddress::InProcess { .. }) => {}
            (BackendKind::HttpChat | BackendKind::HttpCompletion, BackendAddress::Network { url }) => {
                if url::Url::parse(url).is_err() {
                    return Err(DescriptorError::InvalidUrl(url.clone()));
                }
            }
            _ => {
                return Err(DescriptorError::AddressMismatch { backend_kind });
            }
        }

        Ok(Self {
            id: id.into(),
            backend_kind,
            display_name: display_name.into(),
            param_size_label: param_size_label.into(),
            quant_label: quant_label.into(),
            capabilities,
            speed_class,
            context_window,
            tokens_per_second,
            resource_floor_gb,
            quality_general,
            quality_code,
            quality_reasoning,
            cost,
            backend_address,
            available: true,
        })
    }

    /// `quality_for(cap)`: `Code` → `quality_code`, `Reasoning` →
    /// `quality_reasoning`, everything else → `quality_general`.
    #[must_use]
    pub fn quality_for(&self, cap: Capability) -> f32 {
        match cap {
            Capability::Code => self.quality_code,
            Capability::Reasoning => self.quality_reasoning,
            _ => self.quality_general,
        }
    }
}
