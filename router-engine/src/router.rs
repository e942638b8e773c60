//! Router: picks a descriptor for a classified request.
//!
//! A pure function of `(&ModelRegistry, &TaskClassification,
//! &RoutingOptions) -> Option<ModelDescriptor>`, plus [`RouterStats`]
//! counters updated alongside each call — the counters are the only
//! mutable state the router owns, and updates to each counter are
//! serialized.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use router_registry::ModelRegistry;
use router_types::{Capability, Complexity, ModelDescriptor, TaskClassification};
use serde::{Deserialize, Serialize};

/// Model-selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Complexity- and category-adaptive selection (the default).
    Auto,
    /// Minimize latency.
    Speed,
    /// Maximize quality for the primary capability.
    Quality,
    /// Complexity-adaptive blend of speed and quality.
    Balanced,
    /// Minimize cost.
    CostOptimized,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Auto
    }
}

/// Caller-supplied routing preferences.
#[derive(Debug, Clone)]
pub struct RoutingOptions {
    /// Selection policy.
    pub strategy: Strategy,
    /// Restrict candidates to this backend kind, if set.
    pub backend_pref: Option<router_types::BackendKind>,
    /// Upper bound on `cost`.
    pub max_cost: f32,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            backend_pref: None,
            max_cost: 1.0,
        }
    }
}

/// Routing/fallback counters.
#[derive(Debug, Default)]
pub struct RouterStats {
    total_routings: AtomicU64,
    fallback_invocations: AtomicU64,
    by_complexity: Mutex<HashMap<Complexity, u64>>,
    by_chosen_id: Mutex<HashMap<String, u64>>,
}

impl RouterStats {
    /// Total routing decisions made (successful or not).
    pub fn total_routings(&self) -> u64 {
        self.total_routings.load(Ordering::Relaxed)
    }

    /// Total fallback-candidate lookups performed.
    pub fn fallback_invocations(&self) -> u64 {
        self.fallback_invocations.load(Ordering::Relaxed)
    }

    /// Snapshot of routing counts by complexity bucket.
    pub fn by_complexity(&self) -> HashMap<Complexity, u64> {
        self.by_complexity.lock().clone()
    }

    /// Snapshot of routing counts by chosen model id.
    pub fn by_chosen_id(&self) -> HashMap<String, u64> {
        self.by_chosen_id.lock().clone()
    }

    fn record(&self, complexity: Complexity, chosen: Option<&ModelDescriptor>) {
        self.total_routings.fetch_add(1, Ordering::Relaxed);
        *self.by_complexity.lock().entry(complexity).or_insert(0) += 1;
        if let Some(d) = chosen {
            *self.by_chosen_id.lock().entry(d.id.clone()).or_insert(0) += 1;
        }
    }

    fn record_fallback(&self) {
        self.fallback_invocations.fetch_add(1, Ordering::Relaxed);
    }
}

/// Stateless selection logic plus the stats it accumulates.
#[derive(Default)]
pub struct Router {
    stats: RouterStats,
}

impl Router {
    /// A router with fresh stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated routing statistics.
    #[must_use]
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Choose a descriptor for `classification` under `options`.
    #[must_use]
    pub fn route(
        &self,
        registry: &ModelRegistry,
        classification: &TaskClassification,
        options: &RoutingOptions,
    ) -> Option<ModelDescriptor> {
        let chosen = self.route_inner(registry, classification, options);
        self.stats.record(classification.complexity, chosen.as_ref());
        chosen
    }

    fn route_inner(
        &self,
        registry: &ModelRegistry,
        classification: &TaskClassification,
        options: &RoutingOptions,
    ) -> Option<ModelDescriptor> {
        let cap = classification.primary_capability();
        let candidates = filtered_candidates(registry, options);

        match options.strategy {
            Strategy::Speed => pick_fastest(&candidates, Some(cap)),
            Strategy::Quality => pick_best_quality(&candidates, cap, options.max_cost),
            Strategy::CostOptimized => pick_cost_optimized(&candidates, cap),
            Strategy::Balanced => self.route_balanced(&candidates, classification, options),
            Strategy::Auto => self.route_auto(&candidates, classification, options),
        }
    }

    fn route_balanced(
        &self,
        candidates: &[ModelDescriptor],
        classification: &TaskClassification,
        options: &RoutingOptions,
    ) -> Option<ModelDescriptor> {
        let cap = classification.primary_capability();
        match classification.complexity {
            Complexity::Trivial | Complexity::Simple => pick_fastest(candidates, Some(cap)),
            Complexity::Complex | Complexity::VeryComplex => pick_best_quality(candidates, cap, options.max_cost),
            Complexity::Moderate => {
                let mid_cost: Vec<_> = candidates.iter().filter(|d| (0.3..=0.6).contains(&d.cost)).cloned().collect();
                mid_cost
                    .into_iter()
                    .min_by(|a, b| {
                        let a_dist = (a.cost - 0.45).abs();
                        let b_dist = (b.cost - 0.45).abs();
                        a_dist.total_cmp(&b_dist).then_with(|| a.id.cmp(&b.id))
                    })
                    .or_else(|| pick_fastest(candidates, Some(cap)))
            }
        }
    }

    fn route_auto(
        &self,
        candidates: &[ModelDescriptor],
        classification: &TaskClassification,
        options: &RoutingOptions,
    ) -> Option<ModelDescriptor> {
        use router_types::{Category, SpeedClass};

        match classification.complexity {
            Complexity::Trivial => first_by_speed_class(candidates, SpeedClass::UltraFast),
            Complexity::Simple => first_by_speed_class(candidates, SpeedClass::Fast),
            _ if classification.category == Category::Code => {
                // The quality_code floor only applies once complexity
                // reaches Complex/VeryComplex; Moderate Code requests
                // still maximize quality_code, just without the floor.
                let min_quality = if matches!(classification.complexity, Complexity::Complex | Complexity::VeryComplex) {
                    0.75
                } else {
                    0.0
                };
                candidates
                    .iter()
                    .filter(|d| d.capabilities.contains(&Capability::Code) && d.quality_code >= min_quality)
                    .max_by(|a, b| a.quality_code.total_cmp(&b.quality_code).then_with(|| a.id.cmp(&b.id)))
                    .cloned()
            }
            Complexity::Complex | Complexity::VeryComplex => {
                pick_best_quality(candidates, classification.primary_capability(), options.max_cost)
            }
            Complexity::Moderate => self.route_balanced(candidates, classification, options),
        }
    }

    /// Given a failed descriptor, the best fallback: shares a
    /// capability, is available, isn't the same id — preferring the
    /// same backend kind, then higher `quality_general`.
    #[must_use]
    pub fn fallback_candidate(&self, registry: &ModelRegistry, failed: &ModelDescriptor) -> Option<ModelDescriptor> {
        self.stats.record_fallback();
        registry
            .all()
            .into_iter()
            .filter(|d| d.id != failed.id)
            .filter(|d| d.available)
            .filter(|d| d.capabilities.intersection(&failed.capabilities).next().is_some())
            .max_by(|a, b| {
                let a_key = (a.backend_kind == failed.backend_kind, a.quality_general);
                let b_key = (b.backend_kind == failed.backend_kind, b.quality_general);
                a_key
                    .0
                    .cmp(&b_key.0)
                    .then_with(|| a_key.1.total_cmp(&b_key.1))
                    .then_with(|| a.id.cmp(&b.id))
            })
    }
}

fn filtered_candidates(registry: &ModelRegistry, options: &RoutingOptions) -> Vec<ModelDescriptor> {
    registry
        .all()
        .into_iter()
        .filter(|d| d.available)
        .filter(|d| options.backend_pref.is_none_or(|kind| d.backend_kind == kind))
        .filter(|d| d.cost <= options.max_cost)
        .collect()
}

fn pick_fastest(candidates: &[ModelDescriptor], cap: Option<Capability>) -> Option<ModelDescriptor> {
    candidates
        .iter()
        .filter(|d| cap.is_none_or(|c| d.capabilities.contains(&c)))
        .min_by(|a, b| {
            let a_key = (a.speed_class.rank(), i64::from(a.tokens_per_second.unwrap_or(0)) * -1);
            let b_key = (b.speed_class.rank(), i64::from(b.tokens_per_second.unwrap_or(0)) * -1);
            a_key.cmp(&b_key).then_with(|| a.id.cmp(&b.id))
        })
        .cloned()
}

fn pick_best_quality(candidates: &[ModelDescriptor], cap: Capability, cost_cap: f32) -> Option<ModelDescriptor> {
    candidates
        .iter()
        .filter(|d| d.capabilities.contains(&cap) && d.cost <= cost_cap)
        .max_by(|a, b| {
            a.quality_for(cap)
                .total_cmp(&b.quality_for(cap))
                .then_with(|| b.cost.total_cmp(&a.cost))
                .then_with(|| b.id.cmp(&a.id))
        })
        .cloned()
}

fn pick_cost_optimized(candidates: &[ModelDescriptor], cap: Capability) -> Option<ModelDescriptor> {
    candidates
        .iter()
        .filter(|d| d.capabilities.contains(&cap))
        .min_by(|a, b| {
            a.cost
                .total_cmp(&b.cost)
                .then_with(|| b.quality_for(cap).total_cmp(&a.quality_for(cap)))
                .then_with(|| a.id.cmp(&b.id))
        })
        .cloned()
}

fn first_by_speed_class(candidates: &[ModelDescriptor], class: router_types::SpeedClass) -> Option<ModelDescriptor> {
    let mut matching: Vec<_> = candidates.iter().filter(|d| d.speed_class == class).cloned().collect();
    matching.sort_by(|a, b| a.id.cmp(&b.id));
    matching.into_iter().next()
}
