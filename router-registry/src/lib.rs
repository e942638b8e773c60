#![deny(missing_docs)]
//! In-memory model registry.
//!
//! A read-mostly catalog of [`ModelDescriptor`]s built once at startup.
//! Readers take a short shared lock; `set_available` takes an exclusive
//! lock, matching a "many readers, rare writer" discipline — grounded on
//! the `parking_lot::RwLock` usage common across the pack's Cargo.tomls.

use std::collections::HashMap;

use parking_lot::RwLock;
use router_types::{BackendKind, Capability, ModelDescriptor, SpeedClass};

/// Catalog of model descriptors, queried by id/capability/speed/cost.
///
/// The router is the registry's only reader outside of health probes;
/// this crate has no dependency on `router-engine` or `router-adapters`,
/// keeping the registry a leaf the rest of the workspace depends on
/// rather than the other way around.
pub struct ModelRegistry {
    descriptors: RwLock<HashMap<String, ModelDescriptor>>,
}

impl ModelRegistry {
    /// Build a registry from an initial set of descriptors.
    ///
    /// # Panics
    /// Panics if two descriptors share an `id` — registry construction
    /// happens once at startup and a duplicate id is a configuration bug,
    /// not a runtime condition to recover from.
    #[must_use]
    pub fn new(descriptors: Vec<ModelDescriptor>) -> Self {
        let mut map = HashMap::with_capacity(descriptors.len());
        for d in descriptors {
            let prev = map.insert(d.id.clone(), d);
            assert!(prev.is_none(), "duplicate model id in registry");
        }
        Self {
            descriptors: RwLock::new(map),
        }
    }

    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    /// Constant-time lookup by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ModelDescriptor> {
        self.descriptors.read().get(id).cloned()
    }

    /// All descriptors carrying `cap`.
    #[must_use]
    pub fn filter_by_capability(&self, cap: Capability) -> Vec<ModelDescriptor> {
        self.descriptors
            .read()
            .values()
            .filter(|d| d.capabilities.contains(&cap))
            .cloned()
            .collect()
    }

    /// All descriptors in the given speed class.
    #[must_use]
    pub fn filter_by_speed(&self, class: SpeedClass) -> Vec<ModelDescriptor> {
        self.descriptors
            .read()
            .values()
            .filter(|d| d.speed_class == class)
            .cloned()
            .collect()
    }

    /// All descriptors served by the given backend kind.
    #[must_use]
    pub fn filter_by_backend(&self, kind: BackendKind) -> Vec<ModelDescriptor> {
        self.descriptors
            .read()
            .values()
            .filter(|d| d.backend_kind == kind)
            .cloned()
            .collect()
    }

    /// All descriptors, regardless of availability.
    #[must_use]
    pub fn all(&self) -> Vec<ModelDescriptor> {
        self.descriptors.read().values().cloned().collect()
    }

    /// Among `available` candidates matching the optional capability,
    /// the one minimizing `(speed_class_rank, -tokens_per_second)`; ties
    /// break by id ascending. Missing `tokens_per_second` sorts as 0.
    #[must_use]
    pub fn pick_fastest(&self, cap: Option<Capability>) -> Option<ModelDescriptor> {
        let guard = self.descriptors.read();
        guard
            .values()
            .filter(|d| d.available)
            .filter(|d| cap.is_none_or(|c| d.capabilities.contains(&c)))
            .min_by(|a, b| {
                let a_key = (a.speed_class.rank(), i64::from(a.tokens_per_second.unwrap_or(0)) * -1);
                let b_key = (b.speed_class.rank(), i64::from(b.tokens_per_second.unwrap_or(0)) * -1);
                a_key.cmp(&b_key).then_with(|| a.id.cmp(&b.id))
            })
            .cloned()
    }

    /// Among `available` candidates with `cap` and `cost <= cost_cap`,
    /// the one maximizing `quality_for(cap)`; ties break by lower cost,
    /// then id.
    #[must_use]
    pub fn pick_best_quality(&self, cap: Capability, cost_cap: f32) -> Option<ModelDescriptor> {
        let guard = self.descriptors.read();
        guard
            .values()
            .filter(|d| d.available && d.capabilities.contains(&cap) && d.cost <= cost_cap)
            .max_by(|a, b| {
                a.quality_for(cap)
                    .total_cmp(&b.quality_for(cap))
                    .then_with(|| b.cost.total_cmp(&a.cost))
                    .then_with(|| b.id.cmp(&a.id))
            })
            .cloned()
    }

    /// Idempotent flag write; exclusive lock.
    pub fn set_available(&self, id: &str, available: bool) {
        if let Some(d) = self.descriptors.write().get_mut(id) {
            d.available = available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_types::{BackendAddress, ModelDescriptor};
    use std::collections::BTreeSet;

    fn descriptor(
        id: &str,
        caps: &[Capability],
        speed: SpeedClass,
        tps: Option<u32>,
        quality_general: f32,
        quality_code: f32,
        cost: f32,
    ) -> ModelDescriptor {
        ModelDescriptor::new(
            id,
            BackendKind::HttpChat,
            id,
            "7B",
            "Q4",
            caps.iter().copied().collect::<BTreeSet<_>>(),
            speed,
            8192,
            tps,
            8,
            quality_general,
            quality_code,
            0.5,
            cost,
            BackendAddress::Network {
                url: "http://localhost:11434".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn get_returns_registered_descriptor() {
        let reg = ModelRegistry::new(vec![descriptor(
            "a",
            &[Capability::General],
            SpeedClass::Fast,
            Some(10),
            0.5,
            0.5,
            0.5,
        )]);
        assert!(reg.get("a").is_some());
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn pick_fastest_breaks_ties_by_id() {
        let reg = ModelRegistry::new(vec![
            descriptor("b", &[Capability::General], SpeedClass::Fast, Some(10), 0.5, 0.5, 0.5),
            descriptor("a", &[Capability::General], SpeedClass::Fast, Some(10), 0.5, 0.5, 0.5),
        ]);
        let picked = reg.pick_fastest(None).unwrap();
        assert_eq!(picked.id, "a");
    }

    #[test]
    fn pick_fastest_prefers_lower_speed_rank() {
        let reg = ModelRegistry::new(vec![
            descriptor("slow", &[Capability::General], SpeedClass::Slow, Some(100), 0.5, 0.5, 0.5),
            descriptor("fast", &[Capability::General], SpeedClass::UltraFast, Some(5), 0.5, 0.5, 0.5),
        ]);
        let picked = reg.pick_fastest(None).unwrap();
        assert_eq!(picked.id, "fast");
    }

    #[test]
    fn pick_fastest_ignores_unavailable() {
        let reg = ModelRegistry::new(vec![descriptor(
            "a",
            &[Capability::General],
            SpeedClass::UltraFast,
            Some(100),
            0.5,
            0.5,
            0.5,
        )]);
        reg.set_available("a", false);
        assert!(reg.pick_fastest(None).is_none());
    }

    #[test]
    fn pick_fastest_respects_capability_filter() {
        let reg = ModelRegistry::new(vec![
            descriptor("general", &[Capability::General], SpeedClass::UltraFast, Some(10), 0.5, 0.5, 0.5),
            descriptor("coder", &[Capability::Code], SpeedClass::Fast, Some(10), 0.5, 0.9, 0.5),
        ]);
        let picked = reg.pick_fastest(Some(Capability::Code)).unwrap();
        assert_eq!(picked.id, "coder");
    }

    #[test]
    fn pick_best_quality_respects_cost_cap() {
        let reg = ModelRegistry::new(vec![
            descriptor("cheap", &[Capability::Code], SpeedClass::Fast, Some(10), 0.5, 0.6, 0.2),
            descriptor("pricey", &[Capability::Code], SpeedClass::Fast, Some(10), 0.5, 0.95, 0.9),
        ]);
        let picked = reg.pick_best_quality(Capability::Code, 0.5).unwrap();
        assert_eq!(picked.id, "cheap");
    }

    #[test]
    fn pick_best_quality_maximizes_quality_for_capability() {
        let reg = ModelRegistry::new(vec![
            descriptor("a", &[Capability::Code], SpeedClass::Fast, Some(10), 0.5, 0.6, 0.5),
            descriptor("b", &[Capability::Code], SpeedClass::Fast, Some(10), 0.5, 0.9, 0.5),
        ]);
        let picked = reg.pick_best_quality(Capability::Code, 1.0).unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn pick_best_quality_returns_none_when_all_filtered() {
        let reg = ModelRegistry::new(vec![descriptor(
            "a",
            &[Capability::Code],
            SpeedClass::Fast,
            Some(10),
            0.5,
            0.6,
            0.9,
        )]);
        assert!(reg.pick_best_quality(Capability::Code, 0.3).is_none());
    }

    #[test]
    fn set_available_is_idempotent() {
        let reg = ModelRegistry::new(vec![descriptor(
            "a",
            &[Capability::General],
            SpeedClass::Fast,
            Some(10),
            0.5,
            0.5,
            0.5,
        )]);
        reg.set_available("a", false);
        reg.set_available("a", false);
        assert!(!reg.get("a").unwrap().available);
    }

    #[test]
    #[should_panic(expected = "duplicate model id")]
    fn duplicate_id_panics_at_construction() {
        let _ = ModelRegistry::new(vec![
            descriptor("dup", &[Capability::General], SpeedClass::Fast, Some(10), 0.5, 0.5, 0.5),
            descriptor("dup", &[Capability::General], SpeedClass::Fast, Some(10), 0.5, 0.5, 0.5),
        ]);
    }
}
