//! Stochastic impact counters.
//!
//! The counters are placeholders: no geometric intersection happens, each
//! candidate is sampled through an [`ImpactEstimator`]. The estimator is a
//! seam so tests can swap in a deterministic one.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::flood::FloodLayers;
use crate::highlight::HighlightState;
use crate::utilities::{UtilityKind, UtilitySegment};

/// Chance that any one candidate counts as affected. Grows with the
/// number of flood years shown, capped at certainty.
pub fn inclusion_probability(active_flood_layers: usize) -> f64 {
    (0.5 + 0.05 * active_flood_layers as f64).min(1.0)
}

/// Decides, per candidate, whether it counts as affected and how much
/// length an affected segment contributes.
pub trait ImpactEstimator: Send + Sync {
    fn building_affected(&mut self, probability: f64) -> bool;
    /// Kilometers contributed by one affected segment.
    fn segment_affected_km(&mut self, probability: f64) -> f64;
}

/// Production estimator: Bernoulli inclusion, uniform 0-2 km per
/// included segment.
pub struct SampledImpact<R: Rng> {
    rng: R,
}

impl<R: Rng> SampledImpact<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send + Sync> ImpactEstimator for SampledImpact<R> {
    fn building_affected(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }

    fn segment_affected_km(&mut self, probability: f64) -> f64 {
        if self.rng.gen_bool(probability) {
            self.rng.gen_range(0.0..2.0)
        } else {
            0.0
        }
    }
}

/// The estimator in use.
#[derive(Resource)]
pub struct ImpactModel(pub Box<dyn ImpactEstimator>);

impl Default for ImpactModel {
    fn default() -> Self {
        // ThreadRng is not Sync, so the shared model carries its own
        // entropy-seeded generator.
        Self(Box::new(SampledImpact::new(ChaCha8Rng::from_entropy())))
    }
}

/// Affected-building counter shown in the status panel.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct FloodImpact {
    pub affected_buildings: usize,
}

/// Affected-infrastructure totals in kilometers.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct InfrastructureImpact {
    pub road_km: f64,
    pub rail_km: f64,
    pub power_km: f64,
}

impl InfrastructureImpact {
    pub fn km(&self, kind: UtilityKind) -> f64 {
        match kind {
            UtilityKind::Road => self.road_km,
            UtilityKind::Rail => self.rail_km,
            UtilityKind::Power => self.power_km,
        }
    }

    fn km_mut(&mut self, kind: UtilityKind) -> &mut f64 {
        match kind {
            UtilityKind::Road => &mut self.road_km,
            UtilityKind::Rail => &mut self.rail_km,
            UtilityKind::Power => &mut self.power_km,
        }
    }
}

/// Resample the affected-building count.
#[derive(Event, Debug, Clone, Copy)]
pub struct RecomputeFloodImpact;

/// Resample the infrastructure totals.
#[derive(Event, Debug, Clone, Copy)]
pub struct RecomputeInfrastructureImpact;

/// One resample per frame at most, however many triggers arrived.
pub fn recompute_flood_impact(
    mut events: EventReader<RecomputeFloodImpact>,
    highlight: Res<HighlightState>,
    floods: Res<FloodLayers>,
    mut model: ResMut<ImpactModel>,
    mut impact: ResMut<FloodImpact>,
) {
    if events.read().next().is_none() {
        return;
    }
    let probability = inclusion_probability(floods.active_count());
    impact.affected_buildings = highlight
        .selected
        .iter()
        .filter(|_| model.0.building_affected(probability))
        .count();
}

pub fn recompute_infrastructure_impact(
    mut events: EventReader<RecomputeInfrastructureImpact>,
    segments: Query<&UtilitySegment>,
    floods: Res<FloodLayers>,
    mut model: ResMut<ImpactModel>,
    mut impact: ResMut<InfrastructureImpact>,
) {
    if events.read().next().is_none() {
        return;
    }
    let probability = inclusion_probability(floods.active_count());
    let mut totals = InfrastructureImpact::default();
    for segment in &segments {
        *totals.km_mut(segment.kind) += model.0.segment_affected_km(probability);
    }
    *impact = totals;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysAffected;

    impl ImpactEstimator for AlwaysAffected {
        fn building_affected(&mut self, _probability: f64) -> bool {
            true
        }

        fn segment_affected_km(&mut self, _probability: f64) -> f64 {
            1.0
        }
    }

    #[test]
    fn probability_scales_with_active_layers() {
        assert_eq!(inclusion_probability(0), 0.5);
        assert_eq!(inclusion_probability(1), 0.55);
        assert_eq!(inclusion_probability(5), 0.75);
        // Saturation: probability never exceeds 1 however the count grows.
        assert_eq!(inclusion_probability(10), 1.0);
        assert_eq!(inclusion_probability(100), 1.0);
    }

    #[test]
    fn sampled_estimator_tracks_the_probability() {
        let mut estimator = SampledImpact::new(ChaCha8Rng::seed_from_u64(7));
        let trials = 4_000;
        let hits = (0..trials)
            .filter(|_| estimator.building_affected(0.5))
            .count();
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.5).abs() < 0.05, "rate {rate}");
    }

    #[test]
    fn segment_lengths_stay_in_range() {
        let mut estimator = SampledImpact::new(ChaCha8Rng::seed_from_u64(11));
        for _ in 0..1_000 {
            let km = estimator.segment_affected_km(1.0);
            assert!((0.0..2.0).contains(&km), "km {km}");
        }
    }

    #[test]
    fn recompute_counts_only_highlighted_buildings() {
        let mut app = App::new();
        app.add_event::<RecomputeFloodImpact>();
        app.init_resource::<HighlightState>();
        app.init_resource::<FloodLayers>();
        app.init_resource::<FloodImpact>();
        app.insert_resource(ImpactModel(Box::new(AlwaysAffected)));
        app.add_systems(Update, recompute_flood_impact);

        let a = app.world_mut().spawn_empty().id();
        let b = app.world_mut().spawn_empty().id();
        app.world_mut().resource_mut::<HighlightState>().selected = vec![a, b];

        app.world_mut().send_event(RecomputeFloodImpact);
        app.update();
        assert_eq!(
            app.world().resource::<FloodImpact>().affected_buildings,
            2
        );

        // Without a trigger the counter stays put even if selection shrinks.
        app.world_mut().resource_mut::<HighlightState>().selected = vec![];
        app.update();
        assert_eq!(
            app.world().resource::<FloodImpact>().affected_buildings,
            2
        );
    }

    #[test]
    fn infrastructure_totals_split_by_kind() {
        let mut app = App::new();
        app.add_event::<RecomputeInfrastructureImpact>();
        app.init_resource::<FloodLayers>();
        app.init_resource::<InfrastructureImpact>();
        app.insert_resource(ImpactModel(Box::new(AlwaysAffected)));
        app.add_systems(Update, recompute_infrastructure_impact);

        for _ in 0..3 {
            app.world_mut().spawn(UtilitySegment {
                kind: UtilityKind::Road,
            });
        }
        app.world_mut().spawn(UtilitySegment {
            kind: UtilityKind::Power,
        });

        app.world_mut().send_event(RecomputeInfrastructureImpact);
        app.update();
        let impact = *app.world().resource::<InfrastructureImpact>();
        assert_eq!(impact.road_km, 3.0);
        assert_eq!(impact.rail_km, 0.0);
        assert_eq!(impact.power_km, 1.0);
        assert_eq!(impact.km(UtilityKind::Road), 3.0);
    }
}
