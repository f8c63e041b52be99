//! Running described checks against a built scene

use log::debug;
use thor_physics::foundation::math::round_vec3;
use thor_physics::physics::{
    sort_by_distance, ColliderQueries, Layer, LayerMask, OverlapParams, PhysicsBackend, SweepParams,
};
use thor_physics::scene::SceneError;

use crate::description::{BuiltScene, CheckDescription, CheckKind, DescriptionError};

/// Result of one check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Human-readable summary of the query
    pub label: String,
    /// Owner names of the reported colliders, in report order
    pub reported: Vec<String>,
    /// What the description expected, if anything
    pub expected: Option<Vec<String>>,
}

impl CheckOutcome {
    /// Checks without an expectation always pass
    pub fn passed(&self) -> bool {
        self.expected.as_ref().map_or(true, |expected| *expected == self.reported)
    }
}

fn label(check: &CheckDescription) -> String {
    let mut label = format!("{:?} {}", check.kind, check.object);
    if check.use_bounding_box {
        label.push_str(" +bbox");
    }
    if check.expand_by != 0.0 {
        label.push_str(&format!(" +{}", check.expand_by));
    }
    if !check.ignore.is_empty() {
        label.push_str(&format!(" ignoring {}", check.ignore.join(", ")));
    }
    label
}

fn sweep_layers(names: &[String]) -> Result<LayerMask, DescriptionError> {
    let layers = names
        .iter()
        .map(|name| Layer::from_name(name).ok_or_else(|| SceneError::UnknownLayer(name.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LayerMask::from_layers(&layers))
}

/// Run one check
pub fn run_check<B: PhysicsBackend + ?Sized>(
    built: &BuiltScene,
    queries: &ColliderQueries<'_, B>,
    check: &CheckDescription,
) -> Result<CheckOutcome, DescriptionError> {
    let target = built.resolve(&check.object)?;
    let ignore = built.resolve_all(&check.ignore)?;
    let overlap = OverlapParams::default()
        .ignoring(&ignore)
        .expanded_by(check.expand_by)
        .with_bounding_box(check.use_bounding_box);
    let collider_owner = |id| built.tree.collider_name(id).unwrap_or("<missing>").to_string();

    let reported = match check.kind {
        CheckKind::Obstructed => queries.first_colliding(target, &overlap).map(collider_owner).into_iter().collect(),
        CheckKind::Touching => queries.all_colliding(target, &overlap).into_iter().map(collider_owner).collect(),
        CheckKind::Sweep => {
            let direction = check
                .direction
                .ok_or_else(|| DescriptionError::MissingDirection(check.object.clone()))?;
            let mut params = SweepParams::default();
            if let Some(max_distance) = check.max_distance {
                params = params.within(max_distance);
            }
            if let Some(layers) = &check.layers {
                params = params.on_layers(sweep_layers(layers)?);
            }

            let mut hits = queries.sweep_all(target, direction, &params);
            sort_by_distance(&mut hits);
            for hit in &hits {
                debug!(
                    "{} hits {} after {:.3} at {:?}",
                    check.object,
                    built.name_of(hit.node),
                    hit.distance,
                    round_vec3(hit.point, 3)
                );
            }
            hits.iter().map(|hit| built.name_of(hit.node).to_string()).collect()
        }
    };

    Ok(CheckOutcome { label: label(check), reported, expected: check.expect.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::SceneDescription;
    use thor_physics::config::{Config, ConfigFormat, QuerySettings};
    use thor_physics::physics::ListPhysicsWorld;

    const KITCHEN: &str = include_str!("../scenes/kitchen.toml");

    #[test]
    fn test_sample_kitchen_checks_pass() {
        let description = SceneDescription::parse(KITCHEN, ConfigFormat::Toml).unwrap();
        let built = description.build().unwrap();
        assert!(built.tree.validate_sim_objects().is_empty());

        let settings = QuerySettings::default();
        let physics = ListPhysicsWorld::capture(&built.tree, &settings);
        let queries = ColliderQueries::with_settings(&built.tree, &physics, &settings);

        assert!(!description.checks.is_empty());
        for check in &description.checks {
            let outcome = run_check(&built, &queries, check).unwrap();
            assert!(outcome.expected.is_some(), "{}", outcome.label);
            assert!(outcome.passed(), "{}: got {:?}", outcome.label, outcome.reported);
        }
    }

    #[test]
    fn test_sweep_needs_direction() {
        let text = r#"
[[nodes]]
name = "Ball"

[[nodes.colliders]]
shape = { Sphere = { radius = 0.5 } }

[[checks]]
kind = "Sweep"
object = "Ball"
"#;
        let description = SceneDescription::parse(text, ConfigFormat::Toml).unwrap();
        let built = description.build().unwrap();
        let physics = ListPhysicsWorld::capture(&built.tree, &QuerySettings::default());
        let queries = ColliderQueries::new(&built.tree, &physics);

        assert!(matches!(
            run_check(&built, &queries, &description.checks[0]),
            Err(DescriptionError::MissingDirection(object)) if object == "Ball"
        ));
    }

    #[test]
    fn test_unexpected_report_fails() {
        let outcome = CheckOutcome {
            label: "Touching Mug".to_string(),
            reported: vec!["Apple".to_string()],
            expected: Some(Vec::new()),
        };
        assert!(!outcome.passed());
        assert!(CheckOutcome { expected: None, ..outcome }.passed());
    }

    #[test]
    fn test_unknown_sweep_layer() {
        assert!(matches!(
            sweep_layers(&["Lava".to_string()]),
            Err(DescriptionError::Scene(SceneError::UnknownLayer(_)))
        ));
        assert_eq!(
            sweep_layers(&["Default".to_string(), "Agent".to_string()]).unwrap(),
            Layer::DEFAULT.mask() | Layer::AGENT.mask()
        );
    }
}
