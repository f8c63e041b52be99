//! Scene Probe
//!
//! Offline validation for scene description files:
//! - Builds the scene and reports sim-object wiring problems
//! - Lists what each receptacle currently holds
//! - Runs the overlap and sweep checks listed in the file and compares the
//!   reported colliders with the expected ones

mod checks;
mod description;

use std::error::Error;
use std::path::PathBuf;

use clap::{Arg, Command};
use log::{error, info};
use thor_physics::config::{Config, QuerySettings};
use thor_physics::foundation::logging;
use thor_physics::physics::{ColliderQueries, ListPhysicsWorld};
use thor_physics::scene::{contained_unique_ids, SimObject};

use checks::run_check;
use description::{BuiltScene, SceneDescription};

const DEFAULT_SCENE: &str = "scenes/kitchen.toml";

/// Failures worth a non-zero exit
#[derive(thiserror::Error, Debug)]
enum ProbeError {
    #[error("{failed} of {total} checks failed")]
    ChecksFailed { failed: usize, total: usize },
}

/// Log receptacle contents; returns the number of wiring problems.
///
/// The scene logs each problem as it finds it.
fn report_sim_objects(built: &BuiltScene) -> usize {
    let problems = built.tree.validate_sim_objects();
    if problems.is_empty() {
        info!("Sim objects wired correctly");
    }
    for (node, sim_object) in built.tree.nodes_with::<SimObject>() {
        if sim_object.is_receptacle() {
            info!("{} holds {:?}", sim_object.unique_id, contained_unique_ids(&built.tree, node));
        }
    }
    problems.len()
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    let matches = Command::new("scene_probe")
        .about("Builds a scene description and runs its collider checks")
        .arg(
            Arg::new("scene")
                .value_name("FILE")
                .help("Scene description (.toml or .ron)")
                .default_value(DEFAULT_SCENE),
        )
        .arg(
            Arg::new("settings")
                .short('s')
                .long("settings")
                .value_name("FILE")
                .help("Query settings (.toml or .ron); defaults apply when absent"),
        )
        .get_matches();

    let scene_path = matches
        .get_one::<String>("scene")
        .map_or_else(|| PathBuf::from(DEFAULT_SCENE), PathBuf::from);
    let settings = match matches.get_one::<String>("settings") {
        Some(path) => QuerySettings::load_from_file(path)?,
        None => QuerySettings::default(),
    };

    info!("Loading scene from {}", scene_path.display());
    let description = SceneDescription::load_from_file(&scene_path)?;
    let built = description.build()?;
    info!("Built {} nodes", built.tree.len());

    report_sim_objects(&built);

    let physics = ListPhysicsWorld::capture(&built.tree, &settings);
    let queries = ColliderQueries::with_settings(&built.tree, &physics, &settings);

    let mut failed = 0;
    for check in &description.checks {
        let outcome = run_check(&built, &queries, check)?;
        if outcome.passed() {
            info!("PASS {}: {:?}", outcome.label, outcome.reported);
        } else {
            failed += 1;
            let expected = outcome.expected.as_deref().unwrap_or_default();
            error!("FAIL {}: expected {:?}, got {:?}", outcome.label, expected, outcome.reported);
        }
    }

    let total = description.checks.len();
    if failed > 0 {
        return Err(ProbeError::ChecksFailed { failed, total }.into());
    }
    info!("All {} checks passed", total);
    Ok(())
}
