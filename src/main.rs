//! Vessel Pour entry point
//!
//! Runs the scripted pour scene (or a scene loaded from a JSON file given as
//! the first argument) and prints a world report every simulated second.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use vessel_pour::SceneConfig;
    use vessel_pour::consts::FIXED_DT;
    use vessel_pour::scenario::{HandScript, Scenario};
    use vessel_pour::sim::{VesselId, World};

    env_logger::init();
    log::info!("Vessel Pour (native) starting...");

    let scenario = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(&path)
            .and_then(|scene| World::from_scene(&scene))
            .map(|world| Scenario::new(world, VesselId(0), HandScript::pour_and_return(), 0)),
        None => Scenario::bar(0),
    };
    let mut scenario = match scenario {
        Ok(s) => s.with_jitter(1.5),
        Err(e) => {
            log::error!("Failed to set up scene: {e}");
            std::process::exit(1);
        }
    };

    let seconds = scenario.hand.duration() + 2.0;
    scenario.run(seconds, FIXED_DT, |world| {
        match serde_json::to_string_pretty(&world.report()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("Report serialization failed: {e}"),
        }
    });

    let ledger = scenario.world.ledger;
    log::info!(
        "Done: dispensed {:.4}, spilled {:.4}, held {:.4}",
        ledger.dispensed,
        ledger.spilled,
        scenario.world.total_liquid()
    );
    let (linear, angular) = scenario.release();
    log::info!("Released with velocity {:?}, spin {:?}", linear, angular);
}

#[cfg(target_arch = "wasm32")]
fn main() {}
