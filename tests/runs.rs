mod common;

use common::{init_logs, ring_config};
use rmsa_sim::SimulationConfig;
use rmsa_sim::optical_network::{BlockReason, Outcome};

#[test]
fn same_seed_same_decisions() {
    init_logs();
    for strategy in ["shortest-path","ksp-fragmentation-aware","disjoint-pair"] {
        let run = || {
            let mut simulator = SimulationConfig::from_json(&ring_config(6, 16, strategy, 17, 0.0)).unwrap().build().unwrap();
            simulator.run().unwrap();
            let plane = simulator.control_plane();
            (plane.decisions().to_vec(),plane.stats().clone())
        };
        let (decisions,stats) = run();
        assert_eq!(decisions.len(),300);
        assert_eq!(stats.total(),300);
        assert_eq!(run(),(decisions,stats));
    }
}

#[test]
fn heavy_load_blocks_and_releases_everything() {
    let mut simulator = SimulationConfig::from_json(&ring_config(6, 16, "ksp-fragmentation-aware", 5, 0.0)).unwrap().build().unwrap();
    simulator.run().unwrap();
    let plane = simulator.control_plane();
    assert!(plane.stats().blocked() > 0);
    assert_eq!(plane.stats().accepted() + plane.stats().blocked(),300);
    assert_eq!(plane.active_len(),0);
    assert_eq!(plane.topology().reservations_len(),0);
    assert!(plane.topology().links().iter().all(|link| link.available_slots() == 16));
}

#[test]
fn weak_launch_power_turns_accepts_into_qot_failures() {
    init_logs();
    let run = |launch| {
        let mut simulator = SimulationConfig::from_json(&ring_config(5, 64, "shortest-path", 2, launch)).unwrap().build().unwrap();
        simulator.run().unwrap();
        simulator.control_plane().stats().clone()
    };
    let nominal = run(0.0);
    assert!(nominal.accepted() > 0);
    let weak = run(-35.0);
    assert_eq!(weak.accepted(),0);
    assert_eq!(weak.blocked_by(BlockReason::QotFail),300);
    assert!(nominal.blocked_by(BlockReason::QotFail) < weak.blocked_by(BlockReason::QotFail));
}

#[test]
fn progress_is_monotonic_and_complete() {
    let mut simulator = SimulationConfig::from_json(&ring_config(5, 16, "shortest-path", 8, 0.0)).unwrap().build().unwrap();
    let mut reports = vec![];
    simulator.run_with_progress(|percent| reports.push(percent)).unwrap();
    assert_eq!(reports,(1..=10).map(|step| step*10).collect::<Vec<u8>>());
}

#[test]
fn protected_run_never_shares_links() {
    let mut simulator = SimulationConfig::from_json(&ring_config(6, 32, "disjoint-pair", 11, 0.0)).unwrap().build().unwrap();
    simulator.run().unwrap();
    let plane = simulator.control_plane();
    let accepted = plane.decisions().iter().filter(|decision| matches!(decision.outcome,Outcome::Accepted(_))).count();
    assert!(accepted > 0);
    for decision in plane.decisions() {
        if let Outcome::Accepted(ids) = &decision.outcome {
            assert_eq!(ids.len(),2);
        }
    }
}
