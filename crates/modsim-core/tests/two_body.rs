//! End-to-end runs of the bundled two-body profile.

#![allow(clippy::unwrap_used)]

use modsim_core::profiles::{self, TWO_BODY_PROFILE_ID};
use modsim_core::simulator::{BOOTSTRAP_START, READ_OFFSET};
use modsim_core::{GraphCache, GraphError, SimulationError, SimulationGraph, Simulator};
use modsim_query::TextQueryCompiler;
use modsim_types::{AgentId, ProfileId, Value, Vector3};

fn graph() -> SimulationGraph {
    SimulationGraph::build(&profiles::two_body(), &TextQueryCompiler::new()).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn one_step_for_body1_updates_every_field() {
    let graph = graph();
    let initial = profiles::two_body_initial_states();
    let sim = Simulator::new(&graph, &initial);

    let mut universe = sim.read(0.0 - READ_OFFSET);
    let state = graph.step(&AgentId::from("Body1"), &mut universe).unwrap();

    // dv = m_other * |r|^-2 toward Body2, over the bootstrap step of 0.01.
    let separation: f64 = 60.34 + 0.73;
    let dvx = 0.123 / separation.powi(2) * 0.01;

    let velocity = state.get("velocity").and_then(Value::as_vector).unwrap();
    assert!(close(velocity.x, dvx));
    assert!(close(velocity.y, -0.0015));
    assert!(close(velocity.z, 0.0));

    let position = state.get("position").and_then(Value::as_vector).unwrap();
    assert!(close(position.x, dvx.mul_add(0.01, -0.73)));
    assert!(close(position.y, -0.0015 * 0.01));

    assert_eq!(state.get("mass"), Some(&Value::Number(1.0)));
    let time = state.get("time").and_then(Value::as_number).unwrap();
    assert!(time > 0.0);
    assert_eq!(state.get("timeStep"), Some(&Value::Number(100.0)));
}

#[test]
fn cross_agent_reads_see_committed_state_only() {
    let graph = graph();
    let initial = profiles::two_body_initial_states();
    let sim = Simulator::new(&graph, &initial);
    let mut universe = sim.read(-1.0);

    graph.step(&AgentId::from("Body1"), &mut universe).unwrap();
    let body2 = graph.step(&AgentId::from("Body2"), &mut universe).unwrap();

    // Body2 is pulled toward Body1's initial position, not its stepped one.
    let velocity = body2.get("velocity").and_then(Value::as_vector).unwrap();
    let separation: f64 = 60.34 + 0.73;
    assert!(close(velocity.x, -1.0 / separation.powi(2) * 0.01));
}

#[test]
fn managers_can_consume_a_vector_component() {
    let mut profile = profiles::two_body();
    let mass_manager = profile
        .agents
        .first_mut()
        .and_then(|body1| body1.state_managers.get_mut(2))
        .unwrap();
    assert_eq!(mass_manager.produced, "mass");
    mass_manager.consumed = "(agent!(Body2).position.x,)".to_owned();

    let graph = SimulationGraph::build(&profile, &TextQueryCompiler::new()).unwrap();
    let initial = profiles::two_body_initial_states();
    let sim = Simulator::new(&graph, &initial);
    let mut universe = sim.read(0.0 - READ_OFFSET);

    let state = graph.step(&AgentId::from("Body1"), &mut universe).unwrap();
    assert_eq!(state.get("mass"), Some(&Value::Number(60.34)));
}

#[test]
fn full_run_records_bootstrap_and_repeated_intervals() {
    let graph = graph();
    let initial = profiles::two_body_initial_states();
    let mut sim = Simulator::new(&graph, &initial);

    let summary = sim.simulate(5).unwrap();
    assert_eq!(summary.steps, 10);

    let store = sim.into_store();
    let entries = store.entries();
    assert_eq!(entries.len(), 11);

    let bootstrap = entries.first().unwrap();
    assert!(close(bootstrap.start, BOOTSTRAP_START));
    assert!(close(bootstrap.end, 0.0));
    assert_eq!(bootstrap.payload.len(), 2);

    assert!(entries
        .iter()
        .skip(1)
        .all(|e| close(e.start, 0.0) && close(e.end, 100.0)));

    // Every agent appears in the merged view after the run.
    let merged = store.read_merged(50.0);
    assert_eq!(merged.len(), 2);
    let body2 = merged.get("Body2").unwrap();
    assert_eq!(body2.get("mass"), Some(&Value::Number(0.123)));
}

#[test]
fn stepping_unknown_agent_is_a_lookup_error() {
    let graph = graph();
    let initial = profiles::two_body_initial_states();
    let sim = Simulator::new(&graph, &initial);
    let mut universe = sim.read(-1.0);

    let err = graph.step(&AgentId::from("Body3"), &mut universe).unwrap_err();
    assert!(matches!(err, GraphError::UnknownAgent(id) if id.as_str() == "Body3"));
}

#[test]
fn run_with_extra_initial_state_fails_on_lookup() {
    let graph = graph();
    let mut initial = profiles::two_body_initial_states();
    initial.insert(
        AgentId::from("Asteroid"),
        modsim_types::AgentStateDto {
            position: Vector3::new(5.0, 5.0, 0.0),
            velocity: Vector3::ZERO,
            mass: 0.001,
        },
    );
    let mut sim = Simulator::new(&graph, &initial);

    assert!(matches!(
        sim.simulate(1),
        Err(SimulationError::Step {
            source: GraphError::UnknownAgent(_)
        })
    ));
}

#[tokio::test]
async fn cached_graph_drives_a_run() {
    let cache = GraphCache::new();
    let id = ProfileId::from(TWO_BODY_PROFILE_ID);
    cache.install(id.clone(), graph()).await;

    let graph = cache.get(&id).await.unwrap();
    let initial = profiles::two_body_initial_states();
    let mut sim = Simulator::new(&graph, &initial);
    sim.simulate(1).unwrap();
    assert_eq!(sim.store().len(), 3);
}
