//! Coordinator: construction, commands, snapshots and invariants

mod common;

use common::{fast_config, run_until, state_of, world_with};
use vertiport_sim::simulation::{
    Position, RouteMode, SimCommand, SimConfig, SimError, SimWorld, VtolState,
};

#[test]
fn test_demo_world_structure() {
    let world = SimWorld::create_demo_world_with_seed(1).unwrap();
    assert_eq!(world.vertiports.len(), 5);
    assert_eq!(world.vtols.len(), 4);
    assert_eq!(world.network.link_count(), 13);
    assert_eq!(world.demand.records().len(), 6);

    let stats = world.network.stats();
    assert_eq!(stats.bidirectional_pairs, 6);
    assert_eq!(stats.one_way_links, 1);

    // Circular manifest given as V1,V2,V3,V1 keeps three stops
    let a1 = world.vtols.values().find(|v| v.label == "A1").unwrap();
    assert_eq!(a1.route().stops().len(), 3);
    assert_eq!(a1.route().mode(), RouteMode::Circular);
}

#[test]
fn test_demo_world_runs_with_invariants() {
    let mut world = SimWorld::create_demo_world_with_seed(3).unwrap();
    for _ in 0..2000 {
        world.tick();
        world.check_invariants().unwrap();
    }

    let stats = world.stats();
    assert!(stats.passengers_spawned > 0);
    assert!(stats.landings > 0);
    assert!(stats.passengers_delivered > 0);
    assert!(stats.passengers_delivered <= stats.passengers_boarded);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let mut first = SimWorld::create_demo_world_with_seed(11).unwrap();
    let mut second = SimWorld::create_demo_world_with_seed(11).unwrap();
    first.run(800);
    second.run(800);

    assert_eq!(first.stats(), second.stats());
    let positions = |world: &SimWorld| -> Vec<(f32, f32)> {
        world
            .vtols
            .values()
            .map(|v| (v.position.x, v.position.y))
            .collect()
    };
    assert_eq!(positions(&first), positions(&second));
}

#[test]
fn test_pause_freezes_ticks() {
    let mut world = SimWorld::create_demo_world_with_seed(5).unwrap();
    world.run(10);
    world.apply(SimCommand::Pause).unwrap();
    assert!(world.is_paused());

    world.run(50);
    assert_eq!(world.clock().tick(), 10);
    assert!(world.snapshot().paused);

    world.apply(SimCommand::TogglePause).unwrap();
    world.run(5);
    assert_eq!(world.clock().tick(), 15);

    world.apply(SimCommand::TogglePause).unwrap();
    world.apply(SimCommand::Resume).unwrap();
    assert!(!world.is_paused());
}

#[test]
fn test_restart_routes_resets_vtols_and_drops_riders() {
    let mut world = world_with(fast_config());
    let a = world.add_station("A", 1, Position::new(0.0, 0.0)).unwrap();
    let b = world.add_station("B", 1, Position::new(200.0, 0.0)).unwrap();
    world.add_two_way_link(a, b).unwrap();
    let vtol = world
        .add_route_vtol("R1", vec![a, b], RouteMode::PingPong, None)
        .unwrap();
    world.add_person(a, b).unwrap();

    run_until(&mut world, 50, |w| state_of(w, vtol) == VtolState::Flying);
    assert_eq!(world.vtols[&vtol].onboard().len(), 1);

    world.apply(SimCommand::RestartRoutes).unwrap();
    let reset = &world.vtols[&vtol];
    assert_eq!(reset.state(), VtolState::Landed);
    assert_eq!(reset.station(), Some(a));
    assert_eq!(reset.position, Position::new(0.0, 0.0));
    assert!(reset.onboard().is_empty());
    assert!(world.persons.is_empty());
    assert_eq!(world.stats().passengers_dropped, 1);
    assert_eq!(world.vertiports[&a].occupants(), &[vtol]);
    world.check_invariants().unwrap();
}

#[test]
fn test_restart_routes_respects_capacity() {
    let mut world = world_with(fast_config());
    let a = world.add_station("A", 1, Position::new(0.0, 0.0)).unwrap();
    let b = world.add_station("B", 2, Position::new(50.0, 0.0)).unwrap();
    world.add_two_way_link(a, b).unwrap();
    let first = world
        .add_route_vtol("F1", vec![a, b], RouteMode::PingPong, None)
        .unwrap();
    let second = world
        .add_route_vtol("F2", vec![a, b], RouteMode::PingPong, None)
        .unwrap();

    world.run(40);
    world.restart_routes().unwrap();

    assert_eq!(state_of(&world, first), VtolState::Landed);
    assert_eq!(state_of(&world, second), VtolState::Hovering);
    assert!(world.vertiports[&a].is_queued(second));
    world.check_invariants().unwrap();
}

#[test]
fn test_spawn_command_and_no_route_error() {
    let mut world = world_with(fast_config());
    let a = world.add_station("A", 1, Position::new(0.0, 0.0)).unwrap();
    let b = world.add_station("B", 1, Position::new(50.0, 0.0)).unwrap();
    world.add_link(a, b).unwrap();

    world
        .apply(SimCommand::SpawnVtol {
            origin: a,
            destination: b,
            start_secs: 0,
            speed: Some(8.0),
        })
        .unwrap();
    assert_eq!(world.vtols.len(), 1);
    let spawned = world.vtols.values().next().unwrap();
    assert_eq!(spawned.speed, 8.0);
    assert_eq!(spawned.label, "A-B");
    assert_eq!(spawned.route().mode(), RouteMode::OneShot);

    let err = world.spawn_vtol(b, a, 0, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SimError>(),
        Some(SimError::NoRoute { .. })
    ));
    assert_eq!(world.vtols.len(), 1);
}

#[test]
fn test_configuration_errors() {
    let mut world = world_with(fast_config());
    let a = world.add_station("A", 1, Position::new(0.0, 0.0)).unwrap();

    let duplicate = world.add_station("A", 1, Position::new(5.0, 5.0)).unwrap_err();
    assert!(matches!(
        duplicate.downcast_ref::<SimError>(),
        Some(SimError::DuplicateStation(_))
    ));

    let capacity = world.add_station("B", 0, Position::new(5.0, 5.0)).unwrap_err();
    assert!(matches!(
        capacity.downcast_ref::<SimError>(),
        Some(SimError::InvalidCapacity { .. })
    ));

    let short = world
        .add_route_vtol("X", vec![a], RouteMode::OneShot, None)
        .unwrap_err();
    assert!(matches!(
        short.downcast_ref::<SimError>(),
        Some(SimError::InvalidRoute { .. })
    ));

    let b = world.add_station("B", 1, Position::new(50.0, 0.0)).unwrap();
    world.add_two_way_link(a, b).unwrap();
    for speed in [0.0, -3.0, f32::NAN, f32::INFINITY] {
        let err = world
            .add_route_vtol("X", vec![a, b], RouteMode::OneShot, Some(speed))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::InvalidRoute { .. })
        ));
    }
    let err = world.spawn_vtol(a, b, 0, Some(-1.0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SimError>(),
        Some(SimError::InvalidRoute { .. })
    ));
    assert!(world.vtols.is_empty());

    let same = world.add_person(a, a).unwrap_err();
    assert!(matches!(
        same.downcast_ref::<SimError>(),
        Some(SimError::InvalidDemand(_))
    ));
    assert!(world.persons.is_empty());
    assert_eq!(world.vertiports[&a].waiting_count(), 0);

    let unknown = world.station_id("Z").unwrap_err();
    assert!(matches!(
        unknown.downcast_ref::<SimError>(),
        Some(SimError::UnknownStation(_))
    ));
}

#[test]
fn test_default_speed_is_checked_when_vtols_are_added() {
    let config = SimConfig {
        default_speed: 0.0,
        ..fast_config()
    };
    let mut world = world_with(config);
    let a = world.add_station("A", 1, Position::new(0.0, 0.0)).unwrap();
    let b = world.add_station("B", 1, Position::new(50.0, 0.0)).unwrap();
    world.add_two_way_link(a, b).unwrap();

    assert!(world
        .add_route_vtol("D1", vec![a, b], RouteMode::PingPong, None)
        .is_err());
    // An explicit speed still works
    let vtol = world
        .add_route_vtol("D2", vec![a, b], RouteMode::PingPong, Some(5.0))
        .unwrap();
    assert_eq!(world.vtols[&vtol].speed, 5.0);
}

#[test]
fn test_snapshot_views() {
    let mut world = SimWorld::create_demo_world_with_seed(9).unwrap();
    world.run(100);
    let snapshot = world.snapshot();

    assert_eq!(snapshot.tick, 100);
    assert_eq!(snapshot.time_of_day, "04:10");
    assert_eq!(snapshot.vtols.len(), 4);
    assert_eq!(snapshot.vertiports.len(), 5);
    assert_eq!(snapshot.persons.len(), world.persons.len());
    for view in &snapshot.vertiports {
        assert!(view.occupied <= view.capacity);
    }
    for view in &snapshot.vtols {
        assert!(view.onboard <= world.config.seat_capacity);
        match view.state {
            VtolState::Landed | VtolState::TakingOff => assert!(view.station.is_some()),
            _ => assert!(view.station.is_none()),
        }
    }

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json["vtols"][0]["state"].is_string());
    assert!(json["stats"]["passengers_spawned"].is_u64());
}
