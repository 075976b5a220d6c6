//! Route traversal, bounded waits and the simulation clock

use vertiport_sim::simulation::{
    format_time_of_day, parse_time_of_day, BoundedWait, RecoveryAction, RouteMode, RoutePlan,
    SimClock, SimId, StationId,
};

fn stops(n: usize) -> Vec<StationId> {
    (0..n).map(|i| StationId(SimId(i))).collect()
}

fn walk(plan: &mut RoutePlan, steps: usize) -> Vec<usize> {
    (0..steps)
        .filter_map(|_| plan.advance())
        .map(|station| station.0 .0)
        .collect()
}

#[test]
fn test_ping_pong_reverses_at_both_ends() {
    let mut plan = RoutePlan::new(stops(3), RouteMode::PingPong);
    assert_eq!(plan.current().map(|s| s.0 .0), Some(0));
    assert_eq!(walk(&mut plan, 8), vec![1, 2, 1, 0, 1, 2, 1, 0]);
}

#[test]
fn test_ping_pong_two_stops() {
    let mut plan = RoutePlan::new(stops(2), RouteMode::PingPong);
    assert_eq!(walk(&mut plan, 4), vec![1, 0, 1, 0]);
}

#[test]
fn test_circular_wraps() {
    let mut plan = RoutePlan::new(stops(3), RouteMode::Circular);
    assert_eq!(walk(&mut plan, 5), vec![1, 2, 0, 1, 2]);
}

#[test]
fn test_one_shot_stops_at_end() {
    let mut plan = RoutePlan::new(stops(3), RouteMode::OneShot);
    assert!(!plan.is_finished());
    assert_eq!(walk(&mut plan, 5), vec![1, 2]);
    assert!(plan.is_finished());
    assert_eq!(plan.peek_next(), None);
}

#[test]
fn test_peek_does_not_move_cursor() {
    let mut plan = RoutePlan::new(stops(3), RouteMode::PingPong);
    plan.advance();
    plan.advance();
    assert_eq!(plan.peek_next(), Some(StationId(SimId(1))));
    assert_eq!(plan.peek_next(), Some(StationId(SimId(1))));
    assert_eq!(plan.index(), 2);
    assert!(!plan.is_reversed());

    plan.advance();
    assert!(plan.is_reversed());
    plan.reset();
    assert_eq!(plan.index(), 0);
    assert!(!plan.is_reversed());
}

#[test]
fn test_bounded_wait_fires_after_budget() {
    let mut wait = BoundedWait::new(3, RecoveryAction::Divert);
    assert_eq!(wait.tick(), None);
    assert_eq!(wait.tick(), None);
    assert_eq!(wait.tick(), None);
    assert_eq!(wait.tick(), Some(RecoveryAction::Divert));

    // Fresh budget after firing
    assert_eq!(wait.elapsed(), 0);
    assert_eq!(wait.tick(), None);
}

#[test]
fn test_bounded_wait_reset_on_progress() {
    let mut wait = BoundedWait::new(2, RecoveryAction::ReattemptDeparture);
    wait.tick();
    wait.tick();
    wait.reset();
    assert_eq!(wait.tick(), None);
    assert_eq!(wait.tick(), None);
    assert_eq!(wait.tick(), Some(RecoveryAction::ReattemptDeparture));
}

#[test]
fn test_clock_time_of_day() {
    let mut clock = SimClock::new(6, 4 * 3600);
    assert_eq!(clock.to_string(), "04:00");
    for _ in 0..10 {
        clock.advance();
    }
    assert_eq!(clock.tick(), 10);
    assert_eq!(clock.time_of_day(), 4 * 3600 + 60);
    assert_eq!(clock.to_string(), "04:01");
    assert_eq!(clock.tick_at(4 * 3600 + 61), 11);
    assert_eq!(clock.tick_at(4 * 3600 + 60), 10);
    // 01:00 has already passed today, so it means 01:00 tomorrow
    assert_eq!(clock.tick_at(3600), (86_400 + 3600 - 4 * 3600) / 6);
}

#[test]
fn test_clock_tick_at_after_midnight() {
    let mut clock = SimClock::new(3600, 23 * 3600);
    clock.advance();
    clock.advance();
    assert_eq!(clock.to_string(), "01:00");

    // Earlier than the start time of day zero, but still ahead today
    assert_eq!(clock.tick_at(3 * 3600), 4);
    assert_eq!(clock.tick_at(3600), 2);
    // Already gone today: 00:00 tomorrow
    assert_eq!(clock.tick_at(0), 25);
}

#[test]
fn test_clock_wraps_at_midnight() {
    let mut clock = SimClock::new(3600, 23 * 3600);
    clock.advance();
    clock.advance();
    assert_eq!(clock.to_string(), "01:00");
}

#[test]
fn test_time_of_day_parsing() {
    assert_eq!(parse_time_of_day("08:30"), Some(8 * 3600 + 30 * 60));
    assert_eq!(parse_time_of_day(" 4:05 "), Some(4 * 3600 + 5 * 60));
    assert_eq!(parse_time_of_day("24:00"), Some(86_400));
    assert_eq!(parse_time_of_day("25:00"), None);
    assert_eq!(parse_time_of_day("08:60"), None);
    assert_eq!(parse_time_of_day("0830"), None);
    assert_eq!(format_time_of_day(8 * 3600 + 5 * 60), "08:05");
}
