//! Vertiport slot ledger, hovering queue and passenger queues

use vertiport_sim::simulation::{
    LandingDecision, PersonId, Position, SimError, SimId, StationId, Vertiport, VtolId,
};

fn vtol(n: usize) -> VtolId {
    VtolId(SimId(n))
}

fn person(n: usize) -> PersonId {
    PersonId(SimId(100 + n))
}

fn vertiport(capacity: usize) -> Vertiport {
    Vertiport::new(StationId(SimId(0)), "A", Position::new(0.0, 0.0), capacity)
}

#[test]
fn test_request_landing_grants_until_full() {
    let mut port = vertiport(2);
    assert_eq!(port.request_landing(vtol(1)), LandingDecision::Granted);
    assert_eq!(port.request_landing(vtol(2)), LandingDecision::Granted);
    assert_eq!(port.request_landing(vtol(3)), LandingDecision::Queued);

    assert_eq!(port.occupants(), &[vtol(1), vtol(2)]);
    assert_eq!(port.hovering_len(), 1);
    assert!(!port.has_free_slot());
}

#[test]
fn test_request_landing_is_idempotent() {
    let mut port = vertiport(1);
    port.request_landing(vtol(1));
    port.request_landing(vtol(2));

    assert_eq!(port.request_landing(vtol(1)), LandingDecision::Granted);
    assert_eq!(port.request_landing(vtol(2)), LandingDecision::Queued);
    assert_eq!(port.occupants().len(), 1);
    assert_eq!(port.hovering_len(), 1);
    assert_eq!(port.times_queued, 1);
}

#[test]
fn test_takeoff_hands_slot_to_queue_head() {
    let mut port = vertiport(1);
    port.request_landing(vtol(1));
    port.request_landing(vtol(2));
    port.request_landing(vtol(3));

    let granted = port.takeoff(vtol(1)).unwrap();
    assert_eq!(granted, vec![vtol(2)]);
    assert_eq!(port.occupants(), &[vtol(2)]);
    assert!(port.has_clearance(vtol(2)));
    assert!(!port.has_clearance(vtol(3)));
    assert!(port.is_queued(vtol(3)));

    assert!(port.take_clearance(vtol(2)));
    assert!(!port.take_clearance(vtol(2)));
}

#[test]
fn test_hovering_queue_is_fifo() {
    let mut port = vertiport(1);
    port.request_landing(vtol(0));
    for n in 1..=4 {
        port.request_landing(vtol(n));
    }

    let mut order = Vec::new();
    let mut current = vtol(0);
    for _ in 0..4 {
        let granted = port.takeoff(current).unwrap();
        assert_eq!(granted.len(), 1);
        current = granted[0];
        order.push(current);
    }
    assert_eq!(order, vec![vtol(1), vtol(2), vtol(3), vtol(4)]);
    assert_eq!(port.peak_queue, 4);
}

#[test]
fn test_takeoff_without_slot_is_invariant_error() {
    let mut port = vertiport(1);
    let err = port.takeoff(vtol(7)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SimError>(),
        Some(SimError::Invariant(_))
    ));
}

#[test]
fn test_abandon_keeps_remaining_order() {
    let mut port = vertiport(1);
    port.request_landing(vtol(0));
    port.request_landing(vtol(1));
    port.request_landing(vtol(2));
    port.request_landing(vtol(3));

    assert!(port.abandon(vtol(2)));
    assert!(!port.abandon(vtol(2)));
    let queue: Vec<VtolId> = port.hovering_queue().copied().collect();
    assert_eq!(queue, vec![vtol(1), vtol(3)]);
}

#[test]
fn test_release_hovering_noop_when_full() {
    let mut port = vertiport(1);
    port.request_landing(vtol(0));
    port.request_landing(vtol(1));
    assert!(port.release_hovering().is_empty());

    port.evict(vtol(0));
    assert_eq!(port.release_hovering(), vec![vtol(1)]);
    assert!(port.release_hovering().is_empty());
}

/// Two capacity-1 stations: the slot at B passes from the departing VTOL
/// straight to the hovering one, so B never counts two occupants.
#[test]
fn test_capacity_one_handoff() {
    let mut a = vertiport(1);
    let mut b = Vertiport::new(StationId(SimId(1)), "B", Position::new(100.0, 0.0), 1);
    let (v1, v2) = (vtol(1), vtol(2));

    assert_eq!(a.request_landing(v1), LandingDecision::Granted);
    a.takeoff(v1).unwrap();
    assert_eq!(b.request_landing(v1), LandingDecision::Granted);

    assert_eq!(a.request_landing(v2), LandingDecision::Granted);
    a.takeoff(v2).unwrap();
    assert_eq!(b.request_landing(v2), LandingDecision::Queued);
    assert_eq!((a.occupants().len(), b.occupants().len()), (0, 1));

    let granted = b.takeoff(v1).unwrap();
    assert_eq!(granted, vec![v2]);
    assert_eq!((a.occupants().len(), b.occupants().len()), (0, 1));
    assert!(b.take_clearance(v2));
    assert_eq!(b.occupants(), &[v2]);
}

#[test]
fn test_passengers_taken_fifo_and_capped() {
    let mut port = vertiport(1);
    let b = StationId(SimId(1));
    let c = StationId(SimId(2));
    for n in 0..5 {
        port.add_waiting_passenger(person(n), b);
    }
    port.add_waiting_passenger(person(9), c);

    assert_eq!(
        port.take_passengers_for(b, 4),
        vec![person(0), person(1), person(2), person(3)]
    );
    assert_eq!(port.waiting_for(b), 1);
    assert_eq!(port.waiting_for(c), 1);
    assert_eq!(port.take_passengers_for(b, 4), vec![person(4)]);
    assert!(port.take_passengers_for(b, 4).is_empty());
    assert_eq!(port.waiting_count(), 1);
}

#[test]
fn test_occupancy_info() {
    let mut port = vertiport(4);
    port.request_landing(vtol(1));
    port.add_waiting_passenger(person(0), StationId(SimId(5)));

    let info = port.occupancy();
    assert_eq!(info.capacity, 4);
    assert_eq!(info.occupied, 1);
    assert_eq!(info.available, 3);
    assert_eq!(info.hovering, 0);
    assert_eq!(info.waiting, 1);
    assert!((info.occupancy_rate - 0.25).abs() < 1e-6);
}

#[test]
fn test_arrivals_recorded_and_removed() {
    let mut port = vertiport(1);
    port.record_arrival(person(1));
    port.record_arrival(person(2));
    port.remove_arrival(person(1));
    assert_eq!(port.arrived(), &[person(2)]);
}
