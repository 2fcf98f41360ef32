//! Virtual simulation clock
//!
//! Pending events are kept in a binary heap ordered by fire time. Events that
//! fire on the same tick run in the order they were scheduled, which keeps
//! runs repeatable.

use anyhow::{bail, Result};
use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::passenger::Passenger;
use super::types::{ElevatorId, ElevatorState, FloorNumber, Tick};

/// Work the clock can schedule
#[derive(Debug, Clone)]
pub enum SimEvent {
    /// Execute `state` for an elevator. `generation` must match the
    /// elevator's pending transition.
    ElevatorTransition {
        elevator: ElevatorId,
        state: ElevatorState,
        generation: u64,
    },
    /// A passenger appears at a floor and starts waiting
    PassengerArrival {
        floor: FloorNumber,
        passenger: Passenger,
    },
    /// Ask the passenger source for its next arrival
    SpawnPassenger,
}

#[derive(Debug)]
struct ScheduledEvent {
    at: Tick,
    seq: u64,
    event: SimEvent,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the largest item; reversed so the earliest (at, seq) wins
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Event queue driving the simulation
#[derive(Debug, Default)]
pub struct EventQueue {
    now: Tick,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Schedule an event at an absolute tick.
    ///
    /// Scheduling into the past is rejected rather than clamped.
    pub fn schedule(&mut self, at: Tick, event: SimEvent) -> Result<()> {
        if at < self.now {
            bail!(
                "cannot schedule {:?} at tick {} before the current tick {}",
                event,
                at,
                self.now
            );
        }
        self.push(at, event);
        Ok(())
    }

    /// Schedule an event `delay` ticks from now
    pub fn schedule_in(&mut self, delay: Tick, event: SimEvent) {
        let at = self.now.saturating_add(delay);
        self.push(at, event);
    }

    fn push(&mut self, at: Tick, event: SimEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!("schedule #{} at tick {} (now {}): {:?}", seq, at, self.now, event);
        self.queue.push(ScheduledEvent { at, seq, event });
    }

    /// Fire time of the earliest pending event
    pub fn next_fire_time(&self) -> Option<Tick> {
        self.queue.peek().map(|item| item.at)
    }

    /// Remove the earliest pending event and advance the clock to its fire time
    pub fn pop_next(&mut self) -> Option<(Tick, SimEvent)> {
        let item = self.queue.pop()?;
        self.now = item.at;
        Some((item.at, item.event))
    }

    /// Move the clock forward to `tick` without firing anything.
    /// Never moves the clock backwards.
    pub fn advance_to(&mut self, tick: Tick) {
        self.now = self.now.max(tick);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(elevator: usize, generation: u64) -> SimEvent {
        SimEvent::ElevatorTransition {
            elevator: ElevatorId(elevator),
            state: ElevatorState::Moving,
            generation,
        }
    }

    fn generation_of(event: &SimEvent) -> u64 {
        match event {
            SimEvent::ElevatorTransition { generation, .. } => *generation,
            _ => panic!("unexpected event {:?}", event),
        }
    }

    #[test]
    fn test_events_fire_in_time_order() {
        let mut clock = EventQueue::new();
        clock.schedule(10, transition(1, 10)).unwrap();
        clock.schedule(2, transition(1, 2)).unwrap();
        clock.schedule(5, transition(1, 5)).unwrap();

        let mut fired = Vec::new();
        while let Some((at, event)) = clock.pop_next() {
            assert_eq!(clock.now(), at);
            fired.push(generation_of(&event));
        }
        assert_eq!(fired, vec![2, 5, 10]);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut clock = EventQueue::new();
        for generation in 0..5 {
            clock.schedule(7, transition(1, generation)).unwrap();
        }
        clock.schedule(3, transition(2, 99)).unwrap();

        let order: Vec<u64> = std::iter::from_fn(|| clock.pop_next())
            .map(|(_, event)| generation_of(&event))
            .collect();
        assert_eq!(order, vec![99, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_schedule_in_is_relative_to_now() {
        let mut clock = EventQueue::new();
        clock.schedule(4, SimEvent::SpawnPassenger).unwrap();
        clock.pop_next();
        clock.schedule_in(3, SimEvent::SpawnPassenger);
        assert_eq!(clock.next_fire_time(), Some(7));
    }

    #[test]
    fn test_scheduling_in_the_past_is_rejected() {
        let mut clock = EventQueue::new();
        clock.advance_to(10);
        assert!(clock.schedule(9, SimEvent::SpawnPassenger).is_err());
        assert!(clock.is_empty());
        assert!(clock.schedule(10, SimEvent::SpawnPassenger).is_ok());
        assert_eq!(clock.len(), 1);
    }

    #[test]
    fn test_advance_never_goes_backwards() {
        let mut clock = EventQueue::new();
        clock.advance_to(20);
        clock.advance_to(5);
        assert_eq!(clock.now(), 20);
    }
}
