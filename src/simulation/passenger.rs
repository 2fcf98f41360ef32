//! Passengers riding the elevators
//!
//! Two kinds exist: a simple passenger who rides once and leaves, and a
//! worker who visits a list of floors, resting on each before calling an
//! elevator again.

use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::fmt;

use super::snapshot::ElevatorSnapshot;
use super::types::{FloorNumber, PassengerId, Tick, LOBBY_FLOOR, WORKER_MAX_COMPANIONS};

/// The floors a worker still has to visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    current: FloorNumber,
    /// (resting time at the floor just reached, next destination)
    remaining: VecDeque<(Tick, FloorNumber)>,
}

impl Itinerary {
    /// Build an itinerary from the destinations in visiting order and one
    /// resting duration for every destination but the last.
    pub fn new(destinations: Vec<FloorNumber>, durations: Vec<Tick>) -> Result<Self> {
        if destinations.is_empty() {
            bail!("a worker needs at least one destination");
        }
        if durations.len() + 1 != destinations.len() {
            bail!(
                "a worker with {} destinations needs {} resting durations, got {}",
                destinations.len(),
                destinations.len() - 1,
                durations.len()
            );
        }
        if let Some(pair) = destinations.windows(2).find(|pair| pair[0] == pair[1]) {
            bail!("a worker cannot travel from floor {} to itself", pair[0]);
        }

        let mut floors = destinations.into_iter();
        let current = match floors.next() {
            Some(floor) => floor,
            None => bail!("a worker needs at least one destination"),
        };
        Ok(Self {
            current,
            remaining: durations.into_iter().zip(floors).collect(),
        })
    }

    pub fn current(&self) -> FloorNumber {
        self.current
    }

    /// All destinations not yet reached, current first
    pub fn destinations(&self) -> impl Iterator<Item = FloorNumber> + '_ {
        std::iter::once(self.current).chain(self.remaining.iter().map(|(_, floor)| *floor))
    }

    /// Move on to the next destination, returning how long to rest first
    fn advance(&mut self) -> Option<Tick> {
        let (rest, next) = self.remaining.pop_front()?;
        self.current = next;
        Some(rest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassengerKind {
    /// Rides once to a single destination
    Simple { destination: FloorNumber },
    /// Visits several floors in turn
    Worker(Itinerary),
}

impl PassengerKind {
    pub fn simple(destination: FloorNumber) -> Self {
        PassengerKind::Simple { destination }
    }

    pub fn worker(destinations: Vec<FloorNumber>, durations: Vec<Tick>) -> Result<Self> {
        Ok(PassengerKind::Worker(Itinerary::new(destinations, durations)?))
    }
}

/// What happens to a passenger after leaving an elevator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlightOutcome {
    /// The passenger is gone for good
    LeftBuilding,
    /// The passenger comes back to the same floor after resting
    Reappears { after: Tick, passenger: Passenger },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passenger {
    id: PassengerId,
    kind: PassengerKind,
    waiting_since: Tick,
}

impl Passenger {
    pub fn new(id: PassengerId, kind: PassengerKind) -> Self {
        Self {
            id,
            kind,
            waiting_since: 0,
        }
    }

    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn kind(&self) -> &PassengerKind {
        &self.kind
    }

    /// The floor the passenger is currently heading to
    pub fn destination(&self) -> FloorNumber {
        match &self.kind {
            PassengerKind::Simple { destination } => *destination,
            PassengerKind::Worker(itinerary) => itinerary.current(),
        }
    }

    /// Every floor this passenger will still ask for
    pub fn destinations(&self) -> Vec<FloorNumber> {
        match &self.kind {
            PassengerKind::Simple { destination } => vec![*destination],
            PassengerKind::Worker(itinerary) => itinerary.destinations().collect(),
        }
    }

    /// Tick at which the passenger started waiting on its current floor
    pub fn waiting_since(&self) -> Tick {
        self.waiting_since
    }

    pub(crate) fn mark_waiting(&mut self, now: Tick) {
        self.waiting_since = now;
    }

    /// Whether the passenger is willing to step into this elevator.
    /// Capacity is checked by the elevator, not here.
    pub fn will_board(&self, elevator: &ElevatorSnapshot) -> bool {
        match self.kind {
            PassengerKind::Simple { .. } => true,
            PassengerKind::Worker(_) => elevator.passenger_count() <= WORKER_MAX_COMPANIONS,
        }
    }

    /// Called when the passenger steps out of `elevator` on its current floor
    pub fn on_alight(mut self, elevator: &ElevatorSnapshot) -> AlightOutcome {
        let rest = match &mut self.kind {
            PassengerKind::Simple { .. } => None,
            PassengerKind::Worker(_) if elevator.floor == LOBBY_FLOOR => None,
            PassengerKind::Worker(itinerary) => itinerary.advance(),
        };
        match rest {
            Some(after) => AlightOutcome::Reappears {
                after,
                passenger: self,
            },
            None => AlightOutcome::LeftBuilding,
        }
    }
}

impl fmt::Display for Passenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PassengerKind::Simple { destination } => {
                write!(f, "Passenger {} heading to floor {}", self.id, destination)
            }
            PassengerKind::Worker(_) => {
                write!(f, "Worker {} heading to floor {}.", self.id, self.destination())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::{Direction, ElevatorId, ElevatorState};

    fn elevator_with(count: usize) -> ElevatorSnapshot {
        elevator_at(1, count)
    }

    fn elevator_at(floor: FloorNumber, count: usize) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id: ElevatorId(1),
            floor,
            state: ElevatorState::DoorsOpen,
            direction: Direction::Up,
            passenger_destinations: vec![5; count],
            capacity: 10,
        }
    }

    #[test]
    fn test_worker_refuses_crowded_elevator() {
        let worker = Passenger::new(
            PassengerId(1),
            PassengerKind::worker(vec![4, 1], vec![30]).unwrap(),
        );
        assert!(worker.will_board(&elevator_with(0)));
        assert!(worker.will_board(&elevator_with(3)));
        assert!(!worker.will_board(&elevator_with(4)));

        let simple = Passenger::new(PassengerId(2), PassengerKind::simple(4));
        assert!(simple.will_board(&elevator_with(9)));
    }

    #[test]
    fn test_worker_reappears_until_lobby() {
        let worker = Passenger::new(
            PassengerId(7),
            PassengerKind::worker(vec![3, 6, 1], vec![20, 45]).unwrap(),
        );
        assert_eq!(worker.destination(), 3);

        let worker = match worker.on_alight(&elevator_at(3, 0)) {
            AlightOutcome::Reappears { after, passenger } => {
                assert_eq!(after, 20);
                passenger
            }
            other => panic!("expected the worker to reappear, got {:?}", other),
        };
        assert_eq!(worker.destination(), 6);

        let worker = match worker.on_alight(&elevator_at(6, 0)) {
            AlightOutcome::Reappears { after, passenger } => {
                assert_eq!(after, 45);
                passenger
            }
            other => panic!("expected the worker to reappear, got {:?}", other),
        };
        assert_eq!(worker.destination(), 1);
        assert_eq!(worker.on_alight(&elevator_at(1, 0)), AlightOutcome::LeftBuilding);
    }

    #[test]
    fn test_simple_passenger_leaves() {
        let passenger = Passenger::new(PassengerId(1), PassengerKind::simple(2));
        assert_eq!(passenger.on_alight(&elevator_at(2, 0)), AlightOutcome::LeftBuilding);
    }

    #[test]
    fn test_invalid_itineraries_are_rejected() {
        assert!(PassengerKind::worker(vec![], vec![]).is_err());
        assert!(PassengerKind::worker(vec![3, 1], vec![]).is_err());
        assert!(PassengerKind::worker(vec![3, 3, 1], vec![10, 10]).is_err());
        assert!(PassengerKind::worker(vec![3], vec![]).is_ok());
    }
}
