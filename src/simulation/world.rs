//! Main simulation world that ties everything together
//!
//! The world owns the clock, the building and the passenger source, and
//! runs events one at a time.

use anyhow::Result;
use log::{info, warn};

use super::building::Building;
use super::clock::{EventQueue, SimEvent};
use super::config::SimConfig;
use super::generator::PassengerSource;
use super::notice::Notice;
use super::passenger::{Passenger, PassengerKind};
use super::snapshot::BuildingSnapshot;
use super::stats::SimStats;
use super::types::{Direction, ElevatorId, ElevatorState, FloorNumber, PassengerId, Tick};

/// What a processed event was
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiredEvent {
    /// An elevator ran `state`; floor and direction are as it left them
    ElevatorTransition {
        elevator: ElevatorId,
        state: ElevatorState,
        floor: FloorNumber,
        direction: Direction,
    },
    PassengerArrival {
        passenger: PassengerId,
        floor: FloorNumber,
    },
    SpawnPassenger,
}

/// One processed event and everything it caused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub time: Tick,
    pub fired: FiredEvent,
    pub notices: Vec<Notice>,
}

/// The main simulation world
pub struct SimWorld {
    clock: EventQueue,
    building: Building,
    /// Optional generator of new passengers
    source: Option<Box<dyn PassengerSource>>,
    stats: SimStats,
    next_passenger: usize,
}

impl SimWorld {
    pub fn new(config: &SimConfig) -> Result<Self> {
        Ok(Self {
            clock: EventQueue::new(),
            building: Building::new(config)?,
            source: None,
            stats: SimStats::default(),
            next_passenger: 1,
        })
    }

    /// Create a world fed by a passenger source, starting at tick 0
    pub fn with_source(config: &SimConfig, source: Box<dyn PassengerSource>) -> Result<Self> {
        let mut world = Self::new(config)?;
        world.source = Some(source);
        world.clock.schedule_in(0, SimEvent::SpawnPassenger);
        Ok(world)
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn building(&self) -> &Building {
        &self.building
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn pending_events(&self) -> usize {
        self.clock.len()
    }

    fn next_passenger_id(&mut self) -> PassengerId {
        let id = PassengerId(self.next_passenger);
        self.next_passenger += 1;
        id
    }

    /// Have a new passenger appear on `floor` at tick `at`
    pub fn schedule_arrival(
        &mut self,
        at: Tick,
        floor: FloorNumber,
        kind: PassengerKind,
    ) -> Result<PassengerId> {
        let passenger = Passenger::new(self.next_passenger_id(), kind);
        let id = passenger.id();
        self.building.check_arrival(floor, &passenger)?;
        self.clock
            .schedule(at, SimEvent::PassengerArrival { floor, passenger })?;
        self.stats.passengers_spawned += 1;
        Ok(id)
    }

    /// Process the next pending event. Returns `None` once nothing is left.
    pub fn step(&mut self) -> Result<Option<StepReport>> {
        let Some((time, event)) = self.clock.pop_next() else {
            return Ok(None);
        };

        let (fired, notices) = match event {
            SimEvent::ElevatorTransition {
                elevator,
                state,
                generation,
            } => {
                let notices = self.building.fire_elevator(
                    &mut self.clock,
                    elevator,
                    state,
                    generation,
                )?;
                let after = self.building.elevator(elevator)?;
                let fired = FiredEvent::ElevatorTransition {
                    elevator,
                    state,
                    floor: after.current_floor(),
                    direction: after.direction(),
                };
                (fired, notices)
            }
            SimEvent::PassengerArrival { floor, passenger } => {
                let fired = FiredEvent::PassengerArrival {
                    passenger: passenger.id(),
                    floor,
                };
                let notices = self
                    .building
                    .passenger_arrived(&mut self.clock, floor, passenger)?;
                (fired, notices)
            }
            SimEvent::SpawnPassenger => (FiredEvent::SpawnPassenger, self.spawn_passenger()?),
        };

        self.stats.record(&notices);
        Ok(Some(StepReport {
            time,
            fired,
            notices,
        }))
    }

    fn spawn_passenger(&mut self) -> Result<Vec<Notice>> {
        let now = self.clock.now();
        let floor_count = self.building.floor_count();
        let arrival = match self.source.as_mut() {
            Some(source) => source.next_arrival(now, floor_count)?,
            None => None,
        };
        let Some(arrival) = arrival else {
            info!("Passenger source exhausted at tick {}", now);
            return Ok(Vec::new());
        };

        let passenger = Passenger::new(self.next_passenger_id(), arrival.kind);
        self.stats.passengers_spawned += 1;
        let notices = self
            .building
            .passenger_arrived(&mut self.clock, arrival.floor, passenger)?;
        self.clock
            .schedule_in(arrival.next_in.max(1), SimEvent::SpawnPassenger);
        Ok(notices)
    }

    /// Process every event due at or before `horizon`, then move the clock
    /// to `horizon`. Returns the number of events processed.
    pub fn run_until(&mut self, horizon: Tick) -> Result<usize> {
        let mut processed = 0;
        while self.clock.next_fire_time().is_some_and(|at| at <= horizon) {
            self.step()?;
            processed += 1;
        }
        self.clock.advance_to(horizon);
        Ok(processed)
    }

    pub fn run_for(&mut self, ticks: Tick) -> Result<usize> {
        self.run_until(self.clock.now().saturating_add(ticks))
    }

    pub fn snapshot(&self) -> BuildingSnapshot {
        self.building.snapshot(self.clock.now())
    }

    /// Number of passengers standing on floors
    pub fn waiting_passengers(&self) -> usize {
        self.building
            .floors()
            .iter()
            .map(|floor| floor.waiting_passengers().len())
            .sum()
    }

    /// Number of passengers inside elevators
    pub fn riding_passengers(&self) -> usize {
        self.building
            .elevators()
            .iter()
            .map(|elevator| elevator.passenger_count())
            .sum()
    }

    /// Log a summary of the world state
    pub fn print_summary(&self) {
        let stats = &self.stats;
        info!("=== Elevator Simulation Summary ===");
        info!("Time: {} ticks", self.now());
        info!(
            "Floors: {}, Elevators: {}",
            self.building.floor_count(),
            self.building.elevator_count()
        );
        info!("Passengers spawned: {}", stats.passengers_spawned);
        info!("Trips completed: {}", stats.alightings);
        info!("Passengers departed: {}", stats.departures);
        info!("Dispatches: {}", stats.dispatches);
        info!("Queued calls: {}", stats.queued_calls);
        info!("Door cycles: {}", stats.door_cycles);
        match stats.average_wait() {
            Some(average) => info!("Average wait: {:.1} ticks", average),
            None => info!("Average wait: n/a"),
        }
        info!("Longest wait: {} ticks", stats.max_wait);

        for elevator in self.building.elevators() {
            info!("  {}", elevator.snapshot());
        }

        let waiting = self.waiting_passengers();
        if waiting > 0 {
            warn!("{} passengers still waiting for an elevator", waiting);
        }
    }
}
