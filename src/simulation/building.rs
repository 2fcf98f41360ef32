//! The building: floors, elevators and the dispatch policy
//!
//! The building owns every floor and elevator and is the only place notices
//! are routed. A call button press goes to an idle elevator if there is one,
//! otherwise the floor joins a FIFO queue that is drained whenever an
//! elevator goes idle.

use anyhow::{bail, Context, Result};
use log::debug;
use std::collections::VecDeque;

use super::clock::{EventQueue, SimEvent};
use super::config::SimConfig;
use super::elevator::{Elevator, Transition};
use super::floor::Floor;
use super::notice::Notice;
use super::passenger::{AlightOutcome, Passenger};
use super::snapshot::{BuildingSnapshot, FloorSnapshot};
use super::types::{
    Direction, ElevatorId, ElevatorState, FloorNumber, PassengerId, Tick, LOBBY_FLOOR,
};

#[derive(Debug, Clone)]
pub struct Building {
    /// Index `n - 1` holds floor `n`
    floors: Vec<Floor>,
    /// Index `n - 1` holds elevator `n`
    elevators: Vec<Elevator>,
    /// Floors whose call could not be served yet, oldest first, no duplicates
    waiting_floors: VecDeque<FloorNumber>,
}

impl Building {
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let floors = (LOBBY_FLOOR..=config.floors).map(Floor::new).collect();
        let elevators = (1..=config.elevators)
            .map(|n| {
                Elevator::new(
                    ElevatorId(n),
                    config.start_floor,
                    config.floors,
                    config.capacity,
                )
            })
            .collect();

        Ok(Self {
            floors,
            elevators,
            waiting_floors: VecDeque::new(),
        })
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn elevator_count(&self) -> usize {
        self.elevators.len()
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    pub fn floor(&self, number: FloorNumber) -> Result<&Floor> {
        number
            .checked_sub(1)
            .and_then(|index| self.floors.get(index))
            .with_context(|| format!("floor {} does not exist", number))
    }

    fn floor_mut(&mut self, number: FloorNumber) -> Result<&mut Floor> {
        number
            .checked_sub(1)
            .and_then(|index| self.floors.get_mut(index))
            .with_context(|| format!("floor {} does not exist", number))
    }

    pub fn elevator(&self, id: ElevatorId) -> Result<&Elevator> {
        let index = self.elevator_index(id)?;
        Ok(&self.elevators[index])
    }

    fn elevator_index(&self, id: ElevatorId) -> Result<usize> {
        id.0.checked_sub(1)
            .filter(|index| *index < self.elevators.len())
            .with_context(|| format!("elevator {} does not exist", id))
    }

    /// Floors queued for an elevator, oldest first
    pub fn waiting_floors(&self) -> impl Iterator<Item = FloorNumber> + '_ {
        self.waiting_floors.iter().copied()
    }

    pub fn is_floor_queued(&self, floor: FloorNumber) -> bool {
        self.waiting_floors.contains(&floor)
    }

    /// Check that a passenger can start waiting on `floor`
    pub fn check_arrival(&self, floor: FloorNumber, passenger: &Passenger) -> Result<()> {
        self.floor(floor)?;
        for destination in passenger.destinations() {
            if !(LOBBY_FLOOR..=self.floor_count()).contains(&destination) {
                bail!(
                    "passenger {} wants floor {}, but the building has floors {}..={}",
                    passenger.id(),
                    destination,
                    LOBBY_FLOOR,
                    self.floor_count()
                );
            }
        }
        if passenger.destination() == floor {
            bail!(
                "passenger {} arrives on its own destination floor {}",
                passenger.id(),
                floor
            );
        }
        Ok(())
    }

    /// A passenger appears on a floor
    pub fn passenger_arrived(
        &mut self,
        clock: &mut EventQueue,
        floor: FloorNumber,
        mut passenger: Passenger,
    ) -> Result<Vec<Notice>> {
        self.check_arrival(floor, &passenger)?;
        passenger.mark_waiting(clock.now());

        let mut notices = vec![Notice::PassengerArrived {
            passenger: passenger.id(),
            floor,
            destination: passenger.destination(),
        }];
        let raised = self.floor_mut(floor)?.add_waiting_passenger(passenger)?;
        self.route(clock, raised.into_iter().collect(), &mut notices)?;
        Ok(notices)
    }

    /// Run a fired elevator transition and schedule whatever follows it
    pub fn fire_elevator(
        &mut self,
        clock: &mut EventQueue,
        id: ElevatorId,
        state: ElevatorState,
        generation: u64,
    ) -> Result<Vec<Notice>> {
        let index = self.elevator_index(id)?;
        self.elevators[index].enter(state, generation)?;
        let floor = self.elevators[index].current_floor();
        debug!(
            "t={} elevator {} {} at floor {} ({})",
            clock.now(),
            id,
            state,
            floor,
            self.elevators[index].direction()
        );

        let mut notices = Vec::new();
        let mut raised = Vec::new();
        match state {
            ElevatorState::Idle => raised.push(Notice::ElevatorIdle { elevator: id }),
            ElevatorState::DoorsOpening => {
                raised.push(Notice::ElevatorArrived { elevator: id, floor })
            }
            ElevatorState::DoorsOpen => self.exchange_passengers(clock, index, &mut notices)?,
            _ => {}
        }

        let here = self.floor(floor)?;
        if let Some(mut transition) = self.elevators[index].plan(here) {
            let elevator = &self.elevators[index];
            if transition.next == ElevatorState::Decelerating
                && !elevator.must_stop_here()
                && self.call_answered(index, floor, elevator.direction())
            {
                debug!(
                    "elevator {} passes floor {}, its call is already answered",
                    id, floor
                );
                transition.next = ElevatorState::Moving;
            }
            if state == ElevatorState::DoorsClosing
                && transition.next == ElevatorState::Accelerating
            {
                // Whoever is still waiting here was left behind; call again
                raised.extend(
                    here.pressed_directions()
                        .map(|direction| Notice::FloorCallRaised { floor, direction }),
                );
            }
            self.schedule_transition(clock, index, transition)?;
        }

        self.route(clock, raised, &mut notices)?;
        Ok(notices)
    }

    /// Deliver notices in order, letting each one raise further notices.
    /// Every routed notice ends up in `log`.
    fn route(
        &mut self,
        clock: &mut EventQueue,
        raised: Vec<Notice>,
        log: &mut Vec<Notice>,
    ) -> Result<()> {
        let mut queue: VecDeque<Notice> = raised.into();
        while let Some(notice) = queue.pop_front() {
            log.push(notice);
            match notice {
                Notice::FloorCallRaised { floor, direction } => {
                    self.direction_requested(clock, floor, direction, &mut queue)?
                }
                Notice::ElevatorIdle { elevator } => {
                    self.elevator_went_idle(clock, elevator, &mut queue)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn direction_requested(
        &mut self,
        clock: &mut EventQueue,
        floor: FloorNumber,
        direction: Direction,
        queue: &mut VecDeque<Notice>,
    ) -> Result<()> {
        // An idle elevator already standing here answers first
        let chosen = self
            .elevators
            .iter()
            .position(|elevator| elevator.is_idle() && elevator.current_floor() == floor)
            .or_else(|| self.elevators.iter().position(Elevator::is_idle));

        match chosen {
            Some(index) => self.dispatch(clock, index, floor, queue),
            None if self.waiting_floors.contains(&floor) => {
                debug!("floor {} call {} already queued", floor, direction);
                Ok(())
            }
            None => {
                debug!("no idle elevator for floor {} {}, queueing", floor, direction);
                self.waiting_floors.push_back(floor);
                queue.push_back(Notice::FloorQueued { floor });
                Ok(())
            }
        }
    }

    fn elevator_went_idle(
        &mut self,
        clock: &mut EventQueue,
        id: ElevatorId,
        queue: &mut VecDeque<Notice>,
    ) -> Result<()> {
        let index = self.elevator_index(id)?;
        if !self.elevators[index].is_idle() {
            return Ok(());
        }
        while let Some(floor) = self.waiting_floors.pop_front() {
            if self.floor(floor)?.pressed_directions().next().is_none() {
                debug!("floor {} was served while queued, dropping it", floor);
                continue;
            }
            return self.dispatch(clock, index, floor, queue);
        }
        Ok(())
    }

    /// Whether an elevator other than `index` is already stopping at
    /// `floor` to pick up passengers going `direction`
    fn call_answered(&self, index: usize, floor: FloorNumber, direction: Direction) -> bool {
        self.elevators
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, elevator)| elevator)
            .any(|elevator| {
                let stopping = matches!(
                    elevator.state(),
                    ElevatorState::Decelerating | ElevatorState::DoorsOpening
                ) || elevator.pending() == Some(ElevatorState::Decelerating);
                stopping && elevator.current_floor() == floor && elevator.direction() == direction
            })
    }

    fn dispatch(
        &mut self,
        clock: &mut EventQueue,
        index: usize,
        floor: FloorNumber,
        queue: &mut VecDeque<Notice>,
    ) -> Result<()> {
        let transition = self.elevators[index].dispatch_to(floor)?;
        let elevator = self.elevators[index].id();
        debug!("t={} dispatching elevator {} to floor {}", clock.now(), elevator, floor);
        self.schedule_transition(clock, index, transition)?;
        queue.push_back(Notice::ElevatorDispatched { elevator, floor });
        Ok(())
    }

    fn schedule_transition(
        &mut self,
        clock: &mut EventQueue,
        index: usize,
        transition: Transition,
    ) -> Result<()> {
        let elevator = &mut self.elevators[index];
        let generation = elevator.apply(&transition)?;
        clock.schedule_in(
            transition.delay,
            SimEvent::ElevatorTransition {
                elevator: elevator.id(),
                state: transition.next,
                generation,
            },
        );
        Ok(())
    }

    /// Let passengers off, then on, at the elevator's current floor
    fn exchange_passengers(
        &mut self,
        clock: &mut EventQueue,
        index: usize,
        notices: &mut Vec<Notice>,
    ) -> Result<()> {
        let now = clock.now();
        let elevator = &mut self.elevators[index];
        let id = elevator.id();
        let floor_number = elevator.current_floor();

        let alighting = elevator.remove_alighting();
        let alighted = alighting.len();
        let view = elevator.snapshot();
        for passenger in alighting {
            let passenger_id = passenger.id();
            notices.push(Notice::PassengerAlighted {
                passenger: passenger_id,
                elevator: id,
                floor: floor_number,
            });
            match passenger.on_alight(&view) {
                AlightOutcome::LeftBuilding => notices.push(Notice::PassengerLeft {
                    passenger: passenger_id,
                    floor: floor_number,
                }),
                AlightOutcome::Reappears { after, passenger } => {
                    debug!(
                        "passenger {} rests {} ticks on floor {}",
                        passenger_id, after, floor_number
                    );
                    clock.schedule_in(
                        after,
                        SimEvent::PassengerArrival {
                            floor: floor_number,
                            passenger,
                        },
                    );
                }
            }
        }

        let floor = floor_number
            .checked_sub(1)
            .and_then(|i| self.floors.get_mut(i))
            .with_context(|| format!("elevator {} is on missing floor {}", id, floor_number))?;
        let candidates: Vec<PassengerId> = floor
            .waiting_passengers()
            .iter()
            .map(Passenger::id)
            .collect();

        let mut boarded = 0;
        for candidate in candidates {
            if !elevator.has_room() {
                break;
            }
            let Some(passenger) = floor.waiting_passenger(candidate) else {
                continue;
            };
            let wanted = Direction::between(floor_number, passenger.destination());
            let direction = elevator.direction();
            if direction != Direction::NotMoving && wanted != direction {
                continue;
            }
            if !passenger.will_board(&elevator.snapshot()) {
                debug!("{} refuses elevator {}", passenger, id);
                continue;
            }
            if direction == Direction::NotMoving {
                elevator.set_direction(wanted);
            }
            if let Some(passenger) = floor.remove_waiting_passenger(candidate) {
                let waited: Tick = now.saturating_sub(passenger.waiting_since());
                notices.push(Notice::PassengerBoarded {
                    passenger: candidate,
                    elevator: id,
                    floor: floor_number,
                    waited,
                });
                elevator.add_passenger(passenger)?;
                boarded += 1;
            }
        }

        elevator.record_exchange(alighted + boarded);
        notices.push(Notice::DoorsOpened {
            elevator: id,
            floor: floor_number,
            alighted,
            boarded,
        });
        Ok(())
    }

    /// Read-only view for rendering
    pub fn snapshot(&self, time: Tick) -> BuildingSnapshot {
        let floors = self
            .floors
            .iter()
            .rev()
            .map(|floor| FloorSnapshot {
                number: floor.number(),
                elevators: self
                    .elevators
                    .iter()
                    .filter(|elevator| elevator.current_floor() == floor.number())
                    .map(Elevator::id)
                    .collect(),
                waiting_destinations: floor
                    .waiting_passengers()
                    .iter()
                    .map(Passenger::destination)
                    .collect(),
                up_pressed: floor.direction_is_pressed(Direction::Up),
                down_pressed: floor.direction_is_pressed(Direction::Down),
            })
            .collect();

        BuildingSnapshot {
            time,
            floors,
            elevators: self.elevators.iter().map(Elevator::snapshot).collect(),
            waiting_floors: self.waiting_floors.iter().copied().collect(),
        }
    }
}
