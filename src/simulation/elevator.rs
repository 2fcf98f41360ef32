//! Elevator car and its state machine
//!
//! A state runs when its transition event fires. [`Elevator::enter`] applies
//! the effects that belong to the elevator alone, the building applies the
//! ones that touch a floor, and then [`Elevator::plan`] decides the next
//! state and how long to dwell before it runs. `plan` only reads, so the
//! decision logic can be exercised without a clock.

use anyhow::{bail, Context, Result};

use super::floor::Floor;
use super::passenger::Passenger;
use super::snapshot::ElevatorSnapshot;
use super::types::{
    Direction, ElevatorId, ElevatorState, FloorNumber, Tick, ACCELERATION_TICKS,
    DECELERATION_TICKS, DOORS_OPEN_BASE_TICKS, DOOR_OPERATION_TICKS, FLOOR_TRAVEL_TICKS,
    LOBBY_FLOOR,
};

/// Floors someone on board wants to get off at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedFloors {
    /// Indexed by floor number; slot 0 is never used
    flags: Vec<bool>,
}

impl RequestedFloors {
    pub fn new(floor_count: usize) -> Self {
        Self {
            flags: vec![false; floor_count + 1],
        }
    }

    pub fn is_requested(&self, floor: FloorNumber) -> bool {
        self.flags.get(floor).copied().unwrap_or(false)
    }

    /// Whether any floor strictly past `floor` in `direction` is requested
    pub fn any_beyond(&self, floor: FloorNumber, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.flags.iter().skip(floor + 1).any(|flag| *flag),
            Direction::Down => self.flags.iter().take(floor).any(|flag| *flag),
            Direction::NotMoving => false,
        }
    }

    pub fn floors(&self) -> impl Iterator<Item = FloorNumber> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .map(|(floor, _)| floor)
    }

    fn request(&mut self, floor: FloorNumber) {
        if let Some(flag) = self.flags.get_mut(floor) {
            *flag = true;
        }
    }

    fn clear(&mut self, floor: FloorNumber) {
        if let Some(flag) = self.flags.get_mut(floor) {
            *flag = false;
        }
    }
}

/// The next state an elevator will run, after how long, and in which direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ElevatorState,
    pub delay: Tick,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct Elevator {
    id: ElevatorId,
    state: ElevatorState,
    direction: Direction,
    floor: FloorNumber,
    floor_count: usize,
    capacity: usize,
    /// Boarding order
    passengers: Vec<Passenger>,
    requested: RequestedFloors,
    /// Floor the building sent us to, until we stop there
    target: Option<FloorNumber>,
    /// State whose event is on the clock, if any
    pending: Option<ElevatorState>,
    generation: u64,
    /// Passengers that boarded or alighted at the last door opening
    last_exchange: usize,
}

impl Elevator {
    pub fn new(
        id: ElevatorId,
        start_floor: FloorNumber,
        floor_count: usize,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            state: ElevatorState::Idle,
            direction: Direction::NotMoving,
            floor: start_floor,
            floor_count,
            capacity,
            passengers: Vec::new(),
            requested: RequestedFloors::new(floor_count),
            target: None,
            pending: None,
            generation: 0,
            last_exchange: 0,
        }
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn state(&self) -> ElevatorState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current_floor(&self) -> FloorNumber {
        self.floor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn has_room(&self) -> bool {
        self.passengers.len() < self.capacity
    }

    pub fn requested_floors(&self) -> &RequestedFloors {
        &self.requested
    }

    pub fn target(&self) -> Option<FloorNumber> {
        self.target
    }

    pub fn pending(&self) -> Option<ElevatorState> {
        self.pending
    }

    /// Idle and not already sent somewhere
    pub fn is_idle(&self) -> bool {
        self.state == ElevatorState::Idle && self.pending.is_none()
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id: self.id,
            floor: self.floor,
            state: self.state,
            direction: self.direction,
            passenger_destinations: self.passengers.iter().map(Passenger::destination).collect(),
            capacity: self.capacity,
        }
    }

    /// Take a passenger on board and request its destination
    pub fn add_passenger(&mut self, passenger: Passenger) -> Result<()> {
        if !self.has_room() {
            bail!(
                "elevator {} is full ({} passengers), cannot take passenger {}",
                self.id,
                self.capacity,
                passenger.id()
            );
        }
        let destination = passenger.destination();
        if !(LOBBY_FLOOR..=self.floor_count).contains(&destination) {
            bail!(
                "passenger {} wants floor {}, which does not exist",
                passenger.id(),
                destination
            );
        }
        self.requested.request(destination);
        self.passengers.push(passenger);
        Ok(())
    }

    /// Remove everyone whose destination is the current floor
    pub fn remove_alighting(&mut self) -> Vec<Passenger> {
        let floor = self.floor;
        let (leaving, staying): (Vec<_>, Vec<_>) = std::mem::take(&mut self.passengers)
            .into_iter()
            .partition(|passenger| passenger.destination() == floor);
        self.passengers = staying;
        self.requested.clear(floor);
        leaving
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub(crate) fn record_exchange(&mut self, count: usize) {
        self.last_exchange = count;
    }

    /// Send an idle elevator to `floor`.
    ///
    /// On the current floor the direction is left alone and the door cycle
    /// starts right away; otherwise the elevator heads towards the floor.
    pub fn dispatch_to(&mut self, floor: FloorNumber) -> Result<Transition> {
        if !self.is_idle() {
            bail!(
                "elevator {} cannot be dispatched while {} (pending {:?})",
                self.id,
                self.state,
                self.pending
            );
        }
        if !(LOBBY_FLOOR..=self.floor_count).contains(&floor) {
            bail!("elevator {} dispatched to missing floor {}", self.id, floor);
        }

        if floor == self.floor {
            return Ok(Transition {
                next: ElevatorState::DoorsOpening,
                delay: 0,
                direction: self.direction,
            });
        }
        self.target = Some(floor);
        Ok(Transition {
            next: ElevatorState::Accelerating,
            delay: 0,
            direction: Direction::between(self.floor, floor),
        })
    }

    /// Record that `transition` is on the clock. Returns the generation
    /// stamp its event has to carry.
    pub fn apply(&mut self, transition: &Transition) -> Result<u64> {
        if let Some(pending) = self.pending {
            bail!(
                "elevator {} already has a pending transition to {}",
                self.id,
                pending
            );
        }
        self.direction = transition.direction;
        self.pending = Some(transition.next);
        self.generation += 1;
        Ok(self.generation)
    }

    /// Run a fired transition and apply the entered state's own effects
    pub fn enter(&mut self, state: ElevatorState, generation: u64) -> Result<()> {
        match self.pending {
            Some(pending) if pending == state && generation == self.generation => {}
            _ => bail!(
                "stale transition to {} for elevator {} \
                 (generation {}, expected {:?} at generation {})",
                state,
                self.id,
                generation,
                self.pending,
                self.generation
            ),
        }
        self.pending = None;
        self.state = state;

        match state {
            ElevatorState::Moving => {
                let floor_count = self.floor_count;
                self.floor = self
                    .direction
                    .step(self.floor)
                    .filter(|floor| *floor <= floor_count)
                    .with_context(|| {
                        format!(
                            "elevator {} cannot move {} from floor {}",
                            self.id, self.direction, self.floor
                        )
                    })?;
            }
            ElevatorState::Decelerating => {
                if self.target == Some(self.floor) {
                    self.target = None;
                }
            }
            ElevatorState::Idle => {
                self.direction = Direction::NotMoving;
                self.target = None;
            }
            _ => {}
        }
        Ok(())
    }

    /// Decide what follows the current state. `here` is the floor the
    /// elevator is on. Returns `None` while idle.
    pub fn plan(&self, here: &Floor) -> Option<Transition> {
        let keep = |next, delay| Transition {
            next,
            delay,
            direction: self.direction,
        };
        let transition = match self.state {
            ElevatorState::Idle => return None,
            ElevatorState::Accelerating => keep(ElevatorState::Moving, ACCELERATION_TICKS),
            ElevatorState::Moving => {
                let next = if self.should_stop(here) {
                    ElevatorState::Decelerating
                } else {
                    ElevatorState::Moving
                };
                keep(next, FLOOR_TRAVEL_TICKS)
            }
            ElevatorState::Decelerating => Transition {
                next: ElevatorState::DoorsOpening,
                delay: DECELERATION_TICKS,
                direction: self.direction_after_arrival(here),
            },
            ElevatorState::DoorsOpening => keep(ElevatorState::DoorsOpen, DOOR_OPERATION_TICKS),
            ElevatorState::DoorsOpen => keep(
                ElevatorState::DoorsClosing,
                DOORS_OPEN_BASE_TICKS + self.last_exchange as Tick / 2,
            ),
            ElevatorState::DoorsClosing => self.plan_departure(here),
        };
        Some(transition)
    }

    /// Requests from passengers or the dispatcher strictly past the current
    /// floor in `direction`
    fn has_work_beyond(&self, direction: Direction) -> bool {
        if direction == Direction::NotMoving {
            return false;
        }
        let target_ahead = self
            .target
            .is_some_and(|target| Direction::between(self.floor, target) == direction);
        target_ahead || self.requested.any_beyond(self.floor, direction)
    }

    fn should_stop(&self, here: &Floor) -> bool {
        self.must_stop_here() || here.direction_is_pressed(self.direction)
    }

    /// Whether the elevator has to stop on its current floor whatever the
    /// call buttons there say
    pub fn must_stop_here(&self) -> bool {
        let at_edge = self
            .direction
            .step(self.floor)
            .map_or(true, |next| next > self.floor_count);
        at_edge
            || self.requested.is_requested(self.floor)
            || self.target == Some(self.floor)
            || !self.has_work_beyond(self.direction)
    }

    /// Keep going if there is more to do ahead, turn around if the work is
    /// behind, otherwise stop
    fn direction_after_arrival(&self, here: &Floor) -> Direction {
        let preferred = match self.direction {
            Direction::NotMoving => Direction::Up,
            direction => direction,
        };
        [preferred, preferred.opposite()]
            .into_iter()
            .find(|direction| {
                self.has_work_beyond(*direction) || here.direction_is_pressed(*direction)
            })
            .unwrap_or(Direction::NotMoving)
    }

    fn plan_departure(&self, here: &Floor) -> Transition {
        let direction = self.direction;
        if direction == Direction::NotMoving {
            return match [Direction::Up, Direction::Down]
                .into_iter()
                .find(|direction| self.has_work_beyond(*direction))
            {
                Some(direction) => Transition {
                    next: ElevatorState::Accelerating,
                    delay: DOOR_OPERATION_TICKS,
                    direction,
                },
                None => Transition {
                    next: ElevatorState::Idle,
                    delay: DOOR_OPERATION_TICKS,
                    direction: Direction::NotMoving,
                },
            };
        }

        if self.has_work_beyond(direction) {
            return Transition {
                next: ElevatorState::Accelerating,
                delay: DOOR_OPERATION_TICKS,
                direction,
            };
        }
        let reverse = direction.opposite();
        if self.has_work_beyond(reverse) || here.direction_is_pressed(reverse) {
            return Transition {
                next: ElevatorState::DoorsOpening,
                delay: DOOR_OPERATION_TICKS,
                direction: reverse,
            };
        }
        Transition {
            next: ElevatorState::Idle,
            delay: DOOR_OPERATION_TICKS,
            direction: Direction::NotMoving,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::passenger::PassengerKind;
    use crate::simulation::types::PassengerId;

    fn rider(id: usize, destination: FloorNumber) -> Passenger {
        Passenger::new(PassengerId(id), PassengerKind::simple(destination))
    }

    /// Walk an elevator through a transition as the building would
    fn run(elevator: &mut Elevator, transition: Transition) {
        let generation = elevator.apply(&transition).unwrap();
        elevator.enter(transition.next, generation).unwrap();
    }

    fn moving_elevator(floor: FloorNumber, direction: Direction) -> Elevator {
        let mut elevator = Elevator::new(ElevatorId(1), floor, 10, 10);
        elevator.state = ElevatorState::Moving;
        elevator.direction = direction;
        elevator
    }

    #[test]
    fn test_dispatch_sets_direction_towards_floor() {
        let mut elevator = Elevator::new(ElevatorId(1), 1, 5, 10);
        let transition = elevator.dispatch_to(4).unwrap();
        assert_eq!(transition.next, ElevatorState::Accelerating);
        assert_eq!(transition.delay, 0);
        assert_eq!(transition.direction, Direction::Up);
        assert_eq!(elevator.target(), Some(4));
    }

    #[test]
    fn test_dispatch_to_current_floor_opens_doors() {
        let mut elevator = Elevator::new(ElevatorId(1), 3, 5, 10);
        let transition = elevator.dispatch_to(3).unwrap();
        assert_eq!(transition.next, ElevatorState::DoorsOpening);
        assert_eq!(transition.direction, Direction::NotMoving);
        assert_eq!(elevator.target(), None);
    }

    #[test]
    fn test_dispatch_requires_idle() {
        let mut elevator = Elevator::new(ElevatorId(1), 1, 5, 10);
        let transition = elevator.dispatch_to(4).unwrap();
        elevator.apply(&transition).unwrap();
        assert!(!elevator.is_idle());
        assert!(elevator.dispatch_to(2).is_err());
        assert!(elevator.dispatch_to(6).is_err());
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut elevator = Elevator::new(ElevatorId(1), 1, 5, 10);
        let transition = elevator.dispatch_to(4).unwrap();
        let generation = elevator.apply(&transition).unwrap();
        assert!(elevator.enter(ElevatorState::Accelerating, generation + 1).is_err());
        assert!(elevator.enter(ElevatorState::Moving, generation).is_err());
        assert!(elevator.enter(ElevatorState::Accelerating, generation).is_ok());
    }

    #[test]
    fn test_moving_advances_one_floor() {
        let mut elevator = Elevator::new(ElevatorId(1), 1, 5, 10);
        let transition = elevator.dispatch_to(4).unwrap();
        run(&mut elevator, transition);
        let transition = elevator.plan(&Floor::new(1)).unwrap();
        assert_eq!(transition.next, ElevatorState::Moving);
        run(&mut elevator, transition);
        assert_eq!(elevator.current_floor(), 2);
        assert_eq!(elevator.plan(&Floor::new(2)).unwrap().next, ElevatorState::Moving);
    }

    #[test]
    fn test_stops_for_call_in_travel_direction() {
        let mut elevator = moving_elevator(3, Direction::Up);
        elevator.add_passenger(rider(1, 8)).unwrap();

        let mut floor = Floor::new(3);
        assert_eq!(elevator.plan(&floor).unwrap().next, ElevatorState::Moving);

        floor.press_button(Direction::Down);
        assert_eq!(elevator.plan(&floor).unwrap().next, ElevatorState::Moving);

        floor.press_button(Direction::Up);
        assert_eq!(elevator.plan(&floor).unwrap().next, ElevatorState::Decelerating);
    }

    #[test]
    fn test_stops_at_requested_floor() {
        let mut elevator = moving_elevator(5, Direction::Down);
        elevator.add_passenger(rider(1, 5)).unwrap();
        elevator.add_passenger(rider(2, 2)).unwrap();
        assert_eq!(
            elevator.plan(&Floor::new(5)).unwrap().next,
            ElevatorState::Decelerating
        );
    }

    #[test]
    fn test_reverses_at_floor_with_opposite_call() {
        let mut elevator = moving_elevator(5, Direction::Up);
        elevator.state = ElevatorState::Decelerating;
        let mut floor = Floor::new(5);
        floor.press_button(Direction::Down);

        let transition = elevator.plan(&floor).unwrap();
        assert_eq!(transition.next, ElevatorState::DoorsOpening);
        assert_eq!(transition.direction, Direction::Down);
    }

    #[test]
    fn test_keeps_direction_with_work_ahead() {
        let mut elevator = moving_elevator(5, Direction::Up);
        elevator.state = ElevatorState::Decelerating;
        elevator.add_passenger(rider(1, 9)).unwrap();
        let mut floor = Floor::new(5);
        floor.press_button(Direction::Down);

        assert_eq!(elevator.plan(&floor).unwrap().direction, Direction::Up);
    }

    #[test]
    fn test_stops_moving_without_any_work() {
        let mut elevator = moving_elevator(5, Direction::Up);
        elevator.state = ElevatorState::Decelerating;
        assert_eq!(
            elevator.plan(&Floor::new(5)).unwrap().direction,
            Direction::NotMoving
        );
    }

    #[test]
    fn test_alighting_clears_request_once() {
        let mut elevator = moving_elevator(4, Direction::Up);
        elevator.add_passenger(rider(1, 4)).unwrap();
        elevator.add_passenger(rider(2, 7)).unwrap();

        let leaving = elevator.remove_alighting();
        assert_eq!(leaving.len(), 1);
        assert!(!elevator.requested_floors().is_requested(4));
        assert!(elevator.requested_floors().is_requested(7));

        assert!(elevator.remove_alighting().is_empty());
        assert_eq!(elevator.passenger_count(), 1);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut elevator = Elevator::new(ElevatorId(1), 1, 5, 2);
        elevator.add_passenger(rider(1, 3)).unwrap();
        elevator.add_passenger(rider(2, 4)).unwrap();
        assert!(!elevator.has_room());
        assert!(elevator.add_passenger(rider(3, 5)).is_err());
        assert_eq!(elevator.passenger_count(), 2);
    }

    #[test]
    fn test_closing_doors_departure_choices() {
        let mut elevator = Elevator::new(ElevatorId(1), 3, 6, 10);
        elevator.state = ElevatorState::DoorsClosing;
        elevator.direction = Direction::Up;
        let mut floor = Floor::new(3);

        assert_eq!(elevator.plan(&floor).unwrap().next, ElevatorState::Idle);

        floor.press_button(Direction::Down);
        let transition = elevator.plan(&floor).unwrap();
        assert_eq!(transition.next, ElevatorState::DoorsOpening);
        assert_eq!(transition.direction, Direction::Down);

        elevator.add_passenger(rider(1, 6)).unwrap();
        let transition = elevator.plan(&floor).unwrap();
        assert_eq!(transition.next, ElevatorState::Accelerating);
        assert_eq!(transition.direction, Direction::Up);
    }

    #[test]
    fn test_doors_stay_open_longer_for_busy_stops() {
        let mut elevator = Elevator::new(ElevatorId(1), 1, 5, 10);
        elevator.state = ElevatorState::DoorsOpen;
        let floor = Floor::new(1);

        elevator.record_exchange(0);
        assert_eq!(elevator.plan(&floor).unwrap().delay, DOORS_OPEN_BASE_TICKS);
        elevator.record_exchange(6);
        assert_eq!(elevator.plan(&floor).unwrap().delay, DOORS_OPEN_BASE_TICKS + 3);
    }

    #[test]
    fn test_moving_past_the_building_is_rejected() {
        let mut elevator = moving_elevator(10, Direction::Up);
        let generation = elevator
            .apply(&Transition {
                next: ElevatorState::Moving,
                delay: FLOOR_TRAVEL_TICKS,
                direction: Direction::Up,
            })
            .unwrap();
        assert!(elevator.enter(ElevatorState::Moving, generation).is_err());
        assert_eq!(elevator.current_floor(), 10);

        let mut elevator = moving_elevator(1, Direction::Down);
        let generation = elevator
            .apply(&Transition {
                next: ElevatorState::Moving,
                delay: FLOOR_TRAVEL_TICKS,
                direction: Direction::Down,
            })
            .unwrap();
        assert!(elevator.enter(ElevatorState::Moving, generation).is_err());
        assert_eq!(elevator.current_floor(), 1);
    }

    #[test]
    fn test_call_alone_does_not_force_a_stop() {
        let mut elevator = moving_elevator(4, Direction::Up);
        elevator.add_passenger(rider(1, 8)).unwrap();
        assert!(!elevator.must_stop_here());

        elevator.add_passenger(rider(2, 4)).unwrap();
        assert!(elevator.must_stop_here());
    }
}
