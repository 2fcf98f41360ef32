//! Core types for the elevator simulation
//!
//! Identifiers, directions, elevator states and the timing constants that
//! drive the state machine.

use std::fmt;

/// One unit of the virtual simulation clock
pub type Tick = u64;

/// A floor number. Floors are numbered from 1 (the lobby) upwards.
pub type FloorNumber = usize;

/// The ground floor, where workers enter and leave the building
pub const LOBBY_FLOOR: FloorNumber = 1;

/// Default number of passengers an elevator can carry
pub const DEFAULT_CAPACITY: usize = 10;

/// Ticks spent accelerating before the first floor of travel
pub const ACCELERATION_TICKS: Tick = 3;

/// Ticks needed to travel one floor
pub const FLOOR_TRAVEL_TICKS: Tick = 2;

/// Ticks spent decelerating before the doors start opening
pub const DECELERATION_TICKS: Tick = 3;

/// Ticks the doors take to open or to close
pub const DOOR_OPERATION_TICKS: Tick = 2;

/// Minimum ticks the doors stay open; loading adds half a tick per passenger
pub const DOORS_OPEN_BASE_TICKS: Tick = 1;

/// Workers refuse elevators carrying more passengers than this
pub const WORKER_MAX_COMPANIONS: usize = 3;

/// A wrapper type for elevator IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElevatorId(pub usize);

/// A wrapper type for passenger IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassengerId(pub usize);

impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of travel of an elevator, or the direction a passenger wants to go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    NotMoving,
    Up,
    Down,
}

impl Direction {
    /// Direction needed to get from `from` to `to`
    pub fn between(from: FloorNumber, to: FloorNumber) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::NotMoving,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::NotMoving => Direction::NotMoving,
        }
    }

    /// The floor one step away in this direction, if there is one
    pub fn step(self, floor: FloorNumber) -> Option<FloorNumber> {
        match self {
            Direction::Up => floor.checked_add(1),
            Direction::Down => floor.checked_sub(1).filter(|f| *f >= LOBBY_FLOOR),
            Direction::NotMoving => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::NotMoving => "NOT_MOVING",
            Direction::Up => "MOVING_UP",
            Direction::Down => "MOVING_DOWN",
        };
        f.write_str(name)
    }
}

/// States of the elevator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElevatorState {
    Idle,
    DoorsOpening,
    DoorsOpen,
    DoorsClosing,
    Accelerating,
    Moving,
    Decelerating,
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElevatorState::Idle => "IDLE",
            ElevatorState::DoorsOpening => "DOORS_OPENING",
            ElevatorState::DoorsOpen => "DOORS_OPEN",
            ElevatorState::DoorsClosing => "DOORS_CLOSING",
            ElevatorState::Accelerating => "ACCELERATING",
            ElevatorState::Moving => "MOVING",
            ElevatorState::Decelerating => "DECELERATING",
        };
        f.write_str(name)
    }
}
