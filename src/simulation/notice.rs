//! Typed messages exchanged between floors, elevators and the building
//!
//! Floors and elevators never call each other. They return notices, and the
//! building routes them in the order they were raised.

use super::types::{Direction, ElevatorId, FloorNumber, PassengerId, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A call button was pressed, or is still pressed after an elevator left
    FloorCallRaised {
        floor: FloorNumber,
        direction: Direction,
    },
    /// No elevator was idle; the floor waits in the building's queue
    FloorQueued { floor: FloorNumber },
    /// An idle elevator was sent to a floor
    ElevatorDispatched {
        elevator: ElevatorId,
        floor: FloorNumber,
    },
    /// An elevator stopped at a floor and is opening its doors
    ElevatorArrived {
        elevator: ElevatorId,
        floor: FloorNumber,
    },
    /// Doors finished opening and passengers were exchanged
    DoorsOpened {
        elevator: ElevatorId,
        floor: FloorNumber,
        alighted: usize,
        boarded: usize,
    },
    /// An elevator has nothing left to do
    ElevatorIdle { elevator: ElevatorId },
    PassengerArrived {
        passenger: PassengerId,
        floor: FloorNumber,
        destination: FloorNumber,
    },
    PassengerBoarded {
        passenger: PassengerId,
        elevator: ElevatorId,
        floor: FloorNumber,
        waited: Tick,
    },
    PassengerAlighted {
        passenger: PassengerId,
        elevator: ElevatorId,
        floor: FloorNumber,
    },
    /// The passenger will not come back
    PassengerLeft {
        passenger: PassengerId,
        floor: FloorNumber,
    },
}
