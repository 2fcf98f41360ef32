//! Standalone elevator simulation module
//!
//! Everything needed to run the building headless: the event clock, floors,
//! elevators, the dispatcher and the passenger generator. It can be driven
//! step by step from tests or run for a fixed number of ticks from the CLI.

mod building;
mod clock;
mod config;
mod elevator;
mod floor;
mod generator;
mod notice;
mod passenger;
mod snapshot;
mod stats;
mod types;
mod world;

// Re-export public types for external use
pub use building::Building;
pub use clock::{EventQueue, SimEvent};
pub use config::SimConfig;
pub use elevator::{Elevator, RequestedFloors, Transition};
pub use floor::Floor;
pub use generator::{
    Arrival, PassengerSource, RandomPassengerSource, WORKER_MAX_STOPS, WORKER_REST_TICKS,
};
pub use notice::Notice;
pub use passenger::{AlightOutcome, Itinerary, Passenger, PassengerKind};
pub use snapshot::{BuildingSnapshot, ElevatorSnapshot, FloorSnapshot};
pub use stats::SimStats;
pub use types::{
    Direction, ElevatorId, ElevatorState, FloorNumber, PassengerId, Tick, ACCELERATION_TICKS,
    DECELERATION_TICKS, DEFAULT_CAPACITY, DOORS_OPEN_BASE_TICKS, DOOR_OPERATION_TICKS,
    FLOOR_TRAVEL_TICKS, LOBBY_FLOOR, WORKER_MAX_COMPANIONS,
};
pub use world::{FiredEvent, SimWorld, StepReport};
