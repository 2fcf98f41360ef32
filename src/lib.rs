//! Elevator Simulation Library
//!
//! A discrete-event simulation of elevators serving passengers in a building.

pub mod simulation;
