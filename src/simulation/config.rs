//! Building configuration consumed at construction time

use anyhow::{ensure, Result};

use super::types::{FloorNumber, DEFAULT_CAPACITY, LOBBY_FLOOR};

/// Shape of the simulated building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of floors, numbered `1..=floors`
    pub floors: usize,
    /// Number of elevators, numbered `1..=elevators`
    pub elevators: usize,
    /// Passengers each elevator can carry
    pub capacity: usize,
    /// Floor every elevator starts on
    pub start_floor: FloorNumber,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            floors: 10,
            elevators: 2,
            capacity: DEFAULT_CAPACITY,
            start_floor: LOBBY_FLOOR,
        }
    }
}

impl SimConfig {
    pub fn new(floors: usize, elevators: usize) -> Self {
        Self {
            floors,
            elevators,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_start_floor(mut self, start_floor: FloorNumber) -> Self {
        self.start_floor = start_floor;
        self
    }

    /// Check that the configuration describes a building that can exist
    pub fn validate(&self) -> Result<()> {
        ensure!(self.floors > 0, "a building needs at least one floor");
        ensure!(self.elevators > 0, "a building needs at least one elevator");
        ensure!(self.capacity > 0, "elevator capacity must be positive");
        ensure!(
            (LOBBY_FLOOR..=self.floors).contains(&self.start_floor),
            "start floor {} is outside floors {}..={}",
            self.start_floor,
            LOBBY_FLOOR,
            self.floors
        );
        Ok(())
    }
}
