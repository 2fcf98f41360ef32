//! Running totals folded from the notice stream

use super::notice::Notice;
use super::types::Tick;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    /// New passengers introduced into the building
    pub passengers_spawned: usize,
    /// Times anyone started waiting on a floor, returning workers included
    pub arrivals: usize,
    pub boardings: usize,
    pub alightings: usize,
    /// Passengers gone for good
    pub departures: usize,
    pub dispatches: usize,
    pub queued_calls: usize,
    pub door_cycles: usize,
    pub total_wait: Tick,
    pub max_wait: Tick,
}

impl SimStats {
    pub fn record(&mut self, notices: &[Notice]) {
        for notice in notices {
            match notice {
                Notice::PassengerArrived { .. } => self.arrivals += 1,
                Notice::PassengerBoarded { waited, .. } => {
                    self.boardings += 1;
                    self.total_wait += waited;
                    self.max_wait = self.max_wait.max(*waited);
                }
                Notice::PassengerAlighted { .. } => self.alightings += 1,
                Notice::PassengerLeft { .. } => self.departures += 1,
                Notice::ElevatorDispatched { .. } => self.dispatches += 1,
                Notice::FloorQueued { .. } => self.queued_calls += 1,
                Notice::DoorsOpened { .. } => self.door_cycles += 1,
                Notice::FloorCallRaised { .. }
                | Notice::ElevatorArrived { .. }
                | Notice::ElevatorIdle { .. } => {}
            }
        }
    }

    /// Mean ticks spent waiting for an elevator per boarding
    pub fn average_wait(&self) -> Option<f64> {
        if self.boardings == 0 {
            None
        } else {
            Some(self.total_wait as f64 / self.boardings as f64)
        }
    }
}
