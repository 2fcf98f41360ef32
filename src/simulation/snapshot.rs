//! Read-only views of the building for rendering and comparison

use std::fmt;

use super::types::{Direction, ElevatorId, ElevatorState, FloorNumber, Tick};

/// State of one elevator at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorSnapshot {
    pub id: ElevatorId,
    pub floor: FloorNumber,
    pub state: ElevatorState,
    pub direction: Direction,
    /// Destinations of the passengers on board, in boarding order
    pub passenger_destinations: Vec<FloorNumber>,
    pub capacity: usize,
}

impl ElevatorSnapshot {
    pub fn passenger_count(&self) -> usize {
        self.passenger_destinations.len()
    }
}

impl fmt::Display for ElevatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destinations: Vec<String> = self
            .passenger_destinations
            .iter()
            .map(|floor| floor.to_string())
            .collect();
        write!(
            f,
            "Elevator {} - {} - {} - {} - [{}]",
            self.id,
            self.floor,
            self.state,
            self.direction,
            destinations.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorSnapshot {
    pub number: FloorNumber,
    /// Elevators currently on this floor
    pub elevators: Vec<ElevatorId>,
    /// Destinations of the passengers waiting here, in arrival order
    pub waiting_destinations: Vec<FloorNumber>,
    pub up_pressed: bool,
    pub down_pressed: bool,
}

/// The whole building at one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingSnapshot {
    pub time: Tick,
    /// Top floor first
    pub floors: Vec<FloorSnapshot>,
    pub elevators: Vec<ElevatorSnapshot>,
    /// Floors waiting for an elevator, oldest first
    pub waiting_floors: Vec<FloorNumber>,
}

impl fmt::Display for BuildingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for floor in &self.floors {
            write!(f, "{:>3}:  |", floor.number)?;
            for elevator in &self.elevators {
                if elevator.floor == floor.number {
                    f.write_str(" X |")?;
                } else {
                    f.write_str("   |")?;
                }
            }
            f.write_str(" ")?;
            for destination in &floor.waiting_destinations {
                write!(f, " {}", destination)?;
            }
            writeln!(f)?;
        }
        for elevator in &self.elevators {
            writeln!(f, "{}", elevator)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let snapshot = BuildingSnapshot {
            time: 12,
            floors: vec![
                FloorSnapshot {
                    number: 2,
                    elevators: vec![],
                    waiting_destinations: vec![1, 1],
                    up_pressed: false,
                    down_pressed: true,
                },
                FloorSnapshot {
                    number: 1,
                    elevators: vec![ElevatorId(1)],
                    waiting_destinations: vec![],
                    up_pressed: false,
                    down_pressed: false,
                },
            ],
            elevators: vec![ElevatorSnapshot {
                id: ElevatorId(1),
                floor: 1,
                state: ElevatorState::DoorsOpen,
                direction: Direction::Up,
                passenger_destinations: vec![2, 5],
                capacity: 10,
            }],
            waiting_floors: vec![2],
        };

        let expected = concat!(
            "  2:  |   |  1 1\n",
            "  1:  | X | \n",
            "Elevator 1 - 1 - DOORS_OPEN - MOVING_UP - [2, 5]\n",
        );
        assert_eq!(snapshot.to_string(), expected);
    }
}
