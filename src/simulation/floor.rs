//! Floors of the building and their call buttons

use anyhow::{bail, Result};

use super::notice::Notice;
use super::passenger::Passenger;
use super::types::{Direction, FloorNumber, PassengerId};

/// A floor with its waiting passengers and up/down call buttons
///
/// A button stays pressed exactly as long as some waiting passenger wants to
/// travel in its direction.
#[derive(Debug, Clone)]
pub struct Floor {
    number: FloorNumber,
    up_pressed: bool,
    down_pressed: bool,
    /// Waiting passengers in arrival order
    waiting: Vec<Passenger>,
}

impl Floor {
    pub fn new(number: FloorNumber) -> Self {
        Self {
            number,
            up_pressed: false,
            down_pressed: false,
            waiting: Vec::new(),
        }
    }

    pub fn number(&self) -> FloorNumber {
        self.number
    }

    pub fn direction_is_pressed(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up_pressed,
            Direction::Down => self.down_pressed,
            Direction::NotMoving => false,
        }
    }

    /// Directions whose button is currently pressed
    pub fn pressed_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        [Direction::Up, Direction::Down]
            .into_iter()
            .filter(|direction| self.direction_is_pressed(*direction))
    }

    /// Press a call button, announcing the call
    pub fn press_button(&mut self, direction: Direction) -> Option<Notice> {
        match direction {
            Direction::Up => self.up_pressed = true,
            Direction::Down => self.down_pressed = true,
            Direction::NotMoving => return None,
        }
        Some(Notice::FloorCallRaised {
            floor: self.number,
            direction,
        })
    }

    pub fn clear_direction(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.up_pressed = false,
            Direction::Down => self.down_pressed = false,
            Direction::NotMoving => {}
        }
    }

    pub fn waiting_passengers(&self) -> &[Passenger] {
        &self.waiting
    }

    pub fn waiting_passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.waiting.iter().find(|passenger| passenger.id() == id)
    }

    /// Whether anyone waiting here wants to travel in `direction`
    pub fn has_waiting(&self, direction: Direction) -> bool {
        self.waiting
            .iter()
            .any(|passenger| Direction::between(self.number, passenger.destination()) == direction)
    }

    /// Start a passenger waiting here. Presses the button for the
    /// passenger's direction unless someone already did.
    pub fn add_waiting_passenger(&mut self, passenger: Passenger) -> Result<Option<Notice>> {
        let direction = Direction::between(self.number, passenger.destination());
        if direction == Direction::NotMoving {
            bail!(
                "passenger {} is already on its destination floor {}",
                passenger.id(),
                self.number
            );
        }
        self.waiting.push(passenger);
        if self.direction_is_pressed(direction) {
            Ok(None)
        } else {
            Ok(self.press_button(direction))
        }
    }

    /// Take a passenger off the waiting list, releasing any button nobody
    /// else needs
    pub fn remove_waiting_passenger(&mut self, id: PassengerId) -> Option<Passenger> {
        let index = self.waiting.iter().position(|passenger| passenger.id() == id)?;
        let passenger = self.waiting.remove(index);
        self.refresh_buttons();
        Some(passenger)
    }

    fn refresh_buttons(&mut self) {
        for direction in [Direction::Up, Direction::Down] {
            if !self.has_waiting(direction) {
                self.clear_direction(direction);
            }
        }
    }
}
