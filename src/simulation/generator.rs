//! Passenger sources feeding arrivals into the simulation

use anyhow::Result;
use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::passenger::PassengerKind;
use super::types::{FloorNumber, Tick, LOBBY_FLOOR};

/// Resting time range for workers between floors
pub const WORKER_REST_TICKS: std::ops::RangeInclusive<Tick> = 20..=120;

/// Most floors a worker visits before heading home
pub const WORKER_MAX_STOPS: usize = 3;

/// A passenger about to appear, and when to ask for the one after it
#[derive(Debug, Clone)]
pub struct Arrival {
    pub floor: FloorNumber,
    pub kind: PassengerKind,
    /// Ticks until the next arrival
    pub next_in: Tick,
}

/// Something that produces passengers over time
pub trait PassengerSource {
    /// The passenger appearing now, or `None` once the source is exhausted
    fn next_arrival(&mut self, now: Tick, floor_count: usize) -> Result<Option<Arrival>>;
}

/// Random simple passengers, plus workers starting from the lobby
pub struct RandomPassengerSource {
    rng: StdRng,
    worker_ratio: f64,
    max_gap: Tick,
    remaining: Option<usize>,
}

impl RandomPassengerSource {
    /// A seeded source replays the same passengers every run. Without a
    /// seed one is drawn and logged so the run can be repeated.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        info!("Passenger seed: {}", seed);
        Self {
            rng: StdRng::seed_from_u64(seed),
            worker_ratio: 0.2,
            max_gap: 10,
            remaining: None,
        }
    }

    /// Fraction of arrivals that are workers, clamped to `0.0..=1.0`.
    /// NaN means no workers.
    pub fn with_worker_ratio(mut self, ratio: f64) -> Self {
        self.worker_ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
        self
    }

    /// Longest gap between two arrivals; gaps are drawn from `1..=max_gap`
    pub fn with_max_gap(mut self, max_gap: Tick) -> Self {
        self.max_gap = max_gap.max(1);
        self
    }

    /// Stop after this many passengers
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.remaining = Some(limit);
        self
    }

    fn pick_floor_except(
        &mut self,
        floors: &[FloorNumber],
        except: FloorNumber,
    ) -> Option<FloorNumber> {
        let candidates: Vec<FloorNumber> =
            floors.iter().copied().filter(|f| *f != except).collect();
        candidates.choose(&mut self.rng).copied()
    }

    fn simple(&mut self, floor_count: usize) -> Option<(FloorNumber, PassengerKind)> {
        let all: Vec<FloorNumber> = (LOBBY_FLOOR..=floor_count).collect();
        let floor = self.rng.random_range(LOBBY_FLOOR..=floor_count);
        self.pick_floor_except(&all, floor)
            .map(|destination| (floor, PassengerKind::simple(destination)))
    }

    fn worker(&mut self, floor_count: usize) -> Result<Option<(FloorNumber, PassengerKind)>> {
        let upper: Vec<FloorNumber> = (LOBBY_FLOOR + 1..=floor_count).collect();
        let stops = self.rng.random_range(1..=WORKER_MAX_STOPS);

        let mut destinations = Vec::with_capacity(stops + 1);
        let mut previous = LOBBY_FLOOR;
        for _ in 0..stops {
            match self.pick_floor_except(&upper, previous) {
                Some(floor) => {
                    destinations.push(floor);
                    previous = floor;
                }
                None => break,
            }
        }
        if destinations.is_empty() {
            return Ok(None);
        }
        let durations = destinations
            .iter()
            .map(|_| self.rng.random_range(WORKER_REST_TICKS))
            .collect();
        destinations.push(LOBBY_FLOOR);

        Ok(Some((LOBBY_FLOOR, PassengerKind::worker(destinations, durations)?)))
    }
}

impl PassengerSource for RandomPassengerSource {
    fn next_arrival(&mut self, _now: Tick, floor_count: usize) -> Result<Option<Arrival>> {
        if floor_count < 2 || self.remaining == Some(0) {
            return Ok(None);
        }

        let spawned = if self.rng.random_bool(self.worker_ratio) {
            self.worker(floor_count)?
        } else {
            self.simple(floor_count)
        };
        let Some((floor, kind)) = spawned else {
            return Ok(None);
        };

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        let next_in = self.rng.random_range(1..=self.max_gap);
        Ok(Some(Arrival {
            floor,
            kind,
            next_in,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::passenger::{Passenger, PassengerKind};
    use crate::simulation::types::PassengerId;

    #[test]
    fn test_same_seed_same_arrivals() {
        let mut a = RandomPassengerSource::new(Some(9)).with_worker_ratio(0.5);
        let mut b = RandomPassengerSource::new(Some(9)).with_worker_ratio(0.5);
        for _ in 0..50 {
            let left = a.next_arrival(0, 8).unwrap().unwrap();
            let right = b.next_arrival(0, 8).unwrap().unwrap();
            assert_eq!(left.floor, right.floor);
            assert_eq!(left.kind, right.kind);
            assert_eq!(left.next_in, right.next_in);
        }
    }

    #[test]
    fn test_arrivals_are_valid() {
        let mut source = RandomPassengerSource::new(Some(3))
            .with_worker_ratio(0.5)
            .with_max_gap(4);
        for _ in 0..200 {
            let arrival = source.next_arrival(0, 6).unwrap().unwrap();
            assert!((1..=4).contains(&arrival.next_in));
            let passenger = Passenger::new(PassengerId(0), arrival.kind.clone());
            assert_ne!(passenger.destination(), arrival.floor);
            assert!(passenger.destinations().iter().all(|f| (1..=6).contains(f)));
            if let PassengerKind::Worker(_) = arrival.kind {
                assert_eq!(arrival.floor, LOBBY_FLOOR);
                assert_eq!(passenger.destinations().last(), Some(&LOBBY_FLOOR));
            }
        }
    }

    #[test]
    fn test_limit_and_tiny_buildings_stop_the_source() {
        let mut source = RandomPassengerSource::new(Some(1)).with_limit(2);
        assert!(source.next_arrival(0, 5).unwrap().is_some());
        assert!(source.next_arrival(0, 5).unwrap().is_some());
        assert!(source.next_arrival(0, 5).unwrap().is_none());

        let mut source = RandomPassengerSource::new(Some(1));
        assert!(source.next_arrival(0, 1).unwrap().is_none());
    }

    #[test]
    fn test_odd_worker_ratios_are_tamed() {
        for ratio in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.5, 7.0] {
            let mut source = RandomPassengerSource::new(Some(2)).with_worker_ratio(ratio);
            for _ in 0..20 {
                assert!(source.next_arrival(0, 6).unwrap().is_some());
            }
        }

        let mut source = RandomPassengerSource::new(Some(2)).with_worker_ratio(f64::NAN);
        for _ in 0..20 {
            let arrival = source.next_arrival(0, 6).unwrap().unwrap();
            assert!(matches!(arrival.kind, PassengerKind::Simple { .. }));
        }
    }
}
