//! A player's board: placed plants plus the strike history against it.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;
use super::plant::Plant;

/// Plants owned by one player and every coordinate struck on their grid.
///
/// A coordinate appears in at most one of `hits` and `misses`, and never twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Board {
    /// Placed plants, in placement order.
    #[serde(default)]
    plants: Vec<Plant>,
    /// Cells of destroyed plants.
    #[serde(default)]
    hits: Vec<Coordinate>,
    /// Struck cells that covered no plant.
    #[serde(default)]
    misses: Vec<Coordinate>,
    /// Capacity at the time the board was placed.
    #[serde(default)]
    total_capacity: u32,
    /// Capacity still standing.
    #[serde(default)]
    capacity: u32,
}

impl Board {
    /// Creates a fresh board with the given plants and full capacity.
    pub(crate) fn with_plants(plants: Vec<Plant>) -> Self {
        let total: u32 = plants.iter().map(Plant::capacity).sum();
        Self {
            plants,
            hits: Vec::new(),
            misses: Vec::new(),
            total_capacity: total,
            capacity: total,
        }
    }

    /// Returns true if at least one plant has been placed.
    pub fn has_plants(&self) -> bool {
        !self.plants.is_empty()
    }

    /// Returns true if the coordinate is already in the hit or miss list.
    pub fn is_struck(&self, coord: Coordinate) -> bool {
        self.hits.contains(&coord) || self.misses.contains(&coord)
    }

    /// Returns the plant covering the coordinate, if any.
    pub fn plant_at(&self, coord: Coordinate) -> Option<&Plant> {
        self.plants.iter().find(|plant| plant.covers(coord))
    }

    /// Marks every cell of the plant covering `coord` as hit and removes its capacity.
    ///
    /// Returns the capacity destroyed, or `None` if nothing covers `coord`.
    pub(crate) fn destroy_plant_at(&mut self, coord: Coordinate) -> Option<u32> {
        let plant = self.plant_at(coord)?.clone();
        for cell in plant.coordinates() {
            if !self.hits.contains(cell) {
                self.hits.push(*cell);
            }
        }
        self.capacity = self.capacity.saturating_sub(plant.capacity());
        Some(plant.capacity())
    }

    /// Records a strike that covered no plant.
    pub(crate) fn record_miss(&mut self, coord: Coordinate) {
        self.misses.push(coord);
    }

    /// Copy exposing only strike history and capacity totals.
    pub(crate) fn without_plants(&self) -> Self {
        Self {
            plants: Vec::new(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            total_capacity: self.total_capacity,
            capacity: self.capacity,
        }
    }
}
