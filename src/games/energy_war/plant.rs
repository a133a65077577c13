//! Power plant types and placed plants.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::coordinate::Coordinate;

/// Kind of power plant a player can place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PlantType {
    /// 3x3 footprint, 1000 capacity.
    Nuclear,
    /// 2x2 footprint, 300 capacity.
    Gas,
    /// 2x1 footprint in either orientation, 100 capacity.
    Wind,
    /// Single cell, 25 capacity.
    Solar,
}

/// Width and height of a plant footprint, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Cells per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl Footprint {
    const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    pub fn cells(&self) -> usize {
        self.width * self.height
    }
}

impl PlantType {
    /// Generation capacity contributed by one plant of this type.
    pub fn capacity(self) -> u32 {
        match self {
            Self::Nuclear => 1000,
            Self::Gas => 300,
            Self::Wind => 100,
            Self::Solar => 25,
        }
    }

    /// Accepted footprints. The first entry is the canonical orientation.
    pub fn footprints(self) -> &'static [Footprint] {
        const NUCLEAR: [Footprint; 1] = [Footprint::new(3, 3)];
        const GAS: [Footprint; 1] = [Footprint::new(2, 2)];
        const WIND: [Footprint; 2] = [Footprint::new(2, 1), Footprint::new(1, 2)];
        const SOLAR: [Footprint; 1] = [Footprint::new(1, 1)];
        match self {
            Self::Nuclear => &NUCLEAR,
            Self::Gas => &GAS,
            Self::Wind => &WIND,
            Self::Solar => &SOLAR,
        }
    }

    /// Number of cells a plant of this type occupies.
    pub fn cell_count(self) -> usize {
        self.footprints()[0].cells()
    }

    /// Single-character map symbol.
    pub fn symbol(self) -> char {
        match self {
            Self::Nuclear => 'N',
            Self::Gas => 'G',
            Self::Wind => 'W',
            Self::Solar => 'S',
        }
    }
}

/// A validated plant on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Plant {
    /// Plant type.
    #[serde(rename = "type")]
    kind: PlantType,
    /// Cells covered by the plant, in canonical text form.
    coordinates: Vec<Coordinate>,
}

impl Plant {
    /// Capacity of this plant.
    pub fn capacity(&self) -> u32 {
        self.kind.capacity()
    }

    /// Returns true if the plant covers the coordinate.
    pub fn covers(&self, coord: Coordinate) -> bool {
        self.coordinates.contains(&coord)
    }
}

/// An unvalidated plant placement as received from a caller.
///
/// Type and coordinates are kept as raw text so that every malformed input
/// is reported by board validation with a precise error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ProposedPlant {
    /// Plant type name, e.g. `"GAS"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Coordinate texts, e.g. `["A1", "A2", "B1", "B2"]`.
    pub coordinates: Vec<String>,
}

impl ProposedPlant {
    /// Convenience constructor from string slices.
    pub fn from_strs(kind: &str, coordinates: &[&str]) -> Self {
        Self::new(
            kind.to_string(),
            coordinates.iter().map(|c| c.to_string()).collect(),
        )
    }
}
