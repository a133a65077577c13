//! Board placement validation.
//!
//! Each rule is a small check that either passes or returns the error kind the
//! caller reports. [`BoardValidator::validate`] composes them in order and turns
//! a list of raw placements into a [`Board`] without touching any game state.

use std::collections::HashSet;
use std::str::FromStr;

use tracing::{debug, instrument, warn};

use super::board::Board;
use super::coordinate::Coordinate;
use super::error::{GameError, GameErrorKind};
use super::plant::{Plant, PlantType, ProposedPlant};

/// The accepted total capacity is at most this multiple of the required capacity.
pub const CAPACITY_CEILING_FACTOR: u32 = 2;

/// Inclusive `(min, max)` band of total capacity accepted for a board.
pub fn capacity_bounds(required: u32) -> (u32, u32) {
    (required, required.saturating_mul(CAPACITY_CEILING_FACTOR))
}

/// Rule: the plant type name is known.
pub struct KnownPlantType;

impl KnownPlantType {
    /// Resolves the type name.
    #[instrument]
    pub fn check(name: &str) -> Result<PlantType, GameError> {
        PlantType::from_str(name)
            .map_err(|_| GameError::new(GameErrorKind::InvalidPlantType(name.to_string())))
    }
}

/// Rule: the coordinate count matches the footprint.
pub struct CellCountMatches;

impl CellCountMatches {
    /// Compares the number of cells against the type's footprint.
    #[instrument(skip(coordinates))]
    pub fn check(kind: PlantType, coordinates: &[String]) -> Result<(), GameError> {
        let expected = kind.cell_count();
        if coordinates.len() != expected {
            return Err(GameError::new(GameErrorKind::InvalidPlantShape(format!(
                "{kind} needs {expected} coordinates, got {}",
                coordinates.len()
            ))));
        }
        Ok(())
    }
}

/// Rule: the cells form a contiguous rectangle of one of the type's footprints.
pub struct RectangularShape;

impl RectangularShape {
    /// Sorts the cells row-major and compares cell `i` against
    /// `(min_row + i / width, min_col + i % width)` for each allowed footprint.
    #[instrument(skip(cells))]
    pub fn check(kind: PlantType, cells: &[Coordinate]) -> Result<(), GameError> {
        let mut sorted = cells.to_vec();
        sorted.sort();

        let Some(&origin) = sorted.first() else {
            return Err(GameError::new(GameErrorKind::InvalidPlantShape(format!(
                "{kind} has no coordinates"
            ))));
        };

        let fits = kind.footprints().iter().any(|footprint| {
            sorted.len() == footprint.cells()
                && sorted.iter().enumerate().all(|(i, cell)| {
                    cell.row == origin.row + i / footprint.width
                        && cell.col == origin.col + i % footprint.width
                })
        });

        if !fits {
            warn!(%kind, ?sorted, "Plant cells do not match footprint");
            return Err(GameError::new(GameErrorKind::InvalidPlantShape(format!(
                "{kind} at {} is not a valid footprint",
                sorted.iter().map(Coordinate::to_string).collect::<Vec<_>>().join(",")
            ))));
        }
        Ok(())
    }
}

/// Rule: total capacity lies within [`capacity_bounds`].
pub struct CapacityInBand;

impl CapacityInBand {
    /// Checks `total` against the band derived from `required`.
    #[instrument]
    pub fn check(total: u32, required: u32) -> Result<(), GameError> {
        let (min, max) = capacity_bounds(required);
        if total < min || total > max {
            return Err(GameError::new(GameErrorKind::CapacityOutOfRange { total, min, max }));
        }
        Ok(())
    }
}

/// Validates proposed plant placements for one player.
pub struct BoardValidator;

impl BoardValidator {
    /// Checks every placement rule and returns the resulting board.
    ///
    /// The returned board has canonical coordinates and both capacity fields set
    /// to the sum of plant capacities. Nothing is committed; the caller stores it.
    ///
    /// # Errors
    ///
    /// - [`GameErrorKind::InvalidParameters`] for an empty plant list
    /// - [`GameErrorKind::InvalidPlantType`] for an unknown type name
    /// - [`GameErrorKind::InvalidPlantShape`] for a wrong cell count or shape
    /// - [`GameErrorKind::InvalidCoordinate`] for malformed or off-grid cells
    /// - [`GameErrorKind::OverlappingPlants`] when a cell is claimed twice
    /// - [`GameErrorKind::CapacityOutOfRange`] when the total is outside the band
    #[instrument(skip(proposed), fields(plants = proposed.len()))]
    pub fn validate(
        proposed: &[ProposedPlant],
        size: usize,
        required_capacity: u32,
    ) -> Result<Board, GameError> {
        if proposed.is_empty() {
            return Err(GameError::new(GameErrorKind::InvalidParameters(
                "board has no plants".to_string(),
            )));
        }

        let mut occupied: HashSet<Coordinate> = HashSet::new();
        let mut plants = Vec::with_capacity(proposed.len());

        for placement in proposed {
            let kind = KnownPlantType::check(&placement.kind)?;
            CellCountMatches::check(kind, &placement.coordinates)?;

            let mut cells = Vec::with_capacity(placement.coordinates.len());
            for text in &placement.coordinates {
                let cell = Coordinate::validate(text, size)?;
                if !occupied.insert(cell) {
                    return Err(GameError::new(GameErrorKind::OverlappingPlants(cell.to_string())));
                }
                cells.push(cell);
            }

            RectangularShape::check(kind, &cells)?;
            plants.push(Plant::new(kind, cells));
        }

        let total: u32 = plants.iter().map(Plant::capacity).sum();
        CapacityInBand::check(total, required_capacity)?;

        debug!(total, "Board validated");
        Ok(Board::with_plants(plants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar(cell: &str) -> ProposedPlant {
        ProposedPlant::from_strs("SOLAR", &[cell])
    }

    fn kind_of(result: Result<Board, GameError>) -> GameErrorKind {
        result.expect_err("validation should fail").kind
    }

    #[test]
    fn test_accepts_four_solars_at_required_capacity() {
        let board = BoardValidator::validate(
            &[solar("A1"), solar("A3"), solar("C1"), solar("E5")],
            5,
            100,
        )
        .unwrap();
        assert_eq!(*board.total_capacity(), 100);
        assert_eq!(board.plants().len(), 4);
    }

    #[test]
    fn test_rejects_empty_board() {
        assert!(matches!(
            kind_of(BoardValidator::validate(&[], 5, 100)),
            GameErrorKind::InvalidParameters(_)
        ));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let plants = [ProposedPlant::from_strs("COAL", &["A1"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&plants, 5, 25)),
            GameErrorKind::InvalidPlantType(name) if name == "COAL"
        ));
    }

    #[test]
    fn test_rejects_wrong_cell_count() {
        let plants = [ProposedPlant::from_strs("GAS", &["A1", "A2", "B1"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&plants, 5, 300)),
            GameErrorKind::InvalidPlantShape(_)
        ));
    }

    #[test]
    fn test_rejects_off_grid_cell() {
        let plants = [solar("F1")];
        assert!(matches!(
            kind_of(BoardValidator::validate(&plants, 5, 25)),
            GameErrorKind::InvalidCoordinate(_)
        ));
    }

    #[test]
    fn test_rejects_overlap_between_plants() {
        let plants = [
            ProposedPlant::from_strs("WIND", &["A1", "A2"]),
            solar("A2"),
        ];
        assert!(matches!(
            kind_of(BoardValidator::validate(&plants, 5, 100)),
            GameErrorKind::OverlappingPlants(cell) if cell == "A2"
        ));
    }

    #[test]
    fn test_rejects_repeated_cell_within_plant() {
        let plants = [ProposedPlant::from_strs("WIND", &["A1", "A1"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&plants, 5, 100)),
            GameErrorKind::OverlappingPlants(_)
        ));
    }

    #[test]
    fn test_shape_accepts_any_cell_order() {
        let plants = [ProposedPlant::from_strs("GAS", &["B2", "A1", "B1", "A2"])];
        assert!(BoardValidator::validate(&plants, 5, 300).is_ok());
    }

    #[test]
    fn test_shape_rejects_bent_and_split_plants() {
        let bent = [ProposedPlant::from_strs("GAS", &["A1", "A2", "A3", "B1"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&bent, 5, 300)),
            GameErrorKind::InvalidPlantShape(_)
        ));

        let split = [ProposedPlant::from_strs("WIND", &["A1", "A3"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&split, 5, 100)),
            GameErrorKind::InvalidPlantShape(_)
        ));

        let diagonal = [ProposedPlant::from_strs("WIND", &["A1", "B2"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&diagonal, 5, 100)),
            GameErrorKind::InvalidPlantShape(_)
        ));
    }

    #[test]
    fn test_shape_rejects_row_wrap() {
        let wrapped = [ProposedPlant::from_strs("WIND", &["A5", "B1"])];
        assert!(matches!(
            kind_of(BoardValidator::validate(&wrapped, 5, 100)),
            GameErrorKind::InvalidPlantShape(_)
        ));
    }

    #[test]
    fn test_wind_accepts_both_orientations() {
        let horizontal = [ProposedPlant::from_strs("WIND", &["C2", "C3"])];
        let vertical = [ProposedPlant::from_strs("WIND", &["C2", "D2"])];
        assert!(BoardValidator::validate(&horizontal, 5, 100).is_ok());
        assert!(BoardValidator::validate(&vertical, 5, 100).is_ok());
    }

    #[test]
    fn test_nuclear_square() {
        let plants = [ProposedPlant::from_strs(
            "NUCLEAR",
            &["C3", "C4", "C5", "D3", "D4", "D5", "E3", "E4", "E5"],
        )];
        assert!(BoardValidator::validate(&plants, 5, 1000).is_ok());
    }

    #[test]
    fn test_capacity_band_edges() {
        // Upper bound is twice the required capacity, both edges inclusive.
        let four = [solar("A1"), solar("A2"), solar("A3"), solar("A4")];
        assert!(BoardValidator::validate(&four, 5, 100).is_ok());
        assert!(BoardValidator::validate(&four, 5, 50).is_ok());

        assert!(matches!(
            kind_of(BoardValidator::validate(&four, 5, 101)),
            GameErrorKind::CapacityOutOfRange { total: 100, min: 101, max: 202 }
        ));
        assert!(matches!(
            kind_of(BoardValidator::validate(&four, 5, 49)),
            GameErrorKind::CapacityOutOfRange { total: 100, min: 49, max: 98 }
        ));
    }

    #[test]
    fn test_capacity_error_reports_enforced_bound() {
        let err = BoardValidator::validate(&[solar("A1")], 5, 100).unwrap_err();
        assert!(err.kind().to_string().contains("between 100 and 200"));
    }

    #[test]
    fn test_coordinates_are_canonical() {
        let board = BoardValidator::validate(&[solar("B01")], 5, 25).unwrap();
        assert_eq!(board.plants()[0].coordinates()[0].to_string(), "B1");
    }
}
