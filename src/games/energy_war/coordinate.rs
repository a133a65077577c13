//! Grid coordinates in "row letter + 1-based column" notation.
//!
//! `A1` is the top-left cell. Rows are uppercase letters, so no grid can be
//! taller than 26 rows; the game itself caps the size at 20.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::error::{GameError, GameErrorKind};

/// A zero-based cell position on a square grid.
///
/// Serializes as its text form (`"B4"`), which is also how boards are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    /// Zero-based row (`A` = 0).
    pub row: usize,
    /// Zero-based column (`1` = 0).
    pub col: usize,
}

impl Coordinate {
    /// Creates a coordinate from zero-based row and column.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parses coordinate text such as `"C7"` without any bounds check.
    ///
    /// # Errors
    ///
    /// Returns [`GameErrorKind::InvalidCoordinate`] if the text is shorter than two
    /// characters, does not start with an uppercase letter, or the remainder is
    /// not a positive integer.
    #[instrument]
    pub fn parse(text: &str) -> Result<Self, GameError> {
        let invalid = |why: &str| GameError::new(GameErrorKind::InvalidCoordinate(format!("{text}: {why}")));

        let mut chars = text.chars();
        let letter = match chars.next() {
            Some(c) if text.chars().count() >= 2 => c,
            _ => return Err(invalid("too short")),
        };
        if !letter.is_ascii_uppercase() {
            return Err(invalid("row must be an uppercase letter"));
        }

        let digits = chars.as_str();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("column must be a number"));
        }
        let column: usize = digits.parse().map_err(|_| invalid("column must be a number"))?;
        if column == 0 {
            return Err(invalid("column must be positive"));
        }

        Ok(Self {
            row: (letter as u8 - b'A') as usize,
            col: column - 1,
        })
    }

    /// Parses coordinate text and checks it lies on a `size`×`size` grid.
    ///
    /// # Errors
    ///
    /// Returns [`GameErrorKind::InvalidCoordinate`] on malformed text or when the
    /// row or column is out of bounds.
    #[instrument]
    pub fn validate(text: &str, size: usize) -> Result<Self, GameError> {
        let coord = Self::parse(text)?;
        if !coord.in_bounds(size) {
            return Err(GameError::new(GameErrorKind::InvalidCoordinate(format!(
                "{text}: out of bounds for a {size}x{size} grid"
            ))));
        }
        Ok(coord)
    }

    /// Formats zero-based row and column as coordinate text.
    pub fn format(row: usize, col: usize) -> String {
        Self::new(row, col).to_string()
    }

    /// Returns true if the coordinate lies on a `size`×`size` grid.
    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'A' + self.row as u8) as char, self.col + 1)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(coord: Coordinate) -> Self {
        coord.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(result: Result<Coordinate, GameError>) -> bool {
        matches!(
            result.as_ref().map_err(GameError::kind),
            Err(GameErrorKind::InvalidCoordinate(_))
        )
    }

    #[test]
    fn test_parse_top_left() {
        assert_eq!(Coordinate::parse("A1").unwrap(), Coordinate::new(0, 0));
    }

    #[test]
    fn test_parse_multi_digit_column() {
        assert_eq!(Coordinate::parse("T20").unwrap(), Coordinate::new(19, 19));
        assert_eq!(Coordinate::parse("B05").unwrap(), Coordinate::new(1, 4));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(is_invalid(Coordinate::parse("")));
        assert!(is_invalid(Coordinate::parse("A")));
        assert!(is_invalid(Coordinate::parse("a1")));
        assert!(is_invalid(Coordinate::parse("11")));
        assert!(is_invalid(Coordinate::parse("A0")));
        assert!(is_invalid(Coordinate::parse("A-1")));
        assert!(is_invalid(Coordinate::parse("A+1")));
        assert!(is_invalid(Coordinate::parse("Ax")));
        assert!(is_invalid(Coordinate::parse("A 1")));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(Coordinate::validate("E5", 5).is_ok());
        assert!(is_invalid(Coordinate::validate("F1", 5)));
        assert!(is_invalid(Coordinate::validate("A6", 5)));
    }

    #[test]
    fn test_format_is_inverse_of_parse() {
        for row in 0..20 {
            for col in 0..20 {
                let text = Coordinate::format(row, col);
                assert_eq!(Coordinate::parse(&text).unwrap(), Coordinate::new(row, col));
            }
        }
    }

    #[test]
    fn test_serializes_as_text() {
        let json = serde_json::to_string(&Coordinate::new(1, 3)).unwrap();
        assert_eq!(json, "\"B4\"");
        let back: Coordinate = serde_json::from_str("\"J10\"").unwrap();
        assert_eq!(back, Coordinate::new(9, 9));
        assert!(serde_json::from_str::<Coordinate>("\"b4\"").is_err());
    }

    #[test]
    fn test_format_canonical_form() {
        assert_eq!(Coordinate::format(2, 9), "C10");
        assert_eq!(Coordinate::parse("C010").unwrap().to_string(), "C10");
    }
}
