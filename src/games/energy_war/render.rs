//! Plain-text board views.

use tracing::instrument;

use super::board::Board;

/// Empty cell.
pub const EMPTY: char = '.';
/// Cell of a destroyed plant.
pub const HIT: char = 'X';
/// Struck cell with no plant.
pub const MISS: char = 'O';

/// Renders boards as character grids.
pub struct BoardRenderer;

impl BoardRenderer {
    /// Renders a `size`×`size` grid, one line per row.
    ///
    /// Plant cells show their type symbol unless `blind` is set. Hits and misses
    /// always show and take precedence over plant symbols.
    #[instrument(skip(board))]
    pub fn render(board: &Board, size: usize, blind: bool) -> String {
        Self::grid(board, size, blind)
            .into_iter()
            .map(|row| {
                let mut line: String = row.into_iter().collect();
                line.push('\n');
                line
            })
            .collect()
    }

    /// Renders the grid with a column-number header and row letters.
    #[instrument(skip(board))]
    pub fn render_with_axes(board: &Board, size: usize, blind: bool) -> String {
        let mut out = String::from("   ");
        for col in 1..=size {
            out.push_str(&format!("{col:>3}"));
        }
        out.push('\n');

        for (row, cells) in Self::grid(board, size, blind).into_iter().enumerate() {
            out.push_str(&format!("{:>3}", (b'A' + row as u8) as char));
            for cell in cells {
                out.push_str(&format!("{cell:>3}"));
            }
            out.push('\n');
        }
        out
    }

    /// Copy of the board with plant positions stripped, as shown to opponents.
    pub fn blind_projection(board: &Board) -> Board {
        board.without_plants()
    }

    fn grid(board: &Board, size: usize, blind: bool) -> Vec<Vec<char>> {
        let mut grid = vec![vec![EMPTY; size]; size];

        if !blind {
            for plant in board.plants() {
                for cell in plant.coordinates() {
                    if cell.in_bounds(size) {
                        grid[cell.row][cell.col] = plant.kind().symbol();
                    }
                }
            }
        }
        for cell in board.hits().iter().filter(|c| c.in_bounds(size)) {
            grid[cell.row][cell.col] = HIT;
        }
        for cell in board.misses().iter().filter(|c| c.in_bounds(size)) {
            grid[cell.row][cell.col] = MISS;
        }
        grid
    }
}
