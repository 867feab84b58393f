//! Serialized grid format stored in the layouts table: a JSON array of rows,
//! each row an array of `null` or a player object.

use crate::common::LineupError;
use crate::config::GridShape;
use crate::grid::Grid;
use crate::player::Player;
use crate::protocol::LayoutRow;

/// Encode a grid as its stored JSON form.
pub fn encode_grid(grid: &Grid) -> anyhow::Result<String> {
    serde_json::to_string(&grid.to_rows()).map_err(|e| anyhow::anyhow!("Grid encode error: {}", e))
}

/// Decode stored JSON into a grid, requiring `shape` when given.
pub fn decode_grid(data: &str, shape: Option<GridShape>) -> anyhow::Result<Grid> {
    let rows: Vec<Vec<Option<Player>>> =
        serde_json::from_str(data).map_err(|e| anyhow::anyhow!("Malformed layout data: {}", e))?;
    let grid = Grid::from_rows(rows).map_err(|e| anyhow::anyhow!("Malformed layout data: {}", e))?;
    if let Some(expected) = shape {
        if grid.shape() != expected {
            return Err(anyhow::anyhow!(LineupError::ShapeMismatch {
                expected: (expected.rows, expected.cols),
                found: (grid.rows(), grid.cols()),
            }));
        }
    }
    Ok(grid)
}

/// Build the table row for `grid` under `name`.
pub fn layout_row(name: &str, grid: &Grid) -> anyhow::Result<LayoutRow> {
    Ok(LayoutRow::new(name, encode_grid(grid)?))
}
