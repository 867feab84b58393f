use std::fmt::Write;

use crate::config::{is_interchange_row, position_label};
use crate::grid::Grid;
use crate::player::Player;
use crate::store::LineupState;

const CELL_WIDTH: usize = 16;

fn card(player: &Player) -> String {
    let text = format!("{} {}", player.number, player.name);
    text.chars().take(CELL_WIDTH - 2).collect()
}

/// Render the grid with its zone ids and row labels.
pub fn render_grid(grid: &Grid) -> String {
    let mut out = String::new();
    for row in 0..grid.rows() {
        if row > 0 && is_interchange_row(row) && !is_interchange_row(row - 1) {
            let _ = writeln!(out, "{}", "-".repeat((CELL_WIDTH + 1) * grid.cols() + 6));
        }
        for col in 0..grid.cols() {
            let cell = match grid.get(row, col) {
                Ok(Some(p)) => card(p),
                _ => format!("[{}-{}]", row, col),
            };
            let _ = write!(out, "{:<width$} ", cell, width = CELL_WIDTH);
        }
        let _ = writeln!(out, "{}", position_label(row).unwrap_or(""));
    }
    out
}

/// Render the roster list followed by the grid.
pub fn render_lineup(state: &LineupState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Roster ({}):", state.roster.len());
    for chunk in state.roster.chunks(4) {
        let line: Vec<String> = chunk
            .iter()
            .map(|p| format!("{:<width$}", card(p), width = CELL_WIDTH))
            .collect();
        let _ = writeln!(out, "  {}", line.join(" ").trim_end());
    }
    let _ = writeln!(out);
    out.push_str(&render_grid(&state.grid));
    out
}
