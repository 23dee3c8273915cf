#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for the coin track.

use coin_track_core::{CellCoord, Command, Event, GridView, Symbol, TrackError, GOAL_CHAR};

/// Fixed-size grid of track symbols stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Symbol>,
    goal: Option<CellCoord>,
}

impl Grid {
    /// Allocates a grid of `columns` x `rows` cells, all initially empty.
    ///
    /// Fails when either dimension is zero, when a dimension cannot be
    /// addressed by signed cell coordinates, when the cell count overflows,
    /// or when the cells cannot be allocated.
    pub fn new(columns: u32, rows: u32) -> Result<Self, TrackError> {
        let invalid = || TrackError::InvalidDimensions {
            columns: i64::from(columns),
            rows: i64::from(rows),
        };

        if columns == 0 || rows == 0 {
            return Err(invalid());
        }
        if i32::try_from(columns).is_err() || i32::try_from(rows).is_err() {
            return Err(invalid());
        }

        let width = usize::try_from(columns).map_err(|_| invalid())?;
        let height = usize::try_from(rows).map_err(|_| invalid())?;
        let cell_count = width.checked_mul(height).ok_or_else(invalid)?;

        let mut cells = Vec::new();
        if let Err(error) = cells.try_reserve_exact(cell_count) {
            log::warn!("cannot allocate {cell_count} cells: {error}");
            return Err(invalid());
        }
        cells.resize(cell_count, Symbol::Empty);

        Ok(Self {
            columns,
            rows,
            cells,
            goal: None,
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Writes one row of textual symbols starting at column zero.
    ///
    /// Every goal character moves the recorded goal to its cell, so the last
    /// goal written wins. Characters beyond the grid width are ignored. Returns
    /// the number of characters supplied so callers can validate the row
    /// length against their own policy.
    pub fn populate(&mut self, row_text: &str, row_index: i32) -> usize {
        let supplied = row_text.chars().count();

        if row_index < 0 || i64::from(row_index) >= i64::from(self.rows) {
            log::warn!("ignoring row {row_index}: grid has {} rows", self.rows);
            return supplied;
        }

        for (column, value) in row_text.chars().enumerate() {
            let Ok(column) = i32::try_from(column) else {
                break;
            };
            let cell = CellCoord::new(column, row_index);
            if self.is_out_of_bounds(cell) {
                log::warn!(
                    "row {row_index} overflows the grid width of {}; dropping {} cells",
                    self.columns,
                    supplied - self.columns as usize
                );
                break;
            }

            self.set_cell(cell, Symbol::from_char(value));
            if value == GOAL_CHAR {
                self.goal = Some(cell);
            }
        }

        supplied
    }

    /// Symbol stored in the provided cell.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the grid; callers check bounds first.
    #[must_use]
    pub fn cell_at(&self, cell: CellCoord) -> Symbol {
        self.cells[self.linear_index(cell)]
    }

    /// Overwrites the symbol stored in the provided cell.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the grid; callers check bounds first.
    pub fn set_cell(&mut self, cell: CellCoord, symbol: Symbol) {
        let index = self.linear_index(cell);
        self.cells[index] = symbol;
    }

    /// Reports whether the coordinate falls outside the grid.
    #[must_use]
    pub fn is_out_of_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < 0
            || cell.row() < 0
            || i64::from(cell.column()) >= i64::from(self.columns)
            || i64::from(cell.row()) >= i64::from(self.rows)
    }

    /// Goal recorded while populating, if any goal symbol was written.
    #[must_use]
    pub const fn goal_coordinate(&self) -> Option<CellCoord> {
        self.goal
    }

    fn linear_index(&self, cell: CellCoord) -> usize {
        cell.column() as usize + self.columns as usize * cell.row() as usize
    }
}

/// Applies the provided command to the grid, mutating state deterministically.
pub fn apply(grid: &mut Grid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PopulateRow { row, text } => {
            let previous_goal = grid.goal;
            let supplied = grid.populate(&text, row);
            let written = if grid.is_out_of_bounds(CellCoord::new(0, row)) {
                0
            } else {
                supplied.min(grid.columns as usize)
            };
            out_events.push(Event::RowPopulated {
                row,
                written,
                supplied,
            });

            let wrote_goal = text.chars().take(written).any(|value| value == GOAL_CHAR);
            if let Some(cell) = grid.goal {
                if previous_goal != Some(cell) || wrote_goal {
                    out_events.push(Event::GoalRecorded { cell });
                }
            }
        }
        Command::SetCell { cell, symbol } => {
            if grid.is_out_of_bounds(cell) {
                out_events.push(Event::CommandRejected {
                    error: TrackError::OutOfBounds { cell },
                });
                return;
            }

            let from = grid.cell_at(cell);
            if from == symbol {
                return;
            }

            grid.set_cell(cell, symbol);
            out_events.push(Event::CellRewritten {
                cell,
                from,
                to: symbol,
            });
        }
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use super::Grid;
    use coin_track_core::{CellCoord, GridView};

    /// Exposes a read-only view of the dense symbol grid.
    #[must_use]
    pub fn grid_view(grid: &Grid) -> GridView<'_> {
        super::view(grid)
    }

    /// Retrieves the goal recorded while the grid was populated.
    #[must_use]
    pub fn goal(grid: &Grid) -> Option<CellCoord> {
        grid.goal
    }

    /// Renders the grid as text, one line per row.
    #[must_use]
    pub fn render(grid: &Grid) -> String {
        let width = grid.columns as usize;
        let mut text = String::with_capacity(grid.cells.len() + grid.rows as usize);
        for (row_index, row) in grid.cells.chunks(width).enumerate() {
            if row_index > 0 {
                text.push('\n');
            }
            text.extend(row.iter().map(|symbol| symbol.to_char()));
        }
        text
    }
}

fn view(grid: &Grid) -> GridView<'_> {
    GridView::new(&grid.cells, grid.columns, grid.rows, grid.goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_track_core::Direction;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert_eq!(
            Grid::new(0, 3),
            Err(TrackError::InvalidDimensions {
                columns: 0,
                rows: 3
            })
        );
        assert!(Grid::new(3, 0).is_err());
        assert!(Grid::new(u32::MAX, 1).is_err());
    }

    #[test]
    fn new_reports_unallocatable_grid_as_error() {
        let side = i32::MAX as u32;
        assert_eq!(
            Grid::new(side, side),
            Err(TrackError::InvalidDimensions {
                columns: i64::from(side),
                rows: i64::from(side),
            })
        );
    }

    #[test]
    fn new_grid_starts_empty_without_goal() {
        let grid = Grid::new(2, 2).expect("grid");
        assert_eq!(grid.goal_coordinate(), None);
        assert_eq!(query::render(&grid), "..\n..");
    }

    #[test]
    fn populate_records_last_goal() {
        let mut grid = Grid::new(3, 2).expect("grid");
        let _ = grid.populate("*R*", 0);
        assert_eq!(grid.goal_coordinate(), Some(CellCoord::new(2, 0)));

        let _ = grid.populate("D*U", 1);
        assert_eq!(grid.goal_coordinate(), Some(CellCoord::new(1, 1)));
        assert_eq!(grid.cell_at(CellCoord::new(0, 1)), Symbol::Track(Direction::Down));
    }

    #[test]
    fn populate_drops_cells_beyond_width() {
        let mut grid = Grid::new(2, 2).expect("grid");
        let supplied = grid.populate("RRRR", 0);

        assert_eq!(supplied, 4);
        assert_eq!(query::render(&grid), "RR\n..");
    }

    #[test]
    fn populate_ignores_rows_outside_grid() {
        let mut grid = Grid::new(2, 1).expect("grid");
        let _ = grid.populate("**", 3);
        assert_eq!(grid.goal_coordinate(), None);
        assert_eq!(query::render(&grid), "..");
    }

    #[test]
    fn bounds_follow_dimensions() {
        let grid = Grid::new(3, 2).expect("grid");
        assert!(!grid.is_out_of_bounds(CellCoord::new(0, 0)));
        assert!(!grid.is_out_of_bounds(CellCoord::new(2, 1)));
        assert!(grid.is_out_of_bounds(CellCoord::new(3, 0)));
        assert!(grid.is_out_of_bounds(CellCoord::new(0, 2)));
        assert!(grid.is_out_of_bounds(CellCoord::new(-1, 0)));
        assert!(grid.is_out_of_bounds(CellCoord::new(0, -1)));
    }

    #[test]
    fn set_cell_emits_event_only_on_change() {
        let mut grid = Grid::new(2, 1).expect("grid");
        let mut events = Vec::new();
        apply(
            &mut grid,
            Command::PopulateRow {
                row: 0,
                text: "R*".to_owned(),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::RowPopulated {
                    row: 0,
                    written: 2,
                    supplied: 2,
                },
                Event::GoalRecorded {
                    cell: CellCoord::new(1, 0),
                },
            ]
        );

        events.clear();
        apply(
            &mut grid,
            Command::SetCell {
                cell: CellCoord::new(0, 0),
                symbol: Symbol::Track(Direction::Right),
            },
            &mut events,
        );
        assert!(events.is_empty());

        apply(
            &mut grid,
            Command::SetCell {
                cell: CellCoord::new(0, 0),
                symbol: Symbol::Track(Direction::Down),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CellRewritten {
                cell: CellCoord::new(0, 0),
                from: Symbol::Track(Direction::Right),
                to: Symbol::Track(Direction::Down),
            }]
        );
    }

    #[test]
    fn set_cell_rejects_out_of_bounds() {
        let mut grid = Grid::new(1, 1).expect("grid");
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 0);
        apply(
            &mut grid,
            Command::SetCell {
                cell,
                symbol: Symbol::Goal,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                error: TrackError::OutOfBounds { cell },
            }]
        );
    }

    #[test]
    fn grid_view_mirrors_grid() {
        let mut grid = Grid::new(2, 1).expect("grid");
        let _ = grid.populate("L*", 0);
        let view = query::grid_view(&grid);

        assert_eq!(view.dimensions(), (2, 1));
        assert_eq!(view.goal(), Some(CellCoord::new(1, 0)));
        assert_eq!(
            view.symbol(CellCoord::new(0, 0)),
            Some(Symbol::Track(Direction::Left))
        );
        assert_eq!(view.cell_count(), 2);
    }
}
