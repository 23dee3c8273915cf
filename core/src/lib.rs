#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the coin track engine.
//!
//! This crate defines the message surface that connects the driver, the
//! authoritative grid, and the pure systems. Callers submit [`Command`] values
//! describing desired grid mutations, the world crate executes those commands
//! via its `apply` entry point, and then reports [`Event`] values describing
//! what actually changed. Systems read the grid exclusively through
//! [`GridView`] snapshots and report progress through a [`TrackObserver`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character that marks the goal cell in textual grids.
pub const GOAL_CHAR: char = '*';

/// Character used to render cells that were never written.
pub const EMPTY_CHAR: char = '.';

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that a coin stepping off the left or top edge of
/// the grid still has a representable position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Upper-left cell where every coin starts.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Coordinate reached by moving a single cell in the provided direction.
    ///
    /// The result may lie outside any grid; coordinates saturate at the
    /// numeric limits instead of wrapping.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(
            self.column.saturating_add(dx),
            self.row.saturating_add(dy),
        )
    }
}

/// Cardinal movement directions encoded by track cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// All directions in the order neighbours are expanded.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Column and row delta applied by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`, if any.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| from.step(*direction) == to)
    }
}

/// Role of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Track that moves the coin one cell in the given direction.
    Track(Direction),
    /// Goal cell on which the coin comes to rest.
    Goal,
    /// Cell that was never written.
    Empty,
    /// Cell holding a character with no known meaning.
    Unknown(char),
}

impl Symbol {
    /// Decodes a symbol from its textual representation.
    #[must_use]
    pub const fn from_char(value: char) -> Self {
        match value {
            'U' => Self::Track(Direction::Up),
            'D' => Self::Track(Direction::Down),
            'L' => Self::Track(Direction::Left),
            'R' => Self::Track(Direction::Right),
            GOAL_CHAR => Self::Goal,
            other => Self::Unknown(other),
        }
    }

    /// Encodes the symbol back into its textual representation.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Track(Direction::Up) => 'U',
            Self::Track(Direction::Down) => 'D',
            Self::Track(Direction::Left) => 'L',
            Self::Track(Direction::Right) => 'R',
            Self::Goal => GOAL_CHAR,
            Self::Empty => EMPTY_CHAR,
            Self::Unknown(other) => other,
        }
    }

    /// Direction the symbol moves a coin in, if it is a track cell.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Track(direction) => Some(direction),
            _ => None,
        }
    }
}

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Writes one row of textual symbols into the grid.
    PopulateRow {
        /// Zero-based row receiving the symbols.
        row: i32,
        /// Raw characters of the row, one per cell.
        text: String,
    },
    /// Overwrites the symbol stored in a single cell.
    SetCell {
        /// Cell whose symbol should be replaced.
        cell: CellCoord,
        /// Symbol the cell should hold afterwards.
        symbol: Symbol,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a row of symbols was written.
    RowPopulated {
        /// Row that received the symbols.
        row: i32,
        /// Number of cells written, bounded by the grid width.
        written: usize,
        /// Number of characters supplied by the caller.
        supplied: usize,
    },
    /// Announces that the goal coordinate was recorded.
    GoalRecorded {
        /// Cell now acting as the goal.
        cell: CellCoord,
    },
    /// Confirms that a cell's symbol changed.
    CellRewritten {
        /// Cell that was rewritten.
        cell: CellCoord,
        /// Symbol held before the rewrite.
        from: Symbol,
        /// Symbol held after the rewrite.
        to: Symbol,
    },
    /// Reports that a command could not be executed.
    CommandRejected {
        /// Specific reason the command failed.
        error: TrackError,
    },
}

/// Policy applied when a populated row does not match the grid width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowPolicy {
    /// Mismatched rows are logged and the grid is populated anyway.
    #[default]
    Lenient,
    /// Mismatched rows abort processing with [`TrackError::MalformedRow`].
    Strict,
}

impl RowPolicy {
    /// Validates a row length against the expected width.
    pub fn check(self, row: i32, expected: usize, actual: usize) -> Result<(), TrackError> {
        if expected == actual {
            return Ok(());
        }

        match self {
            Self::Lenient => {
                log::warn!("row {row} holds {actual} cells, expected {expected}; continuing");
                Ok(())
            }
            Self::Strict => Err(TrackError::MalformedRow {
                row,
                expected,
                actual,
            }),
        }
    }
}

/// Every failure the engine can report.
///
/// All of these collapse into the `-1` sentinel at the outermost boundary; the
/// variants exist so logs and tests can tell them apart.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackError {
    /// The grid dimensions or the target iteration count are unusable.
    #[error("invalid dimensions: {columns} columns x {rows} rows")]
    InvalidDimensions {
        /// Requested number of columns.
        columns: i64,
        /// Requested number of rows.
        rows: i64,
    },
    /// A row did not contain the expected number of cells.
    #[error("row {row} holds {actual} cells, expected {expected}")]
    MalformedRow {
        /// Row that failed validation.
        row: i32,
        /// Number of cells the grid width demands.
        expected: usize,
        /// Number of cells actually supplied.
        actual: usize,
    },
    /// A command addressed a cell outside the grid.
    #[error("cell ({}, {}) lies outside the grid", .cell.column(), .cell.row())]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// The search exhausted every reachable cell without finding the goal.
    #[error("no route from the origin to the goal")]
    NoRouteFound,
    /// The cheapest route needs more steps than the caller allows.
    #[error("route needs {length} steps but only {limit} are allowed")]
    RouteTooLong {
        /// Number of steps in the cheapest route.
        length: usize,
        /// Maximum number of steps permitted by the caller.
        limit: usize,
    },
    /// The coin never came to rest within the step budget.
    #[error("coin never came to rest within {budget} ticks")]
    SimulationNeverRests {
        /// Step budget that was exhausted.
        budget: usize,
    },
}

/// Read-only view into the dense symbol grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Symbol],
    columns: u32,
    rows: u32,
    goal: Option<CellCoord>,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Symbol], columns: u32, rows: u32, goal: Option<CellCoord>) -> Self {
        Self {
            cells,
            columns,
            rows,
            goal,
        }
    }

    /// Returns the symbol stored in the provided cell, if it lies in the grid.
    #[must_use]
    pub fn symbol(&self, cell: CellCoord) -> Option<Symbol> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell lies outside the grid.
    #[must_use]
    pub fn is_out_of_bounds(&self, cell: CellCoord) -> bool {
        self.index(cell).is_none()
    }

    /// Goal recorded while the grid was populated, if any.
    #[must_use]
    pub const fn goal(&self) -> Option<CellCoord> {
        self.goal
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let width = usize::try_from(self.columns).ok()?;
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Hook points invoked by the systems while they work.
///
/// Every method defaults to a no-op so observers only implement what they need.
pub trait TrackObserver {
    /// Called when the search expands a node.
    fn node_expanded(&mut self, _cell: CellCoord, _cost_from_start: u32, _total_cost: u32) {}

    /// Called for every step of a reconstructed route, goal first.
    fn path_step(&mut self, _parent: CellCoord, _child: CellCoord, _rewritten: bool) {}

    /// Called when the simulation reads a cell that carries no movement rule.
    fn malformed_cell(&mut self, _cell: CellCoord, _symbol: Symbol) {}
}

/// Observer that ignores every hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl TrackObserver for NoopObserver {}

/// Observer that forwards every hook to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl TrackObserver for LogObserver {
    fn node_expanded(&mut self, cell: CellCoord, cost_from_start: u32, total_cost: u32) {
        log::trace!(
            "expand ({}, {}) g={cost_from_start} f={total_cost}",
            cell.column(),
            cell.row()
        );
    }

    fn path_step(&mut self, parent: CellCoord, child: CellCoord, rewritten: bool) {
        log::trace!(
            "route ({}, {}) -> ({}, {}){}",
            parent.column(),
            parent.row(),
            child.column(),
            child.row(),
            if rewritten { " rewritten" } else { "" }
        );
    }

    fn malformed_cell(&mut self, cell: CellCoord, symbol: Symbol) {
        log::warn!(
            "bad data at ({}, {}): {:?}",
            cell.column(),
            cell.row(),
            symbol.to_char()
        );
    }
}

impl<T: TrackObserver + ?Sized> TrackObserver for &mut T {
    fn node_expanded(&mut self, cell: CellCoord, cost_from_start: u32, total_cost: u32) {
        (**self).node_expanded(cell, cost_from_start, total_cost);
    }

    fn path_step(&mut self, parent: CellCoord, child: CellCoord, rewritten: bool) {
        (**self).path_step(parent, child, rewritten);
    }

    fn malformed_cell(&mut self, cell: CellCoord, symbol: Symbol) {
        (**self).malformed_cell(cell, symbol);
    }
}
