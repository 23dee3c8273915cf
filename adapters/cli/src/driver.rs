use coin_track_core::{Command, Event, LogObserver, RowPolicy, TrackError};
use coin_track_system_search::PathSearch;
use coin_track_system_simulation::Simulation;
use coin_track_world::{self as world, query, Grid};
use serde::Serialize;

use crate::input::Puzzle;

/// Settings that influence how a puzzle is solved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SolverConfig {
    /// Validation applied to rows whose length differs from the column count.
    pub(crate) row_policy: RowPolicy,
}

/// Successful outcome of solving a puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Solution {
    /// Number of cells rewritten to hit the target.
    pub(crate) diff_count: usize,
    /// Ticks the coin needed on the untouched track, or the tick budget when
    /// it never rested.
    pub(crate) natural_length: usize,
    /// Steps in the imprinted route, when a search was necessary.
    pub(crate) route_length: Option<usize>,
    /// Ticks the coin needed on the final track.
    pub(crate) verified_length: usize,
    /// Final grid rendered one row per line.
    pub(crate) grid: String,
}

/// Populates the grid, measures it, shortens it when needed, and verifies
/// the final track.
pub(crate) fn solve(puzzle: &Puzzle, config: SolverConfig) -> Result<Solution, TrackError> {
    let invalid = || TrackError::InvalidDimensions {
        columns: puzzle.columns,
        rows: puzzle.rows,
    };
    if puzzle.rows <= 0 || puzzle.columns <= 0 || puzzle.target < 0 {
        log::warn!(
            "data not sane: {} rows, {} columns, {} iterations",
            puzzle.rows,
            puzzle.columns,
            puzzle.target
        );
        return Err(invalid());
    }

    let rows = u32::try_from(puzzle.rows).map_err(|_| invalid())?;
    let columns = u32::try_from(puzzle.columns).map_err(|_| invalid())?;
    let target = usize::try_from(puzzle.target).map_err(|_| invalid())?;
    log::debug!("processing {rows} rows, {columns} columns, {target} iterations");

    let mut grid = Grid::new(columns, rows)?;
    populate(&mut grid, puzzle, config.row_policy)?;

    let natural = Simulation::with_observer(LogObserver).run(&query::grid_view(&grid));
    let natural_length = natural.measured_length(&query::grid_view(&grid));
    log::debug!("untouched track measures {natural_length} ticks ({natural:?})");

    let (diff_count, route_length) = if target < natural_length {
        let imprint = PathSearch::with_observer(LogObserver).imprint(&mut grid, target)?;
        (imprint.diff_count, Some(imprint.route.len()))
    } else {
        (0, None)
    };

    let view = query::grid_view(&grid);
    let verified_length = Simulation::with_observer(LogObserver)
        .run(&view)
        .into_result(&view)?;
    if let Some(expected) = route_length {
        if expected != verified_length {
            log::warn!("coin took {verified_length} ticks on a route of {expected} steps");
        }
    }

    Ok(Solution {
        diff_count,
        natural_length,
        route_length,
        verified_length,
        grid: query::render(&grid),
    })
}

fn populate(grid: &mut Grid, puzzle: &Puzzle, policy: RowPolicy) -> Result<(), TrackError> {
    let expected = grid.columns() as usize;
    let mut events = Vec::new();

    for index in 0..grid.rows() {
        let row = i32::try_from(index).map_err(|_| TrackError::InvalidDimensions {
            columns: puzzle.columns,
            rows: puzzle.rows,
        })?;
        events.clear();
        world::apply(
            grid,
            Command::PopulateRow {
                row,
                text: puzzle.row(index as usize).to_owned(),
            },
            &mut events,
        );

        for event in &events {
            match event {
                Event::RowPopulated { supplied, .. } => policy.check(row, expected, *supplied)?,
                Event::GoalRecorded { cell } => {
                    log::debug!("goal recorded at ({}, {})", cell.column(), cell.row());
                }
                Event::CellRewritten { .. } | Event::CommandRejected { .. } => {}
            }
        }
    }

    Ok(())
}
