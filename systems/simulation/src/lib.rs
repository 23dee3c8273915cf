#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic tick simulation that rolls a coin along the track.

use coin_track_core::{CellCoord, GridView, NoopObserver, Symbol, TrackError, TrackObserver};

/// Pure system that advances a single coin one cell per tick.
///
/// The simulation never owns the grid; every call receives a fresh
/// [`GridView`] so the search may rewrite cells between runs.
#[derive(Debug)]
pub struct Simulation<O = NoopObserver> {
    coin: CellCoord,
    observer: O,
}

impl Simulation {
    /// Creates a simulation with the coin parked at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: TrackObserver> Simulation<O> {
    /// Creates a simulation that reports malformed cells to `observer`.
    #[must_use]
    pub fn with_observer(observer: O) -> Self {
        Self {
            coin: CellCoord::origin(),
            observer,
        }
    }

    /// Current coin position, possibly outside the grid.
    #[must_use]
    pub const fn coin(&self) -> CellCoord {
        self.coin
    }

    /// Returns the coin to the origin.
    pub fn reset(&mut self) {
        self.coin = CellCoord::origin();
    }

    /// Applies the movement rule of the cell under the coin.
    ///
    /// Returns `true` when the coin rests on the goal. Cells without a
    /// movement rule leave the coin in place and are reported to the
    /// observer rather than treated as fatal.
    pub fn step(&mut self, view: &GridView<'_>) -> bool {
        let symbol = view.symbol(self.coin).unwrap_or(Symbol::Empty);
        match symbol {
            Symbol::Track(direction) => {
                self.coin = self.coin.step(direction);
                false
            }
            Symbol::Goal => true,
            Symbol::Empty | Symbol::Unknown(_) => {
                self.observer.malformed_cell(self.coin, symbol);
                false
            }
        }
    }

    /// Reports whether the coin has left the grid.
    #[must_use]
    pub fn is_out_of_bounds(&self, view: &GridView<'_>) -> bool {
        view.is_out_of_bounds(self.coin)
    }

    /// Rolls the coin from the origin until it rests, leaves the grid, or
    /// exhausts the `columns * rows + 1` tick budget.
    pub fn run(&mut self, view: &GridView<'_>) -> RunOutcome {
        self.reset();
        let budget = tick_budget(view);
        let mut ticks = 0;

        loop {
            if self.step(view) {
                log::debug!("coin rested after {ticks} ticks");
                return RunOutcome::Rested { ticks };
            }

            if self.is_out_of_bounds(view) {
                log::debug!(
                    "coin left the grid at ({}, {})",
                    self.coin.column(),
                    self.coin.row()
                );
                return RunOutcome::OutOfBounds { ticks: ticks + 1 };
            }

            if ticks >= budget {
                log::debug!("coin never came to rest within {budget} ticks");
                return RunOutcome::NeverRests { budget };
            }

            ticks += 1;
        }
    }
}

/// Result of rolling the coin from the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The coin came to rest on the goal.
    Rested {
        /// Number of moves made before resting.
        ticks: usize,
    },
    /// The coin stepped off the grid.
    OutOfBounds {
        /// Number of moves made, including the one that left the grid.
        ticks: usize,
    },
    /// The tick budget ran out, usually because the track loops.
    NeverRests {
        /// Tick budget that was exhausted.
        budget: usize,
    },
}

impl RunOutcome {
    /// Reports whether the coin came to rest.
    #[must_use]
    pub const fn rested(&self) -> bool {
        matches!(self, Self::Rested { .. })
    }

    /// Length compared against the target iteration count.
    ///
    /// Runs that never rest measure as the full tick budget so that any
    /// finite target asks for a shorter track.
    #[must_use]
    pub fn measured_length(&self, view: &GridView<'_>) -> usize {
        match *self {
            Self::Rested { ticks } => ticks,
            Self::OutOfBounds { .. } => tick_budget(view),
            Self::NeverRests { budget } => budget,
        }
    }

    /// Converts the outcome into the number of ticks taken to rest.
    pub fn into_result(self, view: &GridView<'_>) -> Result<usize, TrackError> {
        match self {
            Self::Rested { ticks } => Ok(ticks),
            Self::OutOfBounds { .. } | Self::NeverRests { .. } => {
                Err(TrackError::SimulationNeverRests {
                    budget: tick_budget(view),
                })
            }
        }
    }
}

/// Maximum number of ticks a run may take before it is declared endless.
#[must_use]
pub fn tick_budget(view: &GridView<'_>) -> usize {
    view.cell_count().saturating_add(1)
}
