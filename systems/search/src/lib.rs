#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* route planner that rewrites the track so the coin reaches the goal.
//!
//! Moves are 4-directional. Every step costs one, plus one more whenever the
//! cell being left does not already point in the direction of travel, so the
//! cheapest route is also the one that disturbs the existing track the least.
//! Among equally cheap routes the one needing fewer rewrites wins; the
//! remaining ties fall back to insertion order.
//!
//! A track-following route may be longer than the caller allows. In that case
//! the planner searches again ranking routes by step count alone, still
//! preferring fewer rewrites among routes of equal length.

use std::{
    cmp::Reverse,
    collections::{hash_map::Entry, BinaryHeap, HashMap},
};

use coin_track_core::{
    CellCoord, Command, Direction, Event, GridView, NoopObserver, Symbol, TrackError,
    TrackObserver,
};
use coin_track_world::{self as world, query, Grid};

/// Pure system that plans routes from the origin to the goal.
///
/// The node arena and lookup tables are kept between searches so repeated
/// planning reuses their allocations; they are emptied whenever a search ends.
#[derive(Debug)]
pub struct PathSearch<O = NoopObserver> {
    observer: O,
    arena: Vec<SearchNode>,
    lookup: HashMap<CellCoord, NodeId>,
    open: BinaryHeap<Reverse<OpenEntry>>,
    sequence: u64,
}

impl PathSearch {
    /// Creates a planner without any observer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for PathSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: TrackObserver> PathSearch<O> {
    /// Creates a planner that reports expansions and route steps to `observer`.
    #[must_use]
    pub fn with_observer(observer: O) -> Self {
        Self {
            observer,
            arena: Vec::new(),
            lookup: HashMap::new(),
            open: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Finds the cheapest route from the origin to the recorded goal.
    ///
    /// When the cheapest route needs more than `max_iterations` steps, the
    /// shortest route needing the fewest rewrites is planned instead. The grid
    /// is left untouched. Fails with [`TrackError::NoRouteFound`] when the grid
    /// has no goal or the goal cannot be reached, and with
    /// [`TrackError::RouteTooLong`] when even the shortest route needs more
    /// than `max_iterations` steps.
    pub fn plan(
        &mut self,
        view: &GridView<'_>,
        max_iterations: usize,
    ) -> Result<Route, TrackError> {
        let mut route = self.run(view, Ranking::FollowTrack)?;
        if route.len() > max_iterations {
            log::debug!(
                "track-following route of {} steps exceeds the limit of {max_iterations}",
                route.len()
            );
            route = self.run(view, Ranking::FewestSteps)?;
        }

        if route.len() > max_iterations {
            log::debug!(
                "shortest route of {} steps exceeds the limit of {max_iterations}",
                route.len()
            );
            return Err(TrackError::RouteTooLong {
                length: route.len(),
                limit: max_iterations,
            });
        }
        Ok(route)
    }

    /// Plans a route and rewrites the grid so the coin follows it.
    ///
    /// Returns the route together with the number of cells whose symbol
    /// actually changed. On failure the grid is not modified.
    pub fn imprint(
        &mut self,
        grid: &mut Grid,
        max_iterations: usize,
    ) -> Result<Imprint, TrackError> {
        let route = self.plan(&query::grid_view(grid), max_iterations)?;

        let mut commands = Vec::new();
        let _ = route.rewrite_commands(&query::grid_view(grid), &mut commands);

        let mut events = Vec::new();
        for command in commands {
            world::apply(grid, command, &mut events);
        }

        let diff_count = events
            .iter()
            .filter(|event| matches!(event, Event::CellRewritten { .. }))
            .count();
        log::debug!(
            "imprinted route of {} steps, rewrote {diff_count} cells",
            route.len()
        );

        Ok(Imprint { route, diff_count })
    }

    fn run(&mut self, view: &GridView<'_>, ranking: Ranking) -> Result<Route, TrackError> {
        let result = self.search(view, ranking);
        self.release();
        result
    }

    fn search(&mut self, view: &GridView<'_>, ranking: Ranking) -> Result<Route, TrackError> {
        let Some(goal) = view.goal() else {
            log::debug!("grid has no goal to route toward");
            return Err(TrackError::NoRouteFound);
        };

        let origin = CellCoord::origin();
        if view.is_out_of_bounds(origin) || view.is_out_of_bounds(goal) {
            return Err(TrackError::NoRouteFound);
        }

        let root = self.insert_root(origin, origin.manhattan_distance(goal));
        self.push_open(root, ranking);

        let mut nodes_expanded = 0;
        while let Some(Reverse(entry)) = self.open.pop() {
            let current = entry.node;
            let node = &mut self.arena[current.0];
            if node.closed || node.rank(ranking) != entry.rank {
                continue;
            }
            node.closed = true;
            let node = *node;

            nodes_expanded += 1;
            let (cost_from_start, _) = ranking.key(node.cost);
            let (total_cost, _) = node.rank(ranking);
            self.observer
                .node_expanded(node.cell, cost_from_start, total_cost);

            if node.cell == goal {
                return Ok(self.reconstruct(current, view, nodes_expanded));
            }

            let stored = view.symbol(node.cell);
            for direction in Direction::ALL {
                let neighbor = node.cell.step(direction);
                if view.is_out_of_bounds(neighbor) {
                    continue;
                }

                let rewrite = stored.and_then(Symbol::direction) != Some(direction);
                let cost = node.cost.extend(rewrite);
                let cost_to_goal = neighbor.manhattan_distance(goal);

                match self.lookup.entry(neighbor) {
                    Entry::Occupied(known) => {
                        let id = *known.get();
                        let existing = &mut self.arena[id.0];
                        if ranking.key(cost) >= ranking.key(existing.cost) {
                            continue;
                        }
                        existing.cost = cost;
                        existing.parent = Some(current);
                        existing.closed = false;
                        self.push_open(id, ranking);
                    }
                    Entry::Vacant(slot) => {
                        let id = NodeId(self.arena.len());
                        self.arena.push(SearchNode {
                            cell: neighbor,
                            cost,
                            cost_to_goal,
                            parent: Some(current),
                            closed: false,
                        });
                        let _ = slot.insert(id);
                        self.push_open(id, ranking);
                    }
                }
            }
        }

        log::debug!("open set exhausted after expanding {nodes_expanded} nodes");
        Err(TrackError::NoRouteFound)
    }

    fn insert_root(&mut self, cell: CellCoord, cost_to_goal: u32) -> NodeId {
        let id = NodeId(self.arena.len());
        self.arena.push(SearchNode {
            cell,
            cost: Cost::ZERO,
            cost_to_goal,
            parent: None,
            closed: false,
        });
        let _ = self.lookup.insert(cell, id);
        id
    }

    fn push_open(&mut self, id: NodeId, ranking: Ranking) {
        self.sequence += 1;
        self.open.push(Reverse(OpenEntry {
            rank: self.arena[id.0].rank(ranking),
            sequence: self.sequence,
            node: id,
        }));
    }

    fn reconstruct(&mut self, goal: NodeId, view: &GridView<'_>, nodes_expanded: usize) -> Route {
        let goal_node = self.arena[goal.0];
        let mut cells = vec![goal_node.cell];
        let mut child = goal_node;

        while let Some(parent_id) = child.parent {
            let parent = self.arena[parent_id.0];
            let stored = view.symbol(parent.cell).and_then(Symbol::direction);
            let rewritten = Direction::between(parent.cell, child.cell) != stored;
            self.observer.path_step(parent.cell, child.cell, rewritten);
            cells.push(parent.cell);
            child = parent;
        }

        cells.reverse();
        Route {
            cells,
            cost: goal_node.cost.weighted(),
            rewrites: goal_node.cost.rewrites,
            nodes_expanded,
        }
    }

    fn release(&mut self) {
        self.arena.clear();
        self.lookup.clear();
        self.open.clear();
        self.sequence = 0;
    }
}

/// Route from the origin to the goal discovered by [`PathSearch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    cells: Vec<CellCoord>,
    cost: u32,
    rewrites: u32,
    nodes_expanded: usize,
}

impl Route {
    /// Cells visited by the route, starting at the origin and ending at the goal.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of steps in the route, excluding the origin.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Reports whether the goal sits on the origin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total cost of the route including turn penalties.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of cells the route expected to rewrite when it was planned.
    #[must_use]
    pub const fn rewrites(&self) -> u32 {
        self.rewrites
    }

    /// Number of nodes the search expanded before reaching the goal.
    #[must_use]
    pub const fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    /// Orientation every non-goal cell of the route must carry.
    pub fn orientations(&self) -> impl Iterator<Item = (CellCoord, Direction)> + '_ {
        self.cells.windows(2).filter_map(|pair| {
            Direction::between(pair[0], pair[1]).map(|direction| (pair[0], direction))
        })
    }

    /// Emits a `SetCell` command for every route cell whose stored symbol
    /// differs from the orientation the route assigns to it.
    ///
    /// Returns the number of commands pushed. The goal cell is never touched.
    pub fn rewrite_commands(&self, view: &GridView<'_>, out: &mut Vec<Command>) -> usize {
        let before = out.len();
        for (cell, direction) in self.orientations() {
            let symbol = Symbol::Track(direction);
            if view.symbol(cell) != Some(symbol) {
                out.push(Command::SetCell { cell, symbol });
            }
        }
        out.len() - before
    }
}

/// Outcome of imprinting a route onto the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Imprint {
    /// Route the coin now follows.
    pub route: Route,
    /// Number of cells whose symbol changed.
    pub diff_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct NodeId(usize);

/// How candidate routes are ordered during a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ranking {
    /// Every rewrite costs an extra step, keeping routes on the existing track.
    FollowTrack,
    /// Fewest steps first, then fewest rewrites.
    FewestSteps,
}

impl Ranking {
    /// Comparable cost from the origin: primary cost, then rewrites.
    fn key(self, cost: Cost) -> (u32, u32) {
        match self {
            Self::FollowTrack => (cost.weighted(), cost.rewrites),
            Self::FewestSteps => (cost.steps, cost.rewrites),
        }
    }
}

/// Accumulated moves and rewrites from the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cost {
    steps: u32,
    rewrites: u32,
}

impl Cost {
    const ZERO: Self = Self {
        steps: 0,
        rewrites: 0,
    };

    fn extend(self, rewrite: bool) -> Self {
        Self {
            steps: self.steps.saturating_add(1),
            rewrites: self.rewrites.saturating_add(u32::from(rewrite)),
        }
    }

    /// Steps plus turn penalties.
    fn weighted(self) -> u32 {
        self.steps.saturating_add(self.rewrites)
    }
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: CellCoord,
    cost: Cost,
    cost_to_goal: u32,
    parent: Option<NodeId>,
    closed: bool,
}

impl SearchNode {
    fn rank(&self, ranking: Ranking) -> (u32, u32) {
        let (cost, rewrites) = ranking.key(self.cost);
        (cost.saturating_add(self.cost_to_goal), rewrites)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    rank: (u32, u32),
    sequence: u64,
    node: NodeId,
}
