use coin_track_core::{CellCoord, TrackError};
use coin_track_system_search::PathSearch;
use coin_track_system_simulation::{RunOutcome, Simulation};
use coin_track_world::{query, Grid};
use proptest::prelude::*;

fn grid(rows: &[String]) -> Grid {
    let columns = rows[0].chars().count() as u32;
    let mut grid = Grid::new(columns, rows.len() as u32).expect("grid");
    for (index, row) in rows.iter().enumerate() {
        let _ = grid.populate(row, index as i32);
    }
    grid
}

fn rows(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|row| (*row).to_owned()).collect()
}

fn arb_track() -> impl Strategy<Value = Vec<String>> {
    (1usize..7, 1usize..7)
        .prop_flat_map(|(columns, rows)| {
            (
                Just(columns),
                proptest::collection::vec(
                    proptest::sample::select(vec!['U', 'D', 'L', 'R', '.', 'x']),
                    columns * rows,
                ),
                0..columns,
                0..rows,
            )
        })
        .prop_map(|(columns, mut cells, goal_column, goal_row)| {
            cells[goal_row * columns + goal_column] = '*';
            cells
                .chunks(columns)
                .map(|row| row.iter().collect::<String>())
                .collect()
        })
}

#[test]
fn imprinted_track_leads_the_coin_to_the_goal() {
    let mut grid = grid(&rows(&["RRRD", "...D", "*LLL"]));
    let imprint = PathSearch::new().imprint(&mut grid, 3).expect("imprint");

    assert_eq!(imprint.route.len(), 2);
    assert_eq!(imprint.diff_count, 2);
    assert_eq!(query::render(&grid), "DRRD\nD..D\n*LLL");

    let view = query::grid_view(&grid);
    assert_eq!(Simulation::new().run(&view), RunOutcome::Rested { ticks: 2 });
}

#[test]
fn tight_limit_imprints_shortest_route() {
    let mut grid = grid(&rows(&["RRRD", "...D", "..*L"]));
    let imprint = PathSearch::new().imprint(&mut grid, 4).expect("imprint");

    assert_eq!(imprint.route.len(), 4);
    assert_eq!(imprint.diff_count, 2);
    assert_eq!(query::render(&grid), "RRDD\n..DD\n..*L");

    let view = query::grid_view(&grid);
    assert_eq!(Simulation::new().run(&view), RunOutcome::Rested { ticks: 4 });
}

#[test]
fn looping_track_is_broken_by_search() {
    let mut grid = grid(&rows(&["RD.", "UL*"]));
    let view = query::grid_view(&grid);
    assert!(!Simulation::new().run(&view).rested());

    let imprint = PathSearch::new().imprint(&mut grid, 6).expect("imprint");
    assert_eq!(imprint.route.len(), 3);
    assert_eq!(imprint.diff_count, 1);

    let view = query::grid_view(&grid);
    assert_eq!(Simulation::new().run(&view), RunOutcome::Rested { ticks: 3 });
}

#[test]
fn grid_without_goal_has_no_route() {
    let mut grid = grid(&rows(&["RD", "LU"]));
    assert_eq!(
        PathSearch::new().imprint(&mut grid, 100),
        Err(TrackError::NoRouteFound)
    );
}

#[test]
fn last_goal_written_is_the_destination() {
    let mut grid = grid(&rows(&["*R*"]));
    let imprint = PathSearch::new().imprint(&mut grid, 2).expect("imprint");

    assert_eq!(
        imprint.route.cells().last().copied(),
        Some(CellCoord::new(2, 0))
    );
    assert_eq!(imprint.diff_count, 1);
    assert_eq!(query::render(&grid), "RR*");
}

#[test]
fn planner_is_reusable_across_grids() {
    let mut search = PathSearch::new();
    let mut first = grid(&rows(&["D.", "*."]));
    let mut second = grid(&rows(&["..", ".*"]));

    assert_eq!(search.imprint(&mut first, 4).expect("first").diff_count, 0);
    assert_eq!(search.imprint(&mut second, 4).expect("second").diff_count, 2);
}

proptest! {
    #[test]
    fn route_is_never_shorter_than_manhattan(track in arb_track()) {
        let mut grid = grid(&track);
        let goal = query::goal(&grid).expect("goal");
        let imprint = PathSearch::new().imprint(&mut grid, usize::MAX).expect("imprint");

        let manhattan = CellCoord::origin().manhattan_distance(goal) as usize;
        prop_assert!(imprint.route.len() >= manhattan);
        prop_assert!(imprint.diff_count <= imprint.route.len());
    }

    #[test]
    fn coin_rests_after_exactly_route_length(track in arb_track()) {
        let mut grid = grid(&track);
        let imprint = PathSearch::new().imprint(&mut grid, usize::MAX).expect("imprint");

        let view = query::grid_view(&grid);
        prop_assert_eq!(
            Simulation::new().run(&view),
            RunOutcome::Rested { ticks: imprint.route.len() }
        );
    }

    #[test]
    fn manhattan_limit_is_always_met(track in arb_track()) {
        let mut grid = grid(&track);
        let goal = query::goal(&grid).expect("goal");
        let manhattan = CellCoord::origin().manhattan_distance(goal) as usize;
        let mut search = PathSearch::new();

        let first = search.imprint(&mut grid, manhattan).expect("imprint");
        prop_assert_eq!(first.route.len(), manhattan);

        let view = query::grid_view(&grid);
        prop_assert_eq!(
            Simulation::new().run(&view),
            RunOutcome::Rested { ticks: manhattan }
        );

        let second = search.imprint(&mut grid, manhattan).expect("second");
        prop_assert_eq!(second.diff_count, 0);
        prop_assert_eq!(second.route.len(), manhattan);
    }

    #[test]
    fn second_imprint_changes_nothing(track in arb_track()) {
        let mut grid = grid(&track);
        let mut search = PathSearch::new();
        let first = search.imprint(&mut grid, usize::MAX).expect("first");
        let rendered = query::render(&grid);
        let second = search.imprint(&mut grid, usize::MAX).expect("second");

        prop_assert_eq!(second.diff_count, 0);
        prop_assert_eq!(second.route.len(), first.route.len());
        prop_assert_eq!(query::render(&grid), rendered);
    }
}
