mod common;

use common::{actor_on, cells, demo_grid};
use gridwalk::{CellPos, Direction, Easing, Grid, MoveError, Side, Spin};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

#[test]
fn can_enter_rejects_everything_off_the_board() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);
    for col in -3..11 {
        for row in -3..11 {
            let cell = CellPos::new(col, row);
            let inside = (0..8).contains(&col) && (0..8).contains(&row);
            assert_eq!(actor.can_enter(cell), inside, "{cell}");
        }
    }
}

#[test]
fn can_enter_follows_the_mask() {
    let actor = actor_on(demo_grid(), (0, 0), Direction::East);
    let grid = actor.grid().clone();
    for cell in grid.cells() {
        assert_eq!(actor.can_enter(cell), !grid.is_blocked(cell), "{cell}");
    }
    assert!(!actor.can_enter(CellPos::new(1, 1)));
    assert!(actor.can_enter(CellPos::new(3, 3)));
}

#[test]
fn rotation_closes_after_four_steps() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);
    for _ in 0..4 {
        actor.rotate(Spin::Clockwise);
    }
    assert_eq!(actor.facing(), Direction::East);

    actor.rotate(Spin::Clockwise);
    actor.rotate(Spin::CounterClockwise);
    assert_eq!(actor.facing(), Direction::East);

    let presenter = actor.presenter();
    // one rotation at spawn plus six turns
    assert_eq!(presenter.rotations.len(), 7);
    let last = presenter.rotations.last().unwrap();
    assert_eq!(last.angle_deg, 90.0);
    assert_eq!(last.duration, Duration::from_millis(120));
    assert_eq!(last.ease, Easing::CubicOut);
}

#[tokio::test(start_paused = true)]
async fn forward_three_on_open_board() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);
    let started = Instant::now();

    assert_eq!(actor.move_forward(3).await, Ok(CellPos::new(3, 0)));
    assert_eq!(actor.cell(), CellPos::new(3, 0));
    assert!(!actor.is_busy());

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(540), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn forward_keeps_partial_progress() {
    let grid = Grid::with_walls(8, 8, &[CellPos::new(2, 0)]);
    let actor = actor_on(grid, (0, 0), Direction::East);

    assert_eq!(
        actor.move_forward(3).await,
        Err(MoveError::Blocked(CellPos::new(2, 0)))
    );
    assert_eq!(actor.cell(), CellPos::new(1, 0));
    assert_eq!(actor.presenter().transitions.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn forward_zero_steps_is_a_no_op() {
    let actor = actor_on(Grid::new(8, 8), (4, 4), Direction::North);
    assert_eq!(actor.move_forward(0).await, Ok(CellPos::new(4, 4)));
    assert!(actor.presenter().transitions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn path_stops_at_first_bad_cell() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    let result = actor.follow_path(cells(&[(1, 0), (1, 1), (9, 9)])).await;

    assert_eq!(result, Err(MoveError::OutOfBounds(CellPos::new(9, 9))));
    assert_eq!(actor.cell(), CellPos::new(1, 1));
    assert!(!actor.is_busy());
}

#[tokio::test(start_paused = true)]
async fn path_through_demo_board() {
    let actor = actor_on(demo_grid(), (0, 0), Direction::East);
    let path = cells(&[(1, 0), (2, 0), (3, 0), (3, 1), (3, 2), (3, 3)]);

    assert_eq!(actor.follow_path(path.clone()).await, Ok(CellPos::new(3, 3)));

    let visited: Vec<CellPos> = actor.presenter().transitions.iter().map(|t| t.to).collect();
    assert_eq!(visited, path);
}

#[tokio::test(start_paused = true)]
async fn empty_path_succeeds_in_place() {
    let actor = actor_on(Grid::new(8, 8), (2, 2), Direction::East);
    assert_eq!(actor.follow_path(Vec::new()).await, Ok(CellPos::new(2, 2)));
}

#[tokio::test(start_paused = true)]
async fn moves_are_rejected_while_transitioning() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    let checker = async {
        sleep(Duration::from_millis(50)).await;
        let busy = actor.is_busy();
        let cell = actor.cell();
        let by = actor.move_by(0, 1).await;
        let to = actor.move_to(CellPos::new(5, 5)).await;
        let out = actor.move_to(CellPos::new(-1, 0)).await;
        (busy, cell, by, to, out)
    };

    let (moved, (busy, cell, by, to, out)) =
        tokio::join!(actor.move_to(CellPos::new(1, 0)), checker);

    assert_eq!(moved, Ok(CellPos::new(1, 0)));
    assert!(busy);
    assert_eq!(cell, CellPos::new(0, 0));
    assert_eq!(by, Err(MoveError::Busy));
    assert_eq!(to, Err(MoveError::Busy));
    assert_eq!(out, Err(MoveError::Busy));
    assert_eq!(actor.cell(), CellPos::new(1, 0));
    assert_eq!(actor.presenter().transitions.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn second_request_in_same_tick_is_busy() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    let (first, second) = tokio::join!(
        actor.move_to(CellPos::new(1, 0)),
        actor.move_to(CellPos::new(0, 1))
    );

    assert_eq!(first, Ok(CellPos::new(1, 0)));
    assert_eq!(second, Err(MoveError::Busy));
}

#[tokio::test(start_paused = true)]
async fn turning_is_allowed_mid_transition() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    let turner = async {
        sleep(Duration::from_millis(30)).await;
        assert!(actor.is_busy());
        actor.turn(Direction::South);
    };
    let (moved, ()) = tokio::join!(actor.move_forward(1), turner);

    assert_eq!(moved, Ok(CellPos::new(1, 0)));
    assert_eq!(actor.facing(), Direction::South);
}

#[tokio::test(start_paused = true)]
async fn snap_is_refused_mid_transition() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    let snapper = async {
        sleep(Duration::from_millis(30)).await;
        actor.snap_to(CellPos::new(5, 5))
    };
    let (moved, snapped) = tokio::join!(actor.move_to(CellPos::new(1, 0)), snapper);

    assert_eq!(moved, Ok(CellPos::new(1, 0)));
    assert_eq!(snapped, Err(MoveError::Busy));
    assert_eq!(actor.snap_to(CellPos::new(5, 5)), Ok(CellPos::new(5, 5)));
    assert_eq!(actor.cell(), CellPos::new(5, 5));
}

#[tokio::test(start_paused = true)]
async fn abandoned_move_releases_the_actor() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    let abandoned = timeout(Duration::from_millis(20), actor.move_to(CellPos::new(4, 0))).await;
    assert!(abandoned.is_err());
    assert!(!actor.is_busy());
    assert_eq!(actor.cell(), CellPos::new(0, 0));

    assert_eq!(actor.move_by(1, 0).await, Ok(CellPos::new(1, 0)));
}

#[tokio::test(start_paused = true)]
async fn duration_scales_with_distance_and_speed() {
    let actor = actor_on(Grid::new(8, 8), (0, 0), Direction::East);

    actor.move_to(CellPos::new(1, 0)).await.unwrap();
    actor.move_to(CellPos::new(4, 0)).await.unwrap();
    actor.move_to(CellPos::new(7, 4)).await.unwrap();

    assert_eq!(actor.set_speed(10), 40);
    actor.move_to(CellPos::new(6, 4)).await.unwrap();
    actor.move_to(CellPos::new(4, 4)).await.unwrap();

    let presenter = actor.presenter();
    let durations: Vec<u128> = presenter
        .transitions
        .iter()
        .map(|t| t.duration.as_millis())
        .collect();
    // 1, 3 and 5 tiles at 180ms; then 1 tile floored to 60ms and 2 tiles at 40ms
    assert_eq!(durations, vec![180, 540, 900, 60, 80]);
    assert!(presenter.transitions.iter().all(|t| t.ease == Easing::SineInOut));

    let last = presenter.transitions.last().unwrap();
    assert_eq!(last.target, actor.layout().cell_center(CellPos::new(4, 4)));
}

#[tokio::test(start_paused = true)]
async fn strafe_moves_sideways() {
    let actor = actor_on(Grid::new(8, 8), (3, 3), Direction::North);

    assert_eq!(actor.strafe(Side::Left).await, Ok(CellPos::new(2, 3)));
    assert_eq!(actor.strafe(Side::Right).await, Ok(CellPos::new(3, 3)));
    actor.turn(Direction::West);
    assert_eq!(actor.strafe(Side::Left).await, Ok(CellPos::new(3, 4)));
    assert_eq!(actor.facing(), Direction::West);
}

#[tokio::test(start_paused = true)]
async fn blocked_steps_report_the_cell() {
    let actor = actor_on(demo_grid(), (0, 1), Direction::East);

    assert_eq!(
        actor.move_forward(1).await,
        Err(MoveError::Blocked(CellPos::new(1, 1)))
    );
    assert_eq!(actor.move_by(0, -2).await, Err(MoveError::OutOfBounds(CellPos::new(0, -1))));
    assert_eq!(actor.cell(), CellPos::new(0, 1));
    assert!(actor.presenter().transitions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn huge_deltas_are_out_of_bounds() {
    let actor = actor_on(Grid::new(8, 8), (1, 0), Direction::East);

    assert_eq!(
        actor.move_by(i32::MAX, 0).await,
        Err(MoveError::OutOfBounds(CellPos::new(i32::MAX, 0)))
    );
    assert_eq!(
        actor.move_by(0, i32::MIN).await,
        Err(MoveError::OutOfBounds(CellPos::new(1, i32::MIN)))
    );
    assert_eq!(actor.cell(), CellPos::new(1, 0));
    assert!(!actor.is_busy());
    assert!(actor.presenter().transitions.is_empty());
}
