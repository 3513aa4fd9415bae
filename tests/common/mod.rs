#![allow(dead_code)]

use gridwalk::{
    CellPos, Direction, Grid, GridActor, Layout, Point, Presenter, RotateRequest,
    TransitionRequest,
};
use std::sync::Arc;
use tokio::time::{sleep, Sleep};

/// Obstacle matrix of the demo board: 1 = wall, 0 = floor
pub const OBSTACLES: [[u8; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 1, 0],
    [0, 0, 1, 0, 1, 0, 1, 0],
    [0, 0, 1, 0, 1, 0, 0, 0],
    [0, 0, 0, 0, 1, 1, 1, 0],
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 0, 1, 1, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

pub fn demo_grid() -> Grid {
    let rows: Vec<Vec<u8>> = OBSTACLES.iter().map(|row| row.to_vec()).collect();
    Grid::from_rows(&rows).unwrap()
}

/// Presenter whose transitions take real (tokio) time and are recorded
#[derive(Default)]
pub struct SleepPresenter {
    pub placed: Vec<Point>,
    pub rotations: Vec<RotateRequest>,
    pub transitions: Vec<TransitionRequest>,
}

impl Presenter for SleepPresenter {
    type Done = Sleep;

    fn place(&mut self, at: Point) {
        self.placed.push(at);
    }

    fn rotate(&mut self, request: RotateRequest) {
        self.rotations.push(request);
    }

    fn transition(&mut self, request: TransitionRequest) -> Sleep {
        self.transitions.push(request);
        sleep(request.duration)
    }
}

pub fn actor_on(grid: Grid, start: (i32, i32), facing: Direction) -> GridActor<SleepPresenter> {
    GridActor::new(
        Arc::new(grid),
        Layout::new(100.0, 30.0),
        CellPos::from(start),
        facing,
        SleepPresenter::default(),
    )
    .unwrap()
}

pub fn cells(path: &[(i32, i32)]) -> Vec<CellPos> {
    path.iter().copied().map(CellPos::from).collect()
}
