use crate::direction::{Direction, Side, Spin};
use crate::grid::{CellPos, Grid};
use crate::layout::Layout;
use crate::presenter::{Presenter, RotateRequest, TransitionRequest};
use crate::tween::Easing;
use log::{debug, trace};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Transition time per tile when nothing else is configured
pub const DEFAULT_MS_PER_TILE: u32 = 180;
/// Lowest per-tile speed `set_speed` accepts
pub const MIN_MS_PER_TILE: u32 = 40;
/// No accepted move is shorter than this
pub const MIN_TRANSITION_MS: u64 = 60;
/// Duration of the sprite rotation after a turn
pub const ROTATION_MS: u64 = 120;

/// Why a movement request was refused. The actor is unchanged in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(CellPos),
    #[error("cell {0} is blocked")]
    Blocked(CellPos),
    #[error("a move is already in progress")]
    Busy,
}

/// Snapshot of an actor's discrete state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorState {
    pub cell: CellPos,
    pub facing: Direction,
    /// True while a positional transition is in flight
    pub busy: bool,
}

/// A single actor walking a grid one transition at a time.
///
/// All operations take `&self`: the model is single-threaded and cooperative,
/// so a request issued while another move is suspended sees the busy flag and
/// is rejected instead of queued.
pub struct GridActor<P: Presenter> {
    grid: Arc<Grid>,
    layout: Layout,
    state: RefCell<ActorState>,
    ms_per_tile: Cell<u32>,
    presenter: RefCell<P>,
}

/// Holds the busy flag for one accepted transition.
///
/// Dropping it without `commit` (the move future was abandoned) clears the
/// flag and leaves the cell where it was.
struct InFlight<'a> {
    state: &'a RefCell<ActorState>,
    target: CellPos,
    committed: bool,
}

impl InFlight<'_> {
    fn commit(mut self) -> CellPos {
        {
            let mut state = self.state.borrow_mut();
            state.cell = self.target;
            state.busy = false;
        }
        self.committed = true;
        self.target
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.state.borrow_mut().busy = false;
        }
    }
}

impl<P: Presenter> GridActor<P> {
    /// Place a new idle actor on `start`, which must be enterable.
    pub fn new(
        grid: Arc<Grid>,
        layout: Layout,
        start: CellPos,
        facing: Direction,
        mut presenter: P,
    ) -> Result<Self, MoveError> {
        check_enterable(&grid, start)?;

        presenter.place(layout.cell_center(start));
        presenter.rotate(RotateRequest {
            facing,
            angle_deg: facing.angle_deg(),
            duration: Duration::ZERO,
            ease: Easing::CubicOut,
        });

        debug!("actor spawned at {start} facing {facing}");
        Ok(GridActor {
            grid,
            layout,
            state: RefCell::new(ActorState {
                cell: start,
                facing,
                busy: false,
            }),
            ms_per_tile: Cell::new(DEFAULT_MS_PER_TILE),
            presenter: RefCell::new(presenter),
        })
    }

    pub fn with_speed(self, ms_per_tile: u32) -> Self {
        self.set_speed(ms_per_tile);
        self
    }

    pub fn state(&self) -> ActorState {
        *self.state.borrow()
    }

    pub fn cell(&self) -> CellPos {
        self.state.borrow().cell
    }

    pub fn facing(&self) -> Direction {
        self.state.borrow().facing
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Borrow the presenter, e.g. to draw it. Do not hold across an await.
    pub fn presenter(&self) -> Ref<'_, P> {
        self.presenter.borrow()
    }

    pub fn presenter_mut(&self) -> RefMut<'_, P> {
        self.presenter.borrow_mut()
    }

    pub fn speed(&self) -> u32 {
        self.ms_per_tile.get()
    }

    /// Set the per-tile transition time, floored at [`MIN_MS_PER_TILE`].
    /// Returns the value actually stored.
    pub fn set_speed(&self, ms_per_tile: u32) -> u32 {
        let effective = ms_per_tile.max(MIN_MS_PER_TILE);
        self.ms_per_tile.set(effective);
        debug!("speed set to {effective} ms/tile (requested {ms_per_tile})");
        effective
    }

    /// True iff `cell` is inside the grid and not a wall
    pub fn can_enter(&self, cell: CellPos) -> bool {
        self.grid.is_passable(cell)
    }

    /// Time a transition between two cells takes at the current speed.
    /// Depends only on the cell distance, never on the pixel layout.
    pub fn duration_between(&self, from: CellPos, to: CellPos) -> Duration {
        let tiles = from.distance(to);
        let ms = (tiles * f64::from(self.speed())).round() as u64;
        Duration::from_millis(ms.max(MIN_TRANSITION_MS))
    }

    /// Face an absolute direction. Allowed mid-transition.
    pub fn turn(&self, facing: Direction) {
        self.state.borrow_mut().facing = facing;
        trace!("actor facing {facing}");
        self.presenter.borrow_mut().rotate(RotateRequest {
            facing,
            angle_deg: facing.angle_deg(),
            duration: Duration::from_millis(ROTATION_MS),
            ease: Easing::CubicOut,
        });
    }

    pub fn rotate(&self, spin: Spin) {
        self.turn(self.facing().rotated(spin));
    }

    pub fn turn_left(&self) {
        self.rotate(Spin::CounterClockwise);
    }

    pub fn turn_right(&self) {
        self.rotate(Spin::Clockwise);
    }

    /// Animate to `target` and resolve once the transition has finished.
    ///
    /// Rejected with `Busy` while another transition is in flight, otherwise
    /// with `OutOfBounds`/`Blocked` if the target cannot be entered.
    pub async fn move_to(&self, target: CellPos) -> Result<CellPos, MoveError> {
        let (request, in_flight) = {
            let mut state = self.state.borrow_mut();
            if state.busy {
                debug!("move to {target} rejected: busy");
                return Err(MoveError::Busy);
            }
            if let Err(e) = check_enterable(&self.grid, target) {
                debug!("move to {target} rejected: {e}");
                return Err(e);
            }
            state.busy = true;

            let request = TransitionRequest {
                from: state.cell,
                to: target,
                target: self.layout.cell_center(target),
                duration: self.duration_between(state.cell, target),
                ease: Easing::SineInOut,
            };
            let in_flight = InFlight {
                state: &self.state,
                target,
                committed: false,
            };
            (request, in_flight)
        };

        debug!(
            "moving {} -> {} over {}ms",
            request.from,
            request.to,
            request.duration.as_millis()
        );
        let done = self.presenter.borrow_mut().transition(request);
        done.await;

        let cell = in_flight.commit();
        debug!("arrived at {cell}");
        Ok(cell)
    }

    pub async fn move_by(&self, dcol: i32, drow: i32) -> Result<CellPos, MoveError> {
        let target = self.cell().offset(dcol, drow);
        self.move_to(target).await
    }

    /// Step along the current facing `steps` times.
    ///
    /// Stops at the first refused step; cells already reached are kept.
    pub async fn move_forward(&self, steps: u32) -> Result<CellPos, MoveError> {
        for _ in 0..steps {
            let (dcol, drow) = self.facing().delta();
            self.move_by(dcol, drow).await?;
        }
        Ok(self.cell())
    }

    /// Sidestep one cell to the left or right of the current facing
    pub async fn strafe(&self, side: Side) -> Result<CellPos, MoveError> {
        let (dcol, drow) = self.facing().towards(side).delta();
        self.move_by(dcol, drow).await
    }

    /// Visit each cell in order. Stops at the first refused step, keeping
    /// the progress made so far.
    pub async fn follow_path<I>(&self, path: I) -> Result<CellPos, MoveError>
    where
        I: IntoIterator<Item = CellPos>,
    {
        for (step, cell) in path.into_iter().enumerate() {
            if let Err(e) = self.move_to(cell).await {
                debug!("path stopped at step {step}: {e}");
                return Err(e);
            }
        }
        Ok(self.cell())
    }

    /// Relocate immediately without a transition.
    ///
    /// Passability is still enforced, and a move already in flight wins.
    pub fn snap_to(&self, cell: CellPos) -> Result<CellPos, MoveError> {
        {
            let mut state = self.state.borrow_mut();
            if state.busy {
                return Err(MoveError::Busy);
            }
            check_enterable(&self.grid, cell)?;
            state.cell = cell;
        }
        self.presenter
            .borrow_mut()
            .place(self.layout.cell_center(cell));
        debug!("snapped to {cell}");
        Ok(cell)
    }
}

fn check_enterable(grid: &Grid, cell: CellPos) -> Result<(), MoveError> {
    if !grid.in_bounds(cell) {
        Err(MoveError::OutOfBounds(cell))
    } else if grid.is_blocked(cell) {
        Err(MoveError::Blocked(cell))
    } else {
        Ok(())
    }
}
