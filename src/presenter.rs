//! The seam between the movement core and whatever draws it.
//!
//! The core never renders. It describes the end state it wants on screen
//! (pixel target, duration, easing) and, for positional transitions, waits on
//! the future the presenter hands back.

use crate::direction::Direction;
use crate::grid::CellPos;
use crate::layout::Point;
use crate::tween::Easing;
use std::future::{self, Future, Ready};
use std::time::Duration;

/// Rotation of the actor's sprite to match a new facing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateRequest {
    pub facing: Direction,
    pub angle_deg: f32,
    pub duration: Duration,
    pub ease: Easing,
}

/// Positional transition from one cell's center to another's
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRequest {
    pub from: CellPos,
    pub to: CellPos,
    pub target: Point,
    pub duration: Duration,
    pub ease: Easing,
}

pub trait Presenter {
    /// Resolves once the transition has finished on screen
    type Done: Future<Output = ()>;

    /// Jump straight to a position, no animation
    fn place(&mut self, at: Point);

    /// Fire-and-forget; movement logic never waits on it
    fn rotate(&mut self, request: RotateRequest);

    fn transition(&mut self, request: TransitionRequest) -> Self::Done;
}

/// Headless presenter whose transitions finish immediately
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstantPresenter {
    pub position: Point,
    pub angle_deg: f32,
    pub transitions: usize,
}

impl Presenter for InstantPresenter {
    type Done = Ready<()>;

    fn place(&mut self, at: Point) {
        self.position = at;
    }

    fn rotate(&mut self, request: RotateRequest) {
        self.angle_deg = request.angle_deg;
    }

    fn transition(&mut self, request: TransitionRequest) -> Self::Done {
        self.position = request.target;
        self.transitions += 1;
        future::ready(())
    }
}
