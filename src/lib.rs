pub mod action_log;
pub mod actor;
pub mod config;
pub mod direction;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod presenter;
pub mod tween;

pub use actor::{ActorState, GridActor, MoveError};
pub use direction::{Direction, Side, Spin};
pub use grid::{CellPos, Grid, Tile};
pub use layout::{Layout, Point};
pub use presenter::{InstantPresenter, Presenter, RotateRequest, TransitionRequest};
pub use tween::{Easing, Tween};
