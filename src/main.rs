use arboard::Clipboard;
use clap::Parser;
use futures::task::noop_waker_ref;
use gridwalk::action_log::{Action, ActionLog, Outcome};
use gridwalk::config::Config;
use gridwalk::{
    logging, CellPos, Grid, GridActor, Layout, MoveError, Point, Presenter, RotateRequest, Side,
    Spin, TransitionRequest, Tween,
};
use log::{error, info, warn};
use macroquad::color::Color;
use macroquad::input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton};
use macroquad::math::vec2;
use macroquad::shapes::{draw_line, draw_rectangle, draw_rectangle_lines, draw_triangle};
use macroquad::text::draw_text;
use macroquad::time::get_frame_time;
use macroquad::window::{clear_background, next_frame, request_new_screen_size, Conf};
use std::cell::Cell;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Grid movement demo
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const BACKGROUND: Color = Color::new(0.059, 0.071, 0.125, 1.0);
const GRID_LINE: Color = Color::new(0.224, 0.259, 0.392, 1.0);
const WALL_FILL: Color = Color::new(0.141, 0.165, 0.278, 1.0);
const WALL_EDGE: Color = Color::new(0.365, 0.416, 0.604, 1.0);
const ACTOR: Color = Color::new(0.886, 0.910, 0.941, 1.0);
const TEXT: Color = Color::new(0.796, 0.835, 0.882, 1.0);

const SPEED_STEP: u32 = 20;

/// Resolves once the sprite presenter reports the tween as finished.
///
/// Never registers a waker: the frame loop polls the in-flight command every
/// frame anyway.
struct Arrival {
    arrived: Rc<Cell<bool>>,
}

impl Future for Arrival {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.arrived.get() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Sprite state animated by the frame loop
struct SpritePresenter {
    x: Tween,
    y: Tween,
    angle: Tween,
    arrival: Option<Rc<Cell<bool>>>,
}

impl SpritePresenter {
    fn new() -> Self {
        SpritePresenter {
            x: Tween::settled(0.0),
            y: Tween::settled(0.0),
            angle: Tween::settled(0.0),
            arrival: None,
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
        self.angle.advance(dt);

        if self.x.is_finished() && self.y.is_finished() {
            if let Some(arrived) = self.arrival.take() {
                arrived.set(true);
            }
        }
    }

    fn position(&self) -> Point {
        Point::new(self.x.value(), self.y.value())
    }

    /// Triangle pointing along the current angle (0 = north, clockwise)
    fn draw(&self, size: f32) {
        let center = self.position();
        let (sin, cos) = self.angle.value().to_radians().sin_cos();
        let half = size / 2.0;
        let corner = |x: f32, y: f32| vec2(center.x + x * cos - y * sin, center.y + x * sin + y * cos);

        draw_triangle(corner(0.0, -half), corner(half, half), corner(-half, half), ACTOR);
    }
}

impl Presenter for SpritePresenter {
    type Done = Arrival;

    fn place(&mut self, at: Point) {
        self.x = Tween::settled(at.x);
        self.y = Tween::settled(at.y);
    }

    fn rotate(&mut self, request: RotateRequest) {
        self.angle = Tween::angle(self.angle.value(), request.angle_deg, request.duration, request.ease);
    }

    fn transition(&mut self, request: TransitionRequest) -> Arrival {
        let from = self.position();
        self.x = Tween::new(from.x, request.target.x, request.duration, request.ease);
        self.y = Tween::new(from.y, request.target.y, request.duration, request.ease);

        let arrived = Rc::new(Cell::new(false));
        self.arrival = Some(Rc::clone(&arrived));
        Arrival { arrived }
    }
}

type Command<'a> = Pin<Box<dyn Future<Output = Result<CellPos, MoveError>> + 'a>>;

fn command<'a>(future: impl Future<Output = Result<CellPos, MoveError>> + 'a) -> Command<'a> {
    Box::pin(future)
}

fn draw_board(grid: &Grid, layout: &Layout) {
    clear_background(BACKGROUND);

    for wall in grid.walls() {
        let origin = layout.cell_origin(wall);
        draw_rectangle(origin.x, origin.y, layout.tile, layout.tile, WALL_FILL);
        draw_rectangle_lines(origin.x, origin.y, layout.tile, layout.tile, 2.0, WALL_EDGE);
    }

    let left = layout.margin;
    let top = layout.margin;
    let right = left + grid.cols() as f32 * layout.tile;
    let bottom = top + grid.rows() as f32 * layout.tile;
    draw_rectangle_lines(left, top, right - left, bottom - top, 2.0, GRID_LINE);
    for col in 1..grid.cols() {
        let x = left + col as f32 * layout.tile;
        draw_line(x, top, x, bottom, 2.0, GRID_LINE);
    }
    for row in 1..grid.rows() {
        let y = top + row as f32 * layout.tile;
        draw_line(left, y, right, y, 2.0, GRID_LINE);
    }
}

fn copy_to_clipboard(grid: &Grid) {
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(grid.to_ascii()) {
                warn!("Failed to copy to clipboard: {}", e);
            } else {
                info!("Grid layout copied to clipboard");
                // Keep clipboard alive for a moment so clipboard managers can capture it
                std::thread::sleep(Duration::from_millis(100));
            }
        }
        Err(e) => warn!("Failed to access clipboard: {}", e),
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "gridwalk".to_owned(),
        window_width: 860,
        window_height: 860,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = match Config::load(&args.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            error!("{}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };

    let (grid, facing) = match (config.build_grid(), config.facing()) {
        (Ok(grid), Ok(facing)) => (Arc::new(grid), facing),
        (Err(e), _) | (_, Err(e)) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let layout = config.layout();
    let (width, height) = layout.board_size(&grid);
    request_new_screen_size(width, height);

    let actor = match GridActor::new(
        Arc::clone(&grid),
        layout,
        config.start(),
        facing,
        SpritePresenter::new(),
    ) {
        Ok(actor) => actor.with_speed(config.ms_per_tile()),
        Err(e) => {
            error!("cannot place actor: {}", e);
            std::process::exit(1);
        }
    };

    let mut log = ActionLog::new();
    let mut cx = Context::from_waker(noop_waker_ref());
    let mut pending: Option<(Action, Command<'_>)> = None;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        // One command per idle frame; input is dropped while a move runs
        if pending.is_none() && !actor.is_busy() {
            let here = || Outcome::Arrived { cell: actor.cell() };

            if is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::Q) {
                actor.turn_left();
                log.log_instant(Action::Rotate { spin: Spin::CounterClockwise }, here());
            } else if is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::E) {
                actor.turn_right();
                log.log_instant(Action::Rotate { spin: Spin::Clockwise }, here());
            } else if is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W) {
                pending = Some((Action::Forward { steps: 1 }, command(actor.move_forward(1))));
            } else if is_key_pressed(KeyCode::A) {
                pending = Some((Action::Strafe { side: Side::Left }, command(actor.strafe(Side::Left))));
            } else if is_key_pressed(KeyCode::D) {
                pending = Some((Action::Strafe { side: Side::Right }, command(actor.strafe(Side::Right))));
            } else if is_key_pressed(KeyCode::Space) {
                let path = config.path();
                pending = Some((Action::FollowPath { steps: path.len() }, command(actor.follow_path(path))));
            } else if is_mouse_button_pressed(MouseButton::Left) {
                let (x, y) = mouse_position();
                let cell = layout.cell_at(Point::new(x, y));
                pending = Some((Action::MoveTo { cell }, command(actor.move_to(cell))));
            } else if is_key_pressed(KeyCode::R) {
                let result = actor.snap_to(config.start());
                log.log_instant(Action::Snap { cell: config.start() }, Outcome::from(&result));
                actor.turn(facing);
                log.log_instant(Action::Turn { facing }, here());
            } else if is_key_pressed(KeyCode::Equal) {
                let effective = actor.set_speed(actor.speed().saturating_sub(SPEED_STEP));
                log.log_instant(Action::SetSpeed { ms_per_tile: effective }, here());
            } else if is_key_pressed(KeyCode::Minus) {
                let effective = actor.set_speed(actor.speed() + SPEED_STEP);
                log.log_instant(Action::SetSpeed { ms_per_tile: effective }, here());
            } else if is_key_pressed(KeyCode::C) {
                copy_to_clipboard(&grid);
            }

            if let Some((action, _)) = &pending {
                log.log_start(action.clone());
            }
        }

        actor
            .presenter_mut()
            .advance(Duration::from_secs_f32(get_frame_time()));

        let finished = match pending.as_mut() {
            Some((_, command)) => match command.as_mut().poll(&mut cx) {
                Poll::Ready(result) => Some(result),
                Poll::Pending => None,
            },
            None => None,
        };
        if let Some(result) = finished {
            if let Some((action, _)) = pending.take() {
                log.log_finish(action, Outcome::from(&result));
            }
        }

        draw_board(&grid, &layout);
        actor.presenter().draw(layout.tile * 0.6);

        let state = actor.state();
        let info = format!(
            "{} facing {} | {} ms/tile{} | arrows/QE turn, W forward, A/D strafe, click move, Space path, R reset, +/- speed, C copy",
            state.cell,
            state.facing,
            actor.speed(),
            if state.busy { " | moving" } else { "" }
        );
        draw_text(&info, layout.margin, height - 10.0, 16.0, TEXT);

        next_frame().await
    }

    if args.verbose {
        log.print();
    }
    info!("{}", log.summary().replace('\n', " | "));
    if config.logging.enable_action_log {
        match log.save_to_file(&config.logging.action_log_path) {
            Ok(()) => info!("Action log saved to {}", config.logging.action_log_path),
            Err(e) => warn!("Failed to save action log: {}", e),
        }
    }
}
