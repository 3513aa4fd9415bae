use crate::actor::{DEFAULT_MS_PER_TILE, MIN_MS_PER_TILE};
use crate::direction::{Direction, ParseDirectionError};
use crate::grid::{CellPos, Grid, GridError};
use crate::layout::Layout;
use log::info;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid grid layout: {0}")]
    Grid(#[from] GridError),
    #[error(transparent)]
    Direction(#[from] ParseDirectionError),
    #[error("start cell {0} is not walkable")]
    Start(CellPos),
    #[error("layout is {found_cols}x{found_rows} but cols/rows ask for {cols}x{rows}")]
    ExtentMismatch {
        cols: i32,
        rows: i32,
        found_cols: i32,
        found_rows: i32,
    },
    #[error("tile_size must be finite and positive and margin finite and non-negative (got {tile_size}, {margin})")]
    Geometry { tile_size: f32, margin: f32 },
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Board settings.
///
/// With neither `layout` nor `cols`/`rows` set, the demo map is used. With
/// only `cols`/`rows` (or an empty `layout`), the board is open floor. When
/// both are given they must agree.
#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub cols: Option<i32>,
    #[serde(default)]
    pub rows: Option<i32>,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_margin")]
    pub margin: f32,
    /// ASCII rows, `#` wall and `.` floor
    #[serde(default)]
    pub layout: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ActorConfig {
    #[serde(default)]
    pub start_col: i32,
    #[serde(default)]
    pub start_row: i32,
    #[serde(default = "default_facing")]
    pub facing: String,
    #[serde(default = "default_ms_per_tile")]
    pub ms_per_tile: u32,
    /// Demo path played on Space
    #[serde(default = "default_path")]
    pub path: Vec<(i32, i32)>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_enable_action_log")]
    pub enable_action_log: bool,
    #[serde(default = "default_action_log_path")]
    pub action_log_path: String,
}

// Default values
fn default_cols() -> i32 { 8 }
fn default_rows() -> i32 { 8 }
fn default_tile_size() -> f32 { 100.0 }
fn default_margin() -> f32 { 30.0 }
fn default_facing() -> String { "east".to_string() }
fn default_ms_per_tile() -> u32 { DEFAULT_MS_PER_TILE }
fn default_enable_action_log() -> bool { true }
fn default_action_log_path() -> String { "action_log.json".to_string() }

fn default_layout() -> Vec<String> {
    [
        "........",
        ".##...#.",
        "..#.#.#.",
        "..#.#...",
        "....###.",
        ".#......",
        ".#.###..",
        "........",
    ]
    .iter()
    .map(|row| row.to_string())
    .collect()
}

fn default_path() -> Vec<(i32, i32)> {
    vec![(1, 0), (2, 0), (3, 0), (3, 1), (3, 2), (3, 3), (3, 4), (2, 4)]
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: None,
            rows: None,
            tile_size: default_tile_size(),
            margin: default_margin(),
            layout: None,
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            start_col: 0,
            start_row: 0,
            facing: default_facing(),
            ms_per_tile: default_ms_per_tile(),
            path: default_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_action_log: default_enable_action_log(),
            action_log_path: default_action_log_path(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if the file doesn't exist.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::parse(&contents)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No {} found, using default configuration", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Build the board described by the `[grid]` table
    pub fn build_grid(&self) -> Result<Grid, ConfigError> {
        let GridConfig {
            cols, rows, layout, ..
        } = &self.grid;

        match (layout, *cols, *rows) {
            (Some(lines), ..) if !lines.is_empty() => {
                let grid = Grid::from_lines(lines)?;
                let wanted_cols = cols.unwrap_or(grid.cols());
                let wanted_rows = rows.unwrap_or(grid.rows());
                if (wanted_cols, wanted_rows) != (grid.cols(), grid.rows()) {
                    return Err(ConfigError::ExtentMismatch {
                        cols: wanted_cols,
                        rows: wanted_rows,
                        found_cols: grid.cols(),
                        found_rows: grid.rows(),
                    });
                }
                Ok(grid)
            }
            (None, None, None) => Ok(Grid::from_lines(&default_layout())?),
            (_, cols, rows) => Ok(Grid::try_new(
                cols.unwrap_or_else(default_cols),
                rows.unwrap_or_else(default_rows),
            )?),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.grid.tile_size, self.grid.margin)
    }

    pub fn start(&self) -> CellPos {
        CellPos::new(self.actor.start_col, self.actor.start_row)
    }

    pub fn facing(&self) -> Result<Direction, ConfigError> {
        Ok(self.actor.facing.parse()?)
    }

    /// Configured speed with the same floor the actor applies
    pub fn ms_per_tile(&self) -> u32 {
        self.actor.ms_per_tile.max(MIN_MS_PER_TILE)
    }

    pub fn path(&self) -> Vec<CellPos> {
        self.actor.path.iter().copied().map(CellPos::from).collect()
    }

    /// Check that the settings describe a playable board
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig {
            tile_size, margin, ..
        } = self.grid;
        if !(tile_size.is_finite() && tile_size > 0.0 && margin.is_finite() && margin >= 0.0) {
            return Err(ConfigError::Geometry { tile_size, margin });
        }

        let grid = self.build_grid()?;
        self.facing()?;
        let start = self.start();
        if !grid.is_passable(start) {
            return Err(ConfigError::Start(start));
        }
        Ok(())
    }
}
