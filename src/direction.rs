use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Facing of an actor, ordered clockwise starting at north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// One clockwise or counter-clockwise step around the compass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    pub const fn as_delta(self) -> i32 {
        match self {
            Spin::Clockwise => 1,
            Spin::CounterClockwise => -1,
        }
    }
}

/// Side to step towards without changing facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown direction {0:?} (expected north, east, south or west)")]
pub struct ParseDirectionError(pub String);

impl Direction {
    /// All directions in clockwise order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Unit (dcol, drow) step; rows grow downwards
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Display rotation for a sprite drawn pointing north
    pub const fn angle_deg(self) -> f32 {
        match self {
            Direction::North => 0.0,
            Direction::East => 90.0,
            Direction::South => 180.0,
            Direction::West => 270.0,
        }
    }

    pub const fn rotated(self, spin: Spin) -> Self {
        Self::from_index((self.index() as i32 + spin.as_delta()).rem_euclid(4) as usize)
    }

    /// Direction on the given side of this facing
    pub const fn towards(self, side: Side) -> Self {
        match side {
            Side::Left => self.rotated(Spin::CounterClockwise),
            Side::Right => self.rotated(Spin::Clockwise),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|dir| dir.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}
