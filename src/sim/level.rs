//! Level definitions
//!
//! A level is plain data: per-floor grids of integer cell codes
//! (0=Empty, 1=Solid, 2=Stairs, 3=TimedWall), button wiring, collectable
//! placements, and a spawn point. Loaded fresh each run; nothing persists
//! across sessions.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::collect::CollectableKind;
use super::map::GridPos;

/// The embedded default level
const DEMO_JSON: &str = include_str!("../../levels/demo.json");

/// Where the player starts (and restarts on reset)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub floor: i32,
}

/// A button and the timed walls it opens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonDef {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub floor: i32,
    pub targets: Vec<GridPos>,
}

/// A collectable placement, in cell coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectableDef {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub floor: i32,
    pub kind: CollectableKind,
}

/// A complete level definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// floors[floor][y][x] = cell code
    pub floors: Vec<Vec<Vec<u8>>>,
    pub spawn: SpawnPoint,
    #[serde(default)]
    pub buttons: Vec<ButtonDef>,
    #[serde(default)]
    pub collectables: Vec<CollectableDef>,
}

impl Level {
    /// Parse a level from JSON
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json).map_err(LevelError::Parse)?;
        log::info!(
            "level parsed: {} floor(s), {} button(s), {} collectable(s)",
            level.floors.len(),
            level.buttons.len(),
            level.collectables.len()
        );
        Ok(level)
    }

    /// The built-in demo level
    pub fn demo() -> Self {
        Self::from_json(DEMO_JSON).expect("embedded demo level is valid")
    }
}

/// Rejected level data
#[derive(Debug)]
pub enum LevelError {
    Parse(serde_json::Error),
    /// No floors, or a floor with no cells
    NoFloors,
    /// A floor's rows do not form a rectangle matching floor 0
    RaggedGrid { floor: usize },
    /// A cell code outside 0..=3
    UnknownCode {
        code: u8,
        x: usize,
        y: usize,
        floor: usize,
    },
    /// A button target that is not a TimedWall cell
    TargetNotTimed { pos: GridPos },
    /// The spawn cell is not traversable
    SpawnBlocked,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Parse(e) => write!(f, "level JSON: {e}"),
            LevelError::NoFloors => write!(f, "level has no floors"),
            LevelError::RaggedGrid { floor } => {
                write!(f, "floor {floor} is not a rectangle matching floor 0")
            }
            LevelError::UnknownCode { code, x, y, floor } => {
                write!(f, "unknown cell code {code} at ({x}, {y}) on floor {floor}")
            }
            LevelError::TargetNotTimed { pos } => {
                write!(
                    f,
                    "button target ({}, {}, floor {}) is not a timed wall",
                    pos.x, pos.y, pos.floor
                )
            }
            LevelError::SpawnBlocked => write!(f, "spawn cell is not traversable"),
        }
    }
}

impl Error for LevelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LevelError::Parse(e) => Some(e),
            _ => None,
        }
    }
}
