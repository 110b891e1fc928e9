//! Grid map and wall timers
//!
//! The map is an ordered stack of floors, each a width×height grid of
//! [`CellKind`]. Kinds are fixed at load; the only runtime state is the
//! open/closed timer attached to every `TimedWall` cell, and the only
//! mutation path is [`GridMap::activate_timer`] / [`GridMap::tick_timers`].

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{Level, LevelError};
use crate::consts::WALL_OPEN_SECS;

/// Static kind of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Solid,
    Stairs,
    TimedWall,
}

impl CellKind {
    /// Decode a level-file cell code (0..=3)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellKind::Empty),
            1 => Some(CellKind::Solid),
            2 => Some(CellKind::Stairs),
            3 => Some(CellKind::TimedWall),
            _ => None,
        }
    }
}

/// Result of a cell query; `Void` is the out-of-bounds sentinel and is
/// never traversable, never a portal surface, and always stops rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Void,
    Kind(CellKind),
}

/// Integer cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub floor: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32, floor: i32) -> Self {
        Self { x, y, floor }
    }

    /// Cell containing a continuous position on the given floor
    #[inline]
    pub fn from_world(pos: Vec2, floor: i32) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            floor,
        }
    }

    /// Same footprint, one floor up
    #[inline]
    pub fn above(self) -> Self {
        Self {
            floor: self.floor + 1,
            ..self
        }
    }

    /// Same footprint, one floor down
    #[inline]
    pub fn below(self) -> Self {
        Self {
            floor: self.floor - 1,
            ..self
        }
    }
}

/// Countdown attached to a `TimedWall` cell
#[derive(Debug, Clone, Copy, Default)]
pub struct WallTimer {
    open: bool,
    remaining: f32,
}

impl WallTimer {
    /// (Re)open the wall for the full duration. Re-activation while open
    /// resets `remaining`; there is never a second concurrent countdown.
    fn activate(&mut self) {
        self.open = true;
        self.remaining = WALL_OPEN_SECS;
    }

    fn tick(&mut self, dt: f32) {
        if self.open {
            self.remaining -= dt;
            if self.remaining <= 0.0 {
                self.open = false;
                self.remaining = 0.0;
            }
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// The level grid: floors of identical footprint plus the timer table
#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    floors: Vec<Vec<CellKind>>,
    timers: HashMap<GridPos, WallTimer>,
}

impl GridMap {
    /// Build a map from a level definition, validating every cell code and
    /// the grid shape.
    pub fn from_level(level: &Level) -> Result<Self, LevelError> {
        let first = level.floors.first().ok_or(LevelError::NoFloors)?;
        let height = first.len();
        let width = first.first().map(Vec::len).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LevelError::NoFloors);
        }

        let mut floors = Vec::with_capacity(level.floors.len());
        let mut timers = HashMap::new();
        for (f, rows) in level.floors.iter().enumerate() {
            if rows.len() != height {
                return Err(LevelError::RaggedGrid { floor: f });
            }
            let mut cells = Vec::with_capacity(width * height);
            for (y, row) in rows.iter().enumerate() {
                if row.len() != width {
                    return Err(LevelError::RaggedGrid { floor: f });
                }
                for (x, &code) in row.iter().enumerate() {
                    let kind = CellKind::from_code(code).ok_or(LevelError::UnknownCode {
                        code,
                        x,
                        y,
                        floor: f,
                    })?;
                    if kind == CellKind::TimedWall {
                        timers.insert(
                            GridPos::new(x as i32, y as i32, f as i32),
                            WallTimer::default(),
                        );
                    }
                    cells.push(kind);
                }
            }
            floors.push(cells);
        }

        Ok(Self {
            width,
            height,
            floors,
            timers,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Kind of the cell at `pos`, or `Void` when out of bounds on any axis
    pub fn cell(&self, pos: GridPos) -> Cell {
        if pos.x < 0 || pos.y < 0 || pos.floor < 0 {
            return Cell::Void;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return Cell::Void;
        }
        match self.floors.get(pos.floor as usize) {
            Some(cells) => Cell::Kind(cells[y * self.width + x]),
            None => Cell::Void,
        }
    }

    /// True when an actor may stand in this cell: Empty, Stairs, or a
    /// TimedWall whose timer is currently open.
    pub fn is_traversable(&self, pos: GridPos) -> bool {
        match self.cell(pos) {
            Cell::Void => false,
            Cell::Kind(CellKind::Empty) | Cell::Kind(CellKind::Stairs) => true,
            Cell::Kind(CellKind::Solid) => false,
            Cell::Kind(CellKind::TimedWall) => self.timer_open(pos),
        }
    }

    /// True when a portal may be placed on this cell: Solid and Stairs
    /// only. A closed TimedWall is deliberately not a valid surface — it
    /// may open and leave the portal hanging in open air.
    pub fn is_portal_surface(&self, pos: GridPos) -> bool {
        match self.cell(pos) {
            Cell::Void => false,
            Cell::Kind(CellKind::Solid) | Cell::Kind(CellKind::Stairs) => true,
            Cell::Kind(CellKind::Empty) | Cell::Kind(CellKind::TimedWall) => false,
        }
    }

    /// True when a marching ray stops in this cell. Open TimedWalls are
    /// transparent; Void is opaque.
    pub fn is_ray_opaque(&self, pos: GridPos) -> bool {
        match self.cell(pos) {
            Cell::Void => true,
            Cell::Kind(CellKind::Empty) => false,
            Cell::Kind(CellKind::Solid) | Cell::Kind(CellKind::Stairs) => true,
            Cell::Kind(CellKind::TimedWall) => !self.timer_open(pos),
        }
    }

    /// Whether the timer at `pos` is currently open. False for anything
    /// that is not a TimedWall.
    #[inline]
    pub fn timer_open(&self, pos: GridPos) -> bool {
        self.timers.get(&pos).is_some_and(WallTimer::is_open)
    }

    pub fn timer(&self, pos: GridPos) -> Option<&WallTimer> {
        self.timers.get(&pos)
    }

    /// (Re)start the timer on a TimedWall cell. Returns false when `pos`
    /// is not a timed wall.
    pub fn activate_timer(&mut self, pos: GridPos) -> bool {
        match self.timers.get_mut(&pos) {
            Some(timer) => {
                timer.activate();
                log::debug!("timed wall at {pos:?} opened");
                true
            }
            None => false,
        }
    }

    /// Advance every wall timer by `dt` seconds
    pub fn tick_timers(&mut self, dt: f32) {
        for (pos, timer) in self.timers.iter_mut() {
            let was_open = timer.is_open();
            timer.tick(dt);
            if was_open && !timer.is_open() {
                log::debug!("timed wall at {pos:?} closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::SpawnPoint;

    fn small_map() -> GridMap {
        // 4x3, one floor: border of solid walls, a timed wall at (2,1)
        let level = Level {
            floors: vec![vec![
                vec![1, 1, 1, 1],
                vec![1, 0, 3, 1],
                vec![1, 1, 1, 1],
            ]],
            spawn: SpawnPoint {
                x: 1.5,
                y: 1.5,
                floor: 0,
            },
            buttons: Vec::new(),
            collectables: Vec::new(),
        };
        GridMap::from_level(&level).unwrap()
    }

    #[test]
    fn test_void_sentinel_out_of_bounds() {
        let map = small_map();
        assert_eq!(map.cell(GridPos::new(-1, 0, 0)), Cell::Void);
        assert_eq!(map.cell(GridPos::new(0, 3, 0)), Cell::Void);
        assert_eq!(map.cell(GridPos::new(0, 0, 1)), Cell::Void);
        assert_eq!(map.cell(GridPos::new(0, 0, -1)), Cell::Void);
        // Void is distinct from Empty and blocks everything
        assert!(!map.is_traversable(GridPos::new(-1, 0, 0)));
        assert!(!map.is_portal_surface(GridPos::new(-1, 0, 0)));
        assert!(map.is_ray_opaque(GridPos::new(-1, 0, 0)));
    }

    #[test]
    fn test_traversability_by_kind() {
        let map = small_map();
        assert!(map.is_traversable(GridPos::new(1, 1, 0)));
        assert!(!map.is_traversable(GridPos::new(0, 0, 0)));
        // Closed timed wall blocks movement
        assert!(!map.is_traversable(GridPos::new(2, 1, 0)));
    }

    #[test]
    fn test_timed_wall_opens_and_closes() {
        let mut map = small_map();
        let pos = GridPos::new(2, 1, 0);
        assert!(map.activate_timer(pos));
        assert!(map.is_traversable(pos));
        assert!(!map.is_ray_opaque(pos));

        // Runs out after WALL_OPEN_SECS
        map.tick_timers(WALL_OPEN_SECS + 0.01);
        assert!(!map.timer_open(pos));
        assert!(!map.is_traversable(pos));
        assert!(map.is_ray_opaque(pos));
    }

    #[test]
    fn test_timer_reactivation_resets_remaining() {
        let mut map = small_map();
        let pos = GridPos::new(2, 1, 0);
        map.activate_timer(pos);
        map.tick_timers(WALL_OPEN_SECS * 0.8);
        let before = map.timer(pos).unwrap().remaining();
        assert!(before < WALL_OPEN_SECS * 0.3);

        // Re-activation while open resets to the full duration
        map.activate_timer(pos);
        let after = map.timer(pos).unwrap().remaining();
        assert!((after - WALL_OPEN_SECS).abs() < 1e-6);

        // And there is no queued second countdown: one full duration later
        // the wall is closed.
        map.tick_timers(WALL_OPEN_SECS + 0.01);
        assert!(!map.timer_open(pos));
    }

    #[test]
    fn test_portal_surface_excludes_timed_walls() {
        let mut map = small_map();
        let wall = GridPos::new(0, 0, 0);
        let timed = GridPos::new(2, 1, 0);
        assert!(map.is_portal_surface(wall));
        // Closed: not a surface (absorbs projectiles instead)
        assert!(!map.is_portal_surface(timed));
        // Open: still not a surface
        map.activate_timer(timed);
        assert!(!map.is_portal_surface(timed));
    }

    #[test]
    fn test_activate_timer_rejects_plain_walls() {
        let mut map = small_map();
        assert!(!map.activate_timer(GridPos::new(0, 0, 0)));
        assert!(!map.activate_timer(GridPos::new(1, 1, 0)));
    }

    #[test]
    fn test_from_level_rejects_bad_codes() {
        let level = Level {
            floors: vec![vec![vec![1, 1], vec![1, 7]]],
            spawn: SpawnPoint {
                x: 1.5,
                y: 1.5,
                floor: 0,
            },
            buttons: Vec::new(),
            collectables: Vec::new(),
        };
        assert!(matches!(
            GridMap::from_level(&level),
            Err(LevelError::UnknownCode { code: 7, .. })
        ));
    }

    #[test]
    fn test_from_level_rejects_ragged_rows() {
        let level = Level {
            floors: vec![vec![vec![1, 1, 1], vec![1, 1]]],
            spawn: SpawnPoint {
                x: 1.5,
                y: 1.5,
                floor: 0,
            },
            buttons: Vec::new(),
            collectables: Vec::new(),
        };
        assert!(matches!(
            GridMap::from_level(&level),
            Err(LevelError::RaggedGrid { floor: 0 })
        ));
    }
}
