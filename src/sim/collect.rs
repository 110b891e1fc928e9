//! Collectables
//!
//! Floating pickups that respawn a few seconds after collection. Speed
//! boosts raise the player's speed for a short window; floor lifts move
//! the player one floor up at the same footprint.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::map::{GridMap, GridPos};
use super::player::Player;
use crate::consts::{PICKUP_RADIUS_SQ, RESPAWN_SECS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectableKind {
    SpeedBoost,
    FloorLift,
}

#[derive(Debug, Clone)]
pub struct Collectable {
    /// Centered in its cell
    pub pos: Vec2,
    pub floor: i32,
    pub kind: CollectableKind,
    collected: bool,
    respawn: f32,
}

impl Collectable {
    /// Place a collectable at the center of cell (x, y)
    pub fn new(x: i32, y: i32, floor: i32, kind: CollectableKind) -> Self {
        Self {
            pos: Vec2::new(x as f32 + 0.5, y as f32 + 0.5),
            floor,
            kind,
            collected: false,
            respawn: 0.0,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Advance the respawn countdown
    pub fn tick(&mut self, dt: f32) {
        if self.collected {
            self.respawn -= dt;
            if self.respawn <= 0.0 {
                self.collected = false;
                self.respawn = 0.0;
            }
        }
    }

    /// Collect when the player is close enough on the same floor. A floor
    /// lift whose destination cell is blocked stays uncollected.
    pub fn try_collect(&mut self, player: &mut Player, map: &GridMap) -> bool {
        if self.collected || player.floor != self.floor {
            return false;
        }
        if self.pos.distance_squared(player.pos) >= PICKUP_RADIUS_SQ {
            return false;
        }

        match self.kind {
            CollectableKind::SpeedBoost => player.apply_boost(),
            CollectableKind::FloorLift => {
                let above = GridPos::from_world(player.pos, player.floor + 1);
                if !map.is_traversable(above) {
                    return false;
                }
                player.floor += 1;
            }
        }
        self.collected = true;
        self.respawn = RESPAWN_SECS;
        log::debug!("{:?} collected on floor {}", self.kind, self.floor);
        true
    }
}
