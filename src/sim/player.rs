//! Player pose, movement, and teleport resolution

use glam::Vec2;

use super::map::{Cell, CellKind, GridMap, GridPos};
use super::portal::PortalSlots;
use crate::consts::*;
use crate::unit_vector;

/// The player: continuous position on an integer floor, plus the
/// countdowns that gate firing and teleporting.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub floor: i32,
    /// View direction (radians)
    pub heading: f32,
    /// Vertical look offset, clamped to ±MAX_LOOK; cosmetic only — it
    /// never affects collision
    pub look: f32,
    base_speed: f32,
    boost_remaining: f32,
    pub fire_cooldown: u32,
    pub teleport_cooldown: u32,
}

impl Player {
    pub fn new(pos: Vec2, floor: i32) -> Self {
        Self {
            pos,
            floor,
            heading: 0.0,
            look: 0.0,
            base_speed: BASE_SPEED,
            boost_remaining: 0.0,
            fire_cooldown: 0,
            teleport_cooldown: 0,
        }
    }

    /// Current speed, including any active boost
    pub fn speed(&self) -> f32 {
        if self.boost_remaining > 0.0 {
            self.base_speed + BOOST_BONUS
        } else {
            self.base_speed
        }
    }

    pub fn apply_boost(&mut self) {
        self.boost_remaining = BOOST_SECS;
    }

    pub fn is_boosted(&self) -> bool {
        self.boost_remaining > 0.0
    }

    /// Advance per-tick countdowns
    pub fn tick_cooldowns(&mut self, dt: f32) {
        self.boost_remaining = (self.boost_remaining - dt).max(0.0);
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
    }

    /// Turn by a signed number of turn steps
    pub fn turn(&mut self, dir: f32) {
        self.heading += dir * TURN_SPEED;
    }

    /// Adjust vertical look by a signed number of look steps; always
    /// succeeds, clamped
    pub fn adjust_look(&mut self, dir: f32) {
        self.look = (self.look + dir * LOOK_SPEED).clamp(-MAX_LOOK, MAX_LOOK);
    }

    /// Propose a forward/backward step along the heading. The move is
    /// accepted only when the destination cell is traversable on the
    /// current floor; otherwise the position is unchanged — a rejected
    /// move is not an error. Standing on Stairs with an ascend/descend
    /// intent also changes floor, provided the same footprint on the
    /// target floor is traversable.
    pub fn step_move(&mut self, backward: bool, ascend: bool, descend: bool, map: &GridMap) {
        let sign = if backward { -1.0 } else { 1.0 };
        let next = self.pos + unit_vector(self.heading) * (sign * self.speed() * MOVE_ACCEL);
        let dest = GridPos::from_world(next, self.floor);
        if !map.is_traversable(dest) {
            return;
        }

        if map.cell(dest) == Cell::Kind(CellKind::Stairs) {
            if ascend && map.is_traversable(dest.above()) {
                self.floor += 1;
            } else if descend && self.floor > 0 && map.is_traversable(dest.below()) {
                self.floor -= 1;
            }
        }
        self.pos = next;
    }

    /// Teleport check, run after movement. At most one teleport per tick;
    /// the exit offset plus the cooldown prevent an immediate return trip
    /// through the portal just exited.
    pub fn try_teleport(&mut self, portals: &PortalSlots) -> bool {
        if self.teleport_cooldown > 0 {
            self.teleport_cooldown -= 1;
            return false;
        }

        for (color, portal) in portals.iter() {
            let Some(link) = portal.linked else { continue };
            if portal.floor != self.floor {
                continue;
            }
            if portal.pos.distance(self.pos) >= TELEPORT_RADIUS {
                continue;
            }
            let Some(exit) = portals.get(link) else { continue };

            let heading = exit.exit_angle();
            self.pos = exit.pos + unit_vector(heading) * EXIT_OFFSET;
            self.floor = exit.floor;
            self.heading = heading;
            self.teleport_cooldown = TELEPORT_COOLDOWN_TICKS;
            log::debug!(
                "teleported through {color:?} to ({:.2}, {:.2}) floor {}",
                self.pos.x,
                self.pos.y,
                self.floor
            );
            return true;
        }
        false
    }
}
