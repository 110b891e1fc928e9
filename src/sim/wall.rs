//! Buttons
//!
//! A button opens a set of timed walls. It stores no activity bit of its
//! own: the lit state shown to the UI is derived from whether any target
//! wall is currently open.

use super::map::{GridMap, GridPos};
use super::player::Player;
use crate::consts::{BUTTON_COOLDOWN_SECS, BUTTON_RADIUS};

#[derive(Debug, Clone)]
pub struct Button {
    pub pos: GridPos,
    pub targets: Vec<GridPos>,
    cooldown: f32,
}

impl Button {
    pub fn new(pos: GridPos, targets: Vec<GridPos>) -> Self {
        Self {
            pos,
            targets,
            cooldown: 0.0,
        }
    }

    /// Advance the cooldown by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Attempt an interaction. Fails silently when the player is out of
    /// range, on another floor, or the cooldown has not elapsed. On
    /// success every target timer is (re)activated and the cooldown
    /// restarts.
    pub fn try_activate(&mut self, player: &Player, map: &mut GridMap) -> bool {
        if self.cooldown > 0.0 || player.floor != self.pos.floor {
            return false;
        }
        let dx = (player.pos.x - self.pos.x as f32).abs();
        let dy = (player.pos.y - self.pos.y as f32).abs();
        if dx >= BUTTON_RADIUS || dy >= BUTTON_RADIUS {
            return false;
        }

        for target in &self.targets {
            map.activate_timer(*target);
        }
        self.cooldown = BUTTON_COOLDOWN_SECS;
        log::debug!(
            "button at {:?} pressed, {} wall(s) opened",
            self.pos,
            self.targets.len()
        );
        true
    }

    /// Derived display state: lit while any target wall is open
    pub fn is_lit(&self, map: &GridMap) -> bool {
        self.targets.iter().any(|t| map.timer_open(*t))
    }
}
