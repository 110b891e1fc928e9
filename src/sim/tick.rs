//! Fixed timestep simulation
//!
//! One `Simulation` owns everything: map, player, buttons, collectables,
//! projectiles, and the two portal slots. Each tick runs in a fixed
//! order — movement, projectiles, teleport, pickups, buttons, wall
//! timers — so a render pass taken afterwards always sees the post-move,
//! post-teleport state.

use glam::Vec2;

use super::collect::Collectable;
use super::level::{Level, LevelError};
use super::map::{Cell, CellKind, GridMap, GridPos};
use super::player::Player;
use super::portal::{PortalColor, PortalProjectile, PortalSlots, ProjectileStatus};
use super::wall::Button;
use crate::consts::FIRE_COOLDOWN_TICKS;

/// Input intents for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub ascend: bool,
    pub descend: bool,
    pub interact: bool,
    pub fire_primary: bool,
    pub fire_secondary: bool,
}

/// The complete game state for one session
#[derive(Debug, Clone)]
pub struct Simulation {
    pub map: GridMap,
    pub player: Player,
    pub buttons: Vec<Button>,
    pub collectables: Vec<Collectable>,
    pub projectiles: Vec<PortalProjectile>,
    pub portals: PortalSlots,
    pub ticks: u64,
    floor_secs: Vec<f32>,
    spawn: (Vec2, i32),
}

impl Simulation {
    /// Build a simulation from a level definition, validating button
    /// wiring and the spawn cell on top of the grid itself.
    pub fn new(level: &Level) -> Result<Self, LevelError> {
        let map = GridMap::from_level(level)?;

        for button in &level.buttons {
            for target in &button.targets {
                match map.cell(*target) {
                    Cell::Kind(CellKind::TimedWall) => {}
                    _ => return Err(LevelError::TargetNotTimed { pos: *target }),
                }
            }
        }

        let spawn_pos = Vec2::new(level.spawn.x, level.spawn.y);
        if !map.is_traversable(GridPos::from_world(spawn_pos, level.spawn.floor)) {
            return Err(LevelError::SpawnBlocked);
        }

        let buttons = level
            .buttons
            .iter()
            .map(|b| Button::new(GridPos::new(b.x, b.y, b.floor), b.targets.clone()))
            .collect();
        let collectables = level
            .collectables
            .iter()
            .map(|c| Collectable::new(c.x, c.y, c.floor, c.kind))
            .collect();
        let floor_secs = vec![0.0; map.floor_count()];

        log::info!(
            "simulation ready: {}x{} cells, {} floor(s)",
            map.width(),
            map.height(),
            map.floor_count()
        );
        Ok(Self {
            map,
            player: Player::new(spawn_pos, level.spawn.floor),
            buttons,
            collectables,
            projectiles: Vec::new(),
            portals: PortalSlots::new(),
            ticks: 0,
            floor_secs,
            spawn: (spawn_pos, level.spawn.floor),
        })
    }

    /// Recreate the player at the spawn point and drop portals,
    /// projectiles, and the per-floor clocks. Wall timers and buttons
    /// keep running.
    pub fn reset(&mut self) {
        self.player = Player::new(self.spawn.0, self.spawn.1);
        self.portals.clear();
        self.projectiles.clear();
        self.floor_secs.fill(0.0);
        log::info!("simulation reset");
    }

    /// Seconds the player has spent on each floor, for UI overlays
    pub fn floor_secs(&self) -> &[f32] {
        &self.floor_secs
    }

    /// Advance the simulation by one tick of `dt` seconds
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.player.tick_cooldowns(dt);

        // Orientation is unconstrained by collision
        if input.turn_left {
            self.player.turn(-1.0);
        }
        if input.turn_right {
            self.player.turn(1.0);
        }
        if input.look_up {
            self.player.adjust_look(1.0);
        }
        if input.look_down {
            self.player.adjust_look(-1.0);
        }

        if input.forward || input.backward {
            let backward = input.backward && !input.forward;
            self.player
                .step_move(backward, input.ascend, input.descend, &self.map);
        }

        if input.fire_primary {
            self.fire(PortalColor::Primary);
        }
        if input.fire_secondary {
            self.fire(PortalColor::Secondary);
        }

        // Step projectiles, resolving impacts after the sweep
        let mut impacts = Vec::new();
        self.projectiles.retain_mut(|p| match p.step(&self.map) {
            ProjectileStatus::Flying => true,
            ProjectileStatus::Expired => false,
            ProjectileStatus::Impact(event) => {
                impacts.push((p.color, event));
                false
            }
        });
        for (color, event) in impacts {
            self.portals.place(color, event);
        }

        self.player.try_teleport(&self.portals);

        for item in &mut self.collectables {
            item.tick(dt);
            item.try_collect(&mut self.player, &self.map);
        }

        for button in &mut self.buttons {
            button.tick(dt);
            if input.interact {
                button.try_activate(&self.player, &mut self.map);
            }
        }

        self.map.tick_timers(dt);

        if let Some(secs) = self.floor_secs.get_mut(self.player.floor as usize) {
            *secs += dt;
        }
        self.ticks += 1;
    }

    /// Fire a projectile of the given color from the player's pose.
    /// Silently ignored while the shot cooldown is running.
    fn fire(&mut self, color: PortalColor) {
        if self.player.fire_cooldown > 0 {
            return;
        }
        self.player.fire_cooldown = FIRE_COOLDOWN_TICKS;
        self.projectiles.push(PortalProjectile::new(
            self.player.pos,
            self.player.floor,
            self.player.heading,
            color,
        ));
        log::debug!("{color:?} projectile fired");
    }
}
