//! Render pass
//!
//! Consumes a post-tick simulation snapshot and drives the embedder's
//! [`DrawTarget`]: one shaded vertical strip per screen column, then
//! overlay markers for portals, buttons, collectables, and in-flight
//! projectiles. The marker pre-pass is explicit and separate from the
//! marching loop, and its occlusion test reuses the caster's own
//! line-of-sight sampling.

pub mod raycast;

pub use raycast::{ColumnHit, Raycaster, Surface};

use glam::Vec2;

use crate::normalize_angle;
use crate::sim::{CellKind, CollectableKind, PortalColor, Simulation};

/// 8-bit RGB, the unit every drawing primitive speaks
pub type Rgb = [u8; 3];

const WALL_COLOR: Rgb = [255, 255, 255];
const STAIRS_COLOR: Rgb = [252, 0, 0];
const TIMED_WALL_COLOR: Rgb = [150, 150, 255];
const PORTAL_PRIMARY_COLOR: Rgb = [0, 101, 255];
const PORTAL_SECONDARY_COLOR: Rgb = [255, 93, 0];
const BUTTON_LIT_COLOR: Rgb = [0, 200, 0];
const BUTTON_IDLE_COLOR: Rgb = [200, 0, 0];
const BOOST_COLOR: Rgb = [0, 255, 180];
const LIFT_COLOR: Rgb = [255, 215, 0];

/// Marker view distances, as fractions of the caster's max depth, and
/// sizes as fractions of the projected strip height
const PORTAL_VIEW_FRAC: f32 = 0.7;
const PORTAL_SIZE: f32 = 0.5;
const BUTTON_VIEW_FRAC: f32 = 0.18;
const BUTTON_SIZE: f32 = 0.3;
const BOOST_VIEW_FRAC: f32 = 0.7;
const BOOST_SIZE: f32 = 0.15;
const LIFT_VIEW_FRAC: f32 = 0.3;
const LIFT_SIZE: f32 = 0.2;
const PROJECTILE_VIEW_FRAC: f32 = 0.7;
const PROJECTILE_SIZE: f32 = 0.2;

/// The two drawing primitives an embedder must supply. `screen_x` is in
/// column units; vertical coordinates are in `screen_height` units.
pub trait DrawTarget {
    /// Draw a vertical strip for one column
    fn draw_column(&mut self, column: usize, top: f32, height: f32, color: Rgb);
    /// Draw an overlay marker centered at (`screen_x`, `screen_y`)
    fn draw_marker(&mut self, screen_x: f32, screen_y: f32, size: f32, color: Rgb);
}

/// What an overlay marker represents
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    Portal(PortalColor),
    Button { lit: bool },
    Collectable(CollectableKind),
    Projectile(PortalColor),
}

/// One projected overlay marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub screen_x: f32,
    pub screen_y: f32,
    pub size: f32,
    pub kind: MarkerKind,
}

/// Static color of a struck surface
fn surface_color(kind: CellKind) -> Rgb {
    match kind {
        CellKind::Empty | CellKind::Solid => WALL_COLOR,
        CellKind::Stairs => STAIRS_COLOR,
        CellKind::TimedWall => TIMED_WALL_COLOR,
    }
}

fn marker_color(kind: MarkerKind) -> Rgb {
    match kind {
        MarkerKind::Portal(PortalColor::Primary) | MarkerKind::Projectile(PortalColor::Primary) => {
            PORTAL_PRIMARY_COLOR
        }
        MarkerKind::Portal(PortalColor::Secondary)
        | MarkerKind::Projectile(PortalColor::Secondary) => PORTAL_SECONDARY_COLOR,
        MarkerKind::Button { lit: true } => BUTTON_LIT_COLOR,
        MarkerKind::Button { lit: false } => BUTTON_IDLE_COLOR,
        MarkerKind::Collectable(CollectableKind::SpeedBoost) => BOOST_COLOR,
        MarkerKind::Collectable(CollectableKind::FloorLift) => LIFT_COLOR,
    }
}

/// Darken a color by distance: 10% falloff per cell, clamped
pub fn shade(color: Rgb, depth: f32) -> Rgb {
    let f = ((255.0 - depth * 10.0) / 255.0).clamp(0.0, 1.0);
    [
        (color[0] as f32 * f) as u8,
        (color[1] as f32 * f) as u8,
        (color[2] as f32 * f) as u8,
    ]
}

/// The explicit overlay pre-pass: project every special object visible
/// from the player into screen space. Same floor, inside the view
/// fraction, inside the FOV, and with a clear line of sight.
pub fn markers(sim: &Simulation, caster: &Raycaster) -> Vec<Marker> {
    let mut out = Vec::new();

    for p in &sim.projectiles {
        push_marker(
            &mut out,
            sim,
            caster,
            p.pos,
            p.floor,
            PROJECTILE_VIEW_FRAC,
            PROJECTILE_SIZE,
            MarkerKind::Projectile(p.color),
        );
    }
    for button in &sim.buttons {
        push_marker(
            &mut out,
            sim,
            caster,
            Vec2::new(button.pos.x as f32, button.pos.y as f32),
            button.pos.floor,
            BUTTON_VIEW_FRAC,
            BUTTON_SIZE,
            MarkerKind::Button {
                lit: button.is_lit(&sim.map),
            },
        );
    }
    for item in sim.collectables.iter().filter(|c| !c.is_collected()) {
        let (view_frac, size_frac) = match item.kind {
            CollectableKind::SpeedBoost => (BOOST_VIEW_FRAC, BOOST_SIZE),
            CollectableKind::FloorLift => (LIFT_VIEW_FRAC, LIFT_SIZE),
        };
        push_marker(
            &mut out,
            sim,
            caster,
            item.pos,
            item.floor,
            view_frac,
            size_frac,
            MarkerKind::Collectable(item.kind),
        );
    }
    // Portals last so they draw on top
    for (color, portal) in sim.portals.iter() {
        push_marker(
            &mut out,
            sim,
            caster,
            portal.pos,
            portal.floor,
            PORTAL_VIEW_FRAC,
            PORTAL_SIZE,
            MarkerKind::Portal(color),
        );
    }
    out
}

fn push_marker(
    out: &mut Vec<Marker>,
    sim: &Simulation,
    caster: &Raycaster,
    pos: Vec2,
    floor: i32,
    view_frac: f32,
    size_frac: f32,
    kind: MarkerKind,
) {
    let player = &sim.player;
    if floor != player.floor {
        return;
    }
    let delta = pos - player.pos;
    let limit = caster.config().max_depth * view_frac;
    if delta.length_squared() > limit * limit {
        return;
    }
    let rel = normalize_angle(delta.y.atan2(delta.x) - player.heading);
    let half_fov = caster.config().half_fov();
    if rel < -half_fov || rel > half_fov {
        return;
    }
    if !caster.line_of_sight(&sim.map, floor, player.pos, pos) {
        return;
    }

    let dist = delta.length();
    let size = caster.projected_height(dist, player.look) * size_frac;
    out.push(Marker {
        screen_x: (rel + half_fov) / caster.config().fov * caster.config().columns as f32,
        screen_y: caster.horizon(player.look),
        size,
        kind,
    });
}

/// One full render pass: cast, draw shaded strips, then overlay markers
pub fn render(sim: &Simulation, caster: &Raycaster, target: &mut dyn DrawTarget) {
    let look = sim.player.look;
    for hit in caster.cast(&sim.player, &sim.map) {
        let Some(surface) = hit.surface else { continue };
        let height = caster.projected_height(hit.depth, look);
        let top = caster.horizon(look) - height / 2.0;
        target.draw_column(
            hit.column,
            top,
            height,
            shade(surface_color(surface.kind), hit.depth),
        );
    }
    for marker in markers(sim, caster) {
        target.draw_marker(
            marker.screen_x,
            marker.screen_y,
            marker.size,
            marker_color(marker.kind),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::sim::level::{Level, SpawnPoint};
    use crate::sim::{ImpactEvent, Simulation};
    use std::f32::consts::PI;

    fn pillar_sim() -> Simulation {
        let level = Level {
            floors: vec![vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]],
            spawn: SpawnPoint {
                x: 0.5,
                y: 1.5,
                floor: 0,
            },
            buttons: Vec::new(),
            collectables: Vec::new(),
        };
        Simulation::new(&level).unwrap()
    }

    fn test_caster() -> Raycaster {
        Raycaster::new(RenderConfig {
            columns: 100,
            screen_height: 100.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_portal_dead_ahead_projects_to_center() {
        let mut sim = pillar_sim();
        sim.portals.place(
            PortalColor::Primary,
            ImpactEvent {
                pos: Vec2::new(1.1, 1.5),
                floor: 0,
                normal_angle: PI,
            },
        );
        sim.player.heading = 0.0;

        let caster = test_caster();
        let out = markers(&sim, &caster);
        assert_eq!(out.len(), 1);
        let marker = &out[0];
        assert_eq!(marker.kind, MarkerKind::Portal(PortalColor::Primary));
        assert!((marker.screen_x - 50.0).abs() < 1.0);
        assert!(marker.size > 0.0);
    }

    #[test]
    fn test_marker_behind_player_is_culled() {
        let mut sim = pillar_sim();
        sim.portals.place(
            PortalColor::Primary,
            ImpactEvent {
                pos: Vec2::new(1.1, 1.5),
                floor: 0,
                normal_angle: PI,
            },
        );
        sim.player.heading = PI; // Facing away

        assert!(markers(&sim, &test_caster()).is_empty());
    }

    #[test]
    fn test_marker_on_other_floor_is_culled() {
        let mut sim = pillar_sim();
        sim.portals.place(
            PortalColor::Primary,
            ImpactEvent {
                pos: Vec2::new(1.1, 1.5),
                floor: 1,
                normal_angle: PI,
            },
        );
        sim.player.heading = 0.0;
        assert!(markers(&sim, &test_caster()).is_empty());
    }

    #[test]
    fn test_occluded_marker_is_culled() {
        // Collectable hidden behind the pillar
        let level = Level {
            floors: vec![vec![
                vec![0, 0, 0],
                vec![0, 1, 0],
                vec![0, 0, 0],
            ]],
            spawn: SpawnPoint {
                x: 0.5,
                y: 1.5,
                floor: 0,
            },
            buttons: Vec::new(),
            collectables: vec![crate::sim::level::CollectableDef {
                x: 2,
                y: 1,
                floor: 0,
                kind: CollectableKind::SpeedBoost,
            }],
        };
        let mut sim = Simulation::new(&level).unwrap();
        sim.player.heading = 0.0;
        // The pillar at (1,1) sits between the player and the pickup
        assert!(markers(&sim, &test_caster()).is_empty());
    }

    #[test]
    fn test_shade_darkens_with_depth_and_clamps() {
        let near = shade(WALL_COLOR, 1.0);
        let far = shade(WALL_COLOR, 15.0);
        assert!(near[0] > far[0]);
        // Beyond the falloff range everything is black
        assert_eq!(shade(WALL_COLOR, 40.0), [0, 0, 0]);
    }

    /// Records draw calls for assertions
    #[derive(Default)]
    struct Recorder {
        columns: Vec<usize>,
        markers: usize,
    }

    impl DrawTarget for Recorder {
        fn draw_column(&mut self, column: usize, _top: f32, _height: f32, _color: Rgb) {
            self.columns.push(column);
        }
        fn draw_marker(&mut self, _x: f32, _y: f32, _size: f32, _color: Rgb) {
            self.markers += 1;
        }
    }

    #[test]
    fn test_render_emits_ordered_columns() {
        let level = Level {
            floors: vec![vec![
                vec![1, 1, 1, 1],
                vec![1, 0, 0, 1],
                vec![1, 0, 0, 1],
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
        let sim = Simulation::new(&level).unwrap();
        let caster = test_caster();
        let mut recorder = Recorder::default();
        render(&sim, &caster, &mut recorder);

        // Fully enclosed room: every column hits a wall, in order
        assert_eq!(recorder.columns.len(), caster.config().columns);
        assert!(recorder.columns.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(recorder.markers, 0);
    }
}
