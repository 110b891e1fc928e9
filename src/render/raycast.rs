//! Column raycaster
//!
//! One ray per screen column, marched outward in a fixed small step. The
//! fixed increment (never adaptive) trades precision for consistent wall
//! thickness and a predictable O(columns × max_depth / step) worst case.
//! Casting is pure: identical pose and map state produce identical hit
//! sequences, with no state carried between calls.

use glam::Vec2;

use crate::config::RenderConfig;
use crate::consts::DEPTH_EPSILON;
use crate::sim::{Cell, CellKind, GridMap, GridPos, Player};
use crate::unit_vector;

/// What one column's ray struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnHit {
    pub column: usize,
    /// Distance marched; `max_depth` on a miss
    pub depth: f32,
    /// The struck cell, or None when the ray left the map or ran out of
    /// depth
    pub surface: Option<Surface>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub cell: GridPos,
    pub kind: CellKind,
}

/// Casts one ray per screen column over the current map state
#[derive(Debug, Clone)]
pub struct Raycaster {
    config: RenderConfig,
}

impl Raycaster {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Cast every column left to right from the player's pose
    pub fn cast(&self, player: &Player, map: &GridMap) -> Vec<ColumnHit> {
        let start = player.heading - self.config.half_fov();
        let step = self.config.column_angle();
        (0..self.config.columns)
            .map(|column| {
                let angle = start + column as f32 * step;
                let (depth, surface) = self.march(player.pos, player.floor, angle, map);
                ColumnHit {
                    column,
                    depth,
                    surface,
                }
            })
            .collect()
    }

    /// March a single ray. Solid, Stairs, and closed TimedWalls stop it;
    /// open TimedWalls are transparent; Void and the depth limit are a
    /// miss at `max_depth`.
    fn march(&self, origin: Vec2, floor: i32, angle: f32, map: &GridMap) -> (f32, Option<Surface>) {
        let dir = unit_vector(angle);
        let mut depth = 0.0;
        loop {
            depth += self.config.ray_step;
            if depth >= self.config.max_depth {
                return (self.config.max_depth, None);
            }
            let pos = GridPos::from_world(origin + dir * depth, floor);
            match map.cell(pos) {
                Cell::Void => return (self.config.max_depth, None),
                Cell::Kind(CellKind::Empty) => {}
                Cell::Kind(CellKind::TimedWall) if map.timer_open(pos) => {}
                Cell::Kind(kind) => return (depth, Some(Surface { cell: pos, kind })),
            }
        }
    }

    /// Projected strip height for a hit at `depth`, scaled by the
    /// vertical look
    pub fn projected_height(&self, depth: f32, look: f32) -> f32 {
        (self.config.screen_height / (depth + DEPTH_EPSILON)) * (1.0 - look.sin() * 0.5)
    }

    /// Vertical screen center, shifted by the vertical look
    pub fn horizon(&self, look: f32) -> f32 {
        self.config.screen_height / 2.0 + self.config.screen_height * 0.3 * look.sin()
    }

    /// Line of sight between two points on one floor, sampled with the
    /// same fixed step as the main cast so marker occlusion can never
    /// disagree with column hits. The destination's own cell is not
    /// tested, which keeps wall-mounted portals visible.
    pub fn line_of_sight(&self, map: &GridMap, floor: i32, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let dist = delta.length();
        if dist <= self.config.ray_step {
            return true;
        }
        let dir = delta / dist;
        let target = GridPos::from_world(to, floor);
        let mut depth = 0.0;
        loop {
            depth += self.config.ray_step;
            if depth >= dist {
                return true;
            }
            let pos = GridPos::from_world(from + dir * depth, floor);
            if pos == target {
                return true;
            }
            if map.is_ray_opaque(pos) {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WALL_OPEN_SECS;
    use crate::sim::level::{Level, SpawnPoint};

    fn caster(columns: usize) -> Raycaster {
        Raycaster::new(RenderConfig {
            columns,
            screen_height: 100.0,
            ..Default::default()
        })
    }

    /// Nearly parallel rays, so corridor tests stay inside one row
    fn narrow_caster() -> Raycaster {
        Raycaster::new(RenderConfig {
            columns: 3,
            screen_height: 100.0,
            fov: 0.2,
            ..Default::default()
        })
    }

    fn corridor_map() -> GridMap {
        // East-west corridor with a timed wall at (4,1)
        let level = Level {
            floors: vec![vec![
                vec![1, 1, 1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 3, 0, 1],
                vec![1, 1, 1, 1, 1, 1, 1],
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

    fn player_facing_east() -> Player {
        let mut player = Player::new(Vec2::new(1.5, 1.5), 0);
        player.heading = 0.0;
        player
    }

    #[test]
    fn test_cast_is_deterministic() {
        let map = corridor_map();
        let player = player_facing_east();
        let caster = caster(64);
        let first = caster.cast(&player, &map);
        let second = caster.cast(&player, &map);
        assert_eq!(first, second);
    }

    #[test]
    fn test_one_hit_per_column_in_order() {
        let map = corridor_map();
        let player = player_facing_east();
        let caster = caster(31);
        let hits = caster.cast(&player, &map);
        assert_eq!(hits.len(), 31);
        for (i, hit) in hits.iter().enumerate() {
            assert_eq!(hit.column, i);
        }
    }

    #[test]
    fn test_closed_timed_wall_stops_the_center_ray() {
        let map = corridor_map();
        let player = player_facing_east();
        let caster = narrow_caster();
        let hits = caster.cast(&player, &map);
        let center = &hits[1];
        let surface = center.surface.expect("center ray hits the timed wall");
        assert_eq!(surface.cell, GridPos::new(4, 1, 0));
        assert_eq!(surface.kind, CellKind::TimedWall);
    }

    #[test]
    fn test_open_timed_wall_is_transparent() {
        let mut map = corridor_map();
        map.activate_timer(GridPos::new(4, 1, 0));
        let player = player_facing_east();
        let caster = narrow_caster();
        let hits = caster.cast(&player, &map);
        // The ray passes through the open wall to the solid wall behind it
        let surface = hits[1].surface.expect("center ray hits the back wall");
        assert_eq!(surface.cell, GridPos::new(6, 1, 0));
        assert_eq!(surface.kind, CellKind::Solid);

        // Closing it restores the nearer hit
        map.tick_timers(WALL_OPEN_SECS + 0.01);
        let hits = caster.cast(&player, &map);
        assert_eq!(
            hits[1].surface.unwrap().cell,
            GridPos::new(4, 1, 0)
        );
    }

    #[test]
    fn test_void_is_a_miss_at_max_depth() {
        // Borderless map: rays escape into the void
        let level = Level {
            floors: vec![vec![vec![0, 0], vec![0, 0]]],
            spawn: SpawnPoint {
                x: 0.5,
                y: 0.5,
                floor: 0,
            },
            buttons: Vec::new(),
            collectables: Vec::new(),
        };
        let map = GridMap::from_level(&level).unwrap();
        let player = player_facing_east();
        let caster = caster(5);
        for hit in caster.cast(&player, &map) {
            assert!(hit.surface.is_none());
            assert_eq!(hit.depth, caster.config().max_depth);
        }
    }

    #[test]
    fn test_projected_height_is_finite_at_zero_depth() {
        let caster = caster(3);
        let height = caster.projected_height(0.0, 0.0);
        assert!(height.is_finite());
        assert!(height > caster.config().screen_height);
    }

    #[test]
    fn test_projection_shrinks_with_depth_and_look() {
        let caster = caster(3);
        let near = caster.projected_height(2.0, 0.0);
        let far = caster.projected_height(10.0, 0.0);
        assert!(near > far);

        let level_view = caster.projected_height(2.0, 0.0);
        let looking_up = caster.projected_height(2.0, 0.5);
        assert!(looking_up < level_view);
    }

    #[test]
    fn test_line_of_sight_through_corridor() {
        let map = corridor_map();
        let caster = caster(3);
        // Clear view down the open part of the corridor
        assert!(caster.line_of_sight(&map, 0, Vec2::new(1.5, 1.5), Vec2::new(3.5, 1.5)));
        // The closed timed wall blocks the view past it
        assert!(!caster.line_of_sight(&map, 0, Vec2::new(1.5, 1.5), Vec2::new(5.5, 1.5)));

        // Target inside the wall cell itself is still visible
        assert!(caster.line_of_sight(&map, 0, Vec2::new(1.5, 1.5), Vec2::new(4.2, 1.5)));
    }

    #[test]
    fn test_line_of_sight_opens_with_the_wall() {
        let mut map = corridor_map();
        let caster = caster(3);
        map.activate_timer(GridPos::new(4, 1, 0));
        assert!(caster.line_of_sight(&map, 0, Vec2::new(1.5, 1.5), Vec2::new(5.5, 1.5)));
    }
}
