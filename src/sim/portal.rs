//! Portal pair, slots, and projectiles
//!
//! An actor owns exactly two portal slots. A slot is replaced, never
//! edited: firing a new projectile of a color deactivates that color's
//! previous portal before the new one exists. Links between the two
//! portals are slot handles rather than mutual references, so breaking
//! one side structurally clears the other.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::map::{Cell, CellKind, GridMap, GridPos};
use crate::consts::{PROJECTILE_LIFETIME_TICKS, PROJECTILE_SPEED};
use crate::{normalize_angle, unit_vector};

/// The two portal slots an actor may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalColor {
    Primary,
    Secondary,
}

impl PortalColor {
    pub const BOTH: [PortalColor; 2] = [PortalColor::Primary, PortalColor::Secondary];

    pub fn other(self) -> Self {
        match self {
            PortalColor::Primary => PortalColor::Secondary,
            PortalColor::Secondary => PortalColor::Primary,
        }
    }

    fn index(self) -> usize {
        match self {
            PortalColor::Primary => 0,
            PortalColor::Secondary => 1,
        }
    }
}

/// One placed portal. Presence in a slot is what "active" means; removal
/// is deactivation.
#[derive(Debug, Clone, Copy)]
pub struct Portal {
    pub pos: Vec2,
    pub floor: i32,
    /// Outward face normal, one of the four grid axes, pointing back
    /// toward where the shot came from
    pub normal_angle: f32,
    /// Handle to the paired slot, if linked
    pub linked: Option<PortalColor>,
}

impl Portal {
    /// Heading assigned to an actor on exit. Equal to the outward normal,
    /// so the actor always leaves the surface rather than walking back
    /// into it.
    #[inline]
    pub fn exit_angle(&self) -> f32 {
        self.normal_angle
    }
}

/// A projectile's resolved wall hit
#[derive(Debug, Clone, Copy)]
pub struct ImpactEvent {
    pub pos: Vec2,
    pub floor: i32,
    pub normal_angle: f32,
}

/// Outcome of one projectile step
#[derive(Debug, Clone, Copy)]
pub enum ProjectileStatus {
    Flying,
    /// Lifetime ran out, left the map, or was absorbed by a closed
    /// TimedWall; no portal is created
    Expired,
    Impact(ImpactEvent),
}

/// A traveling portal marker
#[derive(Debug, Clone, Copy)]
pub struct PortalProjectile {
    pub pos: Vec2,
    pub floor: i32,
    pub angle: f32,
    pub color: PortalColor,
    lifetime: u32,
}

impl PortalProjectile {
    pub fn new(pos: Vec2, floor: i32, angle: f32, color: PortalColor) -> Self {
        Self {
            pos,
            floor,
            angle,
            color,
            lifetime: PROJECTILE_LIFETIME_TICKS,
        }
    }

    /// Advance one tick and classify the destination cell.
    ///
    /// Solid and Stairs stop the shot and produce an impact. An open
    /// TimedWall is flown through; a closed one absorbs the shot with no
    /// event — closed timed walls are not portal surfaces.
    pub fn step(&mut self, map: &GridMap) -> ProjectileStatus {
        self.pos += unit_vector(self.angle) * PROJECTILE_SPEED;
        let cell_pos = GridPos::from_world(self.pos, self.floor);
        match map.cell(cell_pos) {
            Cell::Void => ProjectileStatus::Expired,
            Cell::Kind(CellKind::Solid) | Cell::Kind(CellKind::Stairs) => {
                ProjectileStatus::Impact(ImpactEvent {
                    pos: self.pos,
                    floor: self.floor,
                    normal_angle: self.face_normal(map, cell_pos),
                })
            }
            Cell::Kind(CellKind::TimedWall) => {
                if map.timer_open(cell_pos) {
                    self.fly_on()
                } else {
                    ProjectileStatus::Expired
                }
            }
            Cell::Kind(CellKind::Empty) => self.fly_on(),
        }
    }

    fn fly_on(&mut self) -> ProjectileStatus {
        if self.lifetime == 0 {
            ProjectileStatus::Expired
        } else {
            self.lifetime -= 1;
            ProjectileStatus::Flying
        }
    }

    /// Outward normal of the struck face: probe the two axis neighbors
    /// the shot came through, dominant travel axis first, and take the
    /// first traversable one. When neither probe neighbor is traversable
    /// (a corner pocket), fall back to the reversed travel direction
    /// snapped to the nearest axis.
    fn face_normal(&self, map: &GridMap, cell: GridPos) -> f32 {
        let (cos_a, sin_a) = (self.angle.cos(), self.angle.sin());

        let x_side = if cos_a > 0.0 { cell.x - 1 } else { cell.x + 1 };
        let x_probe = (
            GridPos::new(x_side, cell.y, cell.floor),
            if cos_a > 0.0 { PI } else { 0.0 },
        );
        let y_side = if sin_a > 0.0 { cell.y - 1 } else { cell.y + 1 };
        let y_probe = (
            GridPos::new(cell.x, y_side, cell.floor),
            if sin_a > 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 },
        );

        let probes = if cos_a.abs() >= sin_a.abs() {
            [x_probe, y_probe]
        } else {
            [y_probe, x_probe]
        };
        for (pos, normal) in probes {
            if map.is_traversable(pos) {
                return normal;
            }
        }

        let back = normalize_angle(self.angle + PI);
        normalize_angle((back / FRAC_PI_2).round() * FRAC_PI_2)
    }
}

/// The fixed two-entry portal table
#[derive(Debug, Clone, Default)]
pub struct PortalSlots {
    slots: [Option<Portal>; 2],
}

impl PortalSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, color: PortalColor) -> Option<&Portal> {
        self.slots[color.index()].as_ref()
    }

    /// Iterate occupied slots
    pub fn iter(&self) -> impl Iterator<Item = (PortalColor, &Portal)> {
        PortalColor::BOTH
            .into_iter()
            .filter_map(|c| self.get(c).map(|p| (c, p)))
    }

    /// Resolve an impact into this color's slot: the old portal (if any)
    /// is dropped and its partner unlinked, then the new portal links to
    /// the other slot when that slot is occupied.
    pub fn place(&mut self, color: PortalColor, event: ImpactEvent) {
        if let Some(old) = self.slots[color.index()].take() {
            if let Some(partner) = old.linked {
                if let Some(p) = self.slots[partner.index()].as_mut() {
                    p.linked = None;
                }
            }
        }

        let other = color.other();
        let link = self.slots[other.index()].is_some();
        if let Some(p) = self.slots[other.index()].as_mut() {
            p.linked = Some(color);
        }

        self.slots[color.index()] = Some(Portal {
            pos: event.pos,
            floor: event.floor,
            normal_angle: event.normal_angle,
            linked: link.then_some(other),
        });
        log::debug!(
            "{color:?} portal placed at ({:.2}, {:.2}) floor {}, linked: {link}",
            event.pos.x,
            event.pos.y,
            event.floor
        );
    }

    /// Drop both portals (level reset)
    pub fn clear(&mut self) {
        self.slots = [None, None];
    }
}
