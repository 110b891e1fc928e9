//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable update order every tick
//! - No rendering or platform dependencies

pub mod collect;
pub mod level;
pub mod map;
pub mod player;
pub mod portal;
pub mod tick;
pub mod wall;

pub use collect::{Collectable, CollectableKind};
pub use level::{ButtonDef, CollectableDef, Level, LevelError, SpawnPoint};
pub use map::{Cell, CellKind, GridMap, GridPos, WallTimer};
pub use player::Player;
pub use portal::{
    ImpactEvent, Portal, PortalColor, PortalProjectile, PortalSlots, ProjectileStatus,
};
pub use tick::{Simulation, TickInput};
pub use wall::Button;
