//! Entity snapshots.
//!
//! Entities live in the host world; the pipeline only ever sees copies of
//! their state plus the id needed to remove them again.

use core::fmt;

use crate::pos::Vec3;
use crate::tag::TagCompound;

/// Host-assigned entity id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// The state needed to recreate an entity: its type and metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseEntity {
    pub type_id: String,
    pub tag: Option<TagCompound>,
}

impl BaseEntity {
    #[must_use]
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            tag: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: TagCompound) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Where an entity is and which way it faces.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Location {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Location {
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Unit vector this location faces.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let yaw = f64::from(self.yaw).to_radians();
        let pitch = f64::from(self.pitch).to_radians();
        Vec3::new(
            -pitch.cos() * yaw.sin(),
            -pitch.sin(),
            pitch.cos() * yaw.cos(),
        )
    }

    /// The same location facing `direction`.
    #[must_use]
    pub fn facing(self, direction: Vec3) -> Self {
        if direction.length() == 0.0 {
            return self;
        }
        let horizontal = direction.x.hypot(direction.z);
        let yaw = (-direction.x).atan2(direction.z).to_degrees();
        let pitch = (-direction.y).atan2(horizontal).to_degrees();
        Self {
            position: self.position,
            yaw: yaw as f32,
            pitch: pitch as f32,
        }
    }
}

/// A snapshot of a live entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub location: Location,
    pub state: BaseEntity,
    /// Players and similar entities must never be duplicated by a paste.
    pub pasteable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_round_trips_direction() {
        let location = Location {
            position: Vec3::ZERO,
            yaw: 90.0,
            pitch: 0.0,
        };
        let turned = Location::at(Vec3::ZERO).facing(location.direction());
        assert!((turned.yaw - 90.0).abs() < 1e-3);
        assert!(turned.pitch.abs() < 1e-3);
    }
}
