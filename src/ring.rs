use bevy::prelude::*;
use std::f32::consts::TAU;

/// Fixed circle of equidistant slots in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub radius: f32,
    pub slot_count: usize,
}

impl RingGeometry {
    pub fn new(radius: f32, slot_count: usize) -> Self {
        Self { radius, slot_count }
    }

    fn slots(&self) -> i64 {
        self.slot_count.max(1) as i64
    }

    pub fn angle_step(&self) -> f32 {
        TAU / self.slots() as f32
    }

    /// Position of `slot` on the ring. Any integer is accepted; slots
    /// congruent modulo the slot count land on the same point.
    pub fn position_for(&self, slot: i64) -> Vec3 {
        let angle = self.angle_step() * slot.rem_euclid(self.slots()) as f32;
        Vec3::new(self.radius * angle.cos(), 0.0, self.radius * angle.sin())
    }

    /// Resting position of the item at ordering `index` (slots are 1-based).
    pub fn home_position(&self, index: usize) -> Vec3 {
        self.position_for(index as i64 + 1)
    }
}
