use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

use cgmath::Vector2;

/// Where the pointer is parked before the first sample arrives.
/// Every particle is infinitely far from it, so it exerts no pull.
pub const POINTER_SENTINEL: Vector2<f32> = Vector2 {
    x: f32::INFINITY,
    y: f32::INFINITY,
};

/// Latest pointer sample in surface-local coordinates.
///
/// Both axes are packed into a single atomic word so a reader never sees the
/// x of one sample paired with the y of another.
#[derive(Debug)]
pub struct PointerCell(AtomicU64);

fn pack(v: Vector2<f32>) -> u64 {
    (u64::from(v.x.to_bits()) << 32) | u64::from(v.y.to_bits())
}

fn unpack(bits: u64) -> Vector2<f32> {
    Vector2::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

impl PointerCell {
    pub fn new() -> Self {
        Self(AtomicU64::new(pack(POINTER_SENTINEL)))
    }

    pub fn store(&self, x: f32, y: f32) {
        self.0.store(pack(Vector2::new(x, y)), Relaxed);
    }

    /// Stores a screen-space sample relative to the surface's top-left corner.
    pub fn store_screen(&self, screen: Vector2<f32>, origin: Vector2<f32>) {
        let local = screen - origin;
        self.store(local.x, local.y);
    }

    pub fn load(&self) -> Vector2<f32> {
        unpack(self.0.load(Relaxed))
    }

    pub fn reset(&self) {
        self.0.store(pack(POINTER_SENTINEL), Relaxed);
    }
}

impl Default for PointerCell {
    fn default() -> Self {
        Self::new()
    }
}
