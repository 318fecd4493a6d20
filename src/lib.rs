pub mod config;
pub mod error;
pub mod field;
pub mod frame_loop;
pub mod pointer;
pub mod render;
pub mod screens;

pub use config::{FieldConfig, GlowConfig, ValueRange};
pub use error::{Error, Result};
pub use field::ParticleField;
pub use pointer::{POINTER_SENTINEL, PointerCell};
pub use render::{GlowDisk, PainterSurface, RecordingSurface, Surface};
pub use screens::Screen;

use cgmath::prelude::*;
use rand::Rng;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: cgmath::Vector2<f32>,
    pub velocity: cgmath::Vector2<f32>,
    pub radius: f32,
    pub opacity: f32,
}

/// Width and height of the drawing surface, in its own pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A surface that hasn't been laid out yet reports zero (or garbage) extents.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone)]
pub struct Particles {
    pub bounds: SurfaceSize,
    pub current_particles: Vec<Particle>,
    pub previous_particles: Vec<Particle>,
    pub influence_radius: f32,
    pub influence_strength: f32,
    pub damping: f32,
}

/// Folds a coordinate back onto `[0, extent)`.
fn wrap(coord: f32, extent: f32) -> f32 {
    let wrapped = coord.rem_euclid(extent);
    // rem_euclid of a tiny negative rounds up to `extent` itself.
    if wrapped >= extent { 0.0 } else { wrapped }
}

impl Particles {
    /// An empty field with the motion parameters of `config`.
    pub fn new(config: &FieldConfig, bounds: SurfaceSize) -> Self {
        Self {
            bounds,
            current_particles: Vec::with_capacity(config.count),
            previous_particles: Vec::with_capacity(config.count),
            influence_radius: config.influence_radius,
            influence_strength: config.influence_strength,
            damping: config.damping,
        }
    }

    /// Samples `config.count` particles uniformly over the surface and the
    /// configured attribute ranges.
    pub fn spawn<R: Rng>(config: &FieldConfig, bounds: SurfaceSize, rng: &mut R) -> Self {
        let half_speed = config.speed * 0.5;
        let mut particles = Self::new(config, bounds);

        particles.current_particles = (0..config.count)
            .map(|_| Particle {
                position: cgmath::vec2(
                    rng.gen_range(0.0..bounds.width),
                    rng.gen_range(0.0..bounds.height),
                ),
                velocity: cgmath::vec2(
                    rng.gen_range(-half_speed..=half_speed),
                    rng.gen_range(-half_speed..=half_speed),
                ),
                radius: rng.gen_range(config.radius.min..=config.radius.max),
                opacity: rng.gen_range(config.opacity.min..=config.opacity.max),
            })
            .collect();

        particles
    }

    pub fn len(&self) -> usize {
        self.current_particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_particles.is_empty()
    }

    /// Linear falloff: 1 at the pointer, 0 at `influence_radius` and beyond.
    pub fn calculate_force(&self, distance: f32) -> f32 {
        if distance > 0.0 && distance < self.influence_radius {
            (self.influence_radius - distance) / self.influence_radius
        } else {
            0.0
        }
    }

    fn apply_boundary_conditions(&self, particle: &mut Particle) {
        macro_rules! handle_boundary {
            ($coord:expr, $extent:expr) => {
                if $coord < 0.0 || $coord >= $extent {
                    $coord = wrap($coord, $extent);
                }
            };
        }

        handle_boundary!(particle.position.x, self.bounds.width);
        handle_boundary!(particle.position.y, self.bounds.height);
    }

    /// Advances every particle by one step toward (or past) `pointer`.
    pub fn update(&mut self, pointer: cgmath::Vector2<f32>) {
        std::mem::swap(&mut self.current_particles, &mut self.previous_particles);

        self.current_particles = self
            .previous_particles
            .par_iter()
            .map(|particle| self.update_single_particle(*particle, pointer))
            .collect();
    }

    fn update_single_particle(&self, mut particle: Particle, pointer: cgmath::Vector2<f32>) -> Particle {
        let relative_position = pointer - particle.position;
        let distance = relative_position.magnitude();

        // Zero distance has no direction to pull in, so it is skipped.
        let force = self.calculate_force(distance);
        if force > 0.0 {
            let acceleration = force * self.influence_strength;
            particle.velocity += relative_position / distance * acceleration;
        }

        particle.position += particle.velocity;
        self.apply_boundary_conditions(&mut particle);

        particle.velocity *= self.damping;
        particle
    }

    /// Adopts new surface bounds, re-wrapping positions into them.
    pub fn resize(&mut self, bounds: SurfaceSize) {
        self.bounds = bounds;
        let (width, height) = (bounds.width, bounds.height);
        self.current_particles.par_iter_mut().for_each(|particle| {
            particle.position.x = wrap(particle.position.x, width);
            particle.position.y = wrap(particle.position.y, height);
        });
    }
}
