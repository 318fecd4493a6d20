//! The particle field engine: lifecycle, pointer input and the
//! update-and-render cycle.

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::pointer::PointerCell;
use crate::render::{GlowDisk, Surface};
use crate::{FieldConfig, Particle, Particles, SurfaceSize};

/// One animated particle backdrop.
///
/// Owned by a single host view and shared with whatever thread drives its
/// frames. Nothing is allocated until [`start`](Self::start) succeeds, and
/// [`stop`](Self::stop) throws everything away again.
pub struct ParticleField {
    config: FieldConfig,
    pointer: PointerCell,
    state: Mutex<Option<Particles>>,
    frames_rendered: AtomicU64,
}

impl ParticleField {
    pub fn new(config: FieldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pointer: PointerCell::new(),
            state: Mutex::new(None),
            frames_rendered: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn start(&self, size: SurfaceSize) -> Result<()> {
        self.start_with_rng(size, &mut rand::thread_rng())
    }

    /// Like [`start`](Self::start) but samples the particles from `rng`.
    pub fn start_with_rng<R: Rng>(&self, size: SurfaceSize, rng: &mut R) -> Result<()> {
        if !size.is_measured() {
            warn!(width = size.width, height = size.height, "surface not measured, field not started");
            return Err(Error::UnmeasuredSurface {
                width: size.width,
                height: size.height,
            });
        }

        let particles = Particles::spawn(&self.config, size, rng);

        let mut state = self.state.lock();
        if state.is_some() {
            debug!("restarting a running field from scratch");
        }
        self.pointer.reset();
        self.frames_rendered.store(0, Relaxed);
        *state = Some(particles);

        debug!(
            count = self.config.count,
            width = size.width,
            height = size.height,
            "particle field started"
        );
        Ok(())
    }

    /// Records a pointer sample already in surface-local coordinates.
    pub fn on_pointer_move(&self, x: f32, y: f32) {
        self.pointer.store(x, y);
    }

    /// Records a screen-space pointer sample for a surface whose top-left
    /// corner sits at `origin`.
    pub fn on_screen_pointer_move(&self, screen: cgmath::Vector2<f32>, origin: cgmath::Vector2<f32>) {
        self.pointer.store_screen(screen, origin);
    }

    pub fn pointer(&self) -> cgmath::Vector2<f32> {
        self.pointer.load()
    }

    /// Runs one update-and-render cycle. Returns `false`, without touching
    /// the surface, when the field isn't running.
    pub fn frame<S: Surface + ?Sized>(&self, surface: &mut S) -> bool {
        let mut state = self.state.lock();
        let Some(particles) = state.as_mut() else {
            return false;
        };

        surface.clear();

        for _ in 0..self.config.steps_per_frame {
            particles.update(self.pointer.load());
        }

        for particle in &particles.current_particles {
            surface.fill_glow_disk(&GlowDisk::for_particle(particle, &self.config.glow, self.config.color));
        }

        self.frames_rendered.fetch_add(1, Relaxed);
        true
    }

    /// Cancels the animation and discards every particle.
    ///
    /// Waits for an in-flight [`frame`](Self::frame) to finish, so no cycle
    /// runs after this returns. Safe to call repeatedly or before `start`.
    pub fn stop(&self) {
        let stopped = self.state.lock().take();
        if let Some(particles) = stopped {
            info!(
                count = particles.len(),
                frames = self.frames_rendered.load(Relaxed),
                "particle field stopped"
            );
        }
    }

    /// Moves a running field onto a surface of a new size.
    ///
    /// Positions are wrapped into the new bounds; nothing is resampled.
    /// An unmeasured size is refused and the old bounds are kept.
    pub fn resize(&self, size: SurfaceSize) -> Result<()> {
        if !size.is_measured() {
            return Err(Error::UnmeasuredSurface {
                width: size.width,
                height: size.height,
            });
        }

        if let Some(particles) = self.state.lock().as_mut() {
            if particles.bounds != size {
                debug!(width = size.width, height = size.height, "particle field resized");
                particles.resize(size);
            }
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().is_some()
    }

    pub fn particle_count(&self) -> usize {
        self.state.lock().as_ref().map_or(0, Particles::len)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Relaxed)
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.state.lock().as_ref().map(|particles| particles.bounds)
    }

    pub fn snapshot(&self) -> Vec<Particle> {
        self.state
            .lock()
            .as_ref()
            .map(|particles| particles.current_particles.clone())
            .unwrap_or_default()
    }
}

impl Drop for ParticleField {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSurface;
    use rand::{SeedableRng, rngs::StdRng};

    fn small_config() -> FieldConfig {
        FieldConfig {
            count: 16,
            ..FieldConfig::default()
        }
    }

    fn started(size: SurfaceSize) -> ParticleField {
        let field = ParticleField::new(small_config()).unwrap();
        field.start_with_rng(size, &mut StdRng::seed_from_u64(1)).unwrap();
        field
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = FieldConfig {
            damping: 0.0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            ParticleField::new(config),
            Err(Error::InvalidConfig { field: "damping", .. })
        ));
    }

    #[test]
    fn unmeasured_surface_does_not_start() {
        let field = ParticleField::new(small_config()).unwrap();
        for size in [
            SurfaceSize::new(0.0, 100.0),
            SurfaceSize::new(100.0, 0.0),
            SurfaceSize::new(-5.0, 10.0),
            SurfaceSize::new(f32::NAN, 10.0),
        ] {
            assert!(matches!(field.start(size), Err(Error::UnmeasuredSurface { .. })));
        }

        let mut surface = RecordingSurface::new();
        assert!(!field.is_running());
        assert_eq!(field.particle_count(), 0);
        assert!(!field.frame(&mut surface));
        assert_eq!(surface.clears, 0);
    }

    #[test]
    fn start_resets_pointer_and_allocates() {
        let field = ParticleField::new(small_config()).unwrap();
        field.on_pointer_move(5.0, 5.0);
        field.start(SurfaceSize::new(200.0, 100.0)).unwrap();

        assert!(field.is_running());
        assert_eq!(field.particle_count(), 16);
        assert_eq!(field.pointer(), crate::POINTER_SENTINEL);
        assert_eq!(field.surface_size(), Some(SurfaceSize::new(200.0, 100.0)));
    }

    #[test]
    fn frame_clears_then_draws_every_particle() {
        let field = started(SurfaceSize::new(300.0, 300.0));
        let mut surface = RecordingSurface::new();

        assert!(field.frame(&mut surface));
        assert!(field.frame(&mut surface));

        assert_eq!(surface.clears, 2);
        assert_eq!(surface.disks.len(), 16);
        assert_eq!(field.frames_rendered(), 2);
        let snapshot = field.snapshot();
        for (disk, particle) in surface.disks.iter().zip(&snapshot) {
            assert_eq!(disk.center, particle.position);
            assert_eq!(disk.center_alpha, particle.opacity);
        }
    }

    #[test]
    fn steps_per_frame_runs_several_updates() {
        let config = FieldConfig {
            count: 1,
            speed: 0.0,
            steps_per_frame: 3,
            ..FieldConfig::default()
        };
        let field = ParticleField::new(config).unwrap();
        field.start(SurfaceSize::new(100.0, 100.0)).unwrap();
        let before = field.snapshot()[0];

        // A pointer just to the right pulls for three steps.
        field.on_pointer_move(before.position.x + 10.0, before.position.y);
        field.frame(&mut RecordingSurface::new());

        let after = field.snapshot()[0];
        let single_step = field.config().influence_strength * (140.0 / 150.0);
        assert!(after.velocity.x > single_step * field.config().damping);
    }

    #[test]
    fn stop_is_final_and_idempotent() {
        let field = ParticleField::new(small_config()).unwrap();
        field.stop();

        field.start(SurfaceSize::new(100.0, 100.0)).unwrap();
        let mut surface = RecordingSurface::new();
        field.frame(&mut surface);
        field.stop();
        field.stop();

        for _ in 0..10 {
            assert!(!field.frame(&mut surface));
        }
        assert_eq!(field.frames_rendered(), 1);
        assert_eq!(surface.clears, 1);
        assert!(field.snapshot().is_empty());
        assert_eq!(field.surface_size(), None);
    }

    #[test]
    fn restart_begins_from_scratch() {
        let field = started(SurfaceSize::new(100.0, 100.0));
        field.frame(&mut RecordingSurface::new());
        field.stop();

        field.start_with_rng(SurfaceSize::new(50.0, 50.0), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(field.frames_rendered(), 0);
        assert_eq!(field.particle_count(), 16);
        assert!(
            field
                .snapshot()
                .iter()
                .all(|p| p.position.x < 50.0 && p.position.y < 50.0)
        );
    }

    #[test]
    fn resize_wraps_into_new_bounds() {
        let field = started(SurfaceSize::new(400.0, 400.0));
        field.resize(SurfaceSize::new(100.0, 80.0)).unwrap();

        assert_eq!(field.surface_size(), Some(SurfaceSize::new(100.0, 80.0)));
        for p in field.snapshot() {
            assert!((0.0..100.0).contains(&p.position.x));
            assert!((0.0..80.0).contains(&p.position.y));
        }

        assert!(field.resize(SurfaceSize::new(0.0, 80.0)).is_err());
        assert_eq!(field.surface_size(), Some(SurfaceSize::new(100.0, 80.0)));
    }

    #[test]
    fn resize_on_stopped_field_is_a_no_op() {
        let field = ParticleField::new(small_config()).unwrap();
        field.resize(SurfaceSize::new(10.0, 10.0)).unwrap();
        assert!(!field.is_running());
    }

    #[test]
    fn screen_pointer_is_made_local() {
        let field = started(SurfaceSize::new(100.0, 100.0));
        field.on_screen_pointer_move(cgmath::vec2(130.0, 90.0), cgmath::vec2(100.0, 40.0));
        assert_eq!(field.pointer(), cgmath::vec2(30.0, 50.0));
    }
}
