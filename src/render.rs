//! Drawing particles onto a host surface.
//!
//! The engine only talks to [`Surface`]; the host decides what a disk turns
//! into. [`PainterSurface`] draws through egui, [`RecordingSurface`] keeps the
//! disks in memory.

use eframe::egui::{self, Color32, Mesh, Painter, Rect, Shape};

use crate::{GlowConfig, Particle};

/// A filled disk shaded by a linear radial gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowDisk {
    pub center: cgmath::Vector2<f32>,
    pub radius: f32,
    /// Alpha at the center, the particle's own opacity.
    pub center_alpha: f32,
    /// Alpha where the gradient ends, `extent * radius` from the center.
    pub tail_alpha: f32,
    pub gradient_radius: f32,
    pub color: [u8; 3],
}

impl GlowDisk {
    pub fn for_particle(particle: &Particle, glow: &GlowConfig, color: [u8; 3]) -> Self {
        Self {
            center: particle.position,
            radius: particle.radius,
            center_alpha: particle.opacity,
            tail_alpha: particle.opacity * glow.falloff,
            gradient_radius: particle.radius * glow.extent,
            color,
        }
    }

    pub fn alpha_at(&self, distance: f32) -> f32 {
        let t = (distance / self.gradient_radius).clamp(0.0, 1.0);
        self.center_alpha + (self.tail_alpha - self.center_alpha) * t
    }

    /// Alpha on the visible rim of the disk.
    pub fn edge_alpha(&self) -> f32 {
        self.alpha_at(self.radius)
    }
}

pub trait Surface {
    /// Wipes the previous frame.
    fn clear(&mut self);

    fn fill_glow_disk(&mut self, disk: &GlowDisk);
}

pub struct PainterSurface<'a> {
    painter: &'a Painter,
    rect: Rect,
    background: Color32,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, rect: Rect, background: Color32) -> Self {
        Self {
            painter,
            rect,
            background,
        }
    }

    fn rgba(color: [u8; 3], alpha: f32) -> Color32 {
        let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(color[0], color[1], color[2], alpha)
    }
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self) {
        self.painter.rect_filled(self.rect, 0.0, self.background);
    }

    // Triangle fan: colors interpolate linearly from the center vertex to the
    // rim, which is exactly the radial gradient clipped to the disk.
    fn fill_glow_disk(&mut self, disk: &GlowDisk) {
        let center = self.rect.min + egui::vec2(disk.center.x, disk.center.y);
        let segments = ((disk.radius * 6.0).ceil() as u32).clamp(12, 32);
        let rim = Self::rgba(disk.color, disk.edge_alpha());

        let mut mesh = Mesh::default();
        mesh.colored_vertex(center, Self::rgba(disk.color, disk.center_alpha));
        for i in 0..segments {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            mesh.colored_vertex(center + egui::vec2(angle.cos(), angle.sin()) * disk.radius, rim);
        }
        for i in 0..segments {
            mesh.add_triangle(0, 1 + i, 1 + (i + 1) % segments);
        }

        self.painter.add(Shape::Mesh(mesh));
    }
}

/// Keeps the last frame's disks in memory.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub clears: u64,
    pub disks: Vec<GlowDisk>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.clears += 1;
        self.disks.clear();
    }

    fn fill_glow_disk(&mut self, disk: &GlowDisk) {
        self.disks.push(*disk);
    }
}
