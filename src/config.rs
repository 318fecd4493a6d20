//! Field configuration.
//!
//! A `FieldConfig` is plain data: every host screen hands the engine its own
//! literal values, and a TOML file can override any of them.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed interval `[min, max]` sampled uniformly at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Soft glow drawn around each particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    /// Radius of the gradient as a multiple of the particle radius.
    pub extent: f32,
    /// Fraction of the particle opacity left at `extent * radius`.
    pub falloff: f32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            extent: 2.0,
            falloff: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub count: usize,
    /// Full per-axis span of the initial velocity, drawn from `[-speed/2, speed/2]`.
    pub speed: f32,
    pub radius: ValueRange,
    pub opacity: ValueRange,
    pub influence_radius: f32,
    pub influence_strength: f32,
    pub damping: f32,
    /// Physics steps run for every rendered frame.
    pub steps_per_frame: u32,
    pub glow: GlowConfig,
    pub color: [u8; 3],
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 250,
            speed: 0.4,
            radius: ValueRange::new(0.4, 2.2),
            opacity: ValueRange::new(0.3, 1.0),
            influence_radius: 150.0,
            influence_strength: 0.025,
            damping: 0.992,
            steps_per_frame: 1,
            glow: GlowConfig::default(),
            color: [255, 255, 255],
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

impl FieldConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(invalid("count", "at least one particle is required"));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(invalid("speed", format!("{} is not a finite non-negative span", self.speed)));
        }
        if !(self.radius.min > 0.0 && self.radius.min <= self.radius.max && self.radius.max.is_finite()) {
            return Err(invalid(
                "radius",
                format!("{:?} must satisfy 0 < min <= max", self.radius),
            ));
        }
        if !(self.opacity.min > 0.0 && self.opacity.min <= self.opacity.max && self.opacity.max <= 1.0) {
            return Err(invalid(
                "opacity",
                format!("{:?} must satisfy 0 < min <= max <= 1", self.opacity),
            ));
        }
        if !(self.influence_radius > 0.0 && self.influence_radius.is_finite()) {
            return Err(invalid(
                "influence_radius",
                format!("{} must be positive", self.influence_radius),
            ));
        }
        if !self.influence_strength.is_finite() {
            return Err(invalid("influence_strength", "must be finite"));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(invalid("damping", format!("{} is outside (0, 1)", self.damping)));
        }
        if self.steps_per_frame == 0 {
            return Err(invalid("steps_per_frame", "must be at least 1"));
        }
        if !(self.glow.extent >= 1.0 && self.glow.extent.is_finite()) {
            return Err(invalid("glow.extent", "the gradient must cover the whole disk"));
        }
        if !(0.0..=1.0).contains(&self.glow.falloff) {
            return Err(invalid("glow.falloff", format!("{} is outside [0, 1]", self.glow.falloff)));
        }
        Ok(())
    }
}
