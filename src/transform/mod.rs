//! Transform modes, scale-normalization policy, and snapshot types.
//!
//! The engine in [`engine`] coordinates selection and mode state; the types
//! here are the small value vocabulary it shares with the rest of the crate.

pub mod engine;

use glam::Vec3;

/// Componentwise tolerance below which a scale vector counts as uniform.
pub const UNIFORM_SCALE_TOLERANCE: f32 = 0.001;

/// Active manipulation mode. Exactly one is active at any time; `None`
/// means no gizmo is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    Position,
    Rotation,
    Scale,
    #[default]
    None,
}

impl TransformMode {
    pub fn is_active(self) -> bool {
        self != TransformMode::None
    }
}

/// How a non-uniform scale is collapsed to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMethod {
    Average,
    Max,
    Min,
}

/// What happens when a non-uniformly scaled node enters rotation mode.
/// Fixed at controller construction.
#[derive(Debug, Clone, Copy)]
pub struct ScaleNormalization {
    /// Replace the node's scale with a uniform value before rotation.
    pub auto_normalize: bool,
    pub method: NormalizeMethod,
    /// Emit a warning when the policy fires.
    pub warn: bool,
}

impl Default for ScaleNormalization {
    fn default() -> Self {
        Self {
            auto_normalize: false,
            method: NormalizeMethod::Average,
            warn: true,
        }
    }
}

/// Immutable copy of a node's transform at the moment of a change.
/// Consumers never see a live node reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSnapshot {
    pub name: String,
    pub position: Vec3,
    /// Euler angles, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// True when any axis pair differs by more than [`UNIFORM_SCALE_TOLERANCE`].
pub fn is_non_uniform(scale: Vec3) -> bool {
    (scale.x - scale.y).abs() > UNIFORM_SCALE_TOLERANCE
        || (scale.y - scale.z).abs() > UNIFORM_SCALE_TOLERANCE
        || (scale.x - scale.z).abs() > UNIFORM_SCALE_TOLERANCE
}

/// Collapse a scale vector to one uniform value per the given method.
pub fn uniform_scale(scale: Vec3, method: NormalizeMethod) -> f32 {
    match method {
        NormalizeMethod::Average => (scale.x + scale.y + scale.z) / 3.0,
        NormalizeMethod::Max => scale.x.max(scale.y).max(scale.z),
        NormalizeMethod::Min => scale.x.min(scale.y).min(scale.z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_scale_methods() {
        let scale = Vec3::new(2.0, 4.0, 6.0);
        assert!((uniform_scale(scale, NormalizeMethod::Average) - 4.0).abs() < 1e-6);
        assert!((uniform_scale(scale, NormalizeMethod::Max) - 6.0).abs() < 1e-6);
        assert!((uniform_scale(scale, NormalizeMethod::Min) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn tolerance_boundary() {
        // 0.0005 difference is within tolerance, 0.002 is not
        assert!(!is_non_uniform(Vec3::new(1.0005, 1.0, 1.0)));
        assert!(is_non_uniform(Vec3::new(1.002, 1.0, 1.0)));
    }

    #[test]
    fn unit_scale_is_uniform() {
        assert!(!is_non_uniform(Vec3::ONE));
        assert!(is_non_uniform(Vec3::new(1.0, 2.0, 1.0)));
    }

    #[test]
    fn default_mode_is_none() {
        assert_eq!(TransformMode::default(), TransformMode::None);
        assert!(!TransformMode::None.is_active());
        assert!(TransformMode::Position.is_active());
    }
}
