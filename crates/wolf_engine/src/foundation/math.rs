//! Math utilities and types
//!
//! Provides the 2D math types used by transforms, physics and rendering.
//! Angles are radians, positive rotation is counter-clockwise.

pub use nalgebra::{Rotation2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Position and rotation of something in a 2D frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2 {
    /// Position in the frame
    pub position: Vec2,

    /// Rotation in radians
    pub rotation: f32,
}

impl Default for Pose2 {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
        }
    }
}

impl Pose2 {
    /// Create a new pose
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Identity pose (origin, no rotation)
    pub fn identity() -> Self {
        Self::default()
    }

    /// Express a pose given relative to `self` in the frame `self` lives in.
    pub fn compose(&self, local: &Pose2) -> Pose2 {
        Pose2 {
            position: self.position + rotate(local.position, self.rotation),
            rotation: self.rotation + local.rotation,
        }
    }

    /// Express a pose given in the outer frame relative to `self`.
    ///
    /// Inverse of [`Pose2::compose`]: `parent.compose(&parent.localize(&p)) == p`.
    pub fn localize(&self, global: &Pose2) -> Pose2 {
        Pose2 {
            position: rotate(global.position - self.position, -self.rotation),
            rotation: global.rotation - self.rotation,
        }
    }
}

/// Rotate a vector counter-clockwise by `angle` radians
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Rotation2::new(angle) * v
}

/// Unit vector pointing along `angle`
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector measured from the positive X axis
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Normalize a vector, returning zero for the zero vector
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length = v.norm();
    if length == 0.0 {
        Vec2::zeros()
    } else {
        v / length
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), constants::HALF_PI);
        assert_relative_eq!(v, Vec2::new(0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_compose_then_localize() {
        let parent = Pose2::new(Vec2::new(3.0, -2.0), 0.7);
        let global = Pose2::new(Vec2::new(-4.0, 9.5), 2.1);

        let local = parent.localize(&global);
        let back = parent.compose(&local);

        assert_relative_eq!(back.position, global.position, epsilon = EPSILON);
        assert_relative_eq!(back.rotation, global.rotation, epsilon = EPSILON);
    }

    #[test]
    fn test_angle_helpers() {
        let v = from_angle(1.2);
        assert_relative_eq!(v.norm(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(angle_of(v), 1.2, epsilon = EPSILON);
        assert_eq!(normalize_or_zero(Vec2::zeros()), Vec2::zeros());
    }
}
