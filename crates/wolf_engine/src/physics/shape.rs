//! Collision shapes and overlap tests

use crate::foundation::math::{rotate, Pose2, Vec2};

/// Collider geometry in the collider's own frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Circle around the origin
    Circle {
        /// Radius in world units
        radius: f32,
    },
    /// Rectangle centred on the origin
    Rect {
        /// Half width and half height
        half_extents: Vec2,
    },
}

impl Shape {
    /// Circle shape
    pub fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }

    /// Rectangle shape from full width and height
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Rect {
            half_extents: Vec2::new(width * 0.5, height * 0.5),
        }
    }

    /// Radius of the smallest origin-centred circle containing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Circle { radius } => *radius,
            Self::Rect { half_extents } => half_extents.norm(),
        }
    }

    /// Whether two placed shapes overlap
    pub fn overlaps(&self, pose: &Pose2, other: &Self, other_pose: &Pose2) -> bool {
        // Broad phase
        let reach = self.bounding_radius() + other.bounding_radius();
        if (other_pose.position - pose.position).norm_squared() > reach * reach {
            return false;
        }

        match (self, other) {
            (Self::Circle { radius: a }, Self::Circle { radius: b }) => {
                (other_pose.position - pose.position).norm() <= a + b
            }
            (Self::Rect { half_extents }, Self::Circle { radius }) => {
                rect_circle(pose, *half_extents, other_pose.position, *radius)
            }
            (Self::Circle { radius }, Self::Rect { half_extents }) => {
                rect_circle(other_pose, *half_extents, pose.position, *radius)
            }
            (Self::Rect { half_extents: a }, Self::Rect { half_extents: b }) => {
                rect_rect(pose, *a, other_pose, *b)
            }
        }
    }
}

fn rect_circle(rect: &Pose2, half_extents: Vec2, center: Vec2, radius: f32) -> bool {
    let local = rotate(center - rect.position, -rect.rotation);
    let closest = Vec2::new(
        local.x.clamp(-half_extents.x, half_extents.x),
        local.y.clamp(-half_extents.y, half_extents.y),
    );
    (local - closest).norm_squared() <= radius * radius
}

fn corners(pose: &Pose2, half_extents: Vec2) -> [Vec2; 4] {
    [
        Vec2::new(-half_extents.x, -half_extents.y),
        Vec2::new(half_extents.x, -half_extents.y),
        Vec2::new(half_extents.x, half_extents.y),
        Vec2::new(-half_extents.x, half_extents.y),
    ]
    .map(|c| pose.position + rotate(c, pose.rotation))
}

/// Separating axis test over the four edge normals
fn rect_rect(a: &Pose2, a_half: Vec2, b: &Pose2, b_half: Vec2) -> bool {
    let a_corners = corners(a, a_half);
    let b_corners = corners(b, b_half);
    let axes = [
        rotate(Vec2::x(), a.rotation),
        rotate(Vec2::y(), a.rotation),
        rotate(Vec2::x(), b.rotation),
        rotate(Vec2::y(), b.rotation),
    ];

    axes.iter().all(|axis| {
        let project = |points: &[Vec2; 4]| {
            points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
                let d = p.dot(axis);
                (lo.min(d), hi.max(d))
            })
        };
        let (a_min, a_max) = project(&a_corners);
        let (b_min, b_max) = project(&b_corners);
        a_min <= b_max && b_min <= a_max
    })
}
