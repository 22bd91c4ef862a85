use std::ops::BitOr;

use glam::{Mat4, Vec2, Vec3};
use tracing::trace;

/// Rotations smaller than this (in degrees) are dropped.
const MIN_ANGLE_DEGREES: f32 = 1e-4;

/// Pointer buttons held during a drag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonMask(u8);

impl ButtonMask {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);
    pub const SECONDARY: Self = Self(1 << 1);
    pub const MIDDLE: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ButtonMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Turns pointer drags over a `width` x `height` widget into rotations of a
/// view matrix, by mapping pointer positions onto a virtual hemisphere.
#[derive(Clone, Debug)]
pub struct ArcballController {
    width: u32,
    height: u32,
    current_point: Vec3,
    view: Mat4,
}

impl ArcballController {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            current_point: Vec3::Z,
            view: Self::baseline_view(),
        }
    }

    /// Default orientation: 90 degrees about the screen's horizontal axis.
    pub fn baseline_view() -> Mat4 {
        Mat4::from_axis_angle(Vec3::X, 90f32.to_radians())
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn current_point(&self) -> Vec3 {
        self.current_point
    }

    pub fn reset(&mut self) {
        self.view = Self::baseline_view();
        self.current_point = Vec3::Z;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Map a widget-local pixel position onto the unit hemisphere facing the
    /// viewer. Points outside the sphere's silhouette land on its rim.
    pub fn map_to_sphere(&self, point: Vec2) -> Vec3 {
        let half = Vec2::new(self.width as f32, self.height as f32) * 0.5;
        let radius = half.min_element();
        let offset = point - half;

        let z2 = radius * radius - offset.length_squared();
        let z = if z2 > 0.0 { z2.sqrt() } else { 0.0 };

        offset.extend(z).try_normalize().unwrap_or(Vec3::Z)
    }

    pub fn press(&mut self, position: Vec2) {
        self.current_point = self.map_to_sphere(position);
    }

    /// Apply the rotation from the last pointer position to `position`.
    ///
    /// Returns `true` when the view changed and should be redrawn. Only
    /// drags with the primary button held rotate.
    pub fn drag(&mut self, position: Vec2, buttons: ButtonMask) -> bool {
        if !buttons.contains(ButtonMask::PRIMARY) {
            return false;
        }

        let next = self.map_to_sphere(position);
        let rotation = rotation_between(next, self.current_point);
        self.current_point = next;

        match rotation {
            Some((angle, axis)) => {
                self.view = Mat4::from_axis_angle(axis, angle.to_radians()) * self.view;
                true
            }
            None => {
                trace!(?position, "arcball drag without rotation");
                false
            }
        }
    }
}

/// Angle in degrees and unit axis of the arcball rotation between two points
/// on the unit sphere: `acos(p1 . p0)` about `p1 x p0`.
///
/// Returns `None` when the points coincide or are antipodal, since the axis
/// is undefined.
pub fn rotation_between(p1: Vec3, p0: Vec3) -> Option<(f32, Vec3)> {
    let angle = p1.dot(p0).clamp(-1.0, 1.0).acos().to_degrees();
    if angle < MIN_ANGLE_DEGREES {
        return None;
    }
    let axis = p1.cross(p0).try_normalize()?;
    Some((angle, axis))
}
