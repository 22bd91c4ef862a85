use crate::{
    enums::{Interpolation2D, Interpolation3D},
    slice::AxisSlice,
    volume::Volume,
};

/// Cubic convolution parameter (Catmull-Rom).
const CUBIC_A: f32 = -0.5;

/// Stateless samplers over slices (2D) and volumes (3D).
///
/// All coordinates are normalized to `[0, 1)`; interpolating samplers place
/// voxel centres at `(i + 0.5) / extent` and clamp to the edge voxels.
pub struct Interpolator;

impl Interpolator {
    pub fn sample_2d(kind: Interpolation2D, slice: &AxisSlice<'_>, u: f32, v: f32) -> i16 {
        match kind {
            Interpolation2D::Nearest => Self::nearest(slice, u, v),
            Interpolation2D::Bilinear => Self::bilinear(slice, u, v),
            Interpolation2D::Bicubic => Self::bicubic(slice, u, v),
        }
    }

    pub fn sample_3d(kind: Interpolation3D, volume: &Volume, u: f32, v: f32, w: f32) -> i16 {
        match kind {
            Interpolation3D::Nearest => Self::nearest_3d(volume, u, v, w),
            Interpolation3D::Trilinear => Self::trilinear(volume, u, v, w),
        }
    }

    #[inline]
    pub fn nearest(slice: &AxisSlice<'_>, u: f32, v: f32) -> i16 {
        slice.sample_raw(u, v)
    }

    pub fn bilinear(slice: &AxisSlice<'_>, u: f32, v: f32) -> i16 {
        let (extent_u, extent_v) = slice.extent();
        let x = u * extent_u as f32 - 0.5;
        let y = v * extent_v as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let dx = x - x0;
        let dy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let v00 = slice.at_clamped(x0, y0) as f32;
        let v01 = slice.at_clamped(x0 + 1, y0) as f32;
        let v10 = slice.at_clamped(x0, y0 + 1) as f32;
        let v11 = slice.at_clamped(x0 + 1, y0 + 1) as f32;

        let v0 = v00.mul_add(1.0 - dx, v01 * dx);
        let v1 = v10.mul_add(1.0 - dx, v11 * dx);

        to_intensity(v0.mul_add(1.0 - dy, v1 * dy))
    }

    pub fn bicubic(slice: &AxisSlice<'_>, u: f32, v: f32) -> i16 {
        let (extent_u, extent_v) = slice.extent();
        let x = u * extent_u as f32 - 0.5;
        let y = v * extent_v as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let wx = cubic_weights(x - x0);
        let wy = cubic_weights(y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let mut sum = 0.0;
        for (j, wy) in wy.iter().enumerate() {
            let row: f32 = wx
                .iter()
                .enumerate()
                .map(|(i, wx)| wx * slice.at_clamped(x0 + i as i64 - 1, y0 + j as i64 - 1) as f32)
                .sum();
            sum += wy * row;
        }

        to_intensity(sum)
    }

    #[inline]
    pub fn nearest_3d(volume: &Volume, u: f32, v: f32, w: f32) -> i16 {
        let x = (u * volume.size_x() as f32).floor() as i64;
        let y = (v * volume.size_y() as f32).floor() as i64;
        let z = (w * volume.size_z() as f32).floor() as i64;
        at_clamped(volume, x, y, z)
    }

    pub fn trilinear(volume: &Volume, u: f32, v: f32, w: f32) -> i16 {
        let x = u * volume.size_x() as f32 - 0.5;
        let y = v * volume.size_y() as f32 - 0.5;
        let z = w * volume.size_z() as f32 - 0.5;

        let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
        let (dx, dy, dz) = (x - x0, y - y0, z - z0);
        let (x0, y0, z0) = (x0 as i64, y0 as i64, z0 as i64);

        let lerp_x = |y: i64, z: i64| {
            let a = at_clamped(volume, x0, y, z) as f32;
            let b = at_clamped(volume, x0 + 1, y, z) as f32;
            a.mul_add(1.0 - dx, b * dx)
        };
        let lerp_xy = |z: i64| {
            let a = lerp_x(y0, z);
            let b = lerp_x(y0 + 1, z);
            a.mul_add(1.0 - dy, b * dy)
        };

        let c0 = lerp_xy(z0);
        let c1 = lerp_xy(z0 + 1);
        to_intensity(c0.mul_add(1.0 - dz, c1 * dz))
    }
}

#[inline]
fn at_clamped(volume: &Volume, x: i64, y: i64, z: i64) -> i16 {
    let x = x.clamp(0, volume.size_x() as i64 - 1) as u32;
    let y = y.clamp(0, volume.size_y() as i64 - 1) as u32;
    let z = z.clamp(0, volume.size_z() as i64 - 1) as u32;
    volume.at(x, y, z)
}

/// Round an interpolated value back into the voxel range.
#[inline]
pub(crate) fn to_intensity(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Keys cubic convolution kernel.
#[inline]
fn cubic_kernel(t: f32) -> f32 {
    let t = t.abs();
    if t <= 1.0 {
        ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        ((CUBIC_A * t - 5.0 * CUBIC_A) * t + 8.0 * CUBIC_A) * t - 4.0 * CUBIC_A
    } else {
        0.0
    }
}

// Weights for the taps at offsets -1, 0, 1, 2 from the floor coordinate.
#[inline]
fn cubic_weights(f: f32) -> [f32; 4] {
    [
        cubic_kernel(1.0 + f),
        cubic_kernel(f),
        cubic_kernel(1.0 - f),
        cubic_kernel(2.0 - f),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enums::Axis, volume::Dimensions};
    use approx::assert_relative_eq;

    fn ramp_volume() -> Volume {
        // v(x, y, z) = 10 * x, 4x4x4
        let dim = Dimensions::new(4, 4, 4);
        let mut volume = Volume::new(vec![0; dim.voxel_count()], dim).unwrap();
        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    *volume.at_mut(x, y, z) = 10 * x as i16;
                }
            }
        }
        volume.refresh_range();
        volume
    }

    #[test]
    fn cubic_weights_partition_unity() {
        for f in [0.0, 0.1, 0.25, 0.5, 0.9] {
            let sum: f32 = cubic_weights(f).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        }
        assert_eq!(cubic_weights(0.0), [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn interpolators_reproduce_voxel_centres() {
        let volume = ramp_volume();
        let slice = AxisSlice::new(&volume, Axis::Z, 1).unwrap();
        for x in 0..4u32 {
            let u = (x as f32 + 0.5) / 4.0;
            let expected = 10 * x as i16;
            assert_eq!(Interpolator::bilinear(&slice, u, 0.5), expected);
            assert_eq!(Interpolator::bicubic(&slice, u, 0.5), expected);
            assert_eq!(Interpolator::trilinear(&volume, u, 0.3, 0.7), expected);
        }
    }

    #[test]
    fn linear_ramp_is_reproduced_between_centres() {
        let volume = ramp_volume();
        let slice = AxisSlice::new(&volume, Axis::Z, 0).unwrap();
        // halfway between x = 1 and x = 2
        assert_eq!(Interpolator::bilinear(&slice, 0.5, 0.5), 15);
        assert_eq!(Interpolator::bicubic(&slice, 0.5, 0.5), 15);
        assert_eq!(Interpolator::trilinear(&volume, 0.5, 0.5, 0.5), 15);
    }

    #[test]
    fn edges_clamp() {
        let volume = ramp_volume();
        let slice = AxisSlice::new(&volume, Axis::Z, 0).unwrap();
        assert_eq!(Interpolator::bilinear(&slice, 0.0, 0.0), 0);
        assert_eq!(Interpolator::bicubic(&slice, 0.9, 0.9), 30);
        assert_eq!(Interpolator::trilinear(&volume, 0.0, 0.0, 0.0), 0);
        assert_eq!(Interpolator::nearest_3d(&volume, 0.999, 0.0, 0.0), 30);
    }

    #[test]
    fn bicubic_result_is_clamped_to_voxel_range() {
        // a step edge overshoots with a negative-lobed kernel
        let dim = Dimensions::new(4, 1, 1);
        let volume = Volume::new(vec![i16::MIN, i16::MIN, i16::MAX, i16::MAX], dim).unwrap();
        let slice = AxisSlice::new(&volume, Axis::Z, 0).unwrap();
        let value = Interpolator::bicubic(&slice, 0.6, 0.5);
        assert!(value > 0);
        assert_eq!(Interpolator::bicubic(&slice, 0.74, 0.5), i16::MAX);
    }
}
