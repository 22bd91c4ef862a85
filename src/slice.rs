use crate::{enums::Axis, error::VolumeError, volume::Volume};

/// A read-only plane of a [`Volume`] at a fixed index along one axis.
///
/// Local coordinates map onto the volume as
/// - `Axis::X`: (u, v) -> (index, u, v)
/// - `Axis::Y`: (u, v) -> (u, index, v)
/// - `Axis::Z`: (u, v) -> (u, v, index)
#[derive(Clone, Copy, Debug)]
pub struct AxisSlice<'a> {
    volume: &'a Volume,
    axis: Axis,
    index: u32,
}

impl<'a> AxisSlice<'a> {
    pub fn new(volume: &'a Volume, axis: Axis, index: u32) -> Result<Self, VolumeError> {
        let size = volume.axis_size(axis);
        if index >= size {
            return Err(VolumeError::SliceIndexOutOfRange { axis, index, size });
        }
        Ok(Self {
            volume,
            axis,
            index,
        })
    }

    pub fn volume(&self) -> &'a Volume {
        self.volume
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Number of voxels along the local (u, v) axes.
    pub fn extent(&self) -> (u32, u32) {
        let (u_axis, v_axis) = self.axis.plane();
        (self.volume.axis_size(u_axis), self.volume.axis_size(v_axis))
    }

    /// Voxel at integer local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `(u, v)` is outside [`AxisSlice::extent`].
    #[inline]
    pub fn at(&self, u: u32, v: u32) -> i16 {
        match self.axis {
            Axis::X => self.volume.at(self.index, u, v),
            Axis::Y => self.volume.at(u, self.index, v),
            Axis::Z => self.volume.at(u, v, self.index),
        }
    }

    /// Voxel at signed local coordinates, clamped to the slice edges.
    #[inline]
    pub fn at_clamped(&self, u: i64, v: i64) -> i16 {
        let (extent_u, extent_v) = self.extent();
        let u = u.clamp(0, extent_u as i64 - 1) as u32;
        let v = v.clamp(0, extent_v as i64 - 1) as u32;
        self.at(u, v)
    }

    /// Zero-order lookup at normalized coordinates in `[0, 1)`.
    #[inline]
    pub fn sample_raw(&self, u: f32, v: f32) -> i16 {
        let (extent_u, extent_v) = self.extent();
        self.at_clamped(
            (u * extent_u as f32).floor() as i64,
            (v * extent_v as f32).floor() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Dimensions;

    fn coded_volume() -> Volume {
        // value encodes its coordinate as x*100 + y*10 + z
        let dim = Dimensions::new(4, 3, 2);
        let mut volume = Volume::new(vec![0; dim.voxel_count()], dim).unwrap();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    *volume.at_mut(x, y, z) = (x * 100 + y * 10 + z) as i16;
                }
            }
        }
        volume.refresh_range();
        volume
    }

    #[test]
    fn plane_mapping_per_axis() {
        let volume = coded_volume();

        let z = AxisSlice::new(&volume, Axis::Z, 1).unwrap();
        assert_eq!(z.extent(), (4, 3));
        assert_eq!(z.at(3, 2), 321);

        let y = AxisSlice::new(&volume, Axis::Y, 2).unwrap();
        assert_eq!(y.extent(), (4, 2));
        assert_eq!(y.at(1, 1), 121);

        let x = AxisSlice::new(&volume, Axis::X, 3).unwrap();
        assert_eq!(x.extent(), (3, 2));
        assert_eq!(x.at(2, 0), 320);
    }

    #[test]
    fn index_is_validated() {
        let volume = coded_volume();
        let err = AxisSlice::new(&volume, Axis::Z, 2).unwrap_err();
        assert!(matches!(
            err,
            VolumeError::SliceIndexOutOfRange {
                axis: Axis::Z,
                index: 2,
                size: 2
            }
        ));
    }

    #[test]
    fn sample_raw_snaps_and_clamps() {
        let volume = coded_volume();
        let slice = AxisSlice::new(&volume, Axis::Z, 0).unwrap();
        assert_eq!(slice.sample_raw(0.0, 0.0), 0);
        assert_eq!(slice.sample_raw(0.26, 0.34), 110);
        assert_eq!(slice.sample_raw(1.0, 1.0), 320);
        assert_eq!(slice.sample_raw(-0.5, 0.0), 0);
    }
}
