use crate::enums::Axis;
use crate::error::VolumeError;

use ndarray::Array1;
use tracing::debug;

/// Voxel counts and per-axis voxel scale factors of a volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub scale_x: u32,
    pub scale_y: u32,
    pub scale_z: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            size_x: 0,
            size_y: 0,
            size_z: 0,
            scale_x: 1,
            scale_y: 1,
            scale_z: 1,
        }
    }
}

impl Dimensions {
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        Self {
            size_x,
            size_y,
            size_z,
            ..Default::default()
        }
    }

    pub fn with_scale(self, scale_x: u32, scale_y: u32, scale_z: u32) -> Self {
        Self {
            scale_x,
            scale_y,
            scale_z,
            ..self
        }
    }

    pub fn voxel_count(&self) -> usize {
        self.size_x as usize * self.size_y as usize * self.size_z as usize
    }
}

/// A dense grid of signed 16-bit voxels.
///
/// The voxel at `(x, y, z)` lives at flat index `x + size_y * (y + size_x * z)`.
/// The x/y roles in that formula are swapped with respect to a plain
/// row-major layout; raw volumes in this format depend on it, so the layout
/// is kept as-is and volumes it cannot address are rejected at construction.
#[derive(Clone, Debug)]
pub struct Volume {
    dim: Dimensions,
    data: Array1<i16>,
    min: i16,
    max: i16,
}

impl Volume {
    /// Build a volume from decoded samples. Samples beyond the declared
    /// voxel count are ignored.
    ///
    /// # Errors
    ///
    /// Fails if any axis is empty, if `data` holds fewer samples than the
    /// dimensions require, or if `size_y > size_x`.
    pub fn new(mut data: Vec<i16>, dim: Dimensions) -> Result<Self, VolumeError> {
        Self::validate_dimensions(&dim)?;

        let count = dim.voxel_count();
        if data.len() < count {
            return Err(VolumeError::MalformedInput {
                expected: count * size_of::<i16>(),
                actual: data.len() * size_of::<i16>(),
            });
        }
        data.truncate(count);

        let (min, max) = Self::min_max(data.iter());
        debug!(
            size_x = dim.size_x,
            size_y = dim.size_y,
            size_z = dim.size_z,
            min,
            max,
            "volume constructed"
        );

        Ok(Self {
            dim,
            data: Array1::from_vec(data),
            min,
            max,
        })
    }

    fn validate_dimensions(dim: &Dimensions) -> Result<(), VolumeError> {
        if dim.size_x == 0 || dim.size_y == 0 || dim.size_z == 0 {
            return Err(VolumeError::EmptyVolume);
        }
        // The largest flat index is (sx-1) + sy*(sy-1) + sx*sy*(sz-1), which
        // stays below sx*sy*sz exactly when sy <= sx.
        if dim.size_y > dim.size_x {
            return Err(VolumeError::UnaddressableLayout {
                size_x: dim.size_x,
                size_y: dim.size_y,
                size_z: dim.size_z,
            });
        }
        Ok(())
    }

    // Single pass over all samples; the volume is never empty.
    fn min_max<'a>(samples: impl Iterator<Item = &'a i16>) -> (i16, i16) {
        samples.fold((i16::MAX, i16::MIN), |(min, max), &v| (min.min(v), max.max(v)))
    }

    pub fn dim(&self) -> &Dimensions {
        &self.dim
    }

    pub fn size_x(&self) -> u32 {
        self.dim.size_x
    }

    pub fn size_y(&self) -> u32 {
        self.dim.size_y
    }

    pub fn size_z(&self) -> u32 {
        self.dim.size_z
    }

    pub fn axis_size(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.dim.size_x,
            Axis::Y => self.dim.size_y,
            Axis::Z => self.dim.size_z,
        }
    }

    pub fn axis_scale(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.dim.scale_x,
            Axis::Y => self.dim.scale_y,
            Axis::Z => self.dim.scale_z,
        }
    }

    /// Physical extent of an axis: voxel count times voxel scale.
    pub fn axis_size_scaled(&self, axis: Axis) -> u32 {
        self.axis_scale(axis) * self.axis_size(axis)
    }

    #[inline]
    fn index(&self, x: u32, y: u32, z: u32) -> usize {
        assert!(
            x < self.dim.size_x && y < self.dim.size_y && z < self.dim.size_z,
            "voxel ({x}, {y}, {z}) out of bounds for {}x{}x{} volume",
            self.dim.size_x,
            self.dim.size_y,
            self.dim.size_z
        );
        let (sx, sy) = (self.dim.size_x as usize, self.dim.size_y as usize);
        x as usize + sy * (y as usize + sx * z as usize)
    }

    /// Read a voxel.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the volume.
    #[inline]
    pub fn at(&self, x: u32, y: u32, z: u32) -> i16 {
        self.data[self.index(x, y, z)]
    }

    /// Mutable access to a voxel. The cached `min`/`max` are not updated;
    /// call [`Volume::refresh_range`] after a batch of writes.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the volume.
    pub fn at_mut(&mut self, x: u32, y: u32, z: u32) -> &mut i16 {
        let index = self.index(x, y, z);
        &mut self.data[index]
    }

    /// Recompute the cached intensity range.
    pub fn refresh_range(&mut self) {
        let (min, max) = Self::min_max(self.data.iter());
        self.min = min;
        self.max = max;
    }

    pub fn min(&self) -> i16 {
        self.min
    }

    pub fn max(&self) -> i16 {
        self.max
    }

    /// Samples in storage order.
    pub fn data(&self) -> &Array1<i16> {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &i16> {
        self.data.iter()
    }
}
