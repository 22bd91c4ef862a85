use crate::{
    error::VolumeError,
    volume::{Dimensions, Volume},
};

use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

/// Builds volumes from raw voxel buffers: native-endian signed 16-bit
/// samples in the volume's storage order, with no header.
pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from a byte buffer
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw samples, at least `voxel_count * 2` bytes long
    /// * `dimensions` - Voxel counts and scale factors
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::MalformedInput`] if the buffer is too short
    pub fn load_from_bytes(bytes: &[u8], dimensions: Dimensions) -> Result<Volume, VolumeError> {
        let expected = dimensions.voxel_count() * size_of::<i16>();
        if bytes.len() < expected {
            return Err(VolumeError::MalformedInput {
                expected,
                actual: bytes.len(),
            });
        }

        // The buffer carries no alignment guarantee, so copy out instead of casting.
        let samples: Vec<i16> = bytemuck::pod_collect_to_vec(&bytes[..expected]);
        debug!(bytes = expected, "decoded raw voxel buffer");

        Volume::new(samples, dimensions)
    }

    /// Load a volume from any reader yielding a raw buffer
    pub fn load_from_reader(
        reader: &mut impl Read,
        dimensions: Dimensions,
    ) -> Result<Volume, VolumeError> {
        let expected = dimensions.voxel_count() * size_of::<i16>();
        let mut bytes = Vec::with_capacity(expected);
        reader
            .take(expected as u64)
            .read_to_end(&mut bytes)?;

        Self::load_from_bytes(&bytes, dimensions)
    }

    /// Load a volume from a raw file on disk
    pub fn load_from_file(
        path: impl AsRef<Path>,
        dimensions: Dimensions,
    ) -> Result<Volume, VolumeError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading raw volume");
        let mut file = File::open(path)?;

        Self::load_from_reader(&mut file, dimensions)
    }
}
