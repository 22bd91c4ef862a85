use thiserror::Error;

use crate::enums::Axis;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("Malformed input: expected {expected} bytes of voxel data, got {actual}")]
    MalformedInput { expected: usize, actual: usize },

    #[error(
        "Malformed input: a {size_x}x{size_y}x{size_z} volume is not addressable by the voxel layout (size_y must not exceed size_x)"
    )]
    UnaddressableLayout {
        size_x: u32,
        size_y: u32,
        size_z: u32,
    },

    #[error("Invalid argument: volume dimensions must be non-zero")]
    EmptyVolume,

    #[error("Invalid argument: slice index {index} out of range for axis {axis} of size {size}")]
    SliceIndexOutOfRange { axis: Axis, index: u32, size: u32 },

    #[error("Invalid argument: output size {width}x{height} must be non-zero")]
    InvalidOutputSize { width: u32, height: u32 },

    #[error("Invalid argument: ray sample count must be non-zero")]
    InvalidSampleCount,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
