//! # Voxel view library
//!
//! This crate renders signed 16-bit voxel volumes as 2D slice images and as
//! a freely rotatable 3D projection.

//!
//! A [`Volume`] is built from a raw buffer of samples plus its dimensions.
//! It can be sliced along its three axes, each exposed to users as a named
//! view:
//!  - Front (looking down Z)
//!  - Top (looking down Y)
//!  - Side (looking down X)
//!
//!  Slices are sampled with nearest, bilinear or bicubic interpolation; 3D
//!  views are ray cast through the volume with nearest or trilinear
//!  sampling and composited either as a maximum intensity projection or by
//!  front-to-back alpha blending. Raw intensities are mapped to display
//!  values linearly over the volume's range or by histogram equalization.
//!  Rendering is split across rows with rayon.
//!
//!  The 3D view orientation is driven by an [`ArcballController`] that turns
//!  pointer drags into rotations of the view matrix.
//!
//! # Examples
//!
//! ## Rendering the centre slice of a raw volume
//!
//! ```no_run
//! # use voxel_view::{Axis, Dimensions, Interpolation2D, RenderOptions, VolumeLoader, VolumeRenderer};
//! let volume = VolumeLoader::load_from_file("head.raw", Dimensions::new(256, 256, 113))
//!     .expect("should have loaded the raw volume");
//! let renderer = VolumeRenderer::new(&volume, RenderOptions::default());
//! let image = renderer
//!     .render_slice(
//!         Axis::Z,
//!         volume.size_z() / 2,
//!         Interpolation2D::Bilinear,
//!         256,
//!         256,
//!     )
//!     .expect("should have rendered the centre slice");
//! image.save("result.png");
//! ```
//!
//! ## Rotating the 3D view
//!
//! ```no_run
//! # use voxel_view::{ArcballController, ButtonMask, Dimensions, RenderOptions, Volume, VolumeRenderer};
//! # use glam::Vec2;
//! # let dim = Dimensions::new(8, 8, 8);
//! # let volume = Volume::new(vec![0; dim.voxel_count()], dim).unwrap();
//! let renderer = VolumeRenderer::new(&volume, RenderOptions::default());
//! let mut arcball = ArcballController::new(300, 300);
//! arcball.press(Vec2::new(150.0, 150.0));
//! if arcball.drag(Vec2::new(180.0, 140.0), ButtonMask::PRIMARY) {
//!     let frame = renderer.draw_3d(300, 300, arcball.view());
//! }
//! ```

pub mod arcball;
pub mod enums;
pub mod equalizer;
pub mod error;
pub mod interpolator;
pub mod renderer;
pub mod slice;
pub mod volume;
pub mod volume_loader;

pub use arcball::{ArcballController, ButtonMask};
pub use enums::{Axis, Compositing, Equalization, Interpolation2D, Interpolation3D, SliceView};
pub use equalizer::Equalizer;
pub use error::VolumeError;
pub use renderer::{RenderOptions, VolumeRenderer};
pub use slice::AxisSlice;
pub use volume::{Dimensions, Volume};
pub use volume_loader::VolumeLoader;
