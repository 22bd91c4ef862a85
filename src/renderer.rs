use crate::{
    enums::{Axis, Compositing, Equalization, Interpolation2D, Interpolation3D, SliceView},
    equalizer::Equalizer,
    error::VolumeError,
    interpolator::{Interpolator, to_intensity},
    slice::AxisSlice,
    volume::Volume,
};

use glam::{Mat4, Vec3};
use image::{GrayImage, ImageBuffer};
use rayon::prelude::*;
use tracing::debug;
use web_time::Instant;

/// Value of pixels whose ray misses the volume.
pub const BACKGROUND: u8 = 0;

/// Largest side accepted by [`VolumeRenderer::view_size`].
pub const MAX_VIEW_SIDE: u32 = 1 << 14;

/// Accumulated opacity at which alpha blending stops marching.
const OPACITY_CUTOFF: f32 = 0.99;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Sampler used along 3D rays
    pub volume_interpolation: Interpolation3D,
    pub compositing: Compositing,
    pub equalization: Equalization,
    /// Ray steps across the diameter of the volume's bounding sphere
    pub sample_count: u32,
    /// Alpha-blend opacity per unit of ray length for a full-intensity sample
    pub opacity: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            volume_interpolation: Interpolation3D::default(),
            compositing: Compositing::default(),
            equalization: Equalization::default(),
            sample_count: 256,
            opacity: 0.05,
        }
    }
}

/// Produces slice images and 3D projections of a borrowed [`Volume`].
pub struct VolumeRenderer<'a> {
    volume: &'a Volume,
    equalizer: Equalizer,
    options: RenderOptions,
}

impl<'a> VolumeRenderer<'a> {
    pub fn new(volume: &'a Volume, options: RenderOptions) -> Self {
        Self {
            volume,
            equalizer: Equalizer::new(volume, options.equalization),
            options,
        }
    }

    pub fn volume(&self) -> &'a Volume {
        self.volume
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn equalizer(&self) -> &Equalizer {
        &self.equalizer
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        if options.equalization != self.options.equalization {
            self.equalizer = Equalizer::new(self.volume, options.equalization);
        }
        self.options = options;
    }

    /// Render the slice at `index` along `axis` into a `width` x `height`
    /// image. Pixel `(i, j)` samples the slice at `(i / width, j / height)`.
    pub fn render_slice(
        &self,
        axis: Axis,
        index: u32,
        interpolation: Interpolation2D,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, VolumeError> {
        Self::validate_output_size(width, height)?;
        let slice = AxisSlice::new(self.volume, axis, index)?;
        let start = Instant::now();

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|j| {
                let v = j as f32 / height as f32;
                (0..width)
                    .map(|i| {
                        let u = i as f32 / width as f32;
                        let raw = Interpolator::sample_2d(interpolation, &slice, u, v);
                        self.equalizer.convert(raw)
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        debug!(
            %axis,
            index,
            ?interpolation,
            width,
            height,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "rendered slice"
        );
        Self::to_image(width, height, pixel_data)
    }

    /// Render a named view with an aspect-correct size: the scaled extents
    /// of the two in-plane axes, multiplied by `zoom`.
    pub fn render_view(
        &self,
        view: SliceView,
        index: u32,
        interpolation: Interpolation2D,
        zoom: f32,
    ) -> Result<GrayImage, VolumeError> {
        let axis = view.axis();
        let (width, height) = self.view_size(axis, zoom)?;
        self.render_slice(axis, index, interpolation, width, height)
    }

    /// Output size used by [`VolumeRenderer::render_view`].
    ///
    /// A `zoom` that is not finite and positive, or that makes either side 0
    /// or larger than [`MAX_VIEW_SIDE`], is rejected.
    pub fn view_size(&self, axis: Axis, zoom: f32) -> Result<(u32, u32), VolumeError> {
        let (u_axis, v_axis) = axis.plane();
        let scaled = |axis| (self.volume.axis_size_scaled(axis) as f64 * zoom as f64).round();
        let (width, height) = (scaled(u_axis), scaled(v_axis));

        let fits = |side: f64| side.is_finite() && side <= MAX_VIEW_SIDE as f64;
        if !(zoom.is_finite() && zoom > 0.0 && fits(width) && fits(height)) {
            let clamp = |side: f64| if fits(side) { side.max(0.0) as u32 } else { u32::MAX };
            return Err(VolumeError::InvalidOutputSize {
                width: clamp(width),
                height: clamp(height),
            });
        }
        Self::validate_output_size(width as u32, height as u32)?;
        Ok((width as u32, height as u32))
    }

    /// Orthographic ray-cast projection of the volume seen through `view`.
    pub fn draw_3d(&self, width: u32, height: u32, view: &Mat4) -> Result<GrayImage, VolumeError> {
        Self::validate_output_size(width, height)?;
        if self.options.sample_count == 0 {
            return Err(VolumeError::InvalidSampleCount);
        }
        let camera = Camera::new(self.volume, view, width, height);
        let step = 2.0 * camera.radius / self.options.sample_count as f32;
        let start = Instant::now();

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|j| {
                (0..width)
                    .map(|i| {
                        let (origin, dir) = camera.ray(i, j);
                        match camera.clip(origin, dir) {
                            Some(span) => {
                                let raw = self.composite(&camera, origin, dir, span, step);
                                self.equalizer.convert(raw)
                            }
                            None => BACKGROUND,
                        }
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        debug!(
            width,
            height,
            samples = self.options.sample_count,
            compositing = ?self.options.compositing,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "rendered 3d view"
        );
        Self::to_image(width, height, pixel_data)
    }

    /// Continuous pixel position of a voxel centre in a `draw_3d` image.
    pub fn project_voxel(
        &self,
        view: &Mat4,
        width: u32,
        height: u32,
        voxel: (u32, u32, u32),
    ) -> (f32, f32) {
        let camera = Camera::new(self.volume, view, width, height);
        let scale = camera.extent / camera.voxels;
        let centre = (Vec3::new(voxel.0 as f32, voxel.1 as f32, voxel.2 as f32) + 0.5) * scale
            - camera.half;
        camera.project(centre)
    }

    fn composite(
        &self,
        camera: &Camera,
        origin: Vec3,
        dir: Vec3,
        (t0, t1): (f32, f32),
        step: f32,
    ) -> i16 {
        let kind = self.options.volume_interpolation;
        let steps = ((t1 - t0) / step).ceil().max(1.0) as u32;
        let samples = (0..steps).map(|k| {
            let t = (t0 + (k as f32 + 0.5) * step).min(t1);
            let uvw = (origin + dir * t + camera.half) / camera.extent;
            Interpolator::sample_3d(kind, self.volume, uvw.x, uvw.y, uvw.z)
        });

        match self.options.compositing {
            Compositing::MaximumIntensity => samples.max().unwrap_or(self.volume.min()),
            Compositing::AlphaBlend => {
                let (min, max) = (self.volume.min() as f32, self.volume.max() as f32);
                let range = max - min;
                let mut accumulated = 0.0;
                let mut transmittance = 1.0;
                for raw in samples {
                    let raw = raw as f32;
                    let t = if range > 0.0 { (raw - min) / range } else { 0.0 };
                    let alpha = (t * self.options.opacity * step).clamp(0.0, 1.0);
                    accumulated += transmittance * alpha * raw;
                    transmittance *= 1.0 - alpha;
                    if transmittance <= 1.0 - OPACITY_CUTOFF {
                        break;
                    }
                }
                to_intensity(accumulated + transmittance * min)
            }
        }
    }

    fn validate_output_size(width: u32, height: u32) -> Result<(), VolumeError> {
        if width == 0 || height == 0 {
            return Err(VolumeError::InvalidOutputSize { width, height });
        }
        Ok(())
    }

    fn to_image(width: u32, height: u32, pixel_data: Vec<u8>) -> Result<GrayImage, VolumeError> {
        ImageBuffer::from_raw(width, height, pixel_data)
            .ok_or(VolumeError::InvalidOutputSize { width, height })
    }
}

/// Orthographic camera fitted around the volume's bounding box.
///
/// The box is centred at the origin. Camera space is right `+X`, up `+Y`,
/// forward `-Z`; `view` maps it into volume space. The image plane is a
/// square of side `2 * radius` fitted to the shorter image side.
struct Camera {
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    voxels: Vec3,
    extent: Vec3,
    half: Vec3,
    radius: f32,
    pixel: f32,
    width: f32,
    height: f32,
}

impl Camera {
    fn new(volume: &Volume, view: &Mat4, width: u32, height: u32) -> Self {
        let voxels = Vec3::new(
            volume.size_x() as f32,
            volume.size_y() as f32,
            volume.size_z() as f32,
        );
        let extent = Vec3::new(
            volume.axis_size_scaled(Axis::X) as f32,
            volume.axis_size_scaled(Axis::Y) as f32,
            volume.axis_size_scaled(Axis::Z) as f32,
        );
        let half = extent * 0.5;
        let radius = half.length();

        Self {
            right: view.transform_vector3(Vec3::X),
            up: view.transform_vector3(Vec3::Y),
            forward: view.transform_vector3(Vec3::NEG_Z),
            voxels,
            extent,
            half,
            radius,
            pixel: 2.0 * radius / width.min(height) as f32,
            width: width as f32,
            height: height as f32,
        }
    }

    fn ray(&self, i: u32, j: u32) -> (Vec3, Vec3) {
        let cx = (i as f32 + 0.5 - self.width * 0.5) * self.pixel;
        let cy = (self.height * 0.5 - (j as f32 + 0.5)) * self.pixel;
        let origin = self.right * cx + self.up * cy - self.forward * self.radius;
        (origin, self.forward)
    }

    fn project(&self, point: Vec3) -> (f32, f32) {
        let cx = point.dot(self.right);
        let cy = point.dot(self.up);
        (
            cx / self.pixel + self.width * 0.5,
            self.height * 0.5 - cy / self.pixel,
        )
    }

    /// Slab test against the bounding box; returns the entry and exit ray
    /// parameters.
    fn clip(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let (mut t0, mut t1) = (f32::NEG_INFINITY, f32::INFINITY);
        for axis in 0..3 {
            let (o, d, h) = (origin[axis], dir[axis], self.half[axis]);
            if d.abs() < f32::EPSILON {
                if o < -h || o > h {
                    return None;
                }
                continue;
            }
            let (a, b) = ((-h - o) / d, (h - o) / d);
            t0 = t0.max(a.min(b));
            t1 = t1.min(a.max(b));
        }
        (t0 <= t1 && t1 >= 0.0).then_some((t0.max(0.0), t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Dimensions;

    fn cube(size: u32, value: i16) -> Volume {
        let dim = Dimensions::new(size, size, size);
        Volume::new(vec![value; dim.voxel_count()], dim).unwrap()
    }

    #[test]
    fn rejects_degenerate_requests() {
        let volume = cube(2, 1);
        let renderer = VolumeRenderer::new(&volume, RenderOptions::default());
        assert!(matches!(
            renderer.render_slice(Axis::Z, 0, Interpolation2D::Nearest, 0, 4),
            Err(VolumeError::InvalidOutputSize { .. })
        ));
        assert!(matches!(
            renderer.draw_3d(4, 0, &Mat4::IDENTITY),
            Err(VolumeError::InvalidOutputSize { .. })
        ));
        assert!(matches!(
            renderer.render_slice(Axis::X, 2, Interpolation2D::Nearest, 4, 4),
            Err(VolumeError::SliceIndexOutOfRange { .. })
        ));

        let mut renderer = renderer;
        renderer.set_options(RenderOptions {
            sample_count: 0,
            ..Default::default()
        });
        assert!(matches!(
            renderer.draw_3d(4, 4, &Mat4::IDENTITY),
            Err(VolumeError::InvalidSampleCount)
        ));
    }

    #[test]
    fn unusable_zoom_is_rejected() {
        let volume = cube(4, 1);
        let renderer = VolumeRenderer::new(&volume, RenderOptions::default());
        assert_eq!(renderer.view_size(Axis::Z, 2.0).unwrap(), (8, 8));
        for zoom in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, -1.0, 1e30, 0.01] {
            assert!(
                matches!(
                    renderer.view_size(Axis::Z, zoom),
                    Err(VolumeError::InvalidOutputSize { .. })
                ),
                "zoom {zoom}"
            );
            assert!(matches!(
                renderer.render_view(SliceView::Front, 0, Interpolation2D::Nearest, zoom),
                Err(VolumeError::InvalidOutputSize { .. })
            ));
        }
    }

    #[test]
    fn clip_misses_and_hits() {
        let volume = cube(4, 0);
        let camera = Camera::new(&volume, &Mat4::IDENTITY, 8, 8);
        let hit = camera.clip(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(hit, Some((8.0, 12.0)));
        assert_eq!(camera.clip(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z), None);
        assert_eq!(camera.clip(Vec3::new(0.0, 0.0, -10.0), Vec3::NEG_Z), None);
    }

    #[test]
    fn corner_pixels_of_wide_image_are_background() {
        let volume = cube(4, 100);
        let renderer = VolumeRenderer::new(&volume, RenderOptions::default());
        let image = renderer.draw_3d(64, 16, &Mat4::IDENTITY).unwrap();
        // flat volume equalizes to mid gray where rays hit it
        assert_eq!(image.get_pixel(32, 8).0[0], 128);
        assert_eq!(image.get_pixel(0, 0).0[0], BACKGROUND);
        assert_eq!(image.get_pixel(63, 15).0[0], BACKGROUND);
    }

    #[test]
    fn equalization_change_rebuilds_equalizer() {
        let volume = cube(2, 3);
        let mut renderer = VolumeRenderer::new(&volume, RenderOptions::default());
        assert_eq!(renderer.equalizer().mode(), Equalization::Linear);
        renderer.set_options(RenderOptions {
            equalization: Equalization::Histogram,
            ..Default::default()
        });
        assert_eq!(renderer.equalizer().mode(), Equalization::Histogram);
        assert_eq!(renderer.equalizer().convert(3), 128);
    }
}
