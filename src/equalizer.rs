use crate::{enums::Equalization, volume::Volume};

use rayon::prelude::*;
use tracing::debug;

/// Number of intensity buckets used by histogram equalization.
pub const HISTOGRAM_BUCKETS: usize = 4096;

/// Display value used when the volume holds a single intensity.
const FLAT_GRAY: u8 = 128;

/// Maps raw voxel intensities to 8-bit display values.
#[derive(Clone, Debug)]
pub struct Equalizer {
    mode: Equalization,
    min: i16,
    max: i16,
    // Per-bucket display values, present in histogram mode only.
    lut: Option<Vec<u8>>,
}

impl Equalizer {
    pub fn new(volume: &Volume, mode: Equalization) -> Self {
        let (min, max) = (volume.min(), volume.max());
        let lut = match mode {
            Equalization::Linear => None,
            Equalization::Histogram if min == max => None,
            Equalization::Histogram => Some(Self::build_lut(volume, min, max)),
        };
        Self {
            mode,
            min,
            max,
            lut,
        }
    }

    /// Linear equalization over an explicit range.
    pub fn linear(min: i16, max: i16) -> Self {
        debug_assert!(min <= max);
        Self {
            mode: Equalization::Linear,
            min,
            max,
            lut: None,
        }
    }

    pub fn mode(&self) -> Equalization {
        self.mode
    }

    pub fn range(&self) -> (i16, i16) {
        (self.min, self.max)
    }

    #[inline]
    pub fn convert(&self, raw: i16) -> u8 {
        if self.min == self.max {
            return FLAT_GRAY;
        }
        match &self.lut {
            Some(lut) => lut[self.bucket(raw)],
            None => {
                let t = (raw as f32 - self.min as f32) / (self.max as f32 - self.min as f32);
                (t.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        }
    }

    #[inline]
    fn bucket(&self, raw: i16) -> usize {
        let raw = raw.clamp(self.min, self.max);
        let offset = (raw as i64 - self.min as i64) as usize;
        let span = (self.max as i64 - self.min as i64) as usize;
        offset * (HISTOGRAM_BUCKETS - 1) / span
    }

    fn build_lut(volume: &Volume, min: i16, max: i16) -> Vec<u8> {
        let buckets = Self::linear(min, max);
        // Volume storage is always built from a Vec, so it is contiguous.
        let samples = volume
            .data()
            .as_slice()
            .expect("volume storage should be contiguous");
        let histogram = samples
            .par_chunks(64 * 1024)
            .fold(
                || vec![0u64; HISTOGRAM_BUCKETS],
                |mut counts, chunk| {
                    for &raw in chunk {
                        counts[buckets.bucket(raw)] += 1;
                    }
                    counts
                },
            )
            .reduce(
                || vec![0u64; HISTOGRAM_BUCKETS],
                |mut a, b| {
                    a.iter_mut().zip(b).for_each(|(a, b)| *a += b);
                    a
                },
            );

        let cdf: Vec<u64> = histogram
            .iter()
            .scan(0u64, |acc, &count| {
                *acc += count;
                Some(*acc)
            })
            .collect();

        // min and max are observed values, so the first and last buckets are
        // both populated and `total > cdf_min`.
        let cdf_min = cdf[0];
        let total = cdf[HISTOGRAM_BUCKETS - 1];
        let span = (total - cdf_min).max(1) as f64;
        debug!(total, cdf_min, "built histogram equalization table");

        cdf.iter()
            .map(|&c| ((c.saturating_sub(cdf_min)) as f64 / span * 255.0).round() as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Dimensions;

    fn volume_of(samples: Vec<i16>) -> Volume {
        let n = samples.len() as u32;
        Volume::new(samples, Dimensions::new(n, 1, 1)).unwrap()
    }

    #[test]
    fn linear_boundaries_and_flat_volume() {
        let eq = Equalizer::new(&volume_of(vec![-100, 0, 300]), Equalization::Linear);
        assert_eq!(eq.convert(-100), 0);
        assert_eq!(eq.convert(300), 255);
        assert_eq!(eq.convert(100), 128);
        assert_eq!(eq.convert(i16::MIN), 0);
        assert_eq!(eq.convert(i16::MAX), 255);

        let flat = Equalizer::new(&volume_of(vec![7; 4]), Equalization::Histogram);
        assert_eq!(flat.convert(7), 128);
        assert_eq!(flat.convert(-7), 128);
    }

    #[test]
    fn histogram_boundaries() {
        let eq = Equalizer::new(&volume_of(vec![0, 1, 2, 3, 1000]), Equalization::Histogram);
        assert_eq!(eq.mode(), Equalization::Histogram);
        assert_eq!(eq.convert(0), 0);
        assert_eq!(eq.convert(1000), 255);
    }

    #[test]
    fn histogram_spreads_crowded_range() {
        // most voxels sit at the bottom of the range
        let mut samples: Vec<i16> = (0..90).map(|i| i % 10).collect();
        samples.extend((0..10).map(|i| 100 * (i + 1)));
        let volume = volume_of(samples);

        let linear = Equalizer::new(&volume, Equalization::Linear);
        let histogram = Equalizer::new(&volume, Equalization::Histogram);
        assert!(histogram.convert(5) > linear.convert(5));
    }

    #[test]
    fn histogram_counts_every_chunk() {
        // sorted ramp, 200 voxels per value, spanning several parallel chunks
        let samples: Vec<i16> = (0..200_000).map(|i| (i / 200) as i16).collect();
        let eq = Equalizer::new(&volume_of(samples), Equalization::Histogram);
        assert_eq!(eq.convert(0), 0);
        assert_eq!(eq.convert(999), 255);
        // (501 * 200 - 200) / (200_000 - 200) * 255 = 127.6
        assert_eq!(eq.convert(500), 128);
    }

    #[test]
    fn both_modes_are_monotonic() {
        let samples: Vec<i16> = (0..200).map(|i| ((i * i) % 977) as i16 - 400).collect();
        let volume = volume_of(samples);
        for mode in [Equalization::Linear, Equalization::Histogram] {
            let eq = Equalizer::new(&volume, mode);
            let mut previous = 0;
            for raw in volume.min()..=volume.max() {
                let value = eq.convert(raw);
                assert!(value >= previous, "{mode:?} not monotonic at {raw}");
                previous = value;
            }
        }
    }
}
