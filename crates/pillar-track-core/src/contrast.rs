//! Automatic contrast/brightness normalization.

use crate::threshold::histogram;
use crate::{GrayImage, GrayImageView};
use log::debug;
use serde::{Deserialize, Serialize};

/// Linear intensity rescaling, `out = clamp(gain·in + offset, 0, 255)`.
///
/// Computed once per image (or once per tracking run) and then reused
/// unchanged for every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContrastParams {
    pub gain: f32,
    pub offset: f32,
}

impl ContrastParams {
    /// Parameters that leave the image unchanged.
    pub fn identity() -> Self {
        Self {
            gain: 1.0,
            offset: 0.0,
        }
    }

    /// Estimate gain/offset from a clipped cumulative histogram.
    ///
    /// `clip_fraction` of the total pixel mass (split evenly between the
    /// two tails) is treated as outliers. The low cutoff is the first bin
    /// whose cumulative mass reaches the clip; the high cutoff walks down
    /// from 255 but never below bin 10. Gain maps the surviving range onto
    /// [0, 255]. A histogram with no usable spread (including perfectly
    /// uniform images) yields the identity instead of dividing by zero.
    pub fn from_image(src: &GrayImageView<'_>, clip_fraction: f32) -> Self {
        if src.is_empty() {
            return Self::identity();
        }

        let hist = histogram(src);
        let total = src.data.len() as f64;
        let clip = total * clip_fraction as f64 / 2.0;

        let mut cumulative = [0f64; 256];
        let mut running = 0f64;
        for (acc, &count) in cumulative.iter_mut().zip(hist.iter()) {
            running += count as f64;
            *acc = running;
        }

        let mut minimum_gray = 0usize;
        while minimum_gray < 255 && cumulative[minimum_gray] < clip {
            minimum_gray += 1;
        }

        let mut maximum_gray = 255usize;
        while maximum_gray > 10 && cumulative[maximum_gray] >= total - clip {
            maximum_gray -= 1;
        }

        if maximum_gray <= minimum_gray {
            debug!("histogram spread is empty ({minimum_gray}..{maximum_gray}), keeping identity contrast");
            return Self::identity();
        }

        let gain = 255.0 / (maximum_gray - minimum_gray) as f32;
        let offset = -(minimum_gray as f32) * gain;
        Self { gain, offset }
    }

    /// Apply to every pixel, saturating to [0, 255].
    pub fn apply(&self, src: &GrayImageView<'_>) -> GrayImage {
        let data = src
            .data
            .iter()
            .map(|&v| (self.gain * v as f32 + self.offset).round().clamp(0.0, 255.0) as u8)
            .collect();
        GrayImage {
            width: src.width,
            height: src.height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flat_image_yields_identity() {
        let img = GrayImage::from_raw(8, 8, vec![200; 64]).unwrap();
        let params = ContrastParams::from_image(&img.view(), 0.01);
        assert_eq!(params, ContrastParams::identity());
    }

    #[test]
    fn two_level_image_stretches_to_full_range() {
        let mut data = vec![50u8; 500];
        data.extend(vec![180u8; 500]);
        let img = GrayImage::from_raw(100, 10, data).unwrap();
        let params = ContrastParams::from_image(&img.view(), 0.01);

        // Cutoffs land at 50 and 179: the walk from the top stops on the
        // first bin whose cumulative mass drops under total - clip.
        assert_relative_eq!(params.gain, 255.0 / 129.0, epsilon = 1e-5);
        assert_relative_eq!(params.offset, -50.0 * params.gain, epsilon = 1e-3);

        let out = params.apply(&img.view());
        assert_eq!(out.data[0], 0);
        assert_eq!(out.data[999], 255);
    }

    #[test]
    fn apply_saturates_instead_of_wrapping() {
        let img = GrayImage::from_raw(2, 1, vec![10, 250]).unwrap();
        let params = ContrastParams {
            gain: 2.0,
            offset: -50.0,
        };
        let out = params.apply(&img.view());
        assert_eq!(out.data, vec![0, 255]);
    }

    #[test]
    fn deterministic_for_the_same_image() {
        let img = GrayImage::from_fn(32, 32, |x, y| ((x * 7 + y * 13) % 251) as u8);
        let a = ContrastParams::from_image(&img.view(), 0.01);
        let b = ContrastParams::from_image(&img.view(), 0.01);
        assert_eq!(a, b);
    }

    #[test]
    fn params_round_trip_as_json() {
        let params = ContrastParams {
            gain: 1.5,
            offset: -20.25,
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: ContrastParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
