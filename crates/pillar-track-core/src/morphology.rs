//! Grayscale morphology with rectangular kernels.
//!
//! Outside the image, erosion sees white and dilation sees black, so a
//! structure that spans the full frame is not eaten at the border.

use crate::{GrayImage, GrayImageView};

fn erode_once(src: &GrayImageView<'_>, kw: usize, kh: usize) -> GrayImage {
    let w = src.width as i32;
    let h = src.height as i32;
    let ax = (kw / 2) as i32;
    let ay = (kh / 2) as i32;
    let mut out = GrayImage::zeros(src.width, src.height);
    for y in 0..h {
        for x in 0..w {
            let mut m = 255u8;
            for ky in 0..kh as i32 {
                let sy = y + ky - ay;
                if sy < 0 || sy >= h {
                    continue;
                }
                let row = (sy * w) as usize;
                for kx in 0..kw as i32 {
                    let sx = x + kx - ax;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    m = m.min(src.data[row + sx as usize]);
                }
            }
            out.data[(y * w + x) as usize] = m;
        }
    }
    out
}

fn dilate_once(src: &GrayImageView<'_>, kw: usize, kh: usize) -> GrayImage {
    let w = src.width as i32;
    let h = src.height as i32;
    let ax = (kw / 2) as i32;
    let ay = (kh / 2) as i32;
    let mut out = GrayImage::zeros(src.width, src.height);
    for y in 0..h {
        for x in 0..w {
            let mut m = 0u8;
            for ky in 0..kh as i32 {
                let sy = y + ky - ay;
                if sy < 0 || sy >= h {
                    continue;
                }
                let row = (sy * w) as usize;
                for kx in 0..kw as i32 {
                    let sx = x + kx - ax;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    m = m.max(src.data[row + sx as usize]);
                }
            }
            out.data[(y * w + x) as usize] = m;
        }
    }
    out
}

/// Erosion with a `kw × kh` kernel, repeated `iterations` times.
pub fn erode(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    if iterations == 0 {
        return src.to_owned();
    }
    let mut out = erode_once(src, kw, kh);
    for _ in 1..iterations {
        out = erode_once(&out.view(), kw, kh);
    }
    out
}

/// Dilation with a `kw × kh` kernel, repeated `iterations` times.
pub fn dilate(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    if iterations == 0 {
        return src.to_owned();
    }
    let mut out = dilate_once(src, kw, kh);
    for _ in 1..iterations {
        out = dilate_once(&out.view(), kw, kh);
    }
    out
}

/// Opening: `iterations` erosions followed by `iterations` dilations.
pub fn open(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    let eroded = erode(src, kw, kh, iterations);
    dilate(&eroded.view(), kw, kh, iterations)
}

/// Closing: `iterations` dilations followed by `iterations` erosions.
pub fn close(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    let dilated = dilate(src, kw, kh, iterations);
    erode(&dilated.view(), kw, kh, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_image(w: usize, h: usize, x0: usize, x1: usize) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| if (x0..x1).contains(&x) { 255 } else { 0 })
    }

    #[test]
    fn open_removes_an_isolated_speck() {
        let mut img = GrayImage::zeros(20, 20);
        img.data[10 * 20 + 10] = 255;
        let out = open(&img.view(), 5, 5, 1);
        assert_eq!(out.view().count_nonzero(), 0);
    }

    #[test]
    fn close_fills_a_small_gap() {
        let mut img = bar_image(20, 20, 8, 12);
        img.data[10 * 20 + 9] = 0;
        let out = close(&img.view(), 5, 5, 1);
        assert_eq!(out.data[10 * 20 + 9], 255);
    }

    #[test]
    fn full_height_bar_survives_tall_vertical_opening() {
        let img = bar_image(40, 100, 20, 23);
        let out = open(&img.view(), 1, 16, 3);
        assert_eq!(
            out.view().count_nonzero(),
            img.view().count_nonzero(),
            "border convention must keep image-spanning columns intact"
        );
    }

    #[test]
    fn short_blob_is_removed_by_tall_vertical_opening() {
        let img = GrayImage::from_fn(40, 100, |x, y| {
            if (18..26).contains(&x) && (45..55).contains(&y) {
                255
            } else {
                0
            }
        });
        let out = open(&img.view(), 1, 16, 3);
        assert_eq!(out.view().count_nonzero(), 0);
    }

    #[test]
    fn zero_iterations_is_a_copy() {
        let img = bar_image(10, 10, 2, 4);
        assert_eq!(erode(&img.view(), 5, 5, 0), img);
    }
}
