use pillar_track_core::GrayImage;
use pillar_track_detect::{StartPointDetector, StartPointParams};

/// Microscopy-like frame: bright background, two dark channel walls running
/// the full height, and a dark pillar tip disk between them.
fn channel_frame(
    width: usize,
    height: usize,
    walls: [(usize, usize); 2],
    disk: (i32, i32, i32),
) -> GrayImage {
    let (cx, cy, r) = disk;
    GrayImage::from_fn(width, height, |x, y| {
        let in_wall = walls.iter().any(|&(lo, hi)| x >= lo && x <= hi);
        let dx = x as i32 - cx;
        let dy = y as i32 - cy;
        if in_wall || dx * dx + dy * dy <= r * r {
            30
        } else {
            200
        }
    })
}

#[test]
fn detects_pillar_between_channel_walls() {
    let img = channel_frame(200, 200, [(40, 46), (150, 156)], (100, 100, 20));
    let detector = StartPointDetector::default();
    let detection = detector.detect(&img.view()).expect("detect");

    assert!(
        (detection.channel.left_x - 43).abs() <= 2,
        "left wall at {}",
        detection.channel.left_x
    );
    assert!(
        (detection.channel.right_x - 153).abs() <= 2,
        "right wall at {}",
        detection.channel.right_x
    );

    let circle = detection.circle;
    assert!((circle.center.x - 100).abs() <= 3, "center.x = {}", circle.center.x);
    assert!((circle.center.y - 100).abs() <= 3, "center.y = {}", circle.center.y);
    assert!((circle.radius - 20).abs() <= 3, "radius = {}", circle.radius);
    assert!(detection.region.bbox.contains_disk(&circle));
    assert!(circle.radius >= detection.region.min_radius);
    assert!(circle.radius <= detection.region.max_radius);
}

#[test]
fn detection_is_repeatable() {
    let img = channel_frame(200, 200, [(40, 46), (150, 156)], (100, 100, 20));
    let detector = StartPointDetector::new(StartPointParams::default());
    let first = detector.detect(&img.view()).expect("first run");
    let second = detector.detect(&img.view()).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn featureless_frame_yields_the_expected_circle() {
    let img = GrayImage::from_fn(200, 200, |_, _| 128);
    let detector = StartPointDetector::default();
    let detection = detector.detect(&img.view()).expect("detect");

    // Wall fallback puts the sides at 10% and 90% of the width; the circle
    // search then falls back to the expected circle of that region.
    assert_eq!(detection.channel.left_x, 20);
    assert_eq!(detection.channel.right_x, 180);
    assert_eq!(detection.region.min_radius, 12);
    assert_eq!(detection.region.max_radius, 92);
    assert_eq!(detection.circle.center.x, 100);
    assert_eq!(detection.circle.center.y, 100);
    assert_eq!(detection.circle.radius, 52);
}
