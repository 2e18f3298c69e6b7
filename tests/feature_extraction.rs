use imgmatch::feature::{color_histogram_3d, texture_histogram, PATCH_LEN};
use imgmatch::{Bgr, ImgMatchError, OwnedImage, RegionLayout, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RED: Bgr = [0, 0, 255];
const BLUE: Bgr = [255, 0, 0];

fn random_image(rng: &mut StdRng, width: usize, height: usize) -> OwnedImage<Bgr> {
    OwnedImage::from_fn(width, height, |_, _| {
        [rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()]
    })
    .unwrap()
}

#[test]
fn solid_red_fills_one_color_bucket() {
    let img = OwnedImage::filled(4, 4, RED).unwrap();

    let raw = color_histogram_3d(&img, 8).unwrap();
    assert_eq!(raw.len(), 512);
    assert_eq!(raw[448], 16.0);
    assert_eq!(raw.iter().sum::<f32>(), 16.0);

    let described = Strategy::ColorHistogram { bins: 8 }.describe(&img).unwrap();
    assert_eq!(described.values()[448], 1.0);
}

#[test]
fn center_patch_of_uniform_gray() {
    let img = OwnedImage::filled(9, 9, [100, 100, 100]).unwrap();
    let features = Strategy::CenterPatch.describe(&img).unwrap();
    assert_eq!(features.values().len(), PATCH_LEN);
    assert!(features.values().iter().all(|&v| v == 100.0));
}

#[test]
fn center_patch_needs_seven_pixels() {
    let img = OwnedImage::filled(6, 20, [1, 1, 1]).unwrap();
    let err = Strategy::CenterPatch.describe(&img).unwrap_err();
    assert!(matches!(err, ImgMatchError::PatchOutOfBounds { size: 7, .. }));
}

#[test]
fn white_pixels_clamp_into_last_chromaticity_bucket() {
    let img = OwnedImage::filled(3, 3, [255, 255, 255]).unwrap();
    let features = Strategy::Chromaticity { bins: 16 }.describe(&img).unwrap();
    assert_eq!(features.values().len(), 256);
    assert_eq!(features.values()[255], 1.0);
}

#[test]
fn flat_image_has_zero_gradient_texture() {
    let img = OwnedImage::filled(8, 8, [40, 90, 200]).unwrap();
    let raw = texture_histogram(&img, 8).unwrap();
    assert_eq!(raw.len(), 8);
    assert_eq!(raw[0], 64.0);
}

#[test]
fn halves_keep_top_and_bottom_separate() {
    let img = OwnedImage::from_fn(6, 4, |_, y| if y < 2 { RED } else { BLUE }).unwrap();
    let strategy = Strategy::Region {
        bins: 8,
        layout: RegionLayout::Halves,
    };
    let features = strategy.describe(&img).unwrap();
    assert_eq!(features.segment_lengths(), &[512, 512]);
    assert_eq!(features.segment(0).unwrap()[448], 1.0);
    // blue: r=0, g=0, b=7
    assert_eq!(features.segment(1).unwrap()[7], 1.0);
}

#[test]
fn color_texture_yields_two_normalized_segments() {
    let mut rng = StdRng::seed_from_u64(7);
    let img = random_image(&mut rng, 16, 12);
    let features = Strategy::ColorTexture { bins: 4 }.describe(&img).unwrap();
    assert_eq!(features.segment_lengths(), &[64, 4]);
    for segment in features.segments() {
        let sum: f32 = segment.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "segment sum {sum}");
    }
}

#[test]
fn normalized_histograms_sum_to_one() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let width = rng.random_range(1..40);
        let height = rng.random_range(1..40);
        let bins = rng.random_range(1..=16);
        let img = random_image(&mut rng, width, height);
        for strategy in [
            Strategy::ColorHistogram { bins },
            Strategy::Chromaticity { bins },
            Strategy::Texture { bins },
        ] {
            let features = strategy.describe(&img).unwrap();
            let sum: f64 = features.values().iter().map(|&v| f64::from(v)).sum();
            assert!((sum - 1.0).abs() < 1e-5, "{} sum {sum}", strategy.name());
            assert!(features.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}

#[test]
fn bins_out_of_range_are_rejected() {
    let img = OwnedImage::filled(4, 4, RED).unwrap();
    for bins in [0, 257] {
        let err = Strategy::ColorHistogram { bins }.describe(&img).unwrap_err();
        assert!(matches!(err, ImgMatchError::InvalidInput(_)));
    }
}
