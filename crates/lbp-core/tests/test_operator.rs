mod common;

use ndarray::{array, Array2};

use common::{noise_image, patch_3x3, ramp_image, tile_3x3};
use lbp_core::error::LbpError;
use lbp_core::lbp::{BorderHandling, EncodingType, LbpConfig, LbpOperator};
use lbp_core::sample::{integral_image, SampleImage};

fn op(config: LbpConfig) -> LbpOperator {
    LbpOperator::new(config).unwrap()
}

/// First logical center written to output (0, 0).
fn origin(op: &LbpOperator) -> (usize, usize) {
    match op.border_handling() {
        BorderHandling::Wrap => (0, 0),
        BorderHandling::Shrink => op.offset(),
    }
}

fn configs() -> Vec<LbpConfig> {
    vec![
        LbpConfig::rectangular(8, 1.0),
        LbpConfig::rectangular(4, 2.0),
        LbpConfig::circular(8, 1.5),
        LbpConfig::elliptical(12, 2.0, 1.0).with_uniform(true),
        LbpConfig::circular(8, 1.0).with_border_handling(BorderHandling::Wrap),
        LbpConfig::circular(8, 1.0).with_to_average(true).with_average_bit(true),
        LbpConfig::circular(8, 2.0).with_average_bit(true),
        LbpConfig::circular(8, 1.0).with_encoding(EncodingType::Transitional),
        LbpConfig::circular(16, 2.0)
            .with_encoding(EncodingType::DirectionCoded)
            .with_rotation_invariant(true),
        LbpConfig::multi_block(8, (3, 2), (1, 0)),
        LbpConfig::multi_block(4, (2, 2), (0, 0)).with_border_handling(BorderHandling::Wrap),
    ]
}

// ---------------------------------------------------------------------------
// Output geometry
// ---------------------------------------------------------------------------

#[test]
fn test_output_shape_shrinks_by_offset() {
    let lbp = op(LbpConfig::circular(8, 1.0));
    assert_eq!(lbp.offset(), (1, 1));
    assert_eq!(lbp.output_shape((10, 10), false), (8, 8));
    assert_eq!(lbp.output_shape((11, 11), true), (8, 8));

    let lbp = op(LbpConfig::elliptical(8, 2.0, 1.0));
    assert_eq!(lbp.output_shape((10, 10), false), (6, 8));
}

#[test]
fn test_output_shape_of_tiny_image_is_empty() {
    let lbp = op(LbpConfig::circular(8, 2.0));
    assert_eq!(lbp.output_shape((3, 3), false), (0, 0));
    let codes = lbp.extract_allocating(Array2::<u8>::zeros((3, 3)).view(), false);
    assert_eq!(codes.dim(), (0, 0));
}

#[test]
fn test_wrap_keeps_input_shape() {
    let lbp = op(LbpConfig::circular(8, 3.0).with_border_handling(BorderHandling::Wrap));
    assert_eq!(lbp.output_shape((10, 12), false), (10, 12));
    assert_eq!(lbp.output_shape((11, 13), true), (10, 12));
}

#[test]
fn test_multi_block_output_shape() {
    // 3*3 - 2*1 = 7 rows and 3*2 = 6 columns per neighborhood
    let lbp = op(LbpConfig::multi_block(8, (3, 2), (1, 0)));
    assert_eq!(lbp.offset(), (2, 2));
    assert_eq!(lbp.output_shape((20, 20), false), (14, 15));
    assert_eq!(lbp.output_shape((21, 21), true), (14, 15));
}

// ---------------------------------------------------------------------------
// Known codes
// ---------------------------------------------------------------------------

#[test]
fn test_patch_code_rectangular_lbp8() {
    let lbp = op(LbpConfig::rectangular(8, 1.0));
    let codes = lbp.extract_allocating(patch_3x3().view(), false);
    assert_eq!(codes, array![[203u16]]);
    assert_eq!(lbp.extract_at(patch_3x3().view(), 1, 1, false).unwrap(), 203);
}

#[test]
fn test_patch_code_rectangular_lbp4() {
    let lbp = op(LbpConfig::rectangular(4, 1.0));
    assert_eq!(lbp.extract_at(patch_3x3().view(), 1, 1, false).unwrap(), 0b1001);
}

#[test]
fn test_patch_code_compared_to_mean() {
    // mean of the eight neighbors is 11.375
    let lbp = op(LbpConfig::rectangular(8, 1.0).with_to_average(true));
    assert_eq!(lbp.extract_at(patch_3x3().view(), 1, 1, false).unwrap(), 138);

    // the center (10) is below the mean: average bit stays clear
    let lbp = op(LbpConfig::rectangular(8, 1.0)
        .with_to_average(true)
        .with_average_bit(true));
    assert_eq!(lbp.max_label(), 512);
    assert_eq!(lbp.extract_at(patch_3x3().view(), 1, 1, false).unwrap(), 138);
}

#[test]
fn test_constant_image_sets_every_bit() {
    let image = Array2::<u8>::from_elem((6, 7), 42);
    for encoding in [
        EncodingType::Regular,
        EncodingType::Transitional,
        EncodingType::DirectionCoded,
    ] {
        let lbp = op(LbpConfig::rectangular(8, 1.0).with_encoding(encoding));
        let codes = lbp.extract_allocating(image.view(), false);
        assert!(codes.iter().all(|&c| c == 255), "{encoding}");
    }

    let lbp = op(LbpConfig::rectangular(8, 1.0).with_uniform(true));
    let codes = lbp.extract_allocating(image.view(), false);
    assert!(codes.iter().all(|&c| c == 57));

    let lbp = op(LbpConfig::rectangular(8, 1.0).with_average_bit(true));
    let codes = lbp.extract_allocating(image.view(), false);
    assert!(codes.iter().all(|&c| c == 511));
}

#[test]
fn test_codes_stay_below_max_label() {
    let image = noise_image(24, 24, 7);
    for config in configs() {
        let lbp = op(config.clone());
        let codes = lbp.extract_allocating(image.view(), false);
        assert!(
            codes.iter().all(|&c| (c as usize) < lbp.max_label()),
            "{config:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Consistency between extraction paths
// ---------------------------------------------------------------------------

#[test]
fn test_extract_at_matches_extract() {
    let image = noise_image(23, 19, 11);
    for config in configs() {
        let lbp = op(config.clone());
        let codes = lbp.extract_allocating(image.view(), false);
        let (oy, ox) = origin(&lbp);
        for ((i, j), &code) in codes.indexed_iter() {
            let single = lbp.extract_at(image.view(), i + oy, j + ox, false).unwrap();
            assert_eq!(single, code, "{config:?} at ({i}, {j})");
        }
    }
}

#[test]
fn test_extract_into_view_matches_allocating() {
    let image = noise_image(15, 17, 3);
    let lbp = op(LbpConfig::circular(8, 1.5).with_uniform(true));
    let mut out = Array2::<u16>::zeros(lbp.output_shape_of(image.view(), false));
    lbp.extract(image.view(), out.view_mut(), false).unwrap();
    assert_eq!(out, lbp.extract_allocating(image.view(), false));
}

#[test]
fn test_integral_image_input_matches_plain_input() {
    let image = noise_image(21, 18, 5);
    let integral = integral_image(image.view());
    for config in configs() {
        let lbp = op(config.clone());
        let plain = lbp.extract_allocating(image.view(), false);
        let summed = lbp.extract_allocating(integral.view(), true);
        assert_eq!(plain, summed, "{config:?}");
    }
}

#[test]
fn test_wrap_matches_shrink_on_tiled_image() {
    let image = noise_image(7, 9, 13);
    let tiled = tile_3x3(&image);
    let (h, w) = image.dim();
    for config in [
        LbpConfig::circular(8, 1.5),
        LbpConfig::elliptical(16, 2.0, 3.0).with_to_average(true),
        LbpConfig::rectangular(8, 1.0).with_encoding(EncodingType::Transitional),
    ] {
        let shrink = op(config.clone());
        let wrap = op(config.with_border_handling(BorderHandling::Wrap));
        let (oy, ox) = shrink.offset();

        let wrapped = wrap.extract_allocating(image.view(), false);
        let reference = shrink.extract_allocating(tiled.view(), false);
        assert_eq!(wrapped.dim(), (h, w));
        for ((y, x), &code) in wrapped.indexed_iter() {
            assert_eq!(code, reference[[y + h - oy, x + w - ox]], "({y}, {x})");
        }
    }
}

#[test]
fn test_single_pixel_blocks_equal_rectangular_lbp() {
    let image = noise_image(16, 16, 21);
    let rect = op(LbpConfig::rectangular(8, 1.0));
    let blocks = op(LbpConfig::multi_block(8, (1, 1), (0, 0)));
    assert_eq!(
        rect.extract_allocating(image.view(), false),
        blocks.extract_allocating(image.view(), false)
    );
}

#[test]
fn test_multi_block_compares_block_means() {
    // 2x2 blocks, stride 2: a 6x6 image holds exactly one neighborhood
    let image = Array2::from_shape_fn((6, 6), |(r, c)| {
        let by = r / 2;
        let bx = c / 2;
        // block means: center 5, right 9, everything else 1
        match (by, bx) {
            (1, 1) => 5u8,
            (1, 2) => 9,
            _ => 1,
        }
    });
    let lbp = op(LbpConfig::multi_block(8, (2, 2), (0, 0)));
    let codes = lbp.extract_allocating(image.view(), false);
    assert_eq!(codes, array![[1u16]]);
    assert_eq!(lbp.extract_at(image.view(), 2, 2, false).unwrap(), 1);
}

#[test]
fn test_element_types_agree() {
    let image = noise_image(14, 14, 17);
    let wide = image.mapv(u16::from);
    let float = image.mapv(f64::from);
    for config in configs() {
        let lbp = op(config.clone());
        let a = lbp.extract_allocating(image.view(), false);
        assert_eq!(a, lbp.extract_allocating(wide.view(), false), "{config:?}");
        assert_eq!(a, lbp.extract_allocating(float.view(), false), "{config:?}");
    }
}

#[test]
fn test_parallel_rows_match_single_positions() {
    // 258x258 output is above the parallel threshold
    let image = noise_image(260, 260, 99);
    let lbp = op(LbpConfig::circular(8, 1.0).with_uniform(true));
    let codes = lbp.extract_allocating(image.view(), false);
    assert_eq!(codes.dim(), (258, 258));
    for ((i, j), &code) in codes.indexed_iter().step_by(97) {
        assert_eq!(lbp.extract_at(image.view(), i + 1, j + 1, false).unwrap(), code);
    }
}

#[test]
fn test_rotation_invariant_histogram_survives_quarter_turn() {
    let image = noise_image(12, 15, 31);
    let (_, w) = image.dim();
    let rotated = Array2::from_shape_fn((15, 12), |(r, c)| image[[c, w - 1 - r]]);

    let lbp = op(LbpConfig::rectangular(8, 1.0).with_rotation_invariant(true));
    let histogram = |codes: Array2<u16>| {
        let mut h = vec![0usize; lbp.max_label()];
        for &c in codes.iter() {
            h[c as usize] += 1;
        }
        h
    };
    assert_eq!(
        histogram(lbp.extract_allocating(image.view(), false)),
        histogram(lbp.extract_allocating(rotated.view(), false))
    );
}

#[test]
fn test_ramp_codes_are_constant_inside() {
    // every neighborhood of a linear ramp looks the same
    let image = ramp_image(9, 11);
    let lbp = op(LbpConfig::rectangular(8, 1.0));
    let codes = lbp.extract_allocating(image.view(), false);
    let first = codes[[0, 0]];
    assert!(codes.iter().all(|&c| c == first));
    // the right neighbor and the whole row below are larger
    assert_eq!(first, 0b0000_1111);
}

#[test]
fn test_ramp_code_with_interpolated_neighbors() {
    // bilinear interpolation reproduces a linear ramp exactly, so every
    // diagonal neighbor at radius 1.5 keeps the sign of its offset
    let image = ramp_image(9, 11);
    let lbp = op(LbpConfig::circular(8, 1.5));
    assert_eq!(lbp.offset(), (2, 2));
    let codes = lbp.extract_allocating(image.view(), false);
    assert_eq!(codes.dim(), (5, 7));
    // right, below-right, below and below-left (+1.06 rows, -1.06 columns)
    assert!(codes.iter().all(|&c| c == 0b0000_1111));
    assert_eq!(lbp.extract_at(image.view(), 4, 5, false).unwrap(), 15);
}

// ---------------------------------------------------------------------------
// Runtime-typed images
// ---------------------------------------------------------------------------

#[test]
fn test_sample_image_dispatch() {
    let lbp = op(LbpConfig::rectangular(8, 1.0));
    for image in [
        SampleImage::from(patch_3x3()),
        SampleImage::from(patch_3x3().mapv(u16::from)),
        SampleImage::from(patch_3x3().mapv(f64::from)),
    ] {
        assert_eq!(lbp.extract_image(&image, false), array![[203u16]]);
        assert_eq!(lbp.extract_image_at(&image, 1, 1, false).unwrap(), 203);

        let mut out = Array2::<u16>::zeros((1, 1));
        lbp.extract_image_into(&image, out.view_mut(), false).unwrap();
        assert_eq!(out[[0, 0]], 203);

        let integral = SampleImage::from(image.integral());
        assert_eq!(lbp.extract_image(&integral, true), array![[203u16]]);
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_wrong_output_shape_is_rejected_untouched() {
    let image = noise_image(10, 10, 1);
    let lbp = op(LbpConfig::circular(8, 1.0));
    let mut out = Array2::<u16>::from_elem((3, 3), 7);
    let err = lbp.extract(image.view(), out.view_mut(), false).unwrap_err();
    match err {
        LbpError::ShapeMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, vec![8, 8]);
            assert_eq!(actual, vec![3, 3]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(out.iter().all(|&c| c == 7));
}

#[test]
fn test_positions_outside_valid_region() {
    let image = noise_image(10, 10, 1);
    let lbp = op(LbpConfig::circular(8, 2.0));
    for (y, x) in [(0, 5), (5, 1), (8, 5), (5, 8), (10, 10)] {
        let err = lbp.extract_at(image.view(), y, x, false).unwrap_err();
        assert!(matches!(err, LbpError::InvalidPosition { .. }), "({y}, {x})");
    }
    assert!(lbp.extract_at(image.view(), 2, 7, false).is_ok());

    let wrap = op(LbpConfig::circular(8, 2.0).with_border_handling(BorderHandling::Wrap));
    assert!(wrap.extract_at(image.view(), 0, 0, false).is_ok());
    assert!(wrap.extract_at(image.view(), 9, 9, false).is_ok());
    assert!(wrap.extract_at(image.view(), 10, 0, false).is_err());
}

#[test]
fn test_invalid_configurations() {
    assert!(LbpOperator::new(LbpConfig::rectangular(6, 1.0)).is_err());
    assert!(LbpOperator::new(LbpConfig::circular(8, 0.0)).is_err());
    assert!(LbpOperator::new(
        LbpConfig::circular(7, 1.0).with_encoding(EncodingType::DirectionCoded)
    )
    .is_err());
    assert!(LbpOperator::new(LbpConfig::multi_block(12, (2, 2), (0, 0))).is_err());
    assert!(LbpOperator::new(LbpConfig::multi_block(8, (2, 2), (2, 0))).is_err());

    let mut circular_blocks = LbpConfig::multi_block(8, (2, 2), (0, 0));
    circular_blocks.circular = true;
    assert!(LbpOperator::new(circular_blocks).is_err());
}

// ---------------------------------------------------------------------------
// Setters
// ---------------------------------------------------------------------------

#[test]
fn test_failed_setter_leaves_operator_unchanged() {
    let mut lbp = op(LbpConfig::rectangular(8, 1.0).with_uniform(true));
    let before = lbp.clone();

    assert!(lbp.set_neighbor_count(5).is_err());
    assert!(lbp.set_radius(-1.0).is_err());
    assert!(lbp.set_block_size((2, 2)).is_ok());
    assert!(lbp.set_block_overlap((2, 2)).is_err());
    assert!(lbp.set_block_size((0, 0)).is_ok());
    assert_eq!(lbp, before);
}

#[test]
fn test_setters_rebuild_geometry_and_table() {
    let mut lbp = op(LbpConfig::default());
    assert_eq!(lbp.max_label(), 256);

    lbp.set_circular(true).unwrap();
    lbp.set_neighbor_count(16).unwrap();
    lbp.set_radii(2.0, 3.0).unwrap();
    assert_eq!(lbp.relative_positions().len(), 16);
    assert_eq!(lbp.offset(), (2, 3));
    assert_eq!(lbp.radii(), (2.0, 3.0));

    lbp.set_uniform(true).unwrap();
    assert_eq!(lbp.max_label(), 243);
    lbp.set_rotation_invariant(true).unwrap();
    assert_eq!(lbp.max_label(), 18);

    lbp.set_add_average_bit(true).unwrap();
    assert_eq!(lbp.max_label(), 36);
    lbp.set_to_average(true).unwrap();
    assert!(lbp.config().to_average);

    lbp.set_circular(false).unwrap_err();
    lbp.set_neighbor_count(8).unwrap();
    lbp.set_circular(false).unwrap();
    lbp.set_block_size_and_overlap((3, 3), (1, 1)).unwrap();
    assert!(lbp.is_multi_block());
    assert_eq!(lbp.offset(), (2, 2));
    assert_eq!(lbp.block_size(), (3, 3));
    assert_eq!(lbp.block_overlap(), (1, 1));

    lbp.set_border_handling(BorderHandling::Wrap).unwrap();
    assert_eq!(lbp.output_shape((9, 9), false), (9, 9));
    lbp.set_encoding(EncodingType::DirectionCoded).unwrap();
    assert_eq!(lbp.config().encoding, EncodingType::DirectionCoded);
}
