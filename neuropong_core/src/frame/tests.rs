// SPDX-License-Identifier: GPL-3.0
// tests.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{Calibration, Crop, DownsamplePass, EventFrame, SENSOR_COLS, SENSOR_ROWS, downsample};
use crate::{
    config::{OBSERVATION_COLS, OBSERVATION_COUNT, OBSERVATION_ROWS},
    error::BridgeError,
};

// Tests for the host-side frame downsampler.

fn fill(frame: &mut EventFrame, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) {
    for row in rows {
        for col in cols.clone() {
            frame.mark(row, col);
        }
    }
}

#[test]
fn mark_should_drop_events_outside_the_frame() {

    let mut frame = EventFrame::new(2, 2);
    frame.mark(5, 0);
    frame.mark(0, 5);
    frame.mark(1, 1);

    assert_eq!(frame.to_observation_bytes(), vec![0, 0, 0, 1]);
}

#[test]
fn downsample_should_threshold_each_window() {

    // A 4 x 4 frame in 2 x 2 windows. The top left window has all four cells
    // set, the bottom right has one.
    let mut frame = EventFrame::new(4, 4);
    fill(&mut frame, 0..2, 0..2);
    frame.mark(3, 3);

    let pass = DownsamplePass { rows: 2, cols: 2, row_stride: 2, col_stride: 2, threshold: 1 };
    let output = downsample(&frame, None, &[pass]).unwrap();

    assert_eq!(output.rows(), 2);
    assert_eq!(output.cols(), 2);
    assert_eq!(output.to_observation_bytes(), vec![1, 0, 0, 0]);
}

#[test]
fn downsample_should_require_count_strictly_above_threshold() {

    let mut frame = EventFrame::new(2, 2);
    fill(&mut frame, 0..2, 0..2);

    let at = DownsamplePass { rows: 2, cols: 2, row_stride: 2, col_stride: 2, threshold: 4 };
    let below = DownsamplePass { threshold: 3, ..at };

    assert_eq!(downsample(&frame, None, &[at]).unwrap().to_observation_bytes(), vec![0]);
    assert_eq!(downsample(&frame, None, &[below]).unwrap().to_observation_bytes(), vec![1]);
}

#[test]
fn downsample_should_round_partial_windows_up_and_clip_them() {

    // Five columns with a stride of two gives three output columns, the last
    // window only one column wide.
    let mut frame = EventFrame::new(1, 5);
    frame.mark(0, 4);

    let pass = DownsamplePass { rows: 1, cols: 2, row_stride: 1, col_stride: 2, threshold: 0 };
    let output = downsample(&frame, None, &[pass]).unwrap();

    assert_eq!(output.to_observation_bytes(), vec![0, 0, 1]);
}

#[test]
fn downsample_should_only_look_inside_the_crop() {

    let mut frame = EventFrame::new(6, 6);
    fill(&mut frame, 0..2, 0..2);
    fill(&mut frame, 4..6, 4..6);

    let crop = Crop { x: 2, y: 2, width: 4, height: 4 };
    let pass = DownsamplePass { rows: 2, cols: 2, row_stride: 2, col_stride: 2, threshold: 3 };
    let output = downsample(&frame, Some(crop), &[pass]).unwrap();

    assert_eq!(output.to_observation_bytes(), vec![0, 0, 0, 1]);
}

#[test]
fn downsample_should_chain_passes() {

    let mut frame = EventFrame::new(8, 8);
    fill(&mut frame, 0..4, 0..4);

    let pass = DownsamplePass { rows: 2, cols: 2, row_stride: 2, col_stride: 2, threshold: 3 };
    let output = downsample(&frame, None, &[pass, pass]).unwrap();

    assert_eq!(output.rows(), 2);
    assert_eq!(output.to_observation_bytes(), vec![1, 0, 0, 0]);
}

#[test]
fn downsample_without_passes_should_just_crop() {

    let mut frame = EventFrame::new(3, 3);
    frame.mark(1, 1);

    let crop = Crop { x: 1, y: 1, width: 2, height: 2 };
    let output = downsample(&frame, Some(crop), &[]).unwrap();

    assert_eq!(output.to_observation_bytes(), vec![1, 0, 0, 0]);
}

#[test]
fn downsample_should_reject_a_crop_off_the_frame() {

    let frame = EventFrame::new(4, 4);
    let crop = Crop { x: 10, y: 0, width: 2, height: 2 };

    assert!(matches!(downsample(&frame, Some(crop), &[]), Err(BridgeError::InvalidConfig(_))));
}

#[test]
fn from_params_should_group_in_fives() {

    let passes = DownsamplePass::from_params(&[2, 2, 2, 2, 1, 3, 3, 3, 3, 4]).unwrap();

    assert_eq!(passes.len(), 2);
    assert_eq!(passes[1], DownsamplePass { rows: 3, cols: 3, row_stride: 3, col_stride: 3, threshold: 4 });
}

#[test]
fn from_params_should_reject_bad_groups() {

    assert!(DownsamplePass::from_params(&[2, 2, 2, 2]).is_err());
    assert!(DownsamplePass::from_params(&[2, 2, 0, 2, 1]).is_err());
}

#[test]
fn calibration_should_trim_roi_to_the_grid() {

    let calibration = Calibration::from_roi(10, 20, 170, 105, 35, 30).unwrap();

    assert_eq!(calibration.crop, Crop { x: 10, y: 20, width: 160, height: 100 });
    assert_eq!(calibration.pass, DownsamplePass { rows: 10, cols: 10, row_stride: 10, col_stride: 10, threshold: 35 });
    assert_eq!(calibration.time_segment_us, 33_334);
    assert_eq!(calibration.to_string(), "--crop 10 20 160 100 -tsl 33334 -dp 10 10 10 10 35");
}

#[test]
fn calibration_should_reject_tiny_regions_and_zero_framerate() {

    assert!(Calibration::from_roi(0, 0, 15, 100, 35, 30).is_err());
    assert!(Calibration::from_roi(0, 0, 160, 100, 35, 0).is_err());
}

#[test]
fn calibrated_sensor_frame_should_fill_one_observation_cycle() {

    let calibration = Calibration::from_roi(0, 0, SENSOR_COLS, SENSOR_ROWS, 35, 30).unwrap();
    let mut frame = EventFrame::sensor();
    fill(&mut frame, 0..calibration.pass.rows, 0..calibration.pass.cols);

    let output = downsample(&frame, Some(calibration.crop), &[calibration.pass]).unwrap();
    let bytes = output.to_observation_bytes();

    assert_eq!(output.rows(), OBSERVATION_ROWS);
    assert_eq!(output.cols(), OBSERVATION_COLS);
    assert_eq!(bytes.len(), OBSERVATION_COUNT);
    assert_eq!(bytes[0], 1);
    assert!(bytes[1..].iter().all(|&sample| sample == 0));
}
