// SPDX-License-Identifier: GPL-3.0
// frame.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// The host on the far end of the observation link accumulates event-camera
// output into binary frames and shrinks them to the observation grid before
// clocking them across. This module holds that side of the contract, so the
// simulated cabinet can produce realistic observation traffic.

use crate::{
    config::{OBSERVATION_COLS, OBSERVATION_ROWS},
    error::BridgeError,
};
use neuropong_utility::CustomDivision;
use std::{fmt, ops::Range};

/// Rows on the event camera sensor.
pub const SENSOR_ROWS: usize = 260;

/// Columns on the event camera sensor.
pub const SENSOR_COLS: usize = 346;

/// Values per downsampling pass on the host command line.
const PASS_PARAMS: usize = 5;

/// A binary grid recording which cells saw at least one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFrame {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl EventFrame {

    /// Creates a new empty frame.
    pub fn new(rows: usize, cols: usize) -> Self {
        EventFrame {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Creates a new empty frame the size of the camera sensor.
    pub fn sensor() -> Self {
        EventFrame::new(SENSOR_ROWS, SENSOR_COLS)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Records an event. Events outside the frame are dropped.
    pub fn mark(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = 1;
        }
    }

    /// Returns 1 if the cell saw an event, 0 otherwise (including outside the frame).
    pub fn get(&self, row: usize, col: usize) -> u8 {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            0
        }
    }

    /// Counts marked cells in the window.
    fn count_in(&self, rows: Range<usize>, cols: Range<usize>) -> usize {
        rows.map(|row| {
            cols.clone().filter(|&col| self.get(row, col) != 0).count()
        }).sum()
    }

    /// The frame as observation samples, row by row.
    pub fn to_observation_bytes(&self) -> Vec<u8> {
        self.cells.clone()
    }
}

/// Prints the frame as rows of 0s and 1s.
impl fmt::Display for EventFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            let line: String = row.iter().map(|&cell| if cell != 0 { '1' } else { '0' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// A region of interest on the sensor. x and y are the top left corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Crop {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// One downsampling pass. At each stride position a rows x cols window is
/// counted, and the output cell is 1 when the count is above the threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DownsamplePass {
    pub rows: usize,
    pub cols: usize,
    pub row_stride: usize,
    pub col_stride: usize,
    pub threshold: usize,
}

impl DownsamplePass {

    /// Builds passes from a flat list of `row, col, row_stride, col_stride,
    /// threshold` groups, as the host takes them on its command line.
    pub fn from_params(params: &[usize]) -> Result<Vec<Self>, BridgeError> {

        if params.len() % PASS_PARAMS != 0 {
            return Err(BridgeError::InvalidConfig(format!(
                "downsampling takes {} values per pass, got {}",
                PASS_PARAMS,
                params.len()
            )));
        }

        params
            .chunks(PASS_PARAMS)
            .map(|group| {
                let pass = DownsamplePass {
                    rows: group[0],
                    cols: group[1],
                    row_stride: group[2],
                    col_stride: group[3],
                    threshold: group[4],
                };
                pass.validate().map(|_| pass)
            })
            .collect()
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.rows == 0 || self.cols == 0 || self.row_stride == 0 || self.col_stride == 0 {
            return Err(BridgeError::InvalidConfig(format!(
                "downsampling window and strides must be non-zero: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Runs the pass over the given bounds of the frame.
    fn apply(
        &self,
        frame: &EventFrame,
        rows: Range<usize>,
        cols: Range<usize>
    ) -> Result<EventFrame, BridgeError> {

        self.validate()?;

        // Strides are non-zero, so these always divide.
        let out_rows = rows.len().ceil_div(self.row_stride).unwrap_or(0);
        let out_cols = cols.len().ceil_div(self.col_stride).unwrap_or(0);

        let mut output = EventFrame::new(out_rows, out_cols);
        for out_row in 0..out_rows {
            let top = rows.start + out_row * self.row_stride;
            let bottom = (top + self.rows).min(rows.end);
            for out_col in 0..out_cols {
                let left = cols.start + out_col * self.col_stride;
                let right = (left + self.cols).min(cols.end);
                if frame.count_in(top..bottom, left..right) > self.threshold {
                    output.mark(out_row, out_col);
                }
            }
        }

        Ok(output)
    }
}

/// Shrinks a frame through each pass in turn. The first pass only looks inside
/// the crop; later passes work over the whole output of the one before.
pub fn downsample(
    frame: &EventFrame,
    crop: Option<Crop>,
    passes: &[DownsamplePass]
) -> Result<EventFrame, BridgeError> {

    let (mut rows, mut cols) = match crop {
        Some(crop) => (
            crop.y.min(frame.rows)..(crop.y + crop.height).min(frame.rows),
            crop.x.min(frame.cols)..(crop.x + crop.width).min(frame.cols),
        ),
        None => (0..frame.rows, 0..frame.cols),
    };

    if rows.is_empty() || cols.is_empty() {
        return Err(BridgeError::InvalidConfig(format!("crop {:?} misses the frame", crop)));
    }

    let mut current = frame.clone();
    for pass in passes {
        current = pass.apply(&current, rows, cols)?;
        rows = 0..current.rows;
        cols = 0..current.cols;
    }

    // No passes still honours the crop.
    if passes.is_empty() {
        let mut cropped = EventFrame::new(rows.len(), cols.len());
        for (out_row, row) in rows.clone().enumerate() {
            for (out_col, col) in cols.clone().enumerate() {
                if frame.get(row, col) != 0 {
                    cropped.mark(out_row, out_col);
                }
            }
        }
        current = cropped;
    }

    Ok(current)
}

/// Host settings derived from a region of interest picked on the camera image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Calibration {
    pub crop: Crop,
    pub pass: DownsamplePass,
    pub time_segment_us: u64,
}

impl Calibration {

    /// Trims the region so it divides evenly into the observation grid, and works
    /// out the single pass and accumulation window that produce one observation
    /// per frame at the given rate.
    pub fn from_roi(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        threshold: usize,
        framerate: u32
    ) -> Result<Self, BridgeError> {

        let height = height / OBSERVATION_ROWS * OBSERVATION_ROWS;
        let width = width / OBSERVATION_COLS * OBSERVATION_COLS;
        if height == 0 || width == 0 {
            return Err(BridgeError::InvalidConfig(format!(
                "region must be at least {} x {}",
                OBSERVATION_COLS, OBSERVATION_ROWS
            )));
        }

        if framerate == 0 {
            return Err(BridgeError::InvalidConfig(String::from("framerate must be non-zero")));
        }

        let row_stride = height / OBSERVATION_ROWS;
        let col_stride = width / OBSERVATION_COLS;

        Ok(Calibration {
            crop: Crop {
                x,
                y,
                width,
                height,
            },
            pass: DownsamplePass {
                rows: row_stride,
                cols: col_stride,
                row_stride,
                col_stride,
                threshold,
            },
            time_segment_us: 1_000_000_u64.div_ceil(framerate as u64),
        })
    }
}

/// Prints the host command line arguments for this calibration.
impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--crop {} {} {} {} -tsl {} -dp {} {} {} {} {}",
            self.crop.x,
            self.crop.y,
            self.crop.width,
            self.crop.height,
            self.time_segment_us,
            self.pass.rows,
            self.pass.cols,
            self.pass.row_stride,
            self.pass.col_stride,
            self.pass.threshold
        )
    }
}

#[cfg(test)]
mod tests;
