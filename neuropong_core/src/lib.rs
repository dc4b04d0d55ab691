// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Crate-wide lines to disable specific lints:

// Components are built with explicit new() constructors holding calibrated
// values, so there will be no derived Default implementations unless needed.
#![allow(clippy::new_without_default)]

/// This module contains paddle actuator related functionality.
pub mod actuator;

/// This module contains observation sampler related functionality.
pub mod sampler;

/// This module contains the entry points called by the kit driver.
pub mod kit;

/// This module contains calibrated cabinet constants and actuator configuration.
pub mod config;

/// This module contains the error type shared by every component.
pub mod error;

/// This module contains the host-side event frame downsampler.
pub mod frame;

/// This module contains simulated cabinet hardware.
pub mod sim;
