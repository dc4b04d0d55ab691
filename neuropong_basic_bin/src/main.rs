// SPDX-License-Identifier: GPL-3.0
// main.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// This file is the core of the basic client - it exists merely as a CLI-based
// program to run the paddle and observation loop against a simulated cabinet,
// so that tuning values can be tried out without the hardware attached.

use clap::Parser;
use log::{LevelFilter, error, info};
use neuropong_core::{
    actuator::pong_actuator::PongActuator,
    config::{ActuatorConfig, DEFAULT_JITTER_SIZE, DEFAULT_SETTLE_MS, DEFAULT_STEP_SIZE, OBSERVATION_COUNT},
    error::BridgeError,
    frame::{Calibration, EventFrame, SENSOR_COLS, SENSOR_ROWS, downsample},
    kit::{ActionsKit, ObservationsKit},
    sampler::{ObservationSampler, pong_sampler::PongSampler},
    sim::{SimClock, SimLine, SimLink, SimPotentiometer},
};
use std::process;

/// Pins the kit driver leaves free for us.
const AVAILABLE_PINS: [u8; 4] = [6, 7, 8, 9];

/// Where the paddle sits across the sensor, in columns.
const PADDLE_COLUMNS: std::ops::Range<usize> = 300..308;

/// How tall the paddle looks to the camera, in rows.
const PADDLE_HEIGHT: usize = 24;

#[derive(Parser)]
#[command(
    version,
    about = "A basic barebones runner for the NeuroPong paddle bridge",
    long_about = None
)]
struct NeuroPongArgs {
    #[arg(
        long = "steps",
        help = "Number of network ticks to run",
        default_value_t = 20
    )]
    steps: usize,

    #[arg(
        long = "actions",
        help = "Action values to feed, one per tick, repeated as needed",
        value_delimiter = ',',
        default_value = "1"
    )]
    actions: Vec<f64>,

    #[arg(
        long = "step-size",
        help = "Potentiometer steps moved per action",
        default_value_t = DEFAULT_STEP_SIZE
    )]
    step_size: u8,

    #[arg(
        long = "jitter-size",
        help = "Potentiometer steps either side of the paddle when jittering",
        default_value_t = DEFAULT_JITTER_SIZE
    )]
    jitter_size: u8,

    #[arg(
        long = "settle-ms",
        help = "Wait between jitter writes in milliseconds",
        default_value_t = DEFAULT_SETTLE_MS
    )]
    settle_ms: u32,

    #[arg(
        long = "jitter-at-bounds",
        help = "Jitter the paddle while it is parked at either end of its travel"
    )]
    jitter_at_bounds: bool,

    #[arg(
        long = "threshold",
        help = "Events needed in a window before its observation sample is set",
        default_value_t = 35
    )]
    threshold: usize,

    #[arg(
        short = 'v',
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (repeat for more)"
    )]
    verbose: u8,
}

/// Draws the paddle onto an empty sensor frame where the camera would see it.
/// The top of the travel is the top of the screen.
fn render_paddle(wiper: u8, config: &ActuatorConfig) -> EventFrame {

    let travel = config.travel;
    let span = (travel.max - travel.min).max(1) as usize;
    let from_top = travel.max.saturating_sub(wiper) as usize;
    let centre = from_top * (SENSOR_ROWS - 1) / span;
    let top = centre.saturating_sub(PADDLE_HEIGHT / 2);

    let mut frame = EventFrame::sensor();
    for row in top..(top + PADDLE_HEIGHT) {
        for col in PADDLE_COLUMNS {
            frame.mark(row, col);
        }
    }

    frame
}

fn run(args: &NeuroPongArgs) -> Result<(), BridgeError> {

    let config = ActuatorConfig::new()
        .with_step_size(args.step_size)
        .with_jitter_size(args.jitter_size)
        .with_settle_ms(args.settle_ms)
        .with_jitter_at_bounds(args.jitter_at_bounds);

    let calibration = Calibration::from_roi(0, 0, SENSOR_COLS, SENSOR_ROWS, args.threshold, 30)?;
    info!("host calibration: {}", calibration);

    // Simulated cabinet.
    let pot = SimPotentiometer::new();
    let link = SimLink::new();

    let actuator = PongActuator::new(config.clone(), pot.clone(), SimLine::new(), SimClock::new())?;
    let sampler = PongSampler::new(link.clone(), SimLine::new(), SimLine::new());

    let mut actions_kit = ActionsKit::new(actuator);
    let mut observations_kit = ObservationsKit::new(sampler);
    actions_kit.setup_use_actions(&AVAILABLE_PINS)?;
    observations_kit.setup_read_observations(&AVAILABLE_PINS)?;

    if args.actions.is_empty() {
        return Err(BridgeError::InvalidConfig(String::from("at least one action is needed")));
    }

    for tick in 0..args.steps {
        let action = args.actions[tick % args.actions.len()];
        let position = actions_kit.loop_use_actions(&[action], &AVAILABLE_PINS)?;

        let frame = render_paddle(pot.wiper(), &config);
        let observation = downsample(&frame, Some(calibration.crop), &[calibration.pass])?;
        link.feed(&observation.to_observation_bytes());

        let mut lit = 0;
        for index in 0..OBSERVATION_COUNT {
            if observations_kit.loop_read_observation(index as u8)? != 0.0 {
                lit += 1;
            }
        }

        info!("tick {}: action {} -> paddle {:#04x}, {} observations lit", tick, action, position, lit);
    }

    info!("final observations:\n{}", observations_kit.sampler().buffer());
    Ok(())
}

fn main() {
    let neuropong_args = NeuroPongArgs::parse();

    let level = match neuropong_args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();

    if let Err(run_error) = run(&neuropong_args) {
        error!("{}", run_error);
        process::exit(1);
    }
}
