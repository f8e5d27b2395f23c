//! Windowed CHIP-8 interpreter: `mango8 <rom>`.
//!
//! The frame loop runs at 60 Hz and, per frame, drains input, executes the
//! configured batch of instructions, ticks the timers once, presents the
//! display and sleeps the rest of the frame out. The instruction rate is
//! the only thing that scales with the configuration; timers and display
//! always run at 60 Hz.

mod audio;
mod config;
mod context;
mod display;
mod error;
mod input;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use mango8::{Builder, State};

use crate::audio::Beeper;
use crate::config::Config;
use crate::context::DesktopContext;
use crate::display::Renderer;
use crate::error::Error;
use crate::input::ControlEvent;

const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);

fn main() -> ExitCode {
    env_logger::init();

    let Some(rom_path) = env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: mango8 <rom>");
        return ExitCode::FAILURE;
    };

    match run(rom_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mango8: {}", err);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(rom_path: PathBuf) -> Result<(), Error> {
    let config = Config::default();
    let rom = fs::read(&rom_path).map_err(|source| Error::RomUnreadable {
        path: rom_path.clone(),
        source,
    })?;

    let renderer = Renderer::new("mango-8", &config)?;
    let beeper = Beeper::new(&config)?;
    let ctx = DesktopContext::new(renderer, beeper, config.seed);

    let mut chip = Builder::new(ctx).with_quirks(config.quirks).load(&rom)?;
    info!(
        "running {} ({} bytes) at {} instructions per second",
        rom_path.display(),
        rom.len(),
        config.inst_per_sec
    );

    let steps = config.steps_per_frame();
    loop {
        let frame_start = Instant::now();

        if let Some(event) = chip.ctx.pump() {
            match event {
                ControlEvent::Quit => chip.set_state(State::Quit),
                ControlEvent::Restart => chip.set_state(State::Restart),
                ControlEvent::TogglePause => match chip.state() {
                    State::Running => {
                        info!("paused");
                        chip.set_state(State::Paused);
                    }
                    State::Paused => {
                        info!("resumed");
                        chip.set_state(State::Running);
                    }
                    _ => {}
                },
            }
        }

        match chip.state() {
            State::Running => {
                for _ in 0..steps {
                    chip.step();
                }
            }
            State::Paused => {}
            State::Quit => break,
            State::Restart => {
                info!("restarting");
                chip.reset(&rom)?;
                continue;
            }
        }

        chip.tick_timers();
        chip.present();

        // cap the loop at 60 Hz; an overrun frame is simply late, timer
        // ticks are never skipped to catch up
        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    info!("clean shutdown");
    Ok(())
}
