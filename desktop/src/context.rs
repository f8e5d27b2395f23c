use std::time::{SystemTime, UNIX_EPOCH};

use mango8::{Context, FrameView};
use nanorand::{Pcg64, Rng};

use crate::audio::Beeper;
use crate::display::Renderer;
use crate::input::{self, ControlEvent};

/// Window, beeper and keyboard glued together into the machine's platform
/// [`Context`].
pub struct DesktopContext {
    renderer: Renderer,
    beeper: Beeper,
    keys: [bool; 16],
    rng: Pcg64,
}

impl DesktopContext {
    pub fn new(renderer: Renderer, beeper: Beeper, seed: Option<u128>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos())
                .unwrap_or(0)
        });
        Self {
            renderer,
            beeper,
            keys: [false; 16],
            rng: Pcg64::new_seed(seed),
        }
    }

    /// Drain host input: refresh the keypad snapshot and report control
    /// events. Called once at the top of every frame.
    pub fn pump(&mut self) -> Option<ControlEvent> {
        let window = self.renderer.window();
        self.keys = input::read_keypad(window);
        input::poll_control(window)
    }
}

impl Context for DesktopContext {
    fn on_frame(&mut self, frame: FrameView<'_>) {
        self.renderer.draw(frame);
    }

    fn sound_on(&mut self) {
        self.beeper.set_on(true);
    }

    fn sound_off(&mut self) {
        self.beeper.set_on(false);
    }

    fn get_keys(&mut self) -> [bool; 16] {
        self.keys
    }

    fn gen_random(&mut self) -> u8 {
        self.rng.generate::<u8>()
    }
}
