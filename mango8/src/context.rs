use crate::frame::FrameView;

/// Host collaborators of the virtual machine.
///
/// The core never touches a window, an audio device or a keyboard directly;
/// everything platform-specific arrives through an implementation of this
/// trait. Swapping implementations must not change interpreter behaviour.
pub trait Context {
    /// Present a finished frame. Called once per 60 Hz frame, after the
    /// instruction batch and the timer tick.
    fn on_frame(&mut self, frame: FrameView<'_>);
    /// Assert the tone output. Idempotent.
    fn sound_on(&mut self);
    /// Release the tone output. Idempotent.
    fn sound_off(&mut self);
    /// Snapshot of the held state of the 16 keypad keys, indexed 0x0..=0xF.
    fn get_keys(&mut self) -> [bool; 16];
    /// Uniform random byte for CXNN. Implementations should be seedable so
    /// runs can be reproduced.
    fn gen_random(&mut self) -> u8;
}

#[cfg(test)]
pub mod testing {
    use super::*;

    use nanorand::{Pcg64, Rng};

    use crate::utils::testing::{ImageMask, ToMask};

    /// Scriptable context for the unit tests: keys are toggled by hand, the
    /// last presented frame and the tone gate are recorded.
    pub struct TestingContext {
        keys: [bool; 16],
        sound: bool,
        frame: Option<ImageMask>,
        rng: Pcg64,
    }

    impl TestingContext {
        pub fn new(seed: u128) -> Self {
            Self {
                keys: [false; 16],
                sound: false,
                frame: None,
                rng: Pcg64::new_seed(seed),
            }
        }

        pub fn set_key(&mut self, key: u8) {
            self.keys[key as usize] = true;
        }

        pub fn reset_key(&mut self, key: u8) {
            self.keys[key as usize] = false;
        }

        pub fn is_sound_on(&self) -> bool {
            self.sound
        }

        pub fn frame(&self) -> Option<&ImageMask> {
            self.frame.as_ref()
        }
    }

    impl Context for TestingContext {
        fn on_frame(&mut self, frame: FrameView<'_>) {
            self.frame = Some(frame.to_mask());
        }

        fn sound_on(&mut self) {
            self.sound = true;
        }

        fn sound_off(&mut self) {
            self.sound = false;
        }

        fn get_keys(&mut self) -> [bool; 16] {
            self.keys
        }

        fn gen_random(&mut self) -> u8 {
            self.rng.generate::<u8>()
        }
    }

    #[test]
    fn records_sound_and_keys() {
        let mut ctx = TestingContext::new(0);
        assert!(!ctx.is_sound_on());
        ctx.sound_on();
        assert!(ctx.is_sound_on());
        ctx.sound_off();
        assert!(!ctx.is_sound_on());

        ctx.set_key(0xA);
        assert!(ctx.get_keys()[0xA]);
        ctx.reset_key(0xA);
        assert!(!ctx.get_keys()[0xA]);
    }

    #[test]
    fn random_is_reproducible_per_seed() {
        let mut a = TestingContext::new(42);
        let mut b = TestingContext::new(42);
        for _ in 0..32 {
            assert_eq!(a.gen_random(), b.gen_random());
        }
    }
}
