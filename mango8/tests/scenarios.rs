//! Whole-program scenarios: tiny literal ROMs stepped through the public
//! API, with the display rendered to strings for comparison.

use mango8::{Builder, Chip8, Context, FrameView};
use nanorand::{Pcg64, Rng};

struct TestContext {
    screen: Vec<String>,
    keys: [bool; 16],
    sound: bool,
    rng: Pcg64,
}

impl TestContext {
    fn new() -> Self {
        Self {
            screen: Vec::new(),
            keys: [false; 16],
            sound: false,
            rng: Pcg64::new_seed(0),
        }
    }
}

impl Context for TestContext {
    fn on_frame(&mut self, frame: FrameView<'_>) {
        self.screen = frame
            .iter_rows_as_bitslices()
            .map(|row| {
                row.iter()
                    .by_vals()
                    .map(|p| if p { '#' } else { '.' })
                    .collect()
            })
            .collect();
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

fn boot(rom: &[u8]) -> Chip8<TestContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    Builder::new(TestContext::new()).load(rom).unwrap()
}

fn run(chip: &mut Chip8<TestContext>, steps: usize) {
    for _ in 0..steps {
        chip.step();
    }
}

fn lit_pixels(chip: &Chip8<TestContext>) -> u32 {
    chip.frame().as_raw().iter().map(|b| b.count_ones()).sum()
}

#[test]
fn register_add_without_carry() {
    let mut chip = boot(&[0x60, 0x05, 0x61, 0x07, 0x80, 0x14, 0x00, 0x00]);
    run(&mut chip, 3);
    assert_eq!(chip.v()[0], 0x0C);
    assert_eq!(chip.v()[1], 0x07);
    assert_eq!(chip.v()[0xF], 0);
}

#[test]
fn register_add_with_carry() {
    let mut chip = boot(&[0x60, 0xFF, 0x61, 0x01, 0x80, 0x14]);
    run(&mut chip, 3);
    assert_eq!(chip.v()[0], 0x00);
    assert_eq!(chip.v()[0xF], 1);
}

#[test]
fn sprite_draw_renders_the_zero_glyph() {
    #[rustfmt::skip]
    let rom = [
        0x60, 0x00, // V0 = 0
        0x61, 0x00, // V1 = 0
        0xA2, 0x0A, // I = sprite data below
        0xD0, 0x15, // draw 5 rows at (V0, V1)
        0x12, 0x06, // spin on the draw's next address
        0xF0, 0x90, 0x90, 0x90, 0xF0,
    ];
    let mut chip = boot(&rom);
    run(&mut chip, 4);

    assert_eq!(lit_pixels(&chip), 14);
    assert_eq!(chip.v()[0xF], 0);

    chip.present();
    let screen = &chip.ctx.screen;
    assert!(screen[0].starts_with("####"));
    assert!(screen[1].starts_with("#..#"));
    assert!(screen[2].starts_with("#..#"));
    assert!(screen[3].starts_with("#..#"));
    assert!(screen[4].starts_with("####"));
    assert!(screen[5].starts_with("...."));
}

#[test]
fn drawing_the_same_sprite_twice_erases_it() {
    #[rustfmt::skip]
    let rom = [
        0x60, 0x00,
        0x61, 0x00,
        0xA2, 0x0A,
        0xD0, 0x15,
        0xD0, 0x15,
        0xF0, 0x90, 0x90, 0x90, 0xF0,
    ];
    let mut chip = boot(&rom);
    run(&mut chip, 4);
    assert_eq!(lit_pixels(&chip), 14);
    assert_eq!(chip.v()[0xF], 0);

    run(&mut chip, 1);
    assert_eq!(lit_pixels(&chip), 0);
    assert_eq!(chip.v()[0xF], 1);
}

#[test]
fn call_and_return() {
    let mut chip = boot(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]);
    run(&mut chip, 2);
    assert_eq!(chip.pc(), 0x202);
    assert_eq!(chip.stack_depth(), 0);
}

#[test]
fn bcd_of_171() {
    let mut chip = boot(&[0x63, 0xAB, 0xA3, 0x00, 0xF3, 0x33]);
    run(&mut chip, 3);
    assert_eq!(&chip.memory()[0x300..0x303], &[1, 7, 1]);
}

#[test]
fn delay_timer_reaches_zero_after_sixty_ticks() {
    #[rustfmt::skip]
    let rom = [
        0x60, 0x3C, // V0 = 60
        0xF0, 0x15, // DT = V0
        0xF1, 0x07, // V1 = DT
        0x12, 0x04, // loop back to the read
    ];
    let mut chip = boot(&rom);
    run(&mut chip, 3);
    assert_eq!(chip.v()[1], 60);

    let mut previous = 60u8;
    for _ in 0..60 {
        chip.tick_timers();
        run(&mut chip, 2); // jump back, read again
        assert!(chip.v()[1] <= previous);
        previous = chip.v()[1];
    }
    assert_eq!(chip.v()[1], 0);
}

#[test]
fn sound_timer_gates_the_tone_per_tick() {
    let mut chip = boot(&[0x60, 0x02, 0xF0, 0x18]);
    run(&mut chip, 2);
    assert!(!chip.ctx.sound);

    chip.tick_timers();
    assert!(chip.ctx.sound);
    chip.tick_timers(); // the tick that reaches zero is still audible
    assert!(chip.ctx.sound);
    chip.tick_timers();
    assert!(!chip.ctx.sound);
}

#[test]
fn wait_key_completes_on_release_only() {
    let mut chip = boot(&[0xF4, 0x0A]);

    for _ in 0..3 {
        chip.step();
        assert_eq!(chip.pc(), 0x200);
    }

    chip.ctx.keys[0x7] = true;
    for _ in 0..3 {
        chip.step(); // held across several frames: still waiting
        assert_eq!(chip.pc(), 0x200);
    }

    chip.ctx.keys[0x7] = false;
    chip.step();
    assert_eq!(chip.pc(), 0x202);
    assert_eq!(chip.v()[4], 0x7);
}

#[test]
fn unrecognized_words_do_not_stop_execution() {
    let mut chip = boot(&[0x5A, 0xB1, 0x61, 0x07]);
    run(&mut chip, 2);
    assert_eq!(chip.pc(), 0x204);
    assert_eq!(chip.v()[1], 0x07);
}
