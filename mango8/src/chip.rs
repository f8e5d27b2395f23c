//! The CHIP-8 virtual machine.
//!
//! Platform access goes through the [`Context`] trait; everything else is
//! owned by [`Chip8`]. The host drives it with [`Chip8::step`] at the
//! configured instruction rate, [`Chip8::tick_timers`] and
//! [`Chip8::present`] once per 60 Hz frame.

use core::convert::TryFrom;

use heapless::Vec;
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::context::Context;
use crate::error::Error;
use crate::frame::{Frame, FrameView, HEIGHT, WIDTH};
use crate::opcode::OpCode;
use crate::quirks::Quirks;
use crate::timer::{Timer, TimerState};

pub const MEM_LEN: usize = 4096;
pub const START_ADDR: u16 = 0x200;
/// Largest program image that fits between the start address and the end of
/// memory.
pub const MAX_ROM_LEN: usize = MEM_LEN - START_ADDR as usize;

const FONT_ADDR: usize = 0x000;
const GLYPH_LEN: u16 = 5;
const STACK_DEPTH: usize = 12;

/// The resident hex font. Programs compute `I = digit * 5` and read five
/// bytes, so the byte values and the address are fixed.
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Run-state of the machine. The host input mapper writes it through
/// [`Chip8::set_state`]; the frame scheduler observes it at frame
/// boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    Paused,
    Quit,
    Restart,
}

/// CHIP-8 virtual machine: register file, RAM, call stack, display grid,
/// keypad snapshot, timers, and the platform context.
pub struct Chip8<C: Context> {
    pub ctx: C,
    quirks: Quirks,
    memory: [u8; MEM_LEN],
    v: [u8; 16],
    i: u16,
    pc: u16,
    stack: Vec<u16, STACK_DEPTH>,
    frame: Frame,
    keys: [bool; 16],
    delay_timer: Timer,
    sound_timer: Timer,
    state: State,
    /// FX0A progress: the key seen pressed, kept until it is released.
    waiting_key: Option<u8>,
}

impl<C: Context> Chip8<C> {
    /// Build a machine with `rom` installed at 0x200 and the font at 0x000.
    /// See [`crate::Builder`] for the fluent variant.
    pub fn load(ctx: C, quirks: Quirks, rom: &[u8]) -> Result<Self, Error> {
        let mut chip = Self {
            ctx,
            quirks,
            memory: [0; MEM_LEN],
            v: [0; 16],
            i: 0,
            pc: START_ADDR,
            stack: Vec::new(),
            frame: Frame::new(),
            keys: [false; 16],
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
            state: State::Running,
            waiting_key: None,
        };
        chip.reset(rom)?;
        Ok(chip)
    }

    /// Reinstall `rom` from scratch. Everything except the platform context
    /// is zeroed first; used at startup and for the restart control input.
    pub fn reset(&mut self, rom: &[u8]) -> Result<(), Error> {
        if rom.len() > MAX_ROM_LEN {
            return Err(Error::RomTooLarge {
                len: rom.len(),
                max: MAX_ROM_LEN,
            });
        }
        self.memory = [0; MEM_LEN];
        self.memory[FONT_ADDR..FONT_ADDR + FONT.len()].copy_from_slice(&FONT);
        self.memory[START_ADDR as usize..START_ADDR as usize + rom.len()].copy_from_slice(rom);
        self.v = [0; 16];
        self.i = 0;
        self.pc = START_ADDR;
        self.stack.clear();
        self.frame.clear();
        self.keys = [false; 16];
        self.delay_timer.store(0);
        self.sound_timer.store(0);
        self.waiting_key = None;
        self.state = State::Running;
        Ok(())
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Control inputs (quit, pause, restart) land here.
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// The data registers V0..=VF.
    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// The index register I.
    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    /// Fetch, decode and execute a single instruction.
    ///
    /// Malformed words are logged and skipped; the program counter has
    /// already moved past them. Nothing here can leave the 4 KiB sandbox:
    /// every memory index is masked.
    pub fn step(&mut self) {
        self.keys = self.ctx.get_keys();
        let raw = self.fetch();
        match OpCode::try_from(raw) {
            Ok(op) => {
                self.trace_op(raw, op);
                self.execute(op);
            }
            Err(_) => debug!(
                "{:03X}: unrecognized opcode word {:04X}, skipping",
                self.pc.wrapping_sub(2),
                raw
            ),
        }
    }

    fn fetch(&mut self) -> u16 {
        let hi = self.read_mem(self.pc);
        let lo = self.read_mem(self.pc.wrapping_add(1));
        self.pc = self.pc.wrapping_add(2);
        (hi as u16) << 8 | lo as u16
    }

    /// Decrement both timers and gate the tone; call at 60 Hz, once per
    /// frame, independent of the instruction rate.
    pub fn tick_timers(&mut self) {
        self.delay_timer.decrement();
        match self.sound_timer.decrement() {
            TimerState::On | TimerState::Finished => self.ctx.sound_on(),
            TimerState::Off => self.ctx.sound_off(),
        }
    }

    /// Hand the current display grid to the context; call once per frame.
    pub fn present(&mut self) {
        self.ctx.on_frame(self.frame.view());
    }

    fn read_mem(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEM_LEN]
    }

    fn write_mem(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize % MEM_LEN] = value;
    }

    fn skip_next(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    fn rewind(&mut self) {
        self.pc = self.pc.wrapping_sub(2);
    }
}

// Opcode implementations. `pc` already points past the instruction when
// these run; VF is always written after the destination register, so an
// 8XY_ with X == 0xF ends up holding the flag.
impl<C: Context> Chip8<C> {
    fn execute(&mut self, op: OpCode) {
        match op {
            OpCode::Sys { nnn } => self.machine_call(nnn),
            OpCode::Cls => self.clear_display(),
            OpCode::Ret => self.return_from_call(),
            OpCode::Jp { nnn } => self.jump(nnn),
            OpCode::Call { nnn } => self.call(nnn),
            OpCode::SeNn { x, nn } => self.skip_eq_imm(x, nn),
            OpCode::SneNn { x, nn } => self.skip_ne_imm(x, nn),
            OpCode::SeVy { x, y } => self.skip_eq_reg(x, y),
            OpCode::LdNn { x, nn } => self.load_imm(x, nn),
            OpCode::AddNn { x, nn } => self.add_imm(x, nn),
            OpCode::LdVy { x, y } => self.copy_reg(x, y),
            OpCode::Or { x, y } => self.or_reg(x, y),
            OpCode::And { x, y } => self.and_reg(x, y),
            OpCode::Xor { x, y } => self.xor_reg(x, y),
            OpCode::AddVy { x, y } => self.add_reg(x, y),
            OpCode::Sub { x, y } => self.sub_reg(x, y),
            OpCode::Shr { x, y } => self.shift_right(x, y),
            OpCode::Subn { x, y } => self.sub_reg_reversed(x, y),
            OpCode::Shl { x, y } => self.shift_left(x, y),
            OpCode::SneVy { x, y } => self.skip_ne_reg(x, y),
            OpCode::LdI { nnn } => self.load_index(nnn),
            OpCode::JpV0 { nnn } => self.jump_offset(nnn),
            OpCode::Rnd { x, nn } => self.random(x, nn),
            OpCode::Drw { x, y, n } => self.draw_sprite(x, y, n),
            OpCode::Skp { x } => self.skip_key_held(x),
            OpCode::Sknp { x } => self.skip_key_idle(x),
            OpCode::LdDt { x } => self.read_delay(x),
            OpCode::LdKey { x } => self.wait_key(x),
            OpCode::SetDt { x } => self.set_delay(x),
            OpCode::SetSt { x } => self.set_sound(x),
            OpCode::AddI { x } => self.add_index(x),
            OpCode::LdFont { x } => self.font_addr(x),
            OpCode::Bcd { x } => self.store_bcd(x),
            OpCode::Store { x } => self.store_regs(x),
            OpCode::Load { x } => self.load_regs(x),
        }
    }

    fn machine_call(&mut self, nnn: u16) {
        // 1802 machine-code routines have no host equivalent
        debug!("SYS {:03X} ignored", nnn);
    }

    fn clear_display(&mut self) {
        self.frame.clear();
    }

    fn return_from_call(&mut self) {
        match self.stack.pop() {
            Some(addr) => self.pc = addr,
            None => warn!("RET with an empty call stack, skipping"),
        }
    }

    fn jump(&mut self, nnn: u16) {
        self.pc = nnn;
    }

    fn call(&mut self, nnn: u16) {
        match self.stack.push(self.pc) {
            Ok(()) => self.pc = nnn,
            Err(_) => warn!(
                "CALL {:03X} with all {} stack slots in use, skipping",
                nnn, STACK_DEPTH
            ),
        }
    }

    fn skip_eq_imm(&mut self, x: u8, nn: u8) {
        if self.v[x as usize] == nn {
            self.skip_next();
        }
    }

    fn skip_ne_imm(&mut self, x: u8, nn: u8) {
        if self.v[x as usize] != nn {
            self.skip_next();
        }
    }

    fn skip_eq_reg(&mut self, x: u8, y: u8) {
        if self.v[x as usize] == self.v[y as usize] {
            self.skip_next();
        }
    }

    fn skip_ne_reg(&mut self, x: u8, y: u8) {
        if self.v[x as usize] != self.v[y as usize] {
            self.skip_next();
        }
    }

    fn load_imm(&mut self, x: u8, nn: u8) {
        self.v[x as usize] = nn;
    }

    fn add_imm(&mut self, x: u8, nn: u8) {
        self.v[x as usize] = self.v[x as usize].wrapping_add(nn);
    }

    fn copy_reg(&mut self, x: u8, y: u8) {
        self.v[x as usize] = self.v[y as usize];
    }

    fn or_reg(&mut self, x: u8, y: u8) {
        self.v[x as usize] |= self.v[y as usize];
        if self.quirks.reset_vf_on_logic {
            self.v[0xF] = 0;
        }
    }

    fn and_reg(&mut self, x: u8, y: u8) {
        self.v[x as usize] &= self.v[y as usize];
        if self.quirks.reset_vf_on_logic {
            self.v[0xF] = 0;
        }
    }

    fn xor_reg(&mut self, x: u8, y: u8) {
        self.v[x as usize] ^= self.v[y as usize];
        if self.quirks.reset_vf_on_logic {
            self.v[0xF] = 0;
        }
    }

    fn add_reg(&mut self, x: u8, y: u8) {
        let (value, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[0xF] = carry as u8;
    }

    fn sub_reg(&mut self, x: u8, y: u8) {
        let (value, borrow) = self.v[x as usize].overflowing_sub(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[0xF] = !borrow as u8;
    }

    fn sub_reg_reversed(&mut self, x: u8, y: u8) {
        let (value, borrow) = self.v[y as usize].overflowing_sub(self.v[x as usize]);
        self.v[x as usize] = value;
        self.v[0xF] = !borrow as u8;
    }

    fn shift_right(&mut self, x: u8, y: u8) {
        let src = if self.quirks.shift_reads_vy {
            self.v[y as usize]
        } else {
            self.v[x as usize]
        };
        self.v[x as usize] = src >> 1;
        self.v[0xF] = src & 1;
    }

    fn shift_left(&mut self, x: u8, y: u8) {
        let src = if self.quirks.shift_reads_vy {
            self.v[y as usize]
        } else {
            self.v[x as usize]
        };
        self.v[x as usize] = src << 1;
        self.v[0xF] = src >> 7;
    }

    fn load_index(&mut self, nnn: u16) {
        self.i = nnn;
    }

    fn jump_offset(&mut self, nnn: u16) {
        self.pc = (self.v[0] as u16 + nnn) % MEM_LEN as u16;
    }

    fn random(&mut self, x: u8, nn: u8) {
        self.v[x as usize] = self.ctx.gen_random() & nn;
    }

    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) {
        let x0 = self.v[x as usize] as usize % WIDTH;
        let y0 = self.v[y as usize] as usize % HEIGHT;
        self.v[0xF] = 0;
        for row in 0..n as u16 {
            let py = if self.quirks.wrap_sprites {
                (y0 + row as usize) % HEIGHT
            } else if y0 + row as usize >= HEIGHT {
                break;
            } else {
                y0 + row as usize
            };
            let byte = self.read_mem(self.i.wrapping_add(row));
            for bit in 0..8usize {
                let px = if self.quirks.wrap_sprites {
                    (x0 + bit) % WIDTH
                } else if x0 + bit >= WIDTH {
                    break;
                } else {
                    x0 + bit
                };
                if byte >> (7 - bit) & 1 == 1 && self.frame.flip(px, py) {
                    self.v[0xF] = 1;
                }
            }
        }
    }

    fn skip_key_held(&mut self, x: u8) {
        if self.keys[(self.v[x as usize] & 0xF) as usize] {
            self.skip_next();
        }
    }

    fn skip_key_idle(&mut self, x: u8) {
        if !self.keys[(self.v[x as usize] & 0xF) as usize] {
            self.skip_next();
        }
    }

    fn read_delay(&mut self, x: u8) {
        self.v[x as usize] = self.delay_timer.load();
    }

    /// FX0A wants a full press: the first key seen down is remembered, the
    /// wait only completes once that key comes back up. Until then the
    /// program counter is rewound so the instruction runs again next step.
    fn wait_key(&mut self, x: u8) {
        match self.waiting_key {
            None => {
                if let Some(key) = self.keys.iter().position(|&held| held) {
                    self.waiting_key = Some(key as u8);
                }
                self.rewind();
            }
            Some(key) if self.keys[key as usize] => self.rewind(),
            Some(key) => {
                self.v[x as usize] = key;
                self.waiting_key = None;
            }
        }
    }

    fn set_delay(&mut self, x: u8) {
        self.delay_timer.store(self.v[x as usize]);
    }

    fn set_sound(&mut self, x: u8) {
        self.sound_timer.store(self.v[x as usize]);
    }

    fn add_index(&mut self, x: u8) {
        self.i = self.i.wrapping_add(self.v[x as usize] as u16);
    }

    fn font_addr(&mut self, x: u8) {
        self.i = FONT_ADDR as u16 + (self.v[x as usize] & 0xF) as u16 * GLYPH_LEN;
    }

    fn store_bcd(&mut self, x: u8) {
        let value = self.v[x as usize];
        self.write_mem(self.i, value / 100);
        self.write_mem(self.i.wrapping_add(1), value / 10 % 10);
        self.write_mem(self.i.wrapping_add(2), value % 10);
    }

    fn store_regs(&mut self, x: u8) {
        for idx in 0..=x as u16 {
            self.write_mem(self.i.wrapping_add(idx), self.v[idx as usize]);
        }
        if self.quirks.increment_i_on_copy {
            self.i = self.i.wrapping_add(x as u16 + 1);
        }
    }

    fn load_regs(&mut self, x: u8) {
        for idx in 0..=x as u16 {
            self.v[idx as usize] = self.read_mem(self.i.wrapping_add(idx));
        }
        if self.quirks.increment_i_on_copy {
            self.i = self.i.wrapping_add(x as u16 + 1);
        }
    }
}

// Tracer: one human-readable line per executed instruction, with the
// operand register values as they were before execution. Read-only.
impl<C: Context> Chip8<C> {
    #[rustfmt::skip]
    fn trace_op(&self, raw: u16, op: OpCode) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        let at = self.pc.wrapping_sub(2);
        let v = &self.v;
        match op {
            OpCode::Sys { nnn }     => trace!("{at:03X}: {raw:04X}  SYS {nnn:03X}"),
            OpCode::Cls             => trace!("{at:03X}: {raw:04X}  CLS"),
            OpCode::Ret             => trace!("{at:03X}: {raw:04X}  RET"),
            OpCode::Jp { nnn }      => trace!("{at:03X}: {raw:04X}  JP {nnn:03X}"),
            OpCode::Call { nnn }    => trace!("{at:03X}: {raw:04X}  CALL {nnn:03X}"),
            OpCode::SeNn { x, nn }  => trace!("{at:03X}: {raw:04X}  SE V{x:X}({:02X}), {nn:02X}", v[x as usize]),
            OpCode::SneNn { x, nn } => trace!("{at:03X}: {raw:04X}  SNE V{x:X}({:02X}), {nn:02X}", v[x as usize]),
            OpCode::SeVy { x, y }   => trace!("{at:03X}: {raw:04X}  SE V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::LdNn { x, nn }  => trace!("{at:03X}: {raw:04X}  LD V{x:X}, {nn:02X}"),
            OpCode::AddNn { x, nn } => trace!("{at:03X}: {raw:04X}  ADD V{x:X}({:02X}), {nn:02X}", v[x as usize]),
            OpCode::LdVy { x, y }   => trace!("{at:03X}: {raw:04X}  LD V{x:X}, V{y:X}({:02X})", v[y as usize]),
            OpCode::Or { x, y }     => trace!("{at:03X}: {raw:04X}  OR V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::And { x, y }    => trace!("{at:03X}: {raw:04X}  AND V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::Xor { x, y }    => trace!("{at:03X}: {raw:04X}  XOR V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::AddVy { x, y }  => trace!("{at:03X}: {raw:04X}  ADD V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::Sub { x, y }    => trace!("{at:03X}: {raw:04X}  SUB V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::Shr { x, y }    => trace!("{at:03X}: {raw:04X}  SHR V{x:X}, V{y:X}({:02X})", v[y as usize]),
            OpCode::Subn { x, y }   => trace!("{at:03X}: {raw:04X}  SUBN V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::Shl { x, y }    => trace!("{at:03X}: {raw:04X}  SHL V{x:X}, V{y:X}({:02X})", v[y as usize]),
            OpCode::SneVy { x, y }  => trace!("{at:03X}: {raw:04X}  SNE V{x:X}({:02X}), V{y:X}({:02X})", v[x as usize], v[y as usize]),
            OpCode::LdI { nnn }     => trace!("{at:03X}: {raw:04X}  LD I, {nnn:03X}"),
            OpCode::JpV0 { nnn }    => trace!("{at:03X}: {raw:04X}  JP V0({:02X}), {nnn:03X}", v[0]),
            OpCode::Rnd { x, nn }   => trace!("{at:03X}: {raw:04X}  RND V{x:X}, {nn:02X}"),
            OpCode::Drw { x, y, n } => trace!("{at:03X}: {raw:04X}  DRW V{x:X}({:02X}), V{y:X}({:02X}), {n:X} from I({:03X})", v[x as usize], v[y as usize], self.i),
            OpCode::Skp { x }       => trace!("{at:03X}: {raw:04X}  SKP V{x:X}({:02X})", v[x as usize]),
            OpCode::Sknp { x }      => trace!("{at:03X}: {raw:04X}  SKNP V{x:X}({:02X})", v[x as usize]),
            OpCode::LdDt { x }      => trace!("{at:03X}: {raw:04X}  LD V{x:X}, DT({:02X})", self.delay_timer.load()),
            OpCode::LdKey { x }     => trace!("{at:03X}: {raw:04X}  LD V{x:X}, K"),
            OpCode::SetDt { x }     => trace!("{at:03X}: {raw:04X}  LD DT, V{x:X}({:02X})", v[x as usize]),
            OpCode::SetSt { x }     => trace!("{at:03X}: {raw:04X}  LD ST, V{x:X}({:02X})", v[x as usize]),
            OpCode::AddI { x }      => trace!("{at:03X}: {raw:04X}  ADD I({:03X}), V{x:X}({:02X})", self.i, v[x as usize]),
            OpCode::LdFont { x }    => trace!("{at:03X}: {raw:04X}  LD F, V{x:X}({:02X})", v[x as usize]),
            OpCode::Bcd { x }       => trace!("{at:03X}: {raw:04X}  LD B, V{x:X}({:02X})", v[x as usize]),
            OpCode::Store { x }     => trace!("{at:03X}: {raw:04X}  LD [I({:03X})], V0..V{x:X}", self.i),
            OpCode::Load { x }      => trace!("{at:03X}: {raw:04X}  LD V0..V{x:X}, [I({:03X})]", self.i),
        }
    }
}
