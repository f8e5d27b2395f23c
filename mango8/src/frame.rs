use bitvec::prelude::*;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
const FRAME_BYTES: usize = WIDTH * HEIGHT / 8;

/// Bit-packed 64x32 monochrome display grid.
///
/// Rows are stored top to bottom as eight `Msb0` bytes each, so the raw
/// memory reads left to right exactly like the screen does.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Frame([u8; FRAME_BYTES]);

/// A shared view over a [`Frame`], handed to the display collaborator once
/// per presented frame.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FrameView<'a>(&'a [u8; FRAME_BYTES]);

impl<'a> FrameView<'a> {
    /// Raw row-major `Msb0` bytes of the grid.
    pub fn as_raw(&self) -> &'a [u8] {
        self.0
    }

    /// State of a single pixel; `None` outside the 64x32 grid.
    pub fn get_bit(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        Some(self.0.view_bits::<Msb0>()[y * WIDTH + x])
    }

    /// Iterate rows top to bottom, each as a 64-bit wide [`BitSlice`].
    pub fn iter_rows_as_bitslices(&self) -> impl Iterator<Item = &'a BitSlice<u8, Msb0>> {
        let data: &'a [u8; FRAME_BYTES] = self.0;
        data.chunks(WIDTH / 8).map(|row| row.view_bits::<Msb0>())
    }
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self([0; FRAME_BYTES])
    }

    /// Get a view over the frame.
    pub fn view(&self) -> FrameView<'_> {
        FrameView(&self.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [0; FRAME_BYTES];
    }

    /// XOR a lit sprite pixel into the grid. Returns `true` when the pixel
    /// was already lit, i.e. when this erases it. Callers keep `x`/`y`
    /// inside the grid.
    pub(crate) fn flip(&mut self, x: usize, y: usize) -> bool {
        let bits = self.0.view_bits_mut::<Msb0>();
        let idx = y * WIDTH + x;
        let was = bits[idx];
        bits.set(idx, !was);
        was
    }
}
