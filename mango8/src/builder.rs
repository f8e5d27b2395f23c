use crate::chip::Chip8;
use crate::context::Context;
use crate::error::Error;
use crate::quirks::Quirks;

/// Fluent front door of the crate: wire a platform context, optionally
/// re-tune the quirks, and install a program.
pub struct Builder<C: Context> {
    ctx: C,
    quirks: Quirks,
}

impl<C: Context> Builder<C> {
    pub fn new(ctx: C) -> Self {
        Self {
            ctx,
            quirks: Quirks::default(),
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn load(self, rom: &[u8]) -> Result<Chip8<C>, Error> {
        Chip8::load(self.ctx, self.quirks, rom)
    }
}
