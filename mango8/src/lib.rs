#![no_std]
pub mod builder;
pub mod chip;
pub mod context;
pub mod error;
pub mod frame;
pub mod opcode;
pub mod quirks;
pub mod timer;

pub use builder::Builder;
pub use chip::{Chip8, State};
pub use context::Context;
pub use error::Error;
pub use frame::{Frame, FrameView, HEIGHT, WIDTH};
pub use opcode::OpCode;
pub use quirks::Quirks;
