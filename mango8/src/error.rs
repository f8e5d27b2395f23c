use core::fmt;

/// Errors surfaced while installing a program image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The image does not fit between the program start address and the end
    /// of the 4 KiB address space.
    RomTooLarge { len: usize, max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::RomTooLarge { len, max } => {
                write!(f, "rom image is {} bytes, at most {} fit in memory", len, max)
            }
        }
    }
}

impl core::error::Error for Error {}
