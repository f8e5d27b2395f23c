use mango8::Quirks;

/// Runtime knobs of the frontend. Colors are RGBA8888 like the rest of the
/// display contract; the renderer converts them for the window buffer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Color of a lit pixel.
    pub fg_color: u32,
    /// Color of a dark pixel, and of the outline on lit ones.
    pub bg_color: u32,
    /// Window pixels per CHIP-8 pixel.
    pub scale: usize,
    /// Interpreter rate, decoupled from the 60 Hz frame cadence.
    pub inst_per_sec: u32,
    /// Square wave frequency in Hz.
    pub tone_freq: u32,
    /// Square wave amplitude as a signed 16-bit level.
    pub volume: i16,
    /// Requested audio sample rate in Hz.
    pub sample_rate: u32,
    /// Draw lit pixels with a background-colored border.
    pub pixel_outlines: bool,
    /// Fixed RNG seed for reproducible runs; the wall clock otherwise.
    pub seed: Option<u128>,
    /// Behaviour switches handed to the core.
    pub quirks: Quirks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fg_color: 0x00FF00FF, // green
            bg_color: 0x000000FF, // black
            scale: 20,
            inst_per_sec: 700,
            tone_freq: 440,
            volume: 3000,
            sample_rate: 44100,
            pixel_outlines: true,
            seed: None,
            quirks: Quirks::default(),
        }
    }
}

impl Config {
    /// Instructions executed per 60 Hz frame, rounded up so slow rates
    /// still make progress.
    pub fn steps_per_frame(&self) -> u32 {
        self.inst_per_sec.div_ceil(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_per_frame_rounds_up() {
        let mut config = Config::default();
        assert_eq!(config.steps_per_frame(), 12); // 700 / 60 rounded up

        config.inst_per_sec = 600;
        assert_eq!(config.steps_per_frame(), 10);

        config.inst_per_sec = 1;
        assert_eq!(config.steps_per_frame(), 1);
    }
}
