use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. All of these abort with a non-zero exit code before
/// the frame loop starts; nothing at runtime is fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read rom file {}", path.display())]
    RomUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    RomTooLarge(#[from] mango8::Error),
    #[error("could not open a window")]
    WindowInit(#[from] minifb::Error),
    #[error("no audio output device available")]
    NoAudioDevice,
    #[error("unsupported audio sample format {0}")]
    AudioFormat(cpal::SampleFormat),
    #[error("could not query the audio device")]
    AudioConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("could not build the audio stream")]
    AudioStream(#[from] cpal::BuildStreamError),
    #[error("could not start audio playback")]
    AudioPlay(#[from] cpal::PlayStreamError),
}
