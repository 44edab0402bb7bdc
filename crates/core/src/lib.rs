//! Core library for the Wav Visualiser application.
//!
//! The crate owns the three subsystems with real algorithmic content: a
//! strict RIFF/WAVE parser that turns raw bytes into a validated format plus
//! a PCM sample buffer, a radix-2 FFT engine that turns sample windows into
//! magnitude spectra, and a playback engine that paces sample consumption
//! against wall-clock time. UI concerns such as file dialogs and bar-chart
//! rendering live with the consumer, which feeds raw bytes in and receives
//! spectrum buffers through a callback.

pub mod config;
pub mod endian;
pub mod error;
pub mod playback;
pub mod spectrum;
pub mod wav;

/// Complex number crate backing the spectrum engine, re-exported so
/// consumers can build transform inputs without a direct dependency.
pub use num_complex;

pub use config::{AppConfig, AudioConfig};
pub use error::{Result, WavVizError};
pub use playback::{PlaybackPhase, Player, WINDOW_FRAMES};
pub use wav::{AudioFormat, ChannelCount, WavAudio};
