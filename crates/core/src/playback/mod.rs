//! Wall-clock paced playback of a decoded sample buffer.
//!
//! A [`Player`] owns the decode result and drives the spectrum engine from a
//! single background worker: each tick it converts the real elapsed time
//! into a sample count and, once a full analysis window has accrued, pushes
//! one magnitude buffer into the caller's sink. Pacing is coarse, with
//! windows landing on tick boundaries rather than exact sample positions.
//!
//! The only shared mutable state is the phase and the cursor, both guarded
//! by one mutex. The sample buffer and format are immutable after decode,
//! so the worker reads them without locking. Cancellation is cooperative:
//! the worker polls the phase between ticks, and [`Player::pause`] blocks
//! until the worker has seen the change, at most one tick interval later.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use num_complex::Complex64;

use crate::spectrum;
use crate::wav::{AudioFormat, WavAudio};

/// Frames per analysis window. A stereo window consumes twice as many
/// interleaved samples and averages each L/R pair down to one mono value.
pub const WINDOW_FRAMES: usize = 256;

/// Default pause between pacing ticks.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle of a [`Player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Not started, finished, or reset; the cursor is wherever the last
    /// playback left it (0 after a reset).
    Stopped,
    /// Exactly one worker is pacing samples.
    Playing,
    /// Paused by the caller; the cursor keeps its position for resume.
    Paused,
}

#[derive(Debug)]
struct PlayerState {
    phase: PlaybackPhase,
    cursor: usize,
}

/// Paced playback engine over one decoded WAV stream.
///
/// Magnitude buffers are delivered synchronously on the worker thread; a
/// sink that blocks indefinitely stalls pacing. Consumers that need to hop
/// execution contexts (UI threads and the like) do their own marshaling.
pub struct Player {
    format: AudioFormat,
    samples: Arc<Vec<i16>>,
    state: Arc<Mutex<PlayerState>>,
    worker: Option<JoinHandle<()>>,
    tick: Duration,
}

impl Player {
    /// Creates a player over a decode result, cursor at the start.
    pub fn new(audio: WavAudio) -> Self {
        Self::with_tick_interval(audio, TICK_INTERVAL)
    }

    /// Creates a player with an explicit pacing tick. Short ticks make
    /// tests fast; the default suits interactive visualisation.
    pub fn with_tick_interval(audio: WavAudio, tick: Duration) -> Self {
        let (format, samples) = audio.into_parts();
        Self {
            format,
            samples: Arc::new(samples),
            state: Arc::new(Mutex::new(PlayerState {
                phase: PlaybackPhase::Stopped,
                cursor: 0,
            })),
            worker: None,
            tick,
        }
    }

    /// Starts playback from wherever the cursor currently is.
    ///
    /// Returns `false` without further action when a worker is already
    /// running, since only one playback per player runs at a time. This is
    /// the already-running signal, not an error.
    pub fn play<F>(&mut self, sink: F) -> bool
    where
        F: FnMut(&[f64]) + Send + 'static,
    {
        let resume_cursor = {
            let mut state = self.lock_state();
            if state.phase == PlaybackPhase::Playing {
                return false;
            }
            state.phase = PlaybackPhase::Playing;
            state.cursor
        };

        // A worker that ran to the end of the buffer has exited but was
        // never joined; collect it before starting the next one.
        if let Some(stale) = self.worker.take() {
            let _ = stale.join();
        }

        let format = self.format;
        let samples = Arc::clone(&self.samples);
        let state = Arc::clone(&self.state);
        let tick = self.tick;
        self.worker = Some(thread::spawn(move || {
            pace_windows(format, &samples, &state, sink, tick, resume_cursor);
        }));

        true
    }

    /// Stops the worker and keeps the cursor for a later resume.
    ///
    /// Blocks until the worker has observed the phase change and exited;
    /// with no external timeout, the wait is bounded by one tick interval.
    /// Does nothing when no playback is running.
    pub fn pause(&mut self) {
        let was_playing = {
            let mut state = self.lock_state();
            if state.phase == PlaybackPhase::Playing {
                state.phase = PlaybackPhase::Paused;
                true
            } else {
                false
            }
        };

        if was_playing {
            if let Some(worker) = self.worker.take() {
                let _ = worker.join();
            }
        }
    }

    /// Pauses if necessary and rewinds the cursor to the start.
    pub fn reset(&mut self) {
        self.pause();
        let mut state = self.lock_state();
        state.phase = PlaybackPhase::Stopped;
        state.cursor = 0;
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.lock_state().phase
    }

    /// Current position in interleaved samples.
    pub fn cursor(&self) -> usize {
        self.lock_state().cursor
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    fn lock_state(&self) -> MutexGuard<'_, PlayerState> {
        // A worker that panicked mid-tick leaves the state usable, so the
        // poison marker carries no information here.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.pause();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("Player")
            .field("format", &self.format)
            .field("samples", &self.samples.len())
            .field("phase", &state.phase)
            .field("cursor", &state.cursor)
            .finish()
    }
}

/// Worker loop: sleep a tick, convert the real elapsed time into samples,
/// and emit one spectrum per accrued window until paused or out of samples.
fn pace_windows<F>(
    format: AudioFormat,
    samples: &[i16],
    state: &Mutex<PlayerState>,
    mut sink: F,
    tick: Duration,
    mut cursor: usize,
) where
    F: FnMut(&[f64]),
{
    let channels = format.channels().count();
    let window_len = WINDOW_FRAMES * channels;
    let mut pending: u64 = 0;
    let mut last_tick = Instant::now();

    while cursor < samples.len() {
        {
            let state = lock(state);
            if state.phase != PlaybackPhase::Playing {
                return;
            }
        }

        thread::sleep(tick);
        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        pending += u64::from(format.sample_rate()) * elapsed.as_millis() as u64 / 1000;

        let remaining = samples.len() - cursor;
        if remaining >= window_len {
            if pending >= window_len as u64 {
                emit(&samples[cursor..cursor + window_len], channels, &mut sink);
                cursor += window_len;
                pending -= window_len as u64;
                lock(state).cursor = cursor;
            }
        } else if pending >= remaining as u64 {
            // Tail shorter than a window: pad with silence and finish.
            emit(&samples[cursor..], channels, &mut sink);
            cursor = samples.len();
            lock(state).cursor = cursor;
        }
    }

    let mut state = lock(state);
    if state.phase == PlaybackPhase::Playing {
        state.phase = PlaybackPhase::Stopped;
    }
}

/// Transforms one window of interleaved samples and hands the magnitude
/// buffer to the sink. Short inputs are zero-padded up to the window size;
/// stereo pairs collapse to their mono midpoint first.
fn emit<F>(samples: &[i16], channels: usize, sink: &mut F)
where
    F: FnMut(&[f64]),
{
    let mut window = vec![Complex64::new(0.0, 0.0); WINDOW_FRAMES];
    if channels == 1 {
        for (slot, sample) in window.iter_mut().zip(samples) {
            slot.re = f64::from(*sample);
        }
    } else {
        for (slot, frame) in window.iter_mut().zip(samples.chunks_exact(2)) {
            slot.re = (f64::from(frame[0]) + f64::from(frame[1])) / 2.0;
        }
    }

    let bars = spectrum::magnitude(&spectrum::forward_transform(&window));
    sink(&bars);
}

fn lock<'a>(state: &'a Mutex<PlayerState>) -> MutexGuard<'a, PlayerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
