use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wav_visualiser_core::num_complex::Complex64;
use wav_visualiser_core::{spectrum, AppConfig, PlaybackPhase, Player, WavAudio};

fn main() -> wav_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { input } => run_info(&input),
        Commands::Play { input } => run_play(&input, &config),
        Commands::Preview { input } => run_preview(&input, &config),
    }
}

fn run_info(input: &Path) -> wav_visualiser_core::Result<()> {
    let wav = WavAudio::open(input)?;
    let format = wav.format();

    tracing::info!(
        channels = format.channels().count(),
        sample_rate = format.sample_rate(),
        bits_per_sample = format.bits_per_sample(),
        byte_rate = format.byte_rate(),
        block_align = format.block_align(),
        samples = wav.sample_count(),
        duration_seconds = wav.duration_seconds(),
        "decoded WAV container"
    );
    Ok(())
}

fn run_play(input: &Path, config: &AppConfig) -> wav_visualiser_core::Result<()> {
    let wav = WavAudio::open(input)?;
    let sample_rate = wav.format().sample_rate();
    let mut player =
        Player::with_tick_interval(wav, Duration::from_millis(config.audio.tick_millis));

    let mut window_index = 0u64;
    player.play(move |bars: &[f64]| {
        let (peak_bin, peak) = bars
            .iter()
            .enumerate()
            .fold((0, 0.0_f64), |best, (bin, value)| {
                if *value > best.1 {
                    (bin, *value)
                } else {
                    best
                }
            });
        let peak_hz =
            peak_bin as f64 * f64::from(sample_rate) / (2.0 * (bars.len() as f64 - 1.0));
        tracing::info!(window_index, peak_bin, peak, peak_hz, "spectrum window");
        window_index += 1;
    });

    while player.phase() == PlaybackPhase::Playing {
        thread::sleep(Duration::from_millis(100));
    }
    tracing::info!("playback finished");
    Ok(())
}

fn run_preview(input: &Path, config: &AppConfig) -> wav_visualiser_core::Result<()> {
    let wav = WavAudio::open(input)?;
    let take = config.audio.preview_window.min(wav.sample_count());

    let mut points: Vec<Complex64> = wav.samples()[..take]
        .iter()
        .map(|sample| Complex64::new(f64::from(*sample), 0.0))
        .collect();
    points.resize(config.audio.preview_window, Complex64::new(0.0, 0.0));

    let bars = spectrum::normalize(&spectrum::forward_transform(&points));
    let peak = bars.iter().cloned().fold(0.0_f64, f64::max);
    tracing::info!(
        points = points.len(),
        dc = bars.first().copied().unwrap_or_default(),
        peak,
        "preview spectrum"
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> wav_visualiser_core::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_json_str(&std::fs::read_to_string(path)?),
        None => Ok(AppConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "WAV spectrum visualiser", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a WAV file and report its container facts.
    Info {
        /// Path to the WAV file to inspect.
        input: PathBuf,
    },
    /// Play a WAV file, logging one spectrum line per window.
    Play {
        /// Path to the WAV file to play.
        input: PathBuf,
    },
    /// Run the quick one-shot preview spectrum over the start of a file.
    Preview {
        /// Path to the WAV file to preview.
        input: PathBuf,
    },
}
