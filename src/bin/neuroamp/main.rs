//! neuroamp - run the effects engine from a terminal
//!
//! Run with: cargo run -- live --preset "Blues Breaker" --pattern basic-rock

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use neuroamp_dsp::params::{HihatType, KickType, RhythmSettings, SnareType};

#[derive(Parser)]
#[command(name = "neuroamp")]
#[command(about = "Realtime guitar and vocal effects with a drum machine and loop recorder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play through the default input and output devices
    Live(LiveArgs),
    /// Render a WAV file through the chain offline
    Bounce(BounceArgs),
    /// List the factory tone presets
    Presets,
    /// List the built-in drum patterns
    Patterns,
}

/// Drum kit: one timbre per lane.
#[derive(Clone, Copy, ValueEnum)]
enum Kit {
    Classic,
    Punchy,
    Electronic,
}

#[derive(Args)]
struct ToneArgs {
    /// Factory preset to load
    #[arg(long, default_value = "Clean Start")]
    preset: String,

    /// Drum pattern to play; drums stay off when omitted
    #[arg(long)]
    pattern: Option<String>,

    #[arg(long, default_value_t = 120.0)]
    bpm: f64,

    #[arg(long, value_enum, default_value_t = Kit::Classic)]
    kit: Kit,

    /// Drum volume, 0 to 1
    #[arg(long, default_value_t = 0.6)]
    drum_volume: f32,
}

impl ToneArgs {
    fn rhythm(&self) -> RhythmSettings {
        let (kick, snare, hihat) = match self.kit {
            Kit::Classic => (KickType::Classic, SnareType::Classic, HihatType::Classic),
            Kit::Punchy => (KickType::Heavy, SnareType::Tight, HihatType::Acoustic),
            Kit::Electronic => (KickType::Electronic, SnareType::Electronic, HihatType::Electronic),
        };
        RhythmSettings {
            bpm: self.bpm,
            pattern: self
                .pattern
                .clone()
                .unwrap_or_else(|| RhythmSettings::default().pattern),
            volume: self.drum_volume,
            is_playing: self.pattern.is_some(),
            kick,
            snare,
            hihat,
        }
    }
}

#[derive(Args)]
struct LiveArgs {
    #[command(flatten)]
    tone: ToneArgs,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Record the session and write the take here
    #[arg(long)]
    record: Option<PathBuf>,
}

#[derive(Args)]
struct BounceArgs {
    #[command(flatten)]
    tone: ToneArgs,

    /// Dry WAV to process
    input: PathBuf,

    /// 16-bit stereo WAV to write
    output: PathBuf,

    #[arg(long, default_value_t = neuroamp_dsp::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Seconds of silence rendered after the input so tails ring out
    #[arg(long, default_value_t = 2.0)]
    tail: f64,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Live(args) => commands::live(args),
        Command::Bounce(args) => commands::bounce(args),
        Command::Presets => {
            commands::list_presets();
            Ok(())
        }
        Command::Patterns => {
            commands::list_patterns();
            Ok(())
        }
    }
}
