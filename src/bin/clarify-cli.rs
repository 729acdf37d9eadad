use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use clarify::logging;
use clarify::opts::Opts;
use clarify::pipeline::Pipeline;

/// One-shot batch equivalent of a dashboard refresh: run a single enhancement pass and
/// emit its artifacts.
fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();

    let opts = Opts::from_env();
    let pipeline = Pipeline::new(params.input.as_deref(), &opts);
    let output = pipeline.render(params.noise_db, params.enhancement)?;

    if let Some(dir) = &params.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        fs::write(dir.join("clean.wav"), &output.clean_audio.bytes)?;
        fs::write(dir.join("noisy.wav"), &output.noisy_audio.bytes)?;
        fs::write(dir.join("enhanced.wav"), &output.enhanced_audio.bytes)?;
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer(&mut writer, &output)?;
    writeln!(writer)?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "clarify")]
#[command(about = "Run one speech-enhancement pipeline pass")]
struct Params {
    /// Clean speech recording; the synthetic reference is used when omitted.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Noise level in dBFS, within [-80, 0].
    #[arg(
        short = 'n',
        long = "noise-db",
        default_value_t = -20.0,
        allow_hyphen_values = true
    )]
    pub noise_db: f32,

    /// Enhancement level within [0, 1].
    #[arg(short = 'e', long = "enhancement", default_value_t = 0.7)]
    pub enhancement: f32,

    /// Directory to write the clean/noisy/enhanced WAV files into.
    #[arg(short = 'o', long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}
