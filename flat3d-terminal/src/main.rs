/// flat3d terminal demo
///
/// Renders a small lit scene into the terminal with colour half-block cells.
/// Controls:
///   - Arrow keys / WASD: orbit the camera around the origin
///   - +/-: move the camera forward and back
///   - Space: pause the animation
///   - Q/ESC: quit
use anyhow::Context;
use clap::Parser;
use flat3d_core::SceneConfig;
use flat3d_terminal::TerminalApp;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flat3d-terminal", version, about = "Flat-shaded 3D renderer in the terminal")]
struct Cli {
    /// Scene configuration (JSON with `camera` and `viewport` sections)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame-rate cap
    #[arg(long)]
    fps: Option<f64>,

    /// Pixels per world unit
    #[arg(long)]
    scale: Option<f64>,

    /// Collect per-stage timings and report them on exit
    #[arg(long)]
    profile: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SceneConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => flat3d_terminal::scene::config(),
    };

    if let Some(fps) = cli.fps {
        config.viewport.fps_limit = Some(fps);
    }
    if let Some(scale) = cli.scale {
        config.viewport.scale = scale;
    }
    config.viewport.profile |= cli.profile;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    tracing::debug!(?config, "starting terminal renderer");

    let mut app = TerminalApp::new(&config).context("setting up the renderer")?;
    app.run(cli.frames)?;

    app.viewport().instrumentation().report();
    Ok(())
}
