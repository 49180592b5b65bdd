//! # Erika CLI
//!
//! Command-line interface for the Erika typewriter.
//!
//! ## Usage
//!
//! ```bash
//! # List available rendering strategies
//! erika render --list
//!
//! # Render ASCII art, spiralling out from the middle
//! erika render --strategy ArchimedeanSpiralOutward art.txt
//!
//! # Render an image dot by dot, preview only
//! erika render --image --dry-run photo.png
//!
//! # Type whatever arrives on stdin, honouring ANSI cursor escapes
//! echo -e "Hello\x1B[2B\x1B[3D!" | erika type
//!
//! # Feed paper and print a smiley
//! erika demo
//! ```
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=erika=debug` shows every byte sent).

use clap::{Parser, Subcommand};
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use erika::{
    ErikaError,
    device::{CharacterMock, Device, Erika, EscapeSink, MicrostepMock, OverprintPolicy},
    printer::ErikaConfig,
    protocol::charset::CharacterCodec,
    render::{
        self, ArchimedeanSpiralOutward, Content, LineSource, RandomDotFill, RenderingStrategy,
        ThresholdImage, archimedean, source::DEFAULT_THRESHOLD,
    },
    transport::{SerialTransport, serial::DEFAULT_DEVICE},
};

/// Erika - Typewriter printing utility
#[derive(Parser, Debug)]
#[command(name = "erika")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: Connection,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that talks to the typewriter
#[derive(clap::Args, Debug)]
struct Connection {
    /// Typewriter device path
    #[arg(long, global = true, default_value = DEFAULT_DEVICE)]
    device: PathBuf,

    /// JSON file overriding the Erika 3004 configuration
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON character table replacing the bundled one
    #[arg(long, global = true, value_name = "FILE")]
    charset: Option<PathBuf>,

    /// Type this character in place of unmapped ones instead of failing
    #[arg(long, global = true, value_name = "CHAR")]
    fallback: Option<char>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a text file or image with a rendering strategy
    Render {
        /// File to render (reads text from stdin if omitted)
        file: Option<PathBuf>,

        /// Rendering strategy
        #[arg(long, short, default_value = "LineByLine")]
        strategy: String,

        /// List available strategies
        #[arg(long)]
        list: bool,

        /// Treat the file as an image and print it dot by dot
        #[arg(long)]
        image: bool,

        /// Gray values at or below this are printed (image mode)
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,

        /// Render to an in-memory canvas and print it instead of typing
        #[arg(long)]
        dry_run: bool,

        /// Abort on the first overprinted cell
        #[arg(long)]
        strict: bool,

        /// Spiral parameter a (ArchimedeanSpiralOutward)
        #[arg(long, default_value_t = archimedean::DEFAULT_A)]
        spiral_a: f64,

        /// Spiral parameter b (ArchimedeanSpiralOutward)
        #[arg(long, default_value_t = archimedean::DEFAULT_B)]
        spiral_b: f64,

        /// Angle between spiral samples in radians
        #[arg(long, default_value_t = archimedean::DEFAULT_STEP)]
        spiral_step: f64,

        /// Leave cells the spiral missed blank
        #[arg(long)]
        no_fill: bool,

        /// Seed for RandomDotFill
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Feed paper, print a smiley, feed again
    Demo,

    /// Type stdin on the typewriter, interpreting ANSI cursor escapes
    Type {
        /// Print to an in-memory page and show it instead of typing
        #[arg(long)]
        dry_run: bool,
    },

    /// Beep
    Alarm {
        /// Duration in seconds (at most 5.1)
        #[arg(default_value_t = 1.0)]
        seconds: f32,
    },

    /// Echo keys pressed on the typewriter to stdout until interrupted
    Read,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ErikaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            file,
            strategy,
            list,
            image,
            threshold,
            dry_run,
            strict,
            spiral_a,
            spiral_b,
            spiral_step,
            no_fill,
            seed,
        } => {
            if list {
                println!("Available strategies:");
                for name in render::list_strategies() {
                    println!("  {}", name);
                }
                return Ok(());
            }

            let mut strategy =
                select_strategy(&strategy, spiral_a, spiral_b, spiral_step, !no_fill, seed)?;
            let content = load_content(file, image, threshold)?;
            let policy = if strict {
                OverprintPolicy::Strict
            } else {
                OverprintPolicy::Lenient
            };

            if dry_run {
                let canvas = match &content {
                    Content::Text(_) => {
                        let mut mock =
                            CharacterMock::new(content.width(), content.height(), policy);
                        render::render(&mut mock, &content, strategy.as_mut(), policy)?;
                        mock.render_canvas()
                    }
                    Content::Image(_) => {
                        let mut mock =
                            MicrostepMock::new(content.width(), content.height(), policy);
                        render::render(&mut mock, &content, strategy.as_mut(), policy)?;
                        mock.render_canvas()
                    }
                };
                print!("{}", canvas);
                return Ok(());
            }

            let mut erika = open(&cli.connection)?;
            check_page(&content, erika.config());
            render::render(&mut erika, &content, strategy.as_mut(), policy)?;
            println!("Rendered successfully!");
        }

        Commands::Demo => {
            let mut erika = open(&cli.connection)?;
            erika.demo()?;
        }

        Commands::Type { dry_run } => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            if dry_run {
                let config = load_config(&cli.connection)?;
                let mut mock = CharacterMock::new(
                    config.page_width_hard_limit,
                    config.page_height,
                    OverprintPolicy::Lenient,
                );
                EscapeSink::new(&mut mock).write(&text)?;
                print!("{}", mock.render_canvas());
            } else {
                let mut erika = open(&cli.connection)?;
                EscapeSink::new(&mut erika).write(&text)?;
            }
        }

        Commands::Alarm { seconds } => {
            let mut erika = open(&cli.connection)?;
            erika.alarm(seconds)?;
        }

        Commands::Read => {
            let mut erika = open(&cli.connection)?;
            loop {
                let key = erika.read()?;
                println!("{}", key);
            }
        }
    }

    Ok(())
}

fn load_config(connection: &Connection) -> Result<ErikaConfig, ErikaError> {
    match &connection.config {
        Some(path) => ErikaConfig::from_path(path),
        None => Ok(ErikaConfig::ERIKA_3004),
    }
}

/// Open the typewriter with the configured character table
fn open(connection: &Connection) -> Result<Erika<SerialTransport>, ErikaError> {
    let config = load_config(connection)?;
    let mut codec = match &connection.charset {
        Some(path) => CharacterCodec::from_path(path)?,
        None => CharacterCodec::bundled()?,
    };
    if let Some(replacement) = connection.fallback {
        codec = codec.with_fallback(replacement)?;
    }
    let transport = SerialTransport::open(&connection.device, &config)?;
    Ok(Erika::new(transport, codec, config))
}

fn select_strategy(
    name: &str,
    a: f64,
    b: f64,
    step: f64,
    fill: bool,
    seed: Option<u64>,
) -> Result<Box<dyn RenderingStrategy>, ErikaError> {
    let strategy: Box<dyn RenderingStrategy> = match name.to_lowercase().as_str() {
        "archimedeanspiraloutward" => Box::new(ArchimedeanSpiralOutward::new(a, b, step, fill)?),
        "randomdotfill" => match seed {
            Some(seed) => Box::new(RandomDotFill::with_seed(seed)),
            None => Box::new(RandomDotFill::new()),
        },
        _ => render::by_name(name).ok_or_else(|| {
            ErikaError::Config(format!(
                "Unknown strategy '{}'. Run with --list to see available options.",
                name
            ))
        })?,
    };
    Ok(strategy)
}

fn load_content(file: Option<PathBuf>, image: bool, threshold: u8) -> Result<Content, ErikaError> {
    match (file, image) {
        (Some(path), true) => Ok(Content::Image(Box::new(ThresholdImage::open(path, threshold)?))),
        (None, true) => Err(ErikaError::Config(
            "Image mode needs a file argument".to_string(),
        )),
        (Some(path), false) => Ok(Content::Text(LineSource::from_path(path)?)),
        (None, false) => Ok(Content::Text(LineSource::from_reader(BufReader::new(
            io::stdin(),
        ))?)),
    }
}

/// Warn when the content will not fit on the paper.
fn check_page(content: &Content, config: &ErikaConfig) {
    let width = match content {
        Content::Text(_) => content.width(),
        Content::Image(_) => content.width().div_ceil(config.char_width_microsteps as usize),
    };
    if width > config.page_width_hard_limit {
        tracing::warn!(
            "content is {} characters wide, the carriage stops at {}",
            width,
            config.page_width_hard_limit
        );
    } else if width > config.page_width_soft_limit {
        tracing::warn!(
            "content is {} characters wide, past the margin bell at {}",
            width,
            config.page_width_soft_limit
        );
    }
}
