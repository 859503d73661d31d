//! Picapica CLI — photo-booth strips from the command line.
//!
//! Usage:
//!   picapica booth [OPTIONS]       Run a countdown capture sequence and export a strip
//!   picapica compose <FILES>...    Compose a strip from image files
//!   picapica layouts               Show the layout table
//!   picapica check                 Check configuration and pipeline health

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "picapica",
    about = "Webcam photo-booth strips with layouts, filters, and stickers",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full countdown capture sequence and export the strip
    Booth {
        /// Strip layout: 3x2, 4x2, or 2x2
        #[arg(short, long, default_value = "3x2")]
        layout: String,

        /// Capture filter: none, grayscale, sepia, vintage, soft
        #[arg(short, long, default_value = "none")]
        filter: String,

        /// Wallpaper color as #rrggbb
        #[arg(short, long, default_value = "#ffffff")]
        background: String,

        /// Sticker image file to overlay
        #[arg(long)]
        sticker: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "photostrip.png")]
        out: PathBuf,

        /// Capture shots from image files in this directory instead of
        /// the synthetic test pattern
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Pace the countdown in real time (3-2-1 per shot)
        #[arg(long)]
        realtime: bool,

        /// Persist the session and strip to the configured backend
        #[arg(long)]
        save: bool,
    },

    /// Compose a strip directly from image files, in slot order
    Compose {
        /// Strip layout: 3x2, 4x2, or 2x2
        #[arg(short, long, default_value = "3x2")]
        layout: String,

        /// Wallpaper color as #rrggbb
        #[arg(short, long, default_value = "#ffffff")]
        background: String,

        /// Sticker image file to overlay
        #[arg(long)]
        sticker: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "photostrip.png")]
        out: PathBuf,

        /// Image files, one per slot
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Show shot counts, capture sizes, and grids for each layout
    Layouts,

    /// Check configuration and pipeline health
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    picapica_common::logging::init_logging(&picapica_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Booth {
            layout,
            filter,
            background,
            sticker,
            out,
            source_dir,
            realtime,
            save,
        } => {
            commands::booth::run(
                layout, filter, background, sticker, out, source_dir, realtime, save,
            )
            .await
        }
        Commands::Compose {
            layout,
            background,
            sticker,
            out,
            images,
        } => commands::compose::run(layout, background, sticker, out, images).await,
        Commands::Layouts => commands::layouts::run(),
        Commands::Check => commands::check::run().await,
    }
}
