//! # qrbar CLI
//!
//! Command-line front end for the QR code and barcode generator.
//!
//! ## Usage
//!
//! ```bash
//! # QR code for the default URL, saved as ./QRCode.png
//! qrbar qr
//!
//! # Colored QR code with a logo, as SVG
//! qrbar qr "https://example.com" --fg "#1a365d" --logo logo.png --format svg
//!
//! # QR code sized for a phone-width viewport, with a 20px white border
//! qrbar qr "hello" --width 375 --padding 20
//!
//! # Code 39 barcode into ./out/Barcode.png
//! qrbar barcode "ABC-123" --symbology CODE39 --out-dir out
//!
//! # Replay a scripted session (stdin when no file is given)
//! qrbar session events.jsonl
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qrbar::{
    StudioConfig, StudioError,
    app::{Controller, Edit},
    barcode::Symbology,
    color::HexColor,
    config::DEFAULT_VIEWPORT_WIDTH,
    export::{ExportFormat, ExportOptions},
    session::Session,
};

/// qrbar - QR code and barcode generator
#[derive(Parser, Debug)]
#[command(name = "qrbar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
struct Common {
    /// Viewport width in pixels, drives preview sizing
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    width: u32,

    /// Directory exported files are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,
}

/// Options for one-shot exports.
#[derive(Args, Debug)]
struct Output {
    /// Export format (png or svg)
    #[arg(long, default_value = "png")]
    format: ExportFormat,

    /// Border around the exported image, in pixels
    #[arg(long, default_value_t = 0)]
    padding: u32,

    /// Border color
    #[arg(long, default_value = "#ffffff")]
    padding_color: HexColor,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a QR code and save it as QRCode.<format>
    Qr {
        /// Text or URL to encode (defaults to https://example.com)
        text: Option<String>,

        /// Foreground color
        #[arg(long, default_value = "#000000")]
        fg: HexColor,

        /// Background color
        #[arg(long, default_value = "#ffffff")]
        bg: HexColor,

        /// PNG or JPEG image to place over the center
        #[arg(long, value_name = "FILE")]
        logo: Option<PathBuf>,

        #[command(flatten)]
        common: Common,

        #[command(flatten)]
        output: Output,
    },

    /// Generate a barcode and save it as Barcode.<format>
    Barcode {
        /// Text to encode (defaults to 0000000000000)
        text: Option<String>,

        /// CODE128, CODE39, MSI or pharmacode
        #[arg(long, default_value = "CODE128")]
        symbology: Symbology,

        /// Bar color
        #[arg(long, default_value = "#000000")]
        fg: HexColor,

        /// Background color
        #[arg(long, default_value = "#ffffff")]
        bg: HexColor,

        #[command(flatten)]
        common: Common,

        #[command(flatten)]
        output: Output,
    },

    /// Replay a JSON-lines event script
    Session {
        /// Script file (reads stdin when omitted)
        script: Option<PathBuf>,

        #[command(flatten)]
        common: Common,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli.command)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), StudioError> {
    match command {
        Commands::Qr {
            text,
            fg,
            bg,
            logo,
            common,
            output,
        } => {
            let mut controller = mount(&common, &output)?;
            if let Some(text) = text {
                controller.dispatch(Edit::QrText(text))?;
            }
            controller.dispatch(Edit::QrForeground(fg))?;
            controller.dispatch(Edit::QrBackground(bg))?;
            if let Some(path) = logo {
                controller.upload_logo(&path).await?;
            }

            let path = controller.export_qr(output.format).await?;
            println!("Saved to {}", path.display());
        }
        Commands::Barcode {
            text,
            symbology,
            fg,
            bg,
            common,
            output,
        } => {
            let mut controller = mount(&common, &output)?;
            if let Some(text) = text {
                controller.dispatch(Edit::BarcodeText(text))?;
            }
            controller.dispatch(Edit::Symbology(symbology))?;
            controller.dispatch(Edit::BarcodeForeground(fg))?;
            controller.dispatch(Edit::BarcodeBackground(bg))?;
            controller.generate_barcode()?;

            let path = controller.export_barcode(output.format).await?;
            println!("Saved to {}", path.display());
        }
        Commands::Session { script, common } => {
            let controller = Controller::standard(&config(&common))?;
            let session = Session::new(controller);

            let (_, report) = match script {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await?;
                    session.run(tokio::io::BufReader::new(file)).await?
                }
                None => {
                    session
                        .run(tokio::io::BufReader::new(tokio::io::stdin()))
                        .await?
                }
            };

            for path in &report.saved {
                println!("Saved to {}", path.display());
            }
            for (line, failure) in &report.failures {
                eprintln!("line {}: {}", line, failure);
            }
        }
    }

    Ok(())
}

fn config(common: &Common) -> StudioConfig {
    StudioConfig {
        download_dir: common.out_dir.clone(),
        viewport_width: common.width,
    }
}

fn mount(common: &Common, output: &Output) -> Result<Controller, StudioError> {
    let mut controller = Controller::standard(&config(common))?;
    controller.set_export_options(ExportOptions {
        padding: output.padding,
        padding_color: output.padding_color,
    });
    Ok(controller)
}
