//! Atmos CLI - audio intake server and tools
//!
//! # Main Commands
//!
//! ```bash
//! atmos serve                      # Start HTTP server (port from PORT, default 3000)
//! atmos submit --email me@x.io --file mix.wav --format Binaural
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! atmos catalog                    # Show selectable output formats and content types
//! atmos config                     # Show the loaded configuration (secrets redacted)
//! ```

use clap::{Parser, Subcommand};
use atmos::{
    load_audio_file, validate_input, CatalogOption, Config, ContentType, FormInput,
    OutputFormat, PaymentRedirector, SubmissionController, WebhookClient,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "atmos")]
#[command(about = "Collect audio for Dolby Atmos conversion and hand off to checkout", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Submit files from disk to the webhook once and print the payment URL
    Submit {
        /// Email that receives the converted files
        #[arg(short, long)]
        email: String,

        /// Audio file to upload (repeatable)
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Mix wideness, 0-100
        #[arg(short, long)]
        wideness: Option<u8>,

        /// Output format label (repeatable), see `atmos catalog`
        #[arg(long = "format")]
        formats: Vec<String>,

        /// Content type label (repeatable), see `atmos catalog`
        #[arg(long = "content")]
        contents: Vec<String>,
    },

    /// Show selectable output formats and content types
    Catalog,

    /// Show the loaded configuration
    Config,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Submit {
            email,
            files,
            wideness,
            formats,
            contents,
        } => cmd_submit(email, files, wideness, formats, contents).await,

        Commands::Catalog => cmd_catalog(),

        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    atmos::server::start_server(config, port).await?;
    Ok(())
}

async fn cmd_submit(
    email: String,
    paths: Vec<PathBuf>,
    wideness: Option<u8>,
    formats: Vec<String>,
    contents: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = load_audio_file(path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        eprintln!("   {} ({} bytes, {})", file.file_name, file.content.len(), file.media_type);
        files.push(file);
    }

    let request = validate_input(FormInput {
        files,
        email,
        mix_wideness: wideness.map(|w| w.to_string()),
        output_formats: formats,
        content_types: contents,
    })?;

    let webhook = WebhookClient::new(config.webhook_url.clone(), config.webhook_timeout)?;
    let payment = PaymentRedirector::from_config(&config.payment, config.webhook_timeout)?;
    let controller = SubmissionController::new(webhook, payment);

    eprintln!("Uploading and triggering conversion...");
    let target = controller.dispatch(&request).await?;

    eprintln!("Form submitted successfully. Proceed to payment:");
    println!("{}", target.url());
    Ok(())
}

fn cmd_catalog() -> Result<(), Box<dyn std::error::Error>> {
    println!("Output formats:");
    for option in OutputFormat::ALL {
        println!("  {}", option.label());
    }
    println!("\nContent types:");
    for option in ContentType::ALL {
        println!("  {}", option.label());
    }
    Ok(())
}

fn cmd_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    println!("{:#?}", config);
    Ok(())
}
