use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use widget_client::{ChatBackend, HttpChatBackend};
use widget_core::{AudioClip, WidgetConfig, WidgetSettings};
use widget_session::{ConfigSource, WidgetSession};

mod chat;
mod render;

#[derive(Parser)]
#[command(name = "widget-cli")]
#[command(about = "Terminal front end for the embeddable chat widget")]
#[command(version)]
struct Cli {
    /// Base URL of the chat collaborators
    #[arg(long)]
    api_base: Option<String>,

    /// Settings file
    #[arg(long, default_value = "widget.toml")]
    settings: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(multiple = false)]
struct SourceArgs {
    /// Session token exchanged for the widget config
    #[arg(long, env = "WIDGET_TOKEN")]
    token: Option<String>,

    /// Embed URL carrying the session token
    #[arg(long)]
    embed_url: Option<String>,

    /// Widget config as a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat,
    /// Send a single message
    Send {
        /// Message content
        message: String,
    },
    /// Transcribe an audio file
    Transcribe {
        /// Recorded audio
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut settings = WidgetSettings::load_from(&cli.settings);
    if let Some(api_base) = cli.api_base.clone() {
        settings.api_base = api_base;
    }

    if cli.debug {
        eprintln!("{}", "[DEBUG] Debug mode enabled".dimmed());
        eprintln!("{}", format!("[DEBUG] API base: {}", settings.api_base).dimmed());
    }

    tracing::debug!("Using settings {:?}", settings);
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatBackend::new(settings.clone())?);

    match cli.command {
        Commands::Chat => {
            let session = mount(&cli.source, backend, &settings).await?;
            chat::run(session, chat::Interrupt::listen()).await
        }
        Commands::Send { ref message } => {
            let session = mount(&cli.source, backend, &settings).await?;
            send_once(session, message, chat::Interrupt::listen()).await
        }
        Commands::Transcribe { ref file } => transcribe(backend.as_ref(), file).await,
    }
}

/// Logs go to stderr so chat output on stdout stays clean.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

fn config_source(args: &SourceArgs) -> anyhow::Result<ConfigSource> {
    if let Some(path) = &args.config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read widget config {}", path.display()))?;
        let config = WidgetConfig::from_json(&json)
            .with_context(|| format!("Invalid widget config {}", path.display()))?;
        return Ok(ConfigSource::Inline(config));
    }
    if let Some(url) = &args.embed_url {
        return Ok(ConfigSource::from_embed_url(url)?);
    }
    match &args.token {
        Some(token) => Ok(ConfigSource::Token(token.clone())),
        None => bail!("one of --token, --embed-url or --config is required"),
    }
}

async fn mount(
    args: &SourceArgs,
    backend: Arc<dyn ChatBackend>,
    settings: &WidgetSettings,
) -> anyhow::Result<WidgetSession> {
    let source = config_source(args)?;
    WidgetSession::mount(source, backend, settings)
        .await
        .context("Widget is unavailable")
}

async fn send_once(
    session: WidgetSession,
    message: &str,
    interrupt: chat::Interrupt,
) -> anyhow::Result<()> {
    session.open();
    println!("{}", format!("🚀 Sending message: {}", message).cyan());

    if session.is_gated() {
        let mut input = chat::Input::stdin();
        let flow = chat::fill_pre_chat_form(&session, &mut input, &interrupt).await?;
        if flow == chat::Flow::Interrupted {
            return chat::hang_up(&session).await;
        }
    }

    let before = session.messages().len();
    match interrupt.guard(session.send(message)?).await {
        Some(joined) => joined?,
        None => return chat::hang_up(&session).await,
    }

    for reply in session.messages().iter().skip(before).filter(|m| m.is_from_bot()) {
        println!("{}", reply.text);
    }

    session.unmount().await;
    Ok(())
}

async fn transcribe(backend: &dyn ChatBackend, file: &Path) -> anyhow::Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let clip = AudioClip::from_file_name(data, &file_name);

    println!("{}", format!("🎙️ Uploading {} ({})", file_name, clip.mime_type).cyan());
    let transcription = backend.transcribe(clip).await?;
    println!("{}", transcription.text);
    Ok(())
}
