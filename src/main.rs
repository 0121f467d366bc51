use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sori::chat::{OpenAIResponder, Responder};
use sori::conversation::ModelMessage;
use sori::voice::{SpeechSynthesizer, TextToSpeech, Transcriber, WhisperTranscriber};
use sori::{Config, Daemon};

/// Sori - voice conversation gateway
#[derive(Parser)]
#[command(name = "sori", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "SORI_PORT")]
    port: Option<u16>,

    /// Chat model (e.g. "gpt-4")
    #[arg(short, long, env = "SORI_CHAT_MODEL")]
    model: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a local audio file
    TestStt {
        /// Audio file to transcribe
        file: PathBuf,
    },
    /// Synthesize speech and write it to a file
    TestTts {
        /// Text to speak
        #[arg(default_value = "안녕하세요! 음성 합성 테스트입니다.")]
        text: String,

        /// Output file
        #[arg(short, long, default_value = "tts-test.mp3")]
        output: PathBuf,
    },
    /// Send one message through the chat model
    TestChat {
        /// Message to send
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,sori=info",
        1 => "info,sori=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }
    if let Some(model) = cli.model.as_deref() {
        config.chat_model = model.parse()?;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestStt { file } => test_stt(&config, &file).await,
            Command::TestTts { text, output } => test_tts(&config, &text, &output).await,
            Command::TestChat { text } => test_chat(&config, &text).await,
        };
    }

    tracing::info!(
        port = config.api_server.port,
        model = %config.chat_model,
        language = %config.persona.language,
        "starting sori gateway"
    );

    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    Ok(())
}

/// Get the API key or fail with a pointer to the variable
fn require_api_key(config: &Config) -> anyhow::Result<String> {
    config
        .openai_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is not set"))
}

/// Build the HTTP client used by the test commands
fn http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?)
}

/// Transcribe a local audio file via Whisper
async fn test_stt(config: &Config, file: &Path) -> anyhow::Result<()> {
    let audio = std::fs::read(file)?;
    println!("Transcribing {} ({} bytes)...", file.display(), audio.len());

    let transcriber = WhisperTranscriber::new(
        http_client(config)?,
        require_api_key(config)?,
        config.voice.stt_model.clone(),
    )?;
    let transcript = transcriber.transcribe(&audio).await?;

    println!("---");
    println!("{transcript}");

    Ok(())
}

/// Synthesize speech and write the MP3 to a file
async fn test_tts(config: &Config, text: &str, output: &Path) -> anyhow::Result<()> {
    println!("Synthesizing: \"{text}\"");

    let synthesizer = TextToSpeech::from_config(
        &config.voice,
        http_client(config)?,
        config.openai_api_key.as_deref(),
    )?;
    let audio = synthesizer.synthesize(text, &config.persona.language).await?;

    std::fs::write(output, &audio)?;
    println!("Wrote {} bytes to {}", audio.len(), output.display());

    Ok(())
}

/// Send one message through the chat model and print the reply
async fn test_chat(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Sending: \"{text}\"\n");

    let responder = OpenAIResponder::new(http_client(config)?, require_api_key(config)?)?;
    let history = vec![
        ModelMessage::system(&config.persona.system_prompt),
        ModelMessage::user(text),
    ];
    let reply = responder.respond(&history, config.chat_model).await?;

    println!("---");
    println!("{reply}");

    Ok(())
}
