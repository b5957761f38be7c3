//! CLI subcommands — serve, transcribe, speak, config, and config loading.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::error::Result as SpeechResult;
use crate::playback::{PlaybackInstruction, PlaybackSink};
use crate::speech::{ApiCredential, AudioUpload, SpeechClient, SpeechRequest, TtsModel, Voice};

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    // Validate configuration
    config.validate()?;

    Ok(config)
}

/// API key from config/env, or a clear prompt telling the user how to set one
fn require_credential(config: &Config) -> Result<ApiCredential> {
    match config.api.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(ApiCredential::new(key)),
        _ => anyhow::bail!(
            "No OpenAI API key found. Set OPENAI_API_KEY in the environment or in a .env file."
        ),
    }
}

/// Run the web playground
pub(crate) async fn cmd_serve(
    mut config: Config,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    crate::server::serve(config).await
}

/// One-shot transcription
pub(crate) async fn cmd_transcribe(config: &Config, file: &Path) -> Result<()> {
    let credential = require_credential(config)?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read audio file: {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    let upload = AudioUpload::new(file_name, bytes)?;

    println!("🎙️  Transcribing {} ({} bytes)...", file.display(), upload.size());

    let client = SpeechClient::from_config(&config.api)?;
    let transcript = client.transcribe(&credential, upload).await?;

    println!("{}", transcript);
    Ok(())
}

/// Sink for terminal use: reports progress per instruction and keeps nothing,
/// the adapter returns the full clip at the end.
#[derive(Default)]
struct ProgressSink {
    count: usize,
}

impl PlaybackSink for ProgressSink {
    fn play(&mut self, instruction: PlaybackInstruction) -> SpeechResult<()> {
        self.count += 1;
        tracing::debug!(
            "Received chunk {} ({} base64 chars so far)",
            self.count,
            instruction.base64.len()
        );
        Ok(())
    }
}

/// One-shot speech synthesis
pub(crate) async fn cmd_speak(
    config: &Config,
    text: String,
    voice: Voice,
    model: TtsModel,
    output: Option<&Path>,
) -> Result<()> {
    let credential = require_credential(config)?;
    let request = SpeechRequest::new(model, voice, text);

    println!("🔊 Generating speech (model={}, voice={})...", model, voice);

    let client = SpeechClient::from_config(&config.api)?;
    let mut sink = ProgressSink::default();
    let audio = client.synthesize(&credential, &request, &mut sink).await?;

    println!("✅ Received {} bytes in {} chunk(s)", audio.len(), sink.count);

    if let Some(path) = output {
        tokio::fs::write(path, &audio)
            .await
            .with_context(|| format!("Failed to write audio file: {}", path.display()))?;
        println!("💾 Saved to {}", path.display());
    }

    Ok(())
}

/// Show configuration
pub(crate) fn cmd_config(config: &Config) -> Result<()> {
    println!("🦀 CrabVoice Configuration\n");

    println!("API base URL: {}", config.api.base_url);
    println!("Request timeout: {}s", config.api.timeout_secs);
    println!(
        "API Key: {}",
        if config.has_api_key() { "[SET]" } else { "[NOT SET]" }
    );
    println!("\nServer: {}:{}", config.server.bind, config.server.port);
    println!("Log level: {}", config.logging.level);

    Ok(())
}
