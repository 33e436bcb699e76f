//! Tanya CLI: one-shot questions, the Telegram bot loop, and config
//! bootstrap.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tanya_channels::telegram::TelegramChannel;
use tanya_core::config::TanyaConfig;
use tanya_core::traits::GenerateParams;
use tanya_core::types::LanguageHint;
use tanya_faq::{FaqPipeline, SynthesisAdapter};

#[derive(Parser)]
#[command(name = "tanya", version, about = "FAQ assistant for Malaysian government services")]
struct Cli {
    /// Config file path (defaults to ~/.tanya/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file to ~/.tanya/config.toml
    Init,
    /// Answer a single question and exit
    Ask {
        question: String,
        /// Reply language: auto, ms or en
        #[arg(long, default_value = "auto")]
        lang: String,
    },
    /// Run the Telegram bot
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TanyaConfig::load_from(path)?,
        None => TanyaConfig::load()?,
    };

    match cli.command {
        Command::Init => {
            config.save()?;
            println!("Config written to {}", TanyaConfig::default_path().display());
            Ok(())
        }
        Command::Ask { question, lang } => {
            let pipeline = build_pipeline(&config)?;
            let answer = pipeline.answer(&question, parse_lang(&lang)?).await;
            println!("{}", answer.text);
            Ok(())
        }
        Command::Serve => serve(&config).await,
    }
}

fn parse_lang(lang: &str) -> anyhow::Result<LanguageHint> {
    match lang {
        "auto" => Ok(LanguageHint::Auto),
        "ms" => Ok(LanguageHint::Ms),
        "en" => Ok(LanguageHint::En),
        other => bail!("unknown language '{other}' (expected auto, ms or en)"),
    }
}

/// Load the FAQ document, wire the synthesizer chain, build the pipeline.
/// Zero parsed records aborts startup.
fn build_pipeline(config: &TanyaConfig) -> anyhow::Result<FaqPipeline> {
    let path = &config.knowledge.faq_path;
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read FAQ document at {path}"))?;

    let synthesizer = tanya_providers::create_synthesizer(config)?;
    let params = GenerateParams {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    };
    let adapter = SynthesisAdapter::new(
        synthesizer,
        params,
        Duration::from_secs(config.llm.timeout_secs),
    );

    let pipeline = FaqPipeline::from_document(&document, Some(adapter))?;
    tracing::info!(
        "Loaded {} FAQ records from {path}",
        pipeline.record_count()
    );
    Ok(pipeline)
}

async fn serve(config: &TanyaConfig) -> anyhow::Result<()> {
    let telegram = &config.channel.telegram;
    if !telegram.enabled {
        bail!("Telegram channel is disabled in config");
    }
    if telegram.bot_token.is_empty() {
        bail!("channel.telegram.bot_token is not set");
    }

    let pipeline = build_pipeline(config)?;
    let mut channel = TelegramChannel::new(telegram.clone());

    match channel.get_me().await {
        Ok(me) => tracing::info!(
            "Telegram bot: @{}",
            me.username.as_deref().unwrap_or(&me.first_name)
        ),
        Err(e) => tracing::warn!("getMe failed, continuing anyway: {e}"),
    }

    tracing::info!("Bot is running");
    loop {
        match channel.get_updates().await {
            Ok(updates) => {
                for update in updates {
                    let Some((chat_id, text)) = update.text_message() else {
                        continue;
                    };
                    tracing::debug!("Message in chat {chat_id}");
                    channel.send_typing(chat_id).await;
                    let answer = pipeline.answer(text, LanguageHint::Auto).await;
                    if let Err(e) = channel.send_chunked(chat_id, &answer.text).await {
                        tracing::error!("Failed to send reply: {e}");
                    }
                }
            }
            Err(e) => {
                tracing::error!("Polling error: {e}");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
        tokio::time::sleep(Duration::from_secs(channel.poll_interval())).await;
    }
}
