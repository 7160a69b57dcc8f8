//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Context, Result};
use clap::Parser;
use council_application::{
    ConversationStore, RunCouncilInput, RunCouncilUseCase, TurnContext,
};
use council_domain::TurnEvent;
use council_infrastructure::{ConfigLoader, HttpModelGateway, JsonFileStore};
use council_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };
    file_config.validate().context("invalid configuration")?;

    let store = Arc::new(JsonFileStore::new(&file_config.storage.data_dir));

    if cli.list {
        for summary in store.list().await? {
            println!(
                "{}  {}  {:>3} messages  {}",
                summary.id, summary.created_at, summary.message_count, summary.title
            );
        }
        return Ok(());
    }

    // Council membership: CLI flags override the config file
    let mut config = file_config.council.to_council_config();
    if !cli.model.is_empty() {
        config.members = cli.model.iter().map(|s| s.parse().unwrap()).collect();
    }
    if let Some(chairman) = &cli.chairman {
        config = config.with_chairman(chairman.parse().unwrap());
    }

    let question = match cli.question {
        Some(ref q) if !q.trim().is_empty() => q.clone(),
        _ => bail!("Question is required. See --help for usage."),
    };

    info!("Starting llm-council");

    // === Dependency Injection ===
    let gateway = Arc::new(HttpModelGateway::with_api_key(
        &file_config.gateway.base_url,
        file_config.gateway.api_key.clone(),
    ));
    let use_case = RunCouncilUseCase::new(gateway);

    let mut input = RunCouncilInput::new(question.clone(), config.clone())
        .with_scoring(
            file_config
                .council
                .parse_scoring()
                .context("invalid configuration")?,
        )
        .with_params(file_config.gateway.to_execution_params());

    // Conversation wiring: continue an existing one or start a stored one.
    let conversation_id = if let Some(id) = &cli.conversation {
        let conversation = store
            .get(id)
            .await
            .with_context(|| format!("cannot load conversation {}", id))?;
        if conversation.is_empty() {
            input = input.with_title_generation();
        }
        input = input.with_context(conversation.context_messages());
        Some(id.clone())
    } else if cli.save {
        let conversation = store.create().await?;
        println!("Conversation id: {}", conversation.id);
        input = input.with_title_generation();
        Some(conversation.id)
    } else {
        None
    };

    if let Some(id) = &conversation_id {
        store.append_user_message(id, &question).await?;
    }

    if !cli.quiet {
        println!();
        println!("Question: {}", question);
        println!(
            "Council: {}  (chairman: {})",
            config
                .members
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            config.chairman
        );
        println!();
    }

    // Ctrl-C stops the turn at the next stage boundary.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut ctx = TurnContext::new().with_cancellation(cancel);
    if !cli.quiet {
        ctx = ctx.with_progress(Arc::new(ProgressReporter::new()));
    }
    if let Some(id) = &conversation_id {
        ctx = ctx.with_store(Arc::clone(&store) as Arc<dyn ConversationStore>, id.clone());
    }

    let mut events = use_case.stream(input, ctx);
    while let Some(event) = events.recv().await {
        match event {
            TurnEvent::TitleReady { title } => {
                if !cli.quiet {
                    println!("Title: {}", title);
                }
            }
            TurnEvent::Complete { turn } => {
                let output = match cli.output {
                    OutputFormat::Full => ConsoleFormatter::format(&turn),
                    OutputFormat::Final => ConsoleFormatter::format_final_only(&turn),
                    OutputFormat::Json => ConsoleFormatter::format_json(&turn),
                };
                println!("{}", output);
                return Ok(());
            }
            TurnEvent::Error { message, partial } => {
                if !partial.stage1.is_empty() {
                    eprintln!(
                        "Partial turn: {}/{} members answered before the failure.",
                        partial.stage1.success_count(),
                        partial.stage1.len()
                    );
                }
                bail!("{}", message);
            }
            _ => {}
        }
    }

    bail!("event stream ended without a terminal event");
}
