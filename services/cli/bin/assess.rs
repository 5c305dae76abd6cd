//! Main Entrypoint for the Assessment CLI
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Loading the case document, metrics document, and prompt templates.
//! 3. Initializing the question and feedback services for the chosen provider.
//! 4. Running the interactive session until it completes, the candidate quits,
//!    or Ctrl+C is pressed.

use anyhow::Context;
use assessor_cli::{
    config::{Args, Config, Provider},
    session::{AssessmentSession, Outcome},
};
use assessor_core::{
    case::{CaseDocument, load_groups},
    feedback::{FeedbackService, FeedbackWriter, LlmFeedbackService, OfflineFeedbackService},
    llm_client::{ChatClient, OpenAICompatibleClient},
    questions::{Interviewer, LlmQuestionSource, QuestionSource, TemplateQuestionSource},
    scoring::ScoringModel,
    selector::RandomSelector,
};
use async_openai::config::OpenAIConfig;
use clap::Parser;
use std::{collections::HashMap, fs, process::ExitCode, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// A helper function to load prompts from a directory.
fn load_prompts(prompts_path: &std::path::Path) -> anyhow::Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    let entries = fs::read_dir(prompts_path)
        .with_context(|| format!("Could not read prompts directory {}", prompts_path.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

type Services = (Arc<dyn QuestionSource>, Arc<dyn FeedbackService>);

fn build_services(config: &Config) -> anyhow::Result<Services> {
    let openai_config = match &config.provider {
        Provider::Offline => {
            info!("Using offline provider: template questions, fallback feedback.");
            return Ok((Arc::new(TemplateQuestionSource), Arc::new(OfflineFeedbackService)));
        }
        Provider::Ollama => {
            info!(api_base = %config.api_base, "Using Ollama provider.");
            // Ollama ignores the key but the client always sends one.
            OpenAIConfig::new()
                .with_api_key("ollama")
                .with_api_base(&config.api_base)
        }
        Provider::OpenAI => {
            info!(api_base = %config.api_base, "Using OpenAI provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY must be set for 'openai' provider")?;
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(&config.api_base)
        }
    };

    let prompts = load_prompts(&config.prompts_path)?;
    for key in ["initial_question", "final_feedback"] {
        if !prompts.contains_key(key) {
            warn!(prompt = key, "Prompt template not found, generation will fall back");
        }
    }

    let client: Arc<dyn ChatClient> = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
    ));
    Ok((
        Arc::new(LlmQuestionSource::new(client.clone(), prompts.clone())),
        Arc::new(LlmFeedbackService::new(client, prompts)),
    ))
}

async fn run(args: Args) -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_args(&args);

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!("Configuration loaded. Loading assessment documents...");

    // --- 3. Load Documents ---
    let case = CaseDocument::load(&config.case_path)?;
    let groups = load_groups(&config.metrics_path)?;
    info!(case = %case.title, groups = groups.len(), "Assessment documents loaded");

    // --- 4. Initialize Services ---
    let (question_source, feedback_service) = build_services(&config)?;
    let interviewer = Interviewer::new(question_source, case, config.llm_timeout)
        .with_rephrasing(config.rephrase_followups);
    let feedback = FeedbackWriter::new(feedback_service, config.llm_timeout);

    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        "Services configured. Starting assessment..."
    );
    let mut session = AssessmentSession::new(
        interviewer,
        ScoringModel::new(groups),
        feedback,
        Arc::new(RandomSelector),
        config.sessions_dir.clone(),
    );

    // --- 5. Run Session ---
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    tokio::select! {
        outcome = session.run(&mut input, args.mode) => {
            match outcome? {
                Outcome::Completed { path } => info!(path = %path.display(), "Session finished"),
                Outcome::Quit => info!("Session ended by candidate"),
                Outcome::InputClosed => warn!("Input closed, session ended early"),
            }
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            println!("\nAssessment terminated by user.");
            info!("Received Ctrl+C, ending session");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("\nError: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(args));
    // A pending stdin read holds a blocking thread that cannot be cancelled.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Assessment failed");
            eprintln!("\nError: {e:#}");
            ExitCode::FAILURE
        }
    }
}
