use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use motioncalc::ai::{
    AiError, AiTasks, Assistant, CorrectRequest, ExplainRequest, LlmGenerator, PromptBuilder,
    render_markdown,
};
use motioncalc::calculator::{AngleUnit, Evaluation, Evaluator};
use motioncalc::config::{AiConfig, Config};
use motioncalc::repl::{Repl, spawn_stdin_reader};
use motioncalc::session::{History, Session};

/// Scientific calculator with an AI assistant.
#[derive(Parser, Debug)]
#[command(name = "motioncalc", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/motioncalc/config.toml)
    #[arg(long, global = true, env = "MOTIONCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Evaluate sin, cos and tan in radians instead of degrees
    #[arg(long, global = true)]
    radians: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression and print the result
    Eval { expression: String },
    /// Evaluate an expression and ask the assistant to explain it
    Explain { expression: String },
    /// Turn a misheard voice input into an expression
    Correct {
        /// What the voice input was heard as
        #[arg(long)]
        heard: String,
        /// What was actually meant
        #[arg(long)]
        meant: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("motioncalc=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if cli.radians {
        config.calculator.angle_unit = AngleUnit::Radians;
    }
    let evaluator = Evaluator::new(config.calculator.angle_unit);

    match cli.command {
        None => {
            let session = Session::new(evaluator, History::with_limit(config.calculator.history_limit));
            let tasks = build_assistant(&config.ai)
                .map(|assistant| AiTasks::new(assistant, config.ai.timeout()));
            if let Err(e) = &tasks {
                tracing::warn!(error = %e, "AI assistant unavailable");
            }
            Repl::new(session, tasks, std::io::stdout())
                .run(spawn_stdin_reader())
                .await?;
            Ok(ExitCode::SUCCESS)
        }

        Some(Command::Eval { expression }) => Ok(print_evaluation(&evaluator.evaluate(&expression))),

        Some(Command::Explain { expression }) => {
            let result = match evaluator.evaluate(&expression) {
                Evaluation::Empty => bail!("Invalid expression: {expression}"),
                evaluation => evaluation.to_string(),
            };
            println!("{expression} = {result}");

            let assistant = build_assistant(&config.ai)?;
            let request = ExplainRequest {
                calculation: format!("{expression} = {result}"),
            };
            let response = tokio::time::timeout(config.ai.timeout(), assistant.explain(&request))
                .await
                .context("Assistant timed out")??;
            println!("\n{}", render_markdown(&response.explanation));
            Ok(ExitCode::SUCCESS)
        }

        Some(Command::Correct { heard, meant }) => {
            let assistant = build_assistant(&config.ai)?;
            let request = CorrectRequest {
                original_input: heard,
                corrected_input: meant,
            };
            let response = tokio::time::timeout(config.ai.timeout(), assistant.correct(&request))
                .await
                .context("Assistant timed out")??;
            println!("{}", response.calculation);
            Ok(print_evaluation(&evaluator.evaluate(&response.calculation)))
        }
    }
}

fn build_assistant(config: &AiConfig) -> Result<Assistant<LlmGenerator>, AiError> {
    let prompts = PromptBuilder::new().with_max_input_length(config.max_input_chars);
    Ok(Assistant::new(LlmGenerator::from_config(config)?).with_prompts(prompts))
}

fn print_evaluation(evaluation: &Evaluation) -> ExitCode {
    match evaluation {
        Evaluation::Value(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Evaluation::Error => {
            println!("{evaluation}");
            ExitCode::FAILURE
        }
        Evaluation::Empty => {
            eprintln!("Invalid Expression: please check your calculation.");
            ExitCode::FAILURE
        }
    }
}
