//! datewise - relative-date evaluation harness CLI
//!
//! ## Commands
//!
//! - `run`: evaluate a dataset with CoT or ReAct and write the results file
//! - `calc`: evaluate a date expression offline
//! - `calendar`: query the special-day service the way `calendar_db` does

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{info, Level};

use datewise_calendar::{CalendarSource, KasiClient, KasiConfig};
use datewise_core::tools::calendar;
use datewise_core::{
    summary_file_name, write_results_json, write_summary_json, BatchDriver, CotRunner, Dataset,
    Dispatcher, EvaluationRecord, Method, ProgressHook, PromptSet, ReactRunner, Runner, Task,
    TaskProfile, ToolBackend,
};
use datewise_llm::{ChatCompletionsClient, LlmConfig, ReasoningEngine, API_KEY_ENV};

#[derive(Parser)]
#[command(name = "datewise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate LLM relative-date resolution with CoT and ReAct", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a dataset through one method and write the results file
    Run {
        /// Evaluation method: cot or react
        #[arg(short, long)]
        method: Method,

        /// Dataset task: t1 (single-step, live tools) or t3 (multi-turn, simulated tools)
        #[arg(short, long, default_value = "t1")]
        task: Task,

        /// Override the task's tool backend: live or simulated
        #[arg(long)]
        tools: Option<ToolBackend>,

        /// Directory holding <T>_dataset.json files
        #[arg(long, env = "DATEWISE_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Directory holding <task>_cot.txt / <task>_react_*.txt prompts
        #[arg(long, env = "DATEWISE_PROMPT_DIR", default_value = "prompts")]
        prompt_dir: PathBuf,

        /// Where the results file is written
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Items evaluated at once (order of results is unaffected)
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Model name (default: DATEWISE_MODEL or solar-pro2)
        #[arg(long)]
        model: Option<String>,

        /// Chat-completions base URL (default: DATEWISE_LLM_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Evaluate a calculator expression, e.g. "2025-11-21 next friday"
    Calc {
        expression: String,
    },

    /// Look up special days, e.g. --year 2025 --month all
    Calendar {
        #[arg(long)]
        year: String,

        /// Month number, comma-separated list, or "all"
        #[arg(long)]
        month: String,

        /// holiday, rest, anniversary, 24divisions or sundry
        #[arg(long, default_value = "rest")]
        category: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    datewise_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            method,
            task,
            tools,
            data_dir,
            prompt_dir,
            output_dir,
            concurrency,
            model,
            base_url,
        } => {
            let mut profile = TaskProfile::for_task(task);
            if let Some(backend) = tools {
                profile = profile.with_backend(backend);
            }
            let mut llm = LlmConfig::from_env();
            if let Some(model) = model {
                llm = llm.with_model(&model);
            }
            if let Some(base_url) = base_url {
                llm = llm.with_base_url(&base_url);
            }
            let opts = RunOptions {
                method,
                profile,
                data_dir,
                prompt_dir,
                output_dir,
                concurrency,
                show_progress: !cli.json && std::io::stderr().is_terminal(),
            };
            cmd_run(opts, llm).await
        }
        Commands::Calc { expression } => cmd_calc(&expression),
        Commands::Calendar {
            year,
            month,
            category,
        } => cmd_calendar(&year, &month, &category).await,
    }
}

struct RunOptions {
    method: Method,
    profile: TaskProfile,
    data_dir: PathBuf,
    prompt_dir: PathBuf,
    output_dir: PathBuf,
    concurrency: usize,
    show_progress: bool,
}

async fn cmd_run(opts: RunOptions, llm: LlmConfig) -> Result<()> {
    if llm.api_key.is_none() {
        bail!("{API_KEY_ENV} is not set");
    }

    let prompts = PromptSet::load(&opts.prompt_dir, &opts.profile, opts.method)
        .context("Failed to load prompts")?;
    let dataset_path = opts.profile.dataset_path(&opts.data_dir);
    let dataset = Dataset::load(&dataset_path).context("Failed to load dataset")?;
    info!(
        task = %opts.profile.task,
        method = %opts.method,
        backend = %opts.profile.backend,
        items = dataset.len(),
        dataset = %dataset_path.display(),
        "starting run"
    );

    let engine: Arc<dyn ReasoningEngine> = Arc::new(ChatCompletionsClient::new(llm));
    let runner = match prompts {
        PromptSet::Cot { system } => Runner::Cot(CotRunner::new(engine, system)),
        PromptSet::React {
            thought,
            observation,
        } => {
            let calendar: Arc<dyn CalendarSource> = Arc::new(KasiClient::from_env());
            let dispatcher = Dispatcher::new(engine.clone(), calendar, opts.profile.backend);
            Runner::React(ReactRunner::new(
                engine,
                dispatcher,
                thought,
                observation,
                opts.profile.variant,
            ))
        }
    };

    let bar = opts
        .show_progress
        .then(|| progress_bar(dataset.len() as u64));
    let mut driver = BatchDriver::new(runner).with_concurrency(opts.concurrency);
    if let Some(bar) = &bar {
        let bar = bar.clone();
        let hook: ProgressHook = Arc::new(move |record: &EvaluationRecord| {
            bar.set_message(format!("id {}", record.id()));
            bar.inc(1);
        });
        driver = driver.with_progress(hook);
    }

    let report = driver.run(dataset).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let file_name = opts.profile.results_file_name(opts.method);
    let results_path = opts.output_dir.join(&file_name);
    write_results_json(&results_path, &report.records)?;
    write_summary_json(
        &opts.output_dir.join(summary_file_name(&file_name)),
        &report.summary,
    )?;

    println!("{}", report.summary);
    println!("Results written to {}", results_path.display());
    Ok(())
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
    {
        bar.set_style(style);
    }
    bar
}

fn cmd_calc(expression: &str) -> Result<()> {
    match datewise_core::evaluate(expression) {
        Ok(date) => {
            println!("{date}");
            Ok(())
        }
        Err(e) => bail!("{e}"),
    }
}

async fn cmd_calendar(year: &str, month: &str, category: &str) -> Result<()> {
    let config = KasiConfig::from_env();
    if config.usable_key().is_none() {
        bail!("{} is not set", datewise_calendar::SERVICE_KEY_ENV);
    }
    let client = KasiClient::new(config);
    let input = json!({"year": year, "month": month, "category": category});
    println!("{}", calendar::lookup(&client, &input).await);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["datewise", "run", "--method", "react"]).expect("parse");
        match cli.command {
            Commands::Run {
                method,
                task,
                tools,
                concurrency,
                ..
            } => {
                assert_eq!(method, Method::React);
                assert_eq!(task, Task::T1);
                assert_eq!(tools, None);
                assert_eq!(concurrency, 1);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn turn_budget_is_not_a_flag() {
        assert!(
            Cli::try_parse_from(["datewise", "run", "--method", "react", "--max-turns", "3"])
                .is_err()
        );
    }

    #[test]
    fn run_requires_method() {
        assert!(Cli::try_parse_from(["datewise", "run"]).is_err());
        assert!(Cli::try_parse_from(["datewise", "run", "--method", "tot"]).is_err());
    }

    #[test]
    fn tools_override_parses() {
        let cli = Cli::try_parse_from([
            "datewise", "--json", "run", "-m", "cot", "--task", "t3", "--tools", "live",
        ])
        .expect("parse");
        assert!(cli.json);
        match cli.command {
            Commands::Run { task, tools, .. } => {
                assert_eq!(task, Task::T3);
                assert_eq!(tools, Some(ToolBackend::Live));
            }
            _ => panic!("expected run"),
        }
    }
}
