mod config;
mod error;
mod hierarchy;
mod issue;
mod jira;
mod service;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::error;

use crate::config::Config;
use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::issue::IssueType;
use crate::jira::JiraClient;
use crate::service::{IssueService, IssueSource};

#[derive(Parser)]
#[command(
    name = "epicview",
    about = "Read-only hierarchy dashboard for Jira projects"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "epicview.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List epics in a project
    Epics(QueryArgs),
    /// List tasks in a project
    Tasks(QueryArgs),
    /// List subtasks in a project
    Subtasks(QueryArgs),
    /// List stories in a project
    Stories(QueryArgs),
    /// Show the epic / task / subtask tree for a project
    Hierarchy(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Jira project key
    project: String,

    /// Restrict to these assignees (repeatable)
    #[arg(long = "assignee")]
    assignees: Vec<String>,

    /// Extra JQL appended verbatim to the generated query
    #[arg(long)]
    filter: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let service = IssueService::new(JiraClient::new(&config)?);

    match cli.command {
        Commands::Epics(args) => cmd_issues(&service, &args, IssueType::Epic).await,
        Commands::Tasks(args) => cmd_issues(&service, &args, IssueType::Task).await,
        Commands::Subtasks(args) => cmd_issues(&service, &args, IssueType::Subtask).await,
        Commands::Stories(args) => cmd_issues(&service, &args, IssueType::Story).await,
        Commands::Hierarchy(args) => cmd_hierarchy(&service, &args).await,
    }
}

async fn cmd_issues<S: IssueSource>(
    service: &IssueService<S>,
    args: &QueryArgs,
    issue_type: IssueType,
) -> Result<()> {
    let issues = service
        .issues_by_type(
            &args.project,
            issue_type,
            &args.assignees,
            args.filter.as_deref(),
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    for issue in &issues {
        println!(
            "{} [{}] {} ({})",
            issue.key, issue.status, issue.summary, issue.assignee
        );
    }
    println!("{} issue(s)", issues.len());

    Ok(())
}

async fn cmd_hierarchy<S: IssueSource>(service: &IssueService<S>, args: &QueryArgs) -> Result<()> {
    let hierarchy = service
        .hierarchical_issues(&args.project, &args.assignees, args.filter.as_deref())
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hierarchy)?);
        return Ok(());
    }

    print_tree(&hierarchy);

    Ok(())
}

/// Keys are sorted for a stable reading order; the maps themselves stay
/// hash-based.
fn print_tree(hierarchy: &Hierarchy) {
    let mut epic_keys: Vec<_> = hierarchy.keys().collect();
    epic_keys.sort();

    for epic_key in epic_keys {
        let epic = &hierarchy[epic_key];
        println!(
            "{epic_key} [{}] {} ({})",
            epic.fields.status, epic.fields.summary, epic.fields.assignee
        );

        let mut task_keys: Vec<_> = epic.tasks.keys().collect();
        task_keys.sort();

        for task_key in task_keys {
            let task = &epic.tasks[task_key];
            println!(
                "  {task_key} [{}] {} ({})",
                task.fields.status, task.fields.summary, task.fields.assignee
            );

            let mut subtask_keys: Vec<_> = task.subtasks.keys().collect();
            subtask_keys.sort();

            for subtask_key in subtask_keys {
                let subtask = &task.subtasks[subtask_key];
                println!(
                    "    {subtask_key} [{}] {} ({})",
                    subtask.status, subtask.summary, subtask.assignee
                );
            }
        }
    }
}
