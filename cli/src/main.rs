mod output;
mod server;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use tasky_core::{
    normalize_metadata, parse_args, parse_due_date, split_tags, FileTaskRepository, ListFilter,
    NewTask, Priority, Status, TaskService, TaskUpdate, TASK_KEYS,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CLI_LOG_FILTER: &str = "warn";
const SERVE_LOG_FILTER: &str = "tasky=info,tasky_core=info,tower_http=debug";

#[derive(Parser)]
#[command(name = "tasky")]
#[command(version, about = "A personal task tracker", long_about = None)]
struct Cli {
    /// Directory holding tasks.json (default: ~/.tasky)
    #[arg(long, global = true, env = "TASKY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a task (usage: add Pay rent due:friday pri:h tags:home,bills notes:"online")
    Add {
        /// Title words followed by optional key:value pairs
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// List tasks, highest priority first
    List {
        /// pending, completed, archived or all
        #[arg(long, default_value = "pending")]
        status: String,
        /// Everything except archived tasks (overrides --status)
        #[arg(long)]
        include_completed: bool,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        tag: Option<String>,
        /// Due on or before this date (any date expression)
        #[arg(long)]
        due_before: Option<String>,
        /// Only tasks due today
        #[arg(long)]
        today: bool,
        /// Only tasks past their due date
        #[arg(long)]
        overdue: bool,
    },
    /// Show one task by id
    Show { id: String },
    /// Complete a task by id or title fragment
    Done { task: String },
    /// Archive a task by id or title fragment
    Rm {
        task: String,
        /// Remove it from the file instead of archiving
        #[arg(long)]
        permanent: bool,
    },
    /// Change a task (usage: edit <id> [new title] due:.. pri:.. tags:.. notes:..)
    Edit {
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Digest for a day (default: today)
    Summary { date: Option<String> },
    /// Search titles, notes and tags
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "TASKY_HOST", default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, env = "TASKY_PORT", default_value_t = 4005)]
        port: u16,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_date_arg(text: &str) -> Result<NaiveDate> {
    parse_due_date(text).ok_or_else(|| anyhow!("Unrecognised date: '{}'", text))
}

fn parse_status_arg(text: &str) -> Result<Option<Status>> {
    if text.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    text.parse::<Status>().map(Some).map_err(|e| anyhow!(e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let is_serve = matches!(cli.command, Some(Commands::Serve { .. }));
    init_tracing(if is_serve { SERVE_LOG_FILTER } else { CLI_LOG_FILTER });

    let repo = FileTaskRepository::new(cli.data_dir)?;
    let service = TaskService::new(repo);

    match cli.command {
        Some(Commands::Add { args }) => {
            let parsed = parse_args(&args);
            let metadata = normalize_metadata(parsed.metadata, TASK_KEYS)?;

            let mut new_task = NewTask::new(parsed.title);
            new_task.due = metadata.get("due").cloned();
            new_task.priority = metadata
                .get("priority")
                .map(|p| p.parse::<Priority>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            new_task.tags = metadata.get("tags").map(|t| split_tags(t)).unwrap_or_default();
            new_task.notes = metadata.get("notes").cloned();

            let requested_due = new_task.due.clone();
            let task = service.add(new_task)?;
            if let (Some(text), None) = (requested_due, task.due) {
                println!("Warning: could not read due date '{}', left unset", text);
            }
            println!("Task added: {} (ID: {})", task.title, task.id);
            output::print_task(&task);
        }
        Some(Commands::List {
            status,
            include_completed,
            priority,
            tag,
            due_before,
            today,
            overdue,
        }) => {
            let filter = ListFilter {
                status: parse_status_arg(&status)?,
                include_completed,
                priority,
                tag,
                due_before: due_before.as_deref().map(parse_date_arg).transpose()?,
                due_today: today,
                overdue,
            };
            output::print_tasks(&service.list(&filter)?);
        }
        Some(Commands::Show { id }) => match service.get(&id)? {
            Some(task) => output::print_task(&task),
            None => bail!("No task with id '{}'", id),
        },
        Some(Commands::Done { task }) => match service.complete(&task)? {
            Some(done) => println!("Completed: {} (ID: {})", done.title, done.id),
            None => bail!("No task matching '{}'", task),
        },
        Some(Commands::Rm { task, permanent }) => match service.delete(&task, !permanent)? {
            Some(removed) if permanent => {
                println!("Deleted: {} (ID: {})", removed.title, removed.id)
            }
            Some(archived) => println!("Archived: {} (ID: {})", archived.title, archived.id),
            None => bail!("No task matching '{}'", task),
        },
        Some(Commands::Edit { id, args }) => {
            let parsed = parse_args(&args);
            let metadata = normalize_metadata(parsed.metadata, TASK_KEYS)?;

            let changes = TaskUpdate {
                title: Some(parsed.title).filter(|t| !t.is_empty()),
                due: metadata.get("due").cloned(),
                priority: metadata
                    .get("priority")
                    .map(|p| p.parse::<Priority>())
                    .transpose()
                    .map_err(|e| anyhow!(e))?,
                tags: metadata.get("tags").map(|t| split_tags(t)),
                notes: metadata.get("notes").cloned(),
            };
            if changes.is_empty() {
                bail!("Nothing to change");
            }

            match service.update(&id, changes)? {
                Some(task) => {
                    println!("Task updated: {} (ID: {})", task.title, task.id);
                    output::print_task(&task);
                }
                None => bail!("No task with id '{}'", id),
            }
        }
        Some(Commands::Summary { date }) => {
            let date = date.as_deref().map(parse_date_arg).transpose()?;
            output::print_summary(&service.daily_summary(date)?);
        }
        Some(Commands::Search { query }) => {
            output::print_tasks(&service.search(&query.join(" "))?);
        }
        Some(Commands::Serve { host, port }) => {
            let addr = SocketAddr::new(host, port);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(service, addr))?;
        }
        None => {
            output::print_summary(&service.daily_summary(None)?);
        }
    }
    Ok(())
}
