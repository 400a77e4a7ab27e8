use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use task_cli::cli::{Cli, Command, collect_overrides, normalize_dependencies};
use task_core::config::{self, Palette, merge_overrides, palette_for_theme};
use task_core::error::AppError;
use task_core::model::{Task, TaskView};
use task_core::storage::json_store;
use task_core::task_api;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKSCHED_LOG";

#[derive(Tabled)]
struct PendingRow {
    priority: i64,
    created_at: String,
    name: String,
    dependencies: String,
    status: String,
}

struct Session {
    store_path: PathBuf,
    palette: Palette,
}

fn init_logging() {
    let Ok(directive) = std::env::var(LOG_ENV_VAR) else {
        return;
    };
    let filter = EnvFilter::try_new(directive.trim()).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn session_for(cli: &Cli) -> Result<Session, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: config ignored: {}", err);
    }

    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let config = merge_overrides(&loaded.config, &overrides);
    let store_path = json_store::resolve_store_path(config.store_path.as_deref())?;

    Ok(Session {
        store_path,
        palette: palette_for_theme(config.theme.as_deref()),
    })
}

fn dependency_label(dependencies: &[String]) -> String {
    if dependencies.is_empty() {
        "-".to_string()
    } else {
        dependencies.join(", ")
    }
}

fn status_label(view: &TaskView, palette: &Palette) -> String {
    if view.executable {
        palette.ready("executable")
    } else {
        palette.blocked(&format!("blocked by {}", view.unmet.join(", ")))
    }
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "name": task.name,
        "priority": task.priority,
        "created_at": task.created_at,
        "dependencies": task.dependencies,
    })
}

fn view_json(view: &TaskView) -> serde_json::Value {
    serde_json::json!({
        "name": view.task.name,
        "priority": view.task.priority,
        "created_at": view.task.created_at,
        "dependencies": view.task.dependencies,
        "executable": view.executable,
        "unmet": view.unmet,
    })
}

fn print_pending_plain(views: &[TaskView], palette: &Palette) {
    if views.is_empty() {
        println!("No pending tasks.");
        return;
    }

    let rows = views.iter().map(|view| PendingRow {
        priority: view.task.priority,
        created_at: view.task.created_at.clone(),
        name: view.task.name.clone(),
        dependencies: dependency_label(&view.task.dependencies),
        status: status_label(view, palette),
    });
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

fn print_completed_plain(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No completed tasks.");
        return;
    }

    for (position, task) in tasks.iter().enumerate() {
        println!(
            "{}. {} | priority {} | {} | depends on: {}",
            position + 1,
            task.name,
            task.priority,
            task.created_at,
            dependency_label(&task.dependencies)
        );
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let session = session_for(&cli)?;
    let path = session.store_path.as_path();

    match cli.command {
        Command::Add {
            name,
            priority,
            depends_on,
            created_at,
        } => {
            let name = match name {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("name is required")),
            };
            let priority =
                priority.ok_or_else(|| AppError::invalid_input("priority is required"))?;
            let dependencies = normalize_dependencies(&depends_on);

            let task = task_api::add_task_from_text_with_path(
                path,
                &name,
                &priority,
                &dependencies,
                created_at.as_deref(),
            )?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added task: {} (priority {})", task.name, task.priority);
            }
        }
        Command::List => {
            let views = task_api::list_tasks_with_path(path)?;
            if cli.json {
                let payload: Vec<_> = views.iter().map(view_json).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else {
                print_pending_plain(&views, &session.palette);
            }
        }
        Command::Done { name } => {
            let task = task_api::complete_task_with_path(path, &name)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Completed task: {}", task.name);
            }
        }
        Command::Next => {
            let next = task_api::next_task_with_path(path)?;
            match (next, cli.json) {
                (Some(view), true) => println!("{}", view_json(&view)),
                (None, true) => println!("null"),
                (Some(view), false) => println!(
                    "Next task: {} (priority {}, created {}) - {}",
                    view.task.name,
                    view.task.priority,
                    view.task.created_at,
                    status_label(&view, &session.palette)
                ),
                (None, false) => println!("No pending tasks."),
            }
        }
        Command::History => {
            let tasks = task_api::list_completed_with_path(path)?;
            if cli.json {
                let payload: Vec<_> = tasks.iter().map(task_json).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else {
                print_completed_plain(&tasks);
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasksched".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            if err.is_persistence() {
                warn!(error = %err, "command aborted by storage failure");
            }
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                let _ = err.print();
                return;
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
