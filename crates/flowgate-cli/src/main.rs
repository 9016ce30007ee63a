//! flowgate command-line tools.
//!
//! Provides the `flowgate` binary:
//! - `seed`: load flow rows from JSON into a local SQLite warehouse
//! - `render`: query a local warehouse and write the flow diagram as SVG
//! - `explore`: sign in to a running gateway and drill into the diagram
//!   interactively
//!
//! Exit codes: 0 = success, 1 = usage or render error, 2 = authentication
//! error, 3 = I/O or warehouse error.

mod client;
mod explorer;
mod filters;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flowgate_core::{FilterField, TableName};
use flowgate_view::{DiagramRenderer, RenderOptions, RenderOutcome, ViewError, NO_DATA_MESSAGE};
use flowgate_warehouse::schema::{create_demo_database, insert_rows};
use flowgate_warehouse::{FlowRow, SqliteWarehouse, Warehouse, WarehouseConfig};

use crate::client::GatewayClient;
use crate::explorer::{ExploreError, Explorer};
use crate::filters::parse_filters;

/// Flow diagram tools.
#[derive(Parser)]
#[command(name = "flowgate", about = "Flow diagram gateway tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Create a demo warehouse database and load rows into it.
    Seed {
        /// Path to the warehouse database file (created if missing).
        #[arg(short, long)]
        db: String,

        /// JSON file holding an array of flow rows.
        #[arg(short, long)]
        rows: PathBuf,
    },

    /// Render the diagram for a local warehouse to SVG.
    Render {
        /// Path to the warehouse database file.
        #[arg(short, long)]
        db: String,

        /// Table holding the flow rows.
        #[arg(short, long, default_value = "FLOW_DATA")]
        table: String,

        /// Restriction as FIELD=value[,value...]; repeatable.
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Output file (default: stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Explore a running gateway interactively.
    Explore {
        /// Gateway base URL.
        #[arg(short, long, default_value = "http://localhost:3000")]
        server: String,

        /// Access token from the identity provider.
        #[arg(short, long, env = "FLOWGATE_TOKEN")]
        token: String,

        /// File rewritten with the current diagram after every load.
        #[arg(short, long, default_value = "flowgate.svg")]
        out: PathBuf,
    },
}

fn main() {
    let filter =
        EnvFilter::try_from_env("FLOWGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Seed { db, rows } => run_seed(&db, &rows),
        Commands::Render {
            db,
            table,
            filters,
            out,
        } => run_render(&db, &table, &filters, out.as_deref()),
        Commands::Explore { server, token, out } => run_explore(&server, &token, &out),
    };
    process::exit(exit_code);
}

/// Execute the seed subcommand.
fn run_seed(db_path: &str, rows_path: &Path) -> i32 {
    let text = match std::fs::read_to_string(rows_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", rows_path.display(), e);
            return 3;
        }
    };
    let rows: Vec<FlowRow> = match serde_json::from_str(&text) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: '{}' is not a JSON array of flow rows: {}", rows_path.display(), e);
            return 1;
        }
    };

    let mut conn = match create_demo_database(db_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 3;
        }
    };
    match insert_rows(&mut conn, &rows) {
        Ok(count) => {
            println!("Inserted {} row(s) into {}", count, db_path);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            3
        }
    }
}

/// Execute the render subcommand.
fn run_render(db_path: &str, table: &str, filter_args: &[String], out: Option<&Path>) -> i32 {
    let table = match TableName::new(table) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let selection = match parse_filters(filter_args) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let mut warehouse = SqliteWarehouse::new(WarehouseConfig::new(db_path, table));
    let records = match warehouse.query_flows(&selection) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 3;
        }
    };
    let _ = warehouse.close();

    let mut renderer = DiagramRenderer::new(RenderOptions::default());
    let outcome = match renderer.render(&records) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Render error: {}", e);
            return 1;
        }
    };

    match (outcome, out) {
        (RenderOutcome::NoData, _) => {
            eprintln!("{}", NO_DATA_MESSAGE);
            0
        }
        (RenderOutcome::Drawn(diagram), Some(path)) => match std::fs::write(path, &diagram.svg) {
            Ok(()) => {
                eprintln!(
                    "Wrote {} node(s), {} link(s) to {}",
                    diagram.layout.nodes.len(),
                    diagram.layout.links.len(),
                    path.display()
                );
                0
            }
            Err(e) => {
                eprintln!("I/O error: {}", e);
                3
            }
        },
        (RenderOutcome::Drawn(diagram), None) => {
            println!("{}", diagram.svg);
            0
        }
    }
}

const EXPLORE_HELP: &str = "\
Commands:
  options                   list filter options
  filter FIELD [VALUE]      set (or without VALUE clear) a category filter
  reset                     clear all filters
  click LABEL               drill into a node
  at X Y                    drill into the node at canvas point (X, Y)
  show                      print the active filters
  quit                      log out and exit";

/// Execute the explore subcommand.
fn run_explore(server: &str, token: &str, out: &Path) -> i32 {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return 3;
        }
    };
    runtime.block_on(explore(server, token, out))
}

async fn explore(server: &str, token: &str, out: &Path) -> i32 {
    let gateway = match GatewayClient::new(server) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 3;
        }
    };
    let mut explorer = Explorer::new(gateway, RenderOptions::default());

    let outcome = match explorer.login(token).await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };
    if let Err(code) = show_outcome(outcome, out) {
        return code;
    }
    if let Some(user) = explorer.user() {
        println!("Signed in as {} <{}>", user.name, user.email);
    }
    println!("{}", EXPLORE_HELP);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let Some(line) = read_line(&stdin) else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();

        let result = match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["show"] => {
                println!("{}", describe_selection(explorer.selection()));
                match explorer.current() {
                    Some(RenderOutcome::Drawn(diagram)) => println!(
                        "{} row(s), {} node(s) drawn",
                        explorer.records().len(),
                        diagram.layout.nodes.len()
                    ),
                    _ => println!("{}", NO_DATA_MESSAGE),
                }
                continue;
            }
            ["options"] => {
                for field in FilterField::CATEGORIES {
                    println!("{}: {}", field, explorer.panel().options(field).join(", "));
                }
                continue;
            }
            ["reset"] => explorer.reset().await.map(Some),
            ["filter", name, rest @ ..] => match name.parse::<FilterField>() {
                Ok(field) => {
                    let value = rest.join(" ");
                    explorer
                        .select(field, Some(value.as_str()))
                        .await
                        .map(Some)
                }
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            },
            ["click", label @ ..] if !label.is_empty() => {
                let label = label.join(" ");
                explorer.click_node(&label, |prompt| confirm(&stdin, prompt)).await
            }
            ["at", x, y] => match (x.parse::<f64>(), y.parse::<f64>()) {
                (Ok(x), Ok(y)) => explorer.click_at(x, y, |prompt| confirm(&stdin, prompt)).await,
                _ => {
                    eprintln!("usage: at X Y");
                    continue;
                }
            },
            _ => {
                println!("{}", EXPLORE_HELP);
                continue;
            }
        };

        match result {
            Ok(Some(outcome)) => {
                if let Err(code) = show_outcome(outcome, out) {
                    return code;
                }
            }
            Ok(None) => {}
            Err(ExploreError::SessionExpired) => {
                eprintln!("Session expired. Please login again.");
                return 2;
            }
            Err(ExploreError::View(e)) => eprintln!("{}", describe_view_error(&e)),
            Err(e) => {
                eprintln!("Error: {}", e);
                return e.exit_code();
            }
        }
    }

    explorer.logout().await;
    0
}

fn read_line(stdin: &std::io::Stdin) -> Option<String> {
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn confirm(stdin: &std::io::Stdin, prompt: &str) -> bool {
    print!("{}\n[y/N] ", prompt);
    let _ = std::io::stdout().flush();
    read_line(stdin).is_some_and(|answer| answer.eq_ignore_ascii_case("y"))
}

/// Writes the diagram to `out`, or reports that there is nothing to draw.
fn show_outcome(outcome: &RenderOutcome, out: &Path) -> Result<(), i32> {
    match outcome {
        RenderOutcome::NoData => {
            println!("{}", NO_DATA_MESSAGE);
            Ok(())
        }
        RenderOutcome::Drawn(diagram) => {
            std::fs::write(out, &diagram.svg).map_err(|e| {
                eprintln!("I/O error: {}", e);
                3
            })?;
            println!(
                "{} node(s), {} link(s) -> {}",
                diagram.layout.nodes.len(),
                diagram.layout.links.len(),
                out.display()
            );
            Ok(())
        }
    }
}

/// Names the REPL step that failed: choosing a filter or drawing the diagram.
fn describe_view_error(err: &ViewError) -> String {
    match err {
        ViewError::NotSelectable { .. } => format!("Filter error: {}", err),
        _ => format!("Render error: {}", err),
    }
}

fn describe_selection(selection: &flowgate_core::FilterSelection) -> String {
    if selection.is_empty() {
        return "(no filters)".to_string();
    }
    selection
        .iter()
        .map(|(field, values)| format!("{} = {}", field, values.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
