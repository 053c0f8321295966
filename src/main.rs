//! CLI interface for flight-dashboard

use anyhow::Context;
use clap::{Parser, Subcommand};
use flight_dashboard::charts::route_chart;
use flight_dashboard::form::parse_date;
use flight_dashboard::view::{ROUTES_LOADING, SEARCH_LOADING};
use flight_dashboard::{logging, ApiClient, Config, Dashboard, DashboardState, FieldEdit, Loader};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "flight-dashboard")]
#[command(about = "Airline demand dashboard for the flight-search API")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Backend API base URL, e.g. http://localhost:8000/api
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the popular routes chart
    Routes,
    /// Run one flight search and show the dashboard
    Search {
        /// Origin airport code
        #[arg(short, long, default_value = "SYD")]
        origin: String,
        /// Destination airport code
        #[arg(short, long, default_value = "MEL")]
        destination: String,
        /// Departure date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Return date (YYYY-MM-DD)
        #[arg(short, long)]
        return_date: Option<String>,
        /// Print the raw result and chart data as JSON
        #[arg(long)]
        json: bool,
        /// Output file for JSON results
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Edit the form and search repeatedly in one session
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_with_env(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    // Commands report failure by returning Err, so the guard flushes the log file on the way out
    let _log_guard = logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Routes => run_routes(&config).await,
        Commands::Search {
            origin,
            destination,
            date,
            return_date,
            json,
            output,
        } => {
            let mut edits = vec![FieldEdit::Origin(origin), FieldEdit::Destination(destination)];
            if let Some(date) = date {
                edits.push(FieldEdit::Date(parse_date(&date)?));
            }
            if let Some(return_date) = return_date {
                edits.push(FieldEdit::ReturnDate(Some(parse_date(&return_date)?)));
            }
            run_search(&config, edits, json, output).await
        }
        Commands::Interactive => run_interactive(&config).await,
    }
}

async fn mounted_dashboard(config: &Config) -> anyhow::Result<Dashboard<ApiClient>> {
    let client = ApiClient::new(&config.api).context("Failed to create API client")?;
    let mut dashboard = Dashboard::new(client);
    with_spinner(&Loader::new(Some(ROUTES_LOADING)), dashboard.mount()).await;
    Ok(dashboard)
}

async fn run_routes(config: &Config) -> anyhow::Result<()> {
    let dashboard = mounted_dashboard(config).await?;
    let state = dashboard.state();

    if let Some(message) = state.error() {
        eprintln!("{}", message);
        return failure_status(state, "Error fetching routes");
    }

    println!("{}", route_chart(state.routes()).render_text());
    if let Some(advice) = state.seasonal_advice() {
        println!("Seasonal advice: {}", advice);
    }
    Ok(())
}

async fn run_search(
    config: &Config,
    edits: Vec<FieldEdit>,
    json: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut dashboard = mounted_dashboard(config).await?;
    for edit in edits {
        dashboard.edit(edit);
    }
    with_spinner(&Loader::new(Some(SEARCH_LOADING)), dashboard.submit()).await;

    let state = dashboard.state();
    if json {
        let charts = flight_dashboard::Charts::build(
            state.flights().map(|f| f.data.as_slice()).unwrap_or_default(),
            state.routes(),
        );
        let payload = serde_json::json!({
            "result": state.flights(),
            "charts": charts,
            "error": state.error(),
        });
        let json = serde_json::to_string_pretty(&payload)?;

        if let Some(output_file) = output {
            std::fs::write(&output_file, &json)?;
            println!("Results saved to {}", output_file.display());
        } else {
            println!("{}", json);
        }
    } else {
        print!("{}", dashboard.view());
    }

    failure_status(state, "Error searching for flights")
}

/// Exit status of a one-shot command: the recorded failure, if any, as an error
fn failure_status(state: &DashboardState, context: &str) -> anyhow::Result<()> {
    match state.last_failure() {
        Some(cause) => Err(anyhow::anyhow!("{}: {}", context, cause)),
        None => Ok(()),
    }
}

const INTERACTIVE_HELP: &str = "\
Commands:
  set <field> <value>   origin, destination, date, return_date (empty value clears)
  submit                search with the current form
  show                  redraw the dashboard
  reload                discard this session and load routes again
  quit                  exit";

async fn run_interactive(config: &Config) -> anyhow::Result<()> {
    let mut dashboard = mounted_dashboard(config).await?;
    print!("{}", dashboard.view());
    println!("\n{}", INTERACTIVE_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut parts = line.trim().splitn(3, ' ');
        match parts.next().unwrap_or("") {
            "" => continue,
            "set" => {
                let field = parts.next().unwrap_or("");
                let value = parts.next().unwrap_or("");
                match FieldEdit::parse(field, value) {
                    Ok(edit) => {
                        if !dashboard.edit(edit) {
                            println!("Form is disabled while a search is running");
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            "submit" => {
                with_spinner(&Loader::new(Some(SEARCH_LOADING)), dashboard.submit()).await;
                print!("{}", dashboard.view());
            }
            "show" => print!("{}", dashboard.view()),
            "reload" => {
                dashboard = mounted_dashboard(config).await?;
                print!("{}", dashboard.view());
            }
            "help" => println!("{}", INTERACTIVE_HELP),
            "quit" | "exit" => break,
            other => println!("Unknown command: {} (try `help`)", other),
        }
    }
    Ok(())
}

/// Drive `fut` to completion while animating the loader on stderr
async fn with_spinner<F: Future>(loader: &Loader, fut: F) -> F::Output {
    tokio::pin!(fut);
    let mut ticker = tokio::time::interval(Duration::from_millis(120));
    let mut tick = 0;

    loop {
        tokio::select! {
            output = &mut fut => {
                eprint!("\r{}\r", " ".repeat(loader.frame(tick).chars().count()));
                return output;
            }
            _ = ticker.tick() => {
                eprint!("\r{}", loader.frame(tick));
                let _ = std::io::stderr().flush();
                tick += 1;
            }
        }
    }
}
