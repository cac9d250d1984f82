use anyhow::Context;
use clap::Parser;
use spendlog::args::{Args, Command};
use spendlog::model::NewExpense;
use spendlog::view::ListState;
use spendlog::{commands, Config, DateRange, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for running the program without a server. When SPENDLOG_IN_TEST_MODE is set
    // and non-zero in length, then the mode will be Mode::Test, otherwise it will be
    // Mode::Remote.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, &init_args.api_base_url, init_args.page_size)
                .await?
                .print()
        }

        Command::Register(register_args) => {
            let config = Config::load(home).await?;
            commands::register(
                config,
                mode,
                &register_args.email,
                &register_args.password,
                &register_args.name,
            )
            .await?
            .print()
        }

        Command::Login(login_args) => {
            let config = Config::load(home).await?;
            commands::login(config, mode, &login_args.email, &login_args.password)
                .await?
                .print()
        }

        Command::Logout => commands::logout(Config::load(home).await?).await?.print(),

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            let state = ListState {
                search: list_args.search.clone(),
                sort: list_args.sort,
                page: list_args.page,
                page_size: list_args.page_size.unwrap_or_else(|| config.page_size()),
                from: list_args.from,
                to: list_args.to,
            };
            commands::list(config, mode, state).await?.print()
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            let payload = NewExpense::new(
                add_args.title.clone(),
                add_args.amount.clone(),
                add_args.date.clone(),
                add_args.category.clone(),
            );
            commands::add(config, mode, payload).await?.print()
        }

        Command::Edit(edit_args) => {
            let config = Config::load(home).await?;
            let payload = NewExpense::new(
                edit_args.title.clone(),
                edit_args.amount.clone(),
                edit_args.date.clone(),
                edit_args.category.clone(),
            );
            commands::edit(config, mode, edit_args.id, payload)
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            let confirmed =
                delete_args.yes || confirm(&format!("Delete expense {}? [y/N] ", delete_args.id))?;
            commands::delete(config, mode, delete_args.id, confirmed)
                .await?
                .print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            let range = DateRange {
                from: summary_args.from,
                to: summary_args.to,
            };
            commands::summary(config, mode, summary_args.year, summary_args.month, range)
                .await?
                .print()
        }
    };
    Ok(())
}

/// Asks the user a yes/no question on stderr and reads the answer from stdin. Anything other
/// than "y" or "yes" counts as no.
fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;
    eprint!("{prompt}");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read the confirmation answer")?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
