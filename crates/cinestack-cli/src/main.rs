//! CineStack CLI - log in, check and clear the persisted session.
//!
//! A thin front end over `cinestack-core`: it reads the form input, prints
//! the outcome, and plays the navigation role the core routes through.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cinestack_core::{
    launch_route, Authenticator, Config, CredentialVerifier, FileStore, LoginAttempt, LoginError,
    LoginOutcome, Navigator, Route, SessionStore, UserDirectory, UserRecord,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Overrides the configured data directory
const DATA_DIR_ENV: &str = "CINESTACK_DATA_DIR";

#[derive(Parser, Debug)]
#[command(name = "cinestack")]
#[command(about = "Log in to CineStack and manage the saved session", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether a session is saved and for whom
    Status,

    /// Log in with a username or email; prompts for the password
    Login {
        identifier: String,

        /// Keep the session across restarts
        #[arg(short, long)]
        remember: bool,
    },

    /// Clear the saved session
    Logout,

    /// Add a user to the local directory; prompts for the password
    Register {
        username: String,

        #[arg(long)]
        full_name: String,

        #[arg(long)]
        email: String,
    },
}

/// Prints the screen the core asks for.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => println!("Please log in: cinestack login <username or email>"),
            Route::Home => println!("Welcome back."),
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config() -> Result<Config> {
    let mut config = Config::load().context("Failed to load config")?;
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        config.data_dir = Some(PathBuf::from(dir));
    }
    Ok(config)
}

fn open_sessions(config: &Config) -> Result<SessionStore<FileStore>> {
    let store = FileStore::open(config.data_dir()?, &config.session_namespace)
        .context("Failed to open session store")?;
    Ok(SessionStore::new(store))
}

fn status(config: &Config) -> Result<ExitCode> {
    let sessions = open_sessions(config)?;
    let record = sessions.record()?;
    if record.is_active {
        println!(
            "Logged in as {}",
            record.username.as_deref().unwrap_or_default()
        );
        if let Some(name) = record.full_name.filter(|n| !n.is_empty()) {
            println!("Name: {}", name);
        }
        if let Some(email) = record.email.filter(|e| !e.is_empty()) {
            println!("Email: {}", email);
        }
    } else {
        println!("Not logged in");
    }
    ConsoleNavigator.navigate(launch_route(&sessions)?);
    Ok(ExitCode::SUCCESS)
}

fn login(config: &Config, identifier: &str, remember: bool) -> Result<ExitCode> {
    let users = UserDirectory::load(&config.users_file()?)?;
    let mut auth = Authenticator::new(CredentialVerifier::new(users), open_sessions(config)?);

    let password = rpassword::prompt_password("Password: ")?;
    let attempt = LoginAttempt::new(identifier, &password, remember);

    match auth.login(&attempt) {
        Ok(outcome @ LoginOutcome::Success) => {
            println!("{}", outcome.message());
            if !remember {
                println!("Session not saved; you will be asked again next time.");
            }
            ConsoleNavigator.navigate(Route::Home);
            Ok(ExitCode::SUCCESS)
        }
        Ok(outcome @ LoginOutcome::InvalidCredentials) => {
            eprintln!("{}", outcome.message());
            Ok(ExitCode::FAILURE)
        }
        Err(LoginError::Validation(e)) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn logout(config: &Config) -> Result<ExitCode> {
    let mut sessions = open_sessions(config)?;
    sessions.logout(&ConsoleNavigator)?;
    Ok(ExitCode::SUCCESS)
}

fn register(config: &Config, username: &str, full_name: &str, email: &str) -> Result<ExitCode> {
    let path = config.users_file()?;
    let mut users = UserDirectory::load(&path)?;

    let password = rpassword::prompt_password("Password: ")?;
    let record = UserRecord::new(username.trim(), full_name.trim(), email.trim(), &password);

    if let Err(e) = users.register(record) {
        eprintln!("Registration failed: {}", e);
        return Ok(ExitCode::FAILURE);
    }
    users.save(&path)?;

    println!("Registered {}. You can now log in.", username.trim());
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();
    info!("CineStack CLI starting");

    let config = load_config()?;

    match cli.command {
        Command::Status => status(&config),
        Command::Login {
            identifier,
            remember,
        } => login(&config, &identifier, remember),
        Command::Logout => logout(&config),
        Command::Register {
            username,
            full_name,
            email,
        } => register(&config, &username, &full_name, &email),
    }
}
