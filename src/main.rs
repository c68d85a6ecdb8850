use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use userauth_client::models::api::{LoginRequest, RegisterRequest};
use userauth_client::models::profile::{Profile, ProfilePatch};
use userauth_client::services::profile::ProfileView;
use userauth_client::{AppError, ClientState, Config};

#[derive(Parser, Debug)]
#[command(name = "userauth", about = "Sign in and manage your userauth profile")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether this installation is signed in
    Status,
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "USERAUTH_PASSWORD", hide_env_values = true)]
        password: String,
        /// Sign in right after registering
        #[arg(long)]
        login: bool,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "USERAUTH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the cached profile
    Logout,
    /// Show the profile
    Profile,
    /// Change profile fields
    Edit {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

fn print_profile(profile: &Profile) {
    println!("[{}] {}", profile.initial(), profile.display_name());
    println!("  Username:   {}", profile.username);
    println!("  Email:      {}", profile.email);
    println!("  First name: {}", profile.first_name);
    println!("  Last name:  {}", profile.last_name);
    if let Some(role) = &profile.role {
        println!("  Role:       {}", role);
    }
    if let Some(last_login) = &profile.last_login {
        println!("  Last login: {}", last_login);
    }
}

async fn run(state: &ClientState, command: Command) -> userauth_client::Result<()> {
    match command {
        Command::Status => match state.session.current_profile() {
            Some(profile) if state.session.is_authenticated() => {
                println!("Welcome, {}", profile.display_name());
            }
            _ => println!("Not signed in"),
        },
        Command::Register {
            first_name,
            last_name,
            username,
            email,
            password,
            login,
        } => {
            let request = RegisterRequest::new(&first_name, &last_name, &username, &email, &password);
            if login {
                let profile = state.auth.register_and_login(request).await?;
                println!("Registration successful. Welcome, {}", profile.display_name());
            } else {
                state.auth.register(request).await?;
                println!("Registration successful! Please login.");
            }
        }
        Command::Login { email, password } => {
            let profile = state.auth.login(LoginRequest::new(&email, &password)).await?;
            println!("Welcome, {}", profile.display_name());
        }
        Command::Logout => {
            state.auth.logout().await?;
            println!("Signed out");
        }
        Command::Profile => match state.profiles.view_profile().await? {
            ProfileView::Fresh(profile) => print_profile(&profile),
            ProfileView::Stale { profile, cause } => {
                println!("(offline copy: {})", cause.user_message());
                print_profile(&profile);
            }
            ProfileView::Guest(profile) => {
                println!("(signed out, showing last known profile)");
                print_profile(&profile);
            }
            ProfileView::Empty => println!("Not signed in. Run `userauth login` first."),
        },
        Command::Edit {
            username,
            first_name,
            last_name,
        } => {
            let patch = ProfilePatch::new(
                username.as_deref(),
                first_name.as_deref(),
                last_name.as_deref(),
            );
            let profile = state.profiles.submit_edit(patch).await?;
            println!("Profile updated");
            print_profile(&profile);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing::debug!("Configuration loaded");

    let state = ClientState::new(&config)?;

    match run(&state, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            if matches!(e, AppError::Unauthorized) {
                eprintln!("{} Run `userauth login`.", e.user_message());
            } else {
                eprintln!("{}", e.user_message());
            }
            tracing::debug!("Command failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
