#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

//! # domoctl
//!
//! Command-line client for a smart-home provisioning and monitoring backend.
//!
//! domoctl signs in against the backend's REST API, keeps the access/refresh
//! token pair and the session on disk under `~/.config/domoctl`, and
//! transparently refreshes expired access tokens mid-command. Provisioning
//! starts with an application (rooms plus sensors), which an admin approves
//! or rejects; approved homes expose live sensor readings and device control.
//!
//! ## Commands
//!
//! | Command                    | Auth  | Description                         |
//! |----------------------------|-------|-------------------------------------|
//! | `login` / `logout`         | No    | Session management                  |
//! | `register`                 | No    | Account creation                    |
//! | `whoami` / `status`        | Yes   | Account and session state           |
//! | `profile`, `update-profile`, `change-password` | Yes | Profile management |
//! | `apply`, `applications`, `application` | Yes | Provisioning applications |
//! | `approve`, `reject`, `admin-applications`, `user-applications` | Admin | Review |
//! | `dictionaries`             | Yes   | Room/sensor catalogs                |
//! | `rooms`, `devices`         | Yes   | Provisioned rooms                   |
//! | `sensor`                   | Yes   | Live readings, `--watch` to poll    |
//! | `mode`, `toggle`           | Yes   | Manual control and device switching |
//! | `outdoor`                  | Yes   | Outdoor temperature aggregate       |
//! | `users`                    | Admin | Account list                        |
//!
//! ## Architecture
//!
//! ```text
//! main.rs       — entry point, clap subcommands, dispatch
//! commands.rs   — one handler per subcommand, plain-text rendering
//! client.rs     — DomoClient facade; sign-in/sign-out orchestration
//! api/          — one module per backend tag (auth, applications, ...)
//! gateway.rs    — bearer attach, 401 refresh-and-retry, query stripping
//! tokens.rs     — tokens.json (0600), the durable pair
//! session.rs    — session.json + watch-channel change notification
//! config.rs     — TOML config, env overrides, state directory
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use domoctl::commands;
use domoctl::models::{ApplicationStatus, ProfileUpdate, SensorKind};
use domoctl::{ApiError, Config, DomoClient};

/// Smart-home provisioning and monitoring client.
#[derive(Parser)]
#[command(name = "domoctl", version)]
struct Cli {
    /// Path to TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session.
    Login {
        login: String,
        /// Account password.
        #[arg(long, env = "DOMOCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and drop stored tokens.
    Logout,
    /// Create an account (does not sign in).
    Register {
        login: String,
        /// Account password.
        #[arg(long, env = "DOMOCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in account as the backend sees it.
    Whoami,
    /// Show local session state without touching the network.
    Status,
    /// Show the extended profile with application counters.
    Profile,
    /// Update profile name fields.
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        middle_name: Option<String>,
    },
    /// Change the account password.
    ChangePassword {
        /// Current password.
        #[arg(long)]
        old: String,
        /// New password.
        #[arg(long)]
        new: String,
    },
    /// Submit a provisioning application.
    Apply {
        /// Room spec `ROOM_ID` or `ROOM_ID=SENSOR_ID,SENSOR_ID`; repeatable.
        #[arg(long = "room", required = true)]
        rooms: Vec<String>,
    },
    /// List own applications, newest first.
    Applications,
    /// List every application (admin).
    AdminApplications {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show one application in full.
    Application { id: u64 },
    /// Approve an application (admin).
    Approve { id: u64 },
    /// Reject an application (admin).
    Reject {
        id: u64,
        /// Reason shown to the applicant.
        #[arg(long)]
        comment: Option<String>,
    },
    /// List one user's applications (admin).
    UserApplications { user_id: i64 },
    /// Show the selectable room and sensor catalogs.
    Dictionaries,
    /// List provisioned rooms with their sensors.
    Rooms,
    /// List the devices installed in one room.
    Devices { room_id: u64 },
    /// Read a sensor.
    Sensor {
        /// temperature, light, gas, humidity or ventilation.
        kind: SensorKind,
        id: u64,
        /// Poll continuously until Ctrl-C.
        #[arg(long)]
        watch: bool,
        /// Poll interval in seconds.
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
    },
    /// Show the control mode, or switch it.
    Mode {
        /// Switch to this mode before showing it.
        set: Option<ModeArg>,
    },
    /// Switch a light or ventilation device on or off.
    Toggle {
        /// light or ventilation.
        kind: SensorKind,
        room_id: u64,
        sensor_id: u64,
        state: SwitchArg,
    },
    /// Show the latest outdoor temperature aggregate.
    Outdoor,
    /// List accounts with application counters (admin).
    Users {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SwitchArg {
    On,
    Off,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("domoctl: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();

    if config.api_url.is_none() {
        warn!("no API base URL configured; set DOMOCTL_API_URL or api_url in the config file");
    }

    let client = match DomoClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("domoctl: {e}");
            std::process::exit(1);
        }
    };

    // No sign-in hint after a failed login or register; the error is enough.
    let suggest_login = !matches!(
        &cli.command,
        Commands::Login { .. } | Commands::Register { .. }
    );

    let result = match cli.command {
        Commands::Login { login, password } => commands::login(&client, &login, &password).await,
        Commands::Logout => commands::logout(&client),
        Commands::Register { login, password } => {
            commands::register(&client, &login, &password).await
        }
        Commands::Whoami => commands::whoami(&client).await,
        Commands::Status => commands::status(&client),
        Commands::Profile => commands::profile(&client).await,
        Commands::UpdateProfile {
            first_name,
            last_name,
            middle_name,
        } => {
            commands::update_profile(
                &client,
                ProfileUpdate {
                    first_name,
                    last_name,
                    middle_name,
                },
            )
            .await
        }
        Commands::ChangePassword { old, new } => {
            commands::change_password(&client, &old, &new).await
        }
        Commands::Apply { rooms } => commands::apply(&client, &rooms).await,
        Commands::Applications => commands::my_applications(&client).await,
        Commands::AdminApplications { limit, offset } => {
            commands::admin_applications(&client, limit, offset).await
        }
        Commands::Application { id } => commands::show_application(&client, id).await,
        Commands::Approve { id } => {
            commands::process_application(&client, id, ApplicationStatus::Approved, None).await
        }
        Commands::Reject { id, comment } => {
            commands::process_application(&client, id, ApplicationStatus::Rejected, comment).await
        }
        Commands::UserApplications { user_id } => {
            commands::user_applications(&client, user_id).await
        }
        Commands::Dictionaries => commands::dictionaries(&client).await,
        Commands::Rooms => commands::rooms(&client).await,
        Commands::Devices { room_id } => commands::room_devices(&client, room_id).await,
        Commands::Sensor {
            kind,
            id,
            watch,
            interval_secs,
        } => commands::sensor(&client, kind, id, watch, interval_secs).await,
        Commands::Mode { set } => {
            let set_manual = set.map(|mode| matches!(mode, ModeArg::Manual));
            commands::mode(&client, set_manual).await
        }
        Commands::Toggle {
            kind,
            room_id,
            sensor_id,
            state,
        } => {
            commands::toggle(
                &client,
                kind,
                room_id,
                sensor_id,
                matches!(state, SwitchArg::On),
            )
            .await
        }
        Commands::Outdoor => commands::outdoor(&client).await,
        Commands::Users { limit, offset } => commands::admin_users(&client, limit, offset).await,
    };

    if let Err(e) = result {
        eprintln!("domoctl: {e}");
        if suggest_login && (e.is_unauthorized() || matches!(e, ApiError::NoRefreshToken)) {
            eprintln!("domoctl: run `domoctl login <LOGIN>` to sign in again");
        }
        std::process::exit(1);
    }
}
