//! `wellstride`: command-line client for the WellStride fitness tracker.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use wellstride::auth::{LoginRequest, RedirectOutcome, SignupForm};
use wellstride::config::{load_config, schema_json};
use wellstride::models::{GoalDraft, GoalStatus, WorkoutDraft};
use wellstride::startup;
use wellstride::state::AppState;
use wellstride::ui::{History, Navigation, Notifier};
use wellstride::utils::logger::init_logging;
use wellstride::utils::token::{inspect_token, mask_token};

#[derive(Parser)]
#[command(name = "wellstride")]
#[command(about = "Track goals and workouts against a WellStride backend")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WELLSTRIDE_CONFIG", default_value = "wellstride.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "WELLSTRIDE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Print the URL that starts an external login
    LoginUrl,
    /// Finish an external login from the URL the browser landed on
    CompleteLogin {
        /// Landing URL, e.g. http://localhost:5173/oauth2/redirect#token=...
        url: String,
        /// Session cookie set by the backend, as `name=value`
        #[arg(long)]
        cookie: Vec<String>,
    },
    /// Manage goals
    #[command(subcommand)]
    Goals(GoalsCommand),
    /// Manage workouts
    #[command(subcommand)]
    Workouts(WorkoutsCommand),
    /// Print the configuration JSON schema
    Schema,
}

#[derive(Subcommand)]
enum GoalsCommand {
    List,
    Add {
        #[arg(long)]
        goal_type: String,
        #[arg(long)]
        target_value: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: Option<String>,
    },
    Status {
        id: i64,
        /// ACTIVE, COMPLETED or CANCELLED
        status: GoalStatus,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum WorkoutsCommand {
    List,
    Add {
        #[arg(long)]
        exercise_type: String,
        #[arg(long)]
        duration_minutes: String,
        /// 1 to 10
        #[arg(long)]
        intensity: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Delete {
        id: i64,
    },
}

/// Prints notifications the way a toast would show them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Schema = cli.command {
        return match schema_json() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to render schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let history = Arc::new(History::new());
    let state = match startup::build(config, history.clone(), Arc::new(ConsoleNotifier)).await {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli.command, &state).await;

    for navigation in history.entries() {
        match &navigation {
            Navigation::Location(to) if to == &state.config.auth.login_route => {
                eprintln!("Session expired. Please log in again.")
            }
            _ => println!("-> {}", navigation),
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, state: &AppState) -> Result<(), String> {
    match command {
        Command::Login { username, password } => {
            let record = state
                .auth
                .login(&LoginRequest::new(username, password))
                .await
                .map_err(|e| e.to_string())?;
            match record.as_ref().and_then(|r| r.username()) {
                Some(name) => println!("Logged in as {}", name),
                None => println!("Logged in"),
            }
        }
        Command::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let form = SignupForm {
                username,
                email,
                password,
                confirm_password,
            };
            state.auth.register(&form).await.map_err(|e| e.to_string())?;
            println!("Account created. You can now log in.");
        }
        Command::Logout => state.auth.logout().await,
        Command::Whoami => whoami(state),
        Command::LoginUrl => println!("{}", state.auth.external_login_url()),
        Command::CompleteLogin { url, cookie } => {
            for c in &cookie {
                state.api.add_cookie(c).map_err(|e| e.to_string())?;
            }
            match state
                .auth
                .complete_external_redirect(&url)
                .await
                .map_err(|e| e.to_string())?
            {
                RedirectOutcome::AlreadyAuthenticated => println!("Already logged in"),
                RedirectOutcome::Authenticated(record) => println!(
                    "Logged in as {}{}",
                    record.username().unwrap_or("(unknown)"),
                    if record.is_admin() { " (admin)" } else { "" }
                ),
            }
        }
        Command::Goals(command) => goals(command, state).await?,
        Command::Workouts(command) => workouts(command, state).await?,
        Command::Schema => {}
    }
    Ok(())
}

fn whoami(state: &AppState) {
    let session = state.auth.state();
    let record = match (&session.user, session.is_authenticated) {
        (Some(record), _) => record,
        (None, true) => {
            println!("Logged in (no stored profile)");
            return;
        }
        (None, false) => {
            println!("Not logged in");
            return;
        }
    };

    println!("user:       {}", record.username().unwrap_or("(unknown)"));
    println!("admin:      {}", record.is_admin());
    let credential = record.credential();
    if credential.is_cookie_session() {
        println!("credential: cookie session");
        return;
    }
    println!("credential: {}", mask_token(credential.as_str()));
    if let Some(summary) = inspect_token(credential.as_str()) {
        if let Some(subject) = &summary.subject {
            println!("subject:    {}", subject);
        }
        if !summary.roles.is_empty() {
            println!("roles:      {}", summary.roles.join(", "));
        }
        if let Some(expires_at) = summary.expires_at {
            let note = if summary.is_expired() { " (expired)" } else { "" };
            println!("expires:    {}{}", expires_at.to_rfc3339(), note);
        }
    }
}

async fn goals(command: GoalsCommand, state: &AppState) -> Result<(), String> {
    match command {
        GoalsCommand::List => {
            let goals = state.goals.list().await.map_err(|e| e.to_string())?;
            if goals.is_empty() {
                println!("No goals yet");
            }
            for goal in goals {
                println!(
                    "{:>5}  {:<20} {:>8} / {:<8} {}",
                    goal.id,
                    goal.goal_type,
                    goal.current_value.unwrap_or(0.0),
                    goal.target_value,
                    goal.status.as_deref().unwrap_or("-")
                );
            }
        }
        GoalsCommand::Add {
            goal_type,
            target_value,
            start_date,
            end_date,
        } => {
            let draft = GoalDraft {
                goal_type,
                target_value,
                start_date,
                end_date,
            };
            let goal = state.goals.create(&draft).await.map_err(|e| e.to_string())?;
            println!("Added goal {}", goal.id);
        }
        GoalsCommand::Status { id, status } => {
            state
                .goals
                .update_status(id, status)
                .await
                .map_err(|e| e.to_string())?;
            println!("Goal {} is now {}", id, status);
        }
        GoalsCommand::Delete { id } => {
            state.goals.delete(id).await.map_err(|e| e.to_string())?;
            println!("Deleted goal {}", id);
        }
    }
    Ok(())
}

async fn workouts(command: WorkoutsCommand, state: &AppState) -> Result<(), String> {
    match command {
        WorkoutsCommand::List => {
            let workouts = state.workouts.list().await.map_err(|e| e.to_string())?;
            if workouts.is_empty() {
                println!("No workouts yet");
            }
            for workout in workouts {
                println!(
                    "{:>5}  {:<20} {:>4} min  intensity {:>2}  {}",
                    workout.id,
                    workout.exercise_type,
                    workout.duration_minutes,
                    workout.intensity,
                    workout.workout_time.as_deref().unwrap_or("")
                );
            }
        }
        WorkoutsCommand::Add {
            exercise_type,
            duration_minutes,
            intensity,
            notes,
        } => {
            let draft = WorkoutDraft {
                exercise_type,
                duration_minutes,
                intensity,
                notes,
            };
            let workout = state
                .workouts
                .create(&draft)
                .await
                .map_err(|e| e.to_string())?;
            println!("Logged workout {}", workout.id);
        }
        WorkoutsCommand::Delete { id } => {
            state.workouts.delete(id).await.map_err(|e| e.to_string())?;
            println!("Deleted workout {}", id);
        }
    }
    Ok(())
}
