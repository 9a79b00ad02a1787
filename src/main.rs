use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;

use nutrizulia::api::ApiError;
use nutrizulia::app::{App, LoginFailure};
use nutrizulia::auth::{CedulaType, FileStore, LoginForm};
use nutrizulia::config::{ClientConfig, ConfigError};
use nutrizulia::routes::RouteError;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{}", login_failure_message(.0))]
    Login(#[from] LoginFailure),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Route(#[from] RouteError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn login_failure_message(failure: &LoginFailure) -> String {
    match failure {
        LoginFailure::Invalid(errors) => errors
            .iter()
            .map(|e| format!("{:?}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[derive(Parser, Debug)]
#[command(name = "nutrizulia", about = "NutriZulia session client")]
struct Cli {
    /// API origin; overrides `API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Session file; overrides `NUTRIZULIA_STORE_PATH`.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Sign in through the administrator endpoint.
    #[arg(long)]
    admin: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and navigate to the return URL or the dashboard.
    Login {
        /// Cedula number, digits only.
        numero: String,
        #[arg(long, default_value = "V")]
        tipo: CedulaType,
        #[arg(long, env = "NUTRIZULIA_CLAVE", hide_env_values = true)]
        clave: String,
        #[arg(long)]
        return_url: Option<String>,
    },
    /// End the session locally and notify the server.
    Logout,
    /// Print the stored session without touching the network.
    Status,
    /// Ask the server whether the stored token is still accepted.
    Check,
    /// Start password recovery for a cedula such as `V-12345678`.
    ForgotPassword { cedula: String },
    /// Change the signed-in user's password.
    ChangePassword {
        #[arg(long)]
        actual: String,
        #[arg(long)]
        nueva: String,
    },
    /// Resolve a navigation through the route guards.
    Route { url: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config.set_api_url(api_url)?;
    }
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    config.admin_login |= cli.admin;

    let storage = Arc::new(FileStore::new(config.store_path.clone()));
    let app = App::new(config, storage)?;

    match cli.command {
        Command::Login { numero, tipo, clave, return_url } => run_login(&app, tipo, numero, clave, return_url).await,
        Command::Logout => run_logout(&app).await,
        Command::Status => run_status(&app),
        Command::Check => run_check(&app).await,
        Command::ForgotPassword { cedula } => {
            let message = app.gateway().forgot_password(&cedula).await?;
            print_json(&json!({ "message": message }))
        }
        Command::ChangePassword { actual, nueva } => {
            let message = app.gateway().change_password(&actual, &nueva).await?;
            print_json(&json!({ "message": message }))
        }
        Command::Route { url } => {
            let resolved = app.navigate(&url)?;
            print_json(&json!({
                "page": resolved.page.title(),
                "url": resolved.url,
                "redirects": resolved.hops,
            }))
        }
    }
}

async fn run_login(
    app: &App,
    tipo: CedulaType,
    numero: String,
    clave: String,
    return_url: Option<String>,
) -> Result<(), CliError> {
    let mut form = LoginForm::new(tipo, numero, clave);
    let resolved = app.login(&mut form, return_url.as_deref()).await?;
    let user = app.gateway().current_user();
    print_json(&json!({
        "user": user.map(|u| u.full_name()),
        "url": resolved.url,
        "page": resolved.page.title(),
    }))
}

async fn run_logout(app: &App) -> Result<(), CliError> {
    let ack = app.logout().await?;
    if !ack.remote_acknowledged {
        eprintln!("server did not acknowledge logout; local session cleared");
    }
    println!("ok");
    Ok(())
}

fn run_status(app: &App) -> Result<(), CliError> {
    let gateway = app.gateway();
    gateway.check_auth_status();
    let token = gateway.token();
    let expires_at = gateway
        .tokens()
        .token_expiration(token.as_deref())
        .and_then(|at| at.format(&Rfc3339).ok());

    let mut out = serde_json::to_value(gateway.state())?;
    if let Value::Object(map) = &mut out {
        map.remove("token");
        map.insert("phase".into(), json!(format!("{:?}", gateway.phase())));
        map.insert("expiresAt".into(), json!(expires_at));
        map.insert("apiUrl".into(), json!(app.config().api_url));
    }
    print_json(&out)
}

async fn run_check(app: &App) -> Result<(), CliError> {
    app.gateway().check_remote().await?;
    println!("ok");
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
