use std::net::IpAddr;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

#[derive(Parser)]
#[command(name = "frontdesk-cli")]
#[command(about = "Management CLI for the frontdesk admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: Url,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// Inspect or toggle maintenance mode
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceAction,
    },
    /// Allow an IP through maintenance mode
    Allow { ip: IpAddr },
    /// Remove an IP from the maintenance allow-list
    Revoke { ip: IpAddr },
}

#[derive(Subcommand)]
enum MaintenanceAction {
    /// Enable maintenance mode
    On,
    /// Disable maintenance mode
    Off,
    /// Show state and allow-list
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, path, body) = match &cli.command {
        Commands::Status => (Method::GET, "admin/status".to_string(), None),
        Commands::Maintenance { action } => match action {
            MaintenanceAction::On => (Method::POST, "admin/maintenance/enable".to_string(), None),
            MaintenanceAction::Off => (Method::POST, "admin/maintenance/disable".to_string(), None),
            MaintenanceAction::Show => (Method::GET, "admin/maintenance".to_string(), None),
        },
        Commands::Allow { ip } => (
            Method::POST,
            "admin/maintenance/ips".to_string(),
            Some(json!({ "ip": ip.to_string() })),
        ),
        Commands::Revoke { ip } => (Method::DELETE, format!("admin/maintenance/ips/{ip}"), None),
    };

    let mut request = client
        .request(method, cli.url.join(&path)?)
        .headers(headers);
    if let Some(body) = body {
        request = request.json(&body);
    }

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
