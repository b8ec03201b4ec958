use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "airpulse-cli")]
#[command(about = "Management CLI for the AirPulse onboarding service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key for `status` and `clear-all`.
    #[arg(short, long, env = "AIRPULSE_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

/// Identity forwarded the way the gateway does.
#[derive(Args)]
struct UserArgs {
    /// Subject id of the user.
    #[arg(long)]
    user: String,

    /// Email; wallets are keyed by it when present.
    #[arg(long)]
    email: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or fetch the user's wallet
    Provision(UserArgs),
    /// Show the user's wallet address and public key
    Wallet(UserArgs),
    /// Delete the user's wallet record
    Reset(UserArgs),
    /// Show the dashboard view for a user
    Dashboard(UserArgs),
    /// Read the user's profile from the ledger
    Profile(UserArgs),
    /// Check whether the user has a profile on the ledger
    HasProfile(UserArgs),
    /// Submit a health profile
    Submit {
        #[command(flatten)]
        who: UserArgs,
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u64,
        #[arg(long)]
        gender: String,
        /// Repeat for several conditions.
        #[arg(long = "condition", required = true)]
        conditions: Vec<String>,
        #[arg(long, default_value = "")]
        walk_time: String,
        #[arg(long, default_value = "")]
        sensitivity: String,
        #[arg(long)]
        location: String,
    },
    /// Show the current air-quality reading
    AirQuality,
    /// Check service status
    Status,
    /// Remove every wallet record
    ClearAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let base = cli.url.trim_end_matches('/').to_string();
    let api = |path: &str| format!("{}/api/v1/{}", base, path);

    let request = match cli.command {
        Commands::Provision(who) => as_user(client.post(api("wallet")), &who)?,
        Commands::Wallet(who) => as_user(client.get(api("wallet")), &who)?,
        Commands::Reset(who) => as_user(client.delete(api("wallet")), &who)?,
        Commands::Dashboard(who) => as_user(client.get(api("dashboard")), &who)?,
        Commands::Profile(who) => as_user(client.get(api("profile")), &who)?,
        Commands::HasProfile(who) => as_user(client.get(api("profile/exists")), &who)?,
        Commands::Submit {
            who,
            name,
            age,
            gender,
            conditions,
            walk_time,
            sensitivity,
            location,
        } => {
            let profile = json!({
                "name": name,
                "age": age,
                "gender": gender,
                "chronicCondition": conditions,
                "preferredWalkTime": walk_time,
                "pollutionSensitivity": sensitivity,
                "location": location,
            });
            as_user(client.post(api("profile")), &who)?.json(&profile)
        }
        Commands::AirQuality => client.get(api("air-quality")),
        Commands::Status => client
            .get(format!("{}/admin/status", base))
            .headers(admin_headers(&cli.key)?),
        Commands::ClearAll => client
            .post(format!("{}/admin/wallets/clear", base))
            .headers(admin_headers(&cli.key)?),
    };

    print_response(request.send().await?).await
}

fn as_user(
    request: RequestBuilder,
    who: &UserArgs,
) -> Result<RequestBuilder, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert("x-user-id", HeaderValue::from_str(&who.user)?);
    if let Some(email) = &who.email {
        headers.insert("x-user-email", HeaderValue::from_str(email)?);
    }
    Ok(request.headers(headers))
}

fn admin_headers(key: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", key))?,
    );
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
