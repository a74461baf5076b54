use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use ops_cli::{Options, Scenario};

/// Exercise every endpoint of a running VidaPlus server
#[derive(Parser, Debug)]
#[command(name = "vidaplus-e2e", version)]
struct Args {
    /// Server base URL
    #[arg(long, env = "VIDAPLUS_BASE_URL", default_value = "http://localhost:5000")]
    base_url: String,

    #[arg(long, env = "VIDAPLUS_ADMIN_EMAIL", default_value = "admin@vidaplus.com")]
    admin_email: String,

    #[arg(long, env = "VIDAPLUS_ADMIN_PASSWORD", default_value = "Admin@123", hide_env_values = true)]
    admin_password: String,

    /// Drop and reseed the database first (server needs dev endpoints enabled)
    #[arg(long)]
    recreate_db: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    println!("{}", "🚀 VidaPlus end-to-end run".bright_cyan().bold());
    println!("   {}", args.base_url.dimmed());
    println!("{}", "=".repeat(60));

    let scenario = match Scenario::new(Options {
        base_url: args.base_url,
        admin_email: args.admin_email,
        admin_password: args.admin_password,
        recreate_db: args.recreate_db,
    }) {
        Ok(scenario) => scenario,
        Err(error) => {
            eprintln!("{} {error:#}", "❌".red());
            return ExitCode::FAILURE;
        }
    };

    let report = scenario.run().await;
    report.print_summary();

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
