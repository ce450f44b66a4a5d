use clap::Parser;
use jobserve_autoapply::{Automation, Credentials, SearchCriteria, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jobserve-autoapply", about = "JobServe job application automation")]
struct Args {
    /// Test mode - apply to only 2 jobs
    #[arg(long)]
    test: bool,

    /// Run the browser in headless mode
    #[arg(long)]
    headless: bool,

    /// Maximum number of applications
    #[arg(long)]
    max_apps: Option<usize>,

    /// Directory for the CSV/JSON result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("❌ {err}");
            eprintln!("   Set JOBSERVE_EMAIL and JOBSERVE_PASSWORD before running.");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut criteria = SearchCriteria::default();
    if args.test {
        criteria.max_applications = 2;
    } else if let Some(max_apps) = args.max_apps {
        criteria.max_applications = max_apps;
    }

    let settings = Settings {
        headless: args.headless,
        output_dir: args.output_dir,
        ..Settings::default()
    };

    println!("🚀 Starting JobServe automation..");
    println!("📧 Email: {}", credentials.email);
    println!(
        "🔍 Search: {} in {}",
        criteria.keywords, criteria.location
    );
    println!("🎯 Max applications: {}", criteria.max_applications);
    println!("🖥️ Headless mode: {}", settings.headless);
    if args.test {
        println!("🧪 Running in TEST MODE - will apply to maximum 2 jobs");
    }

    match Automation::new(credentials, criteria, settings).run() {
        Ok((csv_path, json_path)) => {
            println!("✅ Automation completed");
            println!("   Results: {} / {}", csv_path.display(), json_path.display());
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("❌ Automation failed: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}
