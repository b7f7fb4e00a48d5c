mod tasks;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brightbudget-ops-cli", about = "BrightBudget operational tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe every backend endpoint and report reachability
    Endpoints {
        /// Target environment: local or production
        #[arg(long, default_value = "local")]
        environment: String,
    },
    /// Report missing translation keys across the l10n files
    #[command(name = "translations-analyze")]
    TranslationsAnalyze {
        #[arg(long, default_value = "assets/l10n")]
        l10n_dir: String,
        #[arg(long, default_value = "translation_analysis_report.json")]
        report: String,
    },
    /// Fill missing translation keys from the analysis report
    #[command(name = "translations-complete")]
    TranslationsComplete {
        #[arg(long, default_value = "assets/l10n")]
        l10n_dir: String,
        #[arg(long, default_value = "translation_analysis_report.json")]
        report: String,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let Cli { command } = Cli::parse();

    match command {
        Command::Endpoints { environment } => {
            let out = tasks::endpoints::run(&environment).await?;
            println!("{out}");
        }
        Command::TranslationsAnalyze { l10n_dir, report } => {
            let out = tasks::translations::analyze(&l10n_dir, &report)?;
            println!("{out}");
        }
        Command::TranslationsComplete { l10n_dir, report } => {
            let out = tasks::translations::complete(&l10n_dir, &report)?;
            println!("{out}");
        }
    }

    Ok(())
}
