use anyhow::Result;
use clap::Parser;

use wc_admin::cli::commands::categories::CategoriesCommand;
use wc_admin::cli::commands::config::ConfigCommand;
use wc_admin::cli::commands::search::SearchCommand;
use wc_admin::cli::commands::wizard::WizardCommand;
use wc_admin::cli::commands::{show_how_to_start, Command};
use wc_admin::cli::{Cli, Commands};
use wc_admin::config::config;
use wc_admin::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is best effort; a broken config surfaces in the command itself
    if let Ok(settings) = config() {
        let _ = init_telemetry(&settings.observability);
    }

    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        // Default behavior: no subcommand - explain what the tool does
        None => runtime.block_on(show_how_to_start()),
        Some(Commands::Wizard { path, events, offline, json }) => runtime.block_on(async {
            WizardCommand::new(path)
                .with_events(events)
                .with_offline(offline)
                .with_json(json)
                .execute()
                .await
        }),
        Some(Commands::Categories { category }) => runtime.block_on(async {
            CategoriesCommand::new().with_category(category).execute().await
        }),
        Some(Commands::Search { term, category, country, locale }) => runtime.block_on(async {
            SearchCommand::new(term)
                .with_category(category)
                .with_country(country)
                .with_locale(locale)
                .execute()
                .await
        }),
        Some(Commands::Config { output }) => {
            runtime.block_on(async { ConfigCommand::new(output).execute().await })
        }
    }
}
