use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "wc-admin")]
#[command(about = "Headless customize-store wizard and marketplace browser")]
#[command(long_about = "wc-admin drives the customize-store wizard against a wc-admin URL and browses \
                       the extensions marketplace from the terminal. Start with 'wc-admin wizard' to \
                       see where a URL lands in the wizard.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a wc-admin path in the customize-store wizard and replay events against it
    Wizard {
        /// wc-admin path (or full admin URL) the wizard starts from
        #[arg(long, default_value = "/customize-store", help = "Path such as /customize-store/design-with-ai")]
        path: String,
        /// Events to dispatch in order, by wire name or as JSON
        #[arg(long = "event", short = 'e', help = "Event like FINISH_CUSTOMIZATION or '{\"type\":\"SELECTED_NEW_THEME\",\"theme\":\"tsubaki\"}'")]
        events: Vec<String>,
        /// Do not call the store or the preview service
        #[arg(long, help = "Use configured theme cards and skip all network calls")]
        offline: bool,
        /// Print the final state as JSON
        #[arg(long, help = "Emit step, context and transition history as JSON")]
        json: bool,
    },
    /// List marketplace categories as the category selector shows them
    Categories {
        /// Category to mark as selected
        #[arg(long, help = "Category slug to select (defaults to _all)")]
        category: Option<String>,
    },
    /// Search the marketplace catalog
    Search {
        /// Search term
        #[arg(long, default_value = "", help = "Search term, empty for everything")]
        term: String,
        /// Category slug to filter by
        #[arg(long, help = "Only return products from this category")]
        category: Option<String>,
        /// Store country sent to the catalog
        #[arg(long, help = "Two letter country code (defaults to configuration)")]
        country: Option<String>,
        /// Store locale sent to the catalog
        #[arg(long, help = "Locale such as en_US (defaults to configuration)")]
        locale: Option<String>,
    },
    /// Show the effective configuration
    Config {
        /// Write the configuration to a TOML file instead of printing it
        #[arg(long, help = "File path to write the configuration to")]
        output: Option<PathBuf>,
    },
}
