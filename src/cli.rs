//! Command-line interface definitions for fastnews.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Global options can also be provided through environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the fastnews application.
///
/// # Examples
///
/// ```sh
/// # Top headlines for the saved country and language
/// fastnews headlines
///
/// # Business news, printed as JSON
/// fastnews --json headlines --category business
///
/// # Summarize an article
/// GEMINI_API_KEY=... fastnews summarize https://example.com/story
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the preference file
    #[arg(short, long, env = "FASTNEWS_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "FASTNEWS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// News API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true, global = true)]
    pub news_api_key: Option<String>,

    /// Generative model API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub gemini_api_key: Option<String>,

    /// Print results as JSON instead of text
    #[arg(short, long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show headlines for the preferred country and language
    Headlines {
        /// general, business, entertainment, health, science, sports or technology
        #[arg(short = 'k', long, default_value = "general")]
        category: String,
    },
    /// Search articles by keyword in the preferred language
    Search { query: String },
    /// Summarize the article at a url
    Summarize { url: String },
    /// Manage bookmarks
    #[command(subcommand)]
    Bookmarks(BookmarkCommand),
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum BookmarkCommand {
    /// List saved bookmarks
    List,
    /// Save a bookmark
    Add {
        url: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
    /// Remove the bookmark with this url
    Remove { url: String },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Set the preferred two-letter country code
    Country { code: String },
    /// Set the preferred two-letter language code
    Language { code: String },
    /// Turn dark mode on or off
    DarkMode {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// List supported countries, languages and categories
    Options,
}
