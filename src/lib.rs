//! # fastnews
//!
//! Headlines, bookmarks and on-demand article summaries on top of a
//! NewsAPI-compatible service and a generative-model endpoint.
//!
//! ## Architecture
//!
//! - [`store`]: Durable key-value preference file with one observable stream per key
//! - [`settings`]: Typed settings and the bookmark collection over that store
//! - [`feed`]: News-list coordinator that refetches when country, language or category change
//! - [`summarize`]: Scrape-and-summarize service plus its single-flight state machine
//!
//! Coordinators receive their dependencies ([`settings::SettingsRepository`],
//! [`news::NewsSource`], [`summarize::Summarizer`]) at construction; nothing
//! in the crate is a global.

pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod feed;
pub mod generative;
pub mod models;
pub mod news;
pub mod outputs;
pub mod page;
pub mod settings;
pub mod store;
pub mod summarize;
pub mod utils;

pub use error::{Error, Result};
