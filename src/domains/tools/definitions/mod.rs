//! Tool definitions module.
//!
//! One file per upstream provider. Each file owns its action table,
//! request construction and credential lookup; the registry only sees
//! the `ProviderTool` trait.

mod common;

pub mod calendar;
pub mod crypto;
pub mod currency;
pub mod defillama;
pub mod gmail;
pub mod jira;
pub mod maps;
pub mod openweather;
pub mod reddit;
pub mod slack;
pub mod twitter;
pub mod youtube;

pub use calendar::GoogleCalendarTool;
pub use crypto::CryptoTool;
pub use currency::CurrencyTool;
pub use defillama::DefiLlamaTool;
pub use gmail::GmailTool;
pub use jira::JiraTool;
pub use maps::GoogleMapsTool;
pub use openweather::OpenWeatherTool;
pub use reddit::RedditTool;
pub use slack::SlackTool;
pub use twitter::TwitterTool;
pub use youtube::YouTubeTool;
