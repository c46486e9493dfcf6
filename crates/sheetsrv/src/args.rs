use std::path::PathBuf;

use clap::Parser;
use logutil::LogFormat;
use sheets_client::google::DEFAULT_ENDPOINT;
use url::Url;

#[derive(Debug, Parser)]
#[clap(name = "sheetsrv", version, about = "HTTP front for Google Sheets")]
pub struct Arguments {
    /// TCP address to bind to.
    #[arg(short, long, env = "SHEETSRV_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// Path to the service account key used to authenticate.
    #[arg(
        short,
        long,
        env = "SHEETSRV_CREDENTIALS",
        default_value = "credentials.json"
    )]
    pub credentials: PathBuf,

    /// Root of the Google Sheets API.
    ///
    /// Should end with a '/'.
    #[arg(long, env = "SHEETSRV_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: Url,

    /// Keep access tokens until they're close to expiring instead of
    /// authenticating on every request.
    #[arg(long, env = "SHEETSRV_REUSE_TOKEN")]
    pub reuse_token: bool,

    /// Serve spreadsheets from memory instead of forwarding to Google.
    ///
    /// Nothing is persisted. Meant for local development. Credentials and
    /// token reuse are ignored.
    #[arg(long)]
    pub in_memory: bool,

    /// Log output format, 'human' or 'json'.
    #[arg(long, env = "SHEETSRV_LOG_FORMAT", default_value_t = LogFormat::HumanReadable)]
    pub log_format: LogFormat,

    /// Increase log verbosity, may be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
