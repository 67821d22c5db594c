use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tautest",
    version,
    about = "Send HTTP requests and validate the responses"
)]
pub struct Cli {
    /// Configuration file; defaults to the nearest tautest.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Prefix for relative request URLs.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Extra request header (repeatable).
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
    /// Validate redirect responses instead of following them.
    #[arg(long)]
    pub no_follow_redirects: bool,
    /// Maximum number of redirects to follow.
    #[arg(long)]
    pub max_redirects: Option<u32>,
    /// Response rendering verbosity.
    #[arg(long)]
    pub verbosity: Option<u32>,
    /// Emit JSON output instead of human-readable output.
    #[arg(long)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Eq, PartialEq, Subcommand)]
pub enum Command {
    /// Send a GET request.
    Get(ReadArgs),
    /// Send a DELETE request.
    Delete(ReadArgs),
    /// Send a POST request.
    Post(WriteArgs),
    /// Send a PUT request.
    Put(WriteArgs),
    /// Send a PATCH request.
    Patch(WriteArgs),
    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Eq, PartialEq, Subcommand)]
pub enum ConfigCommand {
    /// Emit the default tautest.toml configuration.
    Default,
}

#[derive(Args, Debug, Eq, PartialEq)]
pub struct ReadArgs {
    /// Absolute URL, or a path relative to the base URL.
    pub url: String,
    /// Expected response body as inline JSON or @path to a JSON file.
    #[arg(long, value_name = "JSON|@PATH")]
    pub expect: Option<String>,
    /// Expected status code; replaces the method's default.
    #[arg(long)]
    pub status: Option<u16>,
}

#[derive(Args, Debug, Eq, PartialEq)]
pub struct WriteArgs {
    /// Absolute URL, or a path relative to the base URL.
    pub url: String,
    /// JSON request body, inline or @path.
    #[arg(long, value_name = "JSON|@PATH")]
    pub body: Option<String>,
    /// Expected response body as inline JSON or @path to a JSON file.
    #[arg(long, value_name = "JSON|@PATH")]
    pub expect: Option<String>,
    /// Expected status code; replaces the method's default.
    #[arg(long)]
    pub status: Option<u16>,
}
