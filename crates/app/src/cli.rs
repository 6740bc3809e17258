//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use courier_domain::{BodyType, HttpMethod};

/// Courier API client.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about = "Courier API client")]
pub struct Cli {
    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store credentials and load the user's data
    Login {
        /// Bearer token issued by the backend
        #[arg(long)]
        token: String,
        /// Backend user id
        #[arg(long)]
        user_id: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Forget the stored credentials
    Logout,
    /// Send a request, optionally saving it afterwards
    Send(SendArgs),
    /// Print a saved request and its stored response
    Open {
        /// Saved request id
        id: String,
    },
    /// List the collections of the active workspace
    Collections,
    /// Delete a collection after confirmation
    DeleteCollection {
        /// Collection id
        id: String,
    },
    /// List environments, or the variables of one
    Environments {
        /// Environment whose variables are printed
        id: Option<String>,
    },
    /// List or manage local workspaces
    Workspaces {
        #[command(subcommand)]
        action: Option<WorkspaceAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceAction {
    /// Create a workspace
    New {
        /// Display name
        name: String,
    },
    /// Make a workspace active
    Use {
        /// Workspace id
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// HTTP method
    pub method: HttpMethod,

    /// Target URL; `{{key}}` tokens resolve against the environment
    pub url: String,

    /// Header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter as `key=value` (repeatable)
    #[arg(short = 'q', long = "query", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// How the body is interpreted: json, text or form
    #[arg(long, default_value = "json")]
    pub body_type: BodyType,

    /// Environment used to resolve templates
    #[arg(short, long)]
    pub env: Option<String>,

    /// Save into this existing collection
    #[arg(long, conflicts_with = "new_collection")]
    pub save_to: Option<String>,

    /// Save into a new collection with this name
    #[arg(long)]
    pub new_collection: Option<String>,

    /// Folder to save into, created when missing
    #[arg(long)]
    pub folder: Option<String>,
}

fn split_pair(raw: &str, separator: char, shape: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once(separator)
        .ok_or_else(|| format!("expected `{shape}`, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty name in `{raw}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, ':', "Name: value")
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, '=', "key=value")
}
