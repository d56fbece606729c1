//! Command-line argument parsing.

use thiserror::Error;

/// User sent with requests when `--user` is not given.
pub const DEFAULT_USER: &str = "dify-stream-cli";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream a chat answer
    Chat {
        query: String,
        user: String,
        conversation_id: Option<String>,
    },
    /// Stream a workflow run; `inputs` is a JSON object
    Workflow { inputs: String, user: String },
    /// Stream a text completion
    Completion { query: String, user: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("option {0} requires a value")]
    MissingValue(String),
    #[error("unexpected argument: {0}")]
    Unexpected(String),
}

pub const USAGE: &str = "\
Usage:
  dify-stream chat <query> [--user USER] [--conversation ID]
  dify-stream workflow <inputs-json> [--user USER]
  dify-stream completion <query> [--user USER]
  dify-stream --version

Environment:
  DIFY_API_KEY              App API key (required)
  DIFY_BASE_URL             API root (default https://api.dify.ai/v1)
  DIFY_STREAM_TIMEOUT_SECS  Abort a stream after this many seconds
  RUST_LOG                  Log filter (default warn)";

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use dify_stream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["dify-stream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);

    let command = match args.next() {
        None => return Ok(CliCommand::Help),
        Some(command) => command,
    };

    match command.as_str() {
        "--version" | "-V" => Ok(CliCommand::Version),
        "--help" | "-h" | "help" => Ok(CliCommand::Help),
        "chat" => {
            let parsed = Parsed::collect(args, &["--user", "--conversation"])?;
            let user = parsed.user();
            let conversation_id = parsed.option("--conversation");
            Ok(CliCommand::Chat {
                query: parsed.positional.ok_or(ArgsError::MissingArgument("query"))?,
                user,
                conversation_id,
            })
        }
        "workflow" => {
            let parsed = Parsed::collect(args, &["--user"])?;
            let user = parsed.user();
            Ok(CliCommand::Workflow {
                inputs: parsed.positional.ok_or(ArgsError::MissingArgument("inputs-json"))?,
                user,
            })
        }
        "completion" => {
            let parsed = Parsed::collect(args, &["--user"])?;
            let user = parsed.user();
            Ok(CliCommand::Completion {
                query: parsed.positional.ok_or(ArgsError::MissingArgument("query"))?,
                user,
            })
        }
        other => Err(ArgsError::UnknownCommand(other.to_string())),
    }
}

/// One positional argument plus `--name value` options.
struct Parsed {
    positional: Option<String>,
    options: Vec<(String, String)>,
}

impl Parsed {
    fn collect<I>(mut args: I, allowed: &[&str]) -> Result<Self, ArgsError>
    where
        I: Iterator<Item = String>,
    {
        let mut parsed = Parsed {
            positional: None,
            options: Vec::new(),
        };

        while let Some(arg) = args.next() {
            if allowed.contains(&arg.as_str()) {
                let value = args.next().ok_or_else(|| ArgsError::MissingValue(arg.clone()))?;
                parsed.options.push((arg, value));
            } else if arg.starts_with("--") || parsed.positional.is_some() {
                return Err(ArgsError::Unexpected(arg));
            } else {
                parsed.positional = Some(arg);
            }
        }

        Ok(parsed)
    }

    /// Last occurrence wins.
    fn option(&self, name: &str) -> Option<String> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn user(&self) -> String {
        self.option("--user").unwrap_or_else(|| DEFAULT_USER.to_string())
    }
}
