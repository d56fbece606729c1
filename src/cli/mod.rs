//! Command-line driver.
//!
//! Streams one call and prints its text to stdout as it arrives.
//! Diagnostics and errors go to stderr.
//!
//! ```ignore
//! use dify_stream::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! run_cli_command(command).await?;
//! ```

pub mod args;
pub mod version;

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde_json::Value;
use tracing::debug;

pub use args::{parse_args, ArgsError, CliCommand, USAGE};
pub use version::VERSION;

use crate::client::{ChatMessageParams, CompletionMessageParams, DifyClient, RunWorkflowParams};
use crate::events::{JsonObject, RunStatus};
use crate::handler::StreamControl;
use crate::stream::{StopHandle, StreamOutcome};

/// Run a parsed command to completion.
pub async fn run_cli_command(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Version => {
            println!("{}", version::version_line());
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Chat {
            query,
            user,
            conversation_id,
        } => {
            let mut params = ChatMessageParams::new(query, user);
            if let Some(id) = conversation_id {
                params = params.with_conversation_id(id);
            }
            run_chat(&client()?, &params).await
        }
        CliCommand::Workflow { inputs, user } => {
            let params = RunWorkflowParams::new(parse_inputs(&inputs)?, user);
            run_workflow(&client()?, &params).await
        }
        CliCommand::Completion { query, user } => {
            run_completion(&client()?, &CompletionMessageParams::new(query, user)).await
        }
    }
}

fn client() -> Result<DifyClient> {
    DifyClient::from_env().wrap_err("Failed to configure client")
}

fn parse_inputs(raw: &str) -> Result<JsonObject> {
    match serde_json::from_str::<Value>(raw).wrap_err("Workflow inputs are not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => Err(eyre!("Workflow inputs must be a JSON object, got {}", other)),
    }
}

/// Streamed text output. The first failed write (e.g. a closed pipe)
/// stops the session; later writes are skipped.
struct TextOutput<W> {
    out: Mutex<W>,
    stop: StopHandle,
}

impl<W: Write> TextOutput<W> {
    fn new(out: W, stop: StopHandle) -> Arc<Self> {
        Arc::new(Self {
            out: Mutex::new(out),
            stop,
        })
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            debug!(error = %e, "Output closed, stopping stream");
            self.stop.stop();
        }
    }
}

pub async fn run_chat(client: &DifyClient, params: &ChatMessageParams) -> Result<()> {
    let handler = client.chat_stream(params).await?;
    let out = TextOutput::new(std::io::stdout(), handler.stop_handle());
    let (answer, replaced, ended) = (out.clone(), out.clone(), out);
    handler
        .on_message(move |m| answer.write(&m.answer))
        .on_message_replace(move |m| replaced.write(&format!("\n[replaced] {}", m.answer)))
        .on_message_end(move |end| {
            ended.write("\n");
            if let Some(id) = &end.conversation_id {
                eprintln!("conversation: {}", id);
            }
        })
        .on_error_event(|e| eprintln!("\nserver error {} ({}): {}", e.status, e.code, e.message));
    finish(handler.wait_for_completion().await)
}

pub async fn run_workflow(client: &DifyClient, params: &RunWorkflowParams) -> Result<()> {
    let handler = client.run_workflow_stream(params).await?;
    let out = TextOutput::new(std::io::stdout(), handler.stop_handle());
    let (chunks, ended) = (out.clone(), out);
    handler
        .on_node_started(|n| eprintln!("> {} ({})", n.data.title, n.data.node_type))
        .on_text_chunk(move |c| chunks.write(&c.data.text))
        .on_workflow_finished(move |w| {
            ended.write("\n");
            match (&w.data.status, &w.data.error) {
                (RunStatus::Succeeded, _) => {
                    if let Some(outputs) = &w.data.outputs {
                        eprintln!("outputs: {}", Value::Object(outputs.clone()));
                    }
                }
                (status, error) => eprintln!(
                    "workflow {}: {}",
                    status.as_str(),
                    error.as_deref().unwrap_or("no error message")
                ),
            }
        });
    finish(handler.wait_for_completion().await)
}

pub async fn run_completion(client: &DifyClient, params: &CompletionMessageParams) -> Result<()> {
    let handler = client.completion_stream(params).await?;
    let out = TextOutput::new(std::io::stdout(), handler.stop_handle());
    let (answer, ended) = (out.clone(), out);
    handler
        .on_message(move |m| answer.write(&m.answer))
        .on_message_end(move |_| ended.write("\n"))
        .on_error_event(|e| eprintln!("\nserver error {} ({}): {}", e.status, e.code, e.message));
    finish(handler.wait_for_completion().await)
}

fn finish(outcome: std::result::Result<StreamOutcome, crate::error::StreamError>) -> Result<()> {
    match outcome {
        Ok(_) => Ok(()),
        Err(e) => Err(eyre!("{}: {}", e.error_code(), e.user_message())),
    }
}
