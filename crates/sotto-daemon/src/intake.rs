//! Command intake over a Unix socket.
//!
//! Listens on a Unix domain socket and reads newline-delimited JSON
//! units of the form `{"command": <name>, "args": {...}}`. Every unit
//! gets exactly one reply line; a bad unit is answered with an error
//! and never stops the intake of the next one. Both the network bridge
//! and the UI feed the session through this one door.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use sotto_executor::{CommandArgs, ExecutorError};
use sotto_session::Session;

/// One inbound command unit.
#[derive(Debug, Deserialize)]
pub struct IntakeUnit {
    /// Command name, e.g. "New Contact Request".
    pub command: String,
    /// Keyword arguments.
    #[serde(default)]
    pub args: CommandArgs,
}

/// Reply to one unit.
#[derive(Debug, Serialize)]
pub struct IntakeReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<IntakeError>,
}

/// Structured error on a failed unit.
#[derive(Debug, Serialize)]
pub struct IntakeError {
    pub kind: &'static str,
    pub detail: serde_json::Value,
}

impl IntakeReply {
    fn success(result: serde_json::Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(kind: &'static str, detail: serde_json::Value) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(IntakeError { kind, detail }),
        }
    }

    fn from_executor_error(err: &ExecutorError) -> Self {
        match err {
            ExecutorError::UnknownCommand(name) => {
                Self::failure("unknown_command", json!({ "command": name }))
            }
            ExecutorError::InvalidArguments {
                name,
                missing,
                unexpected,
            } => Self::failure(
                "invalid_arguments",
                json!({
                    "command": name.to_string(),
                    "missing": missing,
                    "unexpected": unexpected,
                }),
            ),
            ExecutorError::Receiver(receiver_err) => {
                Self::failure("rejected", json!(receiver_err.to_string()))
            }
        }
    }
}

/// The intake server.
pub struct IntakeServer {
    session: Arc<Session>,
    socket_path: PathBuf,
}

impl IntakeServer {
    pub fn new(session: Arc<Session>, socket_path: PathBuf) -> Self {
        Self {
            session,
            socket_path,
        }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("intake listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let session = self.session.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(session, stream).await {
                            warn!("connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection, one unit per line.
async fn handle_connection(
    session: Arc<Session>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<IntakeUnit>(&line) {
            Ok(unit) => handle_unit(&session, unit),
            Err(e) => {
                warn!("unparseable unit: {}", e);
                IntakeReply::failure("parse", json!(e.to_string()))
            }
        };

        let mut reply_json = serde_json::to_string(&reply)?;
        reply_json.push('\n');
        writer.write_all(reply_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

fn handle_unit(session: &Session, unit: IntakeUnit) -> IntakeReply {
    debug!(command = %unit.command, "unit received");
    match session.handle_unit(&unit.command, unit.args) {
        Ok(result) => IntakeReply::success(result),
        Err(err) => {
            warn!(command = %unit.command, error = %err, "unit failed");
            IntakeReply::from_executor_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parses_with_and_without_args() {
        let unit: IntakeUnit =
            serde_json::from_str(r#"{"command": "Accept Contact", "args": {"address": "a.onion"}}"#)
                .expect("parse");
        assert_eq!(unit.command, "Accept Contact");
        assert_eq!(unit.args.len(), 1);

        let bare: IntakeUnit =
            serde_json::from_str(r#"{"command": "Accept Contact"}"#).expect("parse");
        assert!(bare.args.is_empty());
    }

    #[test]
    fn test_reply_shapes() {
        let ok = serde_json::to_value(IntakeReply::success(json!({"queued": 1}))).expect("json");
        assert_eq!(ok["ok"], json!(true));
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(IntakeReply::failure("parse", json!("bad"))).expect("json");
        assert_eq!(err["ok"], json!(false));
        assert_eq!(err["error"]["kind"], json!("parse"));
    }

    #[test]
    fn test_bad_unit_yields_error_reply_not_a_crash() {
        let session = Session::new();
        let unit: IntakeUnit =
            serde_json::from_str(r#"{"command": "No Such Command"}"#).expect("parse");
        let reply = handle_unit(&session, unit);
        assert!(!reply.ok);
        assert_eq!(reply.error.expect("error").kind, "unknown_command");
    }
}
