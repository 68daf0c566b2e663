//! mpv JSON IPC client
//!
//! Every call opens a fresh connection to the control socket, writes one
//! `{"command": [...]}` line and reads lines until a command reply arrives.
//! Failures never reach the caller: helpers log and return `false` / `None`.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, error, warn};

use crate::constants::mpv;

/// Reply to a single command
#[derive(Debug, Clone, Deserialize)]
pub struct MpvResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl MpvResponse {
    pub fn is_success(&self) -> bool {
        self.error.as_deref() == Some(mpv::SUCCESS)
    }
}

#[derive(Debug, Clone)]
pub struct MpvClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl MpvClient {
    pub fn new(socket_path: &Path, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.to_path_buf(),
            timeout,
        }
    }

    async fn request(&self, command: &[Value]) -> Result<MpvResponse> {
        let mut line = serde_json::to_string(&json!({ "command": command }))
            .context("Failed to encode mpv command")?;
        line.push('\n');

        tokio::time::timeout(self.timeout, self.exchange(&line))
            .await
            .with_context(|| format!("No reply from mpv within {:?}", self.timeout))?
    }

    async fn exchange(&self, line: &str) -> Result<MpvResponse> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .with_context(|| format!("Failed to connect to {}", self.socket_path.display()))?;
        let (read, mut write) = stream.into_split();

        write
            .write_all(line.as_bytes())
            .await
            .context("Failed to write mpv command")?;

        let mut lines = BufReader::new(read).lines();
        while let Some(reply) = lines.next_line().await.context("Failed to read mpv reply")? {
            let value: Value = serde_json::from_str(&reply)
                .with_context(|| format!("Malformed mpv reply: {}", reply))?;
            // mpv interleaves async events on the same connection
            if value.get("event").is_some() {
                debug!(event = %value["event"], "Skipping mpv event");
                continue;
            }
            return serde_json::from_value(value).context("Unexpected mpv reply shape");
        }

        anyhow::bail!("mpv closed the connection without replying")
    }

    /// Send a raw command, logging any failure
    pub async fn send(&self, command: &[Value]) -> Option<MpvResponse> {
        match self.request(command).await {
            Ok(response) => Some(response),
            Err(e) => {
                let socket_missing = e.chain().filter_map(|c| c.downcast_ref::<io::Error>()).any(|io| {
                    matches!(io.kind(), io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused)
                });
                if socket_missing {
                    warn!(socket = %self.socket_path.display(), "mpv socket not available");
                } else if is_decode_error(&e) {
                    error!(command = ?command, error = %format!("{:#}", e), "Undecodable mpv reply");
                } else {
                    warn!(command = ?command, error = %format!("{:#}", e), "mpv command failed");
                }
                None
            }
        }
    }

    /// Send a command and report whether mpv accepted it
    pub async fn command(&self, command: &[Value]) -> bool {
        match self.send(command).await {
            Some(response) if response.is_success() => true,
            Some(response) => {
                warn!(command = ?command, error = ?response.error, "mpv rejected command");
                false
            }
            None => false,
        }
    }

    pub async fn load_file(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.command(&[json!("loadfile"), json!(path), json!("replace")]).await
    }

    pub async fn stop(&self) -> bool {
        self.command(&[json!("stop")]).await
    }

    pub async fn toggle_pause(&self) -> bool {
        self.command(&[json!("cycle"), json!("pause")]).await
    }

    pub async fn add_volume(&self, delta: i32) -> bool {
        self.command(&[json!("add"), json!("volume"), json!(delta.to_string())]).await
    }

    pub async fn toggle_mute(&self) -> bool {
        self.command(&[json!("cycle"), json!("mute")]).await
    }

    /// Seek relative to the current position; negative goes back
    pub async fn seek(&self, seconds: i32) -> bool {
        self.command(&[json!("seek"), json!(seconds.to_string()), json!("relative")]).await
    }

    pub async fn get_property(&self, name: &str) -> Option<Value> {
        let response = self.send(&[json!("get_property"), json!(name)]).await?;
        if response.is_success() {
            Some(response.data)
        } else {
            debug!(property = %name, error = ?response.error, "Property unavailable");
            None
        }
    }

    /// Whether mpv has no file loaded; `None` if it could not be asked
    pub async fn is_idle(&self) -> Option<bool> {
        self.get_property(mpv::IDLE_PROPERTY).await?.as_bool()
    }
}

/// Whether the failure came from decoding mpv's reply rather than the transport
fn is_decode_error(e: &anyhow::Error) -> bool {
    e.chain().any(|c| c.downcast_ref::<serde_json::Error>().is_some())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::net::UnixListener;
    use tokio::task::JoinHandle;

    pub(crate) const SUCCESS_REPLY: &str = r#"{"data":null,"error":"success"}"#;

    fn arg_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// In-process stand-in for mpv's IPC socket.
    ///
    /// Records each command and answers with the raw lines the replier returns.
    pub(crate) struct StubMpv {
        pub socket: PathBuf,
        requests: Arc<Mutex<Vec<Vec<String>>>>,
        task: JoinHandle<()>,
        _dir: tempfile::TempDir,
    }

    impl StubMpv {
        pub async fn start<F>(reply: F) -> Self
        where
            F: Fn(&[String]) -> Vec<String> + Send + 'static,
        {
            let dir = tempfile::tempdir().unwrap();
            let socket = dir.path().join("mpv.sock");
            let listener = UnixListener::bind(&socket).unwrap();
            let requests = Arc::new(Mutex::new(Vec::new()));
            let log = requests.clone();

            let task = tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let (read, mut write) = stream.into_split();
                    let mut lines = BufReader::new(read).lines();
                    let Ok(Some(line)) = lines.next_line().await else {
                        continue;
                    };
                    let request: Value = serde_json::from_str(&line).unwrap();
                    let command: Vec<String> = request["command"].as_array().unwrap().iter().map(arg_text).collect();

                    let replies = reply(&command);
                    log.lock().unwrap().push(command);
                    for out in replies {
                        let _ = write.write_all(format!("{}\n", out).as_bytes()).await;
                    }
                }
            });

            Self {
                socket,
                requests,
                task,
                _dir: dir,
            }
        }

        pub async fn success() -> Self {
            Self::start(|_| vec![SUCCESS_REPLY.to_string()]).await
        }

        /// Answers `idle-active` queries with `idle`, everything else with success
        pub async fn idle(idle: bool) -> Self {
            Self::start(move |command| match command.first().map(String::as_str) {
                Some("get_property") => vec![format!(r#"{{"data":{},"error":"success"}}"#, idle)],
                _ => vec![SUCCESS_REPLY.to_string()],
            })
            .await
        }

        pub fn commands(&self) -> Vec<Vec<String>> {
            self.requests.lock().unwrap().clone()
        }

        pub fn client(&self) -> MpvClient {
            MpvClient::new(&self.socket, Duration::from_millis(500))
        }
    }

    impl Drop for StubMpv {
        fn drop(&mut self) {
            self.task.abort();
        }
    }

    #[tokio::test]
    async fn test_success_reply_is_success() {
        let stub = StubMpv::success().await;
        assert!(stub.client().toggle_pause().await);
        assert_eq!(stub.commands(), vec![vec!["cycle", "pause"]]);
    }

    #[tokio::test]
    async fn test_other_error_value_is_failure() {
        let stub = StubMpv::start(|_| vec![r#"{"error":"invalid parameter"}"#.to_string()]).await;
        assert!(!stub.client().stop().await);
        assert_eq!(stub.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_socket_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let client = MpvClient::new(&dir.path().join("absent.sock"), Duration::from_millis(200));

        assert!(!client.toggle_mute().await);
        assert_eq!(client.is_idle().await, None);
    }

    #[tokio::test]
    async fn test_close_without_reply_is_failure() {
        let stub = StubMpv::start(|_| Vec::new()).await;
        assert!(!stub.client().toggle_mute().await);
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("mpv.sock");
        // Bound but never accepted: connect succeeds, the reply never comes
        let _listener = UnixListener::bind(&socket).unwrap();
        let client = MpvClient::new(&socket, Duration::from_millis(100));

        assert!(!client.stop().await);
    }

    #[tokio::test]
    async fn test_event_lines_are_skipped() {
        let stub = StubMpv::start(|_| {
            vec![
                r#"{"event":"playback-restart"}"#.to_string(),
                r#"{"data":true,"error":"success","request_id":0}"#.to_string(),
            ]
        })
        .await;

        assert_eq!(stub.client().is_idle().await, Some(true));
        assert_eq!(stub.commands(), vec![vec!["get_property", "idle-active"]]);
    }

    #[tokio::test]
    async fn test_helper_payloads() {
        let stub = StubMpv::success().await;
        let client = stub.client();

        assert!(client.add_volume(-5).await);
        assert!(client.seek(10).await);
        assert!(client.load_file(Path::new("/media/Bambi.mp4")).await);

        assert_eq!(
            stub.commands(),
            vec![
                vec!["add", "volume", "-5"],
                vec!["seek", "10", "relative"],
                vec!["loadfile", "/media/Bambi.mp4", "replace"],
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_property_read_is_none() {
        let stub = StubMpv::start(|_| vec![r#"{"error":"property unavailable"}"#.to_string()]).await;
        assert_eq!(stub.client().get_property("duration").await, None);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_decode_failure() {
        let stub = StubMpv::start(|_| vec!["not json".to_string()]).await;
        let client = stub.client();

        let err = client.request(&[json!("stop")]).await.unwrap_err();
        assert!(is_decode_error(&err));
        assert!(!client.stop().await);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let client = MpvClient::new(&dir.path().join("absent.sock"), Duration::from_millis(200));

        let err = client.request(&[json!("stop")]).await.unwrap_err();
        assert!(!is_decode_error(&err));
    }
}
