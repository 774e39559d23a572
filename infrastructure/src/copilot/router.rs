//! Message routing for concurrent Copilot CLI sessions.
//!
//! The Copilot CLI speaks JSON-RPC over a **single TCP connection**, but a
//! council run keeps several sessions in flight at once (one per participant
//! in each stage). [`MessageRouter`] runs one background reader task that
//! owns the read half and routes every `session.event` to the
//! [`SessionChannel`] registered for its `sessionId`.

use crate::copilot::error::{CopilotError, Result};
use crate::copilot::protocol::{
    CreateSessionParams, Incoming, JsonRpcErrorReply, JsonRpcRequest, JsonRpcResponse, classify,
};
use crate::copilot::transport::{read_frame, write_frame};
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// How long to wait for the CLI to announce its port.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to wait for `session.create` to answer.
const SESSION_CREATE_TIMEOUT: Duration = Duration::from_secs(30);

/// One `session.event` routed to its session
#[derive(Debug)]
pub struct RoutedEvent {
    pub event_type: String,
    pub event: Value,
}

type Routes = Arc<std::sync::RwLock<HashMap<String, mpsc::UnboundedSender<RoutedEvent>>>>;
type Pending = Arc<std::sync::Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;
type Writer = Arc<Mutex<BufWriter<OwnedWriteHalf>>>;

/// Pull the text out of an event's `data` payload.
///
/// The CLI has used several shapes over time:
///
/// - `{ "data": { "content": "text" } }`
/// - `{ "data": { "content": [{ "type": "text", "text": "..." }] } }`
/// - `{ "data": { "message": { "content": "text" } } }`
/// - `{ "data": { "text": "..." } }`
fn extract_event_text(event: &Value) -> Option<String> {
    let data = event.get("data")?;

    if let Some(s) = data.get("content").and_then(Value::as_str)
        && !s.is_empty()
    {
        return Some(s.to_string());
    }

    if let Some(blocks) = data.get("content").and_then(Value::as_array) {
        let text = blocks
            .iter()
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        if !text.is_empty() {
            return Some(text);
        }
    }

    if let Some(s) = data
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        && !s.is_empty()
    {
        return Some(s.to_string());
    }

    data.get("text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Result of feeding one event to a [`ReplyCollector`]
#[derive(Debug, PartialEq)]
enum Step {
    Continue,
    Done(String),
    Failed(String),
}

/// Accumulates one assistant reply from a stream of session events.
///
/// Deltas are preferred; a turn that produced no deltas falls back to the
/// full `assistant.message` or `assistant.turn_end` text.
#[derive(Default)]
struct ReplyCollector {
    text: String,
    turn_delta_bytes: usize,
    turn_has_message: bool,
}

impl ReplyCollector {
    fn apply(&mut self, event_type: &str, event: &Value) -> Step {
        match event_type {
            "assistant.turn_start" => {
                self.turn_delta_bytes = 0;
                self.turn_has_message = false;
            }
            "assistant.message.delta" => {
                if let Some(content) = event
                    .get("data")
                    .and_then(|d| d.get("content"))
                    .and_then(Value::as_str)
                {
                    self.text.push_str(content);
                    self.turn_delta_bytes += content.len();
                }
            }
            "assistant.message" | "assistant.message.completed" => {
                if self.turn_delta_bytes == 0
                    && let Some(text) = extract_event_text(event)
                {
                    self.text.push_str(&text);
                    self.turn_has_message = true;
                }
            }
            "assistant.turn_end" => {
                if self.turn_delta_bytes == 0
                    && !self.turn_has_message
                    && let Some(text) = extract_event_text(event)
                {
                    debug!("turn_end fallback content ({} bytes)", text.len());
                    self.text.push_str(&text);
                }
            }
            "session.idle" => return Step::Done(std::mem::take(&mut self.text)),
            "session.error" => {
                let message = event
                    .get("data")
                    .and_then(|d| d.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown session error");
                return Step::Failed(message.to_string());
            }
            other => trace!("Stream: {}", other),
        }
        Step::Continue
    }
}

/// A per-session event channel.
///
/// Deregisters itself from the router when dropped, so a call abandoned at
/// its deadline stops receiving events.
pub struct SessionChannel {
    rx: mpsc::UnboundedReceiver<RoutedEvent>,
    session_id: String,
    router: Arc<MessageRouter>,
}

impl SessionChannel {
    /// Read events until `session.idle` and return the assembled reply.
    pub async fn read_reply(&mut self) -> Result<String> {
        let mut collector = ReplyCollector::default();
        loop {
            let routed = self.rx.recv().await.ok_or(CopilotError::RouterStopped)?;
            match collector.apply(&routed.event_type, &routed.event) {
                Step::Continue => {}
                Step::Done(text) => {
                    debug!(
                        "Session {} idle, reply complete ({} bytes)",
                        self.session_id,
                        text.len()
                    );
                    return Ok(text);
                }
                Step::Failed(message) => {
                    warn!("Session {} error: {}", self.session_id, message);
                    return Err(CopilotError::RpcError { code: -1, message });
                }
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionChannel {
    fn drop(&mut self) {
        self.router.deregister_session(&self.session_id);
    }
}

/// Demultiplexes one Copilot CLI connection across concurrent sessions.
///
/// 1. Spawns `copilot --server` and connects to the announced port.
/// 2. Owns the read half in a background task.
/// 3. Routes `session.event` notifications by `sessionId`.
/// 4. Correlates responses to requests through `oneshot` channels.
/// 5. Serializes session creation. The session id comes from the
///    `session.create` response; servers that leave it out are matched by the
///    next `session.start` instead.
pub struct MessageRouter {
    _reader_handle: JoinHandle<()>,
    routes: Routes,
    pending: Pending,
    session_starts: Mutex<mpsc::UnboundedReceiver<String>>,
    create_lock: Mutex<()>,
    writer: Writer,
    /// Killed on drop; `None` when connected to an externally managed server
    child: Option<Child>,
}

impl MessageRouter {
    /// Spawn `<command> --server` and connect to it.
    pub async fn spawn(command: &str) -> Result<Arc<Self>> {
        debug!("Spawning Copilot CLI: {} --server", command);

        let mut cmd = Command::new(command);
        cmd.arg("--server")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Linux: the kernel sends SIGTERM to the child if we die without
        // running Drop (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CopilotError::Io(std::io::Error::other("Failed to capture stdout")))?;

        let port = tokio::time::timeout(STARTUP_TIMEOUT, Self::read_port(stdout))
            .await
            .map_err(|_| {
                CopilotError::Timeout(format!(
                    "Copilot CLI did not announce a port within {}s",
                    STARTUP_TIMEOUT.as_secs()
                ))
            })??;

        info!("Copilot CLI listening on port {}, connecting...", port);
        Self::connect(port, Some(child)).await
    }

    /// Connect to a server already listening on `127.0.0.1:<port>`.
    pub async fn connect(port: u16, child: Option<Child>) -> Result<Arc<Self>> {
        let stream = TcpStream::connect(("127.0.0.1", port)).await?;
        let (read_half, write_half) = stream.into_split();

        let routes: Routes = Arc::default();
        let pending: Pending = Arc::default();
        let writer: Writer = Arc::new(Mutex::new(BufWriter::new(write_half)));
        let (start_tx, start_rx) = mpsc::unbounded_channel();

        let reader_handle = tokio::spawn(Self::reader_loop(
            read_half,
            Arc::clone(&routes),
            Arc::clone(&pending),
            start_tx,
            Arc::clone(&writer),
        ));

        Ok(Arc::new(Self {
            _reader_handle: reader_handle,
            routes,
            pending,
            session_starts: Mutex::new(start_rx),
            create_lock: Mutex::new(()),
            writer,
            child,
        }))
    }

    async fn read_port(stdout: tokio::process::ChildStdout) -> Result<u16> {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            debug!("Copilot CLI output: {}", line);
            if let Some(port) = line.strip_prefix("CLI server listening on port ") {
                return port.trim().parse::<u16>().map_err(|_| {
                    CopilotError::UnexpectedResponse(format!(
                        "Failed to parse port number: {}",
                        port
                    ))
                });
            }
        }
        Err(CopilotError::UnexpectedResponse(
            "Copilot CLI exited without announcing port".into(),
        ))
    }

    /// Single owner of the read half. Runs until the connection closes,
    /// then drops every route and pending sender so waiters see
    /// [`CopilotError::RouterStopped`].
    async fn reader_loop(
        read_half: OwnedReadHalf,
        routes: Routes,
        pending: Pending,
        session_starts: mpsc::UnboundedSender<String>,
        writer: Writer,
    ) {
        let mut reader = BufReader::new(read_half);

        loop {
            let body = match read_frame(&mut reader).await {
                Ok(Some(body)) => body,
                Ok(None) => break,
                Err(e) => {
                    warn!("Router: read failed: {}", e);
                    break;
                }
            };

            let frame: Value = match serde_json::from_slice(&body) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Router: failed to parse JSON: {}", e);
                    continue;
                }
            };

            match classify(&frame) {
                Incoming::Response { id } => {
                    let sender = pending
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(&id);
                    match (sender, serde_json::from_value::<JsonRpcResponse>(frame)) {
                        (Some(tx), Ok(response)) => {
                            // The caller gave up (deadline); a session it
                            // created would otherwise stay open on the CLI.
                            if let Err(orphan) = tx.send(response)
                                && let Some(session_id) = orphan.session_id()
                            {
                                debug!("Router: destroying abandoned session {}", session_id);
                                let request = JsonRpcRequest::destroy_session(session_id);
                                if let Ok(json) = serde_json::to_string(&request) {
                                    let mut w = writer.lock().await;
                                    let _ = write_frame(&mut *w, &json).await;
                                }
                            }
                        }
                        (None, _) => debug!("Router: no pending receiver for response id={}", id),
                        (Some(_), Err(e)) => warn!("Router: failed to parse response: {}", e),
                    }
                }
                Incoming::Request { id, method } => {
                    warn!("Router: rejecting incoming request method={}", method);
                    let reply = JsonRpcErrorReply::method_not_found(id, &method);
                    if let Ok(json) = serde_json::to_string(&reply) {
                        let mut w = writer.lock().await;
                        let _ = write_frame(&mut *w, &json).await;
                    }
                }
                Incoming::SessionEvent {
                    session_id,
                    event_type,
                    event,
                } => {
                    if event_type == "session.start" {
                        debug!("Router: session.start for {}", session_id);
                        let _ = session_starts.send(session_id);
                        continue;
                    }
                    let routes = routes.read().unwrap_or_else(|e| e.into_inner());
                    match routes.get(&session_id) {
                        Some(tx) => {
                            let _ = tx.send(RoutedEvent { event_type, event });
                        }
                        None => debug!(
                            "Router: no route for session_id={}, dropping {}",
                            session_id, event_type
                        ),
                    }
                }
                Incoming::Other => trace!("Router: ignoring frame"),
            }
        }

        info!("Router: reader loop ended, closing all session channels");
        routes.write().unwrap_or_else(|e| e.into_inner()).clear();
        pending.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Create a session and register its channel.
    ///
    /// Creation is serialized through `create_lock`. The id is taken from the
    /// correlated `session.create` response, so a creation abandoned at its
    /// deadline can never hand its session to the next caller. `session.start`
    /// events left over from abandoned creations are discarded (and their
    /// sessions destroyed) before each new request.
    pub async fn create_session(
        self: &Arc<Self>,
        params: CreateSessionParams,
    ) -> Result<SessionChannel> {
        let _guard = self.create_lock.lock().await;
        let mut starts = self.session_starts.lock().await;
        self.discard_stale_starts(&mut starts).await;

        let request = JsonRpcRequest::new("session.create", Some(serde_json::to_value(&params)?));
        let response = tokio::time::timeout(SESSION_CREATE_TIMEOUT, self.request(&request))
            .await
            .map_err(|_| CopilotError::Timeout("session.create timed out".into()))??;

        let session_id = match response.session_id() {
            Some(id) => id.to_string(),
            None => match tokio::time::timeout(SESSION_CREATE_TIMEOUT, starts.recv()).await {
                Ok(Some(id)) => id,
                Ok(None) => return Err(CopilotError::RouterStopped),
                Err(_) => {
                    return Err(CopilotError::Timeout(
                        "session.create timed out waiting for session.start".into(),
                    ));
                }
            },
        };
        drop(starts);
        debug!("Router: session created: {} ({})", session_id, params.model);

        let (tx, rx) = mpsc::unbounded_channel();
        self.routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session_id.clone(), tx);

        Ok(SessionChannel {
            rx,
            session_id,
            router: Arc::clone(self),
        })
    }

    /// Drop queued `session.start` ids. Ids with no registered route belong
    /// to abandoned creations and are destroyed.
    async fn discard_stale_starts(&self, starts: &mut mpsc::UnboundedReceiver<String>) {
        while let Ok(session_id) = starts.try_recv() {
            let routed = self
                .routes
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .contains_key(&session_id);
            if routed {
                continue;
            }
            debug!("Router: destroying unclaimed session {}", session_id);
            if let Err(e) = self
                .send_request(&JsonRpcRequest::destroy_session(&session_id))
                .await
            {
                debug!("session.destroy failed: {}", e);
            }
        }
    }

    /// Send a request and wait for the correlated response.
    pub async fn request(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(request.id, tx);

        if let Err(e) = self.send_request(request).await {
            self.pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&request.id);
            return Err(e);
        }

        let response = rx.await.map_err(|_| CopilotError::RouterStopped)?;
        match response.error {
            Some(error) => Err(CopilotError::RpcError {
                code: error.code,
                message: error.message,
            }),
            None => Ok(response),
        }
    }

    /// Send a request without waiting for its response.
    pub async fn send_request(&self, request: &JsonRpcRequest) -> Result<()> {
        let json = serde_json::to_string(request)?;
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, &json).await
    }

    fn deregister_session(&self, session_id: &str) {
        let removed = self
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_id);
        if removed.is_some() {
            debug!("Router: deregistered session {}", session_id);
        }
    }

    /// Number of sessions currently registered
    pub fn active_sessions(&self) -> usize {
        self.routes.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for MessageRouter {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            debug!("MessageRouter dropping, killing copilot child process");
            let _ = child.start_kill();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn extract_text_from_string_content() {
        let event = json!({"type": "assistant.turn_end", "data": {"content": "Hello"}});
        assert_eq!(extract_event_text(&event).as_deref(), Some("Hello"));
    }

    #[test]
    fn extract_text_from_content_blocks() {
        let event = json!({
            "data": {"content": [
                {"type": "tool_use", "name": "x"},
                {"type": "text", "text": "First"},
                {"type": "text", "text": "Second"}
            ]}
        });
        assert_eq!(extract_event_text(&event).as_deref(), Some("First\nSecond"));
    }

    #[test]
    fn extract_text_from_nested_message_and_text() {
        let nested = json!({"data": {"message": {"content": "Nested"}}});
        assert_eq!(extract_event_text(&nested).as_deref(), Some("Nested"));
        let direct = json!({"data": {"text": "Direct"}});
        assert_eq!(extract_event_text(&direct).as_deref(), Some("Direct"));
    }

    #[test]
    fn extract_text_none_when_empty() {
        assert!(extract_event_text(&json!({"data": {"content": ""}})).is_none());
        assert!(extract_event_text(&json!({"type": "x"})).is_none());
    }

    #[test]
    fn collector_prefers_deltas() {
        let mut c = ReplyCollector::default();
        let delta = |s: &str| json!({"data": {"content": s}});
        assert_eq!(c.apply("assistant.message.delta", &delta("Hel")), Step::Continue);
        assert_eq!(c.apply("assistant.message.delta", &delta("lo")), Step::Continue);
        c.apply("assistant.message", &delta("Hello"));
        c.apply("assistant.turn_end", &delta("Hello"));
        assert_eq!(c.apply("session.idle", &json!({})), Step::Done("Hello".into()));
    }

    #[test]
    fn collector_falls_back_to_full_message() {
        let mut c = ReplyCollector::default();
        c.apply("assistant.turn_start", &json!({}));
        c.apply("assistant.message", &json!({"data": {"content": "Whole"}}));
        c.apply("assistant.turn_end", &json!({"data": {"content": "Whole"}}));
        assert_eq!(c.apply("session.idle", &json!({})), Step::Done("Whole".into()));
    }

    #[test]
    fn collector_falls_back_to_turn_end() {
        let mut c = ReplyCollector::default();
        c.apply("assistant.turn_end", &json!({"data": {"text": "Late"}}));
        assert_eq!(c.apply("session.idle", &json!({})), Step::Done("Late".into()));
    }

    #[test]
    fn collector_reports_session_error() {
        let mut c = ReplyCollector::default();
        let step = c.apply("session.error", &json!({"data": {"message": "quota"}}));
        assert_eq!(step, Step::Failed("quota".into()));
    }

    /// Minimal stand-in for `copilot --server`.
    ///
    /// `session.create` emits `session.start` and then the response (with
    /// `sessionId` unless `id_in_response` is off). `session.send` replies
    /// `"<model>: <prompt>"` as two deltas followed by `session.idle`.
    #[derive(Clone, Copy)]
    pub(crate) struct FakeCli {
        /// Holds back the first `session.start` and response by this long
        pub delay_first_create: Duration,
        pub id_in_response: bool,
    }

    pub(crate) struct FakeCliHandle {
        pub port: u16,
        pub destroyed: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Default for FakeCli {
        fn default() -> Self {
            Self {
                delay_first_create: Duration::ZERO,
                id_in_response: true,
            }
        }
    }

    impl FakeCli {
        pub(crate) async fn start(self) -> FakeCliHandle {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let destroyed: Arc<std::sync::Mutex<Vec<String>>> = Arc::default();
            let destroyed_log = Arc::clone(&destroyed);

            tokio::spawn(async move {
                let (stream, _) = listener.accept().await.unwrap();
                let (read_half, write_half) = stream.into_split();
                let mut reader = BufReader::new(read_half);
                let writer: Writer = Arc::new(Mutex::new(BufWriter::new(write_half)));
                let mut models: HashMap<String, String> = HashMap::new();
                let mut next_session = 0;

                while let Ok(Some(body)) = read_frame(&mut reader).await {
                    let request: Value = serde_json::from_slice(&body).unwrap();
                    let id = request["id"].clone();
                    let params = &request["params"];

                    match request["method"].as_str() {
                        Some("session.create") => {
                            next_session += 1;
                            let sid = format!("s{}", next_session);
                            let model = params["model"].as_str().unwrap_or_default();
                            models.insert(sid.clone(), model.to_string());
                            let result = if self.id_in_response {
                                json!({"sessionId": sid})
                            } else {
                                json!({})
                            };
                            let frames = vec![
                                event(&sid, "session.start", json!({})),
                                json!({"jsonrpc": "2.0", "id": id, "result": result}),
                            ];
                            let delay = if next_session == 1 {
                                self.delay_first_create
                            } else {
                                Duration::ZERO
                            };
                            let writer = Arc::clone(&writer);
                            tokio::spawn(async move {
                                tokio::time::sleep(delay).await;
                                write_all(&writer, frames).await;
                            });
                        }
                        Some("session.send") => {
                            let sid = params["sessionId"].as_str().unwrap();
                            let model = models.get(sid).cloned().unwrap_or_default();
                            let reply = format!("{}: {}", model, params["prompt"].as_str().unwrap());
                            let (head, tail) = reply.split_at(reply.len() / 2);
                            let frames = vec![
                                json!({"jsonrpc": "2.0", "id": id, "result": {}}),
                                event(sid, "assistant.message.delta", json!({"content": head})),
                                event(sid, "assistant.message.delta", json!({"content": tail})),
                                event(sid, "session.idle", json!({})),
                            ];
                            write_all(&writer, frames).await;
                        }
                        Some("session.destroy") => {
                            if let Some(sid) = params["sessionId"].as_str() {
                                destroyed_log.lock().unwrap().push(sid.to_string());
                            }
                            let frames = vec![json!({"jsonrpc": "2.0", "id": id, "result": {}})];
                            write_all(&writer, frames).await;
                        }
                        _ => {
                            let frames = vec![json!({"jsonrpc": "2.0", "id": id, "result": {}})];
                            write_all(&writer, frames).await;
                        }
                    }
                }
            });

            FakeCliHandle { port, destroyed }
        }
    }

    pub(crate) async fn fake_cli() -> u16 {
        FakeCli::default().start().await.port
    }

    async fn write_all(writer: &Writer, frames: Vec<Value>) {
        let mut w = writer.lock().await;
        for frame in frames {
            write_frame(&mut *w, &frame.to_string()).await.unwrap();
        }
    }

    fn event(session_id: &str, event_type: &str, data: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "method": "session.event",
            "params": {"sessionId": session_id, "event": {"type": event_type, "data": data}}
        })
    }

    #[tokio::test]
    async fn sessions_are_routed_independently() {
        let port = fake_cli().await;
        let router = MessageRouter::connect(port, None).await.unwrap();

        let params = |m: &str| CreateSessionParams {
            model: m.to_string(),
            streaming: true,
        };
        let mut a = router.create_session(params("a")).await.unwrap();
        let mut b = router.create_session(params("b")).await.unwrap();
        assert_ne!(a.session_id(), b.session_id());
        assert_eq!(router.active_sessions(), 2);

        for (channel, prompt) in [(&a, "first prompt"), (&b, "second prompt")] {
            let request = JsonRpcRequest::new(
                "session.send",
                Some(json!({"sessionId": channel.session_id(), "prompt": prompt})),
            );
            router.request(&request).await.unwrap();
        }

        assert_eq!(b.read_reply().await.unwrap(), "b: second prompt");
        assert_eq!(a.read_reply().await.unwrap(), "a: first prompt");

        drop(a);
        assert_eq!(router.active_sessions(), 1);
    }

    #[tokio::test]
    async fn session_id_comes_from_the_start_event_when_response_omits_it() {
        let fake = FakeCli {
            id_in_response: false,
            ..FakeCli::default()
        }
        .start()
        .await;
        let router = MessageRouter::connect(fake.port, None).await.unwrap();

        let params = CreateSessionParams {
            model: "a".to_string(),
            streaming: true,
        };
        let channel = router.create_session(params).await.unwrap();
        assert_eq!(channel.session_id(), "s1");
    }
}
