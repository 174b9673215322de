//! # WebSocket Server Module
//!
//! Accepts controller connections and feeds their text frames to the
//! [`InputTranslator`].
//!
//! Only one controller session runs at a time. A connection that arrives while
//! another is active completes the WebSocket handshake, receives a Close frame
//! with a policy reason, and is dropped.
//!
//! ## Session Lifecycle
//!
//! 1. Handshake, then centre the pointer
//! 2. Apply each text frame while holding the bridge lock; reply to greetings
//! 3. On close or transport error, release every held key
//!
//! ## Usage
//!
//! ```no_run
//! use pad_bridge::config::Config;
//! use pad_bridge::controller::InputTranslator;
//! use pad_bridge::server::Server;
//! use pad_bridge::sink::UinputSink;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let translator = InputTranslator::from_config(&config);
//! let sink = UinputSink::new(&config.input.device_name, translator.geometry())?;
//!
//! let server = Server::bind(&config.bind_addr(), translator, Box::new(sink)).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tracing::{debug, info, warn};

use crate::controller::{FrameOutcome, InputTranslator};
use crate::error::{PadBridgeError, Result};
use crate::sink::InputSink;

/// Close reason sent to a connection refused because a session is active
pub const BUSY_REASON: &str = "another controller session is active";

/// Translator and sink, shared by every connection task
pub struct Bridge {
    translator: InputTranslator,
    sink: Box<dyn InputSink>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}

impl Bridge {
    #[must_use]
    pub fn new(translator: InputTranslator, sink: Box<dyn InputSink>) -> Self {
        Self { translator, sink }
    }

    #[must_use]
    pub fn translator(&self) -> &InputTranslator {
        &self.translator
    }

    /// Reset session state and centre the pointer
    pub fn begin_session(&mut self) {
        self.translator.begin_session(self.sink.as_mut());
    }

    /// Apply one text frame
    pub fn apply_frame(&mut self, frame: &str) -> FrameOutcome {
        self.translator.apply_frame(frame, self.sink.as_mut())
    }

    /// Release held keys and reset session state
    pub fn end_session(&mut self) {
        self.translator.end_session(self.sink.as_mut());
    }
}

/// Single-session WebSocket server
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    bridge: Arc<Mutex<Bridge>>,
    active: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listening socket
    ///
    /// # Arguments
    ///
    /// * `addr` - `host:port` to listen on
    /// * `translator` - Translator that owns session state
    /// * `sink` - Host input injection backend
    ///
    /// # Errors
    ///
    /// Returns `Io` if the address cannot be bound.
    pub async fn bind(
        addr: &str,
        translator: InputTranslator,
        sink: Box<dyn InputSink>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("WebSocket server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            bridge: Arc::new(Mutex::new(Bridge::new(translator, sink))),
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the server is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared handle to the translator and sink
    #[must_use]
    pub fn bridge(&self) -> Arc<Mutex<Bridge>> {
        Arc::clone(&self.bridge)
    }

    /// Accept connections until the task is cancelled
    ///
    /// Failed accepts are logged and skipped.
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!("TCP connection from {}", peer);
                    tokio::spawn(handle_connection(
                        stream,
                        peer,
                        Arc::clone(&self.bridge),
                        Arc::clone(&self.active),
                    ));
                }
                Err(e) => warn!("Failed to accept connection: {}", e),
            }
        }
    }
}

/// Clears the active-session flag when the session ends, however it ends
struct ActiveSession(Arc<AtomicBool>);

impl ActiveSession {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    bridge: Arc<Mutex<Bridge>>,
    active: Arc<AtomicBool>,
) {
    let mut ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", peer, e);
            return;
        }
    };

    let Some(_session) = ActiveSession::acquire(&active) else {
        warn!("Refusing {}: {}", peer, BUSY_REASON);
        let frame = CloseFrame {
            code: CloseCode::Policy,
            reason: BUSY_REASON.into(),
        };
        if let Err(e) = ws.close(Some(frame)).await {
            debug!("Failed to close refused connection {}: {}", peer, e);
        }
        return;
    };

    info!("Controller connected from {}", peer);
    match run_session(ws, &bridge).await {
        Ok(()) => info!("Controller {} disconnected", peer),
        Err(e) => warn!("Controller {} session ended: {}", peer, e),
    }
}

async fn run_session(ws: WebSocketStream<TcpStream>, bridge: &Mutex<Bridge>) -> Result<()> {
    let (mut tx, mut rx) = ws.split();

    bridge.lock().await.begin_session();

    let result = loop {
        match rx.next().await {
            Some(Ok(Message::Text(text))) => {
                let outcome = bridge.lock().await.apply_frame(&text);
                if let Some(reply) = outcome.reply {
                    if let Err(e) = tx.send(Message::Text(reply.to_string())).await {
                        break Err(PadBridgeError::Transport(format!("Failed to send reply: {}", e)));
                    }
                }
            }
            Some(Ok(Message::Binary(data))) => {
                debug!("Ignoring {} byte binary frame", data.len());
            }
            Some(Ok(Message::Close(frame))) => {
                debug!("Close frame received: {:?}", frame);
                break Ok(());
            }
            // Ping/pong is answered by tungstenite
            Some(Ok(_)) => {}
            Some(Err(e)) => break Err(PadBridgeError::Transport(e.to_string())),
            None => break Ok(()),
        }
    };

    bridge.lock().await.end_session();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::geometry::Point;
    use crate::controller::keymap::AbstractKey;
    use crate::sink::mocks::RecordingSink;
    use tokio::time::{sleep, timeout, Duration};
    use tokio_tungstenite::connect_async;

    const WAIT: Duration = Duration::from_secs(5);

    async fn start_server() -> (SocketAddr, Arc<Mutex<Bridge>>) {
        let translator = InputTranslator::from_config(&Config::default());
        let server = Server::bind("127.0.0.1:0", translator, Box::new(RecordingSink::new()))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let bridge = server.bridge();
        tokio::spawn(server.run());
        (addr, bridge)
    }

    async fn next_text<S>(stream: &mut S) -> String
    where
        S: futures::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        loop {
            match timeout(WAIT, stream.next()).await.unwrap() {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                other => panic!("Expected text frame, got {:?}", other),
            }
        }
    }

    // ==================== Session Tests ====================

    #[tokio::test]
    async fn test_greeting_round_trip() {
        let (addr, _bridge) = start_server().await;
        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        client.send(Message::Text("I am here!".to_string())).await.unwrap();

        assert_eq!(next_text(&mut client).await, "I got you!");
    }

    #[tokio::test]
    async fn test_frames_reach_translator() {
        let (addr, bridge) = start_server().await;
        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        client.send(Message::Text("BTN:A=1;DPAD:U=1".to_string())).await.unwrap();
        client.send(Message::Text("I am here!".to_string())).await.unwrap();
        next_text(&mut client).await;

        let bridge = bridge.lock().await;
        assert!(bridge.translator().is_latched(AbstractKey::X));
        assert!(bridge.translator().is_latched(AbstractKey::T));
    }

    #[tokio::test]
    async fn test_disconnect_releases_keys() {
        let (addr, bridge) = start_server().await;
        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        client.send(Message::Text("TRIG:R=1".to_string())).await.unwrap();
        client.send(Message::Text("I am here!".to_string())).await.unwrap();
        next_text(&mut client).await;
        assert!(bridge.lock().await.translator().is_latched(AbstractKey::D));

        client.close(None).await.unwrap();

        let released = timeout(WAIT, async {
            while !bridge.lock().await.translator().session().latched.is_empty() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(released.is_ok(), "keys still held after disconnect");
    }

    #[tokio::test]
    async fn test_out_of_range_frames_keep_session_alive() {
        let (addr, bridge) = start_server().await;
        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        let overflow = "9".repeat(60);
        for frame in [
            "BTN:A=1".to_string(),
            "JOY-L:V=99999999999H=-99999999999".to_string(),
            "JOY-R:V=-99999999999H=99999999999".to_string(),
            format!("JOY-L:V={}", overflow),
            format!("JOY-R:H=-{}", overflow),
        ] {
            client.send(Message::Text(frame)).await.unwrap();
        }
        client.send(Message::Text("I am here!".to_string())).await.unwrap();

        assert_eq!(next_text(&mut client).await, "I got you!");
        {
            let bridge = bridge.lock().await;
            let translator = bridge.translator();
            assert!(translator.is_latched(AbstractKey::X));
            assert_eq!(translator.session().left_stick, Point::new(0, 0));
        }

        client.close(None).await.unwrap();
        let released = timeout(WAIT, async {
            while !bridge.lock().await.translator().session().latched.is_empty() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(released.is_ok(), "keys still held after disconnect");
    }

    #[tokio::test]
    async fn test_second_connection_refused() {
        let (addr, _bridge) = start_server().await;

        let (mut first, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        first.send(Message::Text("I am here!".to_string())).await.unwrap();
        next_text(&mut first).await;

        let (mut second, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        match timeout(WAIT, second.next()).await.unwrap() {
            Some(Ok(Message::Close(Some(frame)))) => {
                assert_eq!(frame.code, CloseCode::Policy);
                assert_eq!(frame.reason, BUSY_REASON);
            }
            other => panic!("Expected close frame, got {:?}", other),
        }

        // The first session is untouched
        first.send(Message::Text("I am here!".to_string())).await.unwrap();
        assert_eq!(next_text(&mut first).await, "I got you!");
    }

    #[tokio::test]
    async fn test_new_session_after_disconnect() {
        let (addr, _bridge) = start_server().await;

        let (mut first, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        first.send(Message::Text("I am here!".to_string())).await.unwrap();
        next_text(&mut first).await;
        first.close(None).await.unwrap();
        drop(first);

        let reply = timeout(WAIT, async {
            loop {
                let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
                let _ = client.send(Message::Text("I am here!".to_string())).await;
                match client.next().await {
                    Some(Ok(Message::Text(text))) => return text,
                    // Previous session still shutting down
                    _ => sleep(Duration::from_millis(10)).await,
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(reply, "I got you!");
    }

    #[tokio::test]
    async fn test_binary_frames_ignored() {
        let (addr, bridge) = start_server().await;
        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        client.send(Message::Binary(b"BTN:A=1".to_vec())).await.unwrap();
        client.send(Message::Text("I am here!".to_string())).await.unwrap();
        next_text(&mut client).await;

        assert!(!bridge.lock().await.translator().is_latched(AbstractKey::X));
    }
}
