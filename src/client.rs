use crate::config::ClientConfig;
use crate::error::Error;
use crate::handler::{Callbacks, EventHandler};
use crate::packet::Packet;
use crate::payload::Payload;
use crate::session;
use crate::socket_packet::{SocketPacket, DEFAULT_NAMESPACE};
use async_std::task::{self, JoinHandle};
use futures::channel::mpsc;
use futures::lock::Mutex;
use serde_json::Value;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

pub(crate) type SharedHandler = Arc<Mutex<Box<dyn EventHandler>>>;

/// Work queued for the write half of a session.
#[derive(Debug)]
pub(crate) enum Outgoing {
    /// Protocol packets, sent as soon as they are queued
    Control(Packet),
    /// User events, held back until the namespace is joined
    Event(Packet),
    /// The namespace is joined, flush held events
    Ready,
    /// Close the websocket after everything queued before
    Shutdown,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    active: AtomicBool,
    connected: AtomicBool,
    closing: AtomicBool,
}

impl SessionState {
    /// Claims the state for a new session. Fails while one is running.
    fn begin(&self) -> bool {
        let claimed = self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if claimed {
            self.closing.store(false, Ordering::SeqCst);
        }
        claimed
    }

    pub(crate) fn set_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Returns whether the session had joined the namespace.
    pub(crate) fn take_connected(&self) -> bool {
        self.connected.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    pub(crate) fn finish(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Handle for emitting on the current session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Sender {
    channel: mpsc::UnboundedSender<Outgoing>,
    state: Arc<SessionState>,
}

impl Sender {
    pub(crate) fn channel(state: Arc<SessionState>) -> (Sender, mpsc::UnboundedReceiver<Outgoing>) {
        let (channel, receiver) = mpsc::unbounded();
        (Sender { channel, state }, receiver)
    }

    /// A sender with no session behind it; every emit fails with `Closed`.
    #[cfg(test)]
    pub(crate) fn detached() -> Sender {
        Self::channel(Arc::new(SessionState::default())).0
    }

    /// Emits `event` with a single argument. Emits made before the
    /// namespace is joined are sent right after it is.
    pub fn emit(&self, event: &str, data: impl Into<Value>) -> Result<(), Error> {
        let packet = SocketPacket::event(DEFAULT_NAMESPACE, event, data.into());
        info!("Emitting {:?}", packet);
        self.push(Outgoing::Event(packet.into()))
    }

    /// Leaves the namespace and closes the websocket.
    pub fn disconnect(&self) -> Result<(), Error> {
        self.state.closing.store(true, Ordering::SeqCst);
        self.control(SocketPacket::disconnect(DEFAULT_NAMESPACE).into())?;
        self.push(Outgoing::Shutdown)
    }

    pub(crate) fn control(&self, packet: Packet) -> Result<(), Error> {
        self.push(Outgoing::Control(packet))
    }

    pub(crate) fn ready(&self) -> Result<(), Error> {
        self.push(Outgoing::Ready)
    }

    /// Stops the write half once it has drained what is queued.
    pub(crate) fn close(&self) {
        self.channel.close_channel();
    }

    fn push(&self, outgoing: Outgoing) -> Result<(), Error> {
        self.channel
            .unbounded_send(outgoing)
            .map_err(|_| Error::Closed)
    }
}

/// A socket.io client talking to the default namespace over a websocket.
pub struct Client {
    config: Arc<ClientConfig>,
    handler: SharedHandler,
    state: Arc<SessionState>,
    sender: Sender,
    session: Option<JoinHandle<Result<(), Error>>>,
}

impl Client {
    /// Creates an idle client. Nothing happens until [`Client::connect`].
    pub fn new(config: ClientConfig, handler: impl EventHandler + 'static) -> Self {
        let state = Arc::new(SessionState::default());
        let (sender, _) = Sender::channel(Arc::clone(&state));
        Client {
            config: Arc::new(config),
            handler: Arc::new(Mutex::new(Box::new(handler))),
            state,
            sender,
            session: None,
        }
    }

    /// Starts a session in the background and returns right away; the
    /// outcome is reported to the handler. Returns `false`, doing
    /// nothing, while a session is already running.
    pub fn connect(&mut self) -> bool {
        if !self.state.begin() {
            debug!("Session already running, connect ignored");
            return false;
        }

        let (sender, receiver) = Sender::channel(Arc::clone(&self.state));
        self.sender = sender.clone();
        self.session = Some(task::spawn(session::run(
            Arc::clone(&self.config),
            Arc::clone(&self.handler),
            Arc::clone(&self.state),
            sender,
            receiver,
        )));
        true
    }

    pub fn sender(&self) -> Sender {
        self.sender.clone()
    }

    pub fn emit(&self, event: &str, data: impl Into<Value>) -> Result<(), Error> {
        self.sender.emit(event, data)
    }

    pub fn disconnect(&self) -> Result<(), Error> {
        self.sender.disconnect()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Waits for the current session to end. The client can connect
    /// again afterwards.
    pub async fn wait(&mut self) -> Result<(), Error> {
        match self.session.take() {
            Some(session) => session.await,
            None => Ok(()),
        }
    }

    /// Waits for the current session to end.
    pub async fn join(mut self) -> Result<(), Error> {
        self.wait().await
    }
}

pub struct ClientBuilder {
    url: String,
    path: Option<String>,
    auth: Option<Value>,
    pub(crate) callbacks: Callbacks,
}

impl ClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        ClientBuilder {
            url: url.into(),
            path: None,
            auth: None,
            callbacks: Callbacks::default(),
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn auth(mut self, auth: Value) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Registers `callback` for `event`. `connect`, `disconnect` and
    /// `error` are raised by the client; any other name matches events
    /// emitted by the server.
    pub fn on<F>(mut self, event: &str, callback: F) -> Self
    where
        F: FnMut(&Payload, &Sender) + Send + 'static,
    {
        self.callbacks.on(event, callback);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let mut config = ClientConfig::new(&self.url)?;
        if let Some(path) = &self.path {
            config = config.path(path);
        }
        if let Some(auth) = self.auth {
            config = config.auth(auth);
        }
        Ok(Client::new(config, self.callbacks))
    }

    pub fn connect(self) -> Result<Client, Error> {
        let mut client = self.build()?;
        client.connect();
        Ok(client)
    }
}
