//! Connection lifecycle management and the session event loop.
//!
//! The manager owns every piece of mutable session state (channel state,
//! fallback machine, line buffer) and mutates it from a single
//! event-processing loop, so inbound messages and keystrokes are handled
//! strictly in arrival order. Helper tasks (transport opener, channel pump,
//! timers) communicate only by sending events tagged with the connect
//! attempt that spawned them; events from superseded attempts are ignored,
//! which lets a superseding action race harmlessly with a pending timer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use lmsh_core::constants::{FALLBACK_GRACE, RECONNECT_DELAY, RESTART_SETTLE, START_COMMAND};
use lmsh_core::display::{DisplaySurface, StatusSink};
use lmsh_core::error::Error;
use lmsh_core::line::{KeyAction, LineEditor};
use lmsh_core::protocol::{Message, ProgramStatus};
use lmsh_core::session::{Effect, SessionMachine};
use lmsh_core::transport::{Channel, Transport};

use crate::metrics::ConnectionMetrics;

/// Transport channel health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A channel open is in flight.
    Connecting,
    /// The channel is up.
    Connected,
    /// No channel; a retry may be pending.
    Disconnected,
}

/// User-triggered actions forwarded from the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ClearDisplay,
    RestartSession,
}

/// Manager tunables. Defaults come from `lmsh_core::constants`.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Delay before the retry scheduled after losing the channel.
    pub reconnect_delay: Duration,
    /// How long a connect attempt may stay unanswered before the simulated
    /// session takes over.
    pub fallback_grace: Duration,
    /// Settle time between interrupt and restart of the remote program.
    pub restart_settle: Duration,
    /// Command that launches the remote session program.
    pub start_command: String,
    /// Never touch the transport; run the simulated session only.
    pub local_only: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: RECONNECT_DELAY,
            fallback_grace: FALLBACK_GRACE,
            restart_settle: RESTART_SETTLE,
            start_command: START_COMMAND.to_string(),
            local_only: false,
        }
    }
}

/// Events processed by the manager loop.
pub enum Event {
    /// Raw input bytes from the display surface.
    Input(Vec<u8>),
    /// User-triggered action.
    Action(UserAction),
    /// The transport opened a channel for the given attempt.
    Opened {
        attempt: u64,
        channel: Box<dyn Channel>,
    },
    /// The transport failed to open a channel.
    OpenFailed { attempt: u64, error: Error },
    /// Inbound message from the channel of the given attempt.
    Inbound { attempt: u64, message: Message },
    /// The channel of the given attempt is gone.
    ChannelClosed { attempt: u64 },
    /// The reconnect timer fired.
    ReconnectDue,
    /// The fallback grace timer of the given attempt fired.
    GraceExpired { attempt: u64 },
    /// The restart settle timer of the given attempt fired.
    StartProgram { attempt: u64 },
    /// Tear the session down.
    Shutdown,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Input(bytes) => f.debug_tuple("Input").field(&bytes.len()).finish(),
            Event::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Event::Opened { attempt, .. } => {
                f.debug_struct("Opened").field("attempt", attempt).finish()
            }
            Event::OpenFailed { attempt, error } => f
                .debug_struct("OpenFailed")
                .field("attempt", attempt)
                .field("error", error)
                .finish(),
            Event::Inbound { attempt, message } => f
                .debug_struct("Inbound")
                .field("attempt", attempt)
                .field("message", message)
                .finish(),
            Event::ChannelClosed { attempt } => f
                .debug_struct("ChannelClosed")
                .field("attempt", attempt)
                .finish(),
            Event::ReconnectDue => f.write_str("ReconnectDue"),
            Event::GraceExpired { attempt } => f
                .debug_struct("GraceExpired")
                .field("attempt", attempt)
                .finish(),
            Event::StartProgram { attempt } => f
                .debug_struct("StartProgram")
                .field("attempt", attempt)
                .finish(),
            Event::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Cloneable sender for feeding events into the manager loop.
#[derive(Clone)]
pub struct ManagerHandle {
    events: UnboundedSender<Event>,
}

impl ManagerHandle {
    /// Feed raw input bytes.
    pub fn input(&self, bytes: &[u8]) {
        let _ = self.events.send(Event::Input(bytes.to_vec()));
    }

    /// Fire a user action.
    pub fn action(&self, action: UserAction) {
        let _ = self.events.send(Event::Action(action));
    }

    /// End the session.
    pub fn shutdown(&self) {
        let _ = self.events.send(Event::Shutdown);
    }
}

/// Owns the channel lifecycle and drives the session.
pub struct ConnectionManager<D, S> {
    config: ManagerConfig,
    transport: Arc<dyn Transport>,
    display: D,
    status: S,
    events: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
    state: ConnectionState,
    /// Monotonic connect-attempt counter; tags every helper-task event.
    attempt: u64,
    /// Outbound sender into the channel pump while connected.
    link: Option<UnboundedSender<Message>>,
    program_running: bool,
    reconnect_pending: bool,
    fallback: Option<SessionMachine>,
    editor: LineEditor,
    metrics: ConnectionMetrics,
}

impl<D: DisplaySurface, S: StatusSink> ConnectionManager<D, S> {
    /// Create a manager wired to the given collaborators.
    pub fn new(config: ManagerConfig, transport: Arc<dyn Transport>, display: D, status: S) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        Self {
            config,
            transport,
            display,
            status,
            events,
            rx,
            state: ConnectionState::Disconnected,
            attempt: 0,
            link: None,
            program_running: false,
            reconnect_pending: false,
            fallback: None,
            editor: LineEditor::new(),
            metrics: ConnectionMetrics::new(),
        }
    }

    /// A handle for feeding events from input tasks and tests.
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            events: self.events.clone(),
        }
    }

    /// Current channel state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the simulated session is active.
    pub fn is_fallback_active(&self) -> bool {
        self.fallback.is_some()
    }

    /// Counters collected so far.
    pub fn metrics(&self) -> ConnectionMetrics {
        self.metrics
    }

    /// Run the session until shutdown. Returns the final counters.
    pub async fn run(mut self) -> ConnectionMetrics {
        if self.config.local_only {
            self.activate_fallback().await;
        } else {
            self.connect();
        }

        loop {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            if !self.handle_event(event).await {
                break;
            }
        }

        self.metrics.log_summary();
        self.metrics
    }

    /// Open a channel unless one is already up or in flight.
    pub fn connect(&mut self) {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            debug!(state = ?self.state, "connect requested while already active");
            return;
        }

        self.attempt += 1;
        self.state = ConnectionState::Connecting;
        self.metrics.connect_attempts += 1;
        debug!(attempt = self.attempt, "opening channel");

        self.spawn_open(self.attempt);
        self.schedule(
            self.config.fallback_grace,
            Event::GraceExpired {
                attempt: self.attempt,
            },
        );
    }

    async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Input(bytes) => {
                for b in bytes {
                    self.on_key(char::from(b)).await;
                }
            }
            Event::Action(UserAction::ClearDisplay) => self.display.clear(),
            Event::Action(UserAction::RestartSession) => self.restart().await,
            Event::Opened { attempt, channel } => self.on_opened(attempt, channel),
            Event::OpenFailed { attempt, error } => self.on_open_failed(attempt, error).await,
            Event::Inbound { attempt, message } => self.on_message(attempt, message),
            Event::ChannelClosed { attempt } => self.on_channel_closed(attempt),
            Event::ReconnectDue => {
                self.reconnect_pending = false;
                self.metrics.reconnects += 1;
                self.connect();
            }
            Event::GraceExpired { attempt } => {
                // Only an attempt that is still unanswered counts; a timer
                // left over from an attempt that reached Connected (or that
                // already failed into the retry path) is stale.
                if attempt == self.attempt
                    && self.state == ConnectionState::Connecting
                    && self.fallback.is_none()
                {
                    info!("no connection within the grace window, starting local session");
                    self.activate_fallback().await;
                }
            }
            Event::StartProgram { attempt } => {
                if attempt == self.attempt && self.state == ConnectionState::Connected {
                    self.send_start();
                }
            }
            Event::Shutdown => {
                info!("session shutdown requested");
                // Dropping the link lets the channel pump close gracefully.
                self.link = None;
                return false;
            }
        }
        true
    }

    fn on_opened(&mut self, attempt: u64, channel: Box<dyn Channel>) {
        if attempt != self.attempt || self.state != ConnectionState::Connecting {
            debug!(attempt, "discarding stale channel");
            return;
        }

        let link = self.spawn_channel(attempt, channel);
        self.link = Some(link);
        self.state = ConnectionState::Connected;
        self.fallback = None;
        self.editor.clear();
        self.status.connection_changed(true);
        info!(attempt, "connected to session host");

        self.display.clear();
        self.display.writeln("Connected to terminal service");
        self.display.writeln("Starting Library Management System...");
        self.display.writeln("");
        self.send_start();
    }

    async fn on_open_failed(&mut self, attempt: u64, error: Error) {
        if attempt != self.attempt || self.state != ConnectionState::Connecting {
            return;
        }
        warn!(attempt, error = %error, "connect attempt failed");
        self.state = ConnectionState::Disconnected;
        self.status.connection_changed(false);
        if self.fallback.is_none() {
            self.activate_fallback().await;
        }
        self.schedule_reconnect();
    }

    fn on_message(&mut self, attempt: u64, message: Message) {
        if attempt != self.attempt || self.state != ConnectionState::Connected {
            debug!(attempt, "discarding message from a stale channel");
            return;
        }
        self.metrics.messages_in += 1;

        match message {
            // Output is forwarded verbatim; the client never interprets it.
            Message::Output { content } => self.display.write(&content),
            Message::Status {
                status: ProgramStatus::Started,
            } => {
                debug!("remote program started");
                self.program_running = true;
            }
            Message::Status {
                status: ProgramStatus::Exited,
            } => {
                debug!("remote program exited");
                self.program_running = false;
                self.display.writeln("");
                self.display
                    .writeln("Process exited. You can restart the application.");
            }
            other @ (Message::Command { .. } | Message::Interrupt) => {
                self.metrics.dropped_violations += 1;
                warn!(message = ?other, "dropping client-bound message received from host");
            }
        }
    }

    fn on_channel_closed(&mut self, attempt: u64) {
        if attempt != self.attempt || self.state != ConnectionState::Connected {
            return;
        }
        info!(attempt, "channel closed");

        self.state = ConnectionState::Disconnected;
        self.link = None;
        self.program_running = false;
        self.status.connection_changed(false);

        self.display.writeln("");
        self.display.writeln(&format!(
            "Connection closed. Attempting to reconnect in {} seconds...",
            self.config.reconnect_delay.as_secs()
        ));
        self.schedule_reconnect();
    }

    async fn on_key(&mut self, key: char) {
        // Until a connection or the local session exists there is nowhere to
        // deliver a line, so keystrokes are not even echoed.
        if self.state != ConnectionState::Connected && self.fallback.is_none() {
            return;
        }

        match self.editor.feed(key) {
            KeyAction::Echo(c) => {
                let mut buf = [0u8; 4];
                self.display.write(c.encode_utf8(&mut buf));
            }
            KeyAction::Erase => self.display.write("\x08 \x08"),
            KeyAction::Submit(line) => {
                self.display.writeln("");
                self.submit_line(line).await;
            }
            KeyAction::Ignored => {}
        }
    }

    /// Deliver one completed line: to the host while connected, to the
    /// simulated session otherwise. Never both.
    async fn submit_line(&mut self, line: String) {
        if self.state == ConnectionState::Connected {
            debug!(len = line.len(), "sending command line");
            self.send_message(Message::Command { command: line });
        } else if let Some(machine) = self.fallback.as_mut() {
            let effects = machine.handle_line(&line);
            self.apply(effects).await;
        }
    }

    async fn restart(&mut self) {
        info!("restart requested");
        if self.state == ConnectionState::Connected {
            if self.program_running {
                self.send_message(Message::Interrupt);
                self.schedule(
                    self.config.restart_settle,
                    Event::StartProgram {
                        attempt: self.attempt,
                    },
                );
            } else {
                self.send_start();
            }
        } else if let Some(machine) = self.fallback.as_mut() {
            let effects = machine.start();
            self.editor.clear();
            self.apply(effects).await;
        } else {
            self.activate_fallback().await;
        }
    }

    async fn activate_fallback(&mut self) {
        if self.fallback.is_some() || self.state == ConnectionState::Connected {
            return;
        }
        info!("activating local simulated session");
        self.metrics.fallback_activations += 1;

        let mut machine = SessionMachine::new();
        let effects = machine.start();
        self.fallback = Some(machine);
        self.editor.clear();
        self.apply(effects).await;
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Write(text) => self.display.write(&text),
                Effect::WriteLine(text) => self.display.writeln(&text),
                Effect::Clear => self.display.clear(),
                Effect::Pause(delay) => sleep(delay).await,
            }
        }
    }

    fn send_message(&mut self, message: Message) {
        let Some(link) = &self.link else {
            debug!("send while disconnected, dropping message");
            return;
        };
        if link.send(message).is_err() {
            debug!("channel pump gone, dropping message");
        } else {
            self.metrics.messages_out += 1;
        }
    }

    fn send_start(&mut self) {
        debug!(command = self.config.start_command.as_str(), "requesting program start");
        let command = self.config.start_command.clone();
        self.send_message(Message::Command { command });
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect_pending {
            return;
        }
        self.reconnect_pending = true;
        debug!(delay = ?self.config.reconnect_delay, "scheduling reconnect");
        self.schedule(self.config.reconnect_delay, Event::ReconnectDue);
    }

    fn spawn_open(&self, attempt: u64) {
        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();
        tokio::spawn(async move {
            match transport.connect().await {
                Ok(channel) => {
                    let _ = events.send(Event::Opened { attempt, channel });
                }
                Err(error) => {
                    let _ = events.send(Event::OpenFailed { attempt, error });
                }
            }
        });
    }

    /// Spawn the pump that owns the channel: inbound frames become events,
    /// outbound messages drain from the returned sender.
    fn spawn_channel(
        &self,
        attempt: u64,
        mut channel: Box<dyn Channel>,
    ) -> UnboundedSender<Message> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let events = self.events.clone();

        tokio::spawn(async move {
            loop {
                // The write happens outside the select so the read future's
                // borrow of the channel has been released by then.
                let outbound;
                tokio::select! {
                    inbound = channel.recv() => {
                        match inbound {
                            Ok(message) => {
                                if events.send(Event::Inbound { attempt, message }).is_err() {
                                    break;
                                }
                            }
                            // One bad frame does not cost the channel.
                            Err(error @ (Error::Protocol { .. } | Error::Codec { .. })) => {
                                warn!(%error, "dropping malformed frame");
                            }
                            Err(error) => {
                                debug!(%error, "channel read ended");
                                let _ = events.send(Event::ChannelClosed { attempt });
                                break;
                            }
                        }
                        continue;
                    }
                    message = rx.recv() => {
                        outbound = message;
                    }
                }

                match outbound {
                    Some(message) => {
                        if let Err(error) = channel.send(&message).await {
                            debug!(%error, "channel write failed");
                            let _ = events.send(Event::ChannelClosed { attempt });
                            break;
                        }
                    }
                    None => {
                        channel.close().await;
                        break;
                    }
                }
            }
        });

        tx
    }

    fn schedule(&self, delay: Duration, event: Event) {
        let events = self.events.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(event);
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
