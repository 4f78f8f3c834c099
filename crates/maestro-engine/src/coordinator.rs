//! The coordinator: broadcaster selection, the switch handshake, and relays
//! between agents, input sources and the display surface.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver, Sender};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use maestro_broadcasters::{Broadcaster, BroadcasterRegistry};
use maestro_ipc::{
    agent_event_channel, agent_link, query_channel, AgentCommand, AgentEndpoint, AgentEnvelope,
    AgentEvent, AgentLink, Bounds, BroadcasterQuery, ControlCommand, CoordinatorCommand,
    CoordinatorState, DisplayEvent, IpcError, IpcResult, MenuAction, SwitchPhase,
};

use crate::bounds::BoundsDebouncer;
use crate::config::CoordinatorConfig;
use crate::error::EngineError;
use crate::store::{bounds_key, stored_bounds, SettingsStore, LAST_BROADCASTER_KEY};
use crate::surface::{ContentSurface, LoadProgress};
use crate::EngineResult;

/// How soon to retry a shutdown signal the old agent had no room for.
const SHUTDOWN_RETRY: Duration = Duration::from_millis(20);

/// A switch waiting for the old agent's shutdown acknowledgment.
struct PendingSwitch {
    target: Arc<dyn Broadcaster>,
    deadline: Instant,
    /// False while the old agent's command queue is full.
    signalled: bool,
}

/// Owns the active broadcaster and everything that must agree with it.
pub struct Coordinator {
    registry: BroadcasterRegistry,
    store: Box<dyn SettingsStore>,
    surface: Box<dyn ContentSurface>,
    config: CoordinatorConfig,
    command_rx: Receiver<CoordinatorCommand>,
    display_tx: Sender<DisplayEvent>,
    agent_event_tx: Sender<AgentEnvelope>,
    agent_event_rx: Receiver<AgentEnvelope>,
    query_tx: Sender<BroadcasterQuery>,
    query_rx: Receiver<BroadcasterQuery>,
    state: CoordinatorState,
    active: Option<Arc<dyn Broadcaster>>,
    agent: Option<AgentLink>,
    pending: Option<PendingSwitch>,
    bounds: BoundsDebouncer,
    mini_mode: bool,
    next_session: u64,
}

impl Coordinator {
    /// Create a coordinator. Nothing is loaded until [`Coordinator::open`].
    pub fn new(
        registry: BroadcasterRegistry,
        store: Box<dyn SettingsStore>,
        surface: Box<dyn ContentSurface>,
        command_rx: Receiver<CoordinatorCommand>,
        display_tx: Sender<DisplayEvent>,
        config: CoordinatorConfig,
    ) -> Self {
        let (agent_event_tx, agent_event_rx) = agent_event_channel();
        let (query_tx, query_rx) = query_channel();

        Self {
            registry,
            store,
            surface,
            config,
            command_rx,
            display_tx,
            agent_event_tx,
            agent_event_rx,
            query_tx,
            query_rx,
            state: CoordinatorState::Idle,
            active: None,
            agent: None,
            pending: None,
            bounds: BoundsDebouncer::new(config.bounds_debounce),
            mini_mode: false,
            next_session: 1,
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// Id of the active broadcaster.
    pub fn active_id(&self) -> Option<&'static str> {
        self.active.as_ref().map(|b| b.id())
    }

    pub fn is_mini_mode(&self) -> bool {
        self.mini_mode
    }

    /// Run the coordinator (blocking) until [`CoordinatorCommand::Shutdown`]
    /// or until every command sender is dropped.
    #[instrument(name = "coordinator_run", skip(self))]
    pub fn run(&mut self) {
        info!("Coordinator starting");

        if matches!(self.state, CoordinatorState::Idle) {
            if let Err(e) = self.open() {
                error!("Failed to open broadcaster: {}", e);
                self.send_display(DisplayEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        let commands = self.command_rx.clone();
        let agent_events = self.agent_event_rx.clone();
        let queries = self.query_rx.clone();

        loop {
            let timeout = self.next_wakeup(Instant::now());

            select! {
                recv(commands) -> command => match command {
                    Ok(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    Err(_) => {
                        info!("Command channel disconnected, shutting down");
                        break;
                    }
                },
                recv(agent_events) -> envelope => {
                    if let Ok(envelope) = envelope {
                        self.handle_agent_message(envelope);
                    }
                },
                recv(queries) -> query => {
                    if let Ok(query) = query {
                        self.answer_query(query);
                    }
                },
                default(timeout) => {}
            }

            self.poll_timers(Instant::now());
        }

        self.flush_bounds();
        info!("Coordinator stopped");
    }

    /// Load the persisted selection, or the first enabled broadcaster.
    #[instrument(name = "coordinator_open", skip(self))]
    pub fn open(&mut self) -> EngineResult<()> {
        let persisted = self
            .store
            .get(LAST_BROADCASTER_KEY)
            .and_then(|value| value.as_str().map(str::to_string));

        let target = persisted
            .as_deref()
            .and_then(|id| self.registry.by_id(id))
            .or_else(|| self.registry.first_enabled())
            .ok_or(EngineError::NoBroadcasters)?;

        info!(broadcaster = target.id(), "Opening broadcaster");

        let mini = stored_bounds(self.store.as_ref(), true, target.id());
        self.surface.set_bounds(true, mini);

        self.active = Some(Arc::clone(&target));
        let progress = self.load(&target)?;
        self.await_load(target.id(), progress);
        Ok(())
    }

    /// Switch the active broadcaster.
    ///
    /// Returns false without changing anything when the id is unknown or
    /// disabled, or when another switch is still in flight.
    #[instrument(name = "select_broadcaster", skip(self))]
    pub fn select_broadcaster(&mut self, id: &str) -> bool {
        if let CoordinatorState::Switching { target, .. } = &self.state {
            warn!(in_flight = %target, "Switch already in flight, rejecting selection");
            return false;
        }

        let Some(target) = self.registry.by_id(id) else {
            warn!("Unknown or disabled broadcaster, ignoring selection");
            return false;
        };

        info!("Switching broadcaster");
        self.persist(LAST_BROADCASTER_KEY, Value::String(id.to_string()));

        let signalled = match self.signal_shutdown(id) {
            Ok(signalled) => signalled,
            Err(e) => {
                warn!("Failed to signal interop shutdown: {}", e);
                false
            }
        };
        let busy = self.agent.is_some() && !signalled;

        if signalled || busy {
            if busy {
                warn!("Agent command queue full, retrying shutdown");
            }
            self.pending = Some(PendingSwitch {
                target,
                deadline: Instant::now() + self.config.handshake_timeout,
                signalled,
            });
            self.transition_to(CoordinatorState::Switching {
                target: id.to_string(),
                phase: SwitchPhase::AwaitingShutdown,
            });
        } else {
            // No live agent to hand off from.
            self.complete_switch(target);
        }

        true
    }

    /// Send `shutdown-interop` to the bound agent.
    ///
    /// Returns `Ok(false)` when the agent's queue is full and the link is
    /// kept for a retry. Any other failure, or no agent at all, unbinds it.
    fn signal_shutdown(&mut self, next: &str) -> IpcResult<bool> {
        let Some(link) = &self.agent else {
            return Ok(false);
        };

        match link.send(AgentCommand::ShutdownInterop(next.to_string())) {
            Ok(()) => Ok(true),
            Err(IpcError::Full) => Ok(false),
            Err(e) => {
                self.agent = None;
                Err(e)
            }
        }
    }

    /// Retry delivering the shutdown signal of the pending switch.
    fn retry_shutdown(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        if pending.signalled {
            return;
        }
        let next = pending.target.id();

        match self.signal_shutdown(next) {
            Ok(true) => {
                debug!("Shutdown signal delivered");
                if let Some(pending) = &mut self.pending {
                    pending.signalled = true;
                }
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Old agent went away before shutdown: {}", e);
                if let Some(pending) = self.pending.take() {
                    self.complete_switch(pending.target);
                }
            }
        }
    }

    /// Configure and load the switch target, then notify the display.
    fn complete_switch(&mut self, target: Arc<dyn Broadcaster>) {
        let id = target.id();
        self.transition_to(CoordinatorState::Switching {
            target: id.to_string(),
            phase: SwitchPhase::Loading,
        });

        self.active = Some(Arc::clone(&target));
        match self.load(&target) {
            Ok(progress) => self.await_load(id, progress),
            Err(e) => self.load_failed(id, e.to_string()),
        }
    }

    /// Finish a load now, or wait for the surface to report it.
    fn await_load(&mut self, id: &'static str, progress: LoadProgress) {
        match progress {
            LoadProgress::Complete => self.loaded(id),
            LoadProgress::InFlight => {
                debug!(broadcaster = id, "Waiting for page load");
                if !self.state.is_switching() {
                    self.transition_to(CoordinatorState::Switching {
                        target: id.to_string(),
                        phase: SwitchPhase::Loading,
                    });
                }
            }
        }
    }

    fn loaded(&mut self, id: &'static str) {
        debug!(broadcaster = id, "Broadcaster URL loaded");
        self.transition_to(CoordinatorState::Active {
            broadcaster: id.to_string(),
        });
        self.send_display(DisplayEvent::SetBroadcaster(id.to_string()));
    }

    fn load_failed(&mut self, id: &'static str, message: String) {
        error!(broadcaster = id, "Failed to load broadcaster: {}", message);
        self.transition_to(CoordinatorState::Active {
            broadcaster: id.to_string(),
        });
        self.send_display(DisplayEvent::Error { message });
    }

    /// The surface finished a load it reported as in flight.
    fn page_loaded(&mut self, session: u64, error: Option<String>) {
        let bound = self.agent.as_ref().map(AgentLink::session);
        let loading = matches!(
            self.state,
            CoordinatorState::Switching {
                phase: SwitchPhase::Loading,
                ..
            }
        );

        let Some(id) = self.active_id().filter(|_| loading && bound == Some(session)) else {
            // History navigation, or a load superseded since.
            match error {
                Some(e) => warn!(session, "Page load failed: {}", e),
                None => debug!(session, "Page loaded"),
            }
            return;
        };

        match error {
            None => self.loaded(id),
            Some(message) => {
                self.agent = None;
                self.load_failed(id, message);
            }
        }
    }

    /// Run the `configure` hook and load the page with a fresh agent link.
    fn load(&mut self, target: &Arc<dyn Broadcaster>) -> EngineResult<LoadProgress> {
        let bounds = stored_bounds(self.store.as_ref(), false, target.id());
        self.surface.set_bounds(false, bounds);
        target.configure(self.surface.window());

        let url = target.descriptor().url;
        debug!(broadcaster = target.id(), %url, "Loading broadcaster URL");

        let (link, endpoint) = self.new_link();
        let progress = self.surface.load(url, endpoint)?;
        self.agent = Some(link);
        Ok(progress)
    }

    fn new_link(&mut self) -> (AgentLink, AgentEndpoint) {
        let session = self.next_session;
        self.next_session += 1;
        agent_link(session, self.agent_event_tx.clone(), self.query_tx.clone())
    }

    /// Handle a message from an agent. Messages from any session other than
    /// the bound agent's are dropped.
    fn handle_agent_message(&mut self, envelope: AgentEnvelope) {
        let bound = self.agent.as_ref().map(AgentLink::session);
        if bound != Some(envelope.session) {
            debug!(
                session = envelope.session,
                bound = ?bound,
                "Dropping message from stale session"
            );
            return;
        }

        match envelope.event {
            AgentEvent::PlayerStatusUpdate(state) => {
                self.send_display(DisplayEvent::PlayerStatusUpdate(state));
            }
            AgentEvent::InteropShutdownComplete => {
                self.agent = None;
                match self.pending.take() {
                    Some(pending) => {
                        debug!(
                            broadcaster = pending.target.id(),
                            "Shutdown complete, loading broadcaster"
                        );
                        self.complete_switch(pending.target);
                    }
                    None => warn!("Unsolicited shutdown acknowledgment"),
                }
            }
        }
    }

    fn answer_query(&self, query: BroadcasterQuery) {
        let id = self.active_id().map(str::to_string);
        debug!(?id, "Received get-current-broadcaster request");
        if query.reply.send(id).is_err() {
            debug!("Query requester went away");
        }
    }

    /// Handle a command. Returns false if the coordinator should stop.
    fn handle_command(&mut self, command: CoordinatorCommand) -> bool {
        debug!(?command, "Handling command");

        match command {
            CoordinatorCommand::SelectBroadcaster(id) => {
                self.select_broadcaster(&id);
            }
            CoordinatorCommand::Control(control) => self.control(control),
            CoordinatorCommand::Menu(action) => self.handle_menu(action),
            CoordinatorCommand::WindowBoundsChanged { mini, bounds } => {
                self.window_bounds_changed(mini, bounds, Instant::now());
            }
            CoordinatorCommand::CapabilityUnavailable { message } => {
                error!("{}", message);
                self.send_display(DisplayEvent::Error { message });
            }
            CoordinatorCommand::PageLoaded { session, error } => self.page_loaded(session, error),
            CoordinatorCommand::Shutdown => return false,
        }

        true
    }

    fn handle_menu(&mut self, action: MenuAction) {
        if let Some(control) = action.control() {
            self.control(control);
            return;
        }

        match action {
            MenuAction::ToggleMiniPlayer => self.toggle_mini_mode(),
            MenuAction::PreviousPage => self.navigate(false),
            MenuAction::NextPage => self.navigate(true),
            MenuAction::About => info!("maestro {}", env!("CARGO_PKG_VERSION")),
            MenuAction::Preferences => info!("Preferences menu selected"),
            MenuAction::SelectBroadcaster(id) => {
                self.select_broadcaster(&id);
            }
            MenuAction::PlayPause | MenuAction::PreviousTrack | MenuAction::NextTrack => {}
        }
    }

    /// Forward a control to the bound agent.
    fn control(&self, control: ControlCommand) {
        if self.state.is_switching() {
            debug!(?control, "Switch in flight, dropping control");
            return;
        }
        let Some(link) = &self.agent else {
            debug!(?control, "No agent bound, dropping control");
            return;
        };
        if let Err(e) = link.send(AgentCommand::MediaControl(control)) {
            warn!(?control, "Failed to forward control: {}", e);
        }
    }

    fn toggle_mini_mode(&mut self) {
        self.mini_mode = !self.mini_mode;
        info!(mini = self.mini_mode, "Toggling mini player");
        self.surface.set_mini_mode(self.mini_mode);
        self.send_display(DisplayEvent::MiniModeChanged(self.mini_mode));
    }

    /// History navigation reloads the page, so it binds a new agent.
    fn navigate(&mut self, forward: bool) {
        if self.state.is_switching() {
            debug!("Switch in flight, ignoring navigation");
            return;
        }

        let (link, endpoint) = self.new_link();
        let result = if forward {
            self.surface.go_forward(endpoint)
        } else {
            self.surface.go_back(endpoint)
        };

        match result {
            Ok(true) => {
                debug!(forward, session = link.session(), "Navigated");
                self.agent = Some(link);
            }
            Ok(false) => debug!(forward, "No history in that direction"),
            Err(e) => warn!(forward, "Navigation failed: {}", e),
        }
    }

    fn window_bounds_changed(&mut self, mini: bool, bounds: Bounds, now: Instant) {
        let Some(id) = self.active_id() else {
            debug!("No broadcaster active, ignoring bounds change");
            return;
        };
        self.bounds.record(bounds_key(mini, id), bounds, now);
    }

    /// Fire the handshake timeout and flush settled bounds.
    fn poll_timers(&mut self, now: Instant) {
        self.retry_shutdown();

        if self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline)
        {
            if let Some(pending) = self.pending.take() {
                warn!(
                    broadcaster = pending.target.id(),
                    "Shutdown acknowledgment timed out, loading anyway"
                );
                self.agent = None;
                self.complete_switch(pending.target);
            }
        }

        for (key, bounds) in self.bounds.due(now) {
            self.store_bounds(&key, bounds);
        }
    }

    fn flush_bounds(&mut self) {
        for (key, bounds) in self.bounds.drain() {
            self.store_bounds(&key, bounds);
        }
    }

    fn store_bounds(&mut self, key: &str, bounds: Bounds) {
        debug!(%key, ?bounds, "Storing bounds");
        match serde_json::to_value(bounds) {
            Ok(value) => self.persist(key, value),
            Err(e) => warn!(%key, "Failed to encode bounds: {}", e),
        }
    }

    fn next_wakeup(&self, now: Instant) -> Duration {
        let retry = self
            .pending
            .as_ref()
            .filter(|pending| !pending.signalled)
            .map(|_| now + SHUTDOWN_RETRY);

        [
            self.pending.as_ref().map(|pending| pending.deadline),
            retry,
            self.bounds.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .map(|deadline| deadline.saturating_duration_since(now))
        .fold(self.config.idle_wakeup, Duration::min)
    }

    fn persist(&mut self, key: &str, value: Value) {
        if let Err(e) = self.store.set(key, value) {
            warn!(%key, "Failed to persist setting: {}", e);
        }
    }

    fn transition_to(&mut self, new_state: CoordinatorState) {
        let previous = std::mem::replace(&mut self.state, new_state);

        debug!(
            previous = %previous.name(),
            current = %self.state.name(),
            "State transition"
        );
    }

    fn send_display(&self, event: DisplayEvent) {
        if let Err(e) = self.display_tx.try_send(event) {
            warn!("Failed to send display event: {}", e);
        }
    }
}
