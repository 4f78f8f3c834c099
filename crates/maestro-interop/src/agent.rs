//! The interop agent state machine.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{select, Receiver};
use tracing::{debug, info, info_span, instrument, warn};

use maestro_broadcasters::{Broadcaster, BroadcasterRegistry, ContentPage};
use maestro_ipc::{AgentCommand, AgentEndpoint, AgentEvent, AgentState, ControlCommand, PlayerState};

use crate::config::AgentConfig;

/// Drives one broadcaster adapter for the lifetime of one page load.
pub struct InteropAgent {
    registry: BroadcasterRegistry,
    page: Arc<dyn ContentPage>,
    endpoint: AgentEndpoint,
    config: AgentConfig,
    state: AgentState,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    last_state: Option<PlayerState>,
    ticker: Option<Receiver<Instant>>,
}

impl InteropAgent {
    /// Create an agent in the `Init` state.
    pub fn new(
        registry: BroadcasterRegistry,
        page: Arc<dyn ContentPage>,
        endpoint: AgentEndpoint,
        config: AgentConfig,
    ) -> Self {
        Self {
            registry,
            page,
            endpoint,
            config,
            state: AgentState::Init,
            broadcaster: None,
            last_state: None,
            ticker: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Id of the bound broadcaster, if boot resolved one.
    pub fn broadcaster_id(&self) -> Option<&'static str> {
        self.broadcaster.as_ref().map(|b| b.id())
    }

    /// Run the agent on a new thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    /// Run the agent (blocking) until it terminates or the coordinator drops
    /// the link.
    pub fn run(mut self) {
        self.boot();

        let span = info_span!(
            "interop",
            broadcaster = self.broadcaster_id().unwrap_or("none"),
            session = self.endpoint.session()
        );
        let _enter = span.enter();
        info!("Interop agent running");

        let commands = self.endpoint.commands().clone();

        while !self.state.is_shut_down() {
            let ticker = self
                .ticker
                .clone()
                .unwrap_or_else(crossbeam_channel::never);

            select! {
                recv(commands) -> command => match command {
                    Ok(command) => self.handle_command(command),
                    Err(_) => {
                        info!("Command channel disconnected, stopping");
                        self.transition_to(AgentState::ShuttingDown);
                        self.pause_if_playing();
                        self.cancel_ticker();
                        self.transition_to(AgentState::Terminated);
                    }
                },
                recv(ticker) -> _ => self.tick(),
            }
        }

        info!("Interop agent stopped");
    }

    /// Ask the coordinator which broadcaster is selected, bind it, and start
    /// the poll timer.
    ///
    /// An unanswered query or an unknown id leaves the agent unbound; it
    /// still polls (as no-ops) and still answers the shutdown handshake.
    #[instrument(name = "interop_boot", skip(self), fields(session = self.endpoint.session()))]
    fn boot(&mut self) {
        match self.endpoint.current_broadcaster(self.config.query_timeout) {
            Ok(Some(id)) => {
                self.broadcaster = self.registry.by_id(&id);
                if self.broadcaster.is_none() {
                    warn!(%id, "Selected broadcaster is unknown or disabled");
                }
            }
            Ok(None) => debug!("No broadcaster selected"),
            Err(e) => warn!("Failed to query current broadcaster: {}", e),
        }

        debug!(broadcaster = ?self.broadcaster_id(), "Interop bound");

        self.ticker = Some(crossbeam_channel::tick(self.config.poll_interval));
        self.transition_to(AgentState::Polling);
    }

    /// Read one snapshot and push it to the coordinator.
    ///
    /// A fault while reading or deriving is contained to this tick.
    fn tick(&mut self) {
        if !self.state.is_polling() {
            return;
        }
        let Some(broadcaster) = self.broadcaster.clone() else {
            return;
        };

        let document = match self.page.document() {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to read player state: {}", e);
                return;
            }
        };

        let derived = panic::catch_unwind(AssertUnwindSafe(|| broadcaster.current_state(&document)));
        match derived {
            Ok(state) => {
                let state = state.restricted_to(&broadcaster.descriptor().capabilities);
                self.last_state = Some(state.clone());
                self.send_event(AgentEvent::PlayerStatusUpdate(state));
            }
            Err(fault) => warn!("Fault while deriving player state: {}", fault_message(&*fault)),
        }
    }

    fn handle_command(&mut self, command: AgentCommand) {
        debug!(?command, "Handling command");

        match command {
            AgentCommand::MediaControl(control) => self.media_control(control),
            AgentCommand::ShutdownInterop(next) => self.shutdown(&next),
        }
    }

    fn media_control(&self, control: ControlCommand) {
        if self.state.is_shut_down() {
            debug!(?control, "Agent shut down, dropping control");
            return;
        }
        match &self.broadcaster {
            Some(broadcaster) => broadcaster.apply(control, self.page.as_ref()),
            None => debug!(?control, "No broadcaster bound, dropping control"),
        }
    }

    /// Pause if playing, stop polling and acknowledge.
    ///
    /// Idempotent: only the first call pauses and acknowledges.
    #[instrument(name = "interop_shutdown", skip(self))]
    fn shutdown(&mut self, next: &str) {
        if self.state.is_shut_down() {
            debug!("Already shut down, ignoring shutdown");
            return;
        }

        info!("Shutting down interop");
        self.transition_to(AgentState::ShuttingDown);

        self.pause_if_playing();
        self.cancel_ticker();
        self.transition_to(AgentState::Terminated);

        if let Err(e) = self.endpoint.send(AgentEvent::InteropShutdownComplete) {
            warn!("Failed to acknowledge shutdown: {}", e);
        }
    }

    /// Toggle playback off if the last snapshot said it was playing.
    fn pause_if_playing(&self) {
        let playing = self
            .last_state
            .as_ref()
            .is_some_and(PlayerState::is_playing);
        if !playing {
            return;
        }
        if let Some(broadcaster) = &self.broadcaster {
            debug!("Pausing before teardown");
            broadcaster.play_pause(self.page.as_ref());
        }
    }

    fn cancel_ticker(&mut self) {
        if self.ticker.take().is_some() {
            debug!("Poll timer cancelled");
        }
    }

    fn transition_to(&mut self, new_state: AgentState) {
        let previous = std::mem::replace(&mut self.state, new_state);

        debug!(
            previous = %previous.name(),
            current = %new_state.name(),
            "State transition"
        );
    }

    fn send_event(&self, event: AgentEvent) {
        if let Err(e) = self.endpoint.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

fn fault_message(fault: &(dyn Any + Send)) -> &str {
    if let Some(message) = fault.downcast_ref::<&str>() {
        message
    } else if let Some(message) = fault.downcast_ref::<String>() {
        message
    } else {
        "unknown fault"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crossbeam_channel::Receiver;
    use maestro_broadcasters::{BroadcasterDescriptor, Document, DomError, DomResult, HtmlPage};
    use maestro_ipc::{
        agent_event_channel, agent_link, query_channel, AgentEnvelope, AgentLink, Capabilities,
        PlaybackStatus,
    };

    use super::*;

    const TUNEIN_PLAYING: &str = r#"
        <div id="playerTitle">Radio Paradise</div>
        <div id="playerSubtitle">Eclectic</div>
        <button id="playButton"><svg data-testid="player-status-playing"></svg></button>
    "#;

    const TUNEIN_PAUSED: &str = r#"
        <div id="playerTitle">Radio Paradise</div>
        <button id="playButton"><svg data-testid="player-status-paused"></svg></button>
    "#;

    const PLAY_BUTTON: &str = "svg[data-testid^=player-status]";

    /// Fails the first `failures` reads, then serves the wrapped page.
    struct FlakyPage {
        inner: HtmlPage,
        failures: AtomicUsize,
    }

    impl ContentPage for FlakyPage {
        fn document(&self) -> DomResult<Document> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(DomError::Unavailable("navigating".into()));
            }
            self.inner.document()
        }

        fn dispatch_click(&self, selector: &str) -> bool {
            self.inner.dispatch_click(selector)
        }
    }

    /// Panics on the first `faults` derivations, then reports a title.
    struct FaultingBroadcaster {
        descriptor: BroadcasterDescriptor,
        faults: AtomicUsize,
    }

    impl FaultingBroadcaster {
        fn new(faults: usize) -> Self {
            Self {
                descriptor: BroadcasterDescriptor {
                    id: "faulting",
                    name: "Faulting",
                    url: "https://faulting.test/",
                    disabled: false,
                    capabilities: Capabilities {
                        title: true,
                        ..Capabilities::NONE
                    },
                },
                faults: AtomicUsize::new(faults),
            }
        }
    }

    impl Broadcaster for FaultingBroadcaster {
        fn descriptor(&self) -> &BroadcasterDescriptor {
            &self.descriptor
        }

        fn current_state(&self, _document: &Document) -> PlayerState {
            if self.faults.load(Ordering::SeqCst) > 0 {
                self.faults.fetch_sub(1, Ordering::SeqCst);
                panic!("player markup changed");
            }
            PlayerState {
                title: Some("Recovered".into()),
                ..Default::default()
            }
        }
    }

    struct Harness {
        agent: InteropAgent,
        _link: AgentLink,
        events: Receiver<AgentEnvelope>,
    }

    /// Build an agent and boot it against a responder that names `selected`.
    fn booted(selected: Option<&str>, page: Arc<dyn ContentPage>) -> Harness {
        let (event_tx, events) = agent_event_channel();
        let (query_tx, query_rx) = query_channel();
        let (link, endpoint) = agent_link(1, event_tx, query_tx);

        let selected = selected.map(str::to_string);
        let responder = thread::spawn(move || {
            let query = query_rx.recv().unwrap();
            query.reply.send(selected).unwrap();
        });

        let mut agent = InteropAgent::new(
            BroadcasterRegistry::standard(),
            page,
            endpoint,
            AgentConfig::default(),
        );
        agent.boot();
        responder.join().unwrap();

        Harness {
            agent,
            _link: link,
            events,
        }
    }

    fn next_status(events: &Receiver<AgentEnvelope>) -> Option<PlayerState> {
        match events.try_recv().ok()?.event {
            AgentEvent::PlayerStatusUpdate(state) => Some(state),
            _ => None,
        }
    }

    #[test]
    fn test_boot_binds_selected_broadcaster() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let h = booted(Some("tunein-radio"), page);

        assert_eq!(h.agent.state(), AgentState::Polling);
        assert_eq!(h.agent.broadcaster_id(), Some("tunein-radio"));
    }

    #[test]
    fn test_tick_pushes_restricted_state() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let mut h = booted(Some("tunein-radio"), page);

        h.agent.tick();

        let state = next_status(&h.events).unwrap();
        assert_eq!(state.playback, Some(PlaybackStatus::Playing));
        assert_eq!(state.title.as_deref(), Some("Radio Paradise"));
        // TuneIn does not declare artist.
        assert_eq!(state.artist, None);
    }

    #[test]
    fn test_failed_tick_does_not_stop_polling() {
        let page = Arc::new(FlakyPage {
            inner: HtmlPage::new(TUNEIN_PLAYING),
            failures: AtomicUsize::new(1),
        });
        let mut h = booted(Some("tunein-radio"), page);

        h.agent.tick();
        assert!(h.events.try_recv().is_err());
        assert!(h.agent.state().is_polling());

        h.agent.tick();
        let state = next_status(&h.events).unwrap();
        assert!(state.is_playing());
    }

    #[test]
    fn test_derivation_fault_does_not_stop_polling() {
        let (event_tx, events) = agent_event_channel();
        let (query_tx, query_rx) = query_channel();
        let (link, endpoint) = agent_link(4, event_tx, query_tx);
        let registry = BroadcasterRegistry::new(vec![Arc::new(FaultingBroadcaster::new(1))]);
        let config = AgentConfig {
            poll_interval: Duration::from_millis(20),
            ..AgentConfig::default()
        };

        let handle =
            InteropAgent::new(registry, Arc::new(HtmlPage::new("")), endpoint, config).spawn();
        let query = query_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        query.reply.send(Some("faulting".into())).unwrap();

        let next = events.recv_timeout(Duration::from_secs(2)).unwrap();
        match next.event {
            AgentEvent::PlayerStatusUpdate(state) => {
                assert_eq!(state.title.as_deref(), Some("Recovered"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!handle.is_finished());

        link.send(AgentCommand::ShutdownInterop("siriusxm".into()))
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_unknown_broadcaster_is_inert() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let mut h = booted(Some("spotify"), page.clone());

        assert_eq!(h.agent.broadcaster_id(), None);
        h.agent.tick();
        h.agent
            .handle_command(AgentCommand::MediaControl(ControlCommand::PlayPause));

        assert!(h.events.try_recv().is_err());
        assert!(page.clicks().is_empty());
    }

    #[test]
    fn test_media_control_clicks_page() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PAUSED));
        let mut h = booted(Some("tunein-radio"), page.clone());

        h.agent
            .handle_command(AgentCommand::MediaControl(ControlCommand::PlayPause));

        assert_eq!(page.clicks(), vec![PLAY_BUTTON.to_string()]);
    }

    #[test]
    fn test_shutdown_pauses_only_when_playing() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let mut h = booted(Some("tunein-radio"), page.clone());
        h.agent.tick();
        let _ = h.events.try_recv();

        h.agent
            .handle_command(AgentCommand::ShutdownInterop("siriusxm".into()));
        assert_eq!(page.clicks(), vec![PLAY_BUTTON.to_string()]);
        assert_eq!(
            h.events.try_recv().unwrap().event,
            AgentEvent::InteropShutdownComplete
        );

        let page = Arc::new(HtmlPage::new(TUNEIN_PAUSED));
        let mut h = booted(Some("tunein-radio"), page.clone());
        h.agent.tick();
        let _ = h.events.try_recv();

        h.agent
            .handle_command(AgentCommand::ShutdownInterop("siriusxm".into()));
        assert!(page.clicks().is_empty());
        assert_eq!(
            h.events.try_recv().unwrap().event,
            AgentEvent::InteropShutdownComplete
        );
    }

    #[test]
    fn test_shutdown_without_sample_does_not_pause() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let mut h = booted(Some("tunein-radio"), page.clone());

        h.agent.shutdown("siriusxm");

        assert!(page.clicks().is_empty());
        assert_eq!(h.agent.state(), AgentState::Terminated);
    }

    #[test]
    fn test_double_shutdown_acknowledges_once() {
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let mut h = booted(Some("tunein-radio"), page.clone());
        h.agent.tick();
        let _ = h.events.try_recv();

        h.agent.shutdown("siriusxm");
        h.agent.shutdown("siriusxm");

        assert_eq!(page.clicks().len(), 1);
        assert!(h.agent.ticker.is_none());
        assert_eq!(
            h.events.try_recv().unwrap().event,
            AgentEvent::InteropShutdownComplete
        );
        assert!(h.events.try_recv().is_err());

        // Terminated agents neither poll nor obey controls.
        h.agent.tick();
        h.agent
            .handle_command(AgentCommand::MediaControl(ControlCommand::PlayPause));
        assert!(h.events.try_recv().is_err());
        assert_eq!(page.clicks().len(), 1);
    }

    #[test]
    fn test_unbound_agent_still_acknowledges() {
        let page = Arc::new(HtmlPage::new(""));
        let mut h = booted(None, page);

        h.agent.shutdown("siriusxm");

        assert_eq!(
            h.events.try_recv().unwrap().event,
            AgentEvent::InteropShutdownComplete
        );
    }

    #[test]
    fn test_run_polls_until_shutdown() {
        let (event_tx, events) = agent_event_channel();
        let (query_tx, query_rx) = query_channel();
        let (link, endpoint) = agent_link(9, event_tx, query_tx);
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));

        let config = AgentConfig {
            poll_interval: Duration::from_millis(10),
            ..AgentConfig::default()
        };
        let handle =
            InteropAgent::new(BroadcasterRegistry::standard(), page.clone(), endpoint, config)
                .spawn();

        let query = query_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        query.reply.send(Some("tunein-radio".into())).unwrap();

        let first = events.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first.session, 9);
        assert!(matches!(first.event, AgentEvent::PlayerStatusUpdate(_)));

        link.send(AgentCommand::ShutdownInterop("siriusxm".into()))
            .unwrap();

        let ack = events
            .iter()
            .find(|envelope| envelope.event == AgentEvent::InteropShutdownComplete);
        assert!(ack.is_some());
        handle.join().unwrap();
        assert_eq!(page.clicks(), vec![PLAY_BUTTON.to_string()]);
    }

    #[test]
    fn test_run_stops_when_link_dropped() {
        let (event_tx, _events) = agent_event_channel();
        let (query_tx, query_rx) = query_channel();
        let (link, endpoint) = agent_link(2, event_tx, query_tx);
        let page = Arc::new(HtmlPage::new(""));

        let handle = InteropAgent::new(
            BroadcasterRegistry::standard(),
            page,
            endpoint,
            AgentConfig::default(),
        )
        .spawn();

        let query = query_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        query.reply.send(None).unwrap();
        drop(link);

        handle.join().unwrap();
    }

    #[test]
    fn test_dropped_link_pauses_playing_page() {
        let (event_tx, events) = agent_event_channel();
        let (query_tx, query_rx) = query_channel();
        let (link, endpoint) = agent_link(5, event_tx, query_tx);
        let page = Arc::new(HtmlPage::new(TUNEIN_PLAYING));
        let config = AgentConfig {
            poll_interval: Duration::from_millis(10),
            ..AgentConfig::default()
        };

        let handle =
            InteropAgent::new(BroadcasterRegistry::standard(), page.clone(), endpoint, config)
                .spawn();
        let query = query_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        query.reply.send(Some("tunein-radio".into())).unwrap();
        events.recv_timeout(Duration::from_secs(1)).unwrap();

        drop(link);
        handle.join().unwrap();

        assert_eq!(page.clicks(), vec![PLAY_BUTTON.to_string()]);
    }
}
