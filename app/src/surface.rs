//! A headless content surface that fetches broadcaster pages over HTTP.
//!
//! Pages are static snapshots: script never runs, so state reads reflect the
//! server-rendered markup and synthetic clicks are only recorded.
//!
//! Fetches run on their own thread; the coordinator learns the outcome from
//! a [`CoordinatorCommand::PageLoaded`] message.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, info, instrument, warn};
use url::Url;

use maestro_broadcasters::{BroadcasterRegistry, HtmlPage, PlayerWindow};
use maestro_engine::{ContentSurface, LoadProgress, SurfaceError, SurfaceResult};
use maestro_interop::{spawn_agent, AgentConfig};
use maestro_ipc::{AgentEndpoint, Bounds, CoordinatorCommand};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches pages and boots one interop agent per load.
pub struct HttpSurface {
    client: Client,
    registry: BroadcasterRegistry,
    agent_config: AgentConfig,
    commands: Sender<CoordinatorCommand>,
    user_agents: Vec<(String, String)>,
    history: Vec<String>,
    position: usize,
}

/// One page fetch, detached from the surface so it can run elsewhere.
struct PageRequest {
    client: Client,
    url: Url,
    user_agent: Option<String>,
}

impl PageRequest {
    #[instrument(name = "surface_fetch", skip(self), fields(url = %self.url))]
    fn fetch(self) -> SurfaceResult<String> {
        let load_error = |reason: String| SurfaceError::Load {
            url: self.url.to_string(),
            reason,
        };

        let mut request = self.client.get(self.url.clone());
        if let Some(user_agent) = &self.user_agent {
            debug!(%user_agent, "Overriding User-Agent");
            request = request.header(USER_AGENT, user_agent.as_str());
        }

        let response = request
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| load_error(e.to_string()))?;
        response.text().map_err(|e| load_error(e.to_string()))
    }
}

impl HttpSurface {
    pub fn new(
        registry: BroadcasterRegistry,
        agent_config: AgentConfig,
        commands: Sender<CoordinatorCommand>,
    ) -> SurfaceResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SurfaceError::Load {
                url: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            registry,
            agent_config,
            commands,
            user_agents: Vec::new(),
            history: Vec::new(),
            position: 0,
        })
    }

    /// The User-Agent override for `url`, if any rule matches.
    fn user_agent_for(&self, url: &str) -> Option<&str> {
        self.user_agents
            .iter()
            .find(|(pattern, _)| pattern_matches(pattern, url))
            .map(|(_, user_agent)| user_agent.as_str())
    }

    fn request(&self, url: &str) -> SurfaceResult<PageRequest> {
        let parsed = Url::parse(url).map_err(|e| SurfaceError::Load {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(PageRequest {
            client: self.client.clone(),
            url: parsed,
            user_agent: self.user_agent_for(url).map(str::to_string),
        })
    }

    /// Start fetching `url`; an agent boots on the page once it arrives.
    fn show(&self, url: &str, endpoint: AgentEndpoint) -> SurfaceResult<()> {
        let request = self.request(url)?;
        let registry = self.registry.clone();
        let agent_config = self.agent_config;
        let commands = self.commands.clone();

        thread::spawn(move || {
            let session = endpoint.session();
            let error = match request.fetch() {
                Ok(html) => {
                    info!(session, bytes = html.len(), "Page loaded");
                    let page = Arc::new(HtmlPage::new(html));
                    spawn_agent(registry, page, endpoint, agent_config);
                    None
                }
                Err(e) => Some(e.to_string()),
            };

            if commands
                .send(CoordinatorCommand::PageLoaded { session, error })
                .is_err()
            {
                warn!(session, "Coordinator gone before page load finished");
            }
        });
        Ok(())
    }
}

/// Matches a URL against a prefix pattern ending in `*`, or exactly.
fn pattern_matches(pattern: &str, url: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => url.starts_with(prefix),
        None => url == pattern,
    }
}

impl PlayerWindow for HttpSurface {
    fn override_user_agent(&mut self, url_pattern: &str, user_agent: &str) {
        self.user_agents.retain(|(pattern, _)| pattern != url_pattern);
        self.user_agents
            .push((url_pattern.to_string(), user_agent.to_string()));
    }
}

impl ContentSurface for HttpSurface {
    fn window(&mut self) -> &mut dyn PlayerWindow {
        self
    }

    fn load(&mut self, url: &str, endpoint: AgentEndpoint) -> SurfaceResult<LoadProgress> {
        self.show(url, endpoint)?;

        if !self.history.is_empty() {
            self.history.truncate(self.position + 1);
        }
        self.history.push(url.to_string());
        self.position = self.history.len() - 1;
        Ok(LoadProgress::InFlight)
    }

    fn go_back(&mut self, endpoint: AgentEndpoint) -> SurfaceResult<bool> {
        if self.position == 0 {
            return Ok(false);
        }
        let url = self.history[self.position - 1].clone();
        self.show(&url, endpoint)?;
        self.position -= 1;
        Ok(true)
    }

    fn go_forward(&mut self, endpoint: AgentEndpoint) -> SurfaceResult<bool> {
        let Some(url) = self.history.get(self.position + 1).cloned() else {
            return Ok(false);
        };
        self.show(&url, endpoint)?;
        self.position += 1;
        Ok(true)
    }

    fn set_mini_mode(&mut self, mini: bool) {
        info!(mini, "Player window mode");
    }

    fn set_bounds(&mut self, mini: bool, bounds: Bounds) {
        debug!(mini, ?bounds, "Player window bounds");
    }
}
