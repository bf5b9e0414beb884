use super::fetch::{FetchOutcome, SourceFetcher};
use super::{now_ms, EngineError};
use crate::api::LogApi;
use crate::config::types::{InputConfig, SourceErrorPolicy};
use crate::event::EventBuilder;
use crate::metadata::TagCache;
use crate::position::{resolve_start_positions, PositionStore, StartPosition};
use crate::sink::EventSink;
use crate::source::{discover_sources, PriorityScheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub log_groups: Vec<String>,
    pub log_group_prefix: bool,
    pub start_position: StartPosition,
    pub interval: Duration,
    pub on_source_error: SourceErrorPolicy,
}

impl EngineSettings {
    pub fn from_config(input: &InputConfig) -> Self {
        Self {
            log_groups: input.log_group.clone(),
            log_group_prefix: input.log_group_prefix,
            start_position: input.start_position,
            interval: Duration::from_secs(input.interval),
            on_source_error: input.on_source_error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initializing,
    Polling,
    Sleeping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed { sources: usize, events: usize },
    /// The remote API rate limited us; remaining sources wait for the next pass.
    Throttled,
    /// Shutdown was requested mid-pass.
    Interrupted,
}

/// Drives discovery, scheduling and per-source fetching on an interval.
pub struct Engine {
    api: Arc<dyn LogApi>,
    sink: Arc<dyn EventSink>,
    builder: EventBuilder,
    settings: EngineSettings,
    positions: PositionStore,
    tags: TagCache,
    scheduler: PriorityScheduler,
    state: EngineState,
}

impl Engine {
    pub fn new(
        api: Arc<dyn LogApi>,
        sink: Arc<dyn EventSink>,
        builder: EventBuilder,
        settings: EngineSettings,
        positions: PositionStore,
    ) -> Self {
        Self {
            api,
            sink,
            builder,
            settings,
            positions,
            tags: TagCache::default(),
            scheduler: PriorityScheduler::new(),
            state: EngineState::Initializing,
        }
    }

    pub fn with_tag_cache(mut self, tags: TagCache) -> Self {
        self.tags = tags;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn scheduler(&self) -> &PriorityScheduler {
        &self.scheduler
    }

    /// Discover sources once and assign start positions to unseen ones.
    /// Discovery failures here are fatal.
    pub async fn initialize(&mut self) -> Result<usize, EngineError> {
        self.state = EngineState::Initializing;
        info!(
            log_groups = ?self.settings.log_groups,
            prefix = self.settings.log_group_prefix,
            stored = self.positions.len(),
            "Initializing engine"
        );

        let sources = discover_sources(
            self.api.as_ref(),
            &self.settings.log_groups,
            self.settings.log_group_prefix,
        )
        .await
        .map_err(EngineError::Startup)?;

        let added = resolve_start_positions(
            &mut self.positions,
            &sources,
            self.settings.start_position,
            now_ms(),
        );
        if added > 0 {
            self.positions.flush();
        }

        info!(sources = sources.len(), new = added, "Engine initialized");
        Ok(sources.len())
    }

    /// Run one polling pass over every currently discovered source,
    /// least recently serviced first.
    pub async fn run_pass(&mut self, shutdown: &CancellationToken) -> Result<PassOutcome, EngineError> {
        self.state = EngineState::Polling;

        let discovered = match discover_sources(
            self.api.as_ref(),
            &self.settings.log_groups,
            self.settings.log_group_prefix,
        )
        .await
        {
            Ok(sources) => sources,
            Err(e) if e.is_throttled() => {
                debug!("reached rate limit");
                return Ok(PassOutcome::Throttled);
            }
            Err(e) => {
                warn!(error = %e, "Source discovery failed, retrying next interval");
                return Ok(PassOutcome::Completed {
                    sources: 0,
                    events: 0,
                });
            }
        };

        let ordered = self.scheduler.order(discovered);
        let mut visited = 0usize;
        let mut events = 0usize;

        for source in &ordered {
            if shutdown.is_cancelled() {
                return Ok(PassOutcome::Interrupted);
            }

            debug!(source = %source, "Processing source");
            let mut fetcher = SourceFetcher {
                api: self.api.as_ref(),
                sink: self.sink.as_ref(),
                builder: &self.builder,
                positions: &mut self.positions,
                tags: &mut self.tags,
                start_position: self.settings.start_position,
            };

            match fetcher.drain(source, shutdown).await {
                Ok(FetchOutcome::Drained { events: n, .. }) => {
                    self.scheduler.mark_serviced(source);
                    visited += 1;
                    events += n;
                }
                Ok(FetchOutcome::Interrupted { .. }) => return Ok(PassOutcome::Interrupted),
                Err(e) if e.is_throttled() => {
                    debug!(source = %source, "reached rate limit");
                    return Ok(PassOutcome::Throttled);
                }
                Err(EngineError::Api(error)) => match self.settings.on_source_error {
                    SourceErrorPolicy::Skip => {
                        warn!(source = %source, error = %error, "Failed to fetch source, skipping");
                    }
                    SourceErrorPolicy::Fail => {
                        return Err(EngineError::Source {
                            source_id: source.clone(),
                            error,
                        });
                    }
                },
                Err(e) => return Err(e),
            }
        }

        Ok(PassOutcome::Completed {
            sources: visited,
            events,
        })
    }

    /// Initialize, then poll until `shutdown` is cancelled.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<(), EngineError> {
        let result = self.poll_until_stopped(&shutdown).await;
        self.state = EngineState::Stopped;
        info!("Engine stopped");
        result
    }

    async fn poll_until_stopped(&mut self, shutdown: &CancellationToken) -> Result<(), EngineError> {
        self.initialize().await?;

        while !shutdown.is_cancelled() {
            match self.run_pass(shutdown).await? {
                PassOutcome::Completed { sources, events } => {
                    debug!(sources, events, "Pass completed");
                }
                PassOutcome::Throttled => debug!("Pass ended early after rate limiting"),
                PassOutcome::Interrupted => break,
            }

            self.state = EngineState::Sleeping;
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested during poll wait");
                    break;
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        Ok(())
    }
}
