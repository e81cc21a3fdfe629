//! Application context - wires everything together

use crate::config::CliConfig;
use chrono::Utc;
use ctas_core::{AccountId, Amount, Clock, SystemClock};
use ctas_events::{verify_chain, EventError, EventReader, EventStore, JournalRecord};
use ctas_projection::Projection;
use ctas_workflow::{FundSystem, WorkflowError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Application context - fund system replayed from the journal, plus the
/// journal writer and the projection
pub struct AppContext {
    system: Option<FundSystem>,
    event_store: EventStore,
    projection: Option<Projection>,
    config: CliConfig,
    clock: Arc<dyn Clock>,
    journal_path: PathBuf,
    projection_path: PathBuf,
}

impl AppContext {
    /// Open the data directory and replay its journal
    pub fn new(data_path: impl AsRef<Path>, config: CliConfig) -> Result<Self, anyhow::Error> {
        Self::with_clock(data_path, config, Arc::new(SystemClock))
    }

    /// Same as [`AppContext::new`] with an explicit clock for request
    /// creation times
    pub fn with_clock(
        data_path: impl AsRef<Path>,
        config: CliConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        let journal_path = data_path.join("journal");
        let projection_path = data_path.join("projection.db");

        // Replay events to rebuild state
        let records = EventReader::from_directory(&journal_path)?.read_all()?;
        verify_chain(&records)?;
        let event_store = EventStore::open(&journal_path, records.last())?;

        // The workflow config only applies at deploy; a replayed system keeps
        // the settings recorded in its `Deployed` event
        let system = if records.is_empty() {
            None
        } else {
            Some(FundSystem::replay(
                records.iter().map(|r| &r.event),
                clock.clone(),
            )?)
        };

        let projection = match Projection::new(&projection_path) {
            Ok(projection) => match projection.rebuild(records.iter().map(|r| &r.event)) {
                Ok(_) => Some(projection),
                Err(e) => {
                    warn!(error = %e, "projection rebuild failed, continuing without it");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "projection unavailable");
                None
            }
        };

        Ok(Self {
            system,
            event_store,
            projection,
            config,
            clock,
            journal_path,
            projection_path,
        })
    }

    /// Deploy a new fund system and commit its `Deployed` event
    pub fn deploy(
        &mut self,
        owner: AccountId,
        initial_funding: Amount,
    ) -> Result<Vec<JournalRecord>, ContextError> {
        if self.system.is_some() {
            return Err(ContextError::AlreadyDeployed(self.last_sequence()));
        }

        self.system = Some(FundSystem::deploy(
            owner,
            initial_funding,
            self.config.workflow.clone(),
            self.clock.clone(),
        ));
        Ok(self.commit()?)
    }

    /// Run one operation against the system and commit what it emitted
    pub fn execute<T, F>(&mut self, op: F) -> Result<(T, Vec<JournalRecord>), ContextError>
    where
        F: FnOnce(&mut FundSystem) -> Result<T, WorkflowError>,
    {
        let system = self.system.as_mut().ok_or(ContextError::NotDeployed)?;
        let value = op(system)?;
        let records = self.commit()?;
        Ok((value, records))
    }

    /// Append the system's pending events to the journal
    ///
    /// Flow: Drain → Seal + Append → Project
    pub fn commit(&mut self) -> Result<Vec<JournalRecord>, EventError> {
        let events = match self.system.as_mut() {
            Some(system) => system.take_events(),
            None => return Ok(Vec::new()),
        };

        let mut committed = Vec::with_capacity(events.len());
        for event in events {
            let record = self.event_store.append(event, Utc::now())?;

            if let Some(ref projection) = self.projection {
                if let Err(e) = projection.apply(&record.event) {
                    warn!(sequence = record.sequence, error = %e, "projection update failed");
                }
            }

            info!(
                sequence = record.sequence,
                event = record.event.name(),
                "event committed"
            );
            committed.push(record);
        }

        Ok(committed)
    }

    pub fn system(&self) -> Result<&FundSystem, ContextError> {
        self.system.as_ref().ok_or(ContextError::NotDeployed)
    }

    /// Read model for queries; `None` when it could not be opened or rebuilt
    pub fn projection(&self) -> Result<&Projection, ContextError> {
        self.projection
            .as_ref()
            .ok_or_else(|| ContextError::ProjectionUnavailable(self.projection_path.clone()))
    }

    pub fn is_deployed(&self) -> bool {
        self.system.is_some()
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// Sequence of the last committed record, 0 for an empty journal
    pub fn last_sequence(&self) -> u64 {
        self.event_store.sequence()
    }
}

/// Errors while running a command against the context
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("System not deployed; run `ctas deploy` first")]
    NotDeployed,

    #[error("System already deployed (sequence = {0})")]
    AlreadyDeployed(u64),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Event store error: {0}")]
    Event(#[from] EventError),

    #[error("Projection unavailable at {}", .0.display())]
    ProjectionUnavailable(PathBuf),
}
