pub mod league;
pub mod match_lifecycle;
pub mod registrations;
pub mod round;
mod sse;
pub mod standings;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    dao::{league_store::LeagueStore, models::LeagueDocument},
    error::ServiceError,
    state::league::{League, LeagueError},
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Working copy plus the bookkeeping needed to persist it.
struct WorkingCopy {
    league: League,
    /// Version token of the stored document this copy descends from.
    version: Option<String>,
    /// Bumped on every successful mutation.
    generation: u64,
}

/// Guarded by the save gate: one write to the store at a time.
#[derive(Default)]
struct SaveLedger {
    saved_generation: u64,
    last_saved_at: Option<Instant>,
}

/// Central application state shared by every handler.
///
/// Lock order is save gate, then league. Only [`AppState::replace_league`]
/// holds the league lock across a store call.
pub struct AppState {
    league_store: RwLock<Option<Arc<dyn LeagueStore>>>,
    league: RwLock<Option<WorkingCopy>>,
    save_gate: Mutex<SaveLedger>,
    sse: SseHub,
    degraded: watch::Sender<bool>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            league_store: RwLock::new(None),
            league: RwLock::new(None),
            save_gate: Mutex::new(SaveLedger::default()),
            sse: SseHub::new(16),
            degraded: degraded_tx,
            config: Arc::new(config),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current league store, if one is installed.
    pub async fn league_store(&self) -> Option<Arc<dyn LeagueStore>> {
        let guard = self.league_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new league store implementation and leave degraded mode.
    pub async fn install_league_store(&self, store: Arc<dyn LeagueStore>) {
        {
            let mut guard = self.league_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current league store and enter degraded mode.
    pub async fn clear_league_store(&self) {
        {
            let mut guard = self.league_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.league_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        self.degraded.send_replace(value);
    }

    /// Installed league store, or [`ServiceError::Degraded`].
    pub async fn require_league_store(&self) -> Result<Arc<dyn LeagueStore>, ServiceError> {
        self.league_store().await.ok_or(ServiceError::Degraded)
    }

    /// Replace the working copy with a document freshly read from the store.
    pub async fn install_league(&self, document: LeagueDocument, version: Option<String>) {
        let mut ledger = self.save_gate.lock().await;
        let mut guard = self.league.write().await;
        let generation = guard.as_ref().map_or(0, |copy| copy.generation + 1);
        *guard = Some(WorkingCopy {
            league: League::from_document(document, self.config.activity_log_limit),
            version,
            generation,
        });
        ledger.saved_generation = generation;
    }

    /// Whether a working copy has been loaded.
    pub async fn has_league(&self) -> bool {
        self.league.read().await.is_some()
    }

    /// Run a read-only closure against the working copy.
    pub async fn read_league<T>(
        &self,
        read: impl FnOnce(&League) -> T,
    ) -> Result<T, ServiceError> {
        let guard = self.league.read().await;
        let copy = guard.as_ref().ok_or(ServiceError::Degraded)?;
        Ok(read(&copy.league))
    }

    /// Version token and full document of the working copy.
    pub async fn snapshot(&self) -> Result<(LeagueDocument, Option<String>), ServiceError> {
        let guard = self.league.read().await;
        let copy = guard.as_ref().ok_or(ServiceError::Degraded)?;
        Ok((copy.league.to_document(), copy.version.clone()))
    }

    /// Apply a domain mutation, returning its output and the new generation.
    ///
    /// A failed mutation leaves the generation untouched.
    pub async fn apply_mutation<T>(
        &self,
        mutate: impl FnOnce(&mut League) -> Result<T, LeagueError>,
    ) -> Result<(T, u64), ServiceError> {
        let mut guard = self.league.write().await;
        let copy = guard.as_mut().ok_or(ServiceError::Degraded)?;
        let output = mutate(&mut copy.league)?;
        copy.generation += 1;
        Ok((output, copy.generation))
    }

    /// Apply a mutation and persist the working copy.
    ///
    /// If the save fails the mutation stays in memory and the auto-save task
    /// retries it later.
    pub async fn mutate<T>(
        &self,
        mutate: impl FnOnce(&mut League) -> Result<T, LeagueError>,
    ) -> Result<(T, u64), ServiceError> {
        self.require_league_store().await?;
        let (output, generation) = self.apply_mutation(mutate).await?;
        self.persist_generation(generation).await?;
        Ok((output, generation))
    }

    /// Make sure `requested` (or a later generation) has reached the store.
    ///
    /// Saves are serialized by the save gate. A caller whose generation was
    /// already written by an overlapping save returns immediately.
    pub async fn persist_generation(&self, requested: u64) -> Result<(), ServiceError> {
        let store = self.require_league_store().await?;
        let mut ledger = self.save_gate.lock().await;
        if ledger.saved_generation >= requested {
            debug!(requested, saved = ledger.saved_generation, "save coalesced");
            return Ok(());
        }

        if let Some(last) = ledger.last_saved_at {
            let elapsed = last.elapsed();
            if elapsed < self.config.save_cooldown {
                sleep(self.config.save_cooldown - elapsed).await;
            }
        }

        let (document, version, generation) = {
            let guard = self.league.read().await;
            let copy = guard.as_ref().ok_or(ServiceError::Degraded)?;
            (
                copy.league.to_document(),
                copy.version.clone(),
                copy.generation,
            )
        };

        let outcome = timeout(self.config.storage_timeout, store.save(document, version)).await;
        ledger.last_saved_at = Some(Instant::now());

        let new_version = match outcome {
            Ok(Ok(version)) => version,
            Ok(Err(err)) => {
                warn!(generation, error = %err, "failed to save league document");
                return Err(err.into());
            }
            Err(_) => {
                warn!(
                    generation,
                    timeout_ms = self.config.storage_timeout.as_millis() as u64,
                    "league document save timed out"
                );
                return Err(ServiceError::Timeout);
            }
        };

        ledger.saved_generation = generation;
        if let Some(copy) = self.league.write().await.as_mut() {
            copy.version = new_version;
        }
        debug!(generation, "league document saved");
        Ok(())
    }

    /// Whether the working copy holds changes the store has not seen yet.
    pub async fn has_unsaved_changes(&self) -> bool {
        let ledger = self.save_gate.lock().await;
        let guard = self.league.read().await;
        guard
            .as_ref()
            .is_some_and(|copy| copy.generation > ledger.saved_generation)
    }

    /// Persist whatever generation is current, if it was not saved yet.
    pub async fn autosave(&self) -> Result<(), ServiceError> {
        let generation = {
            let guard = self.league.read().await;
            match guard.as_ref() {
                Some(copy) => copy.generation,
                None => return Ok(()),
            }
        };
        self.persist_generation(generation).await
    }

    /// Write a whole replacement document and adopt it as the working copy.
    ///
    /// With `expected_version` the store rejects the write if the stored
    /// document moved; without it the write overwrites unconditionally.
    /// Mutations arriving meanwhile wait and apply on top of the replacement.
    pub async fn replace_league(
        &self,
        document: LeagueDocument,
        expected_version: Option<String>,
    ) -> Result<(Option<String>, u64), ServiceError> {
        let store = self.require_league_store().await?;
        let mut ledger = self.save_gate.lock().await;
        let mut guard = self.league.write().await;

        // stored copy == served copy
        let league = League::from_document(document, self.config.activity_log_limit);
        let normalized = league.to_document();

        let outcome = timeout(
            self.config.storage_timeout,
            store.save(normalized, expected_version),
        )
        .await;
        ledger.last_saved_at = Some(Instant::now());
        let version = match outcome {
            Ok(result) => result?,
            Err(_) => return Err(ServiceError::Timeout),
        };

        let generation = guard.as_ref().map_or(0, |copy| copy.generation + 1);
        *guard = Some(WorkingCopy {
            league,
            version: version.clone(),
            generation,
        });
        ledger.saved_generation = generation;
        info!(generation, version = ?version, "league document replaced");
        Ok((version, generation))
    }

    /// Delay used by the auto-save task.
    pub fn autosave_interval(&self) -> Duration {
        self.config.autosave_interval
    }
}
