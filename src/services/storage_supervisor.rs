use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::{MissedTickBehavior, interval, sleep, timeout};
use tracing::{debug, info, warn};

use crate::{
    dao::{
        league_store::{LeagueStore, VersionedDocument},
        models::LeagueDocument,
        storage::StorageError,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        league::{now_millis, now_rfc3339},
    },
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Keep a store connected, the league loaded and pending changes saved.
///
/// Runs forever: when the store stops answering the state is put in degraded
/// mode and the connection is retried with exponential backoff.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn LeagueStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => match bootstrap(&state, store.as_ref()).await {
                Ok(()) => {
                    state.install_league_store(store.clone()).await;
                    sse_events::broadcast_system_status(&state, false);
                    info!("storage connection established; leaving degraded mode");
                    delay = INITIAL_DELAY;

                    watch(&state, store.as_ref()).await;

                    state.clear_league_store().await;
                    sse_events::broadcast_system_status(&state, true);
                    warn!("storage health check failed; entering degraded mode");
                }
                Err(err) => warn!(error = %err, "failed to load the league document"),
            },
            Err(err) => warn!(error = %err, "storage connection attempt failed"),
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Load the league into memory unless a working copy already exists.
///
/// An empty store is seeded with the default document.
pub async fn bootstrap(state: &SharedState, store: &dyn LeagueStore) -> Result<(), ServiceError> {
    if state.has_league().await {
        debug!("keeping the in-memory league across reconnect");
        return Ok(());
    }

    let limit = state.config().storage_timeout;
    let loaded = timeout(limit, store.load())
        .await
        .map_err(|_| ServiceError::Timeout)??;

    match loaded {
        Some(VersionedDocument { document, version }) => {
            info!(
                teams = document.standings.len(),
                matches = document.matches.len(),
                version = ?version,
                "league document loaded"
            );
            state.install_league(document, version).await;
        }
        None => {
            let document = LeagueDocument::initial(
                state.config().league_name.clone(),
                now_millis(),
                now_rfc3339(),
            );
            let version = timeout(limit, store.save(document.clone(), None))
                .await
                .map_err(|_| ServiceError::Timeout)??;
            info!(version = ?version, "store was empty; default league document created");
            state.install_league(document, version).await;
        }
    }

    Ok(())
}

/// Poll the store health and run the auto-save until a probe fails.
async fn watch(state: &SharedState, store: &dyn LeagueStore) {
    let mut health = interval(HEALTH_POLL_INTERVAL);
    health.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut autosave = interval(state.autosave_interval());
    autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // both intervals fire immediately on the first tick
    health.tick().await;
    autosave.tick().await;

    loop {
        tokio::select! {
            _ = health.tick() => {
                match timeout(state.config().storage_timeout, store.health_check()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        warn!(error = %err, "storage health probe failed");
                        return;
                    }
                    Err(_) => {
                        warn!("storage health probe timed out");
                        return;
                    }
                }
            }
            _ = autosave.tick() => {
                if state.has_unsaved_changes().await {
                    match state.autosave().await {
                        Ok(()) => info!("pending league changes saved"),
                        Err(err) => warn!(error = %err, "auto-save failed; will retry"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::league_store::memory::MemoryLeagueStore,
        state::{AppState, standings::NewTeam},
    };

    #[tokio::test]
    async fn empty_store_is_seeded_with_default_document() {
        let state = AppState::new(AppConfig::default());
        let store = MemoryLeagueStore::new();

        bootstrap(&state, &store).await.unwrap();

        let stored = store.document().unwrap();
        assert_eq!(stored.news.len(), 1);
        assert!(stored.standings.is_empty());
        assert_eq!(store.version(), 1);
        let news = state
            .read_league(|league| league.latest_news(6).len())
            .await
            .unwrap();
        assert_eq!(news, 1);
    }

    #[tokio::test]
    async fn reconnect_keeps_the_working_copy() {
        let state = AppState::new(AppConfig::default());
        let first = Arc::new(MemoryLeagueStore::new());
        bootstrap(&state, first.as_ref()).await.unwrap();
        state.install_league_store(first.clone()).await;
        state
            .mutate(|league| {
                league.add_team(NewTeam {
                    name: "Owls".into(),
                    owner: "Ann".into(),
                    email: None,
                    phone: None,
                })
            })
            .await
            .unwrap();

        let second = MemoryLeagueStore::with_document(LeagueDocument::default());
        bootstrap(&state, &second).await.unwrap();

        let teams = state.read_league(|league| league.teams.len()).await.unwrap();
        assert_eq!(teams, 1);
    }
}
