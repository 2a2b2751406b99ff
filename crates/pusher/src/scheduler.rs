use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use notify::Dispatcher;

use crate::config::Conf;
use crate::fetcher::Fetcher;
use crate::history::{History, HistoryError};

/// Drives repeated poll-diff-dispatch rounds.
///
/// Every collaborator is a constructor argument; the scheduler holds no
/// ambient globals, which keeps the round logic testable in isolation.
pub struct Scheduler {
    conf: Conf,
    fetcher: Fetcher,
    dispatcher: Dispatcher,
    history: Mutex<History>,
    /// Suppress dispatch for the first round, recording history only.
    silent: bool,
}

impl Scheduler {
    pub fn new(conf: Conf, client: reqwest::Client, history: History, silent: bool) -> Self {
        Self {
            conf,
            fetcher: Fetcher::with_client(client.clone()),
            dispatcher: Dispatcher::with_client(client),
            history: Mutex::new(history),
            silent,
        }
    }

    /// Run rounds until the configured interval says stop.
    ///
    /// A negative interval runs exactly one round. Otherwise the next round
    /// starts at `previous scheduled start + interval`, so a slow round
    /// never drifts the cadence; a round that overruns its slot rolls
    /// straight into the next one without sleeping.
    pub async fn run(mut self) -> Result<(), HistoryError> {
        let mut next_run = Utc::now().timestamp();
        loop {
            self.round().await?;

            if self.silent {
                self.silent = false;
            }
            tracing::debug!("round complete");

            if self.conf.interval < 0 {
                break;
            }
            next_run += self.conf.interval * 60;
            let sleep = next_run - Utc::now().timestamp();
            if sleep > 0 {
                tokio::time::sleep(Duration::from_secs(sleep as u64)).await;
            }
        }
        Ok(())
    }

    /// One full pass over all projects, then a history save.
    async fn round(&self) -> Result<(), HistoryError> {
        for project in &self.conf.projects {
            let messages = Mutex::new(Vec::new());
            self.fetcher
                .fetch_project(project.feeds.clone(), &messages, &self.history)
                .await;

            if !self.silent {
                let collected = messages.into_inner();
                self.dispatcher
                    .dispatch(project.webhooks.clone(), &collected)
                    .await;
            }
        }

        // Losing the record would re-notify every known entry next round,
        // so a failed save ends the run instead of limping on.
        self.history.lock().await.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn conf(interval: i64) -> Conf {
        Conf {
            interval,
            projects: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_negative_interval_runs_exactly_one_round() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".feedpush");
        let history = History::load(&path).unwrap();

        let scheduler = Scheduler::new(conf(-1), reqwest::Client::new(), history, false);
        scheduler.run().await.unwrap();

        // The round persisted the (empty) history before exiting.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_silent_single_round_still_saves_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".feedpush");
        let history = History::load(&path).unwrap();

        let scheduler = Scheduler::new(conf(-1), reqwest::Client::new(), history, true);
        scheduler.run().await.unwrap();

        assert!(path.exists());
    }
}
