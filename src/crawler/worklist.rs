//! Dynamic join primitive shared by both crawl phases
//!
//! A `Worklist` is a group of spawned tasks drained by a single consumer. The
//! consumer may spawn more tasks while draining, and `next` returns `None`
//! once nothing is pending. An optional deadline aborts everything still in
//! flight.

use std::future::Future;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// A growable set of concurrent work units with a single consumer
pub struct Worklist<T> {
    tasks: JoinSet<T>,
    deadline: Option<Instant>,
    spawned: usize,
    abandoned: usize,
    expired: bool,
}

impl<T: Send + 'static> Worklist<T> {
    /// Creates an empty worklist, optionally bounded by a deadline
    pub fn new(deadline: Option<Instant>) -> Self {
        Self {
            tasks: JoinSet::new(),
            deadline,
            spawned: 0,
            abandoned: 0,
            expired: false,
        }
    }

    /// Spawns a unit of work
    ///
    /// Units spawned after the deadline passed are dropped.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        if self.expired {
            self.abandoned += 1;
            return;
        }
        self.spawned += 1;
        self.tasks.spawn(task);
    }

    /// Waits for the next unit to finish
    ///
    /// Returns `None` when no unit is pending or the deadline has passed.
    /// Panicked units are logged and skipped.
    pub async fn next(&mut self) -> Option<T> {
        if self.expired {
            return None;
        }

        loop {
            let joined = match self.deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            self.expire();
                            return None;
                        }
                    }
                }
                None => self.tasks.join_next().await,
            };

            match joined? {
                Ok(value) => return Some(value),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    tracing::error!("Crawl task panicked: {}", e);
                    self.abandoned += 1;
                }
            }
        }
    }

    /// Number of units still running
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Total units spawned so far
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Units that never reported back (deadline or panic)
    pub fn abandoned(&self) -> usize {
        self.abandoned
    }

    /// True once the deadline has cut the worklist short
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    fn expire(&mut self) {
        let pending = self.tasks.len();
        tracing::warn!("Crawl deadline reached, abandoning {} pending tasks", pending);
        self.tasks.abort_all();
        self.abandoned += pending;
        self.expired = true;
    }
}
