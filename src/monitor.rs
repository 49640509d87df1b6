// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Polling and reconciliation for the Activities view.
//!
//! Every tick fires three independent fetches (bot stats, queue, transfer
//! list). Each resource updates the moment its fetch resolves; a failed
//! fetch logs and sends nothing, so that resource keeps its last good value
//! while the other two move on. Updates carry a (generation, seq) pair and
//! `MonitorState::apply` drops anything stale, so a slow response from an
//! old tick can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::agent::models::{BotStats, QueueStatus, Transfer};
use crate::agent::AgentClient;

const SLOT_BOT_STATS: usize = 0;
const SLOT_QUEUE: usize = 1;
const SLOT_TRANSFERS: usize = 2;

#[derive(Debug)]
pub enum ResourcePayload {
    BotStats(Vec<BotStats>),
    Queue(QueueStatus),
    Transfers(Vec<Transfer>),
}

impl ResourcePayload {
    fn slot(&self) -> usize {
        match self {
            ResourcePayload::BotStats(_) => SLOT_BOT_STATS,
            ResourcePayload::Queue(_) => SLOT_QUEUE,
            ResourcePayload::Transfers(_) => SLOT_TRANSFERS,
        }
    }
}

#[derive(Debug)]
pub struct ResourceUpdate {
    pub generation: u64,
    pub seq: u64,
    pub payload: ResourcePayload,
}

/// Snapshot state fed by the poller. Each slice is replaced wholesale when
/// its update is accepted; readers never observe a half-applied tick.
#[derive(Default)]
pub struct MonitorState {
    pub bot_stats: Vec<BotStats>,
    pub queue: Option<QueueStatus>,
    pub transfers: Vec<Transfer>,

    generation: u64,
    applied_seq: [u64; 3],
}

impl MonitorState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new polling generation (the view was re-entered). Data from
    /// the previous generation stays visible until fresh data lands, but its
    /// in-flight resolutions are no longer accepted.
    pub fn begin_generation(&mut self) -> u64 {
        self.generation += 1;
        self.applied_seq = [0; 3];
        self.generation
    }

    /// Apply an update unless it is from a dead generation or behind the
    /// last applied tick for its resource. Returns whether it was applied.
    pub fn apply(&mut self, update: ResourceUpdate) -> bool {
        if update.generation != self.generation {
            tracing::debug!(
                "Discarding update from generation {} (current {})",
                update.generation,
                self.generation
            );
            return false;
        }

        let slot = update.payload.slot();
        if update.seq < self.applied_seq[slot] {
            tracing::debug!(
                "Discarding out-of-order update (seq {} < {})",
                update.seq,
                self.applied_seq[slot]
            );
            return false;
        }
        self.applied_seq[slot] = update.seq;

        match update.payload {
            ResourcePayload::BotStats(bots) => self.bot_stats = bots,
            ResourcePayload::Queue(queue) => self.queue = Some(queue),
            ResourcePayload::Transfers(transfers) => self.transfers = transfers,
        }
        true
    }

    /// Transfers currently moving toward or through the wire.
    pub fn active_downloads(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| t.status.is_active())
            .count()
    }

    /// Sum of all bytes ever moved, across every known bot.
    pub fn total_volume(&self) -> u64 {
        self.bot_stats.iter().map(|b| b.total_bytes).sum()
    }

    pub fn queue_size(&self) -> usize {
        self.queue.as_ref().map(|q| q.queue_size).unwrap_or(0)
    }
}

/// Fire one reconciliation round: three independent fetch tasks, no barrier.
pub fn spawn_fetch_round(
    client: AgentClient,
    tx: mpsc::UnboundedSender<ResourceUpdate>,
    generation: u64,
    seq: u64,
) {
    let stats_client = client.clone();
    let stats_tx = tx.clone();
    tokio::spawn(async move {
        match stats_client.bot_stats().await {
            Ok(bots) => {
                let _ = stats_tx.send(ResourceUpdate {
                    generation,
                    seq,
                    payload: ResourcePayload::BotStats(bots),
                });
            }
            Err(e) => tracing::warn!("Bot stats poll failed: {}", e),
        }
    });

    let queue_client = client.clone();
    let queue_tx = tx.clone();
    tokio::spawn(async move {
        match queue_client.queue_status().await {
            Ok(queue) => {
                let _ = queue_tx.send(ResourceUpdate {
                    generation,
                    seq,
                    payload: ResourcePayload::Queue(queue),
                });
            }
            Err(e) => tracing::warn!("Queue poll failed: {}", e),
        }
    });

    tokio::spawn(async move {
        match client.transfers().await {
            Ok(transfers) => {
                let _ = tx.send(ResourceUpdate {
                    generation,
                    seq,
                    payload: ResourcePayload::Transfers(transfers),
                });
            }
            Err(e) => tracing::warn!("Transfer list poll failed: {}", e),
        }
    });
}

/// Interval-driven poll loop, alive exactly as long as the Activities view.
/// Dropping the poller aborts the interval task; fetches already in flight
/// resolve on their own and are filtered out by the generation guard.
pub struct Poller {
    handle: JoinHandle<()>,
    force_tx: mpsc::UnboundedSender<()>,
}

impl Poller {
    pub fn spawn(
        client: AgentClient,
        tx: mpsc::UnboundedSender<ResourceUpdate>,
        generation: u64,
        seq: Arc<AtomicU64>,
        interval: Duration,
    ) -> Self {
        let (force_tx, mut force_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = force_rx.recv() => {}
                }
                let seq_now = seq.fetch_add(1, Ordering::Relaxed) + 1;
                spawn_fetch_round(client.clone(), tx.clone(), generation, seq_now);
            }
        });

        Self { handle, force_tx }
    }

    /// Trigger an out-of-cycle reconciliation right now.
    pub fn force(&self) {
        let _ = self.force_tx.send(());
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::models::{PackUrl, TransferPriority, TransferStatus};

    fn transfer(id: &str, status: TransferStatus) -> Transfer {
        Transfer {
            id: id.to_string(),
            url: PackUrl {
                server: "irc.foo.net".to_string(),
                channel: "#c".to_string(),
                bot: "Bot".to_string(),
                pack: 1,
            },
            status,
            file_name: None,
            file_size: None,
            downloaded: 0,
            speed: 0.0,
            progress: 0.0,
            error: None,
            created_at: 0,
            updated_at: 0,
            priority: TransferPriority::Normal,
            retry_count: 0,
            max_retries: 3,
            queue_position: None,
        }
    }

    fn bot(name: &str, total_bytes: u64) -> BotStats {
        BotStats {
            bot_name: name.to_string(),
            network: "Rizon".to_string(),
            total_downloads: 1,
            successful_downloads: 1,
            failed_downloads: 0,
            total_bytes,
            average_speed: 0.0,
            reliability_score: 1.0,
        }
    }

    fn update(state: &MonitorState, seq: u64, payload: ResourcePayload) -> ResourceUpdate {
        ResourceUpdate {
            generation: state.generation(),
            seq,
            payload,
        }
    }

    #[test]
    fn test_failed_resource_retains_previous_value() {
        let mut state = MonitorState::default();
        state.begin_generation();

        // Tick 1: all three resources land.
        let u = update(&state, 1, ResourcePayload::BotStats(vec![bot("A", 100)]));
        assert!(state.apply(u));
        let u = update(&state, 1, ResourcePayload::Queue(QueueStatus { queue_size: 2, status: String::new() }));
        assert!(state.apply(u));
        let u = update(&state, 1, ResourcePayload::Transfers(vec![]));
        assert!(state.apply(u));

        // Tick 2: bot stats fetch failed, so no update arrives for it.
        let u = update(&state, 2, ResourcePayload::Queue(QueueStatus { queue_size: 5, status: String::new() }));
        assert!(state.apply(u));
        let u = update(
            &state,
            2,
            ResourcePayload::Transfers(vec![transfer("t1", TransferStatus::Downloading)]),
        );
        assert!(state.apply(u));

        assert_eq!(state.bot_stats.len(), 1);
        assert_eq!(state.bot_stats[0].total_bytes, 100);
        assert_eq!(state.queue_size(), 5);
        assert_eq!(state.transfers.len(), 1);
    }

    #[test]
    fn test_out_of_order_resolution_discarded() {
        let mut state = MonitorState::default();
        state.begin_generation();

        let newer = update(&state, 3, ResourcePayload::BotStats(vec![bot("A", 300)]));
        assert!(state.apply(newer));

        // A slow response from tick 2 resolves after tick 3 already applied.
        let stale = update(&state, 2, ResourcePayload::BotStats(vec![bot("A", 200)]));
        assert!(!state.apply(stale));
        assert_eq!(state.bot_stats[0].total_bytes, 300);

        // The stale guard is per-resource: tick 2 queue data is still fresh.
        let queue = update(&state, 2, ResourcePayload::Queue(QueueStatus { queue_size: 1, status: String::new() }));
        assert!(state.apply(queue));
    }

    #[test]
    fn test_same_seq_later_arrival_applies() {
        let mut state = MonitorState::default();
        state.begin_generation();

        let u = update(&state, 4, ResourcePayload::Transfers(vec![]));
        assert!(state.apply(u));
        let u = update(
            &state,
            4,
            ResourcePayload::Transfers(vec![transfer("t1", TransferStatus::Pending)]),
        );
        assert!(state.apply(u));
    }

    #[test]
    fn test_dead_generation_discarded() {
        let mut state = MonitorState::default();
        let old_generation = state.begin_generation();

        state.begin_generation();
        let stale = ResourceUpdate {
            generation: old_generation,
            seq: 99,
            payload: ResourcePayload::Queue(QueueStatus { queue_size: 7, status: String::new() }),
        };
        assert!(!state.apply(stale));
        assert_eq!(state.queue_size(), 0);
    }

    #[test]
    fn test_active_download_count() {
        let mut state = MonitorState::default();
        state.begin_generation();
        let transfers = vec![
            transfer("a", TransferStatus::Downloading),
            transfer("b", TransferStatus::Connecting),
            transfer("c", TransferStatus::Joining),
            transfer("d", TransferStatus::Requesting),
            transfer("e", TransferStatus::Pending),
            transfer("f", TransferStatus::Completed),
            transfer("g", TransferStatus::Failed),
        ];
        let u = update(&state, 1, ResourcePayload::Transfers(transfers));
        state.apply(u);
        assert_eq!(state.active_downloads(), 4);
    }

    #[test]
    fn test_total_volume_sums_bots() {
        let mut state = MonitorState::default();
        state.begin_generation();
        let u = update(
            &state,
            1,
            ResourcePayload::BotStats(vec![bot("A", 100), bot("B", 250)]),
        );
        state.apply(u);
        assert_eq!(state.total_volume(), 350);
    }
}
