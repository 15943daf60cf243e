//! Weighted round-robin polling strategy
//!
//! Every queue starts in the rotation with weight 1. A poll that finds
//! messages earns the queue one more rotation entry, up to its configured
//! weight. A poll that finds nothing pauses the queue for `delay`; when the
//! pause expires the queue rejoins the rotation with weight 1.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use shoal_core::domain::{QueueDescriptor, QueueName};
use shoal_core::port::{PollingStrategy, TimeProvider};

#[derive(Debug, Default)]
struct RotationState {
    /// Configured maximum weight per queue
    max_weights: HashMap<QueueName, usize>,
    /// Rotation entries; a queue appears once per unit of current weight
    rotation: VecDeque<QueueName>,
    /// (unpause_at_millis, queue), ordered by unpause time
    paused: VecDeque<(i64, QueueName)>,
}

impl RotationState {
    fn current_weight(&self, queue: &str) -> usize {
        self.rotation.iter().filter(|q| q.as_str() == queue).count()
    }
}

/// Weighted round-robin over a fixed set of queues
pub struct WeightedRoundRobin {
    state: Mutex<RotationState>,
    delay_ms: i64,
    time_provider: Arc<dyn TimeProvider>,
}

impl WeightedRoundRobin {
    /// Create a strategy from `(queue, weight)` pairs
    ///
    /// # Arguments
    /// * `queues` - Queue names with their maximum weight (0 is treated as 1;
    ///   repeated names add up)
    /// * `delay` - How long a queue stays paused after an empty poll
    /// * `time_provider` - Clock used for pause expiry
    pub fn new(
        queues: Vec<(String, usize)>,
        delay: Duration,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let mut state = RotationState::default();
        for (queue, weight) in queues {
            let weight = weight.max(1);
            match state.max_weights.get_mut(&queue) {
                Some(max) => *max += weight,
                None => {
                    state.max_weights.insert(queue.clone(), weight);
                    state.rotation.push_back(queue);
                }
            }
        }

        Self {
            state: Mutex::new(state),
            delay_ms: i64::try_from(delay.as_millis()).unwrap_or(i64::MAX),
            time_provider,
        }
    }

    fn state(&self) -> MutexGuard<'_, RotationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current `(queue, weight)` pairs in the rotation, in first-seen order
    pub fn active_queues(&self) -> Vec<(QueueName, usize)> {
        let state = self.state();
        let mut active: Vec<(QueueName, usize)> = Vec::new();
        for queue in &state.rotation {
            match active.iter_mut().find(|(name, _)| name == queue) {
                Some((_, weight)) => *weight += 1,
                None => active.push((queue.clone(), 1)),
            }
        }
        active
    }

    /// Queues currently paused after an empty poll
    pub fn paused_queues(&self) -> Vec<QueueName> {
        self.state()
            .paused
            .iter()
            .map(|(_, queue)| queue.clone())
            .collect()
    }

    fn unpause_due(&self, state: &mut RotationState) {
        let now = self.time_provider.now_millis();
        while let Some((unpause_at, _)) = state.paused.front() {
            if *unpause_at > now {
                break;
            }
            if let Some((_, queue)) = state.paused.pop_front() {
                debug!(queue = %queue, "Unpaused queue");
                state.rotation.push_back(queue);
            }
        }
    }

    fn pause(&self, state: &mut RotationState, queue: &str) {
        let before = state.rotation.len();
        state.rotation.retain(|q| q != queue);
        if state.rotation.len() == before {
            return;
        }

        let unpause_at = self.time_provider.now_millis().saturating_add(self.delay_ms);
        state.paused.push_back((unpause_at, queue.to_string()));
        debug!(queue = %queue, delay_ms = self.delay_ms, "Paused queue");
    }
}

impl PollingStrategy for WeightedRoundRobin {
    fn next_queue(&self) -> Option<QueueDescriptor> {
        let mut state = self.state();
        self.unpause_due(&mut state);

        let queue = state.rotation.pop_front()?;
        state.rotation.push_back(queue.clone());
        Some(QueueDescriptor::new(queue))
    }

    fn messages_found(&self, queue: &str, count: usize) {
        let mut state = self.state();

        if count == 0 {
            self.pause(&mut state, queue);
            return;
        }

        let current = state.current_weight(queue);
        if current == 0 {
            return;
        }

        let maximum = state.max_weights.get(queue).copied().unwrap_or(1);
        if maximum > current {
            info!(
                queue = %queue,
                weight = current + 1,
                max_weight = maximum,
                "Increasing queue weight"
            );
            state.rotation.push_back(queue.to_string());
        }
    }

    fn active_queue_count(&self) -> usize {
        self.active_queues().len()
    }
}
