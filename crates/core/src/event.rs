//! Domain event system — decoupled observation of the planning flow.
//!
//! Events are published when something interesting happens: the intake
//! advances, an agent is invoked, a tool runs, a section is merged.
//! The CLI subscribes to render progress; nothing depends on a subscriber
//! being present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use crate::topic::Topic;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The intake state machine moved to a new state
    IntakeAdvanced {
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },

    /// A specialist agent started a turn
    AgentInvoked {
        topic: Topic,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed on behalf of an agent
    ToolExecuted {
        agent: String,
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// An agent turn produced a degraded result
    AgentDegraded {
        topic: Topic,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A plan section was written (or replaced)
    SectionMerged {
        topic: Topic,
        degraded: bool,
        revision: u64,
        timestamp: DateTime<Utc>,
    },

    /// The traveler aborted the planning phase
    PlanningAborted {
        discarded_sections: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
