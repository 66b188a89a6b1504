use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use tracing::warn;

use crate::maven::coordinates::Coordinate;
use crate::maven::repository::RepositorySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DescriptorMissing,
    DescriptorInvalid,
    MetadataInvalid,
}
impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EventKind::DescriptorMissing => "descriptor-missing",
            EventKind::DescriptorInvalid => "descriptor-invalid",
            EventKind::MetadataInvalid => "metadata-invalid",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEvent {
    pub kind: EventKind,
    pub coordinate: Coordinate,
    pub repository: Option<RepositorySource>,
    pub cause: String,
}

/// Receives diagnostics about problems that resolution recovered from. Emitting is fire and
///  forget: implementations must not fail or block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RepositoryEvent);
}

/// writes events to the log
#[derive(Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: RepositoryEvent) {
        let repository = event.repository
            .as_ref()
            .map(|r| r.id.as_str())
            .unwrap_or("-");
        warn!(kind = %event.kind, coordinate = %event.coordinate, repository, "{}", event.cause);
    }
}

/// keeps all events in memory so they can be inspected afterwards
#[derive(Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<RepositoryEvent>>,
}
impl CollectingEventSink {
    pub fn new() -> CollectingEventSink {
        Default::default()
    }

    pub fn events(&self) -> Vec<RepositoryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap()
            .iter()
            .map(|e| e.kind)
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: RepositoryEvent) {
        self.events.lock().unwrap().push(event);
    }
}
