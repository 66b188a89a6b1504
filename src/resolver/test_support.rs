use std::sync::Arc;

use crate::maven::repository::RepositorySource;
use crate::maven::versioning::{SnapshotMarker, VersioningRecord};
use crate::resolver::context::{ResolutionContext, ResolutionSession};
use crate::source::events::CollectingEventSink;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub fn remote(id: &str) -> RepositorySource {
    RepositorySource::remote(id, &format!("https://{}.example.com/maven2", id))
}

pub fn session() -> ResolutionSession {
    ResolutionSession::new(RepositorySource::local("/home/user/.m2/repository"))
}

pub fn session_with_events() -> (ResolutionSession, Arc<CollectingEventSink>) {
    let events = Arc::new(CollectingEventSink::new());
    (session().with_events(events.clone()), events)
}

pub fn context(session: ResolutionSession) -> ResolutionContext {
    ResolutionContext::new(Arc::new(session))
}

pub fn release_record(release: &str, last_updated: &str) -> VersioningRecord {
    VersioningRecord {
        release: Some(release.to_string()),
        versions: vec![release.to_string()],
        last_updated: Some(last_updated.to_string()),
        ..Default::default()
    }
}

pub fn versions_record(versions: &[&str], last_updated: &str) -> VersioningRecord {
    VersioningRecord {
        versions: versions.iter().map(|v| v.to_string()).collect(),
        last_updated: Some(last_updated.to_string()),
        ..Default::default()
    }
}

pub fn snapshot_record(timestamp: &str, build_number: u32, last_updated: &str) -> VersioningRecord {
    VersioningRecord {
        snapshot: Some(SnapshotMarker {
            timestamp: Some(timestamp.to_string()),
            build_number,
            local_copy: false,
        }),
        last_updated: Some(last_updated.to_string()),
        ..Default::default()
    }
}
