use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{keys, Configuration, MapConfiguration};
use crate::maven::artifact_type::ArtifactTypeRegistry;
use crate::maven::repository::RepositorySource;
use crate::resolver::cache::ResolutionCache;
use crate::source::events::{EventSink, RepositoryEvent, TracingEventSink};
use crate::source::model_builder::InterpolationContext;
use crate::source::workspace::WorkspaceReader;

/// Everything that lives as long as a resolution session: collaborators that are not specific to
///  a resolver, settings and the session's cache. Dropping the session discards the cache.
pub struct ResolutionSession {
    pub local_repository: RepositorySource,
    pub workspace: Option<Arc<dyn WorkspaceReader>>,
    pub config: Arc<dyn Configuration>,
    pub cache: ResolutionCache,
    pub events: Arc<dyn EventSink>,
    pub artifact_types: ArtifactTypeRegistry,
    pub system_properties: BTreeMap<String, String>,
    pub user_properties: BTreeMap<String, String>,
}
impl ResolutionSession {
    pub fn new(local_repository: RepositorySource) -> ResolutionSession {
        ResolutionSession {
            local_repository,
            workspace: None,
            config: Arc::new(MapConfiguration::new()),
            cache: ResolutionCache::new(),
            events: Arc::new(TracingEventSink),
            artifact_types: ArtifactTypeRegistry::default(),
            system_properties: BTreeMap::new(),
            user_properties: BTreeMap::new(),
        }
    }

    pub fn with_workspace(self, workspace: Arc<dyn WorkspaceReader>) -> ResolutionSession {
        ResolutionSession {
            workspace: Some(workspace),
            ..self
        }
    }

    pub fn with_config(self, config: Arc<dyn Configuration>) -> ResolutionSession {
        ResolutionSession {
            config,
            ..self
        }
    }

    pub fn with_events(self, events: Arc<dyn EventSink>) -> ResolutionSession {
        ResolutionSession {
            events,
            ..self
        }
    }

    pub fn with_artifact_types(self, artifact_types: ArtifactTypeRegistry) -> ResolutionSession {
        ResolutionSession {
            artifact_types,
            ..self
        }
    }

    pub fn with_system_property(mut self, key: &str, value: &str) -> ResolutionSession {
        self.system_properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_user_property(mut self, key: &str, value: &str) -> ResolutionSession {
        self.user_properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn caching_enabled(&self) -> bool {
        !self.config.get_bool(keys::VERSION_RESOLVER_NO_CACHE, false)
    }

    pub fn ignore_missing_descriptors(&self) -> bool {
        self.config.get_bool(keys::DESCRIPTOR_IGNORE_MISSING, false)
    }

    pub fn ignore_invalid_descriptors(&self) -> bool {
        self.config.get_bool(keys::DESCRIPTOR_IGNORE_INVALID, false)
    }

    pub fn workspace_identity(&self) -> Option<RepositorySource> {
        self.workspace.as_ref().map(|w| w.identity())
    }

    pub fn interpolation_context(&self) -> InterpolationContext {
        InterpolationContext::new(&self.system_properties, &self.user_properties)
    }

    pub fn emit(&self, event: RepositoryEvent) {
        self.events.emit(event);
    }
}

/// Per request data: the session, a tag describing what the resolution is for (e.g. "project" or
///  "plugin"), and the caller's means of aborting it.
#[derive(Clone)]
pub struct ResolutionContext {
    pub session: Arc<ResolutionSession>,
    pub request_context: String,
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}
impl ResolutionContext {
    pub fn new(session: Arc<ResolutionSession>) -> ResolutionContext {
        ResolutionContext {
            session,
            request_context: String::new(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_request_context(self, request_context: &str) -> ResolutionContext {
        ResolutionContext {
            request_context: request_context.to_string(),
            ..self
        }
    }

    pub fn with_cancellation(self, cancel: CancellationToken) -> ResolutionContext {
        ResolutionContext {
            cancel,
            ..self
        }
    }

    /// the deadline is fixed when this is called, not when resolution starts
    pub fn with_timeout(self, timeout: Duration) -> ResolutionContext {
        ResolutionContext {
            deadline: Some(Instant::now() + timeout),
            ..self
        }
    }
}
