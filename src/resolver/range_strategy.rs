use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{keys, Configuration};
use crate::maven::coordinates::{is_snapshot_version, Coordinate};
use crate::maven::repository::RepositorySource;
use crate::resolver::context::ResolutionContext;
use crate::resolver::error::VersionRangeResolutionError;
use crate::resolver::range_resolver::{DefaultVersionRangeResolver, RangeResult, RangeVersion, VersionRangeResolver};
use crate::source::metadata_source::MetadataSource;

pub const DEFAULT_STRATEGY: &str = "default";
pub const RELEASES_ONLY_STRATEGY: &str = "releases-only";
pub const RELEASES_ON_BOUNDARIES_STRATEGY: &str = "releases-on-boundaries";

fn is_snapshot(version: &RangeVersion) -> bool {
    is_snapshot_version(version.version.as_str())
}

/// drops all snapshot versions
pub fn releases_only(versions: Vec<RangeVersion>) -> Vec<RangeVersion> {
    versions.into_iter()
        .filter(|v| !is_snapshot(v))
        .collect()
}

/// Drops the snapshot versions at the start and at the end of a sorted list. Snapshots between
///  two releases are kept.
pub fn releases_on_boundaries(versions: Vec<RangeVersion>) -> Vec<RangeVersion> {
    let first_release = versions.iter().position(|v| !is_snapshot(v));
    let last_release = versions.iter().rposition(|v| !is_snapshot(v));

    match (first_release, last_release) {
        (Some(first), Some(last)) => versions.into_iter()
            .skip(first)
            .take(last - first + 1)
            .collect(),
        _ => vec![],
    }
}

/// Decorates a range resolver by filtering the versions it returns
pub struct FilteringRangeResolver {
    inner: Arc<dyn VersionRangeResolver>,
    filter: fn(Vec<RangeVersion>) -> Vec<RangeVersion>,
}
impl FilteringRangeResolver {
    pub fn releases_only(inner: Arc<dyn VersionRangeResolver>) -> FilteringRangeResolver {
        FilteringRangeResolver {
            inner,
            filter: releases_only,
        }
    }

    pub fn releases_on_boundaries(inner: Arc<dyn VersionRangeResolver>) -> FilteringRangeResolver {
        FilteringRangeResolver {
            inner,
            filter: releases_on_boundaries,
        }
    }
}

#[async_trait]
impl VersionRangeResolver for FilteringRangeResolver {
    async fn resolve_version_range(&self, coordinate: &Coordinate, repositories: &[RepositorySource], context: &ResolutionContext) -> Result<RangeResult, VersionRangeResolutionError> {
        let result = self.inner.resolve_version_range(coordinate, repositories, context).await?;
        Ok(RangeResult {
            versions: (self.filter)(result.versions),
            ..result
        })
    }
}

/// Delegates to one of several named range resolution strategies. The strategy is picked from
///  the configuration on first use and kept for the dispatcher's lifetime; an unknown name
///  falls back to the default strategy.
pub struct StrategyDispatcher {
    default: Arc<dyn VersionRangeResolver>,
    strategies: BTreeMap<String, Arc<dyn VersionRangeResolver>>,
    selected: OnceLock<Arc<dyn VersionRangeResolver>>,
}
impl StrategyDispatcher {
    /// registers `default` as the default strategy, along with both release filters around it
    pub fn new(default: Arc<dyn VersionRangeResolver>) -> StrategyDispatcher {
        let mut result = StrategyDispatcher {
            default: default.clone(),
            strategies: BTreeMap::new(),
            selected: OnceLock::new(),
        };
        result.register(RELEASES_ONLY_STRATEGY, Arc::new(FilteringRangeResolver::releases_only(default.clone())));
        result.register(RELEASES_ON_BOUNDARIES_STRATEGY, Arc::new(FilteringRangeResolver::releases_on_boundaries(default.clone())));
        result.register(DEFAULT_STRATEGY, default);
        result
    }

    pub fn with_metadata(metadata: Arc<dyn MetadataSource>) -> StrategyDispatcher {
        StrategyDispatcher::new(Arc::new(DefaultVersionRangeResolver::new(metadata)))
    }

    /// Replaces a strategy with the same name. Registering a new default does not affect the
    ///  filters already wrapping the old one.
    pub fn register(&mut self, name: &str, strategy: Arc<dyn VersionRangeResolver>) {
        if name == DEFAULT_STRATEGY {
            self.default = strategy.clone();
        }
        self.strategies.insert(name.to_string(), strategy);
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.keys()
            .map(|s| s.as_str())
            .collect()
    }

    fn select(&self, config: &dyn Configuration) -> Arc<dyn VersionRangeResolver> {
        self.selected.get_or_init(|| {
            let name = config.get_or(keys::VERSION_RANGE_STRATEGY, DEFAULT_STRATEGY);
            match self.strategies.get(&name) {
                Some(strategy) => {
                    debug!("using version range strategy {:?}", name);
                    strategy.clone()
                }
                None => {
                    warn!("version range strategy {:?} is not registered, falling back to {:?} - registered strategies are {:?}", name, DEFAULT_STRATEGY, self.strategy_names());
                    self.default.clone()
                }
            }
        }).clone()
    }
}

#[async_trait]
impl VersionRangeResolver for StrategyDispatcher {
    async fn resolve_version_range(&self, coordinate: &Coordinate, repositories: &[RepositorySource], context: &ResolutionContext) -> Result<RangeResult, VersionRangeResolutionError> {
        let strategy = self.select(context.session.config.as_ref());
        strategy.resolve_version_range(coordinate, repositories, context).await
    }
}
