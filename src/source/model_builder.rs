use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::maven::descriptor::ParsedModel;
use crate::source::artifact_fetcher::FetchedFile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelBuildError {
    /// a parent or imported descriptor could not be found
    #[error("unresolvable reference to {reference} in {path}")]
    UnresolvableReference {
        path: String,
        reference: String,
    },
    #[error("invalid descriptor {path}: {reason}")]
    Invalid {
        path: String,
        reason: String,
    },
}

/// Values available for `${...}` expressions while building a model. User properties take
///  precedence over system properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpolationContext {
    pub properties: BTreeMap<String, String>,
}
impl InterpolationContext {
    pub fn new(system_properties: &BTreeMap<String, String>, user_properties: &BTreeMap<String, String>) -> InterpolationContext {
        let mut properties = system_properties.clone();
        properties.extend(user_properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        InterpolationContext { properties }
    }
}

/// Turns a descriptor file into its effective model, resolving inheritance and interpolation
#[async_trait]
pub trait ModelBuilder: Send + Sync {
    async fn build(&self, file: &FetchedFile, context: &InterpolationContext) -> Result<ParsedModel, ModelBuildError>;
}
