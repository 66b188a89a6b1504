pub mod cache;
pub mod context;
pub mod descriptor_reader;
pub mod error;
pub mod merge;
pub mod range_resolver;
pub mod range_strategy;
pub mod version_resolver;

#[cfg(test)]
mod test_support;
