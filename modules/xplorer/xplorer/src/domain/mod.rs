pub mod aggregator;
pub mod collection;
pub mod enrichment;
pub mod error;
pub mod formatters;
pub mod geo_cache;
pub mod node;

#[cfg(test)]
pub(crate) mod test_support;
