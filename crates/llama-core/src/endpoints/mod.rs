//! Endpoint methods on [`LlamaClient`](crate::LlamaClient), grouped by API family.

mod bridges;
mod charts;
mod mappings;
mod tvl;
