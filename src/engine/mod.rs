/// Search engine module
///
/// This module owns every outbound call to the document-search engine:
/// health probe, index creation, document writes, name search and seeding.
/// Each operation performs exactly one REST round trip (seeding performs one
/// per document) with an explicit deadline.

mod client;
mod schema;

#[cfg(test)]
pub(crate) mod fake;


pub use client::EngineClient;
pub use schema::{EngineErrorBody, IndexSchema, PartialUpdate};
