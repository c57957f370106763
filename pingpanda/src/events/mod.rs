//! Event ingestion.
//!
//! - [`validation`]: request body parsing and the category name rule
//! - [`embed`]: rendering the Discord notification for an event
//! - [`store`]: the persistence seam the pipeline runs against
//! - [`pipeline`]: the ingestion flow itself

pub mod embed;
pub mod pipeline;
pub mod store;
pub mod validation;

pub use pipeline::Ingestor;
