//! Library orchestration: ingestion, asset publishing, edits and the
//! timeline clustering engine.

pub mod cluster;
pub mod edit;
pub mod ingest;
pub mod publisher;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cluster::{cluster_records, Cluster};
pub use edit::{EditError, RecordEditor, RecordPatch};
pub use ingest::{IngestPipeline, IngestRequest};
pub use publisher::AssetPublisher;
