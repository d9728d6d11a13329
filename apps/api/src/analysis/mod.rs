// CV analysis endpoint: multipart upload → scoped temp file → scanner → MatchReport.
// Extraction and matching are CPU/disk bound and run inside tokio::task::spawn_blocking.

pub mod handlers;
pub mod upload;
