pub mod ask;
pub mod ingest;
pub mod liveness;
pub mod readiness;
pub mod resolve;
