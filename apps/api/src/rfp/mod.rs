// RFP workflow: ingest an uploaded document, extract requirements, draft answers
// from the owner's library, and track review progress.

pub mod drafting;
pub mod extractor;
pub mod handlers;
pub mod ingest;
pub mod progress;
pub mod status;
pub mod store;
