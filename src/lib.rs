pub mod classify;
pub mod extract;
pub mod ingest;
pub mod intern;
pub mod models;
pub mod output;
pub mod tally;
