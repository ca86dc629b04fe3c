pub mod ingest;
pub mod serve;

pub use ingest::ingest_command;
pub use serve::serve_command;
