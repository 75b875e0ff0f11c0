pub mod filter;
pub mod job;
pub mod join;
pub mod pipeline;
pub mod report;
pub mod rsi;
pub mod snapshot;
pub mod source;
