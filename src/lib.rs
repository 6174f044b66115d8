pub mod analyzers;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod naming;
pub mod output;
pub mod parser;
pub mod pipelines;
pub mod report;
