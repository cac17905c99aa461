// * Backlink Intelligence Engine
// * Link toxicity scoring, domain health, anchor-text risk, lost links,
// * disavow output and concurrent opportunity discovery

pub mod analyzer;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod model;
pub mod ops;

pub use analyzer::{BacklinkEngine, BacklinkEngineBuilder};
pub use config::{ConfigError, DiscoveryConfig, EngineConfig, HeuristicTables};
pub use errors::{EngineError, SourceError};
