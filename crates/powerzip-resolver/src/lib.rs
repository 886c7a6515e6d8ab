//! Resolution pipeline: the analyzer and its strategy chain, injected
//! caches, address resolution, and dynamic probing.

pub mod address;
pub mod analyzer;
pub mod cache;
pub mod config;
pub mod prober;
pub mod request;
pub mod strategy;

pub use address::{AddressResolver, rank_matches};
pub use analyzer::{Analyzer, AnalyzerBuilder, default_chain};
pub use cache::{Cache, Clock, ManualClock, MemoryCache, NoCache, SystemClock};
pub use config::ResolverConfig;
pub use prober::Prober;
pub use request::{AnalyzeRequest, DEFAULT_USAGE_KWH, MIN_ADDRESS_LEN, USAGE_RANGE_KWH};
pub use strategy::{
    AddressStrategy, Attempt, PatternStrategy, ProbeStrategy, StaticStrategy, Strategy,
    StrategyContext,
};
