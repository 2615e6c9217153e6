//! PriceLab Core — domain bar type, provider adapters, acquisition fallback,
//! synthetic series.
//!
//! This crate contains the data half of the pipeline:
//! - Canonical daily OHLCV bar and its invariants
//! - Source adapters for live market data vendors (Finnhub, Alpha Vantage)
//! - Acquisition state machine with vendor priority and synthetic fallback
//! - Bounded-random-walk series generator for demo mode

pub mod config;
pub mod data;
pub mod domain;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses a task boundary is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<data::Provenance>();
        require_sync::<data::Provenance>();
        require_send::<data::FetchError>();
        require_sync::<data::FetchError>();
        require_send::<data::Acquisition>();
        require_sync::<data::Acquisition>();
        require_send::<config::SourceConfig>();
        require_sync::<config::SourceConfig>();
    }
}
