//! Data acquisition: provider trait, live adapters, fallback orchestration,
//! and the synthetic series generator.

pub mod acquire;
pub mod alpha_vantage;
pub mod finnhub;
pub mod provider;
pub mod synthetic;

pub use acquire::{next_state, AcquireError, AcquireState, Acquired, Acquisition, AttemptOutcome, Provenance};
pub use alpha_vantage::AlphaVantageProvider;
pub use finnhub::FinnhubProvider;
pub use provider::{DataProvider, FetchError};
