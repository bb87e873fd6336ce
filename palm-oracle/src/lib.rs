//! palm-oracle: narrative generation for Palm Insight results, and the async
//! host that runs the flow controller's timers and requests.

pub mod adapter;
pub mod config;
pub mod driver;
pub mod error;
pub mod factory;
pub mod prompt;
pub mod providers;
pub mod traits;

pub use adapter::{DEFAULT_TIMEOUT, DEFAULT_TIMEZONE, InsightAdapter, InsightOutcome};
pub use config::*;
pub use driver::drive;
pub use error::ProviderError;
pub use factory::*;
pub use traits::*;
