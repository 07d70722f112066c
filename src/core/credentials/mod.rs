//! Quota-aware credential rotation
//!
//! Keeps a pool of interchangeable API keys for one upstream family alive by
//! always handing out the highest-priority key that still has quota left.
//!
//! ```rust,ignore
//! use recipe_gateway::core::credentials::{CredentialPool, CredentialRotator};
//!
//! let pool = CredentialPool::discover("SPOONACULAR_API_KEY", |k| std::env::var(k).ok());
//! let rotator = CredentialRotator::new("spoonacular", pool, 150);
//! if let Some(key) = rotator.select_credential() {
//!     // call upstream with `key`, then:
//!     rotator.record_use(&key);
//! }
//! ```

pub mod clock;
pub mod pool;
pub mod rotator;
pub mod types;


pub use clock::{Clock, ManualClock, SystemClock};
pub use pool::CredentialPool;
pub use rotator::CredentialRotator;
pub use types::{CredentialStats, CredentialUsage};
