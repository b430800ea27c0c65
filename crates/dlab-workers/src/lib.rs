//! Worker protocols that compete for shared resources: the naive
//! protocol that can deadlock, the retry-with-backoff protocol, and the
//! Banker-negotiating protocol.

pub mod banker_worker;
pub mod common;
pub mod naive;
pub mod retry;
pub mod seed;

pub use banker_worker::BankerWorker;
pub use common::WorkerRecord;
pub use naive::NaiveWorker;
pub use retry::RetryWorker;
pub use seed::rng_from;
