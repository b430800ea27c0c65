//! Core types and engines for the deadlock concurrency laboratory.
//!
//! This crate holds the three hard, shared pieces of the lab: the exclusive resource
//! primitive ([`resource`]), the Banker safety engine ([`banker`]), and the wait-for
//! graph / cycle detector ([`detector`]), plus the small process/resource data model
//! the discrete-time simulator walks ([`model`]).

pub mod banker;
pub mod detector;
pub mod error;
pub mod model;
pub mod resource;

pub use banker::{Banker, BankerSnapshot};
pub use detector::WaitForGraph;
pub use error::{DlabError, DlabResult};
pub use model::{Process, ProcessState, Resource};
pub use resource::ResourceCell;
