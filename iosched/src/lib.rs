//! A disk io request scheduler simulator: a one-track-per-tick head, five
//! head disciplines, and per-request service statistics.

pub mod policy;
pub mod request;
pub mod sim;

pub use policy::DiskPolicy;
pub use request::IoRequest;
pub use sim::{DiskSimulator, Options};
