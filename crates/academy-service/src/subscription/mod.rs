//! Subscription operations outside the sweeps.

pub mod grace;

pub use grace::GraceService;
