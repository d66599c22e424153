//! Platform abstraction layer for monotonic clock access.
//!
//! This module provides a platform abstraction that allows switching between
//! the real monotonic clock and a fake implementation whose time only advances
//! when a test says so, making interval arithmetic in tests exact.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
