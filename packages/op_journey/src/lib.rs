#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Tracks how much wall-clock time one in-flight operation spends in each
//! named stage of processing, and folds every completed operation into
//! process-wide running statistics usable for live diagnostics.
//!
//! The core pieces:
//! - [`Stage`] - the closed, ordinally-indexed set of processing stages
//! - [`Journey`] - the per-operation phase timer, driven by the operation's
//!   own execution path
//! - [`JourneySlot`] - the attachment point a host embeds in its
//!   per-operation object
//! - [`ScopedStage`] - an RAII guard that enters a stage and restores the
//!   previous one on every exit path
//! - [`Observer`] - the process-wide lock-free aggregator every finishing
//!   journey reports into
//! - [`Tracking`] - the process-startup configuration handle
//!
//! # Simple usage
//!
//! ```
//! use op_journey::{JourneySlot, Stage, Tracking};
//!
//! // Once, at process startup.
//! let tracking = Tracking::enabled();
//!
//! // Embedded in the host's per-operation object, enabled at operation start.
//! let slot = JourneySlot::new();
//! slot.enable(&tracking);
//!
//! // The execution path announces stages as it moves through processing.
//! slot.enter_stage(Stage::CheckAuthorization);
//! // ... authorization work ...
//! slot.enter_stage(Stage::Running);
//!
//! {
//!     // Scoped form: restores the previous stage on any exit path.
//!     let _guard = slot.scoped(Stage::Egress);
//!     // ... write the response ...
//! }
//!
//! // Dropping the slot at operation teardown finalizes the journey, reports
//! // it to the observer and emits the per-operation breakdown at debug level.
//! drop(slot);
//!
//! let observer = tracking.observer().expect("tracking is enabled");
//! println!("{observer}");
//! ```
//!
//! # Disabled tracking
//!
//! When tracking is disabled no journey is ever created and no observer
//! exists; every instrumentation call site reduces to checking an empty slot:
//!
//! ```
//! use op_journey::{JourneySlot, Stage, Tracking};
//!
//! let tracking = Tracking::disabled();
//!
//! let slot = JourneySlot::new();
//! slot.enable(&tracking);
//!
//! // All of these are no-ops.
//! slot.enter_stage(Stage::Egress);
//! let _guard = slot.scoped(Stage::Released);
//!
//! assert!(!slot.is_active());
//! assert!(tracking.observer().is_none());
//! ```
//!
//! # Threading
//!
//! A journey has exactly one writer: [`Journey`], [`JourneySlot`] and
//! [`ScopedStage`] are single-threaded types, pinned to the thread driving
//! their operation. The [`Observer`] is the opposite - fully thread-safe,
//! accepting captures from arbitrarily many finishing operations at once
//! without any lock. Its rendered documents are best-effort snapshots; see
//! [`Observer::append`] for the consistency contract.

mod journey;
mod journey_slot;
mod observer;
mod pal;
mod scoped_stage;
mod stage;
mod tracking;

pub use journey::Journey;
pub use journey_slot::JourneySlot;
pub use observer::Observer;
pub use scoped_stage::ScopedStage;
pub use stage::Stage;
pub use tracking::Tracking;
