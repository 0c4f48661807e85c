//! # rf-reels - Reel Spin-and-Stop Kinematics for FluxForge Cabinets
//!
//! Deterministic, frame-stepped simulation of a three-reel slot cabinet.
//! Each reel scrolls a circular symbol strip at full speed, then runs a
//! planned linear speed ramp that lands the strip exactly on a cell boundary.
//!
//! ## Features
//!
//! - **Kinematics Solver**: bounded search for an aligned deceleration plan
//! - **Reel Animator**: per-reel IDLE → SPINNING → DECELERATING → STOPPED machine
//! - **Spin Coordinator**: left-to-right stop cascade on a simulated clock
//! - **Outcome Evaluator**: three-of-a-kind / two-of-a-kind payout rule
//! - **Batch Simulation**: headless session statistics for seeded runs
//!
//! ## Architecture
//!
//! ```text
//! SpinCoordinator
//!     │
//!     ├── ReelAnimator × 3
//!     │     ├── ReelStrip (reshuffled per spin)
//!     │     └── DecelPlan (from solver, once per spin)
//!     ├── PayoutRule
//!     └── RngCore (single seeded source)
//!           │
//!           v
//!     advance(dt) → TickReport { events, outcome }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod payout;
pub mod reel;
pub mod rng;
pub mod solver;
pub mod stats;
pub mod symbols;

pub use config::*;
pub use coordinator::*;
pub use error::*;
pub use ledger::*;
pub use payout::*;
pub use reel::*;
pub use rng::*;
pub use solver::*;
pub use stats::*;
pub use symbols::*;
