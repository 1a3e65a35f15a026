//! # Simple QR
//!
//! A QR code generation engine for interactive front ends. A [`Generator`]
//! holds the configuration a user edits (content, charset, error-correction
//! level, sizing mode and size), turns it into a rendered code on demand, and
//! tells observers about every change. A [`Debouncer`] keeps regeneration from
//! running on every keystroke.
//!
//! # Architecture: Configure, Generate, Observe
//!
//! ```text
//! setters ──▶ Generator (DIRTY) ──generate_code──▶ SymbolEncoder ──▶ Symbol
//!                                                        │
//!                       SizingPolicy::render_result ◀────┘
//!                                │
//!                   rasterize ──▶ GrayImage (VALID) ──▶ ChangeBus listeners
//! ```
//!
//! The pieces are kept apart for two reasons:
//!
//! - **Testability**: sizing math is pure functions over integers, the
//!   encoder sits behind a trait with a recording mock, and the generator's
//!   state machine can be exercised without encoding a single real symbol.
//! - **Replaceability**: the encoder, the sizing policy and the thread a
//!   debounced action runs on are all trait objects or generics, chosen once.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generator`] | The state machine: settings, result, derived flags, change events |
//! | [`sizing`] | Fixed-size, best-fit and module-size policies plus their pure calculations |
//! | [`encoding`] | `SymbolEncoder` trait, the `qrcode`-backed encoder, charsets, capacity tables |
//! | [`debounce`] | Adaptive cancel-and-restart scheduler and UI-thread dispatch |
//! | [`events`] | Observable properties, change events and the listener bus |
//! | [`raster`] | Symbol → grayscale bitmap |
//! | [`payload`] | URL, Wi-Fi, vCard and geo content builders |
//! | [`config`] | `simple-qr.toml` loading, merging and validation |
//! | [`types`] | Shared value types (`Dimension`, `TriState`, levels, modes) |
//! | [`output`] | CLI summary formatting, text and JSON |
//! | [`logging`] | `tracing` subscriber setup for the CLI |
//!
//! # Design Decisions
//!
//! ## Policies Are Trait Objects
//!
//! The generator never branches on the sizing mode. Switching modes builds a
//! new `Box<dyn SizingPolicy>` and drops the old one, so a stale rendered
//! result from the previous mode cannot leak through. The requested size
//! carries over: a dimension the user asked for, or failing that the one they
//! last saw, seeds the new policy.
//!
//! ## Every Change Invalidates
//!
//! Any setter that changes a value discards the symbol, the image and the
//! derived flags before firing its one event. Setting an equal value does
//! nothing at all. A UI that shows [`Generator::get_image`] therefore never
//! shows a code that disagrees with the settings next to it.
//!
//! ## Derived Flags Are Three-Valued
//!
//! "Was the content encodable?" has no answer before the first generation.
//! [`TriState`](types::TriState) keeps that "not applicable" distinct from a
//! real `false`.
//!
//! ## Debounce Tracks Generation Cost
//!
//! The scheduler waits as long as the last generation took, clamped to
//! 10–100 ms by default. Small codes regenerate almost immediately; large
//! high-redundancy codes wait for the user to pause.

pub mod config;
pub mod debounce;
pub mod encoding;
pub mod events;
pub mod generator;
pub mod logging;
pub mod output;
pub mod payload;
pub mod raster;
pub mod sizing;
pub mod types;

pub use debounce::Debouncer;
pub use generator::{Generator, GeneratorError, GeneratorStatus};
