//! Muster target resolution.
//!
//! A `TargetPicker` is owned by one picker screen. It stamps each resolve
//! request with a sequence number; `TargetResolver` runs the collaborator call
//! without holding the picker, and the picker only merges the outcome of the
//! latest request it issued.

#![forbid(unsafe_code)]

pub mod config;
pub mod debounce;
pub mod picker;
pub mod resolver;

pub use config::ResolverConfig;
pub use debounce::spawn_debounce;
pub use picker::{AcceptOutcome, ResolveIntent, ResolveRequest, TargetPicker};
pub use resolver::{ResolutionResult, ResolveOutcome, TargetResolver};
