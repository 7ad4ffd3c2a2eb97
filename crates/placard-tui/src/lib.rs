//! Local terminal runtime for Placard
//!
//! A thin shell over [`placard_app::Page`] that provides terminal-specific
//! I/O: crossterm for keyboard events, ratatui for rendering. All screen
//! logic lives in the pure state machine; this crate only acquires the
//! terminal, translates input, and draws frames.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod runtime;
pub mod ui;

pub use placard_app::{KeyInput, Page, PageAction, PageEvent};
pub use runtime::{Runtime, RuntimeError};
