//! Host-independent core of the PIVOT accessibility widget.
//!
//! Everything in here is plain Rust with no browser bindings: the section
//! model served by the backend, the text-match engine that maps clicked host
//! text onto sections, the persisted preference store, panel geometry and
//! the session state machine that drives views and media playback. The
//! `pivot-widget` crate wires these to a live page.

pub mod config;
pub mod layout;
pub mod modality;
pub mod preferences;
pub mod sections;
pub mod session;
pub mod text_match;
