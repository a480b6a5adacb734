//! Per-domain client wrappers.
//!
//! Thin typed facades composed from the [`crate::registry::ClientRegistry`]
//! and the [`crate::caller::Caller`]. They contain no call logic of their
//! own; each one names the backend it fronts and maps its methods onto the
//! generic adapter.
pub mod user;
