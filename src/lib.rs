// Library exports for testing and potential library use
//
// # Lock Usage Policy
//
// Every lock in the workspace is a `parking_lot` lock. Per window the order
// is content, then state; the surface lock is only ever taken with
// `try_lock()` so a second paint defers instead of blocking. The session's
// window map is never held while a window lock is taken: clone the
// `Arc<Window>` out and drop the guard first.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod events;
pub mod replay;
pub mod session;

pub use events::{DecodeError, FloatAnchor, HighlightAttrs, HighlightInfo, OptionValue, RedrawEvent, decode_batch};
pub use replay::{CollectingPresenter, ReplayStats, Replayer};
pub use session::Session;
