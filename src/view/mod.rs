//! Display side of the shell
//!
//! - `surface.rs` - The `DisplaySurface` capability trait and the shared `Terminal` handle
//! - `tracked.rs` - Crossterm-backed surface that models the cursor itself

pub mod surface;
pub mod tracked;

pub use surface::{DisplaySurface, Terminal};
pub use tracked::{CursorTracker, SharedBuffer, TrackedSurface};
