//! Authentication seam for the honeydo workspace.
//!
//! The sync layer receives an [`AuthProvider`] by injection and only ever
//! asks it who is signed in, so identity backends can be swapped without
//! touching the view models. [`MemoryAuth`] is the bundled in-process
//! provider used by tests and the demo.

pub mod error;
pub mod memory;
pub mod provider;

pub use error::AuthError;
pub use memory::MemoryAuth;
pub use provider::{AuthProvider, AuthUser};
