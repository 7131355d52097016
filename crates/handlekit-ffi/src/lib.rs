#![deny(clippy::all)]
//! C ABI over the process-wide handle registry.
//!
//! Two surfaces are exported:
//! - the compact surface (`dashmap_*`, `segqueue_*`), which only passes integers and
//!   answers 0 for "absent", "empty" and misuse alike;
//! - the status surface (`handlekit_*_try_*`), which returns an [`HkStatus`] and writes
//!   payloads through out-pointers.
//!
//! After any compact call, `handlekit_last_status` reports what happened on the calling
//! thread, so a caller can still tell a stored 0 from an absent key.
//!
//! The matching C and C++ declarations live in `include/handlekit.h`.

pub mod map;
pub mod queue;
pub mod status;

pub use map::*;
pub use queue::*;
pub use status::*;

use handlekit_core::{init_logging, ConfigManager, HandleKitError};

/// Handle type on the C side (`uintptr_t`).
pub type HandleT = usize;

/// Install a stderr tracing subscriber configured from `.handlekit.toml` and
/// `HANDLEKIT_*` variables. Does nothing if the host already installed one.
#[no_mangle]
pub extern "C" fn handlekit_init_logging() -> HkStatus {
    let installed = ConfigManager::load().and_then(|manager| init_logging(&manager.config().logging));
    match installed {
        Ok(true) => {
            tracing::debug!("handlekit logging initialised");
            HkStatus::Ok
        }
        Ok(false) => HkStatus::Ok,
        Err(e) => report("handlekit_init_logging", &HandleKitError::from(e)),
    }
}
