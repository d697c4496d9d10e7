//! Process-wide singletons: the immutable HRTF dataset and the background
//! deletion thread. Both are initialized once via [`library_init`], idempotent
//! across repeated calls, matching the ergonomics of the real library's
//! `syz_initialize` minus the C ABI.

use std::sync::{Arc, OnceLock};

use crate::command::{DeletionSender, DeletionThread};
use crate::panner::HrtfDataset;

struct Library {
    hrtf: Arc<HrtfDataset>,
    deletion: DeletionSender,
    // Kept alive for the process lifetime; never read directly again after
    // `DeletionSender` is cloned out, but dropping it would join-and-stop the
    // background thread.
    _deletion_thread: DeletionThread,
}

static LIBRARY: OnceLock<Library> = OnceLock::new();

/// Initializes process-wide engine state. Safe to call more than once; later
/// calls are a no-op. [`crate::Context::new`] calls this implicitly.
pub fn library_init() {
    LIBRARY.get_or_init(|| {
        tracing::info!("initializing synthizer-core library state");
        let (deletion_thread, deletion_sender) = DeletionThread::spawn();
        Library {
            hrtf: Arc::new(HrtfDataset::synthetic()),
            deletion: deletion_sender,
            _deletion_thread: deletion_thread,
        }
    });
}

/// Returns the shared HRTF dataset, initializing the library first if
/// needed.
pub fn hrtf_dataset() -> Arc<HrtfDataset> {
    library_init();
    LIBRARY.get().expect("library_init always populates LIBRARY").hrtf.clone()
}

/// Returns a sender for the background deletion thread, initializing the
/// library first if needed.
pub fn deletion_sender() -> DeletionSender {
    library_init();
    LIBRARY.get().expect("library_init always populates LIBRARY").deletion.clone()
}

/// Present for API symmetry with `library_init`. A `static OnceLock` is
/// never actually dropped — its contents are simply reclaimed by the OS at
/// process exit, so the background deletion thread is not joined on normal
/// shutdown. This is intentional: the process is exiting anyway, and there
/// is no per-process teardown this engine needs beyond what the OS already
/// does for us.
pub fn library_shutdown() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        library_init();
        let a = hrtf_dataset();
        library_init();
        let b = hrtf_dataset();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
