//! Shared ownership of options across threads.
//!
//! [`Options`] carries no synchronization of its own. Hosts that read the
//! options from one thread while a settings surface edits them from another
//! hold them behind this lock.

use crate::options::Options;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared options wrapper type.
pub type SharedOptions = Arc<RwLock<Options>>;

/// Create a new shared options instance.
pub fn new_shared_options(options: Options) -> SharedOptions {
    Arc::new(RwLock::new(options))
}

/// Clone the current options out of the lock.
pub fn snapshot(shared: &SharedOptions) -> Options {
    shared.read().clone()
}

/// Replace the options wholesale, e.g. after reloading a file.
pub fn replace(shared: &SharedOptions, options: Options) -> Options {
    std::mem::replace(&mut *shared.write(), options)
}
