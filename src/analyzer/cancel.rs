use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Location,
};

/// Cooperative cancellation flag shared between an analysis and its caller.
///
/// Checked when entering an included file, when resolving a subproject and
/// before each loop body.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self, location: Location) -> Result<(), Error> {
        if self.is_cancelled() {
            return Err(Error::new(ErrorImpl::Cancelled, location));
        }
        Ok(())
    }
}
