use log::trace;

use crate::config::TaggerHandle;
use crate::error::Result;
use crate::native::Engine;

/// One engine session, destroyed when the guard goes out of scope.
///
/// The raw handle never leaves this type.
pub(crate) struct Tagger<'e> {
    engine: &'e dyn Engine,
    handle: TaggerHandle,
}

impl<'e> Tagger<'e> {
    pub(crate) fn acquire(engine: &'e dyn Engine) -> Result<Self> {
        let handle = engine.create_handle()?;
        trace!("acquired mecab handle {handle:p}");
        Ok(Self { engine, handle })
    }

    pub(crate) fn analyze(&self, line: &[u8]) -> Result<Vec<u8>> {
        self.engine.analyze(self.handle, line)
    }
}

impl Drop for Tagger<'_> {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        trace!("releasing mecab handle {:p}", self.handle);
        self.engine.destroy_handle(self.handle);
        self.handle = std::ptr::null_mut();
    }
}

/// Runs `body` with a fresh handle, releasing it on every exit path
/// (including an unwinding panic).
pub(crate) fn with_tagger<T>(
    engine: &dyn Engine,
    body: impl FnOnce(&Tagger<'_>) -> Result<T>,
) -> Result<T> {
    let tagger = Tagger::acquire(engine)?;
    body(&tagger)
}
