use crate::tensor::Error;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    io::Write,
    sync::{Arc, Mutex},
};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// A device that allocates tensors on the heap and runs every kernel on the
/// calling thread.
///
/// Besides the random number generator used by the `sample_*` methods, the
/// device owns the output sink that the `print` op writes to. It defaults to
/// stdout:
///
/// ```rust
/// # use gradmap_core::prelude::*;
/// let dev = Cpu::seed_from_u64(7).with_sink(std::io::sink());
/// ```
#[derive(Clone)]
pub struct Cpu {
    pub(crate) rng: Arc<Mutex<StdRng>>,
    pub(crate) sink: Sink,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::seed_from_u64(0)
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu").finish_non_exhaustive()
    }
}

impl Cpu {
    /// Constructs rng with the given seed. Output goes to stdout.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            sink: Arc::new(Mutex::new(Box::new(std::io::stdout()))),
        }
    }

    /// Replaces the output sink. Clones of the returned device share it.
    pub fn with_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.sink = Arc::new(Mutex::new(Box::new(sink)));
        self
    }

    /// Writes `text` to the output sink and flushes it.
    pub(crate) fn emit(&self, text: &str) -> Result<(), Error> {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}
