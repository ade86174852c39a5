//! # Batch Decoding
//!
//! Fans inputs out over a worker pool built for the call. The pool is scoped:
//! every worker thread has exited by the time the call returns.
//!
//! ## Ordering
//!
//! Results are written into a pre-sized vector, slot `i` for input `i`, so
//! completion order never shows through. Each input gets its own
//! [`Decoder`]; the only shared state is the read-only input list.
//!
//! ## Failures
//!
//! A failing input is reported in its own slot and never aborts the batch.
//! A panic inside a codec is caught and reported as a decode error for that
//! input. Only a bad worker count or a pool that cannot be built fails the
//! call.

use crate::config::DecodeConfig;
use crate::decoder::Decoder;
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;
use crate::tensor::TensorBuffer;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, instrument, warn};

/// Format and dimensions detected for one batch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub format: Format,
    /// `None` when probing never succeeded.
    pub dims: Option<DimensionDescriptor>,
}

/// Outcome of decoding one batch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub format: Format,
    pub dims: Option<DimensionDescriptor>,
    pub result: Result<TensorBuffer>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Split into the metadata record and the tensor-or-error.
    pub fn into_parts(self) -> (ItemRecord, Result<TensorBuffer>) {
        (
            ItemRecord {
                format: self.format,
                dims: self.dims,
            },
            self.result,
        )
    }
}

/// Parallel decoder for many independent buffers.
#[derive(Debug, Clone)]
pub struct BatchDecoder {
    config: DecodeConfig,
}

impl BatchDecoder {
    pub fn new(config: DecodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode every input using [`DecodeConfig::default_workers`] workers.
    pub fn unpack_all<B>(&self, inputs: &[B]) -> Result<Vec<BatchItem>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.unpack_many(inputs, self.config.default_workers)
    }

    /// Decode every input on `worker_count` workers.
    ///
    /// Returns one item per input, in input order. At most `inputs.len()`
    /// workers are started.
    ///
    /// # Errors
    ///
    /// [`UnpackError::InvalidConfig`] when `worker_count` is zero or the pool
    /// cannot be built. Per-input failures are reported in the items.
    #[instrument(skip(self, inputs), fields(items = inputs.len()))]
    pub fn unpack_many<B>(&self, inputs: &[B], worker_count: usize) -> Result<Vec<BatchItem>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.run_batch(inputs, worker_count, Decoder::unpack)
    }

    fn run_batch<B, F>(&self, inputs: &[B], worker_count: usize, decode: F) -> Result<Vec<BatchItem>>
    where
        B: AsRef<[u8]> + Sync,
        F: Fn(&mut Decoder, &[u8]) -> Result<TensorBuffer> + Sync,
    {
        if worker_count == 0 {
            return Err(UnpackError::InvalidConfig(
                "worker_count must be > 0".to_string(),
            ));
        }
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let workers = worker_count.min(inputs.len());
        let (slots, stopped) = self.run_scoped(workers, |pool| {
            let mut slots = Vec::with_capacity(inputs.len());
            pool.install(|| {
                inputs
                    .par_iter()
                    .map(|input| self.decode_guarded(input.as_ref(), &decode))
                    .collect_into_vec(&mut slots);
            });
            slots
        })?;

        let failed = slots.iter().filter(|item| !item.is_ok()).count();
        info!(workers, stopped, failed, "Batch decode finished");
        Ok(slots)
    }

    /// Run `job` on a pool of `workers` threads.
    ///
    /// Returns the job's result and the number of workers that exited; all of
    /// them have by the time this returns.
    fn run_scoped<R>(&self, workers: usize, job: impl FnOnce(&ThreadPool) -> R) -> Result<(R, usize)> {
        let prefix = self.config.thread_name_prefix.clone();
        let stopped = AtomicUsize::new(0);
        let result = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |idx| format!("{prefix}-{idx}"))
            .build_scoped(
                |thread| {
                    thread.run();
                    stopped.fetch_add(1, Ordering::SeqCst);
                },
                job,
            )
            .map_err(|e| UnpackError::InvalidConfig(format!("failed to build worker pool: {e}")))?;
        Ok((result, stopped.into_inner()))
    }

    fn decode_guarded<F>(&self, bytes: &[u8], decode: &F) -> BatchItem
    where
        F: Fn(&mut Decoder, &[u8]) -> Result<TensorBuffer>,
    {
        let mut decoder = Decoder::from_validated(self.config.clone());
        let result = panic::catch_unwind(AssertUnwindSafe(|| decode(&mut decoder, bytes)))
            .unwrap_or_else(|payload| {
                let format = decoder.format();
                let reason = format!("decoder panicked: {}", panic_message(&*payload));
                warn!(%format, len = bytes.len(), %reason, "Recovered from decoder panic");
                Err(UnpackError::decode(format, reason))
            });
        BatchItem {
            format: decoder.format(),
            dims: decoder.dims(),
            result,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string payload"
    }
}
