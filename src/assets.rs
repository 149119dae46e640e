//! Decoded image assets and background loading.
//!
//! Image decoding runs on worker threads. Every load is tagged with an
//! [`AssetTicket`]; starting a new load for a slot cancels the previous one,
//! and completions that arrive for a superseded ticket are discarded, so the
//! last requested image always wins regardless of decode order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::error::{ThumbError, ThumbResult};
use crate::raster::{RasterImage, SizePx};

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// ImageAsset
// ============================================================================

/// Identifies one decoded image. Each [`ImageAsset::new`] gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(u64);

/// A decoded, immutable image shared between the editor and its layers.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    id: AssetId,
    image: Arc<RgbaImage>,
}

impl ImageAsset {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            id: AssetId(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed)),
            image: Arc::new(image),
        }
    }

    /// Decodes PNG, JPEG, WebP or any other format the `image` crate reads.
    pub fn decode(bytes: &[u8]) -> ThumbResult<Self> {
        RasterImage::decode(bytes).map(|raster| Self::new(raster.data))
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.image.width(), self.image.height())
    }
}

impl PartialEq for ImageAsset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Which image a load is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    Background,
    Logo,
}

/// Cooperative cancellation flag shared with a worker.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle for one requested load.
#[derive(Debug, Clone)]
pub struct AssetTicket {
    pub slot: AssetSlot,
    pub generation: u64,
    token: CancellationToken,
}

impl AssetTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Result of a finished load, as seen by the owner of the loader.
#[derive(Debug)]
pub enum LoadOutcome {
    Ready {
        slot: AssetSlot,
        asset: ImageAsset,
    },
    Failed {
        slot: AssetSlot,
        error: ThumbError,
    },
    /// A newer load for the slot was requested; this result was dropped.
    Stale { slot: AssetSlot, generation: u64 },
}

struct Completion {
    ticket: AssetTicket,
    result: ThumbResult<ImageAsset>,
}

// ============================================================================
// AssetLoader
// ============================================================================

/// Decodes images off the calling thread and hands back the newest result
/// per slot.
pub struct AssetLoader {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    current: HashMap<AssetSlot, AssetTicket>,
    next_generation: u64,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            current: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Issues a ticket for `slot`, cancelling any load in flight for it.
    pub fn begin(&mut self, slot: AssetSlot) -> AssetTicket {
        let ticket = AssetTicket {
            slot,
            generation: self.next_generation,
            token: CancellationToken::default(),
        };
        self.next_generation += 1;

        if let Some(previous) = self.current.insert(slot, ticket.clone()) {
            tracing::debug!(?slot, generation = previous.generation, "superseding load");
            previous.token.cancel();
        }
        ticket
    }

    /// Forgets any load in flight for `slot`; its result will be discarded.
    pub fn cancel(&mut self, slot: AssetSlot) {
        if let Some(previous) = self.current.remove(&slot) {
            previous.token.cancel();
        }
    }

    /// Starts decoding `bytes` on a worker thread.
    pub fn load(&mut self, slot: AssetSlot, bytes: Vec<u8>) -> AssetTicket {
        let ticket = self.begin(slot);
        let worker_ticket = ticket.clone();
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            if worker_ticket.is_cancelled() {
                return;
            }
            let result = ImageAsset::decode(&bytes);
            if worker_ticket.is_cancelled() {
                return;
            }
            // The receiver is gone when the loader was dropped.
            let _ = tx.send(Completion {
                ticket: worker_ticket,
                result,
            });
        });

        ticket
    }

    /// Delivers a result for `ticket` as if a worker had produced it.
    pub fn complete(&self, ticket: AssetTicket, result: ThumbResult<ImageAsset>) {
        let _ = self.tx.send(Completion { ticket, result });
    }

    /// Returns true while the newest load for `slot` has not been collected.
    pub fn is_pending(&self, slot: AssetSlot) -> bool {
        self.current.contains_key(&slot)
    }

    /// Collects every finished load without blocking.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            outcomes.push(self.resolve(completion));
        }
        outcomes
    }

    /// Blocks until no slot has a pending load or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Vec<LoadOutcome> {
        let deadline = Instant::now() + timeout;
        let mut outcomes = self.poll();

        while !self.current.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(completion) => outcomes.push(self.resolve(completion)),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(pending = self.current.len(), "timed out waiting for assets");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        outcomes
    }

    fn resolve(&mut self, completion: Completion) -> LoadOutcome {
        let Completion { ticket, result } = completion;
        let slot = ticket.slot;

        let is_current = self
            .current
            .get(&slot)
            .is_some_and(|current| current.generation == ticket.generation);
        if !is_current || ticket.is_cancelled() {
            return LoadOutcome::Stale {
                slot,
                generation: ticket.generation,
            };
        }

        self.current.remove(&slot);
        match result {
            Ok(asset) => LoadOutcome::Ready { slot, asset },
            Err(error) => LoadOutcome::Failed { slot, error },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
