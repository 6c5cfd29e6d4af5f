//! ISR-to-task fill signalling.
//!
//! Each half has two counters with one writer each:
//!
//! - `completed[h]` is written only by the sink's completion handler.
//! - `serviced[h]` is written only by the task loop.
//!
//! A half needs filling while the two differ. Both sides use plain atomic
//! loads and stores, so this works on cores without read-modify-write
//! atomics (Cortex-M0).
//!
//! # Usage
//!
//! ```ignore
//! static FLAGS: FillFlags = FillFlags::new();
//!
//! // DMA half-transfer ISR
//! FLAGS.on_half_complete();
//! // DMA transfer-complete ISR
//! FLAGS.on_transfer_complete();
//!
//! // Task loop
//! if FLAGS.needs_fill(Half::First) {
//!     /* fill */
//!     FLAGS.clear(Half::First);
//! }
//! ```

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use super::Half;

/// Completion flags shared between the sink ISR and the scheduler.
pub struct FillFlags {
    completed: [AtomicU32; 2],
    serviced: [AtomicU32; 2],
    /// Half the sink is transmitting now.
    playing: AtomicU8,
}

impl FillFlags {
    pub const fn new() -> Self {
        FillFlags {
            completed: [AtomicU32::new(0), AtomicU32::new(0)],
            serviced: [AtomicU32::new(0), AtomicU32::new(0)],
            playing: AtomicU8::new(Half::First as u8),
        }
    }

    // ── ISR side ────────────────────────────────────────────────────────

    fn complete(&self, half: Half) {
        let slot = &self.completed[half.index()];
        // Single writer: load then store is not a race.
        let next = slot.load(Ordering::Relaxed).wrapping_add(1);
        slot.store(next, Ordering::Release);
        self.playing.store(half.other() as u8, Ordering::Relaxed);
    }

    /// First half finished transmitting.
    pub fn on_half_complete(&self) {
        self.complete(Half::First);
    }

    /// Second half finished transmitting.
    pub fn on_transfer_complete(&self) {
        self.complete(Half::Second);
    }

    // ── Task side ───────────────────────────────────────────────────────

    /// Whether `half` completed since it was last serviced.
    pub fn needs_fill(&self, half: Half) -> bool {
        let i = half.index();
        self.completed[i].load(Ordering::Acquire) != self.serviced[i].load(Ordering::Relaxed)
    }

    /// Mark `half` as serviced.
    pub fn clear(&self, half: Half) {
        let i = half.index();
        let completed = self.completed[i].load(Ordering::Acquire);
        self.serviced[i].store(completed, Ordering::Relaxed);
    }

    /// Mark both halves as serviced.
    pub fn clear_all(&self) {
        for half in Half::ALL {
            self.clear(half);
        }
    }

    /// Half the sink is transmitting now.
    pub fn playing(&self) -> Half {
        match self.playing.load(Ordering::Relaxed) {
            0 => Half::First,
            _ => Half::Second,
        }
    }
}

impl Default for FillFlags {
    fn default() -> Self {
        Self::new()
    }
}
