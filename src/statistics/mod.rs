use std::sync::atomic::{AtomicU64, Ordering};

/// Store-wide statistics
///
/// Thread-safe statistics tracking for all engine operations.
/// Uses atomic counters for lock-free updates.
#[derive(Debug, Default)]
pub struct Statistics {
    // Mutations
    pub num_inserts: AtomicU64,
    pub num_batch_inserts: AtomicU64,
    pub num_removes: AtomicU64,
    pub bytes_written: AtomicU64,

    // Write visibility
    pub num_queued: AtomicU64,
    pub num_applied: AtomicU64,

    // Queries
    pub num_point_reads: AtomicU64,
    pub point_read_hits: AtomicU64,
    pub point_read_misses: AtomicU64,
    pub num_slices: AtomicU64,
    pub num_counts: AtomicU64,
    pub num_range_scans: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    #[inline]
    pub fn record_insert(&self, bytes: u64) {
        self.num_inserts.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_batch_insert(&self, bytes: u64) {
        self.num_batch_inserts.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.num_removes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_queued(&self) {
        self.num_queued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_applied(&self) {
        self.num_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_point_read(&self, hit: bool) {
        self.num_point_reads.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.point_read_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.point_read_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_slice(&self) {
        self.num_slices.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_count(&self) {
        self.num_counts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_range_scan(&self) {
        self.num_range_scans.fetch_add(1, Ordering::Relaxed);
    }
}
