use std::sync::atomic::{AtomicU64, Ordering};

/// Track Hipee codec metrics without external dependencies.
pub(crate) struct Metrics;

static ENCODED_FRAMES: AtomicU64 = AtomicU64::new(0);
static DECODED_FRAMES: AtomicU64 = AtomicU64::new(0);
static CHECKSUM_FAILURES: AtomicU64 = AtomicU64::new(0);
static UNKNOWN_COMMANDS: AtomicU64 = AtomicU64::new(0);
static MALFORMED_FRAMES: AtomicU64 = AtomicU64::new(0);
static ENCODE_ERRORS: AtomicU64 = AtomicU64::new(0);

// Indexed by command id byte; covers ids the registry does not know.
static COMMAND_COUNTERS: [AtomicU64; 256] = [const { AtomicU64::new(0) }; 256];

/// Direction of frame flow for counting.
#[derive(Clone, Copy)]
pub(crate) enum FrameDirection {
    Encoded,
    Decoded,
}

/// Reason a frame was refused or flagged.
#[derive(Clone, Copy)]
pub(crate) enum FrameFault {
    Checksum,
    UnknownCommand,
    Malformed,
    Encode,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_frame(direction: FrameDirection, command_id: u8) {
        match direction {
            FrameDirection::Encoded => ENCODED_FRAMES.fetch_add(1, Ordering::Relaxed),
            FrameDirection::Decoded => DECODED_FRAMES.fetch_add(1, Ordering::Relaxed),
        };
        COMMAND_COUNTERS[usize::from(command_id)].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fault(fault: FrameFault) {
        let counter = match fault {
            FrameFault::Checksum => &CHECKSUM_FAILURES,
            FrameFault::UnknownCommand => &UNKNOWN_COMMANDS,
            FrameFault::Malformed => &MALFORMED_FRAMES,
            FrameFault::Encode => &ENCODE_ERRORS,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            encoded_frames: ENCODED_FRAMES.load(Ordering::Relaxed),
            decoded_frames: DECODED_FRAMES.load(Ordering::Relaxed),
            checksum_failures: CHECKSUM_FAILURES.load(Ordering::Relaxed),
            unknown_commands: UNKNOWN_COMMANDS.load(Ordering::Relaxed),
            malformed_frames: MALFORMED_FRAMES.load(Ordering::Relaxed),
            encode_errors: ENCODE_ERRORS.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn command_count(command_id: u8) -> u64 {
        COMMAND_COUNTERS[usize::from(command_id)].load(Ordering::Relaxed)
    }
}

/// Lightweight snapshot of codec counters.
///
/// Counters are process-wide and only ever grow.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Frames produced by the encoder
    pub encoded_frames: u64,
    /// Frames successfully decoded
    pub decoded_frames: u64,
    /// Frames whose byte sum was not zero, tolerated or not
    pub checksum_failures: u64,
    /// Frames carrying a command id with no schema
    pub unknown_commands: u64,
    /// Frames refused for size, magic or length problems
    pub malformed_frames: u64,
    /// Encode calls that failed
    pub encode_errors: u64,
}

impl MetricsSnapshot {
    /// Total decode failures and tolerated checksum failures.
    #[must_use]
    pub fn receive_faults(&self) -> u64 {
        self.checksum_failures + self.unknown_commands + self.malformed_frames
    }
}

/// Snapshot of the process-wide codec counters.
#[must_use]
pub fn metrics() -> MetricsSnapshot {
    Metrics::totals()
}

/// Frames encoded or decoded with the given command id so far.
#[must_use]
pub fn command_count(command_id: u8) -> u64 {
    Metrics::command_count(command_id)
}
