//! Bit error rate counting against a known pseudo random sequence.
//!
//! The counter starts out hunting: it collects received bits until it has seen `degree` of
//! them, then uses [`PrbsGenerator::sync_forw`] to put its own generator in the state the
//! transmitter must have been in. From then on every received bit is compared against the
//! generator's prediction. If too many errors turn up within one window, the counter assumes
//! it has lost sync and goes back to hunting.

use log::{info, warn};

use crate::error::PrbsError;
use crate::generator::PrbsGenerator;

/// Controls when a [`BerCounter`] decides it has lost sync.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BerConfig {
    /// Number of locked bits per error-counting window.
    pub window: u32,
    /// Sync is dropped once more than this many errors are seen in a single window.
    pub max_errors: u32,
}

impl Default for BerConfig {
    fn default() -> Self {
        BerConfig {
            window: 1024,
            max_errors: 256,
        }
    }
}

/// Running totals of a [`BerCounter`]. Only bits received while locked are counted.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BerStats {
    /// Bits compared against the reference sequence.
    pub bits: u64,
    /// Bits that did not match the reference sequence.
    pub errors: u64,
    /// Number of times sync was lost.
    pub sync_losses: u64,
}

impl BerStats {
    /// Fraction of compared bits that were wrong, or 0 if nothing was compared yet.
    pub fn rate(&self) -> f64 {
        if self.bits == 0 {
            0.0
        } else {
            self.errors as f64 / self.bits as f64
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SyncState {
    /// Collecting bits to sync on. `history` holds the most recent `filled` bits with the
    /// oldest in the LSB once it is full.
    Hunting { history: u32, filled: u32 },
    /// Predicting bits with the generator.
    Locked { window_bits: u32, window_errors: u32 },
}

impl SyncState {
    const HUNTING: SyncState = SyncState::Hunting {
        history: 0,
        filled: 0,
    };

    const LOCKED: SyncState = SyncState::Locked {
        window_bits: 0,
        window_errors: 0,
    };
}

/// Counts bit errors in a received stream that should follow a known polynomial.
#[derive(Debug, Clone)]
pub struct BerCounter {
    gen: PrbsGenerator,
    config: BerConfig,
    sync: SyncState,
    stats: BerStats,
}

impl BerCounter {
    /// Create a counter for streams produced by the given polynomial.
    pub fn new(poly: u32, config: BerConfig) -> Result<Self, PrbsError> {
        Ok(BerCounter {
            gen: PrbsGenerator::with_poly(poly)?,
            config,
            sync: SyncState::HUNTING,
            stats: Default::default(),
        })
    }

    /// Process one received bit.
    pub fn push(&mut self, bit: bool) {
        match self.sync {
            SyncState::Hunting {
                mut history,
                mut filled,
            } => {
                let degree = self.gen.degree();
                history = (history >> 1) | ((bit as u32) << (degree - 1));
                filled = (filled + 1).min(degree);
                // An all-zero history never occurs in a maximum length sequence and would
                // sync the generator into the all-zero state.
                if filled == degree && history != 0 {
                    self.gen.sync_forw(history);
                    info!("BER counter locked at state {:#010X}", self.gen.state());
                    self.sync = SyncState::LOCKED;
                } else {
                    self.sync = SyncState::Hunting { history, filled };
                }
            }
            SyncState::Locked {
                mut window_bits,
                mut window_errors,
            } => {
                self.stats.bits += 1;
                if self.gen.step() != bit {
                    self.stats.errors += 1;
                    window_errors += 1;
                }
                window_bits += 1;

                if window_errors > self.config.max_errors {
                    warn!(
                        "BER counter lost sync: {} errors in {} bits",
                        window_errors, window_bits
                    );
                    self.stats.sync_losses += 1;
                    self.sync = SyncState::HUNTING;
                } else if window_bits >= self.config.window {
                    self.sync = SyncState::LOCKED;
                } else {
                    self.sync = SyncState::Locked {
                        window_bits,
                        window_errors,
                    };
                }
            }
        }
    }

    /// Process every bit of `data`, each byte LSB first.
    pub fn push_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            for i in 0..8 {
                self.push(byte >> i & 1 != 0);
            }
        }
    }

    /// Whether the counter is currently synchronised to the stream.
    pub fn is_locked(&self) -> bool {
        matches!(self.sync, SyncState::Locked { .. })
    }

    pub fn stats(&self) -> BerStats {
        self.stats
    }

    pub fn config(&self) -> BerConfig {
        self.config
    }

    /// Drop sync and clear all statistics.
    pub fn reset(&mut self) {
        self.sync = SyncState::HUNTING;
        self.stats = Default::default();
    }
}
