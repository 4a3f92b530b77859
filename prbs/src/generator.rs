//! The polynomial shift register itself.

use std::iter::FusedIterator;

use log::{debug, trace, warn};

use crate::catalogue::Poly;
use crate::error::PrbsError;

/// Pseudo random binary sequence generator using polynomial division in GF(2).
///
/// A freshly constructed generator is unconfigured: every field is zero and only
/// [`set_poly`](Self::set_poly) may be called. Once a polynomial is set, `state` always fits
/// in `mask` and is never zero unless one of the synchronisation or CRC drain operations
/// was explicitly driven there.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrbsGenerator {
    /// Current contents of the shift register.
    state: u32,
    /// Feedback polynomial, XORed into the register whenever a 1 is shifted out.
    poly: u32,
    /// `degree` ones, starting from bit 0.
    mask: u32,
    /// Single bit just below the top of `mask`. Only used by `sync_back`.
    high_bit: u32,
    /// Order of the polynomial.
    degree: u32,
}

impl PrbsGenerator {
    /// Create a new, unconfigured generator.
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a generator configured with the given polynomial, with the register set to all
    /// ones.
    pub fn with_poly(poly: u32) -> Result<Self, PrbsError> {
        let mut gen = Self::new();
        gen.set_poly(poly)?;
        Ok(gen)
    }

    /// Defines the polynomial to be used and sets the state to all ones.
    ///
    /// See the [`catalogue`](crate::catalogue) module for how a polynomial is encoded. Calling
    /// this again fully reconfigures the generator, including resetting the state.
    pub fn set_poly(&mut self, poly: u32) -> Result<(), PrbsError> {
        if poly == 0 {
            return Err(PrbsError::ZeroPolynomial);
        }
        self.configure(poly);
        Ok(())
    }

    fn configure(&mut self, poly: u32) {
        let unused = poly.leading_zeros();
        self.poly = poly;
        self.mask = u32::MAX >> unused;
        self.degree = 32 - unused;
        self.state = self.mask;
        self.high_bit = (self.mask >> 1) + 1;
        debug!(
            "Configured polynomial {:#010X}: degree {}, mask {:#010X}",
            self.poly, self.degree, self.mask
        );
    }

    /// Sets the state of the register to `state`, masked to the degree of the polynomial.
    ///
    /// Fails if no polynomial has been set, or if the masked value is zero.
    pub fn set_state(&mut self, state: u32) -> Result<(), PrbsError> {
        if !self.is_configured() {
            return Err(PrbsError::Unconfigured);
        }
        let masked = state & self.mask;
        if masked == 0 {
            return Err(PrbsError::ZeroState(state));
        }
        self.state = masked;
        Ok(())
    }

    /// Returns the next pseudo random bit.
    ///
    /// # Panics
    ///
    /// Panics if no polynomial has been set.
    #[inline]
    pub fn step(&mut self) -> bool {
        self.check_configured();
        let bit = self.state & 1 != 0;
        self.state >>= 1;
        if bit {
            self.state ^= self.poly;
        }
        bit
    }

    /// Run [`step`](Self::step) `count` times and pack the results into a word, first bit in
    /// bit 0.
    ///
    /// # Panics
    ///
    /// Panics if no polynomial has been set or if `count` is more than 32.
    pub fn step_bits(&mut self, count: u32) -> u32 {
        assert!(count <= 32, "Cannot pack {} bits into a u32", count);
        let mut word = 0;
        for i in 0..count {
            word |= (self.step() as u32) << i;
        }
        word
    }

    /// Endless iterator over the output of [`step`](Self::step).
    pub fn bits(&mut self) -> Bits<'_> {
        self.check_configured();
        Bits { gen: self }
    }

    /// Puts the generator in the state it would be in if the last `degree` bits it produced
    /// were those in `bits`, oldest bit in the LSB.
    ///
    /// The previous state does not matter: after this call, `step` continues the sequence
    /// that `bits` was taken from. This is how a receiver synchronises to a transmitted
    /// sequence, or how a hardware-form generator whose output is taken from the feedback is
    /// emulated.
    ///
    /// # Panics
    ///
    /// Panics if no polynomial has been set.
    pub fn sync_forw(&mut self, mut bits: u32) {
        self.check_configured();
        for _ in 0..self.degree {
            self.state >>= 1;
            if bits & 1 != 0 {
                self.state ^= self.poly;
            }
            bits >>= 1;
        }
        trace!("Forward sync to {:#010X}", self.state);
        self.warn_if_zero();
    }

    /// Puts the generator in a state such that the next `degree` bits from
    /// [`step`](Self::step) will be those in `bits`, first output in the LSB.
    ///
    /// # Panics
    ///
    /// Panics if no polynomial has been set.
    pub fn sync_back(&mut self, bits: u32) {
        self.check_configured();
        let mut state = 0u32;
        let mut probe = self.high_bit;
        while probe != 0 {
            if bits & probe != 0 {
                state ^= self.poly;
            }
            state <<= 1;
            probe >>= 1;
        }
        self.state = (state ^ bits) & self.mask;
        trace!("Backward sync to {:#010X}", self.state);
        self.warn_if_zero();
    }

    /// Feed one data bit into the register as a step of a serial CRC.
    ///
    /// # Panics
    ///
    /// Panics if no polynomial has been set.
    #[inline]
    pub fn crc_in(&mut self, bit: bool) {
        self.check_configured();
        let feedback = (self.state & 1 != 0) ^ bit;
        self.state >>= 1;
        if feedback {
            self.state ^= self.poly;
        }
    }

    /// Shift out the next bit of the accumulated remainder, without any feedback.
    ///
    /// After `degree` calls the register is empty; it has to be given a new state before it
    /// is used as a generator again.
    ///
    /// # Panics
    ///
    /// Panics if no polynomial has been set.
    #[inline]
    pub fn crc_out(&mut self) -> bool {
        self.check_configured();
        let bit = self.state & 1 != 0;
        self.state >>= 1;
        bit
    }

    /// Feed every bit of `data` through [`crc_in`](Self::crc_in), each byte LSB first.
    pub fn crc_in_bytes(&mut self, data: &[u8]) {
        self.check_configured();
        for &byte in data {
            for i in 0..8 {
                self.crc_in(byte >> i & 1 != 0);
            }
        }
    }

    /// Drain the whole remainder with [`crc_out`](Self::crc_out), first bit out in bit 0.
    pub fn crc_remainder(&mut self) -> u32 {
        self.check_configured();
        let mut remainder = 0;
        for i in 0..self.degree {
            remainder |= (self.crc_out() as u32) << i;
        }
        remainder
    }

    /// Current contents of the shift register.
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    /// The polynomial, or 0 if none has been set.
    #[inline]
    pub fn poly(&self) -> u32 {
        self.poly
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    #[inline]
    pub fn high_bit(&self) -> u32 {
        self.high_bit
    }

    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Whether a polynomial has been set.
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.poly != 0
    }

    #[inline]
    #[track_caller]
    fn check_configured(&self) {
        assert!(
            self.is_configured(),
            "PRBS generator used before a polynomial was set"
        );
    }

    fn warn_if_zero(&self) {
        if self.state == 0 {
            warn!("Sync left the register in the all-zero state; it will only produce zeros");
        }
    }
}

impl From<Poly> for PrbsGenerator {
    fn from(poly: Poly) -> Self {
        let mut gen = Self::new();
        gen.configure(poly.bits());
        gen
    }
}

/// Endless iterator over the bits of a [`PrbsGenerator`]. Created by
/// [`PrbsGenerator::bits`].
#[derive(Debug)]
pub struct Bits<'a> {
    gen: &'a mut PrbsGenerator,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        Some(self.gen.step())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl FusedIterator for Bits<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit_string(gen: &mut PrbsGenerator, count: usize) -> String {
        gen.bits()
            .take(count)
            .map(|bit| if bit { '1' } else { '0' })
            .collect()
    }

    #[test]
    fn unconfigured_is_all_zero() {
        let gen = PrbsGenerator::new();
        assert!(!gen.is_configured());
        assert_eq!(gen.state(), 0);
        assert_eq!(gen.poly(), 0);
        assert_eq!(gen.mask(), 0);
        assert_eq!(gen.high_bit(), 0);
        assert_eq!(gen.degree(), 0);
    }

    #[test]
    fn g7_boundary() {
        let gen = PrbsGenerator::from(Poly::G7);
        assert_eq!(gen.poly(), 0x41);
        assert_eq!(gen.degree(), 7);
        assert_eq!(gen.mask(), 0x7F);
        assert_eq!(gen.high_bit(), 0x40);
        assert_eq!(gen.state(), 0x7F);
    }

    #[test]
    fn g32_boundary() {
        let gen = PrbsGenerator::from(Poly::G32);
        assert_eq!(gen.degree(), 32);
        assert_eq!(gen.mask(), u32::MAX);
        assert_eq!(gen.high_bit(), 0x8000_0000);
        assert_eq!(gen.state(), u32::MAX);
    }

    #[test]
    fn mask_is_smallest_cover() {
        for poly in [1, 2, 3, 0x7F, 0x80, 0x8E, 0x4001, 0x8000_0000] {
            let gen = PrbsGenerator::with_poly(poly).unwrap();
            assert!(gen.mask() >= poly, "{:#X}", poly);
            assert!(gen.mask() >> 1 < poly, "{:#X}", poly);
            assert_eq!(
                gen.mask() as u64,
                (1u64 << gen.degree()) - 1,
                "{:#X}",
                poly
            );
        }
    }

    #[test]
    fn set_poly_rejects_zero() {
        let mut gen = PrbsGenerator::from(Poly::G8);
        assert_eq!(gen.set_poly(0), Err(PrbsError::ZeroPolynomial));
        // A failed set leaves the previous configuration alone.
        assert_eq!(gen.poly(), Poly::G8.bits());
        assert_eq!(PrbsGenerator::with_poly(0), Err(PrbsError::ZeroPolynomial));
    }

    #[test]
    fn set_poly_resets_state() {
        let mut gen = PrbsGenerator::from(Poly::G16);
        gen.step_bits(13);
        assert_ne!(gen.state(), 0xFFFF);
        gen.set_poly(Poly::G16.bits()).unwrap();
        assert_eq!(gen, PrbsGenerator::from(Poly::G16));

        gen.set_poly(Poly::G7.bits()).unwrap();
        assert_eq!(gen.degree(), 7);
        assert_eq!(gen.state(), 0x7F);
    }

    #[test]
    fn set_state_masks() {
        let mut gen = PrbsGenerator::from(Poly::G8);
        gen.set_state(0x1234).unwrap();
        assert_eq!(gen.state(), 0x34);
    }

    #[test]
    fn set_state_rejects_zero() {
        let mut gen = PrbsGenerator::from(Poly::G8);
        assert_eq!(gen.set_state(0), Err(PrbsError::ZeroState(0)));
        assert_eq!(gen.set_state(0x100), Err(PrbsError::ZeroState(0x100)));
        assert_eq!(gen.state(), 0xFF);
    }

    #[test]
    fn set_state_requires_poly() {
        let mut gen = PrbsGenerator::new();
        assert_eq!(gen.set_state(1), Err(PrbsError::Unconfigured));
    }

    #[test]
    #[should_panic(expected = "before a polynomial was set")]
    fn step_requires_poly() {
        PrbsGenerator::new().step();
    }

    #[test]
    #[should_panic(expected = "before a polynomial was set")]
    fn crc_out_requires_poly() {
        PrbsGenerator::new().crc_out();
    }

    #[test]
    #[should_panic(expected = "before a polynomial was set")]
    fn sync_back_requires_poly() {
        PrbsGenerator::new().sync_back(1);
    }

    #[test]
    #[should_panic(expected = "before a polynomial was set")]
    fn sync_forw_requires_poly() {
        PrbsGenerator::new().sync_forw(1);
    }

    #[test]
    #[should_panic(expected = "before a polynomial was set")]
    fn crc_in_requires_poly() {
        PrbsGenerator::new().crc_in(true);
    }

    #[test]
    #[should_panic(expected = "before a polynomial was set")]
    fn bits_requires_poly() {
        let mut gen = PrbsGenerator::new();
        gen.bits();
    }

    #[test]
    fn known_prefixes() {
        let mut gen = PrbsGenerator::from(Poly::G7);
        assert_eq!(bit_string(&mut gen, 16), "1010101001100111");
        assert_eq!(gen.state(), 0x72);

        let mut gen = PrbsGenerator::from(Poly::G8);
        assert_eq!(bit_string(&mut gen, 16), "1101111001101110");
        assert_eq!(gen.state(), 0x73);
    }

    #[test]
    fn step_bits_packs_lsb_first() {
        let mut gen = PrbsGenerator::from(Poly::G7);
        // "10101010" read LSB first.
        assert_eq!(gen.step_bits(8), 0b0101_0101);
        assert_eq!(gen.step_bits(0), 0);
    }

    #[test]
    fn degree_one() {
        let mut gen = PrbsGenerator::with_poly(1).unwrap();
        assert_eq!(gen.degree(), 1);
        assert_eq!(gen.mask(), 1);
        assert_eq!(gen.high_bit(), 1);
        assert_eq!(bit_string(&mut gen, 4), "1111");
    }

    #[test]
    fn g8_cycle() {
        let mut gen = PrbsGenerator::from(Poly::G8);
        assert_eq!(gen.degree(), 8);
        assert_eq!(gen.mask(), 0xFF);
        assert_eq!(gen.state(), 0xFF);

        let mut seen = [false; 256];
        let mut output = Vec::with_capacity(255);
        for _ in 0..255 {
            output.push(gen.step());
            let state = gen.state() as usize;
            assert_ne!(state, 0);
            assert!(!seen[state], "state {:#04X} repeated", state);
            seen[state] = true;
        }
        assert_eq!(gen.state(), 0xFF);

        // Every non-zero 8 bit window appears exactly once around the cycle.
        let mut windows = [false; 256];
        for start in 0..255 {
            let window = (0..8).fold(0usize, |acc, i| {
                acc | (output[(start + i) % 255] as usize) << i
            });
            assert_ne!(window, 0);
            assert!(!windows[window], "window {:#04X} repeated", window);
            windows[window] = true;
        }

        assert_eq!(gen.step(), output[0]);
    }

    #[test]
    fn sync_back_g32_terminates() {
        let mut gen = PrbsGenerator::from(Poly::G32);
        gen.sync_back(0xDEAD_BEEF);
        assert_eq!(gen.step_bits(32), 0xDEAD_BEEF);
    }

    #[test]
    fn crc_remainder_is_register() {
        let mut gen = PrbsGenerator::from(Poly::G16);
        gen.crc_in_bytes(b"123456789");
        assert_eq!(gen.state(), 0x8083);
        assert_eq!(gen.crc_remainder(), 0x8083);
        assert_eq!(gen.state(), 0);
    }
}
