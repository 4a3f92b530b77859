//! Known-good polynomials for maximum length sequences.
//!
//! Polynomial values are found from the sequence of coefficients (0 or 1) of the polynomial
//! starting with the constant term and dropping the highest one:
//!
//! ```text
//!                              0 1 2 3 4 5 6 7
//! P = x^7 + x^6 + 1    -->     1 0 0 0 0 0 1 1    -->    1000001    -->    0x41
//! ```
//!
//! To emulate a hardware-form generator (parity of the taps fed back into the register),
//! start with the highest exponent and drop the constant term instead:
//!
//! ```text
//!                              7 6 5 4 3 2 1 0
//! P = x^7 + x^6 + 1    -->     1 1 0 0 0 0 0 1    -->    1100000    -->    0x60
//! ```
//!
//! Nothing in the generator can tell these two encodings apart; picking the right one is up
//! to the caller.

use std::fmt;

/// Fixed catalogue of maximal-length polynomials, one per supported degree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Poly {
    G7,
    G8,
    G15,
    G16,
    G23,
    G24,
    G31,
    G32,
}

impl Poly {
    /// Every catalogued polynomial, in order of increasing degree.
    pub const ALL: [Poly; 8] = [
        Poly::G7,
        Poly::G8,
        Poly::G15,
        Poly::G16,
        Poly::G23,
        Poly::G24,
        Poly::G31,
        Poly::G32,
    ];

    /// Bit pattern of the polynomial, suitable for [`PrbsGenerator::set_poly`].
    ///
    /// [`PrbsGenerator::set_poly`]: crate::PrbsGenerator::set_poly
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Poly::G7 => 0x0000_0041,
            Poly::G8 => 0x0000_008E,
            Poly::G15 => 0x0000_4001,
            Poly::G16 => 0x0000_8016,
            Poly::G23 => 0x0040_0010,
            Poly::G24 => 0x0080_000D,
            Poly::G31 => 0x4000_0004,
            Poly::G32 => 0x8000_0057,
        }
    }

    /// Degree of the polynomial, which is also the width of the shift register.
    #[inline]
    pub const fn degree(self) -> u32 {
        match self {
            Poly::G7 => 7,
            Poly::G8 => 8,
            Poly::G15 => 15,
            Poly::G16 => 16,
            Poly::G23 => 23,
            Poly::G24 => 24,
            Poly::G31 => 31,
            Poly::G32 => 32,
        }
    }

    /// Period of the sequence produced by this polynomial, `2^degree - 1`.
    #[inline]
    pub const fn period(self) -> u64 {
        (1u64 << self.degree()) - 1
    }

    /// Look up the catalogued polynomial with the given degree, if there is one.
    pub fn from_degree(degree: u32) -> Option<Poly> {
        Self::ALL.into_iter().find(|poly| poly.degree() == degree)
    }
}

impl From<Poly> for u32 {
    fn from(poly: Poly) -> u32 {
        poly.bits()
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{} ({:#010X})", self.degree(), self.bits())
    }
}
