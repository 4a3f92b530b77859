//! Pseudo random binary sequence generator using polynomial division in GF(2).
//!
//! There are two ways to build such a generator, both based on a shift register:
//!
//! 1. Feed the parity of the taps selected by the polynomial back into the input of the
//!    register. This is the cheap way to do it in hardware.
//! 2. Whenever the bit shifted out is 1, XOR the register with a bit pattern representing
//!    the polynomial. This is the cheap way to do it in software.
//!
//! The two forms are equivalent: any sequence one of them produces can be produced by the
//! other. [`PrbsGenerator`] uses the second form and supports polynomials up to and
//! including degree 32. The same register doubles as a serial CRC accumulator
//! ([`PrbsGenerator::crc_in`] / [`PrbsGenerator::crc_out`]) and as the reference for a
//! bit-error-rate counter ([`ber::BerCounter`]).

pub mod ber;
pub mod catalogue;
pub mod error;
pub mod generator;

pub use catalogue::Poly;
pub use error::PrbsError;
pub use generator::PrbsGenerator;
