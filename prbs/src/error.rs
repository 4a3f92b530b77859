use thiserror::Error;

/// Errors that can result from configuring a [`PrbsGenerator`](crate::PrbsGenerator).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum PrbsError {
    /// The polynomial was zero. A zero polynomial has no feedback taps and no degree.
    #[error("Polynomial must be non-zero")]
    ZeroPolynomial,
    /// The generator was used before a polynomial was set.
    #[error("No polynomial has been set")]
    Unconfigured,
    /// The requested state was zero once masked to the degree of the polynomial. Zero is the
    /// one state the register can never leave. Contains the unmasked value that was given.
    #[error("State {0:#010X} masks to the all-zero state")]
    ZeroState(u32),
}
