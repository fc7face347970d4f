//! Sealed trait marker for Transport implementations.
//!
//! Outside crates cannot implement `Transport`, so every request path keeps the
//! HTTPS-only and certificate checks of this crate.

pub(crate) mod private {
    /// Sealed trait marker.
    pub trait Sealed {}
}
