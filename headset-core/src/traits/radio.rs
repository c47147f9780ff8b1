//! Radio transport capability.

/// Errors from the radio transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Transceiver not detected (version probe missed).
    NotDetected,
    /// Bus-level communication failure.
    Bus,
    /// The transceiver did not reach the requested mode in time.
    Timeout,
}

/// Receive side of the 915MHz menu link.
///
/// `try_receive` must never block: it either copies one pending packet's
/// payload into `buf` and returns the payload length, or reports that
/// nothing is waiting. Framing, CRC and encryption are the implementation's
/// concern - callers see bare payload bytes.
///
/// An error is not fatal to the caller; the main loop treats a failed poll
/// as an empty one and tries again next tick.
pub trait RadioTransport {
    fn try_receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, RadioError>;
}
