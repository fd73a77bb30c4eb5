/// Errors from encoding or decoding protocol frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("{what} truncated: expected {expected} bytes, got {got}")]
    Truncated {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unknown command code: {0:#04x}")]
    UnknownCommand(u8),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("payload too large: {0} bytes (max {max})", max = u32::MAX)]
    PayloadTooLarge(usize),
}
