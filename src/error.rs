//! Error types for ipharvest.

use thiserror::Error;

/// Reason a single source line (or a whole subscription blob) was rejected.
///
/// Parsers return these per line; batch functions log them at debug level
/// and drop the line. They never abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("blank line")]
    Blank,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("missing '{0}' delimiter")]
    MissingDelimiter(char),

    #[error("unsupported scheme")]
    UnsupportedScheme,

    #[error("missing port: {0}")]
    MissingPort(String),

    #[error("port {0} rejected by port policy")]
    PortRejected(String),

    #[error("remark {0:?} has no country code")]
    InvalidRemark(String),

    #[error("subscription decode failed: {0}")]
    Decode(String),
}
