use thiserror::Error;

/// Errors raised while building a page specification or extracting a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
  #[error("Only one page anchor is allowed")]
  AmbiguousAnchor,

  #[error("Invalid span: {0}")]
  InvalidSpan(String),

  #[error("Invalid page anchor: {0}")]
  InvalidAnchor(String),

  #[error("Page anchor not found")]
  AnchorNotFound,

  #[error("Page {index} of size {size} is out of range for {len} items")]
  PageOutOfRange {
    size: usize,
    index: usize,
    len: usize,
  },
}
