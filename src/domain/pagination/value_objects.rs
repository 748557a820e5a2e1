use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::num::NonZeroUsize;

use super::errors::PaginationError;

lazy_static! {
  static ref SPAN_PATTERN: Regex = Regex::new(r"^\d+$").expect("span pattern is valid");
}

// ============================================================================
// Span Value Object
// ============================================================================

/// Requested page size, always at least one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span(NonZeroUsize);

impl Span {
  pub const DEFAULT: Span = Span(NonZeroUsize::new(12).unwrap());
  pub const DEFAULT_MAX: Span = Span(NonZeroUsize::new(100).unwrap());

  /// Creates a span, rejecting zero
  pub fn new(size: usize) -> Result<Self, PaginationError> {
    NonZeroUsize::new(size)
      .map(Self)
      .ok_or_else(|| PaginationError::InvalidSpan("span must be at least 1".to_string()))
  }

  /// Parses a span from its query-string form (digits only)
  pub fn parse(raw: &str) -> Result<Self, PaginationError> {
    if !SPAN_PATTERN.is_match(raw) {
      return Err(PaginationError::InvalidSpan(format!(
        "'{}' is not a positive integer",
        raw
      )));
    }

    let size = raw
      .parse::<usize>()
      .map_err(|e| PaginationError::InvalidSpan(format!("'{}': {}", raw, e)))?;

    Self::new(size)
  }

  /// Returns the span capped at `max`
  pub fn clamp_to(self, max: Span) -> Span {
    self.min(max)
  }

  pub fn get(&self) -> usize {
    self.0.get()
  }
}

impl Default for Span {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Default and upper bound applied to client-supplied spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanLimits {
  pub default: Span,
  pub max: Span,
}

impl SpanLimits {
  pub fn new(default: usize, max: usize) -> Result<Self, PaginationError> {
    let default = Span::new(default)?;
    let max = Span::new(max)?;

    if default > max {
      return Err(PaginationError::InvalidSpan(format!(
        "default span {} exceeds maximum {}",
        default, max
      )));
    }

    Ok(Self { default, max })
  }

  /// Resolves an optional raw span against these limits
  pub fn resolve(&self, raw: Option<&str>) -> Result<Span, PaginationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
      Some(raw) => Ok(Span::parse(raw)?.clamp_to(self.max)),
      None => Ok(self.default),
    }
  }
}

impl Default for SpanLimits {
  fn default() -> Self {
    Self {
      default: Span::DEFAULT,
      max: Span::DEFAULT_MAX,
    }
  }
}

// ============================================================================
// Missing Anchor Policy
// ============================================================================

/// What to do when an anchor does not identify any item in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAnchorPolicy {
  /// Behave as if the anchor matched nothing: `after` pages from the top,
  /// `before` yields an empty page
  #[default]
  Fallback,

  /// Fail with `PaginationError::AnchorNotFound`
  Reject,
}

// ============================================================================
// PageSpec Value Object
// ============================================================================

/// Describes which window of an ordered collection to return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec<K> {
  pub span: Span,
  pub after: Option<K>,
  pub before: Option<K>,
  /// Take from the front (true) or the back (false) when no anchor is set
  pub pop_top: bool,
  pub on_missing_anchor: MissingAnchorPolicy,
}

impl<K> PageSpec<K> {
  /// A spec with no anchors
  pub fn new(span: Span, pop_top: bool) -> Self {
    Self {
      span,
      after: None,
      before: None,
      pop_top,
      on_missing_anchor: MissingAnchorPolicy::default(),
    }
  }

  pub fn after(mut self, anchor: K) -> Self {
    self.after = Some(anchor);
    self
  }

  pub fn before(mut self, anchor: K) -> Self {
    self.before = Some(anchor);
    self
  }

  pub fn with_missing_anchor_policy(mut self, policy: MissingAnchorPolicy) -> Self {
    self.on_missing_anchor = policy;
    self
  }
}
