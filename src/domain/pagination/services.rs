use lazy_static::lazy_static;
use regex::Regex;

use super::errors::PaginationError;
use super::ports::Identifiable;
use super::value_objects::{MissingAnchorPolicy, PageSpec};

lazy_static! {
  static ref RANGE_PATTERN: Regex =
    Regex::new(r"^(\d+)(?:,(\d+))?$").expect("range pattern is valid");
}

/// Extracts the window of `items` described by `spec`.
///
/// `items` must already be in display order; the engine neither sorts nor
/// copies, it returns a sub-slice.
///
/// * `after` starts the page right behind the first item with that id
/// * `before` ends the page on the first item with that id (inclusive)
/// * without an anchor, `pop_top` takes from the front, otherwise the tail
///
/// An anchor that matches nothing follows `spec.on_missing_anchor`.
///
/// # Errors
/// * `PaginationError::AmbiguousAnchor` if both anchors are set
/// * `PaginationError::AnchorNotFound` for an unmatched anchor under
///   `MissingAnchorPolicy::Reject`
pub fn extract_page<'a, T>(
  items: &'a [T],
  spec: &PageSpec<T::Id>,
) -> Result<&'a [T], PaginationError>
where
  T: Identifiable,
{
  let len = items.len();
  let span = spec.span.get();

  let (start, end) = match (&spec.after, &spec.before) {
    (Some(_), Some(_)) => return Err(PaginationError::AmbiguousAnchor),
    (Some(anchor), None) => {
      let start = match position_of(items, anchor) {
        Some(index) => index + 1,
        None => missing_anchor(spec.on_missing_anchor, anchor)?,
      };
      (start, start.saturating_add(span).min(len))
    }
    (None, Some(anchor)) => {
      let end = match position_of(items, anchor) {
        Some(index) => index + 1,
        None => missing_anchor(spec.on_missing_anchor, anchor)?,
      };
      (end.saturating_sub(span), end)
    }
    (None, None) if spec.pop_top => (0, span.min(len)),
    (None, None) => (len.saturating_sub(span), len),
  };

  Ok(&items[start..end])
}

/// Slices `items` using the numeric `"size"` or `"size,index"` form.
///
/// Returns `[size * index, size * index + size)`, with the end clamped to the
/// collection so the last page may be partial. The first page of an empty
/// collection is empty; any other page starting at or past the end fails.
pub fn slice_range<'a, T>(items: &'a [T], range: &str) -> Result<&'a [T], PaginationError> {
  let captures = RANGE_PATTERN.captures(range.trim()).ok_or_else(|| {
    PaginationError::InvalidSpan(format!("'{}' does not match size[,index]", range))
  })?;

  let size = captures[1]
    .parse::<usize>()
    .map_err(|e| PaginationError::InvalidSpan(format!("'{}': {}", range, e)))?;
  if size == 0 {
    return Err(PaginationError::InvalidSpan(
      "page size must be at least 1".to_string(),
    ));
  }

  let index = match captures.get(2) {
    Some(index) => index
      .as_str()
      .parse::<usize>()
      .map_err(|e| PaginationError::InvalidSpan(format!("'{}': {}", range, e)))?,
    None => 0,
  };

  let len = items.len();
  let out_of_range = PaginationError::PageOutOfRange { size, index, len };

  let start = size.checked_mul(index).ok_or(out_of_range.clone())?;
  if start >= len && !(start == 0 && len == 0) {
    return Err(out_of_range);
  }

  let end = start.saturating_add(size).min(len);
  Ok(&items[start..end])
}

fn position_of<T: Identifiable>(items: &[T], anchor: &T::Id) -> Option<usize> {
  items.iter().position(|item| item.id() == anchor)
}

fn missing_anchor<K: std::fmt::Display>(
  policy: MissingAnchorPolicy,
  anchor: &K,
) -> Result<usize, PaginationError> {
  match policy {
    MissingAnchorPolicy::Fallback => {
      tracing::debug!("Page anchor {} not found, using default window", anchor);
      Ok(0)
    }
    MissingAnchorPolicy::Reject => Err(PaginationError::AnchorNotFound),
  }
}
