use std::fmt;

/// Capability of exposing a stable, unique identifier.
///
/// Any entity that can appear in a paged listing implements this; the
/// pagination engine only ever looks at `id()` and never at other fields.
pub trait Identifiable {
  type Id: PartialEq + fmt::Display;

  fn id(&self) -> &Self::Id;
}

impl<T: Identifiable> Identifiable for &T {
  type Id = T::Id;

  fn id(&self) -> &Self::Id {
    (*self).id()
  }
}
