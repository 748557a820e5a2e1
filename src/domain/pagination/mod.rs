//! Cursor-based pagination over caller-ordered collections

pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use errors::PaginationError;
pub use ports::Identifiable;
pub use services::{extract_page, slice_range};
pub use value_objects::{MissingAnchorPolicy, PageSpec, Span, SpanLimits};
