//! Poems, comments, likes and follow edges that appear in paged listings

pub mod entities;

pub use entities::{Comment, Poem, PoemLike, UserFollowing};
