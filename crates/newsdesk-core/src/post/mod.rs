//! Post and category domain module.

mod model;
mod query;

pub use model::{
    AuthorRef, Category, CategoryId, CategoryInfo, CategoryInput, CategoryPosts, CategoryRef,
    NewPost, PartialPost, Post, PostId, PostPatch, PostStatus,
};
pub use query::{PostFilters, PostQuery};

#[cfg(test)]
pub(crate) use model::sample_post;
