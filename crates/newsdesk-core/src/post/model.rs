//! Post and category models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::user::{AuthorInfo, UserId, UserProfile};

pub type PostId = i64;
pub type CategoryId = i64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostStatus {
    Draft,
    #[default]
    Published,
}

/// The API renders `author` as a primary key on detail views and as the
/// username on list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Id(UserId),
    Username(String),
}

impl AuthorRef {
    pub fn is_user(&self, user: &UserProfile) -> bool {
        match self {
            Self::Id(id) => *id == user.id,
            Self::Username(name) => *name == user.username,
        }
    }
}

/// Same split as [`AuthorRef`]: id on detail views, name on list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(CategoryId),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub category_info: Option<CategoryInfo>,
    pub author: AuthorRef,
    #[serde(default)]
    pub author_info: Option<AuthorInfo>,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub comments_count: u64,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Overwrites the fields `partial` carries.
    ///
    /// A changed category drops `category_info`, which described the old one.
    pub fn merge(&mut self, partial: &PartialPost) {
        if let Some(slug) = &partial.slug {
            self.slug = slug.clone();
        }
        if let Some(title) = &partial.title {
            self.title = title.clone();
        }
        if let Some(content) = &partial.content {
            self.content = content.clone();
        }
        if let Some(image) = &partial.image {
            self.image = image.clone();
        }
        if let Some(category) = &partial.category {
            if *category != self.category {
                self.category_info = None;
            }
            self.category = category.clone();
        }
        if partial.category_info.is_some() {
            self.category_info = partial.category_info.clone();
        }
        if let Some(status) = partial.status {
            self.status = status;
        }
        if let Some(updated_at) = partial.updated_at {
            self.updated_at = updated_at;
        }
        if let Some(views_count) = partial.views_count {
            self.views_count = views_count;
        }
        if let Some(comments_count) = partial.comments_count {
            self.comments_count = comments_count;
        }
    }
}

/// Body returned by the post write endpoints.
///
/// The write serializer echoes `title`, `content`, `image`, `category` and
/// `status`; `id` and `slug` are absent. For `image` and `category` the outer
/// `Option` tells a missing key from an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialPost {
    pub id: Option<PostId>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<CategoryRef>>,
    pub category_info: Option<CategoryInfo>,
    pub author: Option<AuthorRef>,
    pub author_info: Option<AuthorInfo>,
    pub status: Option<PostStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub views_count: Option<u64>,
    pub comments_count: Option<u64>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PartialPost {
    /// The full record, when the body carries every required field.
    pub fn into_post(self) -> Option<Post> {
        Some(Post {
            id: self.id?,
            slug: self.slug?,
            title: self.title?,
            content: self.content.unwrap_or_default(),
            image: self.image.flatten(),
            category: self.category.flatten(),
            category_info: self.category_info,
            author: self.author?,
            author_info: self.author_info,
            status: self.status.unwrap_or_default(),
            created_at: self.created_at?,
            updated_at: self.updated_at?,
            views_count: self.views_count.unwrap_or(0),
            comments_count: self.comments_count.unwrap_or(0),
        })
    }
}

/// Body for creating or fully replacing a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    pub status: PostStatus,
}

/// Body for PATCH; unset fields are left untouched on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posts_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Response of `/posts/categories/{slug}/posts/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPosts {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[cfg(test)]
pub(crate) fn sample_post(id: PostId, slug: &str) -> Post {
    Post {
        id,
        slug: slug.to_string(),
        title: slug.to_string(),
        content: String::new(),
        image: None,
        category: None,
        category_info: None,
        author: AuthorRef::Id(1),
        author_info: None,
        status: PostStatus::Published,
        created_at: DateTime::from_timestamp(0, 0).unwrap(),
        updated_at: DateTime::from_timestamp(0, 0).unwrap(),
        views_count: 0,
        comments_count: 0,
    }
}
