//! Post authoring input as the user types it.

use inkpost_api_types::PostInput;

use super::error::DomainError;

/// Editor form contents. `categories` is the raw comma-separated field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub categories: String,
    pub cover_image: Option<String>,
}

impl PostDraft {
    /// Check required fields and build the request body.
    pub fn into_input(self) -> Result<PostInput, DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("Content is required"));
        }

        Ok(PostInput {
            categories: split_categories(&self.categories),
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            cover_image: self.cover_image.filter(|url| !url.trim().is_empty()),
        })
    }
}

/// `"tech, rust,,  "` becomes `["tech", "rust"]`.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed comment body, rejecting blank input.
pub fn comment_body(content: &str) -> Result<String, DomainError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Comment cannot be empty"));
    }
    Ok(trimmed.to_string())
}
