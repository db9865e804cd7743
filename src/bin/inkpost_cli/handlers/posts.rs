#![deny(clippy::all, clippy::pedantic)]

use inkpost::application::{AppContext, PostQuery};
use inkpost::domain::posts::PostDraft;
use inkpost::store::{FilterPatch, PostSort};
use serde_json::json;

use crate::args::{PostFields, PostsCmd, SortArg};
use crate::context::CliError;
use crate::io::read_value;
use crate::print::print_json;

pub async fn handle(ctx: &AppContext, cmd: PostsCmd) -> Result<(), CliError> {
    let service = ctx.post_service();
    match cmd {
        PostsCmd::List {
            page,
            limit,
            search,
            category,
            filter,
            sort,
            more,
        } => {
            let query = PostQuery {
                page,
                limit,
                search,
                category,
            };
            let mut listing = service
                .list(&query)
                .await
                .map_err(CliError::action("Failed to load posts"))?;
            for _ in 0..more {
                if !listing.has_more {
                    break;
                }
                listing = service
                    .load_more(&query)
                    .await
                    .map_err(CliError::action("Failed to load posts"))?;
            }

            ctx.posts().set_filters(FilterPatch {
                search: filter,
                category: None,
                sort: Some(sort.into()),
            });
            let shown = ctx.posts().filtered_posts();
            print_json(&json!({
                "posts": shown.as_slice(),
                "pagination": listing.pagination,
                "hasMore": listing.has_more,
            }))
        }
        PostsCmd::Get { id } => {
            let post = service
                .get(&id)
                .await
                .map_err(CliError::action("Post not found"))?;
            print_json(&post)
        }
        PostsCmd::Mine => {
            let posts = service
                .mine()
                .await
                .map_err(CliError::action("Failed to load posts"))?;
            print_json(&posts)
        }
        PostsCmd::Trending { limit } => {
            let posts = service
                .trending(limit)
                .await
                .map_err(CliError::action("Failed to load posts"))?;
            print_json(&posts)
        }
        PostsCmd::Create(fields) => {
            let post = service
                .create(draft(fields)?)
                .await
                .map_err(CliError::action("Failed to create post"))?;
            print_json(&post)
        }
        PostsCmd::Update { id, fields } => {
            let post = service
                .update(&id, draft(fields)?)
                .await
                .map_err(CliError::action("Failed to update post"))?;
            print_json(&post)
        }
        PostsCmd::Delete { id } => {
            service
                .delete(&id)
                .await
                .map_err(CliError::action("Failed to delete post"))?;
            print_json(&json!({ "deleted": id }))
        }
        PostsCmd::Like { id } => {
            let like = service
                .like(&id)
                .await
                .map_err(CliError::action("Failed to like post"))?;
            print_json(&like)
        }
        PostsCmd::Comments { id } => {
            let comments = service
                .comments(&id)
                .await
                .map_err(CliError::action("Failed to load comments"))?;
            print_json(&comments)
        }
        PostsCmd::Comment { id, content } => {
            let comment = service
                .add_comment(&id, &content)
                .await
                .map_err(CliError::action("Failed to add comment"))?;
            print_json(&comment)
        }
    }
}

fn draft(fields: PostFields) -> Result<PostDraft, CliError> {
    Ok(PostDraft {
        content: read_value(fields.content, fields.content_file)?,
        title: fields.title,
        excerpt: fields.excerpt,
        categories: fields.categories,
        cover_image: fields.cover_image,
    })
}

impl From<SortArg> for PostSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Newest => Self::Newest,
            SortArg::Oldest => Self::Oldest,
            SortArg::Popular => Self::Popular,
            SortArg::Views => Self::Views,
        }
    }
}
