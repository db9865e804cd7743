#![deny(clippy::all, clippy::pedantic)]

use inkpost::application::AppContext;

use crate::context::CliError;
use crate::print::print_json;

pub async fn home(ctx: &AppContext, category: Option<String>) -> Result<(), CliError> {
    let feed = ctx
        .feed_service()
        .home(category.as_deref())
        .await
        .map_err(CliError::action("Failed to load posts"))?;
    print_json(&feed)
}
