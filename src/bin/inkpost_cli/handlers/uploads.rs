#![deny(clippy::all, clippy::pedantic)]

use std::path::Path;

use inkpost::application::AppContext;
use serde_json::json;

use crate::context::CliError;
use crate::print::print_json;

pub async fn upload(ctx: &AppContext, path: &Path) -> Result<(), CliError> {
    let url = ctx
        .upload_service()
        .upload_image(path)
        .await
        .map_err(CliError::action("Failed to upload image"))?;
    print_json(&json!({ "imageUrl": url }))
}
