#![deny(clippy::all, clippy::pedantic)]

use inkpost::application::AppContext;

use crate::context::CliError;
use crate::print::print_json;

pub async fn handle(ctx: &AppContext) -> Result<(), CliError> {
    let dashboard = ctx
        .dashboard_service()
        .load()
        .await
        .map_err(CliError::action("Failed to load dashboard data"))?;
    print_json(&dashboard)
}
