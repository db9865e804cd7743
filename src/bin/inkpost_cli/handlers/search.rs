#![deny(clippy::all, clippy::pedantic)]

use inkpost::application::AppContext;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::context::CliError;
use crate::print::print_json;

pub async fn handle(ctx: &AppContext, query: Option<String>, live: bool) -> Result<(), CliError> {
    if live {
        return live_search(ctx).await;
    }

    let query = query.ok_or_else(|| CliError::InvalidInput("query required".into()))?;
    let posts = ctx
        .search_service()
        .search(&query)
        .await
        .map_err(CliError::action("Search failed"))?;
    print_json(&posts)
}

/// Each stdin line replaces the query; results are printed as searches
/// settle.
async fn live_search(ctx: &AppContext) -> Result<(), CliError> {
    let mut live = ctx.search_service().live();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line.map_err(inkpost::infra::error::InfraError::from)? {
                Some(line) => live.input(line),
                None => break,
            },
            Some(outcome) = live.next() => print_outcome(outcome)?,
        }
    }

    for outcome in live.finish().await {
        print_outcome(outcome)?;
    }
    Ok(())
}

fn print_outcome(outcome: inkpost::application::search::SearchOutcome) -> Result<(), CliError> {
    match outcome.result {
        Ok(posts) => print_json(&json!({ "query": outcome.query, "posts": posts })),
        Err(err) => print_json(&json!({
            "query": outcome.query,
            "error": err.user_message("Search failed"),
        })),
    }
}
