//! Command-line surface for `inkpost`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use inkpost::config::GlobalOverrides;

#[derive(Parser, Debug)]
#[command(name = "inkpost", version, about = "inkpost blogging client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login(LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Browse, write and react to posts
    Posts(PostsArgs),
    /// Search posts; with --live, read queries from stdin as they are typed
    Search {
        query: Option<String>,
        #[arg(long)]
        live: bool,
    },
    /// Your posts with aggregate stats
    Dashboard,
    /// Latest posts and site stats
    Home {
        #[arg(long)]
        category: Option<String>,
    },
    /// Upload a cover image and print its URL
    Upload { path: PathBuf },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// File holding the password (takes precedence over env)
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    /// Password from env (no CLI flag to keep it out of shell history)
    #[arg(long = "password-env", hide = true, env = "INKPOST_PASSWORD")]
    pub password_env: Option<String>,
}

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    /// List posts page by page
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        /// Server-side search text
        #[arg(long, short = 'q')]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Narrow the fetched posts locally by title or excerpt
        #[arg(long)]
        filter: Option<String>,
        /// Order of the printed posts
        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,
        /// Also fetch up to this many following pages
        #[arg(long, default_value_t = 0)]
        more: u32,
    },
    /// Show one post
    Get { id: String },
    /// Posts you authored
    Mine,
    /// Most popular posts
    Trending {
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Publish a new post
    Create(PostFields),
    /// Replace a post's fields
    Update {
        id: String,
        #[command(flatten)]
        fields: PostFields,
    },
    Delete { id: String },
    /// Toggle your like on a post
    Like { id: String },
    /// List comments on a post
    Comments { id: String },
    /// Comment on a post
    Comment { id: String, content: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    Newest,
    Oldest,
    Popular,
    Views,
}

#[derive(Args, Debug)]
pub struct PostFields {
    #[arg(long)]
    pub title: String,
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    #[arg(long, default_value = "")]
    pub excerpt: String,
    /// Comma-separated, e.g. "tech, rust"
    #[arg(long, default_value = "")]
    pub categories: String,
    #[arg(long)]
    pub cover_image: Option<String>,
}
