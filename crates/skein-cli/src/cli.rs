use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Data directory used when `--data-dir` is not given.
pub const DEFAULT_DATA_DIR: &str = ".skein";

#[derive(Parser)]
#[command(
    name = "skein",
    about = "Skein: content-addressed timelines over a merkle list",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args)]
pub struct GlobalArgs {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding blocks and user profiles
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Maximum items per tree node
    #[arg(long, global = true)]
    pub capacity: Option<usize>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

impl GlobalArgs {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Create, show, or list users
    User(UserArgs),
    /// Publish a post to a user's timeline
    Post(PostArgs),
    /// Print a user's timeline in order
    Feed(FeedArgs),
    /// Show one post by timestamp
    Show(ShowArgs),
    /// Show the shape of a user's timeline tree
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML server configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Keep everything in memory instead of the data directory
    #[arg(long)]
    pub ephemeral: bool,
    /// Allow cross-origin requests
    #[arg(long)]
    pub cors: bool,
}

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    New {
        username: String,
        #[arg(long)]
        pubkey: Option<String>,
    },
    /// Show a user's profile
    Show { username: String },
    /// List all users
    List,
}

#[derive(Args)]
pub struct PostArgs {
    pub user: String,
    /// Post text; stored as `{"text": ...}`
    pub text: String,
    /// Treat TEXT as a raw JSON payload
    #[arg(long)]
    pub json: bool,
    /// Unix timestamp in seconds (default: now)
    #[arg(long)]
    pub at: Option<u64>,
    #[arg(long, default_value = "post")]
    pub kind: String,
    /// Signature of the post that this one replies to
    #[arg(long)]
    pub reply_to: Option<String>,
}

#[derive(Args)]
pub struct FeedArgs {
    pub user: String,
    /// Earliest timestamp to include
    #[arg(long)]
    pub from: Option<u64>,
    /// Latest timestamp to include
    #[arg(long)]
    pub to: Option<u64>,
    /// Show at most this many posts
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub user: String,
    pub timestamp: u64,
}

#[derive(Args)]
pub struct StatsArgs {
    pub user: String,
    /// Re-check every structural invariant
    #[arg(long)]
    pub verify: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn globals_work_after_subcommand() {
        let cli = Cli::parse_from(["skein", "feed", "alice", "--data-dir", "/tmp/x", "-v", "--from", "5"]);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.data_dir(), PathBuf::from("/tmp/x"));
        match cli.command {
            Command::Feed(args) => {
                assert_eq!(args.user, "alice");
                assert_eq!(args.from, Some(5));
                assert_eq!(args.to, None);
            }
            _ => panic!("expected feed"),
        }
    }

    #[test]
    fn data_dir_defaults() {
        let cli = Cli::parse_from(["skein", "user", "list"]);
        assert_eq!(cli.global.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(cli.global.format, OutputFormat::Text);
    }
}
