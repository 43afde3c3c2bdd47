use anyhow::Context;
use colored::Colorize;
use skein_list::{ListConfig, DEFAULT_CAPACITY};
use skein_sdk::{Post, Skein, UserProfile};
use skein_server::{ServerConfig, SkeinServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global;
    match cli.command {
        Command::Serve(args) => cmd_serve(&global, args),
        Command::User(args) => match args.action {
            UserAction::New { username, pubkey } => cmd_user_new(&global, username, pubkey),
            UserAction::Show { username } => cmd_user_show(&global, &username),
            UserAction::List => cmd_user_list(&global),
        },
        Command::Post(args) => cmd_post(&global, args),
        Command::Feed(args) => cmd_feed(&global, args),
        Command::Show(args) => cmd_show(&global, args),
        Command::Stats(args) => cmd_stats(&global, args),
    }
}

fn open(global: &GlobalArgs) -> anyhow::Result<Skein> {
    let config = ListConfig::with_capacity(global.capacity.unwrap_or(DEFAULT_CAPACITY))?;
    let dir = global.data_dir();
    Skein::open_with(&dir, config).with_context(|| format!("opening data directory {}", dir.display()))
}

fn now() -> anyhow::Result<u64> {
    u64::try_from(chrono::Utc::now().timestamp()).context("system clock is before the unix epoch")
}

fn format_time(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// One-line rendering of a post payload.
fn display_text(post: &Post) -> String {
    match &post.data {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Object(map) => match map.get("text") {
            Some(serde_json::Value::String(text)) => text.clone(),
            _ => post.data.to_string(),
        },
        other => other.to_string(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_serve(global: &GlobalArgs, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading server config {}", path.display()))?,
        None => ServerConfig {
            data_dir: Some(global.data_dir()),
            ..ServerConfig::default()
        },
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = &global.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(capacity) = global.capacity {
        config.capacity = capacity;
    }
    if args.ephemeral {
        config.data_dir = None;
    }
    config.cors |= args.cors;

    let storage = match &config.data_dir {
        Some(dir) => dir.display().to_string(),
        None => "memory".to_string(),
    };
    println!(
        "Skein server on {} (data: {}, capacity: {})",
        config.bind_addr.to_string().bold(),
        storage,
        config.capacity
    );

    let server = SkeinServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_user_new(global: &GlobalArgs, username: String, pubkey: Option<String>) -> anyhow::Result<()> {
    let skein = open(global)?;
    let profile = UserProfile::new(username, now()?).with_pubkey(pubkey.unwrap_or_default());
    let profile = skein.create_user(profile)?;
    match global.format {
        OutputFormat::Json => print_json(&profile)?,
        OutputFormat::Text => println!("{} Created user {}", "✓".green().bold(), profile.username.yellow()),
    }
    Ok(())
}

fn cmd_user_show(global: &GlobalArgs, username: &str) -> anyhow::Result<()> {
    let profile = open(global)?.user(username)?;
    if global.format == OutputFormat::Json {
        return print_json(&profile);
    }
    println!("User {}", profile.username.yellow().bold());
    if !profile.pubkey.is_empty() {
        println!("  Pubkey: {}", profile.pubkey.cyan());
    }
    println!("  Created: {}", format_time(profile.created_at));
    match profile.posts_root {
        Some(root) => println!("  Root: {}", root.to_hex().dimmed()),
        None => println!("  Root: {}", "(no posts)".dimmed()),
    }
    Ok(())
}

fn cmd_user_list(global: &GlobalArgs) -> anyhow::Result<()> {
    let users = open(global)?.users()?;
    if global.format == OutputFormat::Json {
        return print_json(&users);
    }
    if users.is_empty() {
        println!("No users.");
    }
    for user in &users {
        let root = user
            .posts_root
            .map(|root| root.short_hex())
            .unwrap_or_else(|| "-".into());
        println!("{}  {}", user.username.yellow(), root.dimmed());
    }
    Ok(())
}

fn cmd_post(global: &GlobalArgs, args: PostArgs) -> anyhow::Result<()> {
    let data = if args.json {
        serde_json::from_str(&args.text).context("post payload is not valid JSON")?
    } else {
        serde_json::json!({ "text": args.text })
    };
    let created_at = match args.at {
        Some(at) => at,
        None => now()?,
    };
    let mut post = Post::new(created_at, data)
        .with_kind(args.kind)
        .with_author(args.user.as_str());
    if let Some(parent) = args.reply_to {
        post = post.in_response_to(parent);
    }

    let root = open(global)?.post_feed_items(&args.user, &[post])?;
    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "username": args.user,
            "created_at": created_at,
            "root": root,
        }))?,
        OutputFormat::Text => {
            println!("{} Posted to {} at {}", "✓".green().bold(), args.user.yellow(), format_time(created_at));
            println!("  Root: {}", root.short_hex().dimmed());
        }
    }
    Ok(())
}

fn cmd_feed(global: &GlobalArgs, args: FeedArgs) -> anyhow::Result<()> {
    let mut posts = open(global)?.feed_range(&args.user, args.from, args.to)?;
    if let Some(limit) = args.limit {
        posts.truncate(limit);
    }
    if global.format == OutputFormat::Json {
        return print_json(&posts);
    }
    if posts.is_empty() {
        println!("No posts.");
    }
    for post in &posts {
        println!(
            "{}  {}  {}",
            format_time(post.created_at).dimmed(),
            post.kind.cyan(),
            display_text(post)
        );
    }
    Ok(())
}

fn cmd_show(global: &GlobalArgs, args: ShowArgs) -> anyhow::Result<()> {
    let post = open(global)?.post(&args.user, args.timestamp)?;
    if global.format == OutputFormat::Json {
        return print_json(&post);
    }
    println!("Post by {} at {}", args.user.yellow().bold(), format_time(post.created_at));
    if !post.kind.is_empty() {
        println!("  Type: {}", post.kind.cyan());
    }
    if !post.response_to.is_empty() {
        println!("  In reply to: {}", post.response_to.blue());
    }
    println!("  {}", display_text(&post));
    Ok(())
}

fn cmd_stats(global: &GlobalArgs, args: StatsArgs) -> anyhow::Result<()> {
    let skein = open(global)?;
    let stats = if args.verify {
        skein.verify(&args.user)?
    } else {
        skein.stats(&args.user)?
    };
    if global.format == OutputFormat::Json {
        return print_json(&stats);
    }
    if args.verify {
        println!("{} Timeline of {} verified", "✓".green().bold(), args.user.yellow());
    } else {
        println!("Timeline of {}", args.user.yellow().bold());
    }
    println!("  Posts: {}", stats.posts.to_string().bold());
    println!("  Depth: {}", stats.depth);
    println!("  Leaves: {}", stats.leaves);
    println!("  Internal nodes: {}", stats.internal_nodes);
    println!("  Capacity: {}", skein.config().capacity);
    Ok(())
}
