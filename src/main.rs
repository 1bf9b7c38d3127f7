use anyhow::Context as _;
use blog_views::config::Command;
use blog_views::utils::error::ErrorSeverity;
use blog_views::utils::logger;
use blog_views::{fetch_all, BlogError, BlogViews, CliConfig, FetchResult};
use clap::Parser;
use serde_json::{json, Value};

/// Exit code for pages whose subject does not exist.
const EXIT_NOT_FOUND: i32 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.load_blog_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    let output = match &cli.command {
        Command::Fetch { urls } => fetch_summary(urls, config.api.timeout_seconds).await,
        command => {
            let views = BlogViews::from_config(&config).context("building blog views")?;
            render(&views, command).await
        }
    };

    match output {
        Ok(Some(value)) => {
            let text = if cli.pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{}", text);
            Ok(())
        }
        Ok(None) => {
            eprintln!("❌ Not found");
            std::process::exit(EXIT_NOT_FOUND);
        }
        Err(e) => {
            tracing::error!("{} (severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(e: &BlogError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn render(views: &BlogViews, command: &Command) -> blog_views::Result<Option<Value>> {
    let context = match command {
        Command::Index { page, categories } => Some(views.get_index(*page, categories).await?),
        Command::Article { slug } => views.get_article(slug).await?,
        Command::Latest => views.get_latest_article().await?,
        Command::Group {
            slug,
            page,
            category,
        } => views.get_group(slug, *page, category.as_deref()).await?,
        Command::Topic { slug, page } => views.get_topic(slug, *page).await?,
        Command::Tag { slug, page } => views.get_tag(slug, *page).await?,
        Command::Upcoming { page } => views.get_upcoming(*page).await?,
        Command::Author { username, page } => views.get_author(username, *page).await?,
        Command::LatestNews => Some(views.get_latest_news().await?),
        Command::Archives {
            page,
            group,
            month,
            year,
            category,
        } => {
            views
                .get_archives(*page, group.as_deref(), *month, *year, category.as_deref())
                .await?
        }
        Command::Fetch { .. } => None,
    };
    Ok(context.map(Value::Object))
}

async fn fetch_summary(urls: &[String], timeout_seconds: u64) -> blog_views::Result<Option<Value>> {
    let results = fetch_all(urls, std::time::Duration::from_secs(timeout_seconds)).await?;
    let summary: Vec<Value> = results.iter().map(summarise).collect();
    Ok(Some(Value::Array(summary)))
}

fn summarise(result: &FetchResult) -> Value {
    match &result.outcome {
        Ok(response) => json!({
            "url": result.url,
            "status": response.status,
            "content_type": response.header("content-type"),
            "body_bytes": response.body.len(),
        }),
        Err(kind) => json!({
            "url": result.url,
            "error": kind.to_string(),
        }),
    }
}
