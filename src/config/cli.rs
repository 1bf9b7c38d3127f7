use crate::config::toml_config::BlogConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "blog-views")]
#[command(about = "Build template-ready blog page contexts from a WordPress content API")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override api.base_url
    #[arg(long)]
    pub api_base: Option<String>,

    /// Override api.timeout_seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Front page listing
    Index {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, value_delimiter = ',')]
        categories: Vec<i64>,
    },
    /// Single article by slug
    Article { slug: String },
    /// Most recent article
    Latest,
    /// Articles in a group, optionally narrowed to a category slug
    Group {
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        category: Option<String>,
    },
    /// Articles for a topic tag
    Topic {
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Articles for a tag, including the tag itself
    Tag {
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Upcoming events and webinars
    Upcoming {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Articles by an author
    Author {
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Pinned and latest articles
    LatestNews,
    /// Archive listing
    Archives {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        /// Comma separated category slugs
        #[arg(long)]
        category: Option<String>,
    },
    /// Fetch arbitrary URLs concurrently and summarise each result
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

impl CliConfig {
    /// File config (or defaults) with command-line overrides applied, validated.
    pub fn load_blog_config(&self) -> Result<BlogConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path);
                BlogConfig::from_file(path)?
            }
            None => BlogConfig::default(),
        };

        if let Some(api_base) = &self.api_base {
            config.api.base_url = api_base.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.api.timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}
