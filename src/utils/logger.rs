use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 優先使用的日誌環境變數，未設定時退回 `RUST_LOG`
pub const LOG_ENV_VAR: &str = "BLOG_VIEWS_LOG";

fn cli_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            // 詳細模式會顯示每一批請求的耗時
            let directives = if verbose {
                "blog_views=debug,warn"
            } else {
                "blog_views=info,warn"
            };
            EnvFilter::new(directives)
        })
}

/// Install the stderr subscriber for the CLI. stdout carries the JSON
/// context, so nothing is logged there. A second call is a no-op.
pub fn init_cli_logger(verbose: bool) {
    let installed = tracing_subscriber::registry()
        .with(cli_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed; keeping it");
    }
}
