use crate::core::logic;
use crate::domain::model::Context;
use serde_json::Value;

pub fn get_index_context(
    page: u32,
    articles: Vec<Value>,
    total_pages: Option<u32>,
    featured_articles: Vec<Value>,
) -> Context {
    let mut context = Context::new();
    context.insert("current_page".to_string(), page.into());
    context.insert("total_pages".to_string(), total_pages.into());
    context.insert(
        "articles".to_string(),
        Value::Array(logic::transform_articles(articles)),
    );
    context.insert(
        "featured_articles".to_string(),
        Value::Array(logic::transform_articles(featured_articles)),
    );
    context
}

pub fn get_group_page_context(
    page: u32,
    articles: Vec<Value>,
    total_pages: Option<u32>,
    group: Value,
) -> Context {
    let mut context = get_index_context(page, articles, total_pages, Vec::new());
    context.insert("group".to_string(), group);
    context
}

pub fn get_topic_page_context(page: u32, articles: Vec<Value>, total_pages: Option<u32>) -> Context {
    get_index_context(page, articles, total_pages, Vec::new())
}

/// `related_articles` are expected to be transformed already.
pub fn build_article_context(article: Value, related_articles: Vec<Value>, tags: Vec<Value>) -> Context {
    let in_series = logic::is_in_series(&tags);

    let mut context = Context::new();
    context.insert(
        "article".to_string(),
        logic::transform_embedded_article(article),
    );
    context.insert("related_articles".to_string(), Value::Array(related_articles));
    context.insert("tags".to_string(), Value::Array(tags));
    context.insert("is_in_series".to_string(), in_series.into());
    context
}
