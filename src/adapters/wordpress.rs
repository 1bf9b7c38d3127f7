//! WordPress REST API access.
//!
//! [`UrlBuilder`] turns queries into endpoint URLs; [`WordpressApi`] sends
//! them through the fetch aggregator and decodes the JSON bodies.

use crate::adapters::http::ReqwestTransport;
use crate::core::fetch::fetch_all_with;
use crate::domain::model::{FetchResponse, FetchResult, PageMetadata, ResultSet};
use crate::domain::ports::Transport;
use crate::utils::error::{BlogError, Result};
use crate::utils::validation::parse_api_base;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const WP_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Filters for the `posts` endpoint. Empty lists and `None` are left out of
/// the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
    pub tags: Vec<i64>,
    pub tags_exclude: Vec<i64>,
    pub categories: Vec<i64>,
    pub groups: Vec<i64>,
    /// Post ids to leave out.
    pub exclude: Vec<i64>,
    pub slugs: Vec<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sticky: Option<bool>,
    pub author: Option<i64>,
    pub after: Option<NaiveDateTime>,
    pub before: Option<NaiveDateTime>,
    pub embed: bool,
}

#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
}

impl UrlBuilder {
    pub fn new(api_base: &str) -> Result<Self> {
        let base = parse_api_base("api.base_url", api_base)?;
        Ok(Self { base })
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    pub fn posts(&self, query: &ArticleQuery) -> String {
        let mut url = self.endpoint("posts");
        {
            let mut pairs = url.query_pairs_mut();
            append_ids(&mut pairs, "tags", &query.tags);
            append_ids(&mut pairs, "tags_exclude", &query.tags_exclude);
            append_ids(&mut pairs, "categories", &query.categories);
            append_ids(&mut pairs, "group", &query.groups);
            append_ids(&mut pairs, "exclude", &query.exclude);
            if !query.slugs.is_empty() {
                pairs.append_pair("slug", &query.slugs.join(","));
            }
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(per_page) = query.per_page {
                pairs.append_pair("per_page", &per_page.to_string());
            }
            if let Some(sticky) = query.sticky {
                pairs.append_pair("sticky", if sticky { "true" } else { "false" });
            }
            if let Some(author) = query.author {
                pairs.append_pair("author", &author.to_string());
            }
            if let Some(after) = query.after {
                pairs.append_pair("after", &after.format(WP_DATETIME_FORMAT).to_string());
            }
            if let Some(before) = query.before {
                pairs.append_pair("before", &before.format(WP_DATETIME_FORMAT).to_string());
            }
            if query.embed {
                pairs.append_pair("_embed", "true");
            }
        }
        finish(url)
    }

    pub fn tags_by_slug(&self, slug: &str) -> String {
        self.by_slug("tags", slug)
    }

    pub fn categories_by_slug(&self, slug: &str) -> String {
        self.by_slug("categories", slug)
    }

    /// `group` is a custom taxonomy on the content API.
    pub fn groups_by_slug(&self, slug: &str) -> String {
        self.by_slug("group", slug)
    }

    pub fn users_by_slug(&self, username: &str) -> String {
        self.by_slug("users", username)
    }

    fn by_slug(&self, endpoint: &str, slug: &str) -> String {
        let mut url = self.endpoint(endpoint);
        url.query_pairs_mut().append_pair("slug", slug);
        url.into()
    }
}

fn append_ids(
    pairs: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    name: &str,
    ids: &[i64],
) {
    if ids.is_empty() {
        return;
    }
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    pairs.append_pair(name, &joined);
}

// `query_pairs_mut` leaves a dangling `?` when nothing was appended.
fn finish(mut url: Url) -> String {
    if url.query() == Some("") {
        url.set_query(None);
    }
    url.into()
}

pub struct WordpressApi<T: Transport = ReqwestTransport> {
    urls: UrlBuilder,
    transport: T,
    timeout: Duration,
}

impl WordpressApi<ReqwestTransport> {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        Self::with_transport(api_base, timeout, ReqwestTransport)
    }
}

impl<T: Transport> WordpressApi<T> {
    pub fn with_transport(api_base: &str, timeout: Duration, transport: T) -> Result<Self> {
        Ok(Self {
            urls: UrlBuilder::new(api_base)?,
            transport,
            timeout,
        })
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Raw concurrent access; failed slots are left for the caller to judge.
    pub async fn fetch_many(&self, urls: &[String]) -> Result<ResultSet> {
        fetch_all_with(&self.transport, urls, self.timeout).await
    }

    async fn fetch_one(&self, url: String) -> Result<FetchResponse> {
        let mut results = fetch_all_with(&self.transport, [url], self.timeout).await?;
        match results.pop() {
            Some(result) => into_response(result),
            None => Err(BlogError::ValidationError {
                message: "Empty result set for a single request".to_string(),
            }),
        }
    }

    pub async fn get_articles(&self, query: &ArticleQuery) -> Result<(Vec<Value>, PageMetadata)> {
        let url = self.urls.posts(query);
        let response = self.fetch_one(url.clone()).await?;
        let articles = parse_array(&url, &response)?;
        Ok((articles, PageMetadata::from_response(&response)))
    }

    pub async fn get_article(&self, tags: &[i64], slug: &str) -> Result<Option<Value>> {
        let query = ArticleQuery {
            tags: tags.to_vec(),
            slugs: vec![slug.to_string()],
            embed: true,
            ..Default::default()
        };
        let (articles, _) = self.get_articles(&query).await?;
        Ok(articles.into_iter().next())
    }

    pub async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Value>> {
        self.first_match(self.urls.tags_by_slug(slug)).await
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Value>> {
        self.first_match(self.urls.categories_by_slug(slug)).await
    }

    pub async fn get_group_by_slug(&self, slug: &str) -> Result<Option<Value>> {
        self.first_match(self.urls.groups_by_slug(slug)).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<Value>> {
        self.first_match(self.urls.users_by_slug(username)).await
    }

    async fn first_match(&self, url: String) -> Result<Option<Value>> {
        let response = self.fetch_one(url.clone()).await?;
        Ok(parse_array(&url, &response)?.into_iter().next())
    }
}

/// Turn a failed slot into an error for callers that cannot degrade.
pub fn into_response(result: FetchResult) -> Result<FetchResponse> {
    let FetchResult { url, outcome } = result;
    outcome.map_err(|kind| BlogError::FetchError { url, kind })
}

pub fn parse_array(url: &str, response: &FetchResponse) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(&response.body)? {
        Value::Array(items) => Ok(items),
        other => Err(BlogError::ResponseShapeError {
            url: url.to_string(),
            message: format!("expected a JSON array, got {}", json_type_name(&other)),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    const BASE: &str = "https://blog.example.com/wp-json/wp/v2";

    fn query_map(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_posts_url_with_filters() {
        let urls = UrlBuilder::new(BASE).unwrap();
        let query = ArticleQuery {
            tags: vec![1, 2],
            tags_exclude: vec![9],
            page: Some(2),
            per_page: Some(12),
            sticky: Some(false),
            embed: true,
            ..Default::default()
        };

        let url = urls.posts(&query);
        assert!(url.starts_with("https://blog.example.com/wp-json/wp/v2/posts?"));

        let params = query_map(&url);
        assert_eq!(params["tags"], "1,2");
        assert_eq!(params["tags_exclude"], "9");
        assert_eq!(params["page"], "2");
        assert_eq!(params["per_page"], "12");
        assert_eq!(params["sticky"], "false");
        assert_eq!(params["_embed"], "true");
        assert!(!params.contains_key("categories"));
        assert!(!params.contains_key("author"));
    }

    #[test]
    fn test_posts_url_without_filters_has_no_query() {
        let urls = UrlBuilder::new(BASE).unwrap();
        assert_eq!(
            urls.posts(&ArticleQuery::default()),
            "https://blog.example.com/wp-json/wp/v2/posts"
        );
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let urls = UrlBuilder::new("https://blog.example.com/wp-json/wp/v2/").unwrap();
        assert_eq!(
            urls.tags_by_slug("kubernetes"),
            "https://blog.example.com/wp-json/wp/v2/tags?slug=kubernetes"
        );
    }

    #[test]
    fn test_date_window_formatting() {
        let urls = UrlBuilder::new(BASE).unwrap();
        let after = NaiveDate::from_ymd_opt(2019, 8, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let before = NaiveDate::from_ymd_opt(2019, 9, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let query = ArticleQuery {
            after: Some(after),
            before: Some(before),
            groups: vec![4],
            author: Some(17),
            ..Default::default()
        };

        let params = query_map(&urls.posts(&query));
        assert_eq!(params["after"], "2019-08-01T00:00:00");
        assert_eq!(params["before"], "2019-09-01T00:00:00");
        assert_eq!(params["group"], "4");
        assert_eq!(params["author"], "17");
    }

    #[test]
    fn test_taxonomy_lookups() {
        let urls = UrlBuilder::new(BASE).unwrap();
        assert_eq!(
            urls.categories_by_slug("events"),
            format!("{}/categories?slug=events", BASE)
        );
        assert_eq!(urls.groups_by_slug("cloud"), format!("{}/group?slug=cloud", BASE));
        assert_eq!(urls.users_by_slug("jdoe"), format!("{}/users?slug=jdoe", BASE));
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(UrlBuilder::new("ftp://blog.example.com/api").is_err());
        assert!(UrlBuilder::new("not a url").is_err());
        assert!(UrlBuilder::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_parse_array_rejects_objects() {
        let response = FetchResponse {
            status: 200,
            headers: HashMap::new(),
            body: r#"{"code": "rest_no_route"}"#.to_string(),
        };

        let err = parse_array("http://x/posts", &response).unwrap_err();
        assert!(matches!(err, BlogError::ResponseShapeError { .. }));
    }
}
