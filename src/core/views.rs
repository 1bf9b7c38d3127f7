//! Page-level view logic: parameters in, template context out.
//!
//! Each method returns `Ok(None)` when the page's subject (article, tag,
//! group, author) does not exist, so a web layer can answer 404, and `Err`
//! when the content API itself failed.

use crate::adapters::http::ReqwestTransport;
use crate::adapters::wordpress::{into_response, parse_array, ArticleQuery, WordpressApi};
use crate::core::context::{
    build_article_context, get_group_page_context, get_index_context, get_topic_page_context,
};
use crate::core::logic::{self, id_of};
use crate::domain::model::{Context, FetchResult, PageMetadata};
use crate::domain::ports::{ConfigProvider, Transport};
use crate::utils::error::{BlogError, Result};
use crate::utils::validation::validate_range;
use chrono::{Months, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use std::collections::HashSet;

const INDEX_PAGE_SIZE: u32 = 12;
const HIGHLIGHT_PAGE_SIZE: u32 = 3;
const RELATED_PAGE_SIZE: u32 = 3;

pub struct BlogViews<T: Transport = ReqwestTransport> {
    api: WordpressApi<T>,
    tag_ids: Vec<i64>,
    excluded_tags: Vec<i64>,
    blog_title: String,
    upcoming_category_ids: Vec<i64>,
}

impl BlogViews<ReqwestTransport> {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport)
    }
}

impl<T: Transport> BlogViews<T> {
    pub fn with_transport<C: ConfigProvider>(config: &C, transport: T) -> Result<Self> {
        Ok(Self {
            api: WordpressApi::with_transport(
                config.api_base(),
                config.request_timeout(),
                transport,
            )?,
            tag_ids: config.tag_ids().to_vec(),
            excluded_tags: config.excluded_tags().to_vec(),
            blog_title: config.blog_title().to_string(),
            upcoming_category_ids: config.upcoming_category_ids().to_vec(),
        })
    }

    pub fn api(&self) -> &WordpressApi<T> {
        &self.api
    }

    fn base_query(&self, page: u32) -> ArticleQuery {
        ArticleQuery {
            tags: self.tag_ids.clone(),
            tags_exclude: self.excluded_tags.clone(),
            page: Some(page),
            embed: true,
            ..Default::default()
        }
    }

    fn with_title(&self, mut context: Context) -> Context {
        context.insert("title".to_string(), self.blog_title.clone().into());
        context
    }

    /// Blog front page. Page 1 also shows featured and upcoming posts, all
    /// fetched in one concurrent batch. Without configured upcoming
    /// categories the upcoming section is empty and never requested.
    pub async fn get_index(&self, page: u32, category_ids: &[i64]) -> Result<Context> {
        validate_range("page", page, 1, u32::MAX)?;

        let urls = self.api.urls();
        let mut batch = vec![urls.posts(&ArticleQuery {
            categories: category_ids.to_vec(),
            per_page: Some(INDEX_PAGE_SIZE),
            sticky: Some(false),
            ..self.base_query(page)
        })];

        if page == 1 {
            batch.push(urls.posts(&ArticleQuery {
                per_page: Some(HIGHLIGHT_PAGE_SIZE),
                sticky: Some(true),
                page: None,
                ..self.base_query(page)
            }));
            // 沒有設定活動分類時不送出請求，否則會拿到未過濾的最新文章
            if !self.upcoming_category_ids.is_empty() {
                batch.push(urls.posts(&ArticleQuery {
                    per_page: Some(HIGHLIGHT_PAGE_SIZE),
                    categories: self.upcoming_category_ids.clone(),
                    page: None,
                    ..self.base_query(page)
                }));
            }
        }

        let mut results = self.api.fetch_many(&batch).await?.into_iter();

        let main = results.next().ok_or_else(|| BlogError::ValidationError {
            message: "Missing result for the posts request".to_string(),
        })?;
        let posts_url = main.url.clone();
        let posts_response = into_response(main)?;
        let posts = parse_array(&posts_url, &posts_response)?;
        let metadata = PageMetadata::from_response(&posts_response);

        // 精選與活動區塊失敗時以空清單呈現
        let featured_posts = results.next().map(degrade_to_empty).unwrap_or_default();
        let upcoming_posts = results.next().map(degrade_to_empty).unwrap_or_default();

        let mut context = Context::new();
        context.insert("current_page".to_string(), page.into());
        context.insert("total_pages".to_string(), metadata.total_pages.into());
        context.insert(
            "posts".to_string(),
            Value::Array(logic::transform_articles(posts)),
        );
        context.insert(
            "featured_posts".to_string(),
            Value::Array(logic::transform_articles(featured_posts)),
        );
        context.insert(
            "upcoming_posts".to_string(),
            Value::Array(logic::transform_articles(upcoming_posts)),
        );
        Ok(self.with_title(context))
    }

    pub async fn get_article(&self, slug: &str) -> Result<Option<Context>> {
        match self.api.get_article(&self.tag_ids, slug).await? {
            Some(article) => Ok(Some(self.get_article_context(article).await?)),
            None => {
                tracing::info!("Article '{}' not found", slug);
                Ok(None)
            }
        }
    }

    pub async fn get_latest_article(&self) -> Result<Option<Context>> {
        let query = ArticleQuery {
            per_page: Some(1),
            page: None,
            ..self.base_query(1)
        };
        let (articles, _) = self.api.get_articles(&query).await?;
        match articles.into_iter().next() {
            Some(article) => Ok(Some(self.get_article_context(article).await?)),
            None => Ok(None),
        }
    }

    /// Article plus related posts: those sharing its tags whose own tags
    /// include every configured blog tag.
    async fn get_article_context(&self, article: Value) -> Result<Context> {
        let tags = logic::get_embedded_tags(&article);
        let tag_ids = logic::get_tag_id_list(&tags);

        let related_articles = if tag_ids.is_empty() {
            Vec::new()
        } else {
            let query = ArticleQuery {
                tags: tag_ids,
                tags_exclude: self.excluded_tags.clone(),
                per_page: Some(RELATED_PAGE_SIZE),
                exclude: id_of(&article).into_iter().collect(),
                embed: true,
                ..Default::default()
            };
            let (candidates, _) = self.api.get_articles(&query).await?;
            let required: HashSet<i64> = self.tag_ids.iter().copied().collect();
            candidates
                .into_iter()
                .filter(|candidate| {
                    let candidate_tags: HashSet<i64> = candidate
                        .get("tags")
                        .and_then(Value::as_array)
                        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                        .unwrap_or_default();
                    required.is_subset(&candidate_tags)
                })
                .map(logic::transform_embedded_article)
                .collect()
        };

        Ok(self.with_title(build_article_context(article, related_articles, tags)))
    }

    pub async fn get_group(
        &self,
        group_slug: &str,
        page: u32,
        category_slug: Option<&str>,
    ) -> Result<Option<Context>> {
        validate_range("page", page, 1, u32::MAX)?;

        let Some((group, group_id)) = with_id(self.api.get_group_by_slug(group_slug).await?)
        else {
            tracing::info!("Group '{}' not found", group_slug);
            return Ok(None);
        };

        let mut query = self.base_query(page);
        query.groups = vec![group_id];

        if let Some(slug) = category_slug.filter(|s| !s.is_empty()) {
            let Some((_, category_id)) = with_id(self.api.get_category_by_slug(slug).await?)
            else {
                tracing::info!("Category '{}' not found", slug);
                return Ok(None);
            };
            query.categories = vec![category_id];
        }

        let (articles, metadata) = self.api.get_articles(&query).await?;
        let mut context = get_group_page_context(page, articles, metadata.total_pages, group);
        context.insert(
            "category".to_string(),
            json!({ "slug": category_slug.unwrap_or_default() }),
        );
        Ok(Some(self.with_title(context)))
    }

    pub async fn get_topic(&self, topic_slug: &str, page: u32) -> Result<Option<Context>> {
        let Some((_, context)) = self.tagged_page(topic_slug, page).await? else {
            return Ok(None);
        };
        Ok(Some(self.with_title(context)))
    }

    pub async fn get_tag(&self, slug: &str, page: u32) -> Result<Option<Context>> {
        let Some((tag, mut context)) = self.tagged_page(slug, page).await? else {
            return Ok(None);
        };
        context.insert("tag".to_string(), tag);
        Ok(Some(self.with_title(context)))
    }

    async fn tagged_page(&self, slug: &str, page: u32) -> Result<Option<(Value, Context)>> {
        validate_range("page", page, 1, u32::MAX)?;

        let Some((tag, tag_id)) = with_id(self.api.get_tag_by_slug(slug).await?) else {
            tracing::info!("Tag '{}' not found", slug);
            return Ok(None);
        };

        let mut query = self.base_query(page);
        query.tags.push(tag_id);

        let (articles, metadata) = self.api.get_articles(&query).await?;
        let context = get_topic_page_context(page, articles, metadata.total_pages);
        Ok(Some((tag, context)))
    }

    pub async fn get_upcoming(&self, page: u32) -> Result<Option<Context>> {
        validate_range("page", page, 1, u32::MAX)?;

        let mut categories = Vec::new();
        for slug in ["events", "webinars"] {
            match with_id(self.api.get_category_by_slug(slug).await?) {
                Some((_, id)) => categories.push(id),
                None => {
                    tracing::warn!("Category '{}' not found", slug);
                    return Ok(None);
                }
            }
        }

        let mut query = self.base_query(page);
        query.categories = categories;

        let (articles, metadata) = self.api.get_articles(&query).await?;
        let context = get_index_context(page, articles, metadata.total_pages, Vec::new());
        Ok(Some(self.with_title(context)))
    }

    pub async fn get_author(&self, username: &str, page: u32) -> Result<Option<Context>> {
        validate_range("page", page, 1, u32::MAX)?;

        let Some((author, author_id)) = with_id(self.api.get_user_by_username(username).await?)
        else {
            tracing::info!("Author '{}' not found", username);
            return Ok(None);
        };

        let mut query = self.base_query(page);
        query.author = Some(author_id);

        let (articles, metadata) = self.api.get_articles(&query).await?;
        let mut context = get_index_context(page, articles, metadata.total_pages, Vec::new());
        context.insert("author".to_string(), author);
        context.insert(
            "total_posts".to_string(),
            metadata.total_posts.unwrap_or(0).into(),
        );
        Ok(Some(self.with_title(context)))
    }

    /// Latest pinned post, then the latest three non-sticky posts (four when
    /// a pinned post exists).
    pub async fn get_latest_news(&self) -> Result<Context> {
        let pinned_query = ArticleQuery {
            per_page: Some(1),
            sticky: Some(true),
            ..self.base_query(1)
        };
        let (pinned, _) = self.api.get_articles(&pinned_query).await?;

        let per_page = if pinned.is_empty() { 3 } else { 4 };
        let latest_query = ArticleQuery {
            per_page: Some(per_page),
            sticky: Some(false),
            ..self.base_query(1)
        };
        let (latest, _) = self.api.get_articles(&latest_query).await?;

        let mut context = Context::new();
        context.insert(
            "latest_articles".to_string(),
            Value::Array(logic::transform_articles(latest)),
        );
        context.insert(
            "latest_pinned_articles".to_string(),
            Value::Array(logic::transform_articles(pinned)),
        );
        Ok(context)
    }

    /// Archive listing filtered by group slug, comma separated category
    /// slugs, and a year or year + month window.
    pub async fn get_archives(
        &self,
        page: u32,
        group_slug: Option<&str>,
        month: Option<u32>,
        year: Option<i32>,
        category_slugs: Option<&str>,
    ) -> Result<Option<Context>> {
        validate_range("page", page, 1, u32::MAX)?;

        let mut query = self.base_query(page);

        let group = match group_slug.filter(|s| !s.is_empty()) {
            Some(slug) => match with_id(self.api.get_group_by_slug(slug).await?) {
                Some((group, group_id)) => {
                    query.groups = vec![group_id];
                    Some(group)
                }
                None => return Ok(None),
            },
            None => None,
        };

        if let Some(slugs) = category_slugs {
            for slug in slugs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match with_id(self.api.get_category_by_slug(slug).await?) {
                    Some((_, category_id)) => query.categories.push(category_id),
                    None => return Ok(None),
                }
            }
        }

        if let Some(year) = year {
            let (after, before) = archive_window(year, month)?;
            query.after = Some(after);
            query.before = Some(before);
        }

        let (articles, metadata) = self.api.get_articles(&query).await?;

        let mut context = match group {
            Some(group) => get_group_page_context(page, articles, metadata.total_pages, group),
            None => get_index_context(page, articles, metadata.total_pages, Vec::new()),
        };
        context.insert(
            "total_posts".to_string(),
            metadata.total_posts.unwrap_or(0).into(),
        );
        Ok(Some(self.with_title(context)))
    }
}

/// A term or user without an id cannot filter a query, so it counts as
/// missing.
fn with_id(found: Option<Value>) -> Option<(Value, i64)> {
    let value = found?;
    let id = id_of(&value)?;
    Some((value, id))
}

/// Secondary slots of a page may fail without failing the page.
fn degrade_to_empty(result: FetchResult) -> Vec<Value> {
    let url = result.url.clone();
    match into_response(result).and_then(|response| parse_array(&url, &response)) {
        Ok(posts) => posts,
        Err(err) => {
            tracing::warn!("Showing page without optional section: {}", err);
            Vec::new()
        }
    }
}

/// `[after, before)` bounds for an archive listing.
pub fn archive_window(year: i32, month: Option<u32>) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let invalid = || BlogError::ValidationError {
        message: format!("Invalid archive date: year {} month {:?}", year, month),
    };

    let (start, span) = match month {
        Some(month) => {
            validate_range("month", month, 1, 12)?;
            (NaiveDate::from_ymd_opt(year, month, 1), Months::new(1))
        }
        None => (NaiveDate::from_ymd_opt(year, 1, 1), Months::new(12)),
    };
    let start = start.ok_or_else(invalid)?;
    let end = start.checked_add_months(span).ok_or_else(invalid)?;

    Ok((
        start.and_hms_opt(0, 0, 0).ok_or_else(invalid)?,
        end.and_hms_opt(0, 0, 0).ok_or_else(invalid)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_window_month() {
        let (after, before) = archive_window(2019, Some(8)).unwrap();
        assert_eq!(after.to_string(), "2019-08-01 00:00:00");
        assert_eq!(before.to_string(), "2019-09-01 00:00:00");
    }

    #[test]
    fn test_archive_window_december_rolls_over() {
        let (after, before) = archive_window(2018, Some(12)).unwrap();
        assert_eq!(after.to_string(), "2018-12-01 00:00:00");
        assert_eq!(before.to_string(), "2019-01-01 00:00:00");
    }

    #[test]
    fn test_archive_window_whole_year() {
        let (after, before) = archive_window(2019, None).unwrap();
        assert_eq!(after.to_string(), "2019-01-01 00:00:00");
        assert_eq!(before.to_string(), "2020-01-01 00:00:00");
    }

    #[test]
    fn test_archive_window_rejects_bad_month() {
        assert!(matches!(
            archive_window(2019, Some(13)),
            Err(BlogError::ValidationError { .. })
        ));
        assert!(archive_window(2019, Some(0)).is_err());
    }

    #[test]
    fn test_with_id_requires_numeric_id() {
        let (term, id) = with_id(Some(json!({"id": 1175, "slug": "events"}))).unwrap();
        assert_eq!(id, 1175);
        assert_eq!(term["slug"], "events");

        assert!(with_id(Some(json!({"slug": "events"}))).is_none());
        assert!(with_id(Some(json!({"id": "1175"}))).is_none());
        assert!(with_id(None).is_none());
    }
}
