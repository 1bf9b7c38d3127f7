//! Reshaping of raw WordPress post objects into template-friendly values.

use chrono::{Month, NaiveDateTime};
use serde_json::Value;

const WP_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DISPLAY_DATE_FORMAT: &str = "%-d %B %Y";
const SERIES_TAG_PREFIX: &str = "sc:series";

/// Attach the featured image and author, add a human readable `date`,
/// event `start_date`/`end_date`, and flatten `group` to its first entry.
pub fn transform_article(
    mut article: Value,
    featured_image: Option<Value>,
    author: Option<Value>,
) -> Value {
    if let Some(fields) = article.as_object_mut() {
        decorate(fields, featured_image, author);
    }
    article
}

fn decorate(
    fields: &mut serde_json::Map<String, Value>,
    featured_image: Option<Value>,
    author: Option<Value>,
) {
    fields.insert("image".to_string(), featured_image.unwrap_or(Value::Null));
    fields.insert("author".to_string(), author.unwrap_or(Value::Null));

    let date_gmt = fields
        .get("date_gmt")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(date_gmt) = date_gmt {
        match format_wp_date(&date_gmt) {
            Some(date) => {
                fields.insert("date".to_string(), Value::String(date));
            }
            None => tracing::warn!("Unparseable date_gmt '{}'", date_gmt),
        }
    }

    let first_group = match fields.get("group") {
        Some(Value::Array(groups)) => groups.first().cloned(),
        _ => None,
    };
    if let Some(group) = first_group {
        fields.insert("group".to_string(), group);
    }

    if let Some(start) = event_date(fields, "_start") {
        fields.insert("start_date".to_string(), Value::String(start));
    }
    if let Some(end) = event_date(fields, "_end") {
        fields.insert("end_date".to_string(), Value::String(end));
    }
}

/// Like [`transform_article`], taking image and author from `_embedded`.
pub fn transform_embedded_article(article: Value) -> Value {
    let embedded = article.get("_embedded");
    let featured_image = embedded
        .and_then(|e| e.get("wp:featuredmedia"))
        .and_then(|media| media.get(0))
        .cloned();
    let author = embedded
        .and_then(|e| e.get("author"))
        .and_then(|authors| authors.get(0))
        .cloned();

    transform_article(article, featured_image, author)
}

pub fn transform_articles(articles: Vec<Value>) -> Vec<Value> {
    articles.into_iter().map(transform_embedded_article).collect()
}

/// "2019-08-07T10:11:12" -> "7 August 2019"
pub fn format_wp_date(date_gmt: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(date_gmt, WP_DATE_FORMAT)
        .ok()
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
}

// Event posts carry `_start_day`, `_start_month`, `_start_year` (and `_end_*`)
// as strings or numbers. All three must be present and non-empty.
fn event_date(fields: &serde_json::Map<String, Value>, prefix: &str) -> Option<String> {
    let part = |name: &str| -> Option<String> {
        match fields.get(&format!("{}_{}", prefix, name))? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };

    let day = part("day")?;
    let month: u8 = part("month")?.parse().ok()?;
    let year = part("year")?;
    let month = Month::try_from(month).ok()?;

    Some(format!("{} {} {}", day, month.name(), year))
}

/// Terms of the `post_tag` taxonomy embedded in a post.
pub fn get_embedded_tags(article: &Value) -> Vec<Value> {
    let Some(term_groups) = article
        .get("_embedded")
        .and_then(|e| e.get("wp:term"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    term_groups
        .iter()
        .filter_map(Value::as_array)
        .flatten()
        .filter(|term| term.get("taxonomy").and_then(Value::as_str) == Some("post_tag"))
        .cloned()
        .collect()
}

pub fn get_tag_id_list(tags: &[Value]) -> Vec<i64> {
    tags.iter()
        .filter_map(|tag| tag.get("id").and_then(Value::as_i64))
        .collect()
}

pub fn is_in_series(tags: &[Value]) -> bool {
    tags.iter().any(|tag| {
        tag.get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name.starts_with(SERIES_TAG_PREFIX))
    })
}

pub fn id_of(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_wp_date() {
        assert_eq!(
            format_wp_date("2019-08-07T10:11:12").as_deref(),
            Some("7 August 2019")
        );
        assert_eq!(
            format_wp_date("2018-11-21T00:00:00").as_deref(),
            Some("21 November 2018")
        );
        assert_eq!(format_wp_date("yesterday"), None);
    }

    #[test]
    fn test_transform_article_sets_derived_fields() {
        let article = json!({
            "id": 10,
            "date_gmt": "2019-08-12T09:30:00",
            "group": [{"slug": "cloud"}, {"slug": "desktop"}],
        });

        let out = transform_article(
            article,
            Some(json!({"source_url": "https://img/x.png"})),
            Some(json!({"name": "Jane"})),
        );

        assert_eq!(out["date"], "12 August 2019");
        assert_eq!(out["group"], json!({"slug": "cloud"}));
        assert_eq!(out["image"]["source_url"], "https://img/x.png");
        assert_eq!(out["author"]["name"], "Jane");
    }

    #[test]
    fn test_transform_article_keeps_empty_group_and_bad_dates() {
        let article = json!({"date_gmt": "not a date", "group": []});

        let out = transform_article(article, None, None);

        assert_eq!(out["group"], json!([]));
        assert!(out.get("date").is_none());
        assert_eq!(out["image"], Value::Null);
        assert_eq!(out["author"], Value::Null);
    }

    #[test]
    fn test_event_dates() {
        let article = json!({
            "_start_day": "7",
            "_start_month": "8",
            "_start_year": "2019",
            "_end_day": 9,
            "_end_month": 8,
            "_end_year": 2019,
        });

        let out = transform_article(article, None, None);

        assert_eq!(out["start_date"], "7 August 2019");
        assert_eq!(out["end_date"], "9 August 2019");
    }

    #[test]
    fn test_event_dates_need_all_parts() {
        let article = json!({"_start_day": "7", "_start_month": "", "_start_year": "2019"});

        let out = transform_article(article, None, None);

        assert!(out.get("start_date").is_none());
    }

    #[test]
    fn test_transform_embedded_article() {
        let article = json!({
            "id": 3,
            "_embedded": {
                "author": [{"name": "Sam"}],
                "wp:featuredmedia": [{"source_url": "https://img/a.jpg"}],
            },
        });

        let out = transform_embedded_article(article);

        assert_eq!(out["author"]["name"], "Sam");
        assert_eq!(out["image"]["source_url"], "https://img/a.jpg");
    }

    #[test]
    fn test_embedded_tags_and_series() {
        let article = json!({
            "_embedded": {
                "wp:term": [
                    [{"id": 1, "name": "Cloud", "taxonomy": "category"}],
                    [
                        {"id": 5, "name": "kubernetes", "taxonomy": "post_tag"},
                        {"id": 6, "name": "sc:series-k8s", "taxonomy": "post_tag"},
                    ],
                ],
            },
        });

        let tags = get_embedded_tags(&article);

        assert_eq!(get_tag_id_list(&tags), vec![5, 6]);
        assert!(is_in_series(&tags));
        assert!(!is_in_series(&tags[..1]));
    }

    #[test]
    fn test_embedded_tags_missing() {
        assert!(get_embedded_tags(&json!({"id": 1})).is_empty());
    }
}
