use crate::domain::ports::ConfigProvider;
use crate::utils::error::{BlogError, Result};
use crate::utils::validation::{
    parse_api_base, validate_ids, validate_non_empty_string, validate_setting_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://admin.insights.ubuntu.com/wp-json/wp/v2";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
pub const MAX_TIMEOUT_SECONDS: u64 = 300;
/// Events and webinars categories on the default content API.
pub const DEFAULT_UPCOMING_CATEGORY_IDS: [i64; 2] = [1175, 1187];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub blog: BlogSection,
    pub api: ApiSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogSection {
    pub title: String,
    pub tag_ids: Vec<i64>,
    pub excluded_tags: Vec<i64>,
    pub upcoming_category_ids: Vec<i64>,
}

impl Default for BlogSection {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            tag_ids: Vec::new(),
            excluded_tags: Vec::new(),
            upcoming_category_ids: DEFAULT_UPCOMING_CATEGORY_IDS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl BlogConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BlogError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE})，未設定的變數保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BlogError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for BlogConfig {
    fn api_base(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn blog_title(&self) -> &str {
        &self.blog.title
    }

    fn tag_ids(&self) -> &[i64] {
        &self.blog.tag_ids
    }

    fn excluded_tags(&self) -> &[i64] {
        &self.blog.excluded_tags
    }

    fn upcoming_category_ids(&self) -> &[i64] {
        &self.blog.upcoming_category_ids
    }
}

impl Validate for BlogConfig {
    fn validate(&self) -> Result<()> {
        // 驗證 API 根路徑
        parse_api_base("api.base_url", &self.api.base_url)?;

        // 驗證請求逾時
        validate_setting_range(
            "api.timeout_seconds",
            self.api.timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        validate_non_empty_string("blog.title", &self.blog.title)?;

        // 驗證標籤與分類 id
        validate_ids("blog.tag_ids", &self.blog.tag_ids)?;
        validate_ids("blog.excluded_tags", &self.blog.excluded_tags)?;
        validate_ids("blog.upcoming_category_ids", &self.blog.upcoming_category_ids)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[blog]
title = "Ubuntu Blog"
tag_ids = [1, 2]
excluded_tags = [3]
upcoming_category_ids = [10]

[api]
base_url = "https://cms.example.com/wp-json/wp/v2"
timeout_seconds = 8
"#;

        let config = BlogConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.blog_title(), "Ubuntu Blog");
        assert_eq!(config.tag_ids(), &[1, 2]);
        assert_eq!(config.excluded_tags(), &[3]);
        assert_eq!(config.upcoming_category_ids(), &[10]);
        assert_eq!(config.api_base(), "https://cms.example.com/wp-json/wp/v2");
        assert_eq!(config.request_timeout(), Duration::from_secs(8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = BlogConfig::from_toml_str("[blog]\ntitle = \"Tech\"\n").unwrap();

        assert_eq!(config.blog.title, "Tech");
        assert_eq!(config.api, ApiSection::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.upcoming_category_ids(), &DEFAULT_UPCOMING_CATEGORY_IDS);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BLOG_VIEWS_TEST_API_BASE", "https://env.example.com/wp-json/wp/v2");

        let toml_content = r#"
[api]
base_url = "${BLOG_VIEWS_TEST_API_BASE}"
"#;

        let config = BlogConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://env.example.com/wp-json/wp/v2");

        std::env::remove_var("BLOG_VIEWS_TEST_API_BASE");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let config =
            BlogConfig::from_toml_str("[blog]\ntitle = \"${BLOG_VIEWS_SURELY_UNSET}\"\n").unwrap();
        assert_eq!(config.blog.title, "${BLOG_VIEWS_SURELY_UNSET}");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = BlogConfig::from_toml_str("[api]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let zero_timeout = BlogConfig::from_toml_str("[api]\ntimeout_seconds = 0\n").unwrap();
        assert!(zero_timeout.validate().is_err());

        let huge_timeout = BlogConfig::from_toml_str("[api]\ntimeout_seconds = 3600\n").unwrap();
        assert!(huge_timeout.validate().is_err());

        let with_query = BlogConfig::from_toml_str(
            "[api]\nbase_url = \"https://cms.example.com/wp-json/wp/v2?lang=en\"\n",
        )
        .unwrap();
        assert!(with_query.validate().is_err());

        let negative_tag = BlogConfig::from_toml_str("[blog]\ntag_ids = [1, -2]\n").unwrap();
        let err = negative_tag.validate().unwrap_err();
        assert!(
            matches!(err, BlogError::InvalidConfigValueError { ref field, .. } if field == "blog.tag_ids")
        );
    }

    #[test]
    fn test_malformed_toml() {
        let err = BlogConfig::from_toml_str("[blog\ntitle = 1").unwrap_err();
        assert!(matches!(err, BlogError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[blog]\ntitle = \"File Blog\"\ntag_ids = [7]\n")
            .unwrap();

        let config = BlogConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.blog.title, "File Blog");
        assert_eq!(config.tag_ids(), &[7]);
    }
}
