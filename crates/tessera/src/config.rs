//! Configuration management for Tessera.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use mosaic_common::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_MEDIA_ROOT, DEFAULT_STATIC_ROOT, DEFAULT_TEMPLATE_DIR, captcha,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory templates are loaded from
    #[serde(default = "default_template_dir")]
    pub template_dir: String,

    /// Root for static assets (captcha background and font)
    #[serde(default = "default_static_root")]
    pub static_root: String,

    /// Root for generated media, served under `/media`
    #[serde(default = "default_media_root")]
    pub media_root: String,

    /// Secret whose first 20 characters salt captcha hashes
    #[serde(default)]
    pub secret_key: String,

    /// CAPTCHA configuration
    #[serde(default)]
    pub captcha: CaptchaSettings,

    /// Pages served by the partial-render responder
    #[serde(default = "default_pages")]
    pub pages: Vec<PageConfig>,
}

/// CAPTCHA-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaSettings {
    /// Background image, relative to `static_root`
    #[serde(default = "default_background_path")]
    pub background_path: String,

    /// TrueType font, relative to `static_root`
    #[serde(default = "default_font_path")]
    pub font_path: String,

    /// Temp image directory, relative to `media_root`
    #[serde(default = "default_temp_path")]
    pub temp_path: String,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Temp images older than this are deleted
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

impl Default for CaptchaSettings {
    fn default() -> Self {
        Self {
            background_path: default_background_path(),
            font_path: default_font_path(),
            temp_path: default_temp_path(),
            font_size: default_font_size(),
            max_age_secs: default_max_age(),
        }
    }
}

/// A routed page
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// Request path, e.g. `/about`
    pub path: String,

    /// Candidate templates; the first that exists is used
    pub templates: Vec<String>,

    /// Extra variables for the template
    #[serde(default)]
    pub context: Map<String, Value>,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_template_dir() -> String { DEFAULT_TEMPLATE_DIR.to_string() }
fn default_static_root() -> String { DEFAULT_STATIC_ROOT.to_string() }
fn default_media_root() -> String { DEFAULT_MEDIA_ROOT.to_string() }
fn default_background_path() -> String { "img/bg.jpg".to_string() }
fn default_font_path() -> String { "img/captcha-font.ttf".to_string() }
fn default_temp_path() -> String { "img/tmp".to_string() }
fn default_font_size() -> f32 { captcha::FONT_SIZE }
fn default_max_age() -> u64 { captcha::MAX_AGE_SECS } // 3 minutes

fn default_pages() -> Vec<PageConfig> {
    vec![PageConfig {
        path: "/".to_string(),
        templates: vec!["index.html".to_string()],
        context: Map::new(),
    }]
}

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref template_dir) = args.template_dir {
            config.template_dir = template_dir.clone();
        }
        if let Some(ref secret_key) = args.secret_key {
            config.secret_key = secret_key.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject page tables the router cannot serve
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for page in &self.pages {
            if !page.path.starts_with('/') {
                bail!("Page path '{}' must start with '/'", page.path);
            }
            if page.templates.is_empty() {
                bail!("Page '{}' lists no templates", page.path);
            }
            if !seen.insert(page.path.as_str()) {
                bail!("Page '{}' is configured twice", page.path);
            }
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            template_dir: default_template_dir(),
            static_root: default_static_root(),
            media_root: default_media_root(),
            secret_key: String::new(),
            captcha: CaptchaSettings::default(),
            pages: default_pages(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.captcha.max_age_secs, 180);
        assert_eq!(config.pages[0].templates, vec!["index.html"]);
    }

    #[test]
    fn test_validate_rejects_bad_pages() {
        let mut config = AppConfig::default();
        config.pages.push(PageConfig {
            path: "about".to_string(),
            templates: vec!["about.html".to_string()],
            context: Map::new(),
        });
        assert!(config.validate().is_err());

        config.pages[1].path = "/about".to_string();
        config.pages[1].templates.clear();
        assert!(config.validate().is_err());

        config.pages[1].path = "/".to_string();
        config.pages[1].templates.push("x.html".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        std::fs::write(
            &path,
            r#"
listen_addr = "0.0.0.0:9000"
secret_key = "s3cr3t"

[captcha]
font_size = 24.0

[[pages]]
path = "/"
templates = ["home.html", "index.html"]

[[pages]]
path = "/about"
templates = ["about.html"]
context = { title = "About us" }
"#,
        )
        .unwrap();

        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.captcha.font_size, 24.0);
        assert_eq!(config.captcha.max_age_secs, 180);
        assert_eq!(config.pages.len(), 2);
        assert_eq!(config.pages[1].context["title"], "About us");
        config.validate().unwrap();
    }
}
