//! Application state and shared resources.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::captcha::CaptchaGenerator;
use crate::config::{AppConfig, PageConfig};
use crate::hashing::SaltedHasher;
use crate::template::TemplateEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Template engine over `template_dir`
    pub engine: Arc<TemplateEngine>,

    /// Pages keyed by request path
    pub pages: Arc<HashMap<String, PageConfig>>,

    /// CAPTCHA generator (absent when its assets failed to load)
    pub captcha: Option<Arc<CaptchaGenerator>>,
}

impl AppState {
    /// Create new application state, loading captcha assets
    pub fn new(config: AppConfig) -> Result<Self> {
        let hasher = SaltedHasher::from_secret(&config.secret_key);

        let captcha = match CaptchaGenerator::load(&config, hasher) {
            Ok(generator) => Some(Arc::new(generator)),
            Err(e) => {
                tracing::warn!(error = %e, "CAPTCHA disabled");
                None
            }
        };

        let engine = TemplateEngine::from_dir(&config.template_dir);

        Ok(Self::with_parts(config, engine, captcha))
    }

    /// Assemble state from already-built services
    pub fn with_parts(
        config: AppConfig,
        engine: TemplateEngine,
        captcha: Option<Arc<CaptchaGenerator>>,
    ) -> Self {
        let pages = config
            .pages
            .iter()
            .map(|page| (page.path.clone(), page.clone()))
            .collect();

        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            pages: Arc::new(pages),
            captcha,
        }
    }

    pub fn page(&self, path: &str) -> Option<&PageConfig> {
        self.pages.get(path)
    }

    /// True when the template directory can be read
    pub fn templates_readable(&self) -> bool {
        std::fs::read_dir(Path::new(&self.config.template_dir)).is_ok()
    }
}
