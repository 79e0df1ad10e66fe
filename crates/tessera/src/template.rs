//! Template environment shared by every request.
//!
//! Templates live under `template_dir` and are loaded lazily through
//! minijinja's path loader; a loaded template stays compiled in the
//! environment for the life of the process.

use std::path::Path;

use minijinja::{Environment, ErrorKind, Template, path_loader};
use mosaic_common::MosaicError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// None of the candidate names resolved to a template
    #[error("template not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Engine(#[from] minijinja::Error),
}

impl From<TemplateError> for MosaicError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::NotFound(_) => MosaicError::TemplateNotFound(err.to_string()),
            TemplateError::Engine(e) => match e.kind() {
                ErrorKind::TemplateNotFound => MosaicError::TemplateNotFound(e.to_string()),
                ErrorKind::SyntaxError => MosaicError::TemplateSyntax(e.to_string()),
                ErrorKind::UnknownBlock => MosaicError::BlockNotFound(e.to_string()),
                _ => MosaicError::Render(e.to_string()),
            },
        }
    }
}

/// Loads and renders templates
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Engine loading templates from files under `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        Self { env }
    }

    /// Engine over in-memory sources
    #[cfg(test)]
    pub fn from_sources(templates: &[(&'static str, &'static str)]) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for &(name, source) in templates {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Load a single template by name
    pub fn get_template(&self, name: &str) -> Result<Template<'_, '_>, TemplateError> {
        self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => TemplateError::NotFound(name.to_string()),
            _ => e.into(),
        })
    }

    /// Load the first template in `names` that exists
    pub fn select_template<S: AsRef<str>>(&self, names: &[S]) -> Result<Template<'_, '_>, TemplateError> {
        for name in names {
            match self.get_template(name.as_ref()) {
                Err(TemplateError::NotFound(_)) => continue,
                result => return result,
            }
        }

        let tried: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        Err(TemplateError::NotFound(tried.join(", ")))
    }

    /// Render a whole template, resolving its `extends` chain
    pub fn render<C: Serialize>(&self, template: &Template<'_, '_>, ctx: C) -> Result<String, TemplateError> {
        let rendered = template.render(ctx)?;
        tracing::debug!(template = template.name(), "Rendered template");
        Ok(rendered)
    }
}
