//! Partial-page responses.
//!
//! A page requested over XHR (`X-Requested-With: XMLHttpRequest`) with a
//! `node_name` query parameter gets a JSON object holding six conventionally
//! named blocks of the page template instead of the full HTML:
//!
//! | key          | block              |
//! |--------------|--------------------|
//! | `html`       | `{node}`           |
//! | `css`        | `{node}_styles`    |
//! | `canonical`  | `{node}_canonical` |
//! | `meta`       | `{node}_meta`      |
//! | `prescript`  | `pre_{node}`       |
//! | `postscript` | `post_{node}`      |

use std::collections::HashMap;
use std::net::IpAddr;

use minijinja::Template;
use mosaic_common::constants::blocks::{
    CANONICAL_SUFFIX, META_SUFFIX, POSTSCRIPT_PREFIX, PRESCRIPT_PREFIX, STYLES_SUFFIX,
};
use mosaic_common::constants::{NODE_NAME_PARAM, TEMPLATE_PARAM};
use mosaic_common::{MosaicError, PartialPayload};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::blocks::{BlockError, render_block_to_string, render_template_block};
use crate::template::{TemplateEngine, TemplateError};

/// What the responder needs to know about the incoming request
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub path: String,
    pub remote_addr: IpAddr,
    /// Client asked for a partial JSON fragment
    pub ajax: bool,
    pub query: HashMap<String, String>,
}

impl RequestInfo {
    pub fn node_name(&self) -> Option<&str> {
        self.query.get(NODE_NAME_PARAM).map(String::as_str)
    }

    /// Template context holding a `request` object
    pub fn context(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        ctx.insert(
            "request".to_string(),
            json!({
                "path": self.path,
                "remote_addr": self.remote_addr.to_string(),
                "ajax": self.ajax,
                "query": self.query,
            }),
        );
        ctx
    }
}

/// Either a full HTML page or a partial JSON payload
#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    Page(String),
    Partial(PartialPayload),
}

#[derive(Debug, Error)]
pub enum PartialError {
    /// None of the six blocks exist for the requested node
    #[error("Could not find matching nodes for '{0}'")]
    NoMatchingNodes(String),

    #[error("missing 'node_name' query parameter")]
    MissingNodeName,

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<PartialError> for MosaicError {
    fn from(err: PartialError) -> Self {
        match err {
            PartialError::NoMatchingNodes(_) => MosaicError::TemplateSyntax(err.to_string()),
            PartialError::MissingNodeName => MosaicError::InvalidInput(err.to_string()),
            PartialError::Template(e) => e.into(),
        }
    }
}

/// Render the six blocks of `node`. A missing block is blank; when all six
/// come out blank the node is reported as unmatched.
///
/// Each block gets a freshly evaluated template so a failed block cannot
/// leave state behind for the next one.
pub fn render_partial(
    template: &Template<'_, '_>,
    node: &str,
    ctx: &Map<String, Value>,
) -> Result<PartialPayload, PartialError> {
    let block = |name: &str| match render_template_block(template, name, ctx) {
        Ok(rendered) => Ok(rendered),
        Err(BlockError::NotFound(_)) => Ok(String::new()),
        Err(BlockError::Template(e)) => Err(e),
    };

    let payload = PartialPayload {
        html: block(node)?,
        css: block(&format!("{node}{STYLES_SUFFIX}"))?,
        canonical: block(&format!("{node}{CANONICAL_SUFFIX}"))?,
        meta: block(&format!("{node}{META_SUFFIX}"))?,
        prescript: block(&format!("{PRESCRIPT_PREFIX}{node}"))?,
        postscript: block(&format!("{POSTSCRIPT_PREFIX}{node}"))?,
    };

    if payload.is_empty() {
        return Err(PartialError::NoMatchingNodes(node.to_string()));
    }

    tracing::debug!(template = template.name(), node, "Rendered partial");
    Ok(payload)
}

/// Full page for normal requests, six-block JSON payload for AJAX requests.
///
/// `names` are candidate templates; the first that exists is used. Entries
/// of `context` shadow the `request` object.
pub fn render_ajax_response<S: AsRef<str>>(
    engine: &TemplateEngine,
    names: &[S],
    context: Map<String, Value>,
    request: &RequestInfo,
) -> Result<PageResponse, PartialError> {
    let template = engine.select_template(names)?;
    let mut ctx = request.context();
    ctx.extend(context);

    if !request.ajax {
        return Ok(PageResponse::Page(engine.render(&template, &ctx)?));
    }

    let node = request.node_name().ok_or(PartialError::MissingNodeName)?;
    render_partial(&template, node, &ctx).map(PageResponse::Partial)
}

/// Render one block of a template, exposing the request's query parameters
/// (minus `template`) as `{{ params }}` alongside `extra_context`
pub fn direct_block_to_template<S: AsRef<str>>(
    engine: &TemplateEngine,
    names: &[S],
    block: &str,
    extra_context: Map<String, Value>,
    request: &RequestInfo,
) -> Result<String, BlockError> {
    let params: Map<String, Value> = request
        .query
        .iter()
        .filter(|(key, _)| key.as_str() != TEMPLATE_PARAM)
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    let mut ctx = request.context();
    ctx.extend(extra_context);
    ctx.insert("params".to_string(), Value::Object(params));
    render_block_to_string(engine, names, block, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const BASE: &str = "<html><head>{% block main_meta %}{% endblock %}{% block main_styles %}{% endblock %}</head>\
<body>{% block main %}{% endblock %}</body></html>";

    fn engine() -> TemplateEngine {
        TemplateEngine::from_sources(&[
            ("base.html", BASE),
            (
                "only-html.html",
                "{% extends 'base.html' %}{% block main %}<p>{{ greeting }}</p>{% endblock %}",
            ),
            (
                "full.html",
                "{% extends 'base.html' %}\
{% block main %}body{% endblock %}\
{% block main_styles %}<style>p{}</style>{% endblock %}\
{% block main_meta %}<meta name=\"d\">{% endblock %}\
{% block main_canonical %}<link rel=\"canonical\">{% endblock %}\
{% block pre_main %}pre(){% endblock %}\
{% block post_main %}post(){% endblock %}",
            ),
            ("pre-only.html", "{% block pre_ %}x{% endblock %}"),
            ("no-blocks.html", "just text"),
        ])
        .unwrap()
    }

    fn request(ajax: bool, node: Option<&str>) -> RequestInfo {
        let mut query = HashMap::new();
        if let Some(node) = node {
            query.insert(NODE_NAME_PARAM.to_string(), node.to_string());
        }
        RequestInfo {
            path: "/".to_string(),
            remote_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ajax,
            query,
        }
    }

    fn greeting() -> Map<String, Value> {
        let mut context = Map::new();
        context.insert("greeting".to_string(), json!("hi"));
        context
    }

    #[test]
    fn test_ajax_with_only_base_block() {
        let response =
            render_ajax_response(&engine(), &["only-html.html"], greeting(), &request(true, Some("main")))
                .unwrap();

        assert_eq!(
            response,
            PageResponse::Partial(PartialPayload {
                html: "<p>hi</p>".to_string(),
                ..PartialPayload::empty()
            })
        );
    }

    #[test]
    fn test_ajax_with_every_block() {
        let response =
            render_ajax_response(&engine(), &["full.html"], Map::new(), &request(true, Some("main")))
                .unwrap();

        assert_eq!(
            response,
            PageResponse::Partial(PartialPayload {
                html: "body".to_string(),
                css: "<style>p{}</style>".to_string(),
                canonical: "<link rel=\"canonical\">".to_string(),
                meta: "<meta name=\"d\">".to_string(),
                prescript: "pre()".to_string(),
                postscript: "post()".to_string(),
            })
        );
    }

    #[test]
    fn test_ajax_with_no_matching_blocks() {
        let err = render_ajax_response(&engine(), &["full.html"], Map::new(), &request(true, Some("sidebar")))
            .unwrap_err();

        assert!(matches!(err, PartialError::NoMatchingNodes(ref node) if node == "sidebar"));
        assert_eq!(MosaicError::from(err).status_code(), 500);
    }

    #[test]
    fn test_non_ajax_renders_full_page() {
        let response =
            render_ajax_response(&engine(), &["only-html.html"], greeting(), &request(false, Some("main")))
                .unwrap();

        assert_eq!(
            response,
            PageResponse::Page("<html><head></head><body><p>hi</p></body></html>".to_string())
        );
    }

    #[test]
    fn test_missing_node_name_is_rejected() {
        let missing = render_ajax_response(&engine(), &["full.html"], Map::new(), &request(true, None));
        assert!(matches!(missing, Err(PartialError::MissingNodeName)));
    }

    #[test]
    fn test_empty_node_name_is_searched_like_any_other() {
        let response = render_ajax_response(&engine(), &["pre-only.html"], Map::new(), &request(true, Some("")))
            .unwrap();
        assert_eq!(
            response,
            PageResponse::Partial(PartialPayload {
                prescript: "x".to_string(),
                ..PartialPayload::empty()
            })
        );

        let err = render_ajax_response(&engine(), &["no-blocks.html"], Map::new(), &request(true, Some("")))
            .unwrap_err();
        assert!(matches!(err, PartialError::NoMatchingNodes(ref node) if node.is_empty()));
    }

    #[test]
    fn test_template_candidates() {
        let response =
            render_ajax_response(&engine(), &["nope.html", "full.html"], Map::new(), &request(false, None))
                .unwrap();
        assert!(matches!(response, PageResponse::Page(ref html) if html.contains("body")));

        let err = render_ajax_response(&engine(), &["nope.html"], Map::new(), &request(false, None))
            .unwrap_err();
        assert!(matches!(err, PartialError::Template(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_request_is_visible_to_templates() {
        let engine = TemplateEngine::from_sources(&[(
            "t",
            "{% block b %}{{ request.remote_addr }} {{ request.ajax }}{% endblock %}",
        )])
        .unwrap();

        let response = render_ajax_response(&engine, &["t"], Map::new(), &request(true, Some("b"))).unwrap();
        let PageResponse::Partial(payload) = response else {
            panic!("expected partial");
        };
        assert_eq!(payload.html, "127.0.0.1 true");
    }

    #[test]
    fn test_direct_block_exposes_params() {
        let engine = TemplateEngine::from_sources(&[(
            "card.html",
            "<div>{% block card %}{{ params.id }}/{{ title }}/{{ params.template|default('-') }}{% endblock %}</div>",
        )])
        .unwrap();
        let mut req = request(false, None);
        req.query.insert("id".to_string(), "42".to_string());
        req.query.insert(TEMPLATE_PARAM.to_string(), "card.html".to_string());
        let mut extra = Map::new();
        extra.insert("title".to_string(), json!("Card"));

        let html = direct_block_to_template(&engine, &["card.html"], "card", extra, &req).unwrap();
        assert_eq!(html, "42/Card/-");

        assert!(matches!(
            direct_block_to_template(&engine, &["card.html"], "other", Map::new(), &req),
            Err(BlockError::NotFound(_))
        ));
    }
}
