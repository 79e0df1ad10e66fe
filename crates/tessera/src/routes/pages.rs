//! Page and block endpoints.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, Path, Query, State},
    http::{HeaderMap, Uri, request::Parts},
    response::{Html, IntoResponse, Response},
};
use mosaic_common::MosaicError;
use mosaic_common::constants::TEMPLATE_PARAM;
use mosaic_common::constants::headers::{X_FORWARDED_FOR, X_REQUESTED_WITH, XML_HTTP_REQUEST};
use serde_json::Map;

use super::{ApiError, blocking};
use crate::partial::{PageResponse, RequestInfo, direct_block_to_template, render_ajax_response};
use crate::state::AppState;

/// Client address: socket peer, else first `X-Forwarded-For` hop, else `0.0.0.0`
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub IpAddr);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(Self(addr.ip()));
        }

        let forwarded = parts
            .headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|hop| hop.trim().parse().ok());

        Ok(Self(forwarded.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))))
    }
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get(X_REQUESTED_WITH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case(XML_HTTP_REQUEST))
}

fn request_info(
    path: &str,
    headers: &HeaderMap,
    query: HashMap<String, String>,
    client: ClientAddr,
) -> RequestInfo {
    RequestInfo {
        path: path.to_string(),
        remote_addr: client.0,
        ajax: is_ajax(headers),
        query,
    }
}

/// Serve a configured page, or its partial payload for AJAX requests
pub async fn serve_page(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    client: ClientAddr,
) -> Result<Response, ApiError> {
    let path = uri.path().to_string();
    let page = state
        .page(&path)
        .cloned()
        .ok_or_else(|| MosaicError::TemplateNotFound(format!("no page at {path}")))?;

    let request = request_info(&path, &headers, query, client);
    let ajax = request.ajax;
    let engine = state.engine.clone();
    let response = blocking(move || {
        render_ajax_response(&engine, &page.templates, page.context, &request).map_err(ApiError::from)
    })
    .await?;

    tracing::debug!(
        path = %path,
        client = %client.0,
        ajax,
        "Served page"
    );

    Ok(match response {
        PageResponse::Page(html) => Html(html).into_response(),
        PageResponse::Partial(payload) => Json(payload).into_response(),
    })
}

/// Render one block of the template named by `?template=`
pub async fn serve_block(
    State(state): State<AppState>,
    Path(block): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    client: ClientAddr,
) -> Result<Html<String>, ApiError> {
    let template = query
        .get(TEMPLATE_PARAM)
        .cloned()
        .ok_or_else(|| MosaicError::InvalidInput(format!("missing '{TEMPLATE_PARAM}' query parameter")))?;

    let request = request_info(uri.path(), &headers, query, client);
    let engine = state.engine.clone();
    let html = blocking(move || {
        direct_block_to_template(&engine, &[template], &block, Map::new(), &request).map_err(ApiError::from)
    })
    .await?;

    Ok(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn client_of(request: Request<()>) -> IpAddr {
        let (mut parts, _) = request.into_parts();
        let ClientAddr(ip) = ClientAddr::from_request_parts(&mut parts, &()).await.unwrap();
        ip
    }

    #[tokio::test]
    async fn test_client_addr_sources() {
        let mut request = Request::builder()
            .header("X-Forwarded-For", "10.0.0.1")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 2], 4000))));
        assert_eq!(client_of(request).await, IpAddr::from([192, 168, 1, 2]));

        let request = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(client_of(request).await, IpAddr::from([203, 0, 113, 7]));

        let request = Request::builder()
            .header("X-Forwarded-For", "garbage")
            .body(())
            .unwrap();
        assert_eq!(client_of(request).await, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_ajax_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax(&headers));

        headers.insert("x-requested-with", "xmlhttprequest".parse().unwrap());
        assert!(is_ajax(&headers));

        headers.insert("x-requested-with", "fetch".parse().unwrap());
        assert!(!is_ajax(&headers));
    }
}
