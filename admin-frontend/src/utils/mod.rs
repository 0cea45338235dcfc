use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

pub mod jwt;

pub const HX_REQUEST_HEADER: &str = "HX-Request";
pub const HX_REDIRECT_HEADER: &str = "HX-Redirect";

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST_HEADER)
}

/// HTMX client-side redirect.
pub fn hx_redirect(path: &str) -> Response {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(path) {
        Ok(value) => {
            headers.insert(HX_REDIRECT_HEADER, value);
            (StatusCode::OK, headers, "").into_response()
        }
        Err(_) => Redirect::to(path).into_response(),
    }
}

/// Redirect that fits the caller: an `HX-Redirect` for htmx requests,
/// otherwise `303 See Other`.
pub fn redirect_for(headers: &HeaderMap, path: &str) -> Response {
    if is_htmx(headers) {
        hx_redirect(path)
    } else {
        Redirect::to(path).into_response()
    }
}
