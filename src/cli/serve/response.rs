//! HTTP response handlers.

use crate::dispatch::Payload;
use crate::utils::mime;
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with an in-memory bundle payload (status 200).
pub fn respond_payload(request: Request, payload: Payload) -> Result<()> {
    let cache_control = format!("max-age={}", payload.max_age);

    if is_head_request(&request) {
        let response = Response::empty(StatusCode(200))
            .with_header(header("Content-Type", &payload.content_type))
            .with_header(header("Cache-Control", &cache_control));
        return request.respond(response).map_err(Into::into);
    }

    let response = Response::from_data(payload.body)
        .with_status_code(StatusCode(200))
        .with_header(header("Content-Type", &payload.content_type))
        .with_header(header("Cache-Control", &cache_control));
    request.respond(response)?;
    Ok(())
}

/// Respond with a static file from the destination directory.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        let response =
            Response::empty(StatusCode(200)).with_header(header("Content-Type", content_type));
        return request.respond(response).map_err(Into::into);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(body)
        .with_status_code(StatusCode(200))
        .with_header(header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

/// Respond with a plain 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_plain(request, 404, "404 Not Found")
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_plain(request, 503, "503 Service Unavailable")
}

/// Respond with 405 for methods the bundle routes never handle.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_plain(request, 405, "405 Method Not Allowed")
}

/// Respond with a compilation or write error (500).
pub fn respond_error(request: Request, message: &str) -> Result<()> {
    send_plain(request, 500, message)
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_plain(request: Request, status: u16, body: &str) -> Result<()> {
    if is_head_request(&request) {
        let response = Response::empty(StatusCode(status))
            .with_header(header("Content-Type", mime::types::PLAIN));
        return request.respond(response).map_err(Into::into);
    }

    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", mime::types::PLAIN));
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Header {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).expect("static header values are valid")
}
