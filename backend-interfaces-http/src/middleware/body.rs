use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Parses a JSON request body, inflating it first when the client sent
/// `Content-Encoding: gzip`. The inflated size is capped at `limit` bytes.
pub fn parse_json<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<T> {
    let content = maybe_gunzip(headers, body, limit)?;
    if content.trim().is_empty() {
        return Err(anyhow!("request body is empty"));
    }
    Ok(serde_json::from_str(&content)?)
}

/// `parse_json` with the failure mapped to a 400.
pub fn json_body<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &[u8],
    limit: u64,
) -> Result<T, HttpError> {
    parse_json(headers, body, limit).map_err(|err| {
        tracing::warn!(error = %err, "rejecting malformed request body");
        HttpError::BadRequest(format!("invalid request body: {}", err))
    })
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<String> {
    let gzipped = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false);
    if !gzipped {
        return Ok(String::from_utf8(body.to_vec())?);
    }
    let mut out = String::new();
    GzDecoder::new(body)
        .take(limit.saturating_add(1))
        .read_to_string(&mut out)?;
    if out.len() as u64 > limit {
        return Err(anyhow!("inflated body exceeds {} bytes", limit));
    }
    Ok(out)
}
