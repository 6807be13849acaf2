//! Version tags for optimistic concurrency.
//!
//! Interventions carry `ETag: "v<version>"`. Writers send the tag back in
//! `If-Match`, quoted or not, with or without the `v`.

use axum::http::{HeaderMap, header};

use crate::error::ApiError;

pub fn etag(version: u64) -> String { format!("\"v{version}\"") }

/// The version named by `If-Match`, if the header is present.
pub fn if_match(headers: &HeaderMap) -> Result<Option<u64>, ApiError> {
  let Some(value) = headers.get(header::IF_MATCH) else {
    return Ok(None);
  };
  let raw = value
    .to_str()
    .map_err(|_| ApiError::BadRequest("If-Match is not valid ASCII".into()))?;
  parse_tag(raw)
    .map(Some)
    .ok_or_else(|| ApiError::BadRequest(format!("If-Match {raw:?} is not a version tag")))
}

fn parse_tag(raw: &str) -> Option<u64> {
  let tag = raw.trim();
  let tag = tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"');
  tag.strip_prefix('v').unwrap_or(tag).parse().ok()
}
