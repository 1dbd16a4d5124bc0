// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub Actions runtime OIDC: request a signed identity token.
//!
//! The runner exposes a per-job token endpoint through the
//! `ACTIONS_ID_TOKEN_REQUEST_URL` / `ACTIONS_ID_TOKEN_REQUEST_TOKEN`
//! environment variables. Both are only present when the workflow job grants
//! the `id-token: write` permission.

use anyhow::Context;
use serde::Deserialize;

/// The runner's identity-token endpoint plus its bearer credential.
#[derive(Debug, Clone)]
pub struct IdTokenEndpoint {
    pub request_url: String,
    pub request_token: String,
}

impl IdTokenEndpoint {
    /// Read the endpoint from the Actions runtime environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let request_url = std::env::var("ACTIONS_ID_TOKEN_REQUEST_URL")
            .map_err(|_| anyhow::anyhow!("ACTIONS_ID_TOKEN_REQUEST_URL is not set"))?;
        let request_token = std::env::var("ACTIONS_ID_TOKEN_REQUEST_TOKEN")
            .map_err(|_| anyhow::anyhow!("ACTIONS_ID_TOKEN_REQUEST_TOKEN is not set"))?;
        Ok(Self { request_url, request_token })
    }

    /// Build the request URL with the audience appended.
    ///
    /// The runtime URL already carries a query string (`?api-version=...`),
    /// so the audience is normally appended with `&`.
    pub fn url_for_audience(&self, audience: &str) -> String {
        let sep = if self.request_url.contains('?') { '&' } else { '?' };
        format!("{}{}audience={}", self.request_url, sep, urlencoding(audience))
    }
}

/// Identity-token response from the runner.
#[derive(Debug, Deserialize)]
struct IdTokenResponse {
    #[serde(default)]
    value: String,
}

/// Request a signed OIDC identity token scoped to `audience`.
pub async fn request_id_token(
    client: &reqwest::Client,
    endpoint: &IdTokenEndpoint,
    audience: &str,
) -> anyhow::Result<String> {
    let resp = client
        .get(endpoint.url_for_audience(audience))
        .header("Authorization", format!("Bearer {}", endpoint.request_token))
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("id token request failed ({status}): {text}");
    }

    let body: IdTokenResponse =
        resp.json().await.context("failed to parse id token response")?;
    if body.value.is_empty() {
        anyhow::bail!("id token response did not contain a value");
    }
    Ok(body.value)
}

/// Percent-encode a query parameter value.
fn urlencoding(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0xf) as usize]));
            }
        }
    }
    out
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

#[cfg(test)]
#[path = "oidc_tests.rs"]
mod tests;
