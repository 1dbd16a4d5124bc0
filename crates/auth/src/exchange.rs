// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! crates.io trusted-publishing token exchange.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::oidc::{self, IdTokenEndpoint};

/// OIDC audience crates.io expects identity tokens to be scoped to.
pub const CRATES_IO_OIDC_AUDIENCE: &str = "https://crates.io";

/// crates.io endpoint that trades an identity token for a registry token.
pub const CRATES_IO_TOKEN_URL: &str = "https://crates.io/api/v1/trusted_publishing/tokens";

/// Explicit per-request timeout for both HTTP legs. The operation is a single
/// short exchange, so anything slower than this is treated as a failure.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Trusted-publishing response from the registry.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    #[serde(default)]
    token: String,
}

/// Exchange an OIDC identity token for a crates.io registry token.
///
/// POSTs `{"jwt": <jwt>}` to `token_url` and returns the `token` field of the
/// response. The registry contract is exactly HTTP 200; any other status
/// fails with the status code and raw body surfaced verbatim.
pub async fn exchange_token(
    client: &reqwest::Client,
    token_url: &str,
    jwt: &str,
) -> anyhow::Result<String> {
    let json_body = serde_json::json!({ "jwt": jwt });
    let resp = client
        .post(token_url)
        .header("Content-Type", "application/json")
        .body(json_body.to_string())
        .send()
        .await?;

    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    if status != reqwest::StatusCode::OK {
        anyhow::bail!(
            "token exchange failed ({status}): ensure trusted publishing is \
             configured for this repository on crates.io; response: {text}"
        );
    }

    let parsed: TokenExchangeResponse = serde_json::from_str(&text)
        .context("failed to parse trusted publishing response")?;
    if parsed.token.is_empty() {
        anyhow::bail!("trusted publishing response did not contain a token");
    }
    Ok(parsed.token)
}

/// Run the full exchange against explicit endpoints.
///
/// Same sequence as [`exchange_oidc_token`] with the identity-provider
/// endpoint and registry URL injected instead of fixed.
pub async fn exchange_with(
    client: &reqwest::Client,
    endpoint: &IdTokenEndpoint,
    audience: &str,
    token_url: &str,
) -> anyhow::Result<String> {
    let jwt = oidc::request_id_token(client, endpoint, audience).await?;
    exchange_token(client, token_url, &jwt).await
}

/// Obtain a short-lived crates.io publishing token via trusted publishing.
///
/// Requests an identity token from the Actions runtime for the crates.io
/// audience, then exchanges it at the registry's trusted-publishing endpoint.
/// A fresh HTTP client is built per invocation; nothing is retried or cached.
pub async fn exchange_oidc_token() -> anyhow::Result<String> {
    crate::ensure_crypto();
    let client = reqwest::Client::builder()
        .user_agent("publish-crates")
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build http client")?;

    tracing::info!("requesting OIDC token for crates.io trusted publishing");
    let jwt = request_crates_io_id_token(&client).await.context(
        "failed to request OIDC token: trusted publishing requires the \
         `id-token: write` permission; add `permissions: id-token: write` \
         to your job configuration",
    )?;

    tracing::info!("exchanging OIDC token for crates.io registry token");
    let token = exchange_token(&client, CRATES_IO_TOKEN_URL, &jwt).await?;

    tracing::info!("obtained crates.io registry token via trusted publishing");
    Ok(token)
}

async fn request_crates_io_id_token(client: &reqwest::Client) -> anyhow::Result<String> {
    let endpoint = IdTokenEndpoint::from_env()?;
    oidc::request_id_token(client, &endpoint, CRATES_IO_OIDC_AUDIENCE).await
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
