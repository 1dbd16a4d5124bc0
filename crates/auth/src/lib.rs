// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trusted publishing for crates.io: exchange a CI runner's OIDC identity
//! token for a short-lived registry publishing token.
//!
//! The whole crate is one straight-line operation,
//! [`exchange_oidc_token`]: ask the GitHub Actions runtime for an identity
//! token scoped to the crates.io audience, POST it to the registry's
//! trusted-publishing endpoint, and return the token it hands back. Nothing
//! is cached, retried, or persisted; every failure is fatal and surfaced to
//! the caller with an actionable message.

pub mod exchange;
pub mod oidc;

pub use exchange::{
    exchange_oidc_token, exchange_token, CRATES_IO_OIDC_AUDIENCE, CRATES_IO_TOKEN_URL,
};

use std::sync::Once;

static CRYPTO_INIT: Once = Once::new();

/// Install the rustls crypto provider (needed for reqwest even on plain HTTP).
///
/// Safe to call multiple times — only the first call has effect.
pub(crate) fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
