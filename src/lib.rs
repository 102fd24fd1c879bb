//! Human-verification gate for Rust services: check captcha responses against a siteverify
//! endpoint and hand out short-lived signed tokens that prove it.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod challenge;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod obs;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::GateConfig,
		gate::{ReqwestTokenGate, TokenGate},
		http::ReqwestHttpClient,
	};

	/// Challenge secret used across integration tests.
	pub const TEST_CHALLENGE_SECRET: &str = "challenge-secret";
	/// Token secret used across integration tests.
	pub const TEST_TOKEN_SECRET: &str = "123";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Configuration using the shared test secrets and a plain-HTTP siteverify endpoint.
	pub fn test_config(endpoint: &str) -> GateConfig {
		GateConfig::new(TEST_CHALLENGE_SECRET, TEST_TOKEN_SECRET)
			.with_challenge_endpoint(
				Url::parse(endpoint).expect("Failed to parse test siteverify endpoint."),
			)
			.with_secure_transport(false)
	}

	/// Constructs a [`TokenGate`] backed by the insecure test reqwest client.
	pub fn build_reqwest_test_gate(config: &GateConfig) -> ReqwestTokenGate {
		TokenGate::with_http_client(config, test_reqwest_http_client())
			.expect("Failed to build test token gate.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};
#[cfg(all(test, not(feature = "tracing")))] use tracing as _;
