//! Demonstrates plugging a custom [`ChallengeHttpClient`] with its own timeout policy into the
//! gate.
//!
//! 1. Wrap a reqwest client so every siteverify POST carries a per-request timeout.
//! 2. Report timeouts through a dedicated transport error type.
//! 3. Hand the client to [`TokenGate::with_http_client`].
//! 4. Tell a declined challenge apart from a transport failure the caller may retry; the gate
//!    itself never retries.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	net::TcpListener,
	time::Duration,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use captcha_gate::{
	config::GateConfig,
	error::Error,
	gate::TokenGate,
	http::{ChallengeHttpClient, FormFuture, FormReply},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	// Accepts connections but never answers, so the request can only end by timing out.
	let stalled = TcpListener::bind("127.0.0.1:0")?;
	let endpoint = Url::parse(&format!("http://{}/siteverify", stalled.local_addr()?))?;
	let config = GateConfig::new("demo-challenge-secret", "demo-token-secret")
		.with_challenge_endpoint(endpoint)
		.with_secure_transport(false);
	let client = TimeoutHttpClient::new(Duration::from_millis(250))?;
	let gate: TokenGate<TimeoutHttpClient> = TokenGate::with_http_client(&config, client)?;

	match gate.issue_token_for_challenge("demo-response").await {
		Ok(_) => println!("A stalled endpoint unexpectedly verified the challenge."),
		Err(Error::ChallengeRejected(e)) if !e.is_declined() => {
			println!("Siteverify call failed without a verdict ({}); safe to retry.", e.kind())
		},
		Err(e) => println!("Challenge rejected: {e}."),
	}

	let mocked: TokenGate<TimeoutHttpClient> = TokenGate::with_http_client(
		&config.clone().with_challenge_mock(true),
		TimeoutHttpClient::new(Duration::from_millis(250))?,
	)?;
	let token = mocked.issue_token_for_challenge("demo-response").await?;

	mocked.verify_token_and_content(token.as_str(), "demo-response").await?;

	println!("Mocked challenge issued a token that expires at {}.", token.expires_at);

	Ok(())
}

#[derive(Debug)]
enum TimeoutTransportError {
	TimedOut(Duration),
	Other(reqwest::Error),
}
impl Display for TimeoutTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::TimedOut(after) => write!(f, "Siteverify call timed out after {after:?}."),
			Self::Other(e) => write!(f, "Siteverify call failed: {e}."),
		}
	}
}
impl StdError for TimeoutTransportError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		match self {
			Self::TimedOut(_) => None,
			Self::Other(e) => Some(e),
		}
	}
}

struct TimeoutHttpClient {
	client: reqwest::Client,
	timeout: Duration,
}
impl TimeoutHttpClient {
	fn new(timeout: Duration) -> reqwest::Result<Self> {
		Ok(Self { client: reqwest::Client::builder().build()?, timeout })
	}
}
impl ChallengeHttpClient for TimeoutHttpClient {
	type TransportError = TimeoutTransportError;

	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: &'a [(&'static str, &'a str)],
	) -> FormFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let map_err = |e: reqwest::Error| {
				if e.is_timeout() {
					TimeoutTransportError::TimedOut(self.timeout)
				} else {
					TimeoutTransportError::Other(e)
				}
			};
			let response = self
				.client
				.post(endpoint.clone())
				.timeout(self.timeout)
				.form(form)
				.send()
				.await
				.map_err(map_err)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(map_err)?.to_vec();

			Ok(FormReply { status, body })
		})
	}
}
