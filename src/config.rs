//! Gate configuration with per-field defaults and fail-fast validation.
//!
//! [`GateConfig`] is split into a `challenge` namespace (siteverify endpoint settings) and a
//! `token` namespace (signing settings). Every field is optional when deserializing; missing
//! values fall back to the documented defaults. Validation runs once, when a
//! [`TokenGate`](crate::gate::TokenGate) is constructed, and produces a [`ResolvedConfig`] that
//! the gate holds for its whole lifetime.

mod secret;

pub use secret::*;

// self
use crate::{_prelude::*, error::ConfigError, token};

/// Siteverify endpoint used when no override is configured.
pub const DEFAULT_CHALLENGE_ENDPOINT: &str = "https://www.google.com/recaptcha/api/siteverify";
/// Token lifetime applied when `token.expiry_seconds` is not configured.
pub const DEFAULT_EXPIRY_SECONDS: u64 = 600;

/// Top-level gate configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
	/// Challenge-verification settings.
	pub challenge: ChallengeConfig,
	/// Token signing settings.
	pub token: TokenConfig,
}
impl GateConfig {
	/// Creates a configuration with both shared secrets set and every other field defaulted.
	pub fn new(challenge_secret: impl Into<Secret>, token_secret: impl Into<Secret>) -> Self {
		Self {
			challenge: ChallengeConfig { secret: challenge_secret.into(), ..Default::default() },
			token: TokenConfig { secret: token_secret.into(), ..Default::default() },
		}
	}

	/// Parses a JSON document, reporting the path of the offending field on failure.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ConfigError::Parse { source })
	}

	/// Overrides the siteverify endpoint.
	pub fn with_challenge_endpoint(mut self, endpoint: Url) -> Self {
		self.challenge.endpoint = Some(endpoint);

		self
	}

	/// Enables or disables HTTPS for the siteverify call.
	pub fn with_secure_transport(mut self, secure: bool) -> Self {
		self.challenge.secure_transport = secure;

		self
	}

	/// Enables or disables the challenge mock bypass.
	pub fn with_challenge_mock(mut self, mock: bool) -> Self {
		self.challenge.mock = mock;

		self
	}

	/// Overrides the token lifetime in seconds.
	pub fn with_expiry_seconds(mut self, seconds: u64) -> Self {
		self.token.expiry_seconds = seconds;

		self
	}

	/// Enables or disables the token mock bypass.
	pub fn with_token_mock(mut self, mock: bool) -> Self {
		self.token.mock = mock;

		self
	}

	/// Validates invariants and derives the values the gate works with.
	pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
		if self.challenge.secret.is_empty() {
			return Err(ConfigError::MissingChallengeSecret);
		}
		if self.token.secret.is_empty() {
			return Err(ConfigError::MissingTokenSecret);
		}

		Ok(ResolvedConfig {
			endpoint: self.challenge.resolve_endpoint()?,
			challenge_secret: self.challenge.secret.clone(),
			challenge_mock: self.challenge.mock,
			token_secret: self.token.secret.clone(),
			ttl: self.token.ttl()?,
			token_mock: self.token.mock,
		})
	}
}

/// Settings for the remote challenge-verification call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
	/// Shared secret sent as the `secret` form field. Required.
	pub secret: Secret,
	/// Calls the endpoint over HTTPS when `true`; rewrites it to plain HTTP when `false`.
	pub secure_transport: bool,
	/// Skips the remote call and treats every challenge response as verified.
	pub mock: bool,
	/// Siteverify endpoint override; [`DEFAULT_CHALLENGE_ENDPOINT`] when unset.
	pub endpoint: Option<Url>,
}
impl ChallengeConfig {
	fn resolve_endpoint(&self) -> Result<Url, ConfigError> {
		let mut endpoint = match &self.endpoint {
			Some(url) => url.clone(),
			None => Url::parse(DEFAULT_CHALLENGE_ENDPOINT).map_err(|_| {
				ConfigError::InvalidEndpoint { endpoint: DEFAULT_CHALLENGE_ENDPOINT.into() }
			})?,
		};

		if self.secure_transport {
			if endpoint.scheme() != "https" {
				return Err(ConfigError::InsecureEndpoint { endpoint: endpoint.to_string() });
			}
		} else if endpoint.set_scheme("http").is_err() {
			return Err(ConfigError::InvalidEndpoint { endpoint: endpoint.to_string() });
		}

		Ok(endpoint)
	}
}
impl Default for ChallengeConfig {
	fn default() -> Self {
		Self { secret: Secret::default(), secure_transport: true, mock: false, endpoint: None }
	}
}

/// Settings for token signing and verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
	/// HMAC secret used to sign and verify tokens. Required.
	pub secret: Secret,
	/// Lifetime of issued tokens, in seconds.
	pub expiry_seconds: u64,
	/// Skips signature and expiry checks; every verification succeeds.
	pub mock: bool,
}
impl TokenConfig {
	fn ttl(&self) -> Result<Duration, ConfigError> {
		let seconds =
			i64::try_from(self.expiry_seconds).map_err(|_| ConfigError::ExpiryOutOfRange)?;

		token::validate_ttl(Duration::seconds(seconds))
	}
}
impl Default for TokenConfig {
	fn default() -> Self {
		Self { secret: Secret::default(), expiry_seconds: DEFAULT_EXPIRY_SECONDS, mock: false }
	}
}

/// Validated configuration held by a gate for its lifetime.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
	/// Siteverify endpoint after scheme resolution.
	pub endpoint: Url,
	/// Shared secret for the siteverify call.
	pub challenge_secret: Secret,
	/// Challenge mock bypass flag.
	pub challenge_mock: bool,
	/// Token signing secret.
	pub token_secret: Secret,
	/// Token lifetime.
	pub ttl: Duration,
	/// Token mock bypass flag.
	pub token_mock: bool,
}
