//! The [`TokenGate`] façade: challenge-backed token issuance and token verification.

mod issue;
mod verify;

// self
use crate::{
	_prelude::*,
	challenge::ChallengeVerifier,
	config::{GateConfig, ResolvedConfig},
	http::ChallengeHttpClient,
	token::TokenCodec,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Gate specialized for the crate's default reqwest transport.
pub type ReqwestTokenGate = TokenGate<ReqwestHttpClient>;

/// Issues tokens for verified challenge responses and validates them later.
///
/// The gate holds only immutable configuration plus its two collaborators, so a single
/// instance can serve concurrent callers (share it behind an [`Arc`]). Construction fails
/// when either shared secret is missing; no partially configured gate can exist.
pub struct TokenGate<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	challenge: ChallengeVerifier<C>,
	codec: TokenCodec,
	challenge_mock: bool,
	token_mock: bool,
}
impl<C> TokenGate<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// Creates a gate that reuses the caller-provided transport.
	pub fn with_http_client(config: &GateConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let resolved = config.resolve()?;

		Self::from_resolved(resolved, http_client.into())
	}

	fn from_resolved(resolved: ResolvedConfig, http_client: Arc<C>) -> Result<Self> {
		let ResolvedConfig {
			endpoint,
			challenge_secret,
			challenge_mock,
			token_secret,
			ttl,
			token_mock,
		} = resolved;

		Ok(Self {
			challenge: ChallengeVerifier::new(endpoint, challenge_secret, http_client),
			codec: TokenCodec::new(&token_secret, ttl)?,
			challenge_mock,
			token_mock,
		})
	}

	/// Lifetime applied to issued tokens.
	pub fn ttl(&self) -> Duration {
		self.codec.ttl()
	}

	/// Siteverify endpoint the gate posts challenge responses to.
	pub fn challenge_endpoint(&self) -> &Url {
		self.challenge.endpoint()
	}

	/// Whether challenge verification is bypassed.
	pub fn is_challenge_mocked(&self) -> bool {
		self.challenge_mock
	}

	/// Whether token verification is bypassed.
	pub fn is_token_mocked(&self) -> bool {
		self.token_mock
	}

	/// Token codec backing the gate.
	pub fn codec(&self) -> &TokenCodec {
		&self.codec
	}
}
#[cfg(feature = "reqwest")]
impl TokenGate<ReqwestHttpClient> {
	/// Creates a gate backed by a freshly built reqwest client.
	///
	/// Use [`TokenGate::with_http_client`] to supply a client with custom timeouts or proxies.
	pub fn new(config: &GateConfig) -> Result<Self> {
		let resolved = config.resolve()?;
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::from_resolved(resolved, Arc::new(ReqwestHttpClient::with_client(client)))
	}
}
impl<C> Debug for TokenGate<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGate")
			.field("challenge", &self.challenge)
			.field("codec", &self.codec)
			.field("challenge_mock", &self.challenge_mock)
			.field("token_mock", &self.token_mock)
			.finish()
	}
}
