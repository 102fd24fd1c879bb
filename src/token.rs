//! HS256 token codec binding arbitrary content to an expiry.
//!
//! Tokens are JWTs whose payload is `{ "content": <any JSON>, "iat": <unix>, "exp": <unix> }`.
//! Anyone holding the signing secret can verify them, so a token minted by one process can be
//! checked by another.
//!
//! Expiry is enforced here rather than by `jsonwebtoken` so the check has zero leeway and can
//! be evaluated against an explicit instant: a token is valid strictly before `exp`.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
// self
use crate::{_prelude::*, config::Secret, error::ConfigError, obs};

/// Longest lifetime a codec accepts for issued tokens (100 years).
pub const MAX_TTL: Duration = Duration::seconds(100 * 365 * 24 * 60 * 60);

/// Rejects lifetimes that are not positive or exceed [`MAX_TTL`].
pub(crate) fn validate_ttl(ttl: Duration) -> Result<Duration, ConfigError> {
	if !ttl.is_positive() {
		return Err(ConfigError::NonPositiveExpiry);
	}
	if ttl > MAX_TTL {
		return Err(ConfigError::ExpiryOutOfRange);
	}

	Ok(ttl)
}

/// Claims carried by every token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims<T = Value> {
	/// Caller-supplied payload.
	pub content: T,
	/// Issue time, in unix seconds.
	pub iat: i64,
	/// Expiry time, in unix seconds.
	pub exp: i64,
}
impl<T> TokenClaims<T> {
	/// Returns `true` once `now` has reached the encoded expiry.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now.unix_timestamp() >= self.exp
	}

	/// Expiry as an [`OffsetDateTime`], if the encoded value is a representable instant.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.exp).ok()
	}
}

#[derive(Deserialize)]
struct ContentOnly {
	content: Value,
}

/// Freshly minted token plus the instants encoded inside it.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
	token: String,
	/// Issue instant, truncated to whole seconds.
	pub issued_at: OffsetDateTime,
	/// Expiry instant; the token is rejected from this moment on.
	pub expires_at: OffsetDateTime,
}
impl IssuedToken {
	/// Returns the encoded token.
	pub fn as_str(&self) -> &str {
		&self.token
	}

	/// Consumes the wrapper and returns the encoded token.
	pub fn into_string(self) -> String {
		self.token
	}
}
impl AsRef<str> for IssuedToken {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl From<IssuedToken> for String {
	fn from(value: IssuedToken) -> Self {
		value.token
	}
}
impl Debug for IssuedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuedToken")
			.field("fingerprint", &obs::fingerprint(&self.token))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Signs and verifies tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	ttl: Duration,
}
impl TokenCodec {
	/// Creates a codec that signs with `secret` and issues tokens valid for `ttl`.
	///
	/// `ttl` must be positive and no longer than [`MAX_TTL`].
	pub fn new(secret: &Secret, ttl: Duration) -> Result<Self, ConfigError> {
		let ttl = validate_ttl(ttl)?;
		let mut validation = Validation::new(Algorithm::HS256);

		validation.validate_exp = false;
		validation.leeway = 0;

		Ok(Self {
			encoding: EncodingKey::from_secret(secret.expose().as_bytes()),
			decoding: DecodingKey::from_secret(secret.expose().as_bytes()),
			validation,
			ttl,
		})
	}

	/// Lifetime applied to issued tokens.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Signs `content` into a token issued now.
	pub fn encode<T>(&self, content: &T) -> Result<IssuedToken>
	where
		T: ?Sized + Serialize,
	{
		self.encode_at(content, OffsetDateTime::now_utc())
	}

	/// Signs `content` into a token issued at `now`.
	///
	/// Fails with [`Error::ExpiryOverflow`] when `now + ttl` is not a representable instant.
	pub fn encode_at<T>(&self, content: &T, now: OffsetDateTime) -> Result<IssuedToken>
	where
		T: ?Sized + Serialize,
	{
		let overflow = || Error::ExpiryOverflow { issued_at: now };
		let issued_at = now.replace_nanosecond(0).map_err(|_| overflow())?;
		let expires_at = issued_at.checked_add(self.ttl).ok_or_else(overflow)?;
		let claims = TokenClaims {
			content,
			iat: issued_at.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
			.map_err(|source| Error::TokenEncode { source })?;

		Ok(IssuedToken { token, issued_at, expires_at })
	}

	/// Verifies signature and expiry against the current time.
	pub fn decode(&self, token: &str) -> Result<TokenClaims> {
		self.decode_at(token, OffsetDateTime::now_utc())
	}

	/// Verifies signature and expiry against `now`.
	///
	/// Signature and structure are checked first; only a correctly signed token can be
	/// reported as [`Error::TokenExpired`].
	pub fn decode_at(&self, token: &str, now: OffsetDateTime) -> Result<TokenClaims> {
		let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
			.map_err(Error::token_invalid)?;
		let claims = data.claims;
		let expired_at = claims.expires_at().ok_or_else(|| {
			Error::token_invalid(jsonwebtoken::errors::ErrorKind::InvalidToken)
		})?;

		if claims.is_expired_at(now) {
			return Err(Error::TokenExpired { expired_at });
		}

		Ok(claims)
	}

	/// Reads the embedded content without checking signature or expiry.
	///
	/// Never use the result for trust decisions.
	pub fn peek(&self, token: &str) -> Result<Value> {
		let mut validation = Validation::new(Algorithm::HS256);

		validation.insecure_disable_signature_validation();
		validation.validate_exp = false;
		validation.required_spec_claims.clear();

		jsonwebtoken::decode::<ContentOnly>(token, &self.decoding, &validation)
			.map(|data| data.claims.content)
			.map_err(Error::token_invalid)
	}
}
impl Debug for TokenCodec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCodec").field("ttl", &self.ttl).finish()
	}
}
