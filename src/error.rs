//! Gate-level error types shared by configuration, challenge verification, and token handling.

// self
use crate::_prelude::*;

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
///
/// Every failure path maps to exactly one variant so callers can branch on the outcome without
/// inspecting messages.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; raised while constructing the gate.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The challenge response was not accepted (declined, unreachable endpoint, bad reply).
	#[error("Challenge response was rejected.")]
	ChallengeRejected(
		#[from]
		#[source]
		ChallengeError,
	),

	/// Token signature is intact but its expiry has passed.
	#[error("Token expired at {expired_at}.")]
	TokenExpired {
		/// Expiry instant encoded in the token.
		expired_at: OffsetDateTime,
	},
	/// Token is malformed, signed with another secret, or carries unreadable claims.
	#[error("Token is invalid.")]
	TokenInvalid {
		/// Underlying decoding or signature failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Token is valid but embeds different content than expected.
	#[error("Token content does not match the expected value.")]
	ContentMismatch,
	/// The expiry of a new token would fall outside the representable time range.
	#[error("Token issued at {issued_at} would expire out of range.")]
	ExpiryOverflow {
		/// Issue instant the expiry was computed from.
		issued_at: OffsetDateTime,
	},
	/// Content could not be serialized or signed into a token.
	#[error("Token could not be encoded.")]
	TokenEncode {
		/// Underlying serialization or signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}
impl Error {
	/// Returns a stable label for the variant, suitable for span or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::ChallengeRejected(_) => "challenge_rejected",
			Self::TokenExpired { .. } => "token_expired",
			Self::TokenInvalid { .. } => "token_invalid",
			Self::ContentMismatch => "content_mismatch",
			Self::ExpiryOverflow { .. } => "expiry_overflow",
			Self::TokenEncode { .. } => "token_encode",
		}
	}

	pub(crate) fn token_invalid(source: impl Into<jsonwebtoken::errors::Error>) -> Self {
		Self::TokenInvalid { source: source.into() }
	}
}

/// Configuration and validation failures raised while building a gate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration could not be parsed.")]
	Parse {
		/// Structured parsing failure including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Challenge endpoint cannot be parsed or rewritten.
	#[error("Challenge endpoint `{endpoint}` is invalid.")]
	InvalidEndpoint {
		/// Endpoint value that failed validation.
		endpoint: String,
	},
	/// Challenge endpoint must use HTTPS while secure transport is enabled.
	#[error("Challenge endpoint must use HTTPS: {endpoint}.")]
	InsecureEndpoint {
		/// Endpoint value that failed validation.
		endpoint: String,
	},

	/// `challenge.secret` was left empty.
	#[error("The challenge secret must be set.")]
	MissingChallengeSecret,
	/// `token.secret` was left empty.
	#[error("The token secret must be set.")]
	MissingTokenSecret,
	/// Token lifetime is zero or negative.
	#[error("The token expiry must be positive.")]
	NonPositiveExpiry,
	/// Token lifetime exceeds [`MAX_TTL`](crate::token::MAX_TTL).
	#[error("The token expiry exceeds the supported range.")]
	ExpiryOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Reasons a challenge response was not accepted.
#[derive(Debug, ThisError)]
pub enum ChallengeError {
	/// The endpoint answered with `success: false`.
	#[error("Verification endpoint declined the challenge response.")]
	Declined {
		/// `error-codes` reported by the endpoint, if any.
		error_codes: Vec<String>,
	},
	/// The endpoint replied with a non-success HTTP status.
	#[error("Verification endpoint returned HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
	/// The endpoint replied with a body that is not the expected JSON document.
	#[error("Verification endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// The endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl ChallengeError {
	/// Returns a stable label for the failure cause, suitable for span or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Declined { .. } => "declined",
			Self::UnexpectedStatus { .. } => "unexpected_status",
			Self::MalformedResponse { .. } => "malformed_response",
			Self::Transport(_) => "transport",
		}
	}

	/// Returns `true` when the endpoint gave a definitive negative answer, as opposed to a
	/// transport or protocol failure the caller may retry.
	pub fn is_declined(&self) -> bool {
		matches!(self, Self::Declined { .. })
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the verification endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the verification endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
