//! Token verification operations.
//!
//! Every operation first checks signature and expiry; content checks only run on tokens that
//! pass. With the token mock enabled all operations succeed without looking at the signature.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	gate::TokenGate,
	http::ChallengeHttpClient,
	obs::{OperationKind, OperationRecord},
};

impl<C> TokenGate<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// Verifies the token's signature and expiry.
	///
	/// Fails with [`Error::TokenExpired`] once the expiry has passed and with
	/// [`Error::TokenInvalid`] for any other problem (bad signature, malformed input).
	pub async fn verify_token(&self, token: &str) -> Result<()> {
		let record =
			OperationRecord::start(OperationKind::VerifyToken, Some(token), self.token_mock);

		if self.token_mock {
			return record.finish(Ok(()));
		}

		let result = record.span().in_scope(|| self.codec.decode(token).map(|_| ()));

		record.finish(result)
	}

	/// Verifies the token, then requires its content to equal `expected` exactly.
	///
	/// Equality is evaluated on the JSON representation, so `expected` may be any value that
	/// serializes to the same document as the content originally embedded.
	pub async fn verify_token_and_content<T>(&self, token: &str, expected: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		let record =
			OperationRecord::start(OperationKind::VerifyContent, Some(token), self.token_mock);

		if self.token_mock {
			return record.finish(Ok(()));
		}

		let result: Result<()> = record.span().in_scope(|| {
			let claims = self.codec.decode(token)?;

			match serde_json::to_value(expected) {
				Ok(expected) if expected == claims.content => Ok(()),
				_ => Err(Error::ContentMismatch),
			}
		});

		record.finish(result)
	}

	/// Verifies the token and returns its content deserialized as `T`.
	///
	/// A verified token always yields `Some`. Content that does not deserialize into `T` is
	/// reported as [`Error::TokenInvalid`].
	///
	/// `None` is only ever returned while `token.mock` is enabled. In that mode the call never
	/// fails: it returns the content when it can be read without verification and `None`
	/// otherwise. `None` is therefore not a verification verdict; outside mock mode every
	/// rejection is an `Err`.
	pub async fn verify_token_and_extract_content<T>(&self, token: &str) -> Result<Option<T>>
	where
		T: DeserializeOwned,
	{
		let record =
			OperationRecord::start(OperationKind::ExtractContent, Some(token), self.token_mock);

		if self.token_mock {
			let content =
				self.codec.peek(token).ok().and_then(|value| serde_json::from_value(value).ok());

			return record.finish(Ok(content));
		}

		let result: Result<Option<T>> = record.span().in_scope(|| {
			let claims = self.codec.decode(token)?;

			serde_json::from_value(claims.content).map(Some).map_err(Error::token_invalid)
		});

		record.finish(result)
	}
}
