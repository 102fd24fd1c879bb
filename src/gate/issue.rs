//! Token issuance, with or without a preceding challenge check.
//!
//! [`TokenGate::issue_token_for_challenge`] performs at most one outbound siteverify call. When
//! the challenge mock is enabled the call is skipped entirely and the response is treated as
//! verified. Nothing is retried; callers own the retry policy for transport failures.

// self
use crate::{
	_prelude::*,
	gate::TokenGate,
	http::ChallengeHttpClient,
	obs::{OperationKind, OperationRecord},
	token::IssuedToken,
};

impl<C> TokenGate<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// Verifies `response` with the siteverify endpoint and mints a token embedding it.
	///
	/// Fails with [`Error::ChallengeRejected`] (and mints nothing) when the endpoint declines the
	/// response or cannot be reached.
	pub async fn issue_token_for_challenge(&self, response: &str) -> Result<IssuedToken> {
		self.issue_token_for_challenge_with_content(response, response).await
	}

	/// Verifies `response`, then mints a token embedding `content` instead of the response.
	pub async fn issue_token_for_challenge_with_content<T>(
		&self,
		response: &str,
		content: &T,
	) -> Result<IssuedToken>
	where
		T: ?Sized + Serialize + Sync,
	{
		let record = OperationRecord::start(
			OperationKind::IssueForChallenge,
			Some(response),
			self.challenge_mock,
		);
		let result = record
			.span()
			.instrument(async move {
				if !self.challenge_mock {
					self.challenge.verify(response).await?;
				}

				self.codec.encode(content)
			})
			.await;

		record.finish(result)
	}

	/// Mints a token embedding `content` without any challenge check.
	pub fn issue_token<T>(&self, content: &T) -> Result<IssuedToken>
	where
		T: ?Sized + Serialize,
	{
		let record = OperationRecord::start(OperationKind::IssueToken, None, false);
		let result = record.span().in_scope(|| self.codec.encode(content));

		record.finish(result)
	}
}
