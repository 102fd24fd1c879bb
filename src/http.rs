//! Transport primitives for siteverify calls.
//!
//! The module exposes [`ChallengeHttpClient`] alongside [`FormReply`] so downstream crates can
//! plug in their own HTTP stack (timeouts, proxies, retries) without the gate knowing about it.
//! The gate only ever submits one form-encoded POST per challenge and reads the raw reply back.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;

/// Boxed future returned by [`ChallengeHttpClient::post_form`].
pub type FormFuture<'a, E> = Pin<Box<dyn Future<Output = Result<FormReply, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of submitting a siteverify form.
///
/// The trait is the gate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single client can be shared across gates, and the futures
/// they return must be `Send` so gate operations can hop executors.
pub trait ChallengeHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Submits `form` as an `application/x-www-form-urlencoded` POST to `endpoint`.
	///
	/// Implementations return the status and body for every HTTP response, including
	/// non-success statuses; only failures to obtain a response surface as errors.
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: &'a [(&'static str, &'a str)],
	) -> FormFuture<'a, Self::TransportError>;
}

/// Raw HTTP reply captured from the verification endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl FormReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Siteverify endpoints answer directly; configure any custom [`ReqwestClient`] with the
/// timeout and redirect policy the deployment needs before handing it to the gate.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}
#[cfg(feature = "reqwest")]
impl ChallengeHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: &'a [(&'static str, &'a str)],
	) -> FormFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let response = self.0.post(endpoint.clone()).form(form).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(FormReply { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reply_success_covers_2xx_only() {
		assert!(FormReply { status: 200, body: Vec::new() }.is_success());
		assert!(FormReply { status: 204, body: Vec::new() }.is_success());
		assert!(!FormReply { status: 302, body: Vec::new() }.is_success());
		assert!(!FormReply { status: 500, body: Vec::new() }.is_success());
	}
}
