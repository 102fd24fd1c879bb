//! Siteverify client that confirms a challenge response with the remote endpoint.

// self
use crate::{
	_prelude::*,
	config::Secret,
	error::{ChallengeError, TransportError},
	http::ChallengeHttpClient,
};

/// Successful siteverify verdict.
///
/// Only `success` is required on the wire; the remaining fields are filled in when the
/// provider reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteVerification {
	/// Whether the endpoint accepted the response.
	pub success: bool,
	/// Timestamp of the challenge load, as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub challenge_ts: Option<String>,
	/// Hostname of the site where the challenge was solved.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
	/// Provider error codes; usually only present when `success` is `false`.
	#[serde(default, rename = "error-codes", skip_serializing_if = "Vec::is_empty")]
	pub error_codes: Vec<String>,
}

/// Verifies challenge responses against a siteverify endpoint.
pub struct ChallengeVerifier<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	endpoint: Url,
	secret: Secret,
	http_client: Arc<C>,
}
impl<C> ChallengeVerifier<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// Creates a verifier for `endpoint` that authenticates with `secret`.
	pub fn new(endpoint: Url, secret: Secret, http_client: impl Into<Arc<C>>) -> Self {
		Self { endpoint, secret, http_client: http_client.into() }
	}

	/// Endpoint the verifier posts to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Posts `secret` + `response` to the endpoint and interprets the verdict.
	///
	/// Exactly one request is sent. Declines, non-2xx statuses, unreadable bodies, and
	/// transport failures each map to their own [`ChallengeError`] variant.
	pub async fn verify(&self, response: &str) -> Result<SiteVerification, ChallengeError> {
		let form = [("secret", self.secret.expose()), ("response", response)];
		let reply = self
			.http_client
			.post_form(&self.endpoint, &form)
			.await
			.map_err(TransportError::network)?;

		if !reply.is_success() {
			return Err(ChallengeError::UnexpectedStatus { status: reply.status });
		}

		let mut de = serde_json::Deserializer::from_slice(&reply.body);
		let verdict: SiteVerification = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ChallengeError::MalformedResponse { source, status: reply.status })?;

		if verdict.success {
			Ok(verdict)
		} else {
			Err(ChallengeError::Declined { error_codes: verdict.error_codes })
		}
	}
}
impl<C> Debug for ChallengeVerifier<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ChallengeVerifier")
			.field("endpoint", &self.endpoint.as_str())
			.field("secret", &self.secret)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{FormFuture, FormReply};

	#[derive(Debug)]
	struct Unreachable;
	impl Display for Unreachable {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("Endpoint unreachable.")
		}
	}
	impl StdError for Unreachable {}

	struct ScriptedClient {
		reply: Option<FormReply>,
		seen: std::sync::Mutex<Vec<Vec<(String, String)>>>,
	}
	impl ScriptedClient {
		fn replying(status: u16, body: &str) -> Self {
			Self {
				reply: Some(FormReply { status, body: body.as_bytes().to_vec() }),
				seen: Default::default(),
			}
		}

		fn unreachable() -> Self {
			Self { reply: None, seen: Default::default() }
		}
	}
	impl ChallengeHttpClient for ScriptedClient {
		type TransportError = Unreachable;

		fn post_form<'a>(
			&'a self,
			_endpoint: &'a Url,
			form: &'a [(&'static str, &'a str)],
		) -> FormFuture<'a, Self::TransportError> {
			Box::pin(async move {
				if let Ok(mut seen) = self.seen.lock() {
					let fields = form.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned()));

					seen.push(fields.collect());
				}

				self.reply.clone().ok_or(Unreachable)
			})
		}
	}

	fn verifier(client: ScriptedClient) -> ChallengeVerifier<ScriptedClient> {
		let endpoint = Url::parse("https://captcha.example.com/siteverify")
			.expect("Fixture URL should parse.");

		ChallengeVerifier::new(endpoint, Secret::new("site-secret"), client)
	}

	#[tokio::test]
	async fn success_verdict_is_returned() {
		let verifier = verifier(ScriptedClient::replying(
			200,
			r#"{"success":true,"hostname":"example.com","challenge_ts":"2024-05-01T10:00:00Z"}"#,
		));
		let verdict = verifier.verify("user-response").await.expect("Verdict should be success.");

		assert_eq!(verdict.hostname.as_deref(), Some("example.com"));

		let seen = verifier.http_client.seen.lock().expect("Recorder lock should not be poisoned.");

		assert_eq!(
			seen[0],
			vec![
				("secret".to_owned(), "site-secret".to_owned()),
				("response".to_owned(), "user-response".to_owned()),
			]
		);
	}

	#[tokio::test]
	async fn declined_verdict_carries_error_codes() {
		let verifier = verifier(ScriptedClient::replying(
			200,
			r#"{"success":false,"error-codes":["invalid-input-response"]}"#,
		));
		let err = verifier.verify("bogus").await.expect_err("Verdict should be declined.");

		match err {
			ChallengeError::Declined { error_codes } => {
				assert_eq!(error_codes, vec!["invalid-input-response".to_owned()]);
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[tokio::test]
	async fn non_success_status_is_reported() {
		let verifier = verifier(ScriptedClient::replying(503, "unavailable"));
		let err = verifier.verify("r").await.expect_err("5xx should fail.");

		assert!(matches!(err, ChallengeError::UnexpectedStatus { status: 503 }));
	}

	#[tokio::test]
	async fn malformed_body_reports_path() {
		let verifier = verifier(ScriptedClient::replying(200, r#"{"success":"yes"}"#));
		let err = verifier.verify("r").await.expect_err("Non-boolean success should fail.");

		match err {
			ChallengeError::MalformedResponse { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "success");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[tokio::test]
	async fn transport_failure_is_distinct() {
		let verifier = verifier(ScriptedClient::unreachable());
		let err = verifier.verify("r").await.expect_err("Unreachable endpoint should fail.");

		assert!(matches!(err, ChallengeError::Transport(TransportError::Network { .. })));
		assert!(!err.is_declined());
	}

	#[test]
	fn debug_output_redacts_secret() {
		let rendered = format!("{:?}", verifier(ScriptedClient::unreachable()));

		assert!(!rendered.contains("site-secret"));
	}
}
