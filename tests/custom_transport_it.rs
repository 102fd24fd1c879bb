// std
use std::sync::{
	Mutex,
	atomic::{AtomicUsize, Ordering},
};
// self
use captcha_gate::{
	_preludet::*,
	config::GateConfig,
	error::{ChallengeError, TransportError},
	gate::TokenGate,
	http::{ChallengeHttpClient, FormFuture, FormReply},
};

#[derive(Debug)]
enum FakeTransportError {
	Timeout,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Timeout => write!(f, "Transport timed out."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Default)]
struct RecordingHttpClient {
	verdict: Option<&'static str>,
	calls: AtomicUsize,
	requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}
impl RecordingHttpClient {
	fn answering(verdict: &'static str) -> Self {
		Self { verdict: Some(verdict), ..Default::default() }
	}

	fn timing_out() -> Self {
		Self::default()
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ChallengeHttpClient for RecordingHttpClient {
	type TransportError = FakeTransportError;

	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: &'a [(&'static str, &'a str)],
	) -> FormFuture<'a, Self::TransportError> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let fields = form.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

			self.requests
				.lock()
				.expect("Request log lock should not be poisoned.")
				.push((endpoint.to_string(), fields));

			match self.verdict {
				Some(body) => Ok(FormReply { status: 200, body: body.as_bytes().to_vec() }),
				None => Err(FakeTransportError::Timeout),
			}
		})
	}
}

fn build_gate(
	client: &Arc<RecordingHttpClient>,
	config: GateConfig,
) -> TokenGate<RecordingHttpClient> {
	TokenGate::with_http_client(&config, client.clone()).expect("Gate should build.")
}

#[tokio::test]
async fn gate_posts_secret_and_response_once() {
	let client = Arc::new(RecordingHttpClient::answering("{\"success\":true}"));
	let gate = build_gate(&client, GateConfig::new("site-secret", TEST_TOKEN_SECRET));

	gate.issue_token_for_challenge("user-response").await.expect("Challenge should pass.");

	assert_eq!(client.calls(), 1);

	let requests = client.requests.lock().expect("Request log lock should not be poisoned.");
	let (endpoint, fields) = &requests[0];

	assert_eq!(endpoint, "https://www.google.com/recaptcha/api/siteverify");
	assert_eq!(
		fields,
		&vec![
			("secret".to_owned(), "site-secret".to_owned()),
			("response".to_owned(), "user-response".to_owned()),
		]
	);
}

#[tokio::test]
async fn insecure_transport_posts_over_http() {
	let client = Arc::new(RecordingHttpClient::answering("{\"success\":true}"));
	let config =
		GateConfig::new("site-secret", TEST_TOKEN_SECRET).with_secure_transport(false);
	let gate = build_gate(&client, config);

	gate.issue_token_for_challenge("user-response").await.expect("Challenge should pass.");

	let requests = client.requests.lock().expect("Request log lock should not be poisoned.");

	assert_eq!(requests[0].0, "http://www.google.com/recaptcha/api/siteverify");
}

#[tokio::test]
async fn challenge_mock_never_touches_the_transport() {
	let client = Arc::new(RecordingHttpClient::answering("{\"success\":false}"));
	let config = GateConfig::new("site-secret", TEST_TOKEN_SECRET).with_challenge_mock(true);
	let gate = build_gate(&client, config);

	for response in ["", "some_invalid_captcha", "abc"] {
		gate.issue_token_for_challenge(response).await.expect("Mocked challenge should pass.");
	}

	assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
	let client = Arc::new(RecordingHttpClient::timing_out());
	let gate = build_gate(&client, GateConfig::new("site-secret", TEST_TOKEN_SECRET));
	let err = gate
		.issue_token_for_challenge("user-response")
		.await
		.expect_err("Timed out verification must not yield a token.");

	assert_eq!(client.calls(), 1);
	assert!(matches!(
		err,
		Error::ChallengeRejected(ChallengeError::Transport(TransportError::Network { .. }))
	));
}

#[tokio::test]
async fn gate_is_shareable_across_tasks() {
	let client = Arc::new(RecordingHttpClient::answering("{\"success\":true}"));
	let gate = Arc::new(build_gate(&client, GateConfig::new("site-secret", TEST_TOKEN_SECRET)));
	let handles = (0..4)
		.map(|i| {
			let gate = gate.clone();

			tokio::spawn(async move {
				let response = format!("response-{i}");
				let token = gate.issue_token_for_challenge(&response).await?;

				gate.verify_token_and_content(token.as_str(), &response).await
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		handle.await.expect("Task should not panic.").expect("Round trip should succeed.");
	}

	assert_eq!(client.calls(), 4);
}
