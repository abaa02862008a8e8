//! Transport primitives for OAuth 1.0a token exchanges and signed requests.
//!
//! The module keeps every request/response shape crate-owned so downstream crates can
//! integrate custom HTTP clients without depending on reqwest-specific structures.
//! [`Transport`] is the crate's only seam to an HTTP stack; [`CallbackReader`] is the
//! seam to the incoming authorization-callback request.

// self
use crate::{_prelude::*, error::TransportError};

/// HTTP methods used by flow requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PUT.
	Put,
	/// HTTP DELETE.
	Delete,
	/// HTTP HEAD.
	Head,
	/// HTTP PATCH.
	Patch,
}
impl RequestMethod {
	/// Returns the uppercase wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestMethod::Get => "GET",
			RequestMethod::Post => "POST",
			RequestMethod::Put => "PUT",
			RequestMethod::Delete => "DELETE",
			RequestMethod::Head => "HEAD",
			RequestMethod::Patch => "PATCH",
		}
	}
}
impl Display for RequestMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable outbound request value.
///
/// Every transformation returns a new value; signing never mutates its input. The URL
/// may carry a query string, and `form` holds body parameters that the transport
/// serializes as `application/x-www-form-urlencoded`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
	method: RequestMethod,
	url: Url,
	headers: BTreeMap<String, String>,
	form: Vec<(String, String)>,
}
impl OutboundRequest {
	/// Creates a request with no headers and no body form.
	pub fn new(method: RequestMethod, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), form: Vec::new() }
	}

	/// Returns the HTTP method.
	pub fn method(&self) -> RequestMethod {
		self.method
	}

	/// Returns the request URL, including any query string.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Returns all headers.
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Returns a single header value, if set.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}

	/// Returns the body-form parameters.
	pub fn form(&self) -> &[(String, String)] {
		&self.form
	}

	/// Returns the decoded query-string pairs of the URL.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		self.url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect()
	}

	/// Returns a copy with the header set.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Returns a copy with the URL replaced.
	pub fn with_url(mut self, url: Url) -> Self {
		self.url = url;

		self
	}

	/// Returns a copy whose URL query string is rebuilt from the provided pairs.
	pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut pairs = pairs.into_iter().peekable();

		if pairs.peek().is_none() {
			self.url.set_query(None);
		} else {
			self.url.query_pairs_mut().clear().extend_pairs(pairs);
		}

		self
	}

	/// Returns a copy with a body-form parameter appended.
	pub fn with_form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.push((name.into(), value.into()));

		self
	}

	/// Returns a copy with the body form replaced.
	pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
		self.form = form;

		self
	}
}

/// Response captured from a token endpoint or API call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code returned by the endpoint.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl TransportResponse {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a response from a status/body pair.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` when the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns the body for 2xx responses, or an [`TransportError::UnexpectedStatus`]
	/// carrying a truncated body preview otherwise.
	pub fn require_success(&self) -> Result<&str, TransportError> {
		if self.is_success() {
			Ok(&self.body)
		} else {
			Err(TransportError::UnexpectedStatus {
				status: self.status,
				body_preview: truncate_preview(&self.body),
			})
		}
	}
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= TransportResponse::BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= TransportResponse::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

/// Boxed future returned by [`Transport`] implementations.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports executing flow requests.
///
/// Implementations decide blocking vs non-blocking IO internally; the flow client only
/// awaits the returned future. Retries, if any, are the transport's responsibility—the
/// flow never re-sends on its own.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and captures the response status and body.
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_, TransportResponse>;

	/// Builds an empty request for the provided method and URL.
	fn build(&self, method: RequestMethod, url: Url) -> OutboundRequest {
		OutboundRequest::new(method, url)
	}
}

/// Reader over the incoming authorization-callback request.
///
/// Used to resolve `oauth_token`, `oauth_verifier`, and `denied` when the caller does
/// not pass them explicitly.
pub trait CallbackReader {
	/// Returns a query-string parameter of the callback request.
	fn query_param(&self, name: &str) -> Option<String>;

	/// Returns a body parameter of the callback request.
	fn body_param(&self, name: &str) -> Option<String>;

	/// Resolves a parameter from the query string first, then the body.
	fn param(&self, name: &str) -> Option<String> {
		self.query_param(name).or_else(|| self.body_param(name))
	}
}

/// [`CallbackReader`] over an already-parsed redirect URL or explicit pair lists.
#[derive(Clone, Debug, Default)]
pub struct ParsedCallback {
	query: BTreeMap<String, String>,
	body: BTreeMap<String, String>,
}
impl ParsedCallback {
	/// Captures the query parameters of a redirect URL.
	pub fn from_url(url: &Url) -> Self {
		let query = url
			.query_pairs()
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect();

		Self { query, body: BTreeMap::new() }
	}

	/// Captures explicit query and body pair lists.
	pub fn from_pairs<Q, B, K, V>(query: Q, body: B) -> Self
	where
		Q: IntoIterator<Item = (K, V)>,
		B: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			query: query.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
			body: body.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
		}
	}
}
impl CallbackReader for ParsedCallback {
	fn query_param(&self, name: &str) -> Option<String> {
		self.query.get(name).cloned()
	}

	fn body_param(&self, name: &str) -> Option<String> {
		self.body.get(name).cloned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects; configure any custom [`ReqwestClient`]
/// accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_, TransportResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method() {
				RequestMethod::Get => reqwest::Method::GET,
				RequestMethod::Post => reqwest::Method::POST,
				RequestMethod::Put => reqwest::Method::PUT,
				RequestMethod::Delete => reqwest::Method::DELETE,
				RequestMethod::Head => reqwest::Method::HEAD,
				RequestMethod::Patch => reqwest::Method::PATCH,
			};
			let mut builder = client.request(method, request.url().clone());

			for (name, value) in request.headers() {
				builder = builder.header(name, value);
			}

			if !request.form().is_empty() {
				let body = serde_urlencoded::to_string(request.form())
					.map_err(TransportError::network)?;

				builder = builder
					.header("content-type", "application/x-www-form-urlencoded")
					.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(TransportResponse::new(status, body))
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn with_header_leaves_the_original_untouched() {
		let original = OutboundRequest::new(RequestMethod::Get, url("https://example.com/api"));
		let decorated = original.clone().with_header("authorization", "OAuth ...");

		assert!(original.header("authorization").is_none());
		assert_eq!(decorated.header("authorization"), Some("OAuth ..."));
	}

	#[test]
	fn with_query_pairs_rebuilds_or_clears_the_query() {
		let request =
			OutboundRequest::new(RequestMethod::Get, url("https://example.com/api?old=1"));
		let rebuilt = request.clone().with_query_pairs([("a", "1"), ("b", "x y")]);

		assert_eq!(rebuilt.url().query(), Some("a=1&b=x+y"));
		assert_eq!(
			rebuilt.query_pairs(),
			vec![("a".to_owned(), "1".to_owned()), ("b".to_owned(), "x y".to_owned())]
		);

		let cleared = request.with_query_pairs(Vec::<(String, String)>::new());

		assert_eq!(cleared.url().query(), None);
	}

	#[test]
	fn require_success_truncates_long_error_bodies() {
		let ok = TransportResponse::new(200, "oauth_token=a&oauth_token_secret=b");

		assert_eq!(ok.require_success().expect("2xx should pass."), ok.body);

		let body = "x".repeat(300);
		let err = TransportResponse::new(400, body)
			.require_success()
			.expect_err("4xx should be rejected.");

		match err {
			TransportError::UnexpectedStatus { status, body_preview } => {
				assert_eq!(status, 400);
				assert_eq!(body_preview.chars().count(), 257);
				assert!(body_preview.ends_with('…'));
			},
			other => panic!("Expected UnexpectedStatus, got {other:?}."),
		}
	}

	#[test]
	fn parsed_callback_prefers_query_over_body() {
		let callback = ParsedCallback::from_pairs(
			[("oauth_token", "from-query")],
			[("oauth_token", "from-body"), ("oauth_verifier", "v-1")],
		);

		assert_eq!(callback.param("oauth_token"), Some("from-query".to_owned()));
		assert_eq!(callback.param("oauth_verifier"), Some("v-1".to_owned()));
		assert_eq!(callback.param("denied"), None);
	}

	#[test]
	fn parsed_callback_reads_redirect_urls() {
		let callback = ParsedCallback::from_url(&url(
			"https://app.example.com/cb?oauth_token=tok&oauth_verifier=ver",
		));

		assert_eq!(callback.query_param("oauth_token"), Some("tok".to_owned()));
		assert_eq!(callback.query_param("oauth_verifier"), Some("ver".to_owned()));
		assert_eq!(callback.body_param("oauth_token"), None);
	}
}
