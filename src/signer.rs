//! Request signing: RFC 3986 encoding, base-string and key composition, and
//! `oauth_*` parameter placement.
//!
//! [`RequestSigner::sign`] is the deterministic core of the crate: given the same
//! method, URL, and normalized parameter set, the signature base string is
//! byte-identical, which is what makes server-side verification possible.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	http::{OutboundRequest, RequestMethod},
	signature::{SignatureError, SignatureMethod},
	token::{ConsumerCredentials, OAuthToken},
};

const OAUTH_PREFIX: &str = "oauth_";
const AUTHORIZATION_HEADER: &str = "authorization";
const SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
const SIGNATURE_KEY: &str = "oauth_signature";
const PROTOCOL_VERSION: &str = "1.0";
const NONCE_ENTROPY_LEN: usize = 32;

/// RFC 3986 escape set: everything except unreserved `A-Z a-z 0-9 - . _ ~`.
/// Space encodes to `%20`, never `+`.
const RFC3986_ENCODE_SET: AsciiSet =
	NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a string with the OAuth (RFC 3986) escape set.
pub fn rawurlencode(input: &str) -> String {
	utf8_percent_encode(input, &RFC3986_ENCODE_SET).to_string()
}

/// Where signed `oauth_*` parameters travel on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationPlacement {
	/// Use the `Authorization` header for the listed methods; the query string otherwise.
	HeaderFor(Vec<RequestMethod>),
	/// Always use the `Authorization` header regardless of method.
	HeaderAlways,
}
impl AuthorizationPlacement {
	fn uses_header(&self, method: RequestMethod) -> bool {
		match self {
			AuthorizationPlacement::HeaderAlways => true,
			AuthorizationPlacement::HeaderFor(methods) => methods.contains(&method),
		}
	}
}
impl Default for AuthorizationPlacement {
	fn default() -> Self {
		AuthorizationPlacement::HeaderFor(vec![RequestMethod::Post])
	}
}

/// Signs outbound requests with a configured [`SignatureMethod`].
#[derive(Clone)]
pub struct RequestSigner {
	signature_method: Arc<dyn SignatureMethod>,
	placement: AuthorizationPlacement,
	realm: Option<String>,
}
impl RequestSigner {
	/// Creates a signer for the provided signature method with default placement.
	pub fn new(signature_method: impl 'static + SignatureMethod) -> Self {
		Self {
			signature_method: Arc::new(signature_method),
			placement: AuthorizationPlacement::default(),
			realm: None,
		}
	}

	/// Overrides the parameter placement rule.
	pub fn with_placement(mut self, placement: AuthorizationPlacement) -> Self {
		self.placement = placement;

		self
	}

	/// Sets the protection realm announced in the `Authorization` header.
	pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Returns the configured signature method.
	pub fn signature_method(&self) -> &dyn SignatureMethod {
		self.signature_method.as_ref()
	}

	/// Signs `request` and returns the new request value; the input is never mutated.
	///
	/// Requests that already carry an `oauth_signature_method` parameter or an
	/// `Authorization` header are returned unchanged, which prevents double-signing.
	/// The token secret for the signing key comes from `token` when provided; callers
	/// wanting the client's current access token resolve it before calling.
	pub fn sign(
		&self,
		request: OutboundRequest,
		consumer: &ConsumerCredentials,
		token: Option<&OAuthToken>,
	) -> Result<OutboundRequest, SignatureError> {
		let query = request.query_pairs();
		let has_authorization_header =
			request.headers().keys().any(|name| name.eq_ignore_ascii_case(AUTHORIZATION_HEADER));

		if has_authorization_header
			|| query.iter().chain(request.form()).any(|(key, _)| key == SIGNATURE_METHOD_KEY)
		{
			return Ok(request);
		}

		let mut params: BTreeMap<String, String> =
			query.into_iter().chain(request.form().iter().cloned()).collect();

		// Common parameters never clobber caller-supplied values.
		for (key, value) in self.common_params(consumer) {
			params.entry(key).or_insert(value);
		}

		params.insert(SIGNATURE_METHOD_KEY.into(), self.signature_method.name().into());

		let base_string = compose_signature_base_string(request.method(), request.url(), &params);
		let key = compose_signature_key(
			consumer.secret.expose(),
			token.map(|value| value.token_secret.expose()),
		);
		let signature = self.signature_method.generate(&base_string, &key)?;

		params.insert(SIGNATURE_KEY.into(), signature);

		let form_keys: Vec<&str> = request.form().iter().map(|(key, _)| key.as_str()).collect();

		if self.placement.uses_header(request.method()) {
			let header = self.compose_authorization_header(&params);
			let remaining_query: Vec<(String, String)> = params
				.iter()
				.filter(|(key, _)| {
					!key.starts_with(OAUTH_PREFIX) && !form_keys.contains(&key.as_str())
				})
				.map(|(key, value)| (key.clone(), value.clone()))
				.collect();
			let remaining_form: Vec<(String, String)> = request
				.form()
				.iter()
				.filter(|(key, _)| !key.starts_with(OAUTH_PREFIX))
				.cloned()
				.collect();

			Ok(request
				.with_query_pairs(remaining_query)
				.with_form(remaining_form)
				.with_header(AUTHORIZATION_HEADER, header))
		} else {
			let full_query: Vec<(String, String)> = params
				.iter()
				.filter(|(key, _)| !form_keys.contains(&key.as_str()))
				.map(|(key, value)| (key.clone(), value.clone()))
				.collect();

			Ok(request.with_query_pairs(full_query))
		}
	}

	/// Fresh per-request common parameters; nonce and timestamp are never reused.
	fn common_params(&self, consumer: &ConsumerCredentials) -> [(String, String); 4] {
		[
			("oauth_version".into(), PROTOCOL_VERSION.into()),
			("oauth_nonce".into(), generate_nonce()),
			(
				"oauth_timestamp".into(),
				OffsetDateTime::now_utc().unix_timestamp().to_string(),
			),
			("oauth_consumer_key".into(), consumer.key.clone()),
		]
	}

	fn compose_authorization_header(&self, params: &BTreeMap<String, String>) -> String {
		let mut parts = Vec::new();

		if let Some(realm) = &self.realm {
			parts.push(format!("realm=\"{}\"", rawurlencode(realm)));
		}

		for (key, value) in params {
			if key.starts_with(OAUTH_PREFIX) {
				parts.push(format!("{key}=\"{}\"", rawurlencode(value)));
			}
		}

		format!("OAuth {}", parts.join(", "))
	}
}
impl Debug for RequestSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestSigner")
			.field("signature_method", &self.signature_method.name())
			.field("placement", &self.placement)
			.field("realm", &self.realm)
			.finish()
	}
}

/// Composes the RFC 5849 §3.4.1 signature base string.
///
/// Query pairs carried by the URL itself merge under `params` (signer-provided values
/// win on collision), any `oauth_signature` entry is dropped, keys sort byte-wise, and
/// the serialized pair string is percent-encoded a second time when joined with the
/// method and base URL.
pub fn compose_signature_base_string(
	method: RequestMethod,
	url: &Url,
	params: &BTreeMap<String, String>,
) -> String {
	let mut merged: BTreeMap<String, String> =
		url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect();

	merged.extend(params.iter().map(|(key, value)| (key.clone(), value.clone())));
	merged.remove(SIGNATURE_KEY);

	let mut base_url = url.clone();

	base_url.set_query(None);
	base_url.set_fragment(None);

	let param_string = merged
		.iter()
		.map(|(key, value)| format!("{}={}", rawurlencode(key), rawurlencode(value)))
		.collect::<Vec<_>>()
		.join("&");

	[
		rawurlencode(method.as_str()),
		rawurlencode(base_url.as_str()),
		rawurlencode(&param_string),
	]
	.join("&")
}

/// Composes the RFC 5849 §3.4.2 signing key from the consumer and token secrets.
pub fn compose_signature_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
	format!("{}&{}", rawurlencode(consumer_secret), rawurlencode(token_secret.unwrap_or("")))
}

/// Generates a per-request unique nonce: a digest of the high-resolution clock and
/// fresh randomness, collision-resistant across concurrent signers without shared
/// state.
pub fn generate_nonce() -> String {
	let entropy: String =
		rand::rng().sample_iter(Alphanumeric).take(NONCE_ENTROPY_LEN).map(char::from).collect();
	let mut hasher = Sha256::new();

	hasher.update(OffsetDateTime::now_utc().unix_timestamp_nanos().to_be_bytes());
	hasher.update(entropy.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::signature::HmacSha1;

	fn consumer() -> ConsumerCredentials {
		ConsumerCredentials::new("consumer-key", "consumer-secret")
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse signer test URL.")
	}

	fn oauth_keys(pairs: &[(String, String)]) -> Vec<String> {
		pairs.iter().filter(|(key, _)| key.starts_with("oauth_")).map(|(key, _)| key.clone()).collect()
	}

	#[test]
	fn rawurlencode_keeps_unreserved_and_escapes_space_as_percent20() {
		assert_eq!(rawurlencode("AZaz09-._~"), "AZaz09-._~");
		assert_eq!(rawurlencode("a b+c"), "a%20b%2Bc");
		assert_eq!(rawurlencode("/?&="), "%2F%3F%26%3D");
	}

	#[test]
	fn base_string_is_deterministic_and_insertion_order_independent() {
		let forward: BTreeMap<String, String> = [("a", "1"), ("b", "2"), ("c", "3")]
			.into_iter()
			.map(|(key, value)| (key.to_owned(), value.to_owned()))
			.collect();
		let reversed: BTreeMap<String, String> = [("c", "3"), ("b", "2"), ("a", "1")]
			.into_iter()
			.map(|(key, value)| (key.to_owned(), value.to_owned()))
			.collect();
		let endpoint = url("https://api.example.com/resource");
		let first = compose_signature_base_string(RequestMethod::Get, &endpoint, &forward);
		let second = compose_signature_base_string(RequestMethod::Get, &endpoint, &reversed);

		assert_eq!(first, second);
		assert_eq!(first, "GET&https%3A%2F%2Fapi.example.com%2Fresource&a%3D1%26b%3D2%26c%3D3");
	}

	#[test]
	fn base_string_merges_url_query_under_params_and_drops_signature() {
		let endpoint = url("https://api.example.com/resource?shared=url&only=query");
		let params: BTreeMap<String, String> =
			[("shared", "params"), ("oauth_signature", "drop-me")]
				.into_iter()
				.map(|(key, value)| (key.to_owned(), value.to_owned()))
				.collect();
		let base = compose_signature_base_string(RequestMethod::Get, &endpoint, &params);

		assert_eq!(
			base,
			"GET&https%3A%2F%2Fapi.example.com%2Fresource&only%3Dquery%26shared%3Dparams"
		);
	}

	#[test]
	fn signature_key_uses_empty_token_secret_when_absent() {
		assert_eq!(compose_signature_key("c s", None), "c%20s&");
		assert_eq!(compose_signature_key("cs", Some("ts")), "cs&ts");
	}

	#[test]
	fn nonces_are_unique_per_call() {
		assert_ne!(generate_nonce(), generate_nonce());
	}

	#[test]
	fn signing_populates_common_parameters_in_the_query() {
		let signer = RequestSigner::new(HmacSha1);
		let request = OutboundRequest::new(RequestMethod::Get, url("https://api.example.com/a"));
		let signed =
			signer.sign(request, &consumer(), None).expect("Signing a bare request should work.");
		let pairs = signed.query_pairs();
		let keys = oauth_keys(&pairs);

		for expected in [
			"oauth_consumer_key",
			"oauth_nonce",
			"oauth_signature",
			"oauth_signature_method",
			"oauth_timestamp",
			"oauth_version",
		] {
			assert!(keys.contains(&expected.to_owned()), "missing {expected}");
		}

		let lookup: BTreeMap<_, _> = pairs.into_iter().collect();

		assert_eq!(lookup.get("oauth_version").map(String::as_str), Some("1.0"));
		assert_eq!(lookup.get("oauth_consumer_key").map(String::as_str), Some("consumer-key"));
		assert_eq!(lookup.get("oauth_signature_method").map(String::as_str), Some("HMAC-SHA1"));
		assert!(signed.header("authorization").is_none());
	}

	#[test]
	fn signing_is_a_no_op_for_already_signed_requests() {
		let signer = RequestSigner::new(HmacSha1);
		let request = OutboundRequest::new(
			RequestMethod::Get,
			url("https://api.example.com/a?oauth_signature_method=HMAC-SHA1"),
		);
		let signed = signer
			.sign(request.clone(), &consumer(), None)
			.expect("Guarded signing should not error.");

		assert_eq!(signed, request);

		let with_header = OutboundRequest::new(RequestMethod::Get, url("https://api.example.com/a"))
			.with_header("authorization", "OAuth oauth_nonce=\"n\"");
		let untouched = signer
			.sign(with_header.clone(), &consumer(), None)
			.expect("Guarded signing should not error.");

		assert_eq!(untouched, with_header);
	}

	#[test]
	fn caller_supplied_values_win_over_common_parameters() {
		let signer = RequestSigner::new(HmacSha1);
		let request = OutboundRequest::new(
			RequestMethod::Get,
			url("https://api.example.com/a?oauth_nonce=pinned-nonce"),
		);
		let signed =
			signer.sign(request, &consumer(), None).expect("Signing should preserve the nonce.");
		let lookup: BTreeMap<_, _> = signed.query_pairs().into_iter().collect();

		assert_eq!(lookup.get("oauth_nonce").map(String::as_str), Some("pinned-nonce"));
	}

	#[test]
	fn post_requests_move_oauth_parameters_into_the_authorization_header() {
		let signer = RequestSigner::new(HmacSha1).with_realm("example realm");
		let request = OutboundRequest::new(
			RequestMethod::Post,
			url("https://api.example.com/a?plain=value"),
		);
		let signed =
			signer.sign(request, &consumer(), None).expect("Header-mode signing should work.");
		let pairs = signed.query_pairs();

		assert!(oauth_keys(&pairs).is_empty(), "query must not retain oauth_* keys");
		assert_eq!(pairs, vec![("plain".to_owned(), "value".to_owned())]);

		let header = signed.header("authorization").expect("Header must be populated.");

		assert!(header.starts_with("OAuth realm=\"example%20realm\", "));

		for expected in [
			"oauth_consumer_key=\"consumer-key\"",
			"oauth_nonce=\"",
			"oauth_signature=\"",
			"oauth_signature_method=\"HMAC-SHA1\"",
			"oauth_timestamp=\"",
			"oauth_version=\"1.0\"",
		] {
			assert!(header.contains(expected), "header missing {expected}: {header}");
		}
	}

	#[test]
	fn header_always_placement_covers_get_requests() {
		let signer =
			RequestSigner::new(HmacSha1).with_placement(AuthorizationPlacement::HeaderAlways);
		let request = OutboundRequest::new(RequestMethod::Get, url("https://api.example.com/a"));
		let signed =
			signer.sign(request, &consumer(), None).expect("Header-always signing should work.");

		assert!(signed.header("authorization").is_some());
		assert!(oauth_keys(&signed.query_pairs()).is_empty());
	}

	#[test]
	fn body_form_parameters_participate_in_the_base_string_but_stay_in_the_form() {
		let signer = RequestSigner::new(HmacSha1)
			.with_placement(AuthorizationPlacement::HeaderFor(Vec::new()));
		let request = OutboundRequest::new(RequestMethod::Post, url("https://api.example.com/a"))
			.with_form_param("status", "hello world");
		let signed =
			signer.sign(request, &consumer(), None).expect("Form-carrying signing should work.");

		assert_eq!(signed.form().to_vec(), vec![("status".to_owned(), "hello world".to_owned())]);

		let lookup: BTreeMap<_, _> = signed.query_pairs().into_iter().collect();

		assert!(!lookup.contains_key("status"), "form parameters must not leak into the query");
		assert!(lookup.contains_key("oauth_signature"));
	}

	#[test]
	fn signature_verifies_against_the_recomposed_base_string() {
		let signer = RequestSigner::new(HmacSha1);
		let token = OAuthToken::new("token-id", "token-secret");
		let request = OutboundRequest::new(
			RequestMethod::Get,
			url("https://api.example.com/a?oauth_token=token-id"),
		);
		let signed = signer
			.sign(request, &consumer(), Some(&token))
			.expect("Token-bearing signing should work.");
		let mut params: BTreeMap<String, String> = signed.query_pairs().into_iter().collect();
		let signature =
			params.remove("oauth_signature").expect("Signed query must carry a signature.");
		let base =
			compose_signature_base_string(RequestMethod::Get, signed.url(), &params);
		let key = compose_signature_key("consumer-secret", Some("token-secret"));

		assert!(
			HmacSha1
				.verify(&signature, &base, &key)
				.expect("Verification should not error."),
			"recomposed base string must verify",
		);
	}
}
