//! Token value objects and `application/x-www-form-urlencoded` response parsing.

// self
use crate::_prelude::*;

const OAUTH_TOKEN_KEY: &str = "oauth_token";
const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Redacted secret wrapper keeping signing-key material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner secret value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Consumer credentials identifying the client application to the provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConsumerCredentials {
	/// Consumer key issued by the provider.
	pub key: String,
	/// Consumer secret; used only as signing-key material.
	pub secret: TokenSecret,
}
impl ConsumerCredentials {
	/// Creates credentials from a key/secret pair.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { key: key.into(), secret: TokenSecret::new(secret) }
	}
}
impl Debug for ConsumerCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConsumerCredentials")
			.field("key", &self.key)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Errors raised while parsing a token-exchange response body.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenParseError {
	/// A required response field was absent.
	#[error("Token response is missing the `{key}` field: `{body}`.")]
	MissingKey {
		/// Name of the absent field.
		key: &'static str,
		/// Raw response body, echoed for diagnostics.
		body: String,
	},
	/// The body was not valid `application/x-www-form-urlencoded` data.
	#[error("Token response is not form-encoded ({message}): `{body}`.")]
	Malformed {
		/// Decoder failure description.
		message: String,
		/// Raw response body, echoed for diagnostics.
		body: String,
	},
}

/// Immutable token issued by the provider during a token exchange.
///
/// Covers both request tokens (handshake-scoped, single use) and access tokens
/// (long-lived). The secret never travels in requests; it only feeds the signing key.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthToken {
	/// Token identifier issued by the provider.
	#[serde(rename = "oauth_token")]
	pub token: String,
	/// Token secret paired with the identifier.
	#[serde(rename = "oauth_token_secret")]
	pub token_secret: TokenSecret,
	/// Additional parameters returned by the provider (e.g., `oauth_callback_confirmed`).
	#[serde(flatten)]
	pub params: BTreeMap<String, String>,
}
impl OAuthToken {
	/// Creates a token from an identifier/secret pair with no extra parameters.
	pub fn new(token: impl Into<String>, token_secret: impl Into<String>) -> Self {
		Self {
			token: token.into(),
			token_secret: TokenSecret::new(token_secret),
			params: BTreeMap::new(),
		}
	}

	/// Parses a form-encoded token-exchange response body.
	///
	/// `oauth_token` and `oauth_token_secret` are extracted; every remaining pair is
	/// retained verbatim in [`OAuthToken::params`].
	pub fn from_response_body(body: &str) -> Result<Self, TokenParseError> {
		let mut pairs: BTreeMap<String, String> =
			serde_urlencoded::from_str(body).map_err(|e| TokenParseError::Malformed {
				message: e.to_string(),
				body: body.to_owned(),
			})?;
		let token = pairs.remove(OAUTH_TOKEN_KEY).ok_or_else(|| TokenParseError::MissingKey {
			key: OAUTH_TOKEN_KEY,
			body: body.to_owned(),
		})?;
		let token_secret = pairs.remove(OAUTH_TOKEN_SECRET_KEY).ok_or_else(|| {
			TokenParseError::MissingKey { key: OAUTH_TOKEN_SECRET_KEY, body: body.to_owned() }
		})?;

		Ok(Self { token, token_secret: TokenSecret::new(token_secret), params: pairs })
	}

	/// Returns an extra parameter returned alongside the token, if present.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}
}
impl Debug for OAuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthToken")
			.field("token", &self.token)
			.field("token_secret", &"<redacted>")
			.field("params", &self.params)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn consumer_debug_redacts_secret() {
		let consumer = ConsumerCredentials::new("key-1", "secret-1");
		let rendered = format!("{consumer:?}");

		assert!(rendered.contains("key-1"));
		assert!(!rendered.contains("secret-1"));
	}

	#[test]
	fn parse_response_typical() {
		let body = "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&oauth_callback_confirmed=true";
		let token =
			OAuthToken::from_response_body(body).expect("Typical response body should parse.");

		assert_eq!(token.token, "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik");
		assert_eq!(token.token_secret.expose(), "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM");
		assert_eq!(token.params.len(), 1);
		assert_eq!(token.param("oauth_callback_confirmed"), Some("true"));
	}

	#[test]
	fn parse_response_decodes_percent_escapes() {
		let body = "oauth_token=a%2Fb&oauth_token_secret=s%20p";
		let token =
			OAuthToken::from_response_body(body).expect("Escaped response body should parse.");

		assert_eq!(token.token, "a/b");
		assert_eq!(token.token_secret.expose(), "s p");
	}

	#[test]
	fn parse_response_keeps_value_less_pairs() {
		let body = "oauth_token=&oauth_token_secret=&keyonly=&keyonly2";
		let token =
			OAuthToken::from_response_body(body).expect("Minimal response body should parse.");

		assert_eq!(token.token, "");
		assert_eq!(token.token_secret.expose(), "");
		assert_eq!(token.params.len(), 2);
		assert_eq!(token.param("keyonly"), Some(""));
		assert_eq!(token.param("keyonly2"), Some(""));
	}

	#[test]
	fn parse_reports_missing_token() {
		let body = "oauth_token_secret=";
		let err = OAuthToken::from_response_body(body)
			.expect_err("Bodies without oauth_token should fail to parse.");

		assert_eq!(err, TokenParseError::MissingKey { key: "oauth_token", body: body.to_owned() });
	}

	#[test]
	fn parse_reports_missing_token_secret() {
		let body = "oauth_token=abc";
		let err = OAuthToken::from_response_body(body)
			.expect_err("Bodies without oauth_token_secret should fail to parse.");

		assert_eq!(
			err,
			TokenParseError::MissingKey { key: "oauth_token_secret", body: body.to_owned() }
		);
	}

	#[test]
	fn serde_round_trip_preserves_extra_params() {
		let mut token = OAuthToken::new("tok", "sec");

		token.params.insert("oauth_callback_confirmed".into(), "true".into());

		let payload = serde_json::to_string(&token).expect("Token should serialize to JSON.");
		let round_trip: OAuthToken =
			serde_json::from_str(&payload).expect("Serialized token should deserialize.");

		assert_eq!(round_trip.token, "tok");
		assert_eq!(round_trip.token_secret.expose(), "sec");
		assert_eq!(round_trip.param("oauth_callback_confirmed"), Some("true"));
	}
}
