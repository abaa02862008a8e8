//! Signature method capability trait and the built-in algorithm implementations.
//!
//! [`SignatureMethod`] is the seam for the pluggable algorithms negotiated via the
//! `oauth_signature_method` parameter. The crate ships [`HmacSha1`] (the de facto
//! standard) and [`Plaintext`]; integrators can supply additional methods such as
//! RSA-SHA1 by implementing the trait.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
// self
use crate::_prelude::*;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors raised by signature computation.
#[derive(Debug, ThisError)]
pub enum SignatureError {
	/// Key material is malformed for the chosen algorithm.
	#[error("Key material is malformed for the {method} signature method.")]
	InvalidKey {
		/// Canonical name of the algorithm that rejected the key.
		method: &'static str,
		/// Underlying algorithm failure.
		#[source]
		source: BoxError,
	},
}
impl SignatureError {
	/// Wraps an algorithm-specific key failure.
	pub fn invalid_key(
		method: &'static str,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::InvalidKey { method, source: Box::new(src) }
	}
}

/// Stateless strategy computing and verifying signatures over a base string and key.
///
/// The canonical name doubles as the `oauth_signature_method` request parameter.
/// Implementations supply [`name`](SignatureMethod::name) and
/// [`generate`](SignatureMethod::generate); verification is shared and regenerates the
/// signature, comparing in constant time.
pub trait SignatureMethod
where
	Self: Send + Sync,
{
	/// Returns the canonical algorithm name (e.g., `HMAC-SHA1`).
	fn name(&self) -> &'static str;

	/// Computes the signature over `base_string` using `key`.
	fn generate(&self, base_string: &str, key: &str) -> Result<String, SignatureError>;

	/// Checks `signature` against a freshly generated one for the same inputs.
	fn verify(
		&self,
		signature: &str,
		base_string: &str,
		key: &str,
	) -> Result<bool, SignatureError> {
		let expected = self.generate(base_string, key)?;

		Ok(bool::from(expected.as_bytes().ct_eq(signature.as_bytes())))
	}
}

/// HMAC-SHA1 signature method (RFC 5849 §3.4.2), base64-encoded output.
#[derive(Clone, Copy, Debug, Default)]
pub struct HmacSha1;
impl SignatureMethod for HmacSha1 {
	fn name(&self) -> &'static str {
		"HMAC-SHA1"
	}

	fn generate(&self, base_string: &str, key: &str) -> Result<String, SignatureError> {
		let mut mac = <Hmac<Sha1>>::new_from_slice(key.as_bytes())
			.map_err(|e| SignatureError::invalid_key(self.name(), e))?;

		mac.update(base_string.as_bytes());

		Ok(STANDARD.encode(mac.finalize().into_bytes()))
	}
}

/// PLAINTEXT signature method (RFC 5849 §3.4.4); the key itself is the signature.
/// Only meaningful over TLS.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plaintext;
impl SignatureMethod for Plaintext {
	fn name(&self) -> &'static str {
		"PLAINTEXT"
	}

	fn generate(&self, _base_string: &str, key: &str) -> Result<String, SignatureError> {
		Ok(key.to_owned())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn methods() -> Vec<Box<dyn SignatureMethod>> {
		vec![Box::new(HmacSha1), Box::new(Plaintext)]
	}

	#[test]
	fn generate_then_verify_round_trips() {
		for method in methods() {
			let signature = method
				.generate("test_base_string", "test_key")
				.expect("Signature generation should succeed for well-formed inputs.");

			assert!(!signature.is_empty(), "{} produced an empty signature", method.name());
			assert!(
				method
					.verify(&signature, "test_base_string", "test_key")
					.expect("Verification should not error."),
				"{} rejected its own signature",
				method.name(),
			);
		}
	}

	#[test]
	fn bogus_signature_fails_verification() {
		for method in methods() {
			assert!(
				!method
					.verify("unsigned", "test_base_string", "test_key")
					.expect("Verification should not error."),
				"{} accepted a bogus signature",
				method.name(),
			);
		}
	}

	#[test]
	fn altered_inputs_fail_verification() {
		let method = HmacSha1;
		let signature = method
			.generate("test_base_string", "test_key")
			.expect("Signature generation should succeed.");

		assert!(
			!method
				.verify(&signature, "other_base_string", "test_key")
				.expect("Verification should not error.")
		);
		assert!(
			!method
				.verify(&signature, "test_base_string", "other_key")
				.expect("Verification should not error.")
		);
	}

	#[test]
	fn hmac_sha1_matches_known_vector() {
		let signature = HmacSha1
			.generate("The quick brown fox jumps over the lazy dog", "key")
			.expect("Known-vector generation should succeed.");

		assert_eq!(signature, "3nybhbi3iqa8ino29wqQcBydtNk=");
	}

	#[test]
	fn names_match_protocol_identifiers() {
		assert_eq!(HmacSha1.name(), "HMAC-SHA1");
		assert_eq!(Plaintext.name(), "PLAINTEXT");
	}
}
