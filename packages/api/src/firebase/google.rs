//! Google sign-in through the OAuth redirect flow.
//!
//! The button sends the browser to Google's consent page with
//! `response_type=id_token`. Google redirects back to the auth page with the
//! ID token in the URL fragment, and [`credential_from_fragment`] picks it up
//! for [`FirebaseAuth::set_federated_credential`](super::FirebaseAuth::set_federated_credential).

use url::Url;

use crate::error::{ProviderError, ProviderErrorKind};

pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Key under which the pending `state` value is kept until Google redirects back.
pub const STATE_KEY: &str = "site.auth.googleState";

/// A random value for the `state` and `nonce` parameters.
pub fn new_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Google's consent page for an ID token, returning to `redirect_uri`.
pub fn authorization_url(
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    nonce: &str,
) -> Result<String, ProviderError> {
    if client_id.is_empty() {
        return Err(ProviderError::new(
            ProviderErrorKind::OperationNotAllowed,
            "Google sign-in is not configured",
        ));
    }
    let url = Url::parse_with_params(
        AUTHORIZATION_ENDPOINT,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "id_token"),
            ("scope", "openid email profile"),
            ("prompt", "select_account"),
            ("state", state),
            ("nonce", nonce),
        ],
    )
    .map_err(|e| {
        ProviderError::new(ProviderErrorKind::Other("invalid-url".into()), e.to_string())
    })?;
    Ok(url.into())
}

/// Read the result of a Google redirect from a URL fragment.
///
/// `Ok(None)` means the fragment is not a sign-in result at all. A denied
/// consent screen counts as a closed popup.
pub fn credential_from_fragment(
    fragment: &str,
    expected_state: Option<&str>,
) -> Result<Option<String>, ProviderError> {
    let fragment = fragment.trim_start_matches('#');
    let mut id_token = None;
    let mut error = None;
    let mut state = None;
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "id_token" => id_token = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if id_token.is_none() && error.is_none() {
        return Ok(None);
    }
    if expected_state.is_none() || state.as_deref() != expected_state {
        return Err(ProviderError::new(
            ProviderErrorKind::Other("invalid-state".into()),
            "Google sign-in response does not match a pending request",
        ));
    }
    if let Some(error) = error {
        let kind = match error.as_str() {
            "access_denied" => ProviderErrorKind::PopupClosedByUser,
            other => ProviderErrorKind::Other(other.replace('_', "-")),
        };
        return Err(ProviderError::new(kind, error));
    }
    Ok(id_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let url = authorization_url("client-1", "https://site.test/auth", "st", "n1").unwrap();
        let parsed = Url::parse(&url).unwrap();
        let params: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(url.starts_with(AUTHORIZATION_ENDPOINT));
        assert!(params.contains(&("response_type".into(), "id_token".into())));
        assert!(params.contains(&("redirect_uri".into(), "https://site.test/auth".into())));
        assert!(params.contains(&("state".into(), "st".into())));
    }

    #[test]
    fn test_unconfigured_client_is_rejected() {
        let err = authorization_url("", "https://site.test/auth", "st", "n1").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::OperationNotAllowed);
    }

    #[test]
    fn test_fragment_with_token() {
        let token = credential_from_fragment("#state=st&id_token=abc.def&authuser=0", Some("st"));
        assert_eq!(token.unwrap().as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_unrelated_fragment_is_ignored() {
        assert_eq!(credential_from_fragment("#services", Some("st")).unwrap(), None);
        assert_eq!(credential_from_fragment("", None).unwrap(), None);
    }

    #[test]
    fn test_denied_consent_reads_as_cancelled() {
        let err = credential_from_fragment("error=access_denied&state=st", Some("st")).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::PopupClosedByUser);
    }

    #[test]
    fn test_state_must_match() {
        let err = credential_from_fragment("id_token=abc&state=other", Some("st")).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Other("invalid-state".into()));

        let err = credential_from_fragment("id_token=abc&state=st", None).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Other("invalid-state".into()));
    }
}
