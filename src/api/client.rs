// snip server HTTP client.
// Handles the session cookie, request dispatch, and response classification.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use url::Url;

use crate::error::{Result, SnipError};

/// HTTP client for one snip server, carrying the session cookie issued by a
/// successful login.
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for the given server address. A missing scheme is
    /// treated as https.
    pub fn new(server: &str) -> Result<Self> {
        let base = normalize_server_url(server)?;
        let http = Client::builder()
            .cookie_store(true)
            .user_agent("snip-tui")
            .build()
            .map_err(SnipError::Api)?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| SnipError::Other(format!("bad endpoint {path}: {e}")))
    }

    /// Start a session. The password travels as the raw request body; the
    /// session cookie lands in the client's store.
    pub async fn login(&self, password: &str) -> Result<()> {
        let url = self.endpoint("api/login")?;
        let response = self
            .http
            .post(url)
            .body(password.to_string())
            .send()
            .await
            .map_err(SnipError::Api)?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => Err(SnipError::Unauthorized),
            status => Err(SnipError::Other(format!("login failed with HTTP {status}"))),
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.delete("api/logout").await.map(|_| ())
    }

    pub(super) async fn get(&self, path: &str) -> Result<Response> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).send().await.map_err(SnipError::Api)?;
        check_response(response).await
    }

    pub(super) async fn get_with_params<T: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &T,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(SnipError::Api)?;
        check_response(response).await
    }

    pub(super) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(SnipError::Api)?;
        check_response(response).await
    }

    pub(super) async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(SnipError::Api)?;
        check_response(response).await
    }

    pub(super) async fn delete(&self, path: &str) -> Result<Response> {
        let url = self.endpoint(path)?;
        let response = self.http.delete(url).send().await.map_err(SnipError::Api)?;
        check_response(response).await
    }
}

/// Classify a response: client errors carry the server's own message back to
/// the user as a recoverable rejection.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    match status {
        _ if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(SnipError::Unauthorized),
        _ if status.is_client_error() => {
            let reason = response.text().await.unwrap_or_default();
            if reason.is_empty() {
                Err(SnipError::Rejected(format!("request rejected (HTTP {status})")))
            } else {
                Err(SnipError::Rejected(reason))
            }
        }
        _ => Err(SnipError::Other(format!(
            "HTTP {}: {}",
            status,
            response.text().await.unwrap_or_default()
        ))),
    }
}

fn normalize_server_url(server: &str) -> Result<Url> {
    let trimmed = server.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SnipError::Other("no server address configured".into()));
    }
    let with_scheme = if has_protocol(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    // The trailing slash matters: Url::join replaces the last path segment
    // otherwise.
    Url::parse(&format!("{with_scheme}/"))
        .map_err(|e| SnipError::Other(format!("bad server address {server:?}: {e}")))
}

/// Whether the string starts with a URL scheme (RFC 2396 appendix A). A
/// bare host:port does not count: everything after the colon is digits.
pub fn has_protocol(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return false;
    }
    rest.chars().any(|c| !c.is_ascii_digit())
}

/// Prefix https:// onto a user-entered URL that lacks a scheme, the same
/// fixup the server-side console applies on blur.
pub fn ensure_https(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() || has_protocol(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_protocol() {
        assert!(has_protocol("https://example.com"));
        assert!(has_protocol("http://example.com"));
        assert!(has_protocol("mailto:someone@example.com"));
        assert!(!has_protocol("example.com"));
        assert!(!has_protocol("example.com/path"));
        // host:port is not a scheme
        assert!(!has_protocol("localhost:8080"));
        assert!(!has_protocol("4chan:80"));
    }

    #[test]
    fn test_ensure_https() {
        assert_eq!(ensure_https("example.com"), "https://example.com");
        assert_eq!(ensure_https("  example.com  "), "https://example.com");
        assert_eq!(ensure_https("http://example.com"), "http://example.com");
        assert_eq!(ensure_https(""), "");
    }

    #[test]
    fn test_normalize_server_url() {
        let base = normalize_server_url("example.com/shortener").unwrap();
        assert_eq!(base.as_str(), "https://example.com/shortener/");
        assert_eq!(
            base.join("api/all").unwrap().as_str(),
            "https://example.com/shortener/api/all"
        );

        let base = normalize_server_url("http://localhost:4567/").unwrap();
        assert_eq!(base.as_str(), "http://localhost:4567/");

        assert!(normalize_server_url("  ").is_err());
    }
}
