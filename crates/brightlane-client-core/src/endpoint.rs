//! Chooses which Submission API base URL the form posts to.
//!
//! Deployments set an explicit base URL (`window.__BL_CONTACT_API__`); the
//! hostname check only remains as a fallback for pages served without one.

pub const SUBMIT_PATH: &str = "/api/contact/submit";
pub const LOCAL_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEPLOYED_API_BASE: &str = "https://api.brightlane.studio";
pub const LOCAL_DEV_HOSTNAMES: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
}

pub fn normalize_base_url(raw: &str) -> Result<String, EndpointError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(EndpointError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(EndpointError::InvalidBaseUrl);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(EndpointError::InvalidBaseUrl);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(EndpointError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}

/// A valid configured base URL wins outright; otherwise local-development
/// hostnames post to the local backend and everything else to the deployed
/// one.
pub fn resolve_submit_url(configured: Option<&str>, hostname: &str) -> String {
    if let Some(base) = configured
        && let Ok(normalized) = normalize_base_url(base)
    {
        return format!("{normalized}{SUBMIT_PATH}");
    }
    let base = if LOCAL_DEV_HOSTNAMES.contains(&hostname) {
        LOCAL_API_BASE
    } else {
        DEPLOYED_API_BASE
    };
    format!("{base}{SUBMIT_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_base_wins() {
        let url = resolve_submit_url(Some("https://staging.brightlane.studio/"), "localhost");
        assert_eq!(
            url,
            "https://staging.brightlane.studio/api/contact/submit"
        );
    }

    #[test]
    fn invalid_configured_base_falls_back_to_hostname() {
        let url = resolve_submit_url(Some("not-a-url"), "localhost");
        assert_eq!(url, "http://127.0.0.1:5000/api/contact/submit");
    }

    #[test]
    fn local_hostnames_use_local_backend() {
        for hostname in ["localhost", "127.0.0.1"] {
            let url = resolve_submit_url(None, hostname);
            assert!(url.starts_with(LOCAL_API_BASE), "{hostname} -> {url}");
        }
    }

    #[test]
    fn other_hostnames_use_deployed_backend() {
        let url = resolve_submit_url(None, "brightlane.studio");
        assert_eq!(
            url,
            "https://api.brightlane.studio/api/contact/submit"
        );
    }

    #[test]
    fn normalize_rejects_bad_bases() {
        assert_eq!(
            normalize_base_url("   "),
            Err(EndpointError::EmptyBaseUrl)
        );
        assert_eq!(
            normalize_base_url("ftp://example.com"),
            Err(EndpointError::InvalidBaseUrl)
        );
        assert_eq!(
            normalize_base_url("https:///nohost"),
            Err(EndpointError::InvalidBaseUrl)
        );
        assert_eq!(
            normalize_base_url("https://example.com//"),
            Ok("https://example.com".to_string())
        );
    }
}
