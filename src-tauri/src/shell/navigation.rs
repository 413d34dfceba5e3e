use url::Url;

use crate::error::ShellError;

/// The one remote location the main window may load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedOrigin {
    base: Url,
}

impl TrustedOrigin {
    pub fn parse(raw: &str) -> Result<Self, ShellError> {
        let base = Url::parse(raw)
            .map_err(|e| ShellError::Config(format!("Invalid origin url {}: {}", raw, e)))?;
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(ShellError::Config(format!("Origin url has no host: {}", raw)));
        }
        Ok(Self { base })
    }

    pub fn url(&self) -> &Url {
        &self.base
    }

    /// URL pattern granting IPC to pages served from this origin.
    pub fn remote_pattern(&self) -> String {
        format!("{}/*", self.base.origin().ascii_serialization())
    }

    /// Same scheme, host and port, and a path at or below the base path.
    pub fn permits(&self, url: &Url) -> bool {
        if url.origin() != self.base.origin() {
            return false;
        }
        let base_path = self.base.path();
        let path = url.path();
        if base_path.ends_with('/') {
            path.starts_with(base_path) || path == base_path.trim_end_matches('/')
        } else {
            path == base_path || path.starts_with(&format!("{}/", base_path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn permits_paths_inside_origin() {
        let origin = TrustedOrigin::parse("https://app.example.com/").unwrap();
        assert!(origin.permits(&url("https://app.example.com/")));
        assert!(origin.permits(&url("https://app.example.com/rooms/42?tab=chat#top")));
    }

    #[test]
    fn vetoes_other_origins() {
        let origin = TrustedOrigin::parse("https://app.example.com/").unwrap();
        assert!(!origin.permits(&url("https://evil.example.com/")));
        assert!(!origin.permits(&url("http://app.example.com/")));
        assert!(!origin.permits(&url("https://app.example.com:8443/")));
        assert!(!origin.permits(&url("file:///etc/passwd")));
    }

    #[test]
    fn host_prefix_tricks_are_vetoed() {
        let origin = TrustedOrigin::parse("https://app.example.com/").unwrap();
        assert!(!origin.permits(&url("https://app.example.com.attacker.net/")));
        assert!(!origin.permits(&url("https://app.example.com@attacker.net/")));
    }

    #[test]
    fn base_path_confines_navigation() {
        let origin = TrustedOrigin::parse("https://example.com/app").unwrap();
        assert!(origin.permits(&url("https://example.com/app")));
        assert!(origin.permits(&url("https://example.com/app/settings")));
        assert!(!origin.permits(&url("https://example.com/application")));
        assert!(!origin.permits(&url("https://example.com/")));

        let slashed = TrustedOrigin::parse("https://example.com/app/").unwrap();
        assert!(slashed.permits(&url("https://example.com/app")));
        assert!(slashed.permits(&url("https://example.com/app/x")));
        assert!(!slashed.permits(&url("https://example.com/apple")));
    }

    #[test]
    fn remote_pattern_covers_whole_origin() {
        let origin = TrustedOrigin::parse("https://example.com/app/").unwrap();
        assert_eq!(origin.remote_pattern(), "https://example.com/*");

        let local = TrustedOrigin::parse("http://localhost:5173/").unwrap();
        assert_eq!(local.remote_pattern(), "http://localhost:5173/*");
    }

    #[test]
    fn rejects_hostless_origin() {
        assert!(TrustedOrigin::parse("mailto:someone@example.com").is_err());
        assert!(TrustedOrigin::parse("not a url").is_err());
    }
}
