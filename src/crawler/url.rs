//! URL canonicalization and classification for the watched site
//!
//! Every link found on a page goes through [`LinkClassifier::canonicalize`]
//! before it can enter the frontier or the store, so scheme, `www.`,
//! trailing-slash, query and fragment variants of one page share a single
//! identity.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::SiteConfig;
use crate::models::{CanonicalUrl, Category};
use crate::utils::error::ParseError;

lazy_static! {
    // Checked in this order; the path shapes do not overlap.
    static ref CATEGORY_PATTERNS: Vec<(Category, Regex)> = vec![
        (
            Category::Job,
            Regex::new(r"/careers/position/[^/]+").expect("Invalid regex pattern"),
        ),
        (
            Category::News,
            Regex::new(r"/news/\d{4}/\d{2}/\d{2}").expect("Invalid regex pattern"),
        ),
        (
            Category::Press,
            Regex::new(r"/press/\d{4}/\d{2}/\d{2}").expect("Invalid regex pattern"),
        ),
        (
            Category::Image,
            Regex::new(r"/media-gallery/detail/\d{6}/\d{4}").expect("Invalid regex pattern"),
        ),
    ];
}

/// Canonicalizes, classifies and filters links for one fixed site
///
/// # Examples
///
/// ```
/// use sitewatch::config::SiteConfig;
/// use sitewatch::crawler::url::LinkClassifier;
///
/// let classifier = LinkClassifier::new(&SiteConfig::default()).unwrap();
/// let a = classifier.canonicalize("http://www.spacex.com/news/").unwrap();
/// let b = classifier.canonicalize("./news").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "https://spacex.com/news");
/// ```
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    /// `{scheme}://{host}/`, the base every relative link resolves against
    root: Url,
    host: String,
    scheme: String,
    exclusions: Vec<String>,
}

impl LinkClassifier {
    /// Build a classifier for the configured site
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidSite` when the scheme is not http(s) or
    /// the host does not form a valid root URL.
    pub fn new(site: &SiteConfig) -> Result<Self, ParseError> {
        let scheme = site.scheme.trim().to_lowercase();
        let host = site.host.trim().to_lowercase();
        let host = strip_www(&host);
        let candidate = format!("{scheme}://{host}/");

        let root = Url::parse(&candidate)
            .ok()
            .filter(|root| {
                matches!(root.scheme(), "http" | "https")
                    && root.host_str() == Some(host)
                    && root.path() == "/"
            })
            .ok_or(ParseError::InvalidSite(candidate))?;

        Ok(Self {
            host: host.to_string(),
            scheme,
            root,
            exclusions: site.exclusions.clone(),
        })
    }

    /// Bare host of the watched site
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Canonical form of the site root
    pub fn root(&self) -> CanonicalUrl {
        CanonicalUrl::from_canonical(self.root.as_str().trim_end_matches('/').to_string())
    }

    /// Normalize a raw link into its canonical absolute form
    ///
    /// Relative links (`/a`, `a`, `./a`, `../a`) resolve against the site
    /// root the way a browser resolves them on the root page. For web URLs
    /// the scheme becomes the canonical one, every leading `www.` and any
    /// credentials are dropped, and query string, fragment and trailing
    /// slashes are removed. Links outside http(s) (`mailto:`, `javascript:`)
    /// keep their scheme and path as parsed and never match the site. Input that cannot be
    /// resolved at all is returned as-is minus its query and fragment. The
    /// result is stable under repeated application.
    ///
    /// # Returns
    ///
    /// `None` only for empty or blank input
    pub fn canonicalize(&self, raw: &str) -> Option<CanonicalUrl> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        // Fragment and query never identify a different page here
        let raw = raw.split(['#', '?']).next().unwrap_or_default().trim();

        let Ok(mut url) = self.root.join(raw) else {
            return Some(CanonicalUrl::from_canonical(raw.to_string()));
        };
        url.set_query(None);
        url.set_fragment(None);

        if !matches!(url.scheme(), "http" | "https") {
            return Some(CanonicalUrl::from_canonical(url.into()));
        }

        // http(s) to http(s) and clearing credentials on a host URL
        // cannot fail
        let _ = url.set_scheme(&self.scheme);
        let _ = url.set_username("");
        let _ = url.set_password(None);

        let bare = url
            .host_str()
            .filter(|host| strip_www(host).len() < host.len())
            .map(|host| strip_www(host).to_string());
        if let Some(bare) = bare {
            if url.set_host(Some(&bare)).is_err() {
                tracing::trace!(host = %bare, "Keeping www. prefix on unparsable host");
            }
        }

        Some(CanonicalUrl::from_canonical(
            url.as_str().trim_end_matches('/').to_string(),
        ))
    }

    /// Decide the content category from the URL's path shape
    pub fn classify(&self, url: &CanonicalUrl) -> Category {
        CATEGORY_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(url.as_str()))
            .map(|(category, _)| *category)
            .unwrap_or(Category::None)
    }

    /// Same-site test plus the configured exclusion substrings
    pub fn is_whitelisted(&self, url: &CanonicalUrl) -> bool {
        self.is_internal(url)
            && !self
                .exclusions
                .iter()
                .any(|pattern| url.as_str().contains(pattern.as_str()))
    }

    /// Whether the URL points at the watched host on its default port
    pub fn is_internal(&self, url: &CanonicalUrl) -> bool {
        match Url::parse(url.as_str()) {
            Ok(parsed) => {
                parsed.scheme() == self.scheme
                    && parsed.host_str() == Some(self.host.as_str())
                    && parsed.port().is_none()
            }
            Err(_) => false,
        }
    }
}

/// Host with every leading `www.` removed, never down to nothing
fn strip_www(host: &str) -> &str {
    let mut host = host;
    while let Some(rest) = host.strip_prefix("www.") {
        if rest.is_empty() {
            break;
        }
        host = rest;
    }
    host
}
