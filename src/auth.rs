//! Hand-off to a hosted OAuth sign-in page.
//!
//! Login is independent of the game: it only builds the provider's authorize
//! URL and opens it in a browser. Nothing returned by the provider flows back
//! into a session.

use url::Url;
use webbrowser::Browser;

use crate::error::{Result, SprintError};

pub const DEFAULT_PROVIDER: &str = "google";
pub const GAME_PAGE: &str = "game.html";

fn parse_http(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| SprintError::Auth(format!("invalid url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SprintError::Auth(format!(
            "url must be http(s), got '{other}': '{raw}'"
        ))),
    }
}

/// Replaces the last path segment of `page_url` with `page`, so a login page at
/// `https://site/folder/index.html` redirects to `https://site/folder/game.html`.
/// Query and fragment are dropped; host, port and userinfo are kept.
pub fn sibling_page(page_url: &str, page: &str) -> Result<String> {
    let base = parse_http(page_url)?;
    let sibling = base
        .join(page)
        .map_err(|e| SprintError::Auth(format!("cannot place '{page}' next to '{page_url}': {e}")))?;
    Ok(sibling.into())
}

/// Builds `<project>/auth/v1/authorize?provider=..&redirect_to=..`
pub fn authorize_url(project_url: &str, provider: &str, redirect_to: &str) -> Result<String> {
    if provider.is_empty() {
        return Err(SprintError::Auth("no identity provider given".into()));
    }
    let mut url = parse_http(project_url)?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| SprintError::Auth(format!("'{project_url}' cannot carry a path")))?
        .pop_if_empty()
        .extend(["auth", "v1", "authorize"]);
    url.query_pairs_mut()
        .append_pair("provider", provider)
        .append_pair("redirect_to", redirect_to);
    Ok(url.into())
}

/// Opens the sign-in page for `provider`; the provider sends the browser on to
/// the game page next to `site_url`.
pub fn login(project_url: &str, site_url: &str, provider: &str) -> Result<()> {
    let redirect_to = sibling_page(site_url, GAME_PAGE)?;
    log::debug!("using redirect_to {}", redirect_to);
    let url = authorize_url(project_url, provider, &redirect_to)?;

    if !Browser::is_available() {
        return Err(SprintError::Browser(format!("open {url} manually")));
    }
    webbrowser::open(&url).map_err(|e| SprintError::Browser(e.to_string()))?;
    log::info!("opened sign-in page for {}", provider);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn sibling_page_swaps_last_segment() {
        assert_eq!(
            sibling_page("https://site.com/folder/index.html", "game.html").unwrap(),
            "https://site.com/folder/game.html"
        );
        assert_eq!(
            sibling_page("https://site.com/folder/index.html?next=1", "game.html").unwrap(),
            "https://site.com/folder/game.html"
        );
        assert_eq!(
            sibling_page("https://site.com", "game.html").unwrap(),
            "https://site.com/game.html"
        );
    }

    #[test]
    fn sibling_page_keeps_port_and_userinfo() {
        assert_eq!(
            sibling_page("http://user@site.com:8443/app/index.html#top", "game.html").unwrap(),
            "http://user@site.com:8443/app/game.html"
        );
    }

    #[test]
    fn sibling_page_rejects_non_http() {
        assert_matches!(
            sibling_page("site.com/index.html", "game.html"),
            Err(SprintError::Auth(_))
        );
        assert_matches!(
            sibling_page("file:///tmp/index.html", "game.html"),
            Err(SprintError::Auth(_))
        );
    }

    #[test]
    fn authorize_url_encodes_redirect() {
        let url = authorize_url(
            "https://abc.supabase.co/",
            "google",
            "https://site.com/folder/game.html",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://abc.supabase.co/auth/v1/authorize?provider=google&redirect_to=https%3A%2F%2Fsite.com%2Ffolder%2Fgame.html"
        );
    }

    #[test]
    fn authorize_url_appends_to_existing_path_and_port() {
        let url = authorize_url("http://localhost:54321/base", "github", "http://x/game.html").unwrap();
        assert!(url.starts_with("http://localhost:54321/base/auth/v1/authorize?provider=github&"));
    }

    #[test]
    fn authorize_url_rejects_bad_input() {
        assert_matches!(
            authorize_url("abc.supabase.co", "google", "x"),
            Err(SprintError::Auth(_))
        );
        assert_matches!(
            authorize_url("https://abc.supabase.co", "", "x"),
            Err(SprintError::Auth(_))
        );
    }
}
