use tracing::debug;

/// Platform hook for handing a URL to another app.
pub trait UrlOpener {
    fn can_open(&self, url: &str) -> bool;
    fn open(&self, url: &str);
}

pub fn app_url(key: &str) -> String {
    format!("youtube://watch?v={key}")
}

pub fn web_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={key}")
}

/// Opens a YouTube video by key, preferring the native app over the browser.
///
/// Fire-and-forget; returns the URL that was handed off.
pub fn open_trailer(opener: &dyn UrlOpener, key: &str) -> String {
    let app = app_url(key);
    let target = if opener.can_open(&app) { app } else { web_url(key) };
    debug!("Opening trailer {}", target);
    opener.open(&target);
    target
}
