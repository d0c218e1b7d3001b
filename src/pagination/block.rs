//! Recognizing automated-traffic interstitials served with status 200.

/// Phrases that only appear on CAPTCHA / "unusual traffic" pages.
const BLOCK_MARKERS: &[&str] = &[
    "captcha",
    "unusual traffic",
    "/sorry/",
    "not a robot",
    "solve the captcha",
    "submit a verification",
    "our systems have detected",
    "scholar help",
];

/// Case-insensitive scan of a page body for block markers
pub fn looks_like_block_page(body: &str) -> bool {
    let text = body.to_lowercase();
    BLOCK_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::fixture;

    #[test]
    fn test_detects_markers_any_case() {
        assert!(looks_like_block_page("Please solve the CAPTCHA below"));
        assert!(looks_like_block_page("Unusual Traffic from your network"));
        assert!(looks_like_block_page("<form action=\"/sorry/index\">"));
        assert!(looks_like_block_page("I'm NOT A ROBOT"));
        assert!(looks_like_block_page(&fixture::block_page()));
    }

    #[test]
    fn test_clean_page_passes() {
        assert!(!looks_like_block_page(&fixture::results_page(3)));
        assert!(!looks_like_block_page(""));
    }
}
