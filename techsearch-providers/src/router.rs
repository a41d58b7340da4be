//! Provider selection for a query.

use crate::query::Query;
use crate::types::Provider;
use crate::video::is_video_url;

/// Decide which providers serve `query`. Never empty.
///
/// An explicit selection wins and keeps its order. Otherwise a video link
/// goes to the transcript provider and everything else to web search.
/// Text analysis only runs when asked for.
pub fn select(query: &Query) -> Vec<Provider> {
    if let Some(selection) = query.providers() {
        return selection.to_vec();
    }
    if is_video_url(query.text()) {
        vec![Provider::Transcript]
    } else {
        vec![Provider::WebSearch]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_links_route_to_transcript() {
        for text in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "WWW.YOUTUBE.COM/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(select(&Query::new(text)), vec![Provider::Transcript], "{text}");
        }
    }

    #[test]
    fn plain_text_routes_to_web_search() {
        assert_eq!(
            select(&Query::new("quantum computing")),
            vec![Provider::WebSearch]
        );
    }

    #[test]
    fn explicit_selection_wins_in_order() {
        let query = Query::new("https://youtu.be/dQw4w9WgXcQ")
            .with_providers([Provider::TextAnalysis, Provider::WebSearch]);
        assert_eq!(
            select(&query),
            vec![Provider::TextAnalysis, Provider::WebSearch]
        );
    }

    #[test]
    fn analysis_is_never_auto_selected() {
        let query = Query::new("explain transformers");
        assert!(!select(&query).contains(&Provider::TextAnalysis));

        let explicit = query.with_providers([Provider::TextAnalysis]);
        assert_eq!(select(&explicit), vec![Provider::TextAnalysis]);
    }

    #[test]
    fn empty_explicit_selection_falls_back_to_auto() {
        let query = Query::new("rust").with_providers([]);
        assert_eq!(select(&query), vec![Provider::WebSearch]);
    }
}
