//! Transcript adapter: YouTube caption tracks.
//!
//! No API key. Fetches the public watch page, pulls the `captionTracks`
//! list out of the embedded player response, picks a track in the
//! preferred language and downloads its timed-text XML.

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::adapter::ProviderAdapter;
use crate::config::{ProviderConfig, TranscriptSettings};
use crate::error::ProviderError;
use crate::http;
use crate::native::{CaptionSegment, NativeResponse, Transcript};
use crate::query::Query;
use crate::types::Provider;
use crate::video::extract_video_id;

const SERVICE: &str = "YouTube";

const CAPTION_TRACKS_MARKER: &str = "\"captionTracks\":";

/// Present on the interstitial YouTube serves to suspected bots.
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// `"asr"` for auto-generated tracks.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Full caption text for a video link.
pub struct TranscriptAdapter {
    client: reqwest::Client,
    settings: TranscriptSettings,
}

impl TranscriptAdapter {
    /// # Errors
    ///
    /// Returns [`ProviderError::Unreachable`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_page_client(config)?,
            settings: config.transcript.clone(),
        })
    }

    fn base(&self) -> Result<Url, ProviderError> {
        Url::parse(&self.settings.base_url).map_err(|e| {
            ProviderError::Unreachable(format!(
                "invalid transcript base URL {}: {e}",
                self.settings.base_url
            ))
        })
    }

    fn accept_language(&self) -> String {
        if self.settings.languages.is_empty() {
            "en".to_owned()
        } else {
            self.settings.languages.join(",")
        }
    }
}

#[async_trait]
impl ProviderAdapter for TranscriptAdapter {
    fn provider(&self) -> Provider {
        Provider::Transcript
    }

    async fn fetch(&self, query: &Query) -> Result<NativeResponse, ProviderError> {
        let video_id = extract_video_id(query.text()).ok_or_else(|| {
            ProviderError::Malformed(format!("no video id in {:?}", query.text()))
        })?;
        let base = self.base()?;

        let mut watch = base
            .join("watch")
            .map_err(|e| ProviderError::Malformed(format!("cannot build watch URL: {e}")))?;
        watch.query_pairs_mut().append_pair("v", &video_id);

        tracing::trace!(video_id = %video_id, "fetching watch page");
        let page = http::send_for_text(
            SERVICE,
            self.client
                .get(watch)
                .header(ACCEPT_LANGUAGE, self.accept_language()),
        )
        .await?;

        if page.contains(RECAPTCHA_MARKER) {
            return Err(ProviderError::RateLimited(
                "YouTube is asking for a captcha".into(),
            ));
        }

        let tracks = parse_caption_tracks(&page)?;
        let track = pick_track(&tracks, &self.settings.languages).ok_or_else(|| {
            ProviderError::Malformed(format!("no captions available for {video_id}"))
        })?;

        let caption_url = base
            .join(&track.base_url)
            .map_err(|e| ProviderError::Malformed(format!("bad caption URL: {e}")))?;

        tracing::trace!(
            video_id = %video_id,
            language = %track.language_code,
            generated = track.is_generated(),
            "fetching caption track"
        );
        let xml = http::send_for_text(SERVICE, self.client.get(caption_url)).await?;
        let segments = parse_timed_text(&xml)?;

        if segments.is_empty() {
            return Err(ProviderError::Malformed(format!(
                "caption track for {video_id} is empty"
            )));
        }

        tracing::debug!(video_id = %video_id, segments = segments.len(), "transcript fetched");
        Ok(NativeResponse::Transcript(Transcript {
            video_id,
            language: (!track.language_code.is_empty()).then(|| track.language_code.clone()),
            segments,
        }))
    }
}

/// Pull the caption track list out of a watch page.
///
/// A page without the marker has no captions; that is reported as
/// `Malformed` rather than an empty list.
pub(crate) fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
    let start = page
        .find(CAPTION_TRACKS_MARKER)
        .ok_or_else(|| ProviderError::Malformed("watch page has no caption tracks".into()))?;
    let rest = &page[start + CAPTION_TRACKS_MARKER.len()..];

    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .ok_or_else(|| ProviderError::Malformed("caption track list is empty".into()))?
        .map_err(|e| ProviderError::Malformed(format!("caption track list not understood: {e}")))
}

/// Choose a track: first preferred language wins, manual tracks before
/// generated ones, then whatever comes first.
pub(crate) fn pick_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    for language in languages {
        let matching = tracks.iter().filter(|t| {
            t.language_code.eq_ignore_ascii_case(language)
                || t.language_code
                    .split('-')
                    .next()
                    .is_some_and(|base| base.eq_ignore_ascii_case(language))
        });
        let mut generated = None;
        for track in matching {
            if !track.is_generated() {
                return Some(track);
            }
            generated.get_or_insert(track);
        }
        if generated.is_some() {
            return generated;
        }
    }
    tracks.first()
}

/// Parse timed-text XML into segments.
///
/// Understands the classic `<text start="s" dur="s">` layout and the
/// `srv3` `<p t="ms" d="ms">` layout.
pub(crate) fn parse_timed_text(xml: &str) -> Result<Vec<CaptionSegment>, ProviderError> {
    let document = Html::parse_document(xml);
    let line_sel = Selector::parse("text, p")
        .map_err(|e| ProviderError::Malformed(format!("invalid caption selector: {e:?}")))?;

    let mut segments = Vec::new();
    for element in document.select(&line_sel) {
        let attrs = element.value();
        let (start, duration) = match (attrs.attr("start"), attrs.attr("t")) {
            (Some(start), _) => (
                parse_seconds(Some(start)),
                parse_seconds(attrs.attr("dur")),
            ),
            (None, Some(t)) => (
                parse_millis(Some(t)),
                parse_millis(attrs.attr("d")),
            ),
            (None, None) => continue,
        };

        let raw: String = element.text().collect();
        let text = collapse_whitespace(&decode_entities(&raw));
        if text.is_empty() {
            continue;
        }
        segments.push(CaptionSegment {
            start,
            duration,
            text,
        });
    }
    Ok(segments)
}

fn parse_seconds(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

fn parse_millis(value: Option<&str>) -> f64 {
    parse_seconds(value) / 1000.0
}

/// Caption XML double-encodes entities (`&amp;#39;`); the HTML parser
/// undoes one level, this undoes the second.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
