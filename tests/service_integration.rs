//! End-to-end service behaviour over scripted adapters.
//!
//! No network: every provider is a mock that counts its calls.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use techsearch::{
    AdapterSet, FailureKind, Provider, ProviderConfig, Query, SearchService, ServiceError,
    SqliteCacheStore,
};
use techsearch_providers::native::{CaptionSegment, Completion, Transcript, WebHit};
use techsearch_providers::video::extract_video_id;
use techsearch_providers::{NativeResponse, ProviderAdapter, ProviderError};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
enum Behaviour {
    Hits(Vec<WebHit>),
    Answer(&'static str),
    Captions(&'static str),
    /// Captions for whichever video the query names.
    CaptionsForQuery,
    Fail(ProviderError),
    Slow(Duration, Vec<WebHit>),
}

struct Mock {
    provider: Provider,
    behaviour: Behaviour,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ProviderAdapter for Mock {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, query: &Query) -> Result<NativeResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Hits(hits) => Ok(NativeResponse::WebSearch(hits.clone())),
            Behaviour::Answer(text) => Ok(NativeResponse::TextAnalysis(Completion {
                answer: (*text).to_owned(),
                model: "llama-3.1-8b-instant".into(),
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            })),
            Behaviour::Captions(video_id) => Ok(NativeResponse::Transcript(Transcript {
                video_id: (*video_id).to_owned(),
                language: Some("en".into()),
                segments: vec![CaptionSegment {
                    start: 0.0,
                    duration: 2.5,
                    text: "never gonna give you up".into(),
                }],
            })),
            Behaviour::CaptionsForQuery => {
                let video_id = extract_video_id(query.text())
                    .ok_or_else(|| ProviderError::Malformed("no video id".into()))?;
                Ok(NativeResponse::Transcript(Transcript {
                    segments: vec![CaptionSegment {
                        start: 0.0,
                        duration: 1.0,
                        text: format!("captions of {video_id}"),
                    }],
                    video_id,
                    language: Some("en".into()),
                }))
            }
            Behaviour::Fail(err) => Err(err.clone()),
            Behaviour::Slow(delay, hits) => {
                tokio::time::sleep(*delay).await;
                Ok(NativeResponse::WebSearch(hits.clone()))
            }
        }
    }
}

struct Harness {
    service: SearchService,
    store: Arc<SqliteCacheStore>,
    web_calls: Arc<AtomicUsize>,
    analysis_calls: Arc<AtomicUsize>,
    transcript_calls: Arc<AtomicUsize>,
}

impl Harness {
    fn new(web: Behaviour, analysis: Behaviour, transcript: Behaviour) -> Self {
        let store = SqliteCacheStore::open_in_memory(Duration::from_secs(60)).unwrap();
        Self::with_store(web, analysis, transcript, store)
    }

    fn with_store(
        web: Behaviour,
        analysis: Behaviour,
        transcript: Behaviour,
        store: SqliteCacheStore,
    ) -> Self {
        let web_calls = Arc::new(AtomicUsize::new(0));
        let analysis_calls = Arc::new(AtomicUsize::new(0));
        let transcript_calls = Arc::new(AtomicUsize::new(0));
        let adapters = AdapterSet::new(
            Arc::new(Mock {
                provider: Provider::WebSearch,
                behaviour: web,
                calls: Arc::clone(&web_calls),
            }),
            Arc::new(Mock {
                provider: Provider::TextAnalysis,
                behaviour: analysis,
                calls: Arc::clone(&analysis_calls),
            }),
            Arc::new(Mock {
                provider: Provider::Transcript,
                behaviour: transcript,
                calls: Arc::clone(&transcript_calls),
            }),
        );
        let store = Arc::new(store);
        let service = SearchService::new(adapters, Arc::clone(&store), ProviderConfig::default())
            .with_adapter_timeout(Duration::from_millis(200));
        Self {
            service,
            store,
            web_calls,
            analysis_calls,
            transcript_calls,
        }
    }

    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.service = self.service.with_adapter_timeout(timeout);
        self
    }

    fn web_calls(&self) -> usize {
        self.web_calls.load(Ordering::SeqCst)
    }
}

fn hits(prefix: &str, n: usize) -> Vec<WebHit> {
    (0..n)
        .map(|i| WebHit {
            title: format!("{prefix} {i}"),
            url: format!("https://{prefix}.example.com/{i}"),
            content: format!("{prefix} content {i}"),
            score: Some(1.0 - i as f64 / 100.0),
            published_date: None,
        })
        .collect()
}

fn hit(title: &str, url: &str) -> WebHit {
    WebHit {
        title: title.into(),
        url: url.into(),
        content: format!("{title} content"),
        score: None,
        published_date: None,
    }
}

fn unused() -> Behaviour {
    Behaviour::Fail(ProviderError::Unreachable("not expected to be called".into()))
}

#[tokio::test]
async fn partial_failure_returns_surviving_results() {
    let h = Harness::new(
        Behaviour::Hits(hits("web", 3)),
        Behaviour::Fail(ProviderError::Timeout("groq timed out".into())),
        unused(),
    );
    let query =
        Query::new("vector databases").with_providers([Provider::WebSearch, Provider::TextAnalysis]);

    let outcome = h.service.search_detailed(&query, true).await.unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.results.iter().all(|r| r.provider == Provider::WebSearch));
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].provider, Provider::TextAnalysis);
    assert_eq!(outcome.failures[0].kind, FailureKind::Timeout);
    assert_eq!(
        outcome.providers,
        vec![Provider::WebSearch, Provider::TextAnalysis]
    );
}

#[tokio::test]
async fn slow_provider_times_out_without_blocking_others() {
    let slow = Harness::new(
        Behaviour::Slow(Duration::from_secs(30), hits("slow", 1)),
        Behaviour::Answer("Transformers use attention."),
        unused(),
    );

    let query = Query::new("attention").with_providers([Provider::WebSearch, Provider::TextAnalysis]);
    let started = std::time::Instant::now();
    let outcome = slow.service.search_detailed(&query, true).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].provider, Provider::TextAnalysis);
    assert_eq!(outcome.failures[0].kind, FailureKind::Timeout);
}

#[tokio::test]
async fn all_failed_writes_nothing() {
    let h = Harness::new(
        Behaviour::Fail(ProviderError::Unauthorized("invalid api key".into())),
        unused(),
        unused(),
    );
    let query = Query::new("quantum computing");

    let err = h.service.search(&query, true).await.unwrap_err();

    match &err {
        ServiceError::AllProvidersFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].provider, Provider::WebSearch);
            assert_eq!(failures[0].kind, FailureKind::Unauthorized);
        }
        other => panic!("expected AllProvidersFailed, got {other}"),
    }
    assert!(h.store.get(&query.fingerprint()).unwrap().is_none());
    assert_eq!(h.store.stats().unwrap().entries, 0);
}

#[tokio::test]
async fn limit_truncates_in_dispatch_then_native_order() {
    let h = Harness::new(Behaviour::Hits(hits("web", 12)), unused(), unused());
    let query = Query::new("rust web frameworks").with_limit(5);

    let results = h.service.search(&query, true).await.unwrap();

    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["web 0", "web 1", "web 2", "web 3", "web 4"]);
}

#[tokio::test]
async fn equivalent_urls_collapse_to_first_seen() {
    let h = Harness::new(
        Behaviour::Hits(vec![
            hit("first", "https://www.example.com/guide/"),
            hit("other", "https://example.com/other"),
            hit("second", "https://example.com/guide?utm_source=feed"),
            hit("third", "https://EXAMPLE.com/guide#intro"),
        ]),
        unused(),
        unused(),
    );

    let results = h.service.search(&Query::new("guide"), true).await.unwrap();

    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["first", "other"]);
}

#[tokio::test]
async fn cache_hit_makes_no_adapter_call() {
    let h = Harness::new(Behaviour::Hits(hits("web", 4)), unused(), unused());
    let query = Query::new("kubernetes operators");

    let first = h.service.search_detailed(&query, true).await.unwrap();
    let second = h.service.search_detailed(&query, true).await.unwrap();

    assert_eq!(h.web_calls(), 1);
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.results, first.results);
    assert_eq!(second.providers, vec![Provider::WebSearch]);
}

#[tokio::test]
async fn equivalent_queries_share_a_cache_entry() {
    let h = Harness::new(Behaviour::Hits(hits("web", 2)), unused(), unused());

    h.service
        .search(&Query::new("Kubernetes Operators"), true)
        .await
        .unwrap();
    let outcome = h
        .service
        .search_detailed(&Query::new("  kubernetes operators "), true)
        .await
        .unwrap();

    assert!(outcome.from_cache);
    assert_eq!(h.web_calls(), 1);
}

#[tokio::test]
async fn bypassing_cache_fetches_and_refreshes() {
    let h = Harness::new(Behaviour::Hits(hits("web", 2)), unused(), unused());
    let query = Query::new("edge computing");

    h.service.search(&query, true).await.unwrap();
    let before = h.store.get(&query.fingerprint()).unwrap().unwrap().created_at;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let outcome = h.service.search_detailed(&query, false).await.unwrap();
    let after = h.store.get(&query.fingerprint()).unwrap().unwrap().created_at;

    assert!(!outcome.from_cache);
    assert_eq!(h.web_calls(), 2);
    assert!(after > before);
}

#[tokio::test]
async fn cancelled_search_writes_nothing() {
    let h = Harness::new(
        Behaviour::Slow(Duration::from_secs(30), hits("web", 1)),
        unused(),
        unused(),
    );
    let h = h.with_timeout(Duration::from_secs(60));
    let query = Query::new("webassembly");
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = h
        .service
        .search_with_cancel(&query, true, cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Cancelled), "{err}");
    assert_eq!(h.web_calls(), 1);
    assert!(h.store.get(&query.fingerprint()).unwrap().is_none());
}

#[tokio::test]
async fn racing_callers_trigger_one_fetch() {
    let h = Harness::new(
        Behaviour::Slow(Duration::from_millis(100), hits("web", 3)),
        unused(),
        unused(),
    );
    let query = Query::new("rust async runtimes");

    let (a, b) = tokio::join!(
        h.service.search_detailed(&query, true),
        h.service.search_detailed(&query, true),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(h.web_calls(), 1);
    assert_eq!(a.results, b.results);
    assert_ne!(a.from_cache, b.from_cache);
}

#[tokio::test]
async fn expired_entry_is_refetched_and_cleaned_up() {
    let h = Harness::new(Behaviour::Hits(hits("web", 2)), unused(), unused());
    let stale = Utc::now() - chrono::Duration::seconds(120);
    let refetched = Query::new("stale query");
    let abandoned = Query::new("abandoned query");
    for query in [&refetched, &abandoned] {
        h.store
            .put_at(&query.fingerprint(), &[], &[Provider::WebSearch], stale)
            .unwrap();
    }

    let outcome = h.service.search_detailed(&refetched, true).await.unwrap();
    assert!(!outcome.from_cache);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(h.web_calls(), 1);

    assert_eq!(h.service.cleanup_cache().await.unwrap(), 1);
    assert!(h.store.get(&refetched.fingerprint()).unwrap().is_some());
    assert_eq!(h.service.cache_stats().await.unwrap().entries, 1);
}

#[tokio::test]
async fn clear_cache_removes_everything() {
    let h = Harness::new(Behaviour::Hits(hits("web", 1)), unused(), unused());
    h.service.search(&Query::new("one"), true).await.unwrap();
    h.service.search(&Query::new("two"), true).await.unwrap();

    assert_eq!(h.service.clear_cache().await.unwrap(), 2);
    assert_eq!(h.service.cache_stats().await.unwrap().entries, 0);
}

#[tokio::test]
async fn cache_failure_surfaces_as_cache_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let store = SqliteCacheStore::open(&path, Duration::from_secs(60)).unwrap();
    let h = Harness::with_store(Behaviour::Hits(hits("web", 1)), unused(), unused(), store);

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute("DROP TABLE search_cache", []).unwrap();
    drop(conn);

    let err = h
        .service
        .search(&Query::new("broken cache"), true)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Cache(_)), "{err}");
    assert_eq!(h.web_calls(), 0);
}

#[tokio::test]
async fn video_links_route_to_transcripts() {
    let h = Harness::new(unused(), unused(), Behaviour::Captions("dQw4w9WgXcQ"));

    let outcome = h
        .service
        .search_detailed(&Query::new("https://youtu.be/dQw4w9WgXcQ"), true)
        .await
        .unwrap();

    assert_eq!(outcome.providers, vec![Provider::Transcript]);
    assert_eq!(h.transcript_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.web_calls(), 0);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(
        outcome.results[0].url.as_deref(),
        Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
}

#[tokio::test]
async fn video_ids_differing_only_in_case_are_cached_apart() {
    let h = Harness::new(unused(), unused(), Behaviour::CaptionsForQuery);

    let first = h
        .service
        .search(&Query::new("https://youtu.be/dQw4w9WgXcQ"), true)
        .await
        .unwrap();
    let second = h
        .service
        .search(&Query::new("https://youtu.be/DQW4W9WGXCQ"), true)
        .await
        .unwrap();

    assert_eq!(first[0].snippet, "captions of dQw4w9WgXcQ");
    assert_eq!(second[0].snippet, "captions of DQW4W9WGXCQ");
    assert_eq!(h.transcript_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn video_url_forms_share_a_cache_entry() {
    let h = Harness::new(unused(), unused(), Behaviour::CaptionsForQuery);

    h.service
        .search(&Query::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), true)
        .await
        .unwrap();
    let outcome = h
        .service
        .search_detailed(&Query::new("https://youtu.be/dQw4w9WgXcQ"), true)
        .await
        .unwrap();

    assert!(outcome.from_cache);
    assert_eq!(h.transcript_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn explicit_analysis_routes_only_to_analysis() {
    let h = Harness::new(unused(), Behaviour::Answer("Rust has ownership."), unused());

    let outcome = h
        .service
        .search_detailed(
            &Query::new("quantum computing").with_providers([Provider::TextAnalysis]),
            true,
        )
        .await
        .unwrap();

    assert_eq!(outcome.providers, vec![Provider::TextAnalysis]);
    assert_eq!(h.analysis_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.web_calls(), 0);
    assert_eq!(outcome.results[0].title, "AI Analysis (llama-3.1-8b-instant)");
    assert!(outcome.results[0].url.is_none());
}

#[tokio::test]
async fn plain_text_routes_to_web_search() {
    let h = Harness::new(Behaviour::Hits(hits("web", 1)), unused(), unused());

    let outcome = h
        .service
        .search_detailed(&Query::new("quantum computing"), true)
        .await
        .unwrap();

    assert_eq!(outcome.providers, vec![Provider::WebSearch]);
    assert_eq!(h.analysis_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.transcript_calls.load(Ordering::SeqCst), 0);
}
