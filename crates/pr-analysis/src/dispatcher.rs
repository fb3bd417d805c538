//! Analysis dispatcher
//!
//! Splits a PR diff into files, fans the files out to an [`Analyzer`] with a
//! concurrency ceiling, synthesises the results and caches them per head
//! commit. Failures of individual steps are replaced with placeholder
//! results so a run always completes.

use crate::analyzer::Analyzer;
use crate::events::{emit, AnalysisEvent};
use crate::types::{AnalysisContext, AnalysisResult, FileAnalysis, PrAnalysis};
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use pr_cache::LruCache;
use pr_config::{AppConfig, DEFAULT_MAX_CONCURRENT_ANALYSES};
use pr_diff::split_diff_by_file;
use pr_source::{PullRequestSource, RepoRef};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

/// Analysis cache shared between dispatchers
pub type SharedAnalysisCache = Arc<Mutex<LruCache<AnalysisResult>>>;

/// Runs analyses and keeps their results
///
/// # Example
///
/// ```rust,ignore
/// use pr_analysis::{AnalysisContext, AnalysisDispatcher};
/// use pr_config::AppConfig;
///
/// let dispatcher = AnalysisDispatcher::from_config(analyzer, &AppConfig::load());
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let result = dispatcher
///     .analyze("octo/hello", 42, &head_sha, &raw_diff, &context, &tx)
///     .await;
/// ```
#[derive(Clone)]
pub struct AnalysisDispatcher {
    analyzer: Arc<dyn Analyzer>,
    cache: SharedAnalysisCache,
    max_concurrent: usize,
}

impl AnalysisDispatcher {
    /// Create a dispatcher around an existing cache
    pub fn new(analyzer: Arc<dyn Analyzer>, cache: SharedAnalysisCache) -> Self {
        Self {
            analyzer,
            cache,
            max_concurrent: DEFAULT_MAX_CONCURRENT_ANALYSES,
        }
    }

    /// Create a dispatcher with its own cache, sized from the config
    pub fn from_config(analyzer: Arc<dyn Analyzer>, config: &AppConfig) -> Self {
        let cache = Arc::new(Mutex::new(LruCache::new(config.analysis_cache_capacity)));
        Self::new(analyzer, cache).with_max_concurrent(config.max_concurrent_analyses)
    }

    /// Limit how many files are analysed at the same time (at least one)
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Handle to the result cache
    pub fn cache(&self) -> SharedAnalysisCache {
        Arc::clone(&self.cache)
    }

    /// Cache key of one PR at one head commit
    pub fn cache_key(repo: &str, number: u64, head_sha: &str) -> String {
        format!("{}:{}:{}", repo, number, head_sha)
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<AnalysisResult>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop results for older commits of the PR and look up the current one
    fn lookup(&self, repo: &str, number: u64, head_sha: &str) -> (String, Option<AnalysisResult>) {
        let key = Self::cache_key(repo, number, head_sha);
        let prefix = format!("{}:{}:", repo, number);

        let mut cache = self.lock_cache();
        let evicted = cache.invalidate_prefix_except(&prefix, &key);
        if evicted > 0 {
            debug!("Evicted {} stale analyses for {}#{}", evicted, repo, number);
        }
        let hit = cache.get(&key).cloned();
        (key, hit)
    }

    /// Analyse a PR diff, reporting progress on `events`
    ///
    /// # Arguments
    ///
    /// * `repo` - `owner/name` of the repository
    /// * `number` - PR number
    /// * `head_sha` - Head commit; a new commit invalidates older results
    /// * `raw_diff` - Full unified diff of the PR
    /// * `context` - Title and description handed to the analyzer
    /// * `events` - Progress sink; a dropped receiver does not stop the run
    pub async fn analyze(
        &self,
        repo: &str,
        number: u64,
        head_sha: &str,
        raw_diff: &str,
        context: &AnalysisContext,
        events: &UnboundedSender<AnalysisEvent>,
    ) -> AnalysisResult {
        let (key, hit) = self.lookup(repo, number, head_sha);
        if let Some(result) = hit {
            debug!("Cache hit for {}", key);
            emit(events, AnalysisEvent::Done { data: result.clone() });
            return result;
        }

        self.run(key, raw_diff, context, events).await
    }

    /// Fetch a PR from `source` and analyse it
    ///
    /// The diff is only downloaded when no result is cached for the PR's
    /// current head commit.
    pub async fn analyze_pull_request(
        &self,
        source: &dyn PullRequestSource,
        repo: &RepoRef,
        number: u64,
        events: &UnboundedSender<AnalysisEvent>,
    ) -> anyhow::Result<AnalysisResult> {
        let detail = source.fetch_pull_request(repo, number).await?;
        let repo_key = repo.to_string();

        let (key, hit) = self.lookup(&repo_key, number, &detail.head_ref_oid);
        if let Some(result) = hit {
            debug!("Cache hit for {}", key);
            emit(events, AnalysisEvent::Done { data: result.clone() });
            return Ok(result);
        }

        let raw_diff = source.fetch_diff(repo, number).await?;
        let context = AnalysisContext::from_detail(&detail);
        Ok(self.run(key, &raw_diff, &context, events).await)
    }

    async fn run(
        &self,
        key: String,
        raw_diff: &str,
        context: &AnalysisContext,
        events: &UnboundedSender<AnalysisEvent>,
    ) -> AnalysisResult {
        let fragments = split_diff_by_file(raw_diff);
        let total = fragments.len();
        info!("Analysing {} files for {}", total, key);
        emit(events, AnalysisEvent::Start { total });

        let analyzer = &self.analyzer;
        let mut pending = stream::iter(fragments.iter().enumerate())
            .map(|(index, fragment)| async move {
                let result = analyzer
                    .analyze_file(fragment.diff_text, fragment.file_name, context)
                    .await;
                (index, fragment.file_name, result)
            })
            .buffer_unordered(self.max_concurrent);

        let mut completed = 0;
        let mut indexed = Vec::with_capacity(total);
        while let Some((index, file_name, result)) = pending.next().await {
            completed += 1;
            let analysis = match result {
                Ok(mut analysis) => {
                    if analysis.file.is_empty() {
                        analysis.file = file_name.to_string();
                    }
                    analysis
                }
                Err(e) => {
                    warn!("Analysis of {} failed: {:#}", file_name, e);
                    FileAnalysis::failed(file_name, &e)
                }
            };
            emit(
                events,
                AnalysisEvent::Progress {
                    completed,
                    total,
                    file: file_name.to_string(),
                },
            );
            indexed.push((index, analysis));
        }

        // Completion order is arbitrary; report files in diff order
        indexed.sort_by_key(|(index, _)| *index);
        let file_analyses: Vec<FileAnalysis> =
            indexed.into_iter().map(|(_, analysis)| analysis).collect();

        emit(events, AnalysisEvent::Synthesizing);
        let pr_analysis = match self.analyzer.synthesize(&file_analyses, context).await {
            Ok(pr_analysis) => pr_analysis,
            Err(e) => {
                warn!("Synthesis for {} failed, using fallback: {:#}", key, e);
                PrAnalysis::fallback(&file_analyses)
            }
        };

        let result = AnalysisResult {
            pr_analysis,
            file_analyses,
        };
        self.lock_cache().set(key, result.clone());
        emit(events, AnalysisEvent::Done { data: result.clone() });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConceptSize, RiskLevel};
    use async_trait::async_trait;
    use pr_source::{PullRequestDetail, PullRequestSummary, ReviewAction};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    const THREE_FILES: &str = "\
diff --git a/src/a.rs b/src/a.rs
--- a/src/a.rs
+++ b/src/a.rs
@@ -1 +1 @@
-old
+new
diff --git a/src/b.rs b/src/b.rs
--- a/src/b.rs
+++ b/src/b.rs
@@ -1 +1,2 @@
 keep
+added
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -3 +3 @@
-Old
+New
";

    /// Mock analyzer for testing
    #[derive(Default)]
    struct MockAnalyzer {
        fail_files: Vec<&'static str>,
        fail_synthesis: bool,
        file_calls: AtomicUsize,
        synth_calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl MockAnalyzer {
        fn file_calls(&self) -> usize {
            self.file_calls.load(Ordering::SeqCst)
        }

        fn synth_calls(&self) -> usize {
            self.synth_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Analyzer for MockAnalyzer {
        async fn analyze_file(
            &self,
            diff: &str,
            file_name: &str,
            context: &AnalysisContext,
        ) -> anyhow::Result<FileAnalysis> {
            self.file_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            assert!(diff.starts_with("diff --git "));
            if self.fail_files.iter().any(|f| *f == file_name) {
                anyhow::bail!("boom");
            }
            Ok(FileAnalysis::summary_only(
                file_name,
                format!("{}: {}", context.title, file_name),
            ))
        }

        async fn synthesize(
            &self,
            file_analyses: &[FileAnalysis],
            _context: &AnalysisContext,
        ) -> anyhow::Result<PrAnalysis> {
            self.synth_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_synthesis {
                anyhow::bail!("model unavailable");
            }
            Ok(PrAnalysis {
                summary: format!("{} files", file_analyses.len()),
                risk_level: RiskLevel::Low,
                key_changes: vec![],
                intent: "test".to_string(),
                concepts: vec![],
            })
        }
    }

    fn dispatcher(analyzer: &Arc<MockAnalyzer>) -> AnalysisDispatcher {
        let analyzer: Arc<dyn Analyzer> = analyzer.clone();
        AnalysisDispatcher::new(analyzer, Arc::new(Mutex::new(LruCache::new(10))))
    }

    fn context() -> AnalysisContext {
        AnalysisContext::new("Fix things", "")
    }

    fn drain(rx: &mut UnboundedReceiver<AnalysisEvent>) -> Vec<AnalysisEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_fresh_run_emits_events_in_order() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer);
        let (tx, mut rx) = unbounded_channel();

        let result = dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], AnalysisEvent::Start { total: 3 });
        for (i, event) in events[1..4].iter().enumerate() {
            match event {
                AnalysisEvent::Progress {
                    completed, total, ..
                } => {
                    assert_eq!(*completed, i + 1);
                    assert_eq!(*total, 3);
                }
                other => panic!("expected progress, got {:?}", other),
            }
        }
        assert_eq!(events[4], AnalysisEvent::Synthesizing);
        assert_eq!(
            events[5],
            AnalysisEvent::Done {
                data: result.clone()
            }
        );

        // Files keep diff order
        let files: Vec<&str> = result.file_analyses.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, vec!["src/a.rs", "src/b.rs", "README.md"]);
        assert_eq!(result.file_analyses[0].summary, "Fix things: src/a.rs");
        assert_eq!(result.pr_analysis.summary, "3 files");
        assert_eq!(analyzer.file_calls(), 3);
        assert_eq!(analyzer.synth_calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_emits_single_done() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer);
        let (tx, mut rx) = unbounded_channel();

        let first = dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;
        drain(&mut rx);

        let second = dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;

        assert_eq!(first, second);
        assert_eq!(drain(&mut rx), vec![AnalysisEvent::Done { data: second }]);
        // Analyzer not called again
        assert_eq!(analyzer.file_calls(), 3);
        assert_eq!(analyzer.synth_calls(), 1);
    }

    #[tokio::test]
    async fn test_new_head_commit_invalidates_old_result() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer);
        let (tx, _rx) = unbounded_channel();

        dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;
        dispatcher
            .analyze("octo/hello", 12, "sha1", THREE_FILES, &context(), &tx)
            .await;
        dispatcher
            .analyze("octo/hello", 1, "sha2", THREE_FILES, &context(), &tx)
            .await;

        let cache = dispatcher.cache();
        let cache = cache.lock().unwrap();
        assert!(!cache.contains_key("octo/hello:1:sha1"));
        assert!(cache.contains_key("octo/hello:1:sha2"));
        // PR 12 shares the digit prefix but not the key prefix
        assert!(cache.contains_key("octo/hello:12:sha1"));
        assert_eq!(analyzer.synth_calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_file_gets_placeholder() {
        let analyzer = Arc::new(MockAnalyzer {
            fail_files: vec!["src/b.rs"],
            ..Default::default()
        });
        let dispatcher = dispatcher(&analyzer);
        let (tx, _rx) = unbounded_channel();

        let result = dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;

        let failed = result.file("src/b.rs").unwrap();
        assert_eq!(failed.summary, "Analysis failed: boom");
        assert!(failed.annotations.is_empty());
        assert!(!result.file("src/a.rs").unwrap().is_failure());
        assert_eq!(analyzer.synth_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_synthesis_uses_fallback() {
        let analyzer = Arc::new(MockAnalyzer {
            fail_synthesis: true,
            ..Default::default()
        });
        let dispatcher = dispatcher(&analyzer);
        let (tx, _rx) = unbounded_channel();

        let result = dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;

        let pr = &result.pr_analysis;
        assert_eq!(pr.risk_level, RiskLevel::Medium);
        assert_eq!(pr.concepts.len(), 1);
        assert_eq!(pr.concepts[0].id, "all-changes");
        assert_eq!(pr.concepts[0].size, ConceptSize::Large);
        assert_eq!(
            pr.concepts[0].file_ids,
            vec!["src/a.rs", "src/b.rs", "README.md"]
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_stop_run() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer);
        let (tx, rx) = unbounded_channel();
        drop(rx);

        let result = dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;

        assert_eq!(result.file_analyses.len(), 3);
        assert!(dispatcher
            .cache()
            .lock()
            .unwrap()
            .contains_key("octo/hello:1:sha1"));
    }

    #[tokio::test]
    async fn test_empty_diff() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer);
        let (tx, mut rx) = unbounded_channel();

        let result = dispatcher
            .analyze("octo/hello", 1, "sha1", "", &context(), &tx)
            .await;

        assert!(result.file_analyses.is_empty());
        let events = drain(&mut rx);
        assert_eq!(events[0], AnalysisEvent::Start { total: 0 });
        assert_eq!(events[1], AnalysisEvent::Synthesizing);
        assert_eq!(events.len(), 3);
        assert_eq!(analyzer.file_calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer).with_max_concurrent(2);
        let (tx, _rx) = unbounded_channel();

        dispatcher
            .analyze("octo/hello", 1, "sha1", THREE_FILES, &context(), &tx)
            .await;

        assert!(analyzer.peak_in_flight.load(Ordering::SeqCst) <= 2);
        assert_eq!(dispatcher.max_concurrent(), 2);
        assert_eq!(dispatcher.clone().with_max_concurrent(0).max_concurrent(), 1);
    }

    #[test]
    fn test_default_limit_follows_config_default() {
        let analyzer: Arc<dyn Analyzer> = Arc::new(MockAnalyzer::default());
        let cache = Arc::new(Mutex::new(LruCache::new(1)));
        let dispatcher = AnalysisDispatcher::new(analyzer, cache);
        assert_eq!(
            dispatcher.max_concurrent(),
            AppConfig::default().max_concurrent_analyses
        );
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            analysis_cache_capacity: 3,
            max_concurrent_analyses: 4,
            ..AppConfig::default()
        };
        let analyzer: Arc<dyn Analyzer> = Arc::new(MockAnalyzer::default());
        let dispatcher = AnalysisDispatcher::from_config(analyzer, &config);
        assert_eq!(dispatcher.max_concurrent(), 4);
        assert_eq!(dispatcher.cache().lock().unwrap().capacity(), 3);
    }

    /// Mock pull request source for testing
    struct MockSource {
        head_sha: &'static str,
        diff_calls: AtomicUsize,
    }

    #[async_trait]
    impl PullRequestSource for MockSource {
        async fn list_open_pull_requests(
            &self,
            _repo: &RepoRef,
        ) -> anyhow::Result<Vec<PullRequestSummary>> {
            Ok(vec![])
        }

        async fn fetch_pull_request(
            &self,
            _repo: &RepoRef,
            number: u64,
        ) -> anyhow::Result<PullRequestDetail> {
            let json = serde_json::json!({
                "number": number,
                "title": "Mock PR",
                "author": { "login": "dev" },
                "body": "Does things",
                "additions": 4,
                "deletions": 3,
                "changedFiles": 3,
                "createdAt": "2024-05-01T12:00:00Z",
                "headRefOid": self.head_sha,
            });
            Ok(serde_json::from_value(json)?)
        }

        async fn fetch_diff(&self, _repo: &RepoRef, _number: u64) -> anyhow::Result<String> {
            self.diff_calls.fetch_add(1, Ordering::SeqCst);
            Ok(THREE_FILES.to_string())
        }

        async fn submit_review(
            &self,
            _repo: &RepoRef,
            _number: u64,
            _action: ReviewAction,
            _body: Option<&str>,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_analyze_pull_request_skips_diff_on_cache_hit() {
        let analyzer = Arc::new(MockAnalyzer::default());
        let dispatcher = dispatcher(&analyzer);
        let source = MockSource {
            head_sha: "abc",
            diff_calls: AtomicUsize::new(0),
        };
        let repo = RepoRef::parse("octo/hello").unwrap();
        let (tx, _rx) = unbounded_channel();

        let first = dispatcher
            .analyze_pull_request(&source, &repo, 5, &tx)
            .await
            .unwrap();
        let second = dispatcher
            .analyze_pull_request(&source, &repo, 5, &tx)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.file_analyses[0].summary, "Mock PR: src/a.rs");
        assert_eq!(source.diff_calls.load(Ordering::SeqCst), 1);
        assert!(dispatcher
            .cache()
            .lock()
            .unwrap()
            .contains_key("octo/hello:5:abc"));
    }
}
