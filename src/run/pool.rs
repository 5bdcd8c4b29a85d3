//! Bounded worker pool for summary builds
//!
//! Each job is spawned onto a rayon pool of at most `workers` threads and
//! sends its finished summary back over a channel. The receiver is drained
//! only after the pool scope has joined every job.

use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use xcreport_model::{ResultSource, TestSummary, TestableSummary};

use super::builder::{SummaryBuilder, SummaryRequest};
use crate::config::RenderingConfig;

/// One testable target waiting to be summarized.
#[derive(Debug, Clone)]
pub(crate) struct SummaryJob {
    pub source: Arc<dyn ResultSource>,
    pub testable: TestableSummary,
    pub remove_all_tests_group: bool,
}

impl SummaryJob {
    fn build(&self, builder: &dyn SummaryBuilder, rendering: &RenderingConfig) -> TestSummary {
        builder.build(SummaryRequest {
            testable: &self.testable,
            source: self.source.as_ref(),
            rendering,
            remove_all_tests_group: self.remove_all_tests_group,
        })
    }
}

/// Twice the number of logical cores.
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1) * 2
}

/// Build every job's summary on at most `workers` threads.
///
/// Results are sorted by test name; equal names keep the order in which the
/// jobs were scheduled, whatever order they finished in.
pub(crate) fn build_summaries(
    jobs: &[SummaryJob],
    workers: usize,
    builder: &dyn SummaryBuilder,
    rendering: &RenderingConfig,
) -> Vec<TestSummary> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let (sender, receiver) = crossbeam_channel::unbounded();

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.clamp(1, jobs.len()))
        .thread_name(|idx| format!("xcreport-summary-{}", idx))
        .build();

    match pool {
        Ok(pool) => pool.scope(|scope| {
            for (index, job) in jobs.iter().enumerate() {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    // Failure to send means the receiver was dropped.
                    let _ = sender.send((index, job.build(builder, rendering)));
                });
            }
        }),
        // No threads could be spawned: build on the calling thread.
        Err(_) => {
            for (index, job) in jobs.iter().enumerate() {
                let _ = sender.send((index, job.build(builder, rendering)));
            }
        }
    }
    drop(sender);

    let mut finished: Vec<(usize, TestSummary)> = receiver.into_iter().collect();
    finished.sort_by(|(index_a, a), (index_b, b)| {
        a.test_name
            .cmp(&b.test_name)
            .then_with(|| index_a.cmp(index_b))
    });
    finished.into_iter().map(|(_, summary)| summary).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DelayedSummaryBuilder, MockResultSource};
    use crate::run::builder::TreeSummaryBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use xcreport_model::{Status, Test};

    /// Records the highest number of builds running at once.
    #[derive(Default)]
    struct PeakTracker {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SummaryBuilder for PeakTracker {
        fn build(&self, request: SummaryRequest<'_>) -> TestSummary {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(10));
            self.active.fetch_sub(1, Ordering::SeqCst);
            TreeSummaryBuilder.build(request)
        }
    }

    fn job(source: &Arc<dyn ResultSource>, name: &str, status: Status) -> SummaryJob {
        SummaryJob {
            source: Arc::clone(source),
            testable: TestableSummary {
                name: name.to_string(),
                target_name: None,
                tests: vec![Test::leaf(format!("{}.test", name), status)],
            },
            remove_all_tests_group: false,
        }
    }

    #[test]
    fn test_default_worker_count_is_even_and_positive() {
        let count = default_worker_count();
        assert!(count >= 2);
        assert_eq!(count % 2, 0);
    }

    #[test]
    fn test_empty_jobs() {
        let summaries = build_summaries(&[], 4, &TreeSummaryBuilder, &RenderingConfig::default());
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_results_sorted_regardless_of_completion_order() {
        let source: Arc<dyn ResultSource> = Arc::new(MockResultSource::new("/b"));
        let jobs = vec![
            job(&source, "Charlie", Status::Success),
            job(&source, "alpha", Status::Success),
            job(&source, "Bravo", Status::Failure),
            job(&source, "Alpha", Status::Skipped),
        ];
        // The first scheduled job finishes last.
        let builder = DelayedSummaryBuilder::new(TreeSummaryBuilder)
            .with_delay("Charlie", Duration::from_millis(60))
            .with_delay("Bravo", Duration::from_millis(30));

        let summaries = build_summaries(&jobs, 4, &builder, &RenderingConfig::default());
        let names: Vec<&str> = summaries.iter().map(|s| s.test_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie", "alpha"]);
    }

    #[test]
    fn test_equal_names_keep_schedule_order() {
        let source: Arc<dyn ResultSource> = Arc::new(MockResultSource::new("/b"));
        let mut first = job(&source, "first", Status::Failure);
        first.testable.target_name = Some("Same".to_string());
        let mut second = job(&source, "second", Status::Success);
        second.testable.target_name = Some("Same".to_string());
        let jobs = vec![first, second];

        let builder = DelayedSummaryBuilder::new(TreeSummaryBuilder)
            .with_delay("first", Duration::from_millis(40));

        for _ in 0..3 {
            let summaries = build_summaries(&jobs, 2, &builder, &RenderingConfig::default());
            assert_eq!(summaries.len(), 2);
            assert_eq!(summaries[0].test_name, "Same");
            assert_eq!(summaries[0].tests[0].name, "first.test");
            assert_eq!(summaries[1].tests[0].name, "second.test");
        }
    }

    #[test]
    fn test_pool_never_exceeds_worker_count() {
        let source: Arc<dyn ResultSource> = Arc::new(MockResultSource::new("/b"));
        let jobs: Vec<SummaryJob> = (0..12)
            .map(|i| job(&source, &format!("Target{:02}", i), Status::Success))
            .collect();
        let builder = PeakTracker::default();

        let summaries = build_summaries(&jobs, 3, &builder, &RenderingConfig::default());

        assert_eq!(summaries.len(), 12);
        let peak = builder.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak concurrency {}", peak);
    }

    #[test]
    fn test_single_worker_builds_everything() {
        let source: Arc<dyn ResultSource> = Arc::new(MockResultSource::new("/b"));
        let jobs: Vec<SummaryJob> = (0..20)
            .map(|i| job(&source, &format!("Target{:02}", i), Status::Success))
            .collect();

        let summaries = build_summaries(&jobs, 1, &TreeSummaryBuilder, &RenderingConfig::default());
        assert_eq!(summaries.len(), 20);
        assert!(summaries.windows(2).all(|w| w[0].test_name <= w[1].test_name));
    }
}
