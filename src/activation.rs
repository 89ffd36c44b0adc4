//! Activation of the chosen candidate.
//!
//! Committing a session asks the desktop to activate the application and,
//! once activation had a moment to settle, raises each of its windows that
//! is not minimized.  Both steps run on one long-lived worker thread so the
//! input path never waits on the desktop, and commits reach the desktop in
//! the order they were made.
//!
//! Only the raise is deferred.  Any newer job, or dropping the
//! [`Committer`], cancels a raise that is still waiting out its delay
//! instead of leaving a stray callback behind.

use crate::command::AppId;
use crate::traits::WindowManager;
use log::{debug, error, info, warn};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Counts from one raise pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaiseReport {
    pub raised: usize,
    pub minimized: usize,
    pub failed: usize,
}

/// How a scheduled raise ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaiseOutcome {
    Done(RaiseReport),
    Cancelled,
}

/// Raise every non-minimized window of `app`, in enumeration order.
///
/// A window that fails to raise is logged and skipped; the rest are still
/// raised.
pub fn raise_windows<W: WindowManager + ?Sized>(wm: &W, app: &AppId) -> RaiseReport {
    let mut report = RaiseReport::default();
    let windows = match wm.windows(app) {
        Ok(w) => w,
        Err(e) => {
            warn!("cannot list windows of {}: {}", app, e);
            return report;
        }
    };
    for window in &windows {
        if window.minimized {
            report.minimized += 1;
            continue;
        }
        match wm.raise_window(window) {
            Ok(()) => report.raised += 1,
            Err(e) => {
                debug!("raise {} failed: {}", window.address, e);
                report.failed += 1;
            }
        }
    }
    debug!(
        "raised {} window(s) of {} ({} minimized, {} failed)",
        report.raised, app, report.minimized, report.failed
    );
    report
}

/// Work for the activation worker.
#[derive(Debug)]
enum Job {
    Commit { seq: u64, app: AppId },
    /// Drop the raise that is waiting, if any.
    Cancel,
}

/// Activates committed candidates, one at a time, in commit order.
pub struct Committer {
    jobs: Option<mpsc::Sender<Job>>,
    outcomes: mpsc::Receiver<(u64, RaiseOutcome)>,
    next_seq: u64,
    /// The last commit, until it is cancelled or waited for.
    pending: Option<(u64, AppId)>,
}

impl Committer {
    /// Start the worker.  `delay` is the settle time between activation
    /// and raising.
    pub fn new<W: WindowManager>(wm: Arc<W>, delay: Duration) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel();
        let (outcomes_tx, outcomes) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("appgrd-activate".into())
            .spawn(move || run_worker(&*wm, delay, jobs_rx, outcomes_tx));
        let jobs = match spawned {
            Ok(_) => Some(jobs_tx),
            Err(e) => {
                error!("cannot spawn activation worker: {}", e);
                None
            }
        };
        Self {
            jobs,
            outcomes,
            next_seq: 0,
            pending: None,
        }
    }

    /// Activate `app` and schedule raising its windows.
    ///
    /// A raise still waiting from an earlier commit is cancelled; that
    /// commit's activation has already been requested.
    pub fn commit(&mut self, app: AppId) {
        // Outcomes nobody waited for.
        self.outcomes.try_iter().for_each(drop);

        let Some(jobs) = &self.jobs else {
            warn!("no activation worker, cannot activate {}", app);
            return;
        };
        info!("activating {}", app);
        let seq = self.next_seq;
        self.next_seq += 1;
        if jobs.send(Job::Commit { seq, app: app.clone() }).is_err() {
            error!("activation worker gone, cannot activate {}", app);
            return;
        }
        self.pending = Some((seq, app));
    }

    /// Cancel the pending raise, if any.
    pub fn cancel_pending(&mut self) {
        if let Some((_, app)) = self.pending.take() {
            debug!("cancelling pending raise of {}", app);
            if let Some(jobs) = &self.jobs {
                let _ = jobs.send(Job::Cancel);
            }
        }
    }

    /// The app of the last commit, until it is cancelled or waited for.
    pub fn pending_app(&self) -> Option<&AppId> {
        self.pending.as_ref().map(|(_, app)| app)
    }

    /// Block until the last commit's raise finished or was cancelled.
    pub fn wait(&mut self) -> Option<RaiseOutcome> {
        let (seq, _) = self.pending.take()?;
        self.outcomes
            .iter()
            .find(|(done, _)| *done == seq)
            .map(|(_, outcome)| outcome)
    }
}

impl Drop for Committer {
    fn drop(&mut self) {
        // Closing the queue cancels a waiting raise and stops the worker.
        self.jobs.take();
    }
}

/// Process jobs until the [`Committer`] is dropped.
fn run_worker<W: WindowManager + ?Sized>(
    wm: &W,
    delay: Duration,
    jobs: mpsc::Receiver<Job>,
    outcomes: mpsc::Sender<(u64, RaiseOutcome)>,
) {
    let mut next = jobs.recv().ok();
    while let Some(job) = next.take() {
        if let Job::Commit { seq, app } = job {
            if let Err(e) = wm.activate(&app) {
                warn!("activation of {} failed: {}", app, e);
            }
            let outcome = match jobs.recv_timeout(delay) {
                Err(mpsc::RecvTimeoutError::Timeout) => RaiseOutcome::Done(raise_windows(wm, &app)),
                Ok(job) => {
                    debug!("raise of {} cancelled", app);
                    next = Some(job);
                    RaiseOutcome::Cancelled
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    debug!("raise of {} cancelled", app);
                    RaiseOutcome::Cancelled
                }
            };
            let _ = outcomes.send((seq, outcome));
        }
        if next.is_none() {
            next = jobs.recv().ok();
        }
    }
    debug!("activation worker stopped");
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeDesktop;
    use std::time::Instant;

    #[test]
    fn raise_skips_minimized_and_keeps_order() {
        let desktop = FakeDesktop::with_apps(&["A"]);
        desktop.set_windows("A", &[("a1", false), ("a2", true), ("a3", false)]);
        let report = raise_windows(&desktop, &AppId::new("A"));
        assert_eq!(
            report,
            RaiseReport {
                raised: 2,
                minimized: 1,
                failed: 0
            }
        );
        assert_eq!(desktop.raised(), vec!["a1", "a3"]);
    }

    #[test]
    fn one_bad_window_does_not_block_the_rest() {
        let desktop = FakeDesktop::with_apps(&["A"]);
        desktop.set_windows("A", &[("a1", false), ("gone", false), ("a3", false)]);
        desktop.break_window("gone");
        let report = raise_windows(&desktop, &AppId::new("A"));
        assert_eq!(report.raised, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(desktop.raised(), vec!["a1", "a3"]);
    }

    #[test]
    fn window_listing_failure_raises_nothing() {
        let desktop = FakeDesktop::with_apps(&["A"]);
        let report = raise_windows(&desktop, &AppId::new("unknown"));
        assert_eq!(report, RaiseReport::default());
    }

    #[test]
    fn commit_activates_then_raises() {
        let desktop = Arc::new(FakeDesktop::with_apps(&["A", "B"]));
        let mut c = Committer::new(Arc::clone(&desktop), Duration::ZERO);
        c.commit(AppId::new("B"));
        assert_eq!(c.pending_app(), Some(&AppId::new("B")));
        let outcome = c.wait().unwrap();
        assert_eq!(
            outcome,
            RaiseOutcome::Done(RaiseReport {
                raised: 1,
                minimized: 0,
                failed: 0
            })
        );
        assert_eq!(desktop.activations(), vec![AppId::new("B")]);
        assert_eq!(desktop.raised(), vec!["B-1"]);
        assert!(c.wait().is_none());
    }

    #[test]
    fn cancel_stops_the_delayed_raise() {
        let desktop = Arc::new(FakeDesktop::with_apps(&["A"]));
        let mut c = Committer::new(Arc::clone(&desktop), Duration::from_secs(30));
        let started = Instant::now();
        c.commit(AppId::new("A"));
        c.cancel_pending();
        assert!(c.pending_app().is_none());
        let (_, outcome) = c.outcomes.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, RaiseOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(desktop.activations(), vec![AppId::new("A")]);
        assert!(desktop.raised().is_empty());
    }

    #[test]
    fn new_commit_cancels_previous_raise() {
        let desktop = Arc::new(FakeDesktop::with_apps(&["A", "B"]));
        let mut c = Committer::new(Arc::clone(&desktop), Duration::from_millis(200));
        c.commit(AppId::new("A"));
        c.commit(AppId::new("B"));
        assert_eq!(c.pending_app(), Some(&AppId::new("B")));
        assert!(matches!(c.wait(), Some(RaiseOutcome::Done(_))));
        assert_eq!(desktop.raised(), vec!["B-1"]);
    }

    #[test]
    fn slow_activation_keeps_commit_order() {
        let desktop = Arc::new(FakeDesktop::with_apps(&["A", "B"]));
        desktop.set_activation_delay("A", Duration::from_millis(100));
        let mut c = Committer::new(Arc::clone(&desktop), Duration::ZERO);
        c.commit(AppId::new("A"));
        c.commit(AppId::new("B"));
        c.wait();
        assert_eq!(desktop.activations(), vec![AppId::new("A"), AppId::new("B")]);
        assert_eq!(desktop.raised(), vec!["B-1"]);
    }

    #[test]
    fn drop_cancels_pending_raise() {
        let desktop = Arc::new(FakeDesktop::with_apps(&["A"]));
        {
            let mut c = Committer::new(Arc::clone(&desktop), Duration::from_millis(200));
            c.commit(AppId::new("A"));
        }
        std::thread::sleep(Duration::from_millis(400));
        assert!(desktop.raised().is_empty());
    }
}
