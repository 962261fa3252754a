//! Agent process supervision.
//!
//! One watcher thread per agent process, polling for exit. The first
//! abnormal exit (nonzero status or a failed wait) marks that player
//! failed, cancels the orchestrator, and brings every other watched
//! process down. Exit outcomes are reported back so the caller can assign
//! the final `RUNTIME_ERROR` status.

use std::process::Child;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FaultKind;
use crate::orchestrator::CancelHandle;

/// How one watched process ended.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOutcome {
    /// Whether this process was the one that failed. A process terminated
    /// because its peer failed is not itself marked failed.
    pub failed: bool,
    /// Exit code, when the OS reported one.
    pub exit_code: Option<i32>,
}

/// Watches a set of agent processes until all of them have exited.
#[derive(Debug, Clone, Copy)]
pub struct ProcessMonitor {
    poll_interval: Duration,
}

impl Default for ProcessMonitor {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl ProcessMonitor {
    /// Create a monitor polling at the given interval.
    #[must_use]
    pub const fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Watch all children until they exit, one watcher thread each.
    ///
    /// Blocks until every process is gone. On the first abnormal exit the
    /// detecting watcher cancels the orchestrator immediately; the other
    /// watchers observe the shared flag and kill their own process.
    #[must_use]
    pub fn watch(self, children: Vec<Child>, handle: &CancelHandle) -> Vec<ProcessOutcome> {
        let any_failed = Arc::new(AtomicBool::new(false));

        let watchers: Vec<thread::JoinHandle<ProcessOutcome>> = children
            .into_iter()
            .enumerate()
            .map(|(idx, child)| {
                let any_failed = Arc::clone(&any_failed);
                let handle = handle.clone();
                let poll_interval = self.poll_interval;
                thread::spawn(move || watch_one(idx, child, &any_failed, &handle, poll_interval))
            })
            .collect();

        watchers
            .into_iter()
            .map(|watcher| {
                watcher.join().unwrap_or_else(|_| ProcessOutcome {
                    failed: true,
                    exit_code: None,
                })
            })
            .collect()
    }
}

/// Watch a single child until it exits or a peer fails.
fn watch_one(
    idx: usize,
    mut child: Child,
    any_failed: &AtomicBool,
    handle: &CancelHandle,
    poll_interval: Duration,
) -> ProcessOutcome {
    loop {
        if any_failed.load(Ordering::Acquire) {
            let _ = child.kill();
            let _ = child.wait();
            debug!(agent = idx, "terminated after peer failure");
            return ProcessOutcome {
                failed: false,
                exit_code: None,
            };
        }

        thread::sleep(poll_interval);
        match child.try_wait() {
            Ok(Some(status)) => {
                let failed = !status.success();
                if failed {
                    warn!(
                        agent = idx,
                        code = status.code(),
                        fault = %FaultKind::ProcessFailure,
                        "agent exited abnormally"
                    );
                    any_failed.store(true, Ordering::Release);
                    handle.cancel();
                } else {
                    debug!(agent = idx, "agent exited cleanly");
                }
                return ProcessOutcome {
                    failed,
                    exit_code: status.code(),
                };
            }
            Ok(None) => {}
            Err(error) => {
                warn!(agent = idx, %error, "wait on agent failed");
                any_failed.store(true, Ordering::Release);
                handle.cancel();
                let _ = child.kill();
                let _ = child.wait();
                return ProcessOutcome {
                    failed: true,
                    exit_code: None,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::CancelToken;
    use std::process::{Command, Stdio};

    fn spawn(program: &str, args: &[&str]) -> Child {
        Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn test process")
    }

    #[test]
    fn test_clean_exits_do_not_cancel() {
        let token = CancelToken::new();
        let handle = CancelHandle::new(token.clone());

        let children = vec![spawn("true", &[]), spawn("true", &[])];
        let outcomes = ProcessMonitor::new(Duration::from_millis(10)).watch(children, &handle);

        assert!(outcomes.iter().all(|o| !o.failed));
        assert!(!token.is_set());
    }

    #[test]
    fn test_abnormal_exit_cancels_and_kills_peer() {
        let token = CancelToken::new();
        let handle = CancelHandle::new(token.clone());

        // One agent fails immediately; the other would sleep for a minute.
        let children = vec![spawn("false", &[]), spawn("sleep", &["60"])];
        let outcomes = ProcessMonitor::new(Duration::from_millis(10)).watch(children, &handle);

        assert!(outcomes[0].failed);
        assert_eq!(outcomes[0].exit_code, Some(1));
        assert!(!outcomes[1].failed, "the killed peer is not the offender");
        assert!(token.is_set(), "failure must cancel the orchestrator");
    }
}
