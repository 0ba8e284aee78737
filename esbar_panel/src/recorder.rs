//! Event recorder: turns client notifications into log entries

use crate::authority::authority_of;
use crate::log::{LogEntry, QueryLog, Totals};
use esbar_common::{ClientError, ClientListener, Request, Response};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

static NEXT_RECORDER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Recorders paused on this thread, innermost last
    static PAUSED: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Log and totals for one debugging session
///
/// Registered on a client as a [`ClientListener`]; it is the only writer of
/// its log.
pub struct Recorder {
    state: RwLock<RecorderState>,
    default_authority: String,
    id: u64,
}

#[derive(Default)]
struct RecorderState {
    log: QueryLog,
    totals: Totals,
}

impl Recorder {
    pub fn new(default_authority: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(RecorderState::default()),
            default_authority: default_authority.into(),
            id: NEXT_RECORDER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Group an entry under its authority and add it to the totals
    pub fn record(&self, entry: LogEntry) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let authority = authority_of(entry.response.as_ref(), &state.log, &self.default_authority);
        tracing::debug!(
            "Recorded {} {} on {} in {:.3} ms",
            entry.request.method,
            entry.request.path,
            authority,
            entry.elapsed_ms()
        );

        state.totals.add(entry.elapsed);
        state.log.push(authority, entry);
    }

    /// Copy of the log and totals for one rendering pass
    pub fn snapshot(&self) -> (QueryLog, Totals) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (state.log.clone(), state.totals)
    }

    pub fn totals(&self) -> Totals {
        self.state.read().unwrap_or_else(PoisonError::into_inner).totals
    }

    /// Whether notifications delivered on the current thread are ignored
    pub fn is_paused(&self) -> bool {
        PAUSED.with(|paused| paused.borrow().contains(&self.id))
    }

    /// Ignore notifications delivered on the current thread until the guard
    /// is dropped
    ///
    /// Clients notify listeners on the calling thread, so calls made by the
    /// holder of the guard are skipped while calls completing on other
    /// threads are still recorded.
    pub fn pause(&self) -> PauseGuard<'_> {
        PAUSED.with(|paused| paused.borrow_mut().push(self.id));
        PauseGuard {
            recorder: self,
            _not_send: PhantomData,
        }
    }
}

/// Lifts one level of pause on drop; bound to the thread that paused
pub struct PauseGuard<'a> {
    recorder: &'a Recorder,
    _not_send: PhantomData<*const ()>,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        let id = self.recorder.id;
        PAUSED.with(|paused| {
            let mut paused = paused.borrow_mut();
            if let Some(pos) = paused.iter().rposition(|p| *p == id) {
                paused.remove(pos);
            }
        });
    }
}

impl ClientListener for Recorder {
    fn on_success(&self, request: &Request, response: &Response, elapsed: Duration) {
        if self.is_paused() {
            tracing::trace!("Ignoring {} {} while paused", request.method, request.path);
            return;
        }
        self.record(LogEntry::success(request.clone(), response.clone(), elapsed));
    }

    fn on_failure(&self, request: &Request, error: &ClientError, elapsed: Duration) {
        if self.is_paused() {
            tracing::trace!("Ignoring failed {} {} while paused", request.method, request.path);
            return;
        }
        self.record(LogEntry::failure(request.clone(), error.clone(), elapsed));
    }
}
