//! Lazy, memoized capture of a value or delegate outcome.
//!
//! A [`Subject`] wraps a value, a zero-argument closure, or a conversion of
//! another subject. Resolving it invokes the source exactly once, records
//! wall-clock start/end times, and stores either the produced value or the
//! caught panic. Resolving again returns the cached result without
//! re-invoking anything. [`AsyncSubject`] is the same contract for futures
//! and async closures; awaiting the user's future is the only suspension
//! point in the whole library.
//!
//! This layer never panics and never returns errors: invocation failures
//! become captured state for conditions to inspect.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// How a [`Caught`] failure came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaughtKind {
    /// The delegate panicked; the message is the panic payload.
    Panic,
    /// A derived conversion rejected the upstream outcome, e.g. a delegate
    /// expected to fail returned a value instead.
    Error,
}

/// A failure caught while (or after) evaluating a subject.
#[derive(Debug, Clone)]
pub struct Caught {
    kind: CaughtKind,
    message: String,
}

impl Caught {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self {
            kind: CaughtKind::Panic,
            message,
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            kind: CaughtKind::Error,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> CaughtKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Caught {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CaughtKind::Panic => write!(f, "it panicked with {:?}", self.message),
            CaughtKind::Error => f.write_str(&self.message),
        }
    }
}

/// The memoized outcome of evaluating a subject: a value or a caught
/// failure, never both, plus the evaluation window.
#[derive(Debug, Clone)]
pub struct CapturedResult<T> {
    outcome: Result<T, Caught>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl<T> CapturedResult<T> {
    pub(crate) fn new(
        outcome: Result<T, Caught>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            outcome,
            started_at,
            finished_at,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&Caught> {
        self.outcome.as_ref().err()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn into_value(self) -> Option<T> {
        self.outcome.ok()
    }

    pub(crate) fn into_outcome(self) -> Result<T, Caught> {
        self.outcome
    }
}

enum Source<T> {
    Value(T),
    Thunk(Box<dyn FnOnce() -> T>),
    Derived(Box<dyn FnOnce() -> CapturedResult<T>>),
}

impl<T> Source<T> {
    fn evaluate(self) -> CapturedResult<T> {
        match self {
            Source::Value(value) => {
                let now = Utc::now();
                CapturedResult::new(Ok(value), now, now)
            }
            Source::Thunk(thunk) => {
                let started = Utc::now();
                let outcome = panic::catch_unwind(AssertUnwindSafe(thunk)).map_err(Caught::from_panic);
                CapturedResult::new(outcome, started, Utc::now())
            }
            Source::Derived(derive) => derive(),
        }
    }
}

/// A lazily evaluated assertion subject.
pub struct Subject<T> {
    source: Option<Source<T>>,
    captured: Option<CapturedResult<T>>,
}

impl<T> Subject<T> {
    /// Wrap an immediate value. Resolution is trivially successful.
    pub fn of(value: T) -> Self {
        Self {
            source: Some(Source::Value(value)),
            captured: None,
        }
    }

    /// Wrap a zero-argument closure, invoked at most once on first resolve.
    pub fn from_fn(thunk: impl FnOnce() -> T + 'static) -> Self {
        Self {
            source: Some(Source::Thunk(Box::new(thunk))),
            captured: None,
        }
    }

    /// Wrap an already captured result, e.g. one produced by an
    /// [`AsyncSubject`].
    pub fn from_captured(captured: CapturedResult<T>) -> Self {
        Self {
            source: None,
            captured: Some(captured),
        }
    }

    /// Build a subject whose outcome is a conversion of this subject's
    /// outcome. The upstream still evaluates exactly once; the conversion
    /// runs lazily and its combined outcome is cached downstream.
    pub fn derive<U>(
        self,
        convert: impl FnOnce(Result<T, Caught>) -> Result<U, Caught> + 'static,
    ) -> Subject<U>
    where
        T: 'static,
    {
        Subject {
            source: Some(Source::Derived(Box::new(move || {
                let mut upstream = self;
                upstream.resolve();
                let captured = upstream.take_captured();
                let started = captured.started_at();
                let outcome = convert(captured.into_outcome());
                CapturedResult::new(outcome, started, Utc::now())
            }))),
            captured: None,
        }
    }

    /// Evaluate the source if this subject has not been resolved yet;
    /// otherwise return the cached result.
    pub fn resolve(&mut self) -> &CapturedResult<T> {
        if self.captured.is_none() {
            let source = match self.source.take() {
                Some(source) => source,
                None => unreachable!("subject has neither a source nor a captured result"),
            };
            self.captured = Some(source.evaluate());
        }
        match &self.captured {
            Some(captured) => captured,
            None => unreachable!(),
        }
    }

    pub(crate) fn resolve_owned(mut self) -> CapturedResult<T> {
        self.resolve();
        self.take_captured()
    }

    fn take_captured(&mut self) -> CapturedResult<T> {
        match self.captured.take() {
            Some(captured) => captured,
            None => unreachable!("subject read before it was resolved"),
        }
    }
}

enum AsyncSource<T> {
    Future(BoxFuture<'static, T>),
    Thunk(Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>),
}

/// A lazily evaluated asynchronous subject. Resolution awaits the wrapped
/// future exactly once and caches the captured outcome.
pub struct AsyncSubject<T> {
    source: Option<AsyncSource<T>>,
    captured: Option<CapturedResult<T>>,
}

impl<T: Send + 'static> AsyncSubject<T> {
    /// Wrap an already-running future.
    pub fn from_future(future: impl Future<Output = T> + Send + 'static) -> Self {
        Self {
            source: Some(AsyncSource::Future(future.boxed())),
            captured: None,
        }
    }

    /// Wrap an async closure. The closure is invoked (and its future
    /// awaited) at most once.
    pub fn from_fn<F, Fut>(thunk: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            source: Some(AsyncSource::Thunk(Box::new(move || thunk().boxed()))),
            captured: None,
        }
    }

    /// Await the source if this subject has not been resolved yet;
    /// otherwise return the cached result.
    pub async fn resolve(&mut self) -> &CapturedResult<T> {
        if self.captured.is_none() {
            let source = match self.source.take() {
                Some(source) => source,
                None => unreachable!("async subject has neither a source nor a captured result"),
            };
            self.captured = Some(Self::evaluate(source).await);
        }
        match &self.captured {
            Some(captured) => captured,
            None => unreachable!(),
        }
    }

    pub(crate) async fn resolve_owned(mut self) -> CapturedResult<T> {
        self.resolve().await;
        match self.captured.take() {
            Some(captured) => captured,
            None => unreachable!(),
        }
    }

    async fn evaluate(source: AsyncSource<T>) -> CapturedResult<T> {
        let started = Utc::now();
        let outcome = match source {
            AsyncSource::Future(future) => AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .map_err(Caught::from_panic),
            AsyncSource::Thunk(thunk) => {
                // The closure itself may panic before producing a future.
                match panic::catch_unwind(AssertUnwindSafe(thunk)) {
                    Ok(future) => AssertUnwindSafe(future)
                        .catch_unwind()
                        .await
                        .map_err(Caught::from_panic),
                    Err(payload) => Err(Caught::from_panic(payload)),
                }
            }
        };
        CapturedResult::new(outcome, started, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_value_subject_resolves() {
        let mut subject = Subject::of(42);
        assert_eq!(subject.resolve().value(), Some(&42));
    }

    #[test]
    fn test_thunk_invoked_exactly_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut subject = Subject::from_fn(move || {
            counter.set(counter.get() + 1);
            7
        });

        assert_eq!(subject.resolve().value(), Some(&7));
        assert_eq!(subject.resolve().value(), Some(&7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_panic_is_captured_not_propagated() {
        let mut subject: Subject<i32> = Subject::from_fn(|| panic!("boom"));
        let captured = subject.resolve();
        assert!(captured.value().is_none());
        let caught = captured.error().expect("panic should be captured");
        assert_eq!(caught.kind(), CaughtKind::Panic);
        assert_eq!(caught.message(), "boom");
    }

    #[test]
    fn test_derived_subject_evaluates_upstream_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let upstream = Subject::from_fn(move || {
            counter.set(counter.get() + 1);
            10
        });

        let mut derived = upstream.derive(|outcome| outcome.map(|v| v * 2));
        assert_eq!(derived.resolve().value(), Some(&20));
        assert_eq!(derived.resolve().value(), Some(&20));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_derived_subject_can_unwrap_failures() {
        let upstream: Subject<i32> = Subject::from_fn(|| panic!("kaboom"));
        let mut derived = upstream.derive(|outcome| match outcome {
            Err(caught) => Ok(caught.message().to_string()),
            Ok(_) => Err(Caught::error("expected a panic")),
        });
        assert_eq!(derived.resolve().value(), Some(&"kaboom".to_string()));
    }

    #[test]
    fn test_evaluation_window_is_recorded() {
        let mut subject = Subject::from_fn(|| 1);
        let captured = subject.resolve();
        assert!(captured.started_at() <= captured.finished_at());
    }

    #[tokio::test]
    async fn test_async_thunk_invoked_exactly_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut subject = AsyncSubject::from_fn(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            5
        });

        assert_eq!(subject.resolve().await.value(), Some(&5));
        assert_eq!(subject.resolve().await.value(), Some(&5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_panic_is_captured() {
        let mut subject: AsyncSubject<i32> =
            AsyncSubject::from_fn(|| async { panic!("async boom") });
        let captured = subject.resolve().await;
        let caught = captured.error().expect("panic should be captured");
        assert_eq!(caught.message(), "async boom");
    }
}
