//! Integration tests for the process-wide priority registry.
//!
//! The registry is a process singleton, so the whole scenario lives in a single
//! test to keep it independent of test ordering.

use initall::{InitAllOnce, InitError, Initializer, RunState};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0} failed")]
struct Crop(&'static str);

static WINE_CALLS: AtomicUsize = AtomicUsize::new(0);

struct Olives {
    color: &'static str,
}

impl Initializer for Olives {
    fn initialize_once(&self) -> Result<(), InitError> {
        assert_eq!(self.color, "black");
        Err(Crop("olives").into())
    }
}

struct Figs;

impl Initializer for Figs {
    fn initialize_once(&self) -> Result<(), InitError> {
        Err(Crop("figs").into())
    }
}

struct Wine;

impl Initializer for Wine {
    fn initialize_once(&self) -> Result<(), InitError> {
        WINE_CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "wine".into()
    }
}

#[test]
fn test_run_all_once_in_priority_order() {
    assert_eq!(initall::registry().state(), RunState::Empty);

    initall::registry().register(Olives { color: "black" }, 10);
    initall::registry().register(Figs, 5);
    initall::registry().register(Wine, 20);
    assert_eq!(initall::registry().state(), RunState::Pending);
    assert!(initall::registry().errors().is_empty());

    let errors = initall::registry().run_all_once();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].is(&Crop("olives")));
    assert!(errors[1].is(&Crop("figs")));

    assert!(initall::registry().has_error(&Crop("olives")).is_some());
    assert!(initall::registry().has_error(&Crop("figs")).is_some());
    assert!(initall::registry().has_error(&Crop("wine")).is_none());

    let outcomes = initall::registry().outcomes();
    let order: Vec<_> = outcomes.iter().map(|o| o.priority.get()).collect();
    assert_eq!(order, [20, 10, 5]);
    assert_eq!(outcomes[0].name, "wine");

    // Repeat triggers return the same failures without re-running.
    let again = initall::registry().run_all_once();
    assert_eq!(again.len(), 2);
    assert!(again[0].ptr_eq(&errors[0]));
    assert!(again[1].ptr_eq(&errors[1]));
    assert_eq!(WINE_CALLS.load(Ordering::SeqCst), 1);

    // Late registrations are accepted but never run.
    assert!(!initall::registry().register(Wine, 100));
    assert_eq!(initall::registry().run_all_once().len(), 2);
    assert_eq!(WINE_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(initall::registry().state(), RunState::Done);
    assert!(initall::registry().ensure_ok().is_err());
}
