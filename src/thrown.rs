use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

thread_local! {
    /// Set while a test function runs under [`catch`] on this thread.
    static CATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Run `f`, turning both an `Err` and a panic into the thrown message.
pub(crate) fn catch<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, String> {
    let outer = CATCHING.replace(true);
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CATCHING.set(outer);

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{:#}", err)),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

/// Install a panic hook that only logs panics raised inside a test function,
/// since those are reported as failed results. Any other panic runs
/// `before_report` (e.g. restoring the terminal) and then the previous hook.
pub fn install_panic_hook(before_report: impl Fn() + Send + Sync + 'static) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if CATCHING.get() {
            debug!("test function panicked: {}", info);
            return;
        }
        before_report();
        previous(info);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn error_chain_is_kept() {
        let result: Result<(), String> = catch(|| {
            Err(anyhow::anyhow!("inner").context("outer"))
        });
        assert_eq!(result, Err("outer: inner".to_string()));
    }

    #[test]
    fn panics_become_messages() {
        let result: Result<(), String> = catch(|| panic!("boom {}", 42));
        assert_eq!(result, Err("boom 42".to_string()));
    }

    #[test]
    fn catching_flag_is_scoped_to_the_call() {
        assert!(!CATCHING.get());
        let inner = catch(|| {
            let nested: Result<(), String> = catch(|| panic!("nested"));
            assert!(nested.is_err());
            Ok(CATCHING.get())
        });
        assert_eq!(inner, Ok(true));
        assert!(!CATCHING.get());
    }

    #[test]
    fn hook_reports_only_panics_outside_test_functions() {
        static REPORTED: AtomicUsize = AtomicUsize::new(0);
        const WATCHED: &str = "panic-hook-watched";
        install_panic_hook(|| {
            if std::thread::current().name() == Some(WATCHED) {
                REPORTED.fetch_add(1, Ordering::SeqCst);
            }
        });

        let watched = || std::thread::Builder::new().name(WATCHED.to_string());

        let caught = watched()
            .spawn(|| catch::<()>(|| panic!("inside")))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(caught, Err("inside".to_string()));
        assert_eq!(REPORTED.load(Ordering::SeqCst), 0);

        let uncaught = watched().spawn(|| panic!("outside")).unwrap().join();
        assert!(uncaught.is_err());
        assert_eq!(REPORTED.load(Ordering::SeqCst), 1);
    }
}
