//! Panic containment for contributor and renderer calls.
//!
//! [`contain`] turns a panic into an error string. The default panic hook
//! still prints every panic to stderr, contained or not; hosts that want
//! contained panics kept quiet call [`install_quiet_panic_hook`] once at
//! startup. Panics outside [`contain`] are passed to the previous hook.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::debug;

thread_local! {
    static CONTAINING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, returning the panic message if it unwinds.
pub fn contain<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    let outer = CONTAINING.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINING.with(|flag| flag.set(outer));
    result.map_err(|payload| panic_message(payload.as_ref()))
}

/// Whether the current thread is inside [`contain`].
pub fn is_containing() -> bool {
    CONTAINING.with(Cell::get)
}

/// Wrap the current panic hook so panics inside [`contain`] are logged at
/// debug level instead of printed. Later calls are no-ops.
pub fn install_quiet_panic_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if is_containing() {
                let location = info
                    .location()
                    .map(|l| format!("{}:{}", l.file(), l.line()))
                    .unwrap_or_default();
                debug!(%location, "contained panic");
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
