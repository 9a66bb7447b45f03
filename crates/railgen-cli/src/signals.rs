//! Process hooks that hand interrupts and panics to the run coordinator.
//!
//! SIGINT and SIGTERM (via `ctrlc` with the `termination` feature) roll the
//! active run back and exit 0, printing what was left behind if the
//! rollback did not complete. A panic anywhere rolls back and exits 1
//! after the default panic output. Both hooks close over a clone of the
//! coordinator, which shares the run slot with the orchestrator.

use std::any::Any;
use std::panic::{self, PanicHookInfo};
use std::process;
use std::sync::{Mutex, PoisonError};

use console::Term;
use railgen_core::application::{Coordinator, Decision, SignalKind};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Held by the signal handler from the moment it takes the run until the
/// process exits.
static EXITING: Mutex<()> = Mutex::new(());

/// Install the signal handler and panic hook for `coordinator`.
///
/// Call at most once per process; `ctrlc` refuses a second handler.
pub fn install(coordinator: Coordinator) -> CliResult<()> {
    install_panic_hook(coordinator.clone());

    ctrlc::set_handler(move || {
        let _exiting = EXITING.lock().unwrap_or_else(PoisonError::into_inner);
        // A prompt may have hidden the cursor.
        let _ = Term::stderr().show_cursor();
        let (decision, rollback) = coordinator.interrupt_run(SignalKind::Interrupt);
        if let Some(e) = rollback {
            let err = CliError::Core(e.into());
            err.log();
            eprint!("{}", err.format_plain(false));
        }
        let code = match decision {
            Decision::Terminate(code) => code,
            Decision::Continue => 0,
        };
        process::exit(code);
    })
    .map_err(|e| CliError::IoError {
        message: "cannot install signal handler".into(),
        source: std::io::Error::other(e),
    })?;

    debug!("Signal handler and panic hook installed");
    Ok(())
}

/// Block while the signal handler is rolling back, so the main thread does
/// not exit underneath it. Returns at once when no handler is running.
pub fn wait_for_shutdown() {
    drop(EXITING.lock().unwrap_or_else(PoisonError::into_inner));
}

fn install_panic_hook(coordinator: Coordinator) {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
        let message = panic_message(info.payload());
        let decision = coordinator.try_handle_fault(&message);
        default_hook(info);
        if let Decision::Terminate(code) = decision {
            process::exit(code);
        }
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(42_u32);

        assert_eq!(panic_message(literal.as_ref()), "boom");
        assert_eq!(panic_message(owned.as_ref()), "bang");
        assert!(panic_message(other.as_ref()).contains("non-string"));
    }

    #[test]
    fn wait_for_shutdown_returns_when_no_handler_runs() {
        wait_for_shutdown();
    }
}
