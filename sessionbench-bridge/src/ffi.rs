//! C ABI
//!
//! Lets code outside Rust log samples into a shared session. All entry points
//! go through [`SessionRegistry::global`]. Errors are returned as negative
//! status codes and logged; panics are caught at the boundary.
//!
//! See `include/sessionbench.h` for the C declarations.

use crate::error::{BENCH_OK, BridgeError};
use crate::registry::{BridgeHandle, SessionRegistry};
use std::ffi::{CStr, c_char};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;

/// Opaque session handle owned by the caller between open and close
#[derive(Debug)]
pub struct BridgeSession {
    handle: BridgeHandle,
}

/// Open (or attach to) the session called `name`.
///
/// A null `name` opens a new timestamp-named session. Returns null on failure.
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string valid for the
/// duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bench_open_session_c(name: *const c_char) -> *mut BridgeSession {
    // SAFETY: forwarded from this function's contract.
    let name = match unsafe { optional_str(name, "name") } {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(error = %e, "bench_open_session_c");
            return ptr::null_mut();
        }
    };

    let opened = catch_unwind(|| SessionRegistry::global().open(name));
    match opened {
        Ok(Ok(handle)) => Box::into_raw(Box::new(BridgeSession { handle })),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "bench_open_session_c: failed to open session");
            ptr::null_mut()
        }
        Err(_) => {
            tracing::warn!("bench_open_session_c: panicked");
            ptr::null_mut()
        }
    }
}

/// Log `count` samples (nanoseconds) for one case into `session`.
///
/// Returns 0 on success or a negative `BENCH_ERR_*` code. Empty input and
/// non-finite or negative durations are rejected with
/// `BENCH_ERR_INVALID_ARGUMENT`.
///
/// # Safety
///
/// `session` must be null or a pointer returned by [`bench_open_session_c`]
/// that has not been closed. `key`, `name` and `language` must be null or
/// NUL-terminated strings. `samples` must be null or point to `count`
/// readable `f64` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bench_log_samples_c(
    session: *mut BridgeSession,
    key: *const c_char,
    name: *const c_char,
    language: *const c_char,
    samples: *const f64,
    count: usize,
) -> i32 {
    // SAFETY: forwarded from this function's contract.
    let logged = unsafe { log_samples(session, key, name, language, samples, count) };
    match logged {
        Ok(()) => BENCH_OK,
        Err(e) => {
            tracing::warn!(error = %e, "bench_log_samples_c");
            e.code()
        }
    }
}

/// Release a session handle. Null is ignored.
///
/// # Safety
///
/// `session` must be null or a pointer returned by [`bench_open_session_c`];
/// it must not be used again afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bench_close_session_c(session: *mut BridgeSession) {
    if session.is_null() {
        return;
    }
    // SAFETY: the pointer came from Box::into_raw in bench_open_session_c and
    // ownership is returned exactly once.
    let session = unsafe { Box::from_raw(session) };
    session.handle.close();
}

unsafe fn log_samples(
    session: *mut BridgeSession,
    key: *const c_char,
    name: *const c_char,
    language: *const c_char,
    samples: *const f64,
    count: usize,
) -> Result<(), BridgeError> {
    if session.is_null() {
        return Err(BridgeError::NullPointer("session"));
    }
    // SAFETY: non-null and, per the caller's contract, a live BridgeSession.
    let session = unsafe { &*session };
    // SAFETY: forwarded from the caller's contract.
    let (key, name, language) = unsafe {
        (
            required_str(key, "key")?,
            required_str(name, "name")?,
            required_str(language, "language")?,
        )
    };

    let samples: &[f64] = if count == 0 {
        &[]
    } else if samples.is_null() {
        return Err(BridgeError::NullPointer("samples"));
    } else {
        // SAFETY: non-null and, per the caller's contract, `count` values long.
        unsafe { std::slice::from_raw_parts(samples, count) }
    };

    let logged = catch_unwind(AssertUnwindSafe(|| {
        session.handle.log_samples(key, name, language, samples)
    }));
    match logged {
        Ok(result) => result.map(|_| ()),
        Err(_) => Err(BridgeError::Panicked(key.to_string())),
    }
}

unsafe fn required_str<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, BridgeError> {
    // SAFETY: forwarded from the caller's contract.
    unsafe { optional_str(ptr, what) }?.ok_or(BridgeError::NullPointer(what))
}

unsafe fn optional_str<'a>(
    ptr: *const c_char,
    what: &'static str,
) -> Result<Option<&'a str>, BridgeError> {
    if ptr.is_null() {
        return Ok(None);
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str()
        .map(Some)
        .map_err(|e| BridgeError::InvalidArgument {
            name: what,
            reason: e.to_string(),
        })
}
