// Thin futex layer under WaitList. Process-private futexes only: every
// sleeper on a queue lives in this address space.

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(target_os = "linux")]
fn futex(word: &AtomicU32, op: libc::c_int, val: u32) -> libc::c_long {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word.as_ptr(),
            op | libc::FUTEX_PRIVATE_FLAG,
            val,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        )
    }
}

/// Sleep while `word` still holds `expected`.
///
/// Returns at once if the word has already moved on. Signals and spurious
/// wakeups also return, so callers re-check their own condition.
#[cfg(target_os = "linux")]
pub fn futex_wait(word: &AtomicU32, expected: u32) {
    if word.load(Ordering::SeqCst) != expected {
        return;
    }
    // EAGAIN (word changed) and EINTR both just mean "look again".
    futex(word, libc::FUTEX_WAIT, expected);
}

/// Wake every sleeper on `word`, returning how many were woken.
#[cfg(target_os = "linux")]
pub fn futex_wake_all(word: &AtomicU32) -> usize {
    let woken = futex(word, libc::FUTEX_WAKE, i32::MAX as u32);
    usize::try_from(woken).unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wait(word: &AtomicU32, expected: u32) {
    if word.load(Ordering::SeqCst) == expected {
        std::thread::yield_now();
    }
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wake_all(_word: &AtomicU32) -> usize {
    0
}
