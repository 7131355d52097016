use crate::status::{report, set_last_status, HkStatus};
use crate::HandleT;
use handlekit_core::Handle;
use handlekit_registry::global;

/// Create an empty queue. Returns handle 0 if no handle could be issued.
#[no_mangle]
pub extern "C" fn segqueue_new() -> HandleT {
    match global().create_queue() {
        Ok(handle) => {
            set_last_status(HkStatus::Ok);
            handle.as_raw()
        }
        Err(e) => {
            set_last_status(report("segqueue_new", &e));
            Handle::INVALID.as_raw()
        }
    }
}

/// Append `val`. A push through an unusable handle is dropped.
#[no_mangle]
pub extern "C" fn segqueue_push(handle: HandleT, val: u64) {
    let status = match global().queue(Handle::from_raw(handle)) {
        Ok(queue) => {
            queue.push(val);
            HkStatus::Ok
        }
        Err(e) => report("segqueue_push", &e),
    };
    set_last_status(status);
}

/// Remove the head value, or return 0 when the queue is empty or the handle is
/// unusable. `handlekit_last_status` tells the cases apart.
#[no_mangle]
pub extern "C" fn segqueue_pop(handle: HandleT) -> u64 {
    match global().queue(Handle::from_raw(handle)) {
        Ok(queue) => match queue.pop() {
            Some(value) => {
                set_last_status(HkStatus::Ok);
                value
            }
            None => {
                set_last_status(HkStatus::Empty);
                0
            }
        },
        Err(e) => {
            set_last_status(report("segqueue_pop", &e));
            0
        }
    }
}

#[no_mangle]
pub extern "C" fn handlekit_queue_try_push(handle: HandleT, value: u64) -> HkStatus {
    match global().queue(Handle::from_raw(handle)) {
        Ok(queue) => {
            queue.push(value);
            HkStatus::Ok
        }
        Err(e) => report("handlekit_queue_try_push", &e),
    }
}

/// Pop the head value into `out`.
///
/// Returns `Ok`, `Empty` (leaves `out` untouched), or an error status.
///
/// # Safety
/// `out` must be null or valid for a `u64` write.
#[no_mangle]
pub unsafe extern "C" fn handlekit_queue_try_pop(handle: HandleT, out: *mut u64) -> HkStatus {
    if out.is_null() {
        return HkStatus::NullPointer;
    }
    let queue = match global().queue(Handle::from_raw(handle)) {
        Ok(queue) => queue,
        Err(e) => return report("handlekit_queue_try_pop", &e),
    };
    match queue.pop() {
        Some(value) => {
            // SAFETY: non-null checked above; validity is the caller's contract.
            unsafe { out.write(value) };
            HkStatus::Ok
        }
        None => HkStatus::Empty,
    }
}
