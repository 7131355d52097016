use crate::status::{report, set_last_status, HkStatus};
use crate::HandleT;
use handlekit_core::Handle;
use handlekit_registry::global;

/// Create an empty map. Returns handle 0 if no handle could be issued.
#[no_mangle]
pub extern "C" fn dashmap_new() -> HandleT {
    match global().create_map() {
        Ok(handle) => {
            set_last_status(HkStatus::Ok);
            handle.as_raw()
        }
        Err(e) => {
            set_last_status(report("dashmap_new", &e));
            Handle::INVALID.as_raw()
        }
    }
}

/// Value stored under `key`, or 0 when the key is absent or the handle is unusable.
/// `handlekit_last_status` tells the cases apart.
#[no_mangle]
pub extern "C" fn dashmap_get(handle: HandleT, key: u64) -> u64 {
    match global().map(Handle::from_raw(handle)) {
        Ok(map) => match map.get(key) {
            Some(value) => {
                set_last_status(HkStatus::Ok);
                value
            }
            None => {
                set_last_status(HkStatus::Absent);
                0
            }
        },
        Err(e) => {
            set_last_status(report("dashmap_get", &e));
            0
        }
    }
}

/// Store `val` under `key`, overwriting any previous value. Returns the value just
/// written, or 0 when the handle is unusable.
#[no_mangle]
pub extern "C" fn dashmap_insert(handle: HandleT, key: u64, val: u64) -> u64 {
    match global().map(Handle::from_raw(handle)) {
        Ok(map) => {
            set_last_status(HkStatus::Ok);
            map.insert(key, val)
        }
        Err(e) => {
            set_last_status(report("dashmap_insert", &e));
            0
        }
    }
}

/// Look up `key`, writing the value to `out` on success.
///
/// Returns `Ok`, `Absent` (leaves `out` untouched), or an error status.
///
/// # Safety
/// `out` must be null or valid for a `u64` write.
#[no_mangle]
pub unsafe extern "C" fn handlekit_map_try_get(handle: HandleT, key: u64, out: *mut u64) -> HkStatus {
    if out.is_null() {
        return HkStatus::NullPointer;
    }
    let map = match global().map(Handle::from_raw(handle)) {
        Ok(map) => map,
        Err(e) => return report("handlekit_map_try_get", &e),
    };
    match map.get(key) {
        Some(value) => {
            // SAFETY: non-null checked above; validity is the caller's contract.
            unsafe { out.write(value) };
            HkStatus::Ok
        }
        None => HkStatus::Absent,
    }
}

/// Store `value` under `key`.
#[no_mangle]
pub extern "C" fn handlekit_map_try_insert(handle: HandleT, key: u64, value: u64) -> HkStatus {
    match global().map(Handle::from_raw(handle)) {
        Ok(map) => {
            map.insert(key, value);
            HkStatus::Ok
        }
        Err(e) => report("handlekit_map_try_insert", &e),
    }
}
