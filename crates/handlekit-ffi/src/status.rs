use handlekit_core::HandleKitError;
use std::cell::Cell;
use std::ffi::{c_char, CStr};
use tracing::warn;

/// Outcome of a boundary call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HkStatus {
    Ok = 0,
    /// The queue had nothing to pop
    Empty = 1,
    /// The map has no entry for the key
    Absent = 2,
    InvalidHandle = 3,
    WrongKind = 4,
    NullPointer = 5,
    Exhausted = 6,
    Config = 7,
}

impl HkStatus {
    /// Status with the given discriminant, if there is one.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => HkStatus::Ok,
            1 => HkStatus::Empty,
            2 => HkStatus::Absent,
            3 => HkStatus::InvalidHandle,
            4 => HkStatus::WrongKind,
            5 => HkStatus::NullPointer,
            6 => HkStatus::Exhausted,
            7 => HkStatus::Config,
            _ => return None,
        })
    }

    pub fn message(self) -> &'static CStr {
        match self {
            HkStatus::Ok => c"ok",
            HkStatus::Empty => c"queue is empty",
            HkStatus::Absent => c"key is absent",
            HkStatus::InvalidHandle => c"handle was never issued",
            HkStatus::WrongKind => c"handle refers to a structure of the other kind",
            HkStatus::NullPointer => c"null output pointer",
            HkStatus::Exhausted => c"handle space exhausted",
            HkStatus::Config => c"invalid configuration",
        }
    }
}

impl From<&HandleKitError> for HkStatus {
    fn from(err: &HandleKitError) -> Self {
        match err {
            HandleKitError::InvalidHandle(_) => HkStatus::InvalidHandle,
            HandleKitError::WrongKind { .. } => HkStatus::WrongKind,
            HandleKitError::HandlesExhausted => HkStatus::Exhausted,
            HandleKitError::Config(_) => HkStatus::Config,
        }
    }
}

thread_local! {
    static LAST_STATUS: Cell<HkStatus> = const { Cell::new(HkStatus::Ok) };
}

pub(crate) fn set_last_status(status: HkStatus) {
    LAST_STATUS.with(|s| s.set(status));
}

/// Log a failed boundary call and convert it to a status.
pub(crate) fn report(op: &'static str, err: &HandleKitError) -> HkStatus {
    warn!(op, "{}", err);
    HkStatus::from(err)
}

/// Status of the most recent compact-surface call made by the calling thread.
#[no_mangle]
pub extern "C" fn handlekit_last_status() -> HkStatus {
    LAST_STATUS.with(|s| s.get())
}

/// Static, NUL-terminated description of `status`. Values outside `HkStatus` get
/// "unknown status". Never free the returned pointer.
#[no_mangle]
pub extern "C" fn handlekit_status_message(status: u32) -> *const c_char {
    HkStatus::from_raw(status)
        .map_or(c"unknown status", HkStatus::message)
        .as_ptr()
}
