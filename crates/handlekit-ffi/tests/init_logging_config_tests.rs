//! Kept in its own test binary: it sets a process environment variable, which must not
//! race the other boundary tests.

use handlekit::*;

#[test]
fn invalid_logging_config_reports_config_status() {
    std::env::set_var("HANDLEKIT_LOG_FORMAT", "xml");
    assert_eq!(handlekit_init_logging(), HkStatus::Config);
    let message =
        unsafe { std::ffi::CStr::from_ptr(handlekit_status_message(HkStatus::Config as u32)) };
    assert_eq!(message.to_str().unwrap(), "invalid configuration");
}
