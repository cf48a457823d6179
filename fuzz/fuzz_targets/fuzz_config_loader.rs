#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors are fine; panics are not. A config that validates must
    // also build a dispatch table and valid decoder timing.
    let Ok(cfg) = dial_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        let timing = dial_core::DialTiming::from(&cfg.timing);
        assert!(timing.validate().is_ok(), "validated config rejected by decoder: {timing:?}");
        let _ = dial_core::Dispatcher::<dial_core::RouteAction>::try_from(cfg.routes.as_slice());
    }
});
