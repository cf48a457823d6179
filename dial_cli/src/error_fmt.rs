//! Human-readable error descriptions and structured JSON error formatting.

use dial_core::error::{BuildError, DialError};
use dial_hardware::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(de) = err.downcast_ref::<DialError>() {
        return match de {
            DialError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: A value in the TOML is out of range or a [[routes]] entry is malformed.\nHow to fix: Edit the config file (see etc/dial_config.toml for a sample), then rerun."
            ),
            DialError::InvalidNumber(s) => format!(
                "What happened: {s:?} is not a dialable number.\nLikely causes: Letters or symbols other than '-' and spaces, or no digits at all.\nHow to fix: Pass digits only, e.g. `dial simulate --number 867-5309`."
            ),
            DialError::Input(msg) => format!(
                "What happened: The pulse input could not be started ({msg}).\nLikely causes: Wrong [input] pin, no GPIO access, or another process holding the line.\nHow to fix: Check the pin number and wiring; run with access to /dev/gpiomem."
            ),
            DialError::Disconnected => "What happened: The decoder worker stopped unexpectedly.\nLikely causes: A panic in the decoder thread.\nHow to fix: Re-run with --log-level=debug and report the log.".to_string(),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidTiming(what) => format!(
                "What happened: Decoder timing rejected ({what}).\nLikely causes: [timing] values that overlap the make/break windows or the two timeouts.\nHow to fix: Keep tolerance below both phases and inter_digit_ms between the break window and max_inter_digit_ms."
            ),
            BuildError::ZeroQueueDepth | BuildError::Spawn(_) => format!(
                "What happened: The decoder service failed to start ({be}).\nLikely causes: Resource exhaustion.\nHow to fix: Re-run with --log-level=debug for details."
            ),
        };
    }

    if let Some(he) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: GPIO failure ({he}).\nLikely causes: Not running on a Raspberry Pi, missing permissions, or the pin is already in use.\nHow to fix: Check [input] pin and that the user is in the gpio group."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error family; anything untyped exits 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(de) = err.downcast_ref::<DialError>() {
        return match de {
            DialError::Config(_) => 3,
            DialError::InvalidNumber(_) => 4,
            DialError::Input(_) => 5,
            DialError::Disconnected => 6,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 3;
    }
    if err.downcast_ref::<HwError>().is_some() {
        return 5;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(de) = err.downcast_ref::<DialError>() {
        return match de {
            DialError::Config(_) => "Config",
            DialError::InvalidNumber(_) => "InvalidNumber",
            DialError::Input(_) => "Input",
            DialError::Disconnected => "Disconnected",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Input";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
