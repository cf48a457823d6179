//! The three subcommands: listen, simulate, and self-check.

use crate::cli::RtLock;
use crate::rt::setup_rt_once;
use dial_config::Config;
use dial_core::train::{default_digit_gap, number_edges};
use dial_core::{Dial, DialError, DialService, DialTiming, DialedNumber, Dispatcher, RouteAction};
use dial_hardware::SimulatedDial;
use dial_traits::{EdgeEvent, PulseInput};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Decode a train in virtual time: every edge, then both timeouts.
fn decode_virtual(timing: DialTiming, edges: &[EdgeEvent]) -> Option<DialedNumber> {
    let mut dial = Dial::new(timing);
    for &ev in edges {
        let outcome = dial.handle_edge(ev);
        debug!(?ev, ?outcome, "virtual edge");
    }
    let end = edges.last().map_or(0, |e| e.at_ms) + timing.max_inter_digit_ms;
    dial.advance_to(end);
    dial.try_take_number()
}

fn report(number: &DialedNumber, action: Option<&RouteAction>, json: bool) {
    if json {
        let digits: Vec<u8> = number.digits().iter().map(|d| d.value()).collect();
        println!(
            "{}",
            serde_json::json!({
                "number": number.compact(),
                "digits": digits,
                "action": action.map(|a| a.name.as_str()),
            })
        );
    } else {
        match action {
            Some(a) => println!("dialed {} -> {}", number.compact(), a.name),
            None => println!("dialed {}", number.compact()),
        }
    }
}

/// Spawn the route's command with the number in `DIAL_NUMBER`; reaped on a
/// helper thread.
fn run_action(number: &DialedNumber, action: &RouteAction) {
    let Some((program, args)) = action.command.split_first() else {
        return;
    };
    match std::process::Command::new(program)
        .args(args)
        .env("DIAL_NUMBER", number.compact())
        .spawn()
    {
        Ok(mut child) => {
            info!(action = %action.name, pid = child.id(), %program, "route command started");
            std::thread::spawn(move || match child.wait() {
                Ok(status) if !status.success() => warn!(%status, "route command failed"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "route command wait failed"),
            });
        }
        Err(e) => warn!(action = %action.name, %program, error = %e, "route command did not start"),
    }
}

#[cfg(feature = "hardware")]
fn hw_pull(p: dial_config::Pull) -> dial_hardware::Pull {
    match p {
        dial_config::Pull::Down => dial_hardware::Pull::Down,
        dial_config::Pull::Up => dial_hardware::Pull::Up,
        dial_config::Pull::None => dial_hardware::Pull::None,
    }
}

fn open_input(
    cfg: &Config,
    timing: &DialTiming,
    simulate: Option<&str>,
) -> Result<Box<dyn PulseInput>> {
    if let Some(s) = simulate {
        let number: DialedNumber = s.parse()?;
        let edges = number_edges(&number, timing, default_digit_gap(timing), 0);
        info!(%number, edges = edges.len(), "using simulated dial");
        return Ok(Box::new(SimulatedDial::new(edges)));
    }
    #[cfg(feature = "hardware")]
    {
        let input = dial_hardware::GpioPulseInput::new(cfg.input.pin, hw_pull(cfg.input.pull))?;
        Ok(Box::new(input))
    }
    #[cfg(not(feature = "hardware"))]
    {
        let _ = cfg;
        Err(DialError::Input(
            "built without the `hardware` feature; use --simulate or rebuild with --features hardware"
                .into(),
        )
        .into())
    }
}

pub struct ListenOpts<'a> {
    pub simulate: Option<&'a str>,
    pub once: bool,
    pub rt: bool,
    pub rt_prio: Option<i32>,
    pub rt_lock: RtLock,
}

pub fn listen(cfg: &Config, opts: ListenOpts<'_>, json: bool, shutdown: Arc<AtomicBool>) -> Result<()> {
    if opts.rt {
        setup_rt_once(opts.rt_prio, opts.rt_lock);
    }
    let timing = DialTiming::from(&cfg.timing);
    let dispatcher = Dispatcher::<RouteAction>::try_from(cfg.routes.as_slice())?;
    let svc = DialService::builder().with_timing(timing).build()?;

    let mut input = open_input(cfg, &timing, opts.simulate)?;
    input
        .subscribe(svc.sender().into_sink())
        .map_err(|e| DialError::Input(e.to_string()))?;
    info!(
        pin = cfg.input.pin,
        routes = dispatcher.len(),
        poll_ms = cfg.poll.interval_ms,
        "listening"
    );

    let poll = Duration::from_millis(cfg.poll.interval_ms);
    let mut last_dropped = 0;
    while !shutdown.load(Ordering::Relaxed) {
        if let Some(number) = svc.try_take_number() {
            let action = dispatcher.resolve(&number);
            info!(%number, action = action.map(|a| a.name.as_str()), "number dialed");
            report(&number, action, json);
            if let Some(a) = action {
                run_action(&number, a);
            }
            if opts.once {
                break;
            }
        }
        let dropped = svc.dropped_edges();
        if dropped > last_dropped {
            warn!(dropped, "edge queue overflowed; pulses were lost");
            last_dropped = dropped;
        }
        std::thread::sleep(poll);
    }

    input
        .unsubscribe()
        .map_err(|e| DialError::Input(e.to_string()))?;
    info!("listener stopped");
    Ok(())
}

pub fn simulate(cfg: &Config, number: &str, gap_ms: Option<u64>, realtime: bool, json: bool) -> Result<()> {
    let timing = DialTiming::from(&cfg.timing);
    let dispatcher = Dispatcher::<RouteAction>::try_from(cfg.routes.as_slice())?;
    let number: DialedNumber = number.parse()?;
    let gap = gap_ms.unwrap_or_else(|| default_digit_gap(&timing));
    if gap < timing.inter_digit_ms || gap >= timing.max_inter_digit_ms {
        warn!(
            gap_ms = gap,
            inter_digit_ms = timing.inter_digit_ms,
            max_inter_digit_ms = timing.max_inter_digit_ms,
            "digit gap outside the inter-digit window; digits may merge or split"
        );
    }
    let edges = number_edges(&number, &timing, gap, 0);
    info!(%number, edges = edges.len(), gap_ms = gap, realtime, "simulating");

    let decoded = if realtime {
        decode_realtime(timing, edges)?
    } else {
        decode_virtual(timing, &edges)
    };
    let Some(decoded) = decoded else {
        eyre::bail!("no number decoded from simulated dial of {number}");
    };
    if decoded != number {
        warn!(dialed = %number, %decoded, "decoded number differs from dialed");
    }
    report(&decoded, dispatcher.resolve(&decoded), json);
    Ok(())
}

fn decode_realtime(timing: DialTiming, edges: Vec<EdgeEvent>) -> Result<Option<DialedNumber>> {
    let svc = DialService::builder().with_timing(timing).build()?;
    let mut input = SimulatedDial::new(edges);
    let budget = input.duration() + Duration::from_millis(timing.max_inter_digit_ms) + Duration::from_secs(2);
    input
        .subscribe(svc.sender().into_sink())
        .map_err(|e| DialError::Input(e.to_string()))?;

    let deadline = Instant::now() + budget;
    while Instant::now() < deadline {
        if let Some(n) = svc.try_take_number() {
            return Ok(Some(n));
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    warn!(?budget, dropped = svc.dropped_edges(), "simulated dial produced no number in time");
    Ok(None)
}

pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let timing = DialTiming::from(&cfg.timing);
    timing.validate()?;
    let dispatcher = Dispatcher::<RouteAction>::try_from(cfg.routes.as_slice())?;

    let probe: DialedNumber = "1234567890".parse()?;
    let edges = number_edges(&probe, &timing, default_digit_gap(&timing), 0);
    match decode_virtual(timing, &edges) {
        Some(n) if n == probe => {}
        other => eyre::bail!("decoder self-test failed: dialed {probe}, decoded {other:?}"),
    }

    let svc = DialService::builder().with_timing(timing).build()?;
    let snap = svc.snapshot().wrap_err("decoder service did not answer")?;
    drop(svc);

    #[cfg(feature = "hardware")]
    let input = {
        let gpio = dial_hardware::GpioPulseInput::new(cfg.input.pin, hw_pull(cfg.input.pull))?;
        format!("gpio {} ({})", gpio.pin(), if gpio.is_high() { "high" } else { "low" })
    };
    #[cfg(not(feature = "hardware"))]
    let input = "simulated".to_string();

    info!(routes = dispatcher.len(), %input, ?snap.state, "self-check ok");
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "routes": dispatcher.len(),
                "input": input,
            })
        );
    } else {
        println!("self-check ok: decoder, service, {} route(s), input {input}", dispatcher.len());
    }
    Ok(())
}
