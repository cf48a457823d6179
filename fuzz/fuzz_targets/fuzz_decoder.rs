#![no_main]
use dial_core::{Dial, DialTiming};
use dial_traits::{Edge, EdgeEvent};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Step {
    /// Edge after `gap` ms.
    Edge { rising: bool, gap: u16 },
    /// Let time pass without edges.
    Wait(u16),
    Take,
}

fuzz_target!(|steps: Vec<Step>| {
    let timing = DialTiming::default();
    let mut dial = Dial::new(timing);
    let mut now = 0u64;
    for step in steps {
        match step {
            Step::Edge { rising, gap } => {
                now += u64::from(gap);
                dial.handle_edge(EdgeEvent::new(Edge::from_level(rising), now));
            }
            Step::Wait(ms) => {
                now += u64::from(ms);
                dial.advance_to(now);
            }
            Step::Take => {
                if let Some(n) = dial.try_take_number() {
                    assert!(!n.is_empty());
                    assert!(n.digits().iter().all(|d| d.value() <= 9));
                }
            }
        }
        assert!(dial.decoder().pulse_count() <= 10);
    }
    dial.advance_to(now + timing.max_inter_digit_ms);
    assert_eq!(dial.next_deadline(), None);
    assert!(dial.decoder().is_ready());
});
