//! Pulse input on a Raspberry Pi GPIO line.
//!
//! The dial contact is wired between the pin and the rail opposite the pull,
//! so an open contact (break) reads low with the default pull-down.

use dial_traits::{Edge, EdgeSink, PulseInput};
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use tracing::{debug, info};

use crate::Pull;
use crate::error::{HwError, Result};

pub struct GpioPulseInput {
    pin: InputPin,
    bcm: u8,
    subscribed: bool,
}

impl GpioPulseInput {
    pub fn new(bcm: u8, pull: Pull) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(bcm)
            .map_err(|e| HwError::Gpio(format!("pin {bcm}: {e}")))?;
        let pin = match pull {
            Pull::Down => pin.into_input_pulldown(),
            Pull::Up => pin.into_input_pullup(),
            Pull::None => pin.into_input(),
        };
        info!(pin = bcm, ?pull, "gpio pulse input ready");
        Ok(Self {
            pin,
            bcm,
            subscribed: false,
        })
    }

    pub fn pin(&self) -> u8 {
        self.bcm
    }

    /// Current line level, true for high.
    pub fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl PulseInput for GpioPulseInput {
    fn subscribe(
        &mut self,
        mut sink: EdgeSink,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.subscribed {
            return Err(HwError::AlreadySubscribed.into());
        }
        self.pin
            .set_async_interrupt(Trigger::Both, move |level: Level| {
                sink(Edge::from_level(level == Level::High));
            })
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        self.subscribed = true;
        debug!(pin = self.bcm, "edge interrupt armed");
        Ok(())
    }

    fn unsubscribe(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.subscribed {
            return Ok(());
        }
        self.pin
            .clear_async_interrupt()
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        self.subscribed = false;
        debug!(pin = self.bcm, "edge interrupt cleared");
        Ok(())
    }
}

impl Drop for GpioPulseInput {
    fn drop(&mut self) {
        if let Err(e) = self.unsubscribe() {
            tracing::warn!(pin = self.bcm, error = %e, "failed to clear edge interrupt");
        }
    }
}
