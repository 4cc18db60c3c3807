use embedded_hal::digital::{Error as _, OutputPin, PinState};

use crate::config::LightConfig;

/// A single LED
struct SingleLED<P: OutputPin> {
    /// On/Off state
    state: bool,

    /// Pin state when turning LED on
    on_state: PinState,

    /// GPIO for controlling the LED
    pin: P,
}

impl<P: OutputPin> SingleLED<P> {
    fn new(pin: P, on_state: PinState) -> Self {
        Self {
            state: false,
            on_state,
            pin,
        }
    }

    /// Turn LED on
    fn on(&mut self) -> Result<(), P::Error> {
        self.pin.set_state(self.on_state)?;
        self.state = true;
        Ok(())
    }

    /// Turn LED off
    fn off(&mut self) -> Result<(), P::Error> {
        self.pin.set_state(!self.on_state)?;
        self.state = false;
        Ok(())
    }
}

/// LED that is lit while any layer above the base layer is active.
///
/// Every update writes the pin level, also when it doesn't change, so repeated updates with the
/// same layer drive the same level.
pub struct LayerIndicator<P: OutputPin> {
    led: Option<SingleLED<P>>,
}

impl<P: OutputPin> LayerIndicator<P> {
    pub fn new(pin: Option<P>, on_state: PinState) -> Self {
        Self {
            led: pin.map(|p| SingleLED::new(p, on_state)),
        }
    }

    pub fn from_config(light_config: LightConfig<P>) -> Self {
        Self::new(light_config.layer_indicator, light_config.on_state)
    }

    pub fn is_on(&self) -> bool {
        self.led.as_ref().is_some_and(|led| led.state)
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if let Some(led) = &mut self.led {
            if on { led.on() } else { led.off() }
        } else {
            Ok(())
        }
    }

    /// Same as [`LayerIndicator::set`], but errors are logged and dropped
    pub(crate) fn set_or_log(&mut self, on: bool) {
        if let Err(e) = self.set(on) {
            error!("Failed to drive the layer indicator: {:?}", e.kind());
        }
    }

    /// Give back the pin
    pub fn release(self) -> Option<P> {
        self.led.map(|led| led.pin)
    }
}
