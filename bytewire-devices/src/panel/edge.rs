//! Edge-event dispatcher
//!
//! Binds a rising edge on the button line to a toggle of the LED line.
//! The dispatcher is armed when bound and fires once per qualifying
//! edge; [`EdgeToggle::on_rising_edge`] is the interrupt-context entry
//! point and must stay minimal and non-blocking, so it only flips an
//! atomic flag and writes the new level.

use core::sync::atomic::{AtomicBool, Ordering};

use bytewire_hal::gpio::{InputLine, Level, OutputLine};
use bytewire_hal::line::{ClaimError, LineId, LineProvider, LineRole};

use crate::config::EdgeToggleConfig;

/// What the dispatcher did with a hardware edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// The edge qualified; the LED now drives the reported level
    Toggled(Level),
    /// The edge fell inside the debounce window and was ignored
    Suppressed,
}

/// Rising-edge to LED-toggle dispatcher
///
/// Armed from construction until drop. The toggle state is an atomic
/// so thread-context code may read it while edges fire.
pub struct EdgeToggle<O: OutputLine, I: InputLine> {
    // Held for the binding's lifetime; the hardware delivers its edges
    // to `on_rising_edge`
    _button: I,
    lamp: O,
    lit: AtomicBool,
    debounce_ms: u32,
    last_edge_ms: Option<u64>,
}

impl<O: OutputLine, I: InputLine> EdgeToggle<O, I> {
    /// Arm the dispatcher over already-claimed lines
    ///
    /// The lamp starts at its safe (off) level.
    pub fn arm(mut lamp: O, button: I, debounce_ms: u32) -> Self {
        lamp.set_low();
        Self {
            _button: button,
            lamp,
            lit: AtomicBool::new(false),
            debounce_ms,
            last_edge_ms: None,
        }
    }

    /// Handle one hardware edge, timestamped in milliseconds
    ///
    /// Interrupt context: no blocking, no gates. Edges closer than the
    /// debounce window to the last accepted edge are suppressed.
    pub fn on_rising_edge(&mut self, now_ms: u64) -> EdgeOutcome {
        if let Some(last) = self.last_edge_ms {
            if now_ms.saturating_sub(last) < u64::from(self.debounce_ms) {
                return EdgeOutcome::Suppressed;
            }
        }
        self.last_edge_ms = Some(now_ms);

        let lit = !self.lit.load(Ordering::Relaxed);
        self.lit.store(lit, Ordering::Relaxed);
        let level = Level::from(lit);
        self.lamp.write_level(level);
        EdgeOutcome::Toggled(level)
    }

    /// Current toggle state, readable from thread context
    pub fn is_lit(&self) -> bool {
        self.lit.load(Ordering::Relaxed)
    }
}

impl<O: OutputLine, I: InputLine> Drop for EdgeToggle<O, I> {
    fn drop(&mut self) {
        // Unconditional teardown: lamp off before the guards release
        self.lamp.set_low();
    }
}

/// Claim the dispatcher's lines and arm it
///
/// Claims the LED first, then the button; a failure binding the button
/// releases the LED line too, leaving nothing claimed.
pub fn bind<'p, P>(
    lines: &'p P,
    cfg: &EdgeToggleConfig,
) -> Result<EdgeToggle<P::Output<'p>, P::Input<'p>>, ClaimError>
where
    P: LineProvider,
{
    let lamp = lines.claim_output(LineRole::new(cfg.led_line, "TOGGLE_LED"), Level::Low)?;
    let mut button = lines.claim_input(LineRole::new(cfg.button_line, "TOGGLE_BUTTON"))?;
    button.set_debounce(cfg.debounce_ms);
    lines.export(LineId(cfg.led_line));
    lines.export(LineId(cfg.button_line));
    Ok(EdgeToggle::arm(lamp, button, cfg.debounce_ms))
}
