//! Line claiming and release
//!
//! A line must be claimed before it can be driven or sampled, and a
//! claimed line is owned exclusively until its guard drops. Providers
//! hand out guard types implementing [`OutputLine`]/[`InputLine`] that
//! release the line on drop, so teardown is reverse acquisition order by
//! construction and a failed multi-line claim unwinds automatically.

use crate::gpio::{InputLine, Level, OutputLine};

/// Identifier of a digital line on the board's pin header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub u16);

/// One entry of a declarative line role table
///
/// Drivers describe their pinout as an ordered list of roles and claim
/// the whole table at once, instead of duplicating index bookkeeping per
/// pin.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineRole {
    /// Line to claim
    pub id: LineId,
    /// Role label, e.g. `"REGISTER_SELECT"` (used for diagnostics and
    /// export)
    pub label: &'static str,
}

impl LineRole {
    /// Create a role entry
    pub const fn new(id: u16, label: &'static str) -> Self {
        Self {
            id: LineId(id),
            label,
        }
    }
}

/// Errors raised while claiming lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClaimError {
    /// The line is already claimed
    Busy(LineId),
    /// The line cannot be configured for the requested direction
    Direction(LineId),
}

/// Provider of claimable digital lines
///
/// A claim is not reentrant: claiming an identifier that is already
/// claimed fails with [`ClaimError::Busy`]. The returned guard owns the
/// line and releases it when dropped.
pub trait LineProvider {
    /// Claimed output line guard
    type Output<'a>: OutputLine
    where
        Self: 'a;

    /// Claimed input line guard
    type Input<'a>: InputLine
    where
        Self: 'a;

    /// Claim a line, configure it as an output and drive it to `initial`
    fn claim_output(&self, role: LineRole, initial: Level)
        -> Result<Self::Output<'_>, ClaimError>;

    /// Claim a line and configure it as an input
    fn claim_input(&self, role: LineRole) -> Result<Self::Input<'_>, ClaimError>;

    /// Make a claimed line introspectable outside the driver
    ///
    /// Best-effort, not required for correctness.
    fn export(&self, id: LineId) {
        let _ = id;
    }
}

/// Claim an ordered group of output lines, all-or-nothing
///
/// Lines are claimed in table order and configured to `initial`. If the
/// claim fails at entry *k*, the guards for entries `0..k` drop before
/// the error propagates, so exactly the claimed prefix is released.
pub fn claim_output_group<'p, P, const N: usize>(
    lines: &'p P,
    roles: [LineRole; N],
    initial: Level,
) -> Result<heapless::Vec<P::Output<'p>, N>, ClaimError>
where
    P: LineProvider + ?Sized,
{
    let mut claimed: heapless::Vec<P::Output<'p>, N> = heapless::Vec::new();
    for role in roles {
        let line = lines.claim_output(role, initial)?;
        // Capacity is N and the table has N entries, push cannot fail
        let _ = claimed.push(line);
    }
    Ok(claimed)
}
