use log::warn;

use crate::error::Error;

/// How the driver waits for the controller to finish an instruction.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum WaitMode {
    /// Block for the datasheet execution time after issuing an instruction.
    /// Always used until initialization completes.
    Delay,
    /// Poll the busy flag before issuing an instruction.
    #[default]
    BusyFlag,
}

/// Spin on `busy` until it reports idle.
///
/// With a `limit`, gives up with `BusyTimeout` after that many busy replies;
/// without one a disconnected controller hangs the caller forever.
pub(crate) fn poll_until_idle<E, F>(limit: Option<u32>, mut busy: F) -> Result<(), Error<E>>
where
    F: FnMut() -> Result<bool, Error<E>>,
{
    let mut polls: u32 = 0;
    while busy()? {
        polls = polls.saturating_add(1);
        if let Some(limit) = limit {
            if polls >= limit {
                warn!("busy flag still set after {} polls", polls);
                return Err(Error::BusyTimeout);
            }
        }
    }
    Ok(())
}
