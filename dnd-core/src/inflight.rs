//! Busy flags that survive a dropped request future.

/// Holds a busy flag set for its lifetime and clears it on drop, including
/// when the owning future is cancelled at an `.await`.
pub(crate) struct InFlight<'a> {
    flag: &'a mut bool,
}

impl<'a> InFlight<'a> {
    /// Set the flag and hold it.
    pub(crate) fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }

    /// Take over a flag that is already set.
    pub(crate) fn resume(flag: &'a mut bool) -> Self {
        Self { flag }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_cleared_on_drop() {
        let mut busy = false;
        {
            let guard = InFlight::start(&mut busy);
            assert!(*guard.flag);
        }
        assert!(!busy);

        let mut busy = true;
        drop(InFlight::resume(&mut busy));
        assert!(!busy);
    }
}
