//! RoundRobin - index rotation with an idle countdown
//!
//! The countdown starts at the number of producers. Any report of work
//! resets it; every idle report decrements it. Only a full, uninterrupted
//! round of idle reports drains it to zero, which is the terminal state.
//!
//! Termination therefore depends on the workload: producers must eventually
//! stay idle. Nothing here forces them to.

/// Round-robin position plus idle countdown over `size` producers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobin {
    size: usize,
    countdown: usize,
    index: usize,
}

impl RoundRobin {
    /// Start at index 0 with a full countdown
    pub fn new(size: usize) -> Self {
        Self {
            size,
            countdown: size,
            index: 0,
        }
    }

    /// Number of producers in rotation
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the producer to invoke next
    pub fn current(&self) -> usize {
        self.index
    }

    /// Consecutive idle reports still needed before going idle
    pub fn countdown(&self) -> usize {
        self.countdown
    }

    /// Check whether a full round reported no work
    pub fn is_idle(&self) -> bool {
        self.countdown == 0
    }

    /// Record the current producer's report
    ///
    /// Returns the next index to invoke, or `None` once idle.
    pub fn record(&mut self, did_work: bool) -> Option<usize> {
        if self.is_idle() {
            return None;
        }
        if did_work {
            self.countdown = self.size;
        } else {
            self.countdown -= 1;
        }
        if self.countdown > 0 {
            self.index = (self.index + 1) % self.size;
            Some(self.index)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation() {
        let mut rr = RoundRobin::new(3);
        assert_eq!(rr.current(), 0);
        assert_eq!(rr.record(true), Some(1));
        assert_eq!(rr.record(true), Some(2));
        assert_eq!(rr.record(true), Some(0));
    }

    #[test]
    fn test_full_idle_round_terminates() {
        let mut rr = RoundRobin::new(3);
        assert_eq!(rr.record(false), Some(1));
        assert_eq!(rr.record(false), Some(2));
        assert_eq!(rr.record(false), None);
        assert!(rr.is_idle());
        assert_eq!(rr.record(true), None);
    }

    #[test]
    fn test_work_resets_countdown() {
        let mut rr = RoundRobin::new(3);
        rr.record(false);
        rr.record(false);
        assert_eq!(rr.countdown(), 1);
        rr.record(true);
        assert_eq!(rr.countdown(), 3);
        assert!(!rr.is_idle());
    }

    #[test]
    fn test_single_producer() {
        let mut rr = RoundRobin::new(1);
        assert_eq!(rr.record(true), Some(0));
        assert_eq!(rr.record(false), None);
    }

    #[test]
    fn test_empty_rotation_is_idle() {
        let mut rr = RoundRobin::new(0);
        assert!(rr.is_idle());
        assert_eq!(rr.record(true), None);
    }
}
