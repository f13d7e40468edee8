//! Round-robin rotation over a fixed pool with full-cycle detection.
//!
//! Used to rotate through service endpoints on failover: the caller can tell
//! "every item was tried and we are back where we started" without keeping
//! its own counter.

use std::ops::{Deref, DerefMut};

use tracing::{debug, trace};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
struct CycleAnchor {
    position: usize,
    /// Set when detection was armed before the first advance; the first
    /// arrival at the anchor is the start, not a completed cycle.
    skip_first_arrival: bool,
}

/// A non-empty, order-preserving ring of items with a rotating cursor.
///
/// # Example
///
/// ```
/// use qfilter_core::CircularSequence;
///
/// let mut endpoints = CircularSequence::new(["a", "b", "c"]).unwrap();
/// assert_eq!(endpoints.advance().unwrap(), &"a");
/// assert_eq!(endpoints.advance().unwrap(), &"b");
///
/// let mut round = endpoints.detect_cycles();
/// assert_eq!(round.advance().unwrap(), &"c");
/// assert_eq!(round.advance().unwrap(), &"a");
/// assert!(round.advance().is_err()); // back at "b"
/// ```
#[derive(Debug, Clone)]
pub struct CircularSequence<T> {
    items: Vec<T>,
    cursor: Option<usize>,
    anchor: Option<CycleAnchor>,
}

impl<T> CircularSequence<T> {
    /// Creates a sequence over the given items. Fails if there are none.
    pub fn new<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return Err(Error::InvalidOperation(
                "circular sequence requires at least one item".to_string(),
            ));
        }
        Ok(Self {
            items,
            cursor: None,
            anchor: None,
        })
    }

    /// Number of items in the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: empty sequences can't be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current cursor position, `None` before the first advance.
    #[inline]
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    /// Item under the cursor, `None` before the first advance.
    pub fn current(&self) -> Option<&T> {
        self.cursor.map(|i| &self.items[i])
    }

    /// Moves the cursor to the next item and returns it.
    ///
    /// With cycle detection armed, an advance that would land back on the
    /// anchor fails with [`Error::CircleDetected`] and leaves the cursor where
    /// it was.
    pub fn advance(&mut self) -> Result<&T> {
        let next = match self.cursor {
            None => 0,
            Some(position) => (position + 1) % self.items.len(),
        };

        if let Some(anchor) = self.anchor.as_mut() {
            if next == anchor.position {
                if anchor.skip_first_arrival {
                    anchor.skip_first_arrival = false;
                } else {
                    debug!(position = next, len = self.items.len(), "circle detected");
                    return Err(Error::CircleDetected { position: next });
                }
            }
        }

        trace!(from = ?self.cursor, to = next, "advancing circular sequence");
        self.cursor = Some(next);
        Ok(&self.items[next])
    }

    /// Moves the cursor to the first item, bypassing cycle detection.
    ///
    /// Landing on an anchor that still awaits its first arrival uses up that
    /// exemption: the next arrival there completes the cycle.
    pub fn reset(&mut self) -> &T {
        if let Some(anchor) = self.anchor.as_mut() {
            if anchor.position == 0 {
                anchor.skip_first_arrival = false;
            }
        }
        trace!(from = ?self.cursor, "resetting circular sequence");
        self.cursor = Some(0);
        &self.items[0]
    }

    /// Starts cycle detection from the current cursor.
    ///
    /// Armed before the first advance, the anchor is the first item and
    /// arriving there once is allowed.
    pub fn arm_cycle_detection(&mut self) {
        self.anchor = Some(match self.cursor {
            Some(position) => CycleAnchor {
                position,
                skip_first_arrival: false,
            },
            None => CycleAnchor {
                position: 0,
                skip_first_arrival: true,
            },
        });
    }

    /// Stops cycle detection.
    pub fn disarm_cycle_detection(&mut self) {
        self.anchor = None;
    }

    #[inline]
    pub fn is_cycle_detection_armed(&self) -> bool {
        self.anchor.is_some()
    }

    /// Arms cycle detection for the lifetime of the returned guard.
    pub fn detect_cycles(&mut self) -> CycleDetectionGuard<'_, T> {
        self.arm_cycle_detection();
        CycleDetectionGuard { sequence: self }
    }

    /// Tries `attempt` on successive items until one succeeds or every item
    /// has been tried once in this round.
    ///
    /// Rotation continues from the current cursor, so repeated rounds spread
    /// load over the pool. Returns every error when no item succeeds.
    pub fn try_each<R, E, F>(&mut self, mut attempt: F) -> std::result::Result<R, Vec<E>>
    where
        F: FnMut(&T) -> std::result::Result<R, E>,
    {
        let mut errors = Vec::new();
        let mut round = self.detect_cycles();

        // Armed mid-rotation, the anchor is the item handed out last time. It is
        // retried first, then the rest of the ring.
        if let Some(last) = round.current() {
            match attempt(last) {
                Ok(value) => return Ok(value),
                Err(e) => errors.push(e),
            }
        }

        while let Ok(item) = round.advance() {
            match attempt(item) {
                Ok(value) => return Ok(value),
                Err(e) => errors.push(e),
            }
        }

        Err(errors)
    }
}

/// Scoped cycle detection. Derefs to the sequence and disarms detection when
/// dropped, on every exit path.
#[derive(Debug)]
pub struct CycleDetectionGuard<'a, T> {
    sequence: &'a mut CircularSequence<T>,
}

impl<T> Deref for CycleDetectionGuard<'_, T> {
    type Target = CircularSequence<T>;

    fn deref(&self) -> &Self::Target {
        self.sequence
    }
}

impl<T> DerefMut for CycleDetectionGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.sequence
    }
}

impl<T> Drop for CycleDetectionGuard<'_, T> {
    fn drop(&mut self) {
        self.sequence.disarm_cycle_detection();
    }
}
