use super::state::ThrowId;

#[derive(Clone, Copy, Debug, PartialEq)]
struct DeferredRemoval<H> {
    throw_id: ThrowId,
    handle: H,
    due_at: f64,
}

/// Removals scheduled for later, each tagged with the throw that scheduled it.
///
/// A removal only goes through if its throw is still the current one when it comes
/// due, so a removal queued by an old throw can never hit an object created since.
#[derive(Debug)]
pub(crate) struct DeferredRemovals<H> {
    pending: Vec<DeferredRemoval<H>>,
}

impl<H> Default for DeferredRemovals<H> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<H: Copy> DeferredRemovals<H> {
    pub fn schedule(&mut self, throw_id: ThrowId, handle: H, due_at: f64) {
        self.pending.push(DeferredRemoval {
            throw_id,
            handle,
            due_at,
        });
    }

    /// Returns the handles due at `now` that belong to `current`.
    /// Stale entries are dropped without being returned.
    pub fn take_due(&mut self, now: f64, current: ThrowId) -> Vec<H> {
        let mut due = Vec::new();
        self.pending.retain(|removal| {
            if removal.throw_id != current {
                return false;
            }
            if removal.due_at <= now {
                due.push(removal.handle);
                return false;
            }
            true
        });
        due
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_waits_for_its_due_time() {
        let mut removals = DeferredRemovals::default();
        removals.schedule(1, 'a', 2.);
        assert!(removals.take_due(1.9, 1).is_empty());
        assert_eq!(removals.take_due(2., 1), vec!['a']);
        assert_eq!(removals.len(), 0);
    }

    #[test]
    fn stale_removal_never_fires() {
        let mut removals = DeferredRemovals::default();
        removals.schedule(1, 'a', 2.);
        removals.schedule(2, 'b', 3.);
        assert!(removals.take_due(10., 2).contains(&'b'));
        assert_eq!(removals.len(), 0, "stale entry should be dropped too");
    }
}
