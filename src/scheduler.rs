//! Round-robin dispatch over a fixed table of routines.
//!
//! The scheduler owns no stacks and no heap allocation: routines are
//! registered as `&mut dyn Routine` borrows into a fixed-capacity
//! `heapless::Vec`, which stands in for the intrusive linked list a
//! bare-metal kernel would thread through its task structs (spec.md §9
//! sanctions "an externally owned ordered sequence" for hosted
//! reimplementations). A cursor remembers where the last sweep left off so
//! `run_one` visits routines in strict round-robin order rather than
//! always restarting at index 0.

use core::fmt;

use heapless::Vec;

use crate::clock::{deadline_elapsed, Clock};
use crate::routine::{Routine, RoutineId};
use crate::status::Status;

/// Failure registering a routine with a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler's fixed-capacity table is already full.
    Full,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Full => write!(f, "scheduler table is full"),
        }
    }
}

impl core::error::Error for SchedulerError {}

/// Round-robin scheduler over up to `N` registered routines.
///
/// `'a` is the lifetime of the borrowed routines; the scheduler never takes
/// ownership of them, matching spec.md's requirement that routine storage
/// is provided by the host rather than heap-allocated at registration time.
pub struct Scheduler<'a, const N: usize> {
    routines: Vec<&'a mut dyn Routine, N>,
    cursor: usize,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    /// An empty scheduler with no routines registered.
    pub const fn new() -> Self {
        Scheduler { routines: Vec::new(), cursor: 0 }
    }

    /// One-time initialization to run before the host's main dispatch loop
    /// starts calling [`Scheduler::run_one`].
    ///
    /// A no-op today — this scheduler has no state that needs preparing
    /// beyond what [`Scheduler::new`] already establishes — but it is the
    /// hook spec.md §6 names ("present for symmetry with `loop()`"), kept
    /// as a real call so a host that always calls `setup()` once and then
    /// `run_one()` in a loop has somewhere to hang future one-time work
    /// (e.g. priming a watchdog) without changing its call site.
    pub fn setup(&mut self) {}

    /// Register every routine in `routines`, in order, failing the whole
    /// batch if the table's capacity would be exceeded.
    ///
    /// Convenience wrapper over repeated [`Scheduler::register`] for the
    /// common case of bringing up a fixed set of routines at startup; unlike
    /// [`Scheduler::setup`], this performs registration, not the spec's
    /// no-op init hook.
    pub fn register_all(&mut self, routines: impl IntoIterator<Item = &'a mut dyn Routine>) -> Result<(), SchedulerError> {
        for routine in routines {
            self.register(routine)?;
        }
        Ok(())
    }

    /// Add one routine to the end of the dispatch table, returning the
    /// handle the host can use to find it again later (e.g. to look up its
    /// status for diagnostics).
    pub fn register(&mut self, routine: &'a mut dyn Routine) -> Result<RoutineId, SchedulerError> {
        let id = RoutineId(self.routines.len() as u32);
        log::trace!("registering routine {} as id {}", routine.name(), id.value());
        self.routines.push(routine).map_err(|_| {
            log::warn!("scheduler table full ({} routines), refusing to register", N);
            SchedulerError::Full
        })?;
        Ok(id)
    }

    /// Number of routines currently registered, including ended ones.
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    /// Whether no routines are registered.
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Step at most one routine: the next one in round-robin order that is
    /// ready, starting the scan from just past whichever routine was last
    /// stepped.
    ///
    /// Returns `Some(index)` of the routine that was stepped, or `None` if
    /// every registered routine is `Ended`, `Awaiting` on a false
    /// predicate, or `Delaying` on a deadline that has not elapsed yet —
    /// i.e. nothing in the table is currently runnable.
    ///
    /// A full sweep that finds no ready routine costs one `status()` /
    /// `wake_millis()` check per entry; it never calls `step` on anything
    /// that is not ready, so idle polling alone does not perturb routine
    /// state.
    pub fn run_one(&mut self, clock: &dyn Clock) -> Option<usize> {
        let len = self.routines.len();
        if len == 0 {
            return None;
        }

        for offset in 0..len {
            let index = (self.cursor + offset) % len;
            let routine = &mut self.routines[index];

            let status = routine.status();
            let ready = if status == Status::Delaying {
                deadline_elapsed(clock.now_ms(), routine.wake_millis())
            } else {
                status.immediately_ready()
            };

            if ready {
                log::trace!("stepping {} (status {:?})", routine.name(), status);
                routine.step(clock);
                self.cursor = (index + 1) % len;
                return Some(index);
            }
        }

        log::trace!("idle tick: no routine ready out of {}", len);
        None
    }

    /// Borrow the registered routines in registration order, for
    /// inspecting status (e.g. to decide the run loop is done because
    /// everything has ended).
    pub fn routines(&self) -> &[&'a mut dyn Routine] {
        &self.routines
    }
}

impl<'a, const N: usize> Default for Scheduler<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}
