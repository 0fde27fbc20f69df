//! The routine abstraction and the control primitives that suspend it.
//!
//! A routine carries its own resume point instead of a stack: `step` jumps
//! back to wherever the last suspension left off, runs forward to the next
//! one, and returns. Locals declared before a suspension primitive do not
//! survive it — anything that must live across a `yield_now!`/`await_until!`
//! /`delay_ms!` belongs in `self`, not in a local variable.
//!
//! Concretely, a routine struct carries three fields the suspension macros
//! read and write: `resume` (the opaque resume label, meaningful only to
//! that routine's own `step`), `status` (mirrored so the scheduler can ask
//! "is this routine ready?" without stepping it), and `wake_millis`
//! (meaningful only while `status == Delaying`). [`Routine::status`] and
//! [`Routine::wake_millis`] expose the latter two to the scheduler.

use crate::clock::Clock;
use crate::status::Status;

/// Unique handle to a routine registered with a [`crate::Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoutineId(pub(crate) u32);

impl RoutineId {
    /// Raw index into the scheduler's routine table.
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// A cooperative task with its own resume point; no real stack.
///
/// Implementors write `step` as straight-line code containing
/// [`yield_now!`], [`await_until!`], [`delay_ms!`] and [`end!`] as the only
/// legal suspension points, dispatching on a resume label stored in `self`
/// the way spec.md §9 allows ("a switch-over-resume-labels idiom").
pub trait Routine {
    /// Stable identifier for diagnostics. Does not change across the
    /// routine's lifetime.
    fn name(&self) -> &str;

    /// Current status, as last left by `step`. The scheduler reads this
    /// (and, while `Delaying`, [`Routine::wake_millis`]) to decide whether
    /// a routine is ready *without* calling `step`.
    fn status(&self) -> Status;

    /// Absolute millisecond deadline. Only meaningful while
    /// `status() == Status::Delaying`; routines that never call
    /// [`delay_ms!`] can leave the default.
    fn wake_millis(&self) -> u32 {
        0
    }

    /// Advance the routine until the next suspension point or completion.
    ///
    /// Runs in bounded time proportional to the user code between two
    /// consecutive suspension points. Must not allocate. Falling off the
    /// end of `step` without hitting a suspension primitive is treated as
    /// an implicit [`end!`] (spec.md §9's Open Question, resolved).
    fn step(&mut self, clock: &dyn Clock) -> Status;
}

/// Suspend unconditionally; the scheduler may run other routines before
/// resuming this one on the next sweep.
///
/// `$self` must have `resume: u32` and `status: Status` fields that its
/// `Routine` impl's `status()` reads back. Expands to: record the resume
/// label, set status, return — exactly the three steps spec.md §4.2 names,
/// plus a `log::trace!` the runtime never promotes to real I/O.
#[macro_export]
macro_rules! yield_now {
    ($self:expr, $next:expr) => {{
        $self.resume = $next;
        $self.status = $crate::Status::Yielding;
        ::log::trace!("{} yielding", $self.name());
        return $crate::Status::Yielding;
    }};
}

/// Poll `$cond` on every resumption; fall through the first time it is
/// `true`, otherwise re-suspend at the same label.
///
/// Unlike [`yield_now!`] and [`delay_ms!`], a true `$cond` does **not**
/// return — execution falls through to whatever code follows in the same
/// `step` call, matching spec.md's "if true, fall through."
#[macro_export]
macro_rules! await_until {
    ($self:expr, $cond:expr, $next:expr) => {{
        if !($cond) {
            $self.resume = $next;
            $self.status = $crate::Status::Awaiting;
            ::log::trace!("{} awaiting", $self.name());
            return $crate::Status::Awaiting;
        }
    }};
}

/// Suspend until at least `$ms` milliseconds of host clock time have
/// elapsed. Spurious resumption (clock ticks before the deadline) is safe:
/// the deadline is re-checked and the routine re-suspends at the same
/// label if it fired early.
#[macro_export]
macro_rules! delay_ms {
    ($self:expr, $clock:expr, $ms:expr, $next:expr) => {{
        $self.wake_millis = $clock.now_ms().wrapping_add($ms);
        $self.resume = $next;
        $self.status = $crate::Status::Delaying;
        ::log::trace!("{} delaying {}ms", $self.name(), $ms);
        return $crate::Status::Delaying;
    }};
}

/// Resume label [`end!`] writes instead of an ordinary suspension label.
///
/// A routine's own labels are whatever small integers its `step` dispatch
/// uses; this value is reserved so the *next* invocation of `step` — the
/// one the scheduler makes because `Ending` is reported as ready — can
/// recognize "this routine already said END" and finalize to `Ended`
/// without falling into any of the routine's own match arms and re-running
/// the body logic that led up to `end!` in the first place.
pub const EXIT_RESUME: u32 = u32::MAX;

/// Terminate the routine. The next `step` (run once more by the scheduler
/// because `Ending` is reported as ready) transitions it to `Ended`, and it
/// is never stepped again.
///
/// Every `step` dispatch that calls `end!` must include
/// `$crate::routine::EXIT_RESUME => $crate::end_reached!(self),` as a match
/// arm ahead of its catch-all, so that second invocation is handled instead
/// of re-entering the routine's own labels.
#[macro_export]
macro_rules! end {
    ($self:expr) => {{
        $self.resume = $crate::routine::EXIT_RESUME;
        $self.status = $crate::Status::Ending;
        ::log::debug!("{} ending", $self.name());
        return $crate::Status::Ending;
    }};
}

/// Match-arm body for [`EXIT_RESUME`]: finalize an `Ending` routine to
/// `Ended` and return, without touching any of the routine's own state.
/// The body between the original `end!` call and this point already ran
/// once, on the step where `end!` was issued — this arm exists only to
/// complete the handshake on the following step.
#[macro_export]
macro_rules! end_reached {
    ($self:expr) => {{
        $self.status = $crate::Status::Ended;
        ::log::debug!("{} ended", $self.name());
        return $crate::Status::Ended;
    }};
}
