//! corun - cooperative, stackless routine runtime
//!
//! A single-threaded scheduler for routines that suspend via explicit
//! control primitives ([`yield_now!`], [`await_until!`], [`delay_ms!`],
//! [`end!`]) instead of real stacks or OS threads. Built for targets where
//! a preemptive kernel, a heap, or per-task stacks are not an option: every
//! routine carries its own resume point, the scheduler round-robins over a
//! fixed table of them, and nothing here allocates after setup.
//!
//! ```
//! use corun::{delay_ms, end, end_reached, routine::EXIT_RESUME, Clock, Routine, Scheduler, Status};
//!
//! struct Blink { resume: u32, status: Status, wake_millis: u32, toggles: u32 }
//!
//! impl Routine for Blink {
//!     fn name(&self) -> &str { "blink" }
//!     fn status(&self) -> Status { self.status }
//!     fn wake_millis(&self) -> u32 { self.wake_millis }
//!
//!     fn step(&mut self, clock: &dyn Clock) -> Status {
//!         loop {
//!             match self.resume {
//!                 0 => {
//!                     self.toggles += 1;
//!                     if self.toggles >= 3 { end!(self); }
//!                     delay_ms!(self, clock, 10u32, 0);
//!                 }
//!                 EXIT_RESUME => end_reached!(self),
//!                 _ => unreachable!(),
//!             }
//!         }
//!     }
//! }
//!
//! struct TestClock(u32);
//! impl Clock for TestClock { fn now_ms(&self) -> u32 { self.0 } }
//!
//! let mut blink = Blink { resume: 0, status: Status::Yielding, wake_millis: 0, toggles: 0 };
//! let mut sched: Scheduler<'_, 1> = Scheduler::new();
//! sched.register(&mut blink).unwrap();
//!
//! let clock = TestClock(0);
//! sched.run_one(&clock);
//! assert_eq!(blink.toggles, 1);
//! ```
//!
//! Hosted builds (tests, the `demos/` binaries) compile with the standard
//! library; everything else builds `no_std` so the crate stays usable on
//! bare metal.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod channel;
pub mod clock;
pub mod routine;
pub mod scheduler;
pub mod status;

pub use channel::Channel;
pub use clock::{deadline_elapsed, Clock};
pub use routine::{Routine, RoutineId};
pub use scheduler::{Scheduler, SchedulerError};
pub use status::Status;
