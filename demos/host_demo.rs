//! Hosted walkthrough of the scheduler, wired to `std::time::Instant`.
//!
//! Reproduces three of the spec's end-to-end scenarios against a real
//! wall-clock `Clock` instead of a fake one, to show the library working
//! outside tests. Run with `cargo run --bin host_demo --features std`.

use std::time::Instant;

use corun::{delay_ms, end, end_reached, routine::EXIT_RESUME, yield_now, Clock, Routine, Scheduler, Status};

/// Prints records to stdout; stands in for whatever sink a real host wires
/// the `log` facade to.
struct StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLogger = StdoutLogger;

/// Wraps `Instant` as a [`Clock`], truncating to milliseconds since the
/// demo started. Good enough for a demo; a real embedded host would read a
/// hardware timer instead.
struct WallClock {
    start: Instant,
}

impl WallClock {
    fn new() -> Self {
        WallClock { start: Instant::now() }
    }
}

impl Clock for WallClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// `LOOP { log(name); YIELD; }` from scenario 1.
struct Yielder {
    name: &'static str,
    resume: u32,
    status: Status,
}

impl Yielder {
    fn new(name: &'static str) -> Self {
        Yielder { name, resume: 0, status: Status::Yielding }
    }
}

impl Routine for Yielder {
    fn name(&self) -> &str {
        self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    log::info!("{}", self.name);
                    yield_now!(self, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

/// Three yielders, one of which ends itself after its third step —
/// scenario 6.
struct SelfEndingYielder {
    name: &'static str,
    resume: u32,
    status: Status,
    steps: u32,
    end_after: u32,
}

impl Routine for SelfEndingYielder {
    fn name(&self) -> &str {
        self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    self.steps += 1;
                    log::info!("{} step {}", self.name, self.steps);
                    if self.steps >= self.end_after {
                        end!(self);
                    }
                    yield_now!(self, 0);
                }
                EXIT_RESUME => end_reached!(self),
                _ => unreachable!(),
            }
        }
    }
}

/// `LOOP { log("tick"); DELAY(100); }` from scenario 2.
struct Ticker {
    resume: u32,
    status: Status,
    wake_millis: u32,
}

impl Routine for Ticker {
    fn name(&self) -> &str {
        "ticker"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn wake_millis(&self) -> u32 {
        self.wake_millis
    }

    fn step(&mut self, clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    log::info!("tick");
                    delay_ms!(self, clock, 100u32, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

fn scenario_1_two_yielders() {
    println!("-- scenario 1: two yielders --");
    let clock = WallClock::new();
    let mut a = Yielder::new("A");
    let mut b = Yielder::new("B");

    let mut sched: Scheduler<'_, 2> = Scheduler::new();
    sched.register(&mut a).unwrap();
    sched.register(&mut b).unwrap();

    for _ in 0..6 {
        sched.run_one(&clock);
    }
}

fn scenario_2_delay() {
    println!("-- scenario 2: delay --");
    let clock = WallClock::new();
    let mut ticker = Ticker { resume: 0, status: Status::Yielding, wake_millis: 0 };

    let mut sched: Scheduler<'_, 1> = Scheduler::new();
    sched.register(&mut ticker).unwrap();

    for _ in 0..5 {
        std::thread::sleep(std::time::Duration::from_millis(100));
        sched.run_one(&clock);
    }
}

fn scenario_6_termination() {
    println!("-- scenario 6: termination --");
    let clock = WallClock::new();
    let mut x = Yielder::new("X");
    let mut y = SelfEndingYielder { name: "Y", resume: 0, status: Status::Yielding, steps: 0, end_after: 3 };
    let mut z = Yielder::new("Z");

    let mut sched: Scheduler<'_, 3> = Scheduler::new();
    sched.register(&mut x).unwrap();
    sched.register(&mut y).unwrap();
    sched.register(&mut z).unwrap();

    for _ in 0..30 {
        sched.run_one(&clock);
    }
}

fn main() {
    log::set_logger(&LOGGER).expect("logger already set");
    log::set_max_level(log::LevelFilter::Info);
    scenario_1_two_yielders();
    scenario_2_delay();
    scenario_6_termination();
}
