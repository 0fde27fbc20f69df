//! End-to-end scenarios run through the public API, one test per
//! concrete example a reviewer would want to see reproduced exactly.

use corun::{
    await_until, delay_ms, end, end_reached, routine::EXIT_RESUME, yield_now, Channel, Clock, Routine, Scheduler,
    Status,
};

struct FixedClock(core::cell::Cell<u32>);

impl FixedClock {
    fn new() -> Self {
        FixedClock(core::cell::Cell::new(0))
    }

    fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

type Trace = core::cell::RefCell<heapless::Vec<&'static str, 16>>;

struct Yielder<'a> {
    name: &'static str,
    resume: u32,
    status: Status,
    log: &'a Trace,
}

impl<'a> Routine for Yielder<'a> {
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
                    self.log.borrow_mut().push(self.name).ok();
                    yield_now!(self, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn scenario_1_two_yielders_alternate() {
    let log: Trace = core::cell::RefCell::new(heapless::Vec::new());
    let clock = FixedClock::new();

    let mut a = Yielder { name: "A", resume: 0, status: Status::Yielding, log: &log };
    let mut b = Yielder { name: "B", resume: 0, status: Status::Yielding, log: &log };

    let mut sched: Scheduler<'_, 2> = Scheduler::new();
    sched.register(&mut a).unwrap();
    sched.register(&mut b).unwrap();

    for _ in 0..6 {
        sched.run_one(&clock);
    }

    let trace: heapless::Vec<&str, 16> = log.borrow().clone();
    assert_eq!(trace.as_slice(), ["A", "B", "A", "B", "A", "B"]);
}

struct Ticker {
    resume: u32,
    status: Status,
    wake_millis: u32,
    ticks: u32,
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
                    self.ticks += 1;
                    delay_ms!(self, clock, 100u32, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn scenario_2_delay_100ms_steps_produce_a_tick_each_time() {
    let clock = FixedClock::new();
    let mut ticker = Ticker { resume: 0, status: Status::Yielding, wake_millis: 0, ticks: 0 };
    let mut sched: Scheduler<'_, 1> = Scheduler::new();
    sched.register(&mut ticker).unwrap();

    for _ in 0..5 {
        clock.advance(100);
        sched.run_one(&clock);
    }

    assert_eq!(ticker.ticks, 5);
}

#[test]
fn scenario_2_delay_50ms_steps_undershoot_the_deadline() {
    let clock = FixedClock::new();
    let mut ticker = Ticker { resume: 0, status: Status::Yielding, wake_millis: 0, ticks: 0 };
    let mut sched: Scheduler<'_, 1> = Scheduler::new();
    sched.register(&mut ticker).unwrap();

    for _ in 0..5 {
        clock.advance(50);
        sched.run_one(&clock);
    }

    assert_eq!(ticker.ticks, 3);
}

struct Awaiter {
    resume: u32,
    status: Status,
    ready: bool,
    went: core::cell::Cell<bool>,
}

impl Routine for Awaiter {
    fn name(&self) -> &str {
        "awaiter"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    await_until!(self, self.ready, 0);
                    self.went.set(true);
                    end!(self);
                }
                EXIT_RESUME => end_reached!(self),
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn scenario_3_await_blocks_then_runs_exactly_once() {
    let clock = FixedClock::new();
    let mut awaiter = Awaiter { resume: 0, status: Status::Yielding, ready: false, went: core::cell::Cell::new(false) };
    let mut sched: Scheduler<'_, 1> = Scheduler::new();
    sched.register(&mut awaiter).unwrap();

    for _ in 0..10 {
        sched.run_one(&clock);
    }
    assert!(!awaiter.went.get());
    assert_eq!(awaiter.status, Status::Awaiting);

    awaiter.ready = true;
    sched.run_one(&clock);
    assert!(awaiter.went.get());
    assert_eq!(awaiter.status, Status::Ending);
}

struct ByteWriter<'a> {
    resume: u32,
    status: Status,
    bytes: &'static [u8],
    index: usize,
    channel: &'a core::cell::RefCell<Channel<u8, 4>>,
}

impl<'a> Routine for ByteWriter<'a> {
    fn name(&self) -> &str {
        "writer"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    if self.index >= self.bytes.len() {
                        end!(self);
                    }
                    self.channel.borrow_mut().write(self.bytes[self.index]);
                    self.index += 1;
                    yield_now!(self, 0);
                }
                EXIT_RESUME => end_reached!(self),
                _ => unreachable!(),
            }
        }
    }
}

struct ByteReader<'a> {
    resume: u32,
    status: Status,
    channel: &'a core::cell::RefCell<Channel<u8, 4>>,
    received: core::cell::RefCell<heapless::Vec<u8, 8>>,
}

impl<'a> Routine for ByteReader<'a> {
    fn name(&self) -> &str {
        "reader"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    await_until!(self, self.channel.borrow().can_read(), 0);
                    if let Some(byte) = self.channel.borrow_mut().read() {
                        self.received.borrow_mut().push(byte).ok();
                    }
                    yield_now!(self, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn scenario_4_channel_pipe_delivers_bytes_in_order() {
    let clock = FixedClock::new();
    let channel = core::cell::RefCell::new(Channel::<u8, 4>::new());

    let mut writer = ByteWriter { resume: 0, status: Status::Yielding, bytes: b"Hi\n", index: 0, channel: &channel };
    let mut reader = ByteReader {
        resume: 0,
        status: Status::Yielding,
        channel: &channel,
        received: core::cell::RefCell::new(heapless::Vec::new()),
    };

    let mut sched: Scheduler<'_, 2> = Scheduler::new();
    sched.register(&mut writer).unwrap();
    sched.register(&mut reader).unwrap();

    for _ in 0..20 {
        sched.run_one(&clock);
    }

    assert_eq!(reader.received.borrow().as_slice(), b"Hi\n");
}

#[test]
fn scenario_5_channel_overflow_drops_excess_and_preserves_order() {
    let mut channel: Channel<u8, 2> = Channel::new();

    assert!(channel.write(b'a'));
    assert!(channel.write(b'b'));
    assert!(!channel.write(b'c'));
    assert!(!channel.write(b'd'));
    assert_eq!(channel.len(), 2);

    assert_eq!(channel.read(), Some(b'a'));
    assert_eq!(channel.read(), Some(b'b'));
    assert_eq!(channel.read(), None);
}

struct SelfEndingYielder {
    resume: u32,
    status: Status,
    steps: u32,
    end_after: u32,
}

impl Routine for SelfEndingYielder {
    fn name(&self) -> &str {
        "y"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    self.steps += 1;
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

struct PlainYielder {
    resume: u32,
    status: Status,
    steps: u32,
}

impl Routine for PlainYielder {
    fn name(&self) -> &str {
        "y"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    self.steps += 1;
                    yield_now!(self, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn scenario_6_ended_routine_stops_accumulating_steps() {
    let clock = FixedClock::new();
    let mut x = PlainYielder { resume: 0, status: Status::Yielding, steps: 0 };
    let mut y = SelfEndingYielder { resume: 0, status: Status::Yielding, steps: 0, end_after: 3 };
    let mut z = PlainYielder { resume: 0, status: Status::Yielding, steps: 0 };

    let mut sched: Scheduler<'_, 3> = Scheduler::new();
    sched.register(&mut x).unwrap();
    sched.register(&mut y).unwrap();
    sched.register(&mut z).unwrap();

    // Run enough sweeps for y to reach Ended (3 steps) plus margin.
    for _ in 0..30 {
        sched.run_one(&clock);
    }

    assert_eq!(y.steps, 3);
    assert_eq!(y.status, Status::Ended);
    assert!(x.steps >= 10);
    assert!(z.steps >= 10);
}
