//! Bare-metal-flavored demo: a `log::Log` sink that writes to a PL011 UART
//! over MMIO, the way the QEMU `virt` machine exposes its serial port.
//!
//! This binary links against `std` purely so it can run here as an
//! ordinary demo executable; the logger and scheduler code below make no
//! std calls and would compile unchanged in a real `no_std` image. The
//! register block is overlaid onto the MMIO window with `Volatile<u32>`
//! fields, and the flag register is polled before every write to respect
//! the transmit-FIFO-full bit — the same shape as the `read_volatile`/
//! `write_volatile` pair a hand-rolled PL011 driver needs on real
//! hardware, just routed through the `volatile` crate's wrapper type.

use volatile::Volatile;

use corun::{end, end_reached, routine::EXIT_RESUME, yield_now, Clock, Routine, Scheduler, Status};

const UART_BASE: usize = 0x0900_0000;
const UART_FR_TXFF: u32 = 1 << 5;

/// Register layout of a PL011 UART, in MMIO order. `Volatile<u32>` forces a
/// genuine load/store at each field's address instead of letting the
/// compiler reorder or elide the access the way it would for a plain
/// `u32`.
#[repr(C)]
struct UartRegisters {
    dr: Volatile<u32>,
    _reserved: [u32; 5],
    fr: Volatile<u32>,
}

/// PL011 UART driver addressing QEMU's `virt` machine MMIO window.
struct Uart {
    base: usize,
}

impl Uart {
    const fn new(base: usize) -> Self {
        Uart { base }
    }

    /// # Safety
    /// Valid only while `self.base` points at a mapped, unaliased PL011
    /// register block — true by construction once paging is set up on
    /// real hardware.
    unsafe fn registers(&self) -> &mut UartRegisters {
        &mut *(self.base as *mut UartRegisters)
    }

    fn write_byte(&self, byte: u8) {
        unsafe {
            let regs = self.registers();
            while regs.fr.read() & UART_FR_TXFF != 0 {
                core::hint::spin_loop();
            }
            regs.dr.write(byte as u32);
        }
    }

    fn write_str(&self, s: &str) {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
    }
}

/// In this demo binary `UART_BASE` is not actually mapped (there is no
/// real PL011 behind it), so the sink is swapped for a stdout mirror
/// unless the `bare-metal-mmio` cfg is set by a build targeting real
/// hardware. This keeps the demo runnable on a dev machine while the MMIO
/// path stays exactly what a bare-metal build would use.
struct UartLogger {
    uart: Uart,
}

impl log::Log for UartLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if cfg!(bare_metal_mmio) {
            self.uart.write_str(&alloc_free_format(record));
        } else {
            println!("(uart) [{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Formats a record into a small stack buffer without allocating, the way
/// a `no_std` sink has to.
fn alloc_free_format(record: &log::Record) -> heapless::String<128> {
    use core::fmt::Write;
    let mut buf: heapless::String<128> = heapless::String::new();
    let _ = write!(buf, "[{}] {}\n", record.level(), record.args());
    buf
}

static UART_LOGGER: UartLogger = UartLogger { uart: Uart::new(UART_BASE) };

struct Blinker {
    resume: u32,
    status: Status,
    blinks: u32,
}

impl Routine for Blinker {
    fn name(&self) -> &str {
        "blinker"
    }

    fn status(&self) -> Status {
        self.status
    }

    fn step(&mut self, _clock: &dyn Clock) -> Status {
        loop {
            match self.resume {
                0 => {
                    self.blinks += 1;
                    log::info!("blink {}", self.blinks);
                    if self.blinks >= 5 {
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

struct ZeroClock;
impl Clock for ZeroClock {
    fn now_ms(&self) -> u32 {
        0
    }
}

fn main() {
    log::set_logger(&UART_LOGGER).expect("logger already set");
    log::set_max_level(log::LevelFilter::Info);

    let clock = ZeroClock;
    let mut blinker = Blinker { resume: 0, status: Status::Yielding, blinks: 0 };
    let mut sched: Scheduler<'_, 1> = Scheduler::new();
    sched.register(&mut blinker).unwrap();

    while sched.run_one(&clock).is_some() {}
}
