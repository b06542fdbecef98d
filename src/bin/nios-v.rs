//! Light-cycle firmware for the DE10-Lite Nios V computer.
//!
//! Boots, draws the board, arms the machine timer and then busy-polls
//! frames until one side reaches nine points. Logs go out over the JTAG
//! UART as defmt frames.

#![no_std]
#![no_main]

use core::{
    arch::{
        asm,
        global_asm,
    },
    cell::{
        RefCell,
        UnsafeCell,
    },
};

use embassy_sync::blocking_mutex::{
    Mutex,
    raw::CriticalSectionRawMutex,
};
use lightcycle::{
    Handlers,
    Scheduler,
    SharedState,
    de10::{
        HexDisplay,
        Keys,
        MachineTimer,
        Peripherals,
        PixelBuffer,
        RedLeds,
        Switches,
    },
    irq::{
        MIE_MASK,
        MSTATUS_MIE,
    },
    mk_static,
    pacer,
};

type Game = Scheduler<'static, PixelBuffer, HexDisplay, Switches, RedLeds>;
type TrapDevices = Handlers<MachineTimer, Keys, RedLeds>;

static SHARED: SharedState = SharedState::new();

static HANDLERS: Mutex<CriticalSectionRawMutex, RefCell<Option<TrapDevices>>> =
    Mutex::new(RefCell::new(None));

// ── Reset and trap entry ────────────────────────────────────────────────────

global_asm!(
    r#"
.section .text.init
.global _start

_start:
    .option push
    .option norelax
    la      gp, __global_pointer$
    .option pop
    la      sp, _stack_top

    la      t0, __bss_start
    la      t1, __bss_end
1:
    bgeu    t0, t1, 2f
    sw      zero, 0(t0)
    addi    t0, t0, 4
    j       1b
2:
    la      t0, _trap_entry
    csrw    mtvec, t0

    call    boot_main
3:
    wfi
    j       3b

.section .text
.align 4
.global _trap_entry

_trap_entry:
    addi    sp, sp, -64
    sw      ra, 0(sp)
    sw      t0, 4(sp)
    sw      t1, 8(sp)
    sw      t2, 12(sp)
    sw      a0, 16(sp)
    sw      a1, 20(sp)
    sw      a2, 24(sp)
    sw      a3, 28(sp)
    sw      a4, 32(sp)
    sw      a5, 36(sp)
    sw      a6, 40(sp)
    sw      a7, 44(sp)
    sw      t3, 48(sp)
    sw      t4, 52(sp)
    sw      t5, 56(sp)
    sw      t6, 60(sp)

    csrr    a0, mcause
    call    trap_handler

    lw      ra, 0(sp)
    lw      t0, 4(sp)
    lw      t1, 8(sp)
    lw      t2, 12(sp)
    lw      a0, 16(sp)
    lw      a1, 20(sp)
    lw      a2, 24(sp)
    lw      a3, 28(sp)
    lw      a4, 32(sp)
    lw      a5, 36(sp)
    lw      a6, 40(sp)
    lw      a7, 44(sp)
    lw      t3, 48(sp)
    lw      t4, 52(sp)
    lw      t5, 56(sp)
    lw      t6, 60(sp)
    addi    sp, sp, 64
    mret
"#
);

#[unsafe(no_mangle)]
extern "C" fn trap_handler(mcause: u32) {
    let serviced = HANDLERS.lock(|handlers| {
        handlers
            .borrow_mut()
            .as_mut()
            .and_then(|h| h.dispatch(mcause, &SHARED))
    });
    if serviced.is_none() {
        defmt::warn!("unexpected trap, mcause {=u32:#x}", mcause);
    }
}

// ── CSR access ──────────────────────────────────────────────────────────────

fn enable_interrupts(mie: u32) {
    // SAFETY: only sets enable bits; the handler table is installed first.
    unsafe {
        asm!("csrs mie, {0}", in(reg) mie);
        asm!("csrs mstatus, {0}", in(reg) MSTATUS_MIE);
    }
}

fn disable_interrupts(mie: u32) {
    // SAFETY: clearing enable bits cannot break memory safety.
    unsafe { asm!("csrc mie, {0}", in(reg) mie) };
}

// ── Critical sections ───────────────────────────────────────────────────────

/// Single hart: masking `mstatus.MIE` excludes every handler.
struct MachineInterrupts;

critical_section::set_impl!(MachineInterrupts);

unsafe impl critical_section::Impl for MachineInterrupts {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus: u32;
        // SAFETY: atomically clears MIE and returns the previous value.
        unsafe { asm!("csrrc {0}, mstatus, {1}", out(reg) mstatus, in(reg) MSTATUS_MIE) };
        mstatus & MSTATUS_MIE != 0
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled {
            // SAFETY: restores the state saved by `acquire`.
            unsafe { asm!("csrs mstatus, {0}", in(reg) MSTATUS_MIE) };
        }
    }
}

// ── defmt over the JTAG UART ────────────────────────────────────────────────

#[defmt::global_logger]
struct JtagLogger;

struct LoggerState {
    restore: UnsafeCell<critical_section::RestoreState>,
    encoder: UnsafeCell<defmt::Encoder>,
}

// SAFETY: only touched between `acquire` and `release`, inside a critical
// section on a single hart.
unsafe impl Sync for LoggerState {}

static LOGGER: LoggerState = LoggerState {
    restore: UnsafeCell::new(critical_section::RestoreState::invalid()),
    encoder: UnsafeCell::new(defmt::Encoder::new()),
};

fn uart_write(bytes: &[u8]) {
    // SAFETY: the logger is the only writer of the UART.
    let mut uart = unsafe { Peripherals::steal() }.uart;
    uart.write_bytes(bytes);
}

unsafe impl defmt::Logger for JtagLogger {
    fn acquire() {
        // SAFETY: paired with the `release` below.
        let restore = unsafe { critical_section::acquire() };
        // SAFETY: interrupts are masked from here until `release`.
        unsafe {
            *LOGGER.restore.get() = restore;
            (*LOGGER.encoder.get()).start_frame(uart_write);
        }
    }

    unsafe fn flush() {}

    unsafe fn release() {
        // SAFETY: called after `acquire`, still inside its critical section.
        unsafe {
            (*LOGGER.encoder.get()).end_frame(uart_write);
            critical_section::release(*LOGGER.restore.get());
        }
    }

    unsafe fn write(bytes: &[u8]) {
        // SAFETY: as for `release`.
        unsafe { (*LOGGER.encoder.get()).write(bytes, uart_write) };
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    defmt::error!("{}", defmt::Display2Format(info));
    loop {
        // SAFETY: parks the hart.
        unsafe { asm!("wfi") };
    }
}

// ── Entry ───────────────────────────────────────────────────────────────────

#[unsafe(no_mangle)]
extern "C" fn boot_main() -> ! {
    // SAFETY: runs once, before interrupts are enabled.
    let Peripherals {
        pixels,
        hex,
        leds,
        switches,
        mut keys,
        mut timer,
        ..
    } = unsafe { Peripherals::steal() };
    // The trap side gets its own LED handle; every write replaces the mask.
    // SAFETY: as above.
    let trap_leds = unsafe { Peripherals::steal() }.leds;

    keys.init();

    let game = mk_static!(Game, Scheduler::new(&SHARED, pixels, hex, switches, leds));
    let speed = game.start();
    defmt::info!("lightcycle up, {=u32} Hz", speed.rate.raw());

    pacer::arm(&mut timer, SHARED.period());
    HANDLERS.lock(|handlers| {
        *handlers.borrow_mut() = Some(Handlers {
            timer,
            keys,
            indicator: trap_leds,
        });
    });
    enable_interrupts(MIE_MASK);

    game.run();

    disable_interrupts(MIE_MASK);
    defmt::info!("match over");
    loop {
        // SAFETY: parks the hart.
        unsafe { asm!("wfi") };
    }
}
