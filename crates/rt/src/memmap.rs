//! Register map of the reference board.
//!
//! One console UART, one general-purpose timer wired to interrupt line 68,
//! the interrupt controller, and the clock gate feeding the timer module.
//! Register offsets are byte offsets from the block base; everything is
//! word-accessed.

/// PL011-subset console UART.
pub const UART0_BASE: u32 = 0x101F_1000;
/// Data register. Low 8 bits carry the byte.
pub const UART_DR: u32 = 0x00;
/// Flag register.
pub const UART_FR: u32 = 0x18;
/// FR: transmit FIFO full.
pub const UART_FR_TXFF: u32 = 1 << 5;
/// FR: receive FIFO empty.
pub const UART_FR_RXFE: u32 = 1 << 4;

/// General-purpose timer block.
pub const TIMER_BASE: u32 = 0x4804_0000;
/// Interrupt status, write-1-to-clear.
pub const TIMER_TISR: u32 = 0x28;
/// Interrupt enable.
pub const TIMER_TIER: u32 = 0x2C;
/// Control: bit 0 starts the counter, bit 1 selects auto-reload.
pub const TIMER_TCLR: u32 = 0x38;
/// Live counter. Counts up; the interrupt fires on wrap past `u32::MAX`.
pub const TIMER_TCRR: u32 = 0x3C;
/// Latched into TCRR on overflow when auto-reload is set.
pub const TIMER_TLDR: u32 = 0x40;
/// Overflow bit, shared by TISR and TIER.
pub const TIMER_OVF: u32 = 1 << 1;

/// Interrupt controller.
pub const INTC_BASE: u32 = 0x4820_0000;
/// Writing 1 acknowledges the active interrupt and re-enables delivery.
pub const INTC_CONTROL: u32 = 0x48;
/// Write-1-to-unmask for lines 64..96.
pub const INTC_MIR_CLEAR2: u32 = 0xC8;
/// Priority/routing byte for the timer line.
pub const INTC_ILR_TIMER: u32 = 0x110;

/// The timer's interrupt line.
pub const TIMER_IRQ: u32 = 68;
/// Its bit within the bank-2 mask registers.
pub const TIMER_IRQ_BIT: u32 = 1 << (TIMER_IRQ - 64);

/// Clock manager.
pub const CM_BASE: u32 = 0x44E0_0000;
/// Timer module clock gate; writing 0x2 enables the module.
pub const CM_TIMER_CLKCTRL: u32 = 0x80;

/// Board crystal.
pub const CRYSTAL_HZ: u32 = 24_000_000;
/// The timer counts at crystal / 2; the divider is fixed in the clock tree.
pub const TIMER_CLOCK_DIV: u32 = 2;
