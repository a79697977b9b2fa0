//! Firmware for the Hyper 7 keyboard, an RP2040 build of a Space Cadet
//! style board, using the [embassy_rp] framework.

#![no_main]
#![no_std]

mod host;
mod keycode;
mod keymap;
mod leader;
mod macros;
mod scan;
mod unicode;
mod usb;

use embassy_executor::Spawner;
use embassy_rp::{
    gpio::{Input, Level, OutputOpenDrain, Pull},
    pwm::{Pwm, SetDutyCycle},
};
use embassy_sync::channel::Channel;
use embassy_time::{block_for, Duration};

use panic_reset as _;

macro_rules! row_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(OutputOpenDrain::new($dev.$pin, Level::High)),* ]}
}
macro_rules! column_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(Input::new($dev.$pin, Pull::Up)),* ]}
}

/// Channel for the matrix task to send keyboard reports to [usb], and
/// ultimately to the host.
pub(crate) static UPDATES_CHANNEL: Channel<RawMutex, Update, 1> = Channel::new();
type RawMutex = embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
type Update = usbd_hid::descriptor::KeyboardReport;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let led_pin_onboard = Pwm::new_output_b(p.PWM_SLICE4, p.PIN_25, Default::default());

    let row_pins: [OutputOpenDrain; keymap::MATRIX_ROWS] = row_pins!(p;
        PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_6,
        PIN_7, PIN_8, PIN_9, PIN_10, PIN_11, PIN_12, PIN_13
    );
    let mut column_pins: [Input; keymap::MATRIX_COLS] = column_pins!(p;
        PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19, PIN_20,
        PIN_21, PIN_22, PIN_23, PIN_24, PIN_26, PIN_27, PIN_28
    );
    for pin in &mut column_pins {
        pin.set_schmitt(true);
    }

    spawner
        .spawn(run_matrix(row_pins, column_pins, led_pin_onboard))
        .expect("spawn matrix");

    let usb_driver = embassy_rp::usb::Driver::new(p.USB, usb::Irqs);
    let (usb_device, hid) = usb::get_device(usb_driver);
    spawner.spawn(usb::run(usb_device, hid)).expect("spawn usb");
}

#[embassy_executor::task]
async fn run_matrix(
    mut rows: [OutputOpenDrain<'static>; keymap::MATRIX_ROWS],
    mut columns: [Input<'static>; keymap::MATRIX_COLS],
    mut scan_led: Pwm<'static>,
) {
    let mut scanner = scan::Scanner::new();
    loop {
        let mut snapshot: scan::MatrixSnapshot = Default::default();
        let mut any_pressed = false;
        for (row_idx, row) in rows.iter_mut().enumerate() {
            row.set_low();
            block_for(Duration::from_micros(100));
            for (column_idx, column) in columns.iter_mut().enumerate() {
                if column.is_low() {
                    snapshot[row_idx] |= 1 << column_idx;
                    any_pressed = true;
                }
            }
            row.set_high();
            block_for(Duration::from_micros(100));
        }
        let _ = scan_led.set_duty_cycle(if any_pressed { 30000 } else { 400 });

        let report = scanner.scan(&snapshot);
        if scanner.take_reset() {
            embassy_rp::rom_data::reset_to_usb_boot(0, 0);
        }
        while let Some(queued) = scanner.next_queued() {
            UPDATES_CHANNEL.send(queued).await;
        }
        UPDATES_CHANNEL.send(report).await;
    }
}
