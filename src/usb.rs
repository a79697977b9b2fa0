//! Implements the USB HID device and task transporting [KeyboardReport]s to
//! the host. Mostly lifted from [embassy_usb] examples.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::macros;
use crate::UPDATES_CHANNEL;

use embassy_futures::join::join;
use embassy_rp::{
    bind_interrupts,
    peripherals::USB,
    usb::{Driver, InterruptHandler},
};
use embassy_usb::{
    class::hid::{HidReaderWriter, ReportId, RequestHandler, State as HidState},
    control::OutResponse,
    Builder, Handler, UsbDevice,
};
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use static_cell::StaticCell;

type MyDriver = Driver<'static, USB>;
type MyUsbDevice = UsbDevice<'static, MyDriver>;
type MyHidReaderWriter = HidReaderWriter<'static, MyDriver, 1, 8>;

bind_interrupts!(pub(crate) struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

pub fn get_device(driver: MyDriver) -> (MyUsbDevice, MyHidReaderWriter) {
    let mut config = embassy_usb::Config::new(0xfeed, 0x1357);
    config.manufacturer = Some("Hyper 7");
    config.product = Some("Hyper 7 v3 Keyboard");
    config.serial_number = Some("003");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    static DEVICE_HANDLER: StaticCell<MyDeviceHandler> = StaticCell::new();

    // Create embassy-usb DeviceBuilder using the driver and config.
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
    let mut builder = Builder::new(
        driver,
        config,
        &mut CONFIG_DESC.init([0; 256])[..],
        &mut BOS_DESC.init([0; 256])[..],
        &mut [], // no msos descriptors
        &mut CONTROL_BUF.init([0; 128])[..],
    );

    static STATE: StaticCell<HidState> = StaticCell::new();

    builder.handler(DEVICE_HANDLER.init(MyDeviceHandler::new()));

    let config = embassy_usb::class::hid::Config {
        report_descriptor: KeyboardReport::desc(),
        request_handler: None,
        poll_ms: 60,
        max_packet_size: 64,
    };
    let hid = HidReaderWriter::<_, 1, 8>::new(&mut builder, STATE.init(HidState::new()), config);

    (builder.build(), hid)
}

#[embassy_executor::task]
pub async fn run(mut usb: MyUsbDevice, hid: MyHidReaderWriter) {
    // Run the USB device.
    let usb_fut = usb.run();

    let (reader, mut writer) = hid.split();

    let in_fut = async {
        let mut last_report: KeyboardReport = KeyboardReport::default();
        loop {
            let report = UPDATES_CHANNEL.receive().await;
            if report != last_report {
                match writer.write_serialize(&report).await {
                    Ok(()) => {}
                    Err(_e) => {} //warn!("Failed to send report: {:?}", e),
                };

                last_report = report;
            }
        }
    };

    let out_fut = async {
        static REQUEST_HANDLER: StaticCell<MyRequestHandler> = StaticCell::new();
        reader.run(false, REQUEST_HANDLER.init(MyRequestHandler {})).await;
    };

    // Run everything concurrently.
    join(usb_fut, join(in_fut, out_fut)).await;
}

struct MyRequestHandler;

impl RequestHandler for MyRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        // Lock-state LED report from the host.
        if let (ReportId::Out(0), [leds, ..]) = (id, data) {
            macros::led_state_changed(*leds);
        }
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _dur: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

struct MyDeviceHandler {
    configured: AtomicBool,
}

impl MyDeviceHandler {
    fn new() -> Self {
        MyDeviceHandler {
            configured: AtomicBool::new(false),
        }
    }
}

impl Handler for MyDeviceHandler {
    fn enabled(&mut self, _enabled: bool) {
        self.configured.store(false, Ordering::Relaxed);
    }

    fn reset(&mut self) {
        self.configured.store(false, Ordering::Relaxed);
    }

    fn addressed(&mut self, _addr: u8) {
        self.configured.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        self.configured.store(configured, Ordering::Relaxed);
    }
}
