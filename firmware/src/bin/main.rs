#![no_main]
#![no_std]

use edge_logger as _; // global logger + panicking-behavior + memory layout
use cortex_m::peripheral::DWT;
use rtic::cyccnt::U32Ext as _;

use core::fmt::Write;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use stm32f4xx_hal::gpio::gpioa::PA7;
use stm32f4xx_hal::gpio::gpiob::PB1;
use stm32f4xx_hal::gpio::{Input, Output, PullUp, PushPull};
use stm32f4xx_hal::otg_fs::*;
use stm32f4xx_hal::prelude::*;
use stm32f4xx_hal::stm32;
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use edge_capture::record::{self, BannerText, RecordLine};
use edge_capture::{
    Banner, CaptureConfig, CaptureConsumer, CaptureSource, DeltaTracker, DropMonitor, EventQueue,
    Requests, RunStart, Toggle, Transition, CAPTURE_BUFFER_SIZE,
};
use edge_logger::tim3::Tim3Capture;
use edge_logger::transport::write_lossy;

const SECOND: u32 = 84_000_000;

const HEARTBEAT_PERIOD: u32 = SECOND;
const BUTTON_PERIOD: u32 = SECOND / 100;

const DEBOUNCE_SAMPLES: u16 = 5; // 50 ms at BUTTON_PERIOD

type Queue = EventQueue<CAPTURE_BUFFER_SIZE>;
type Capture = CaptureSource<Tim3Capture>;
type Serial = SerialPort<'static, UsbBusType>;
type Led = PA7<Output<PushPull>>;
type Button = PB1<Input<PullUp>>;

/// Requests from the timed tasks, acted upon by `idle`, the only writer to
/// the serial port.
pub struct Control {
    requests: Requests,
    heartbeat_due: bool,
}

impl Control {
    const fn new() -> Self {
        Control {
            requests: Requests::new(),
            heartbeat_due: false,
        }
    }
}

#[rtic::app(device = stm32f4xx_hal::stm32, peripherals = true, monotonic = rtic::cyccnt::CYCCNT)]
const APP: () = {
    struct Resources {
        capture: Capture,
        queue: Queue,
        led: Led,
        button: Button,
        #[init(Toggle::new(DEBOUNCE_SAMPLES))]
        toggle: Toggle,
        #[init(Control::new())]
        control: Control,
        banner: Banner,
        serial: Serial,
        usb_dev: UsbDevice<'static, UsbBusType>,
    }

    #[init(schedule = [heartbeat, poll_button])]
    fn init(cx: init::Context) -> init::LateResources {
        static mut EP_MEMORY: [u32; 1024] = [0; 1024];
        static mut USB_BUS: Option<UsbBusAllocator<UsbBusType>> = None;

        let mut core: rtic::Peripherals = cx.core;
        let device: stm32::Peripherals = cx.device;

        // enable CYCCNT
        core.DCB.enable_trace();
        DWT::unlock();
        core.DWT.enable_cycle_counter();

        let gpioa = device.GPIOA.split();
        let gpiob = device.GPIOB.split();

        let tim3 = Tim3Capture::new(device.TIM3, gpioa.pa6.into_alternate_af2(), &device.RCC);

        let rcc = device.RCC.constrain().cfgr.sysclk(84.mhz()).hclk(84.mhz());
        let clocks = rcc.freeze();

        let mut led = gpioa.pa7.into_push_pull_output();
        led.set_low().unwrap();
        let button = gpiob.pb1.into_pull_up_input();

        // interrupts are still masked here, nothing sees a half-armed timer
        let mut queue = Queue::new();
        let mut capture = CaptureSource::new(tim3, CaptureConfig::BUILD);
        capture.initialize(&mut queue);

        // APB1 timers run at twice the bus clock when the bus is divided
        let tick_hz = if clocks.ppre1() == 1 {
            clocks.pclk1().0
        } else {
            2 * clocks.pclk1().0
        };
        let banner = Banner {
            tick_hz,
            noise_filter: capture.config().noise_filter,
            capacity: CAPTURE_BUFFER_SIZE,
        };
        defmt::info!(
            "capture armed: {:u32} ticks/s, noise filter {:bool}, {:u32} slots",
            tick_hz,
            banner.noise_filter,
            Queue::usable() as u32
        );

        let usb = USB {
            usb_global: device.OTG_FS_GLOBAL,
            usb_device: device.OTG_FS_DEVICE,
            usb_pwrclk: device.OTG_FS_PWRCLK,
            pin_dm: gpioa.pa11.into_alternate_af10(),
            pin_dp: gpioa.pa12.into_alternate_af10(),
        };

        *USB_BUS = Some(UsbBus::new(usb, &mut EP_MEMORY[..]));

        let serial = usbd_serial::SerialPort::new(USB_BUS.as_ref().unwrap());

        let usb_dev = UsbDeviceBuilder::new(USB_BUS.as_ref().unwrap(), UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("Fake company")
            .product("Edge logger")
            .serial_number("TEST")
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();

        let now = cx.start;
        cx.schedule
            .heartbeat(now + HEARTBEAT_PERIOD.cycles())
            .unwrap();
        cx.schedule
            .poll_button(now + BUTTON_PERIOD.cycles())
            .unwrap();

        init::LateResources {
            capture,
            queue,
            led,
            button,
            banner,
            serial,
            usb_dev,
        }
    }

    #[idle(resources = [queue, control, serial, banner])]
    fn idle(cx: idle::Context) -> ! {
        let mut events = CaptureConsumer::new(cx.resources.queue);
        let mut control = cx.resources.control;
        let mut serial = cx.resources.serial;
        let banner: &Banner = cx.resources.banner;

        let mut logging = false;
        let mut deltas = DeltaTracker::new();
        let mut drops = DropMonitor::starting_at(events.dropped_count());
        let mut line = RecordLine::new();

        loop {
            while let Some(transition) =
                control.lock(|control: &mut Control| control.requests.take())
            {
                match transition {
                    Transition::Start => {
                        let stale = events.discard();
                        let dropped = events.dropped_count();
                        deltas.reset();
                        drops = DropMonitor::starting_at(dropped);
                        logging = true;

                        let mut text = BannerText::new();
                        let _ = write!(text, "{}", RunStart { banner, dropped });
                        write_lossy(&mut serial, text.as_bytes());
                        defmt::info!("logging started, {:u32} queued events discarded", stale as u32);
                    }
                    Transition::Stop => {
                        logging = false;

                        line.clear();
                        let _ = write!(line, "{}\r\n", record::STOP);
                        write_lossy(&mut serial, line.as_bytes());
                        defmt::info!("logging stopped, {:u32} events dropped", drops.total());
                    }
                }
            }

            let heartbeat_due = control.lock(|control: &mut Control| {
                core::mem::replace(&mut control.heartbeat_due, false)
            });
            if heartbeat_due && !logging {
                line.clear();
                let _ = write!(line, "{}\r\n", record::HEARTBEAT);
                write_lossy(&mut serial, line.as_bytes());
            }

            // at most one queue's worth per pass so button requests are not
            // starved under a steady event rate; the queue lock only covers
            // the pop, formatting and USB run unlocked
            for _ in 0..Queue::usable() {
                let event = match events.pop() {
                    Some(event) => event,
                    None => break,
                };
                let dropped = events.dropped_count();
                let lost = drops.observe(dropped);
                if lost > 0 {
                    defmt::warn!("{:u16} events dropped", lost);
                }
                if !logging {
                    continue;
                }

                let record = deltas.record(event, dropped);
                line.clear();
                let _ = write!(line, "{}\r\n", record);
                write_lossy(&mut serial, line.as_bytes());
            }
        }
    }

    #[task(binds = TIM3, priority = 3, resources = [capture, queue])]
    fn tim3(cx: tim3::Context) {
        let capture: &mut Capture = cx.resources.capture;
        let queue: &mut Queue = cx.resources.queue;
        let _ = capture.service(queue);
    }

    #[task(binds = OTG_FS, priority = 2, resources = [serial, usb_dev])]
    fn usb_handler(cx: usb_handler::Context) {
        let serial: &mut Serial = cx.resources.serial;
        let usb_dev: &mut UsbDevice<UsbBusType> = cx.resources.usb_dev;
        if !usb_dev.poll(&mut [serial]) {
            return;
        }

        // nothing is expected from the host, keep the OUT endpoint drained
        let mut buf = [0u8; 64];
        match serial.read(&mut buf[..]) {
            Ok(_) | Err(UsbError::WouldBlock) => {}
            Err(_) => {
                defmt::warn!("usb read error");
            }
        };
    }

    #[task(resources = [button, led, toggle, control], schedule = [poll_button])]
    fn poll_button(cx: poll_button::Context) {
        let button: &mut Button = cx.resources.button;
        let led: &mut Led = cx.resources.led;
        let toggle: &mut Toggle = cx.resources.toggle;
        let control: &mut Control = cx.resources.control;

        if let Some(transition) = toggle.sample(button.is_low().unwrap()) {
            match transition {
                Transition::Start => led.set_high().unwrap(),
                Transition::Stop => led.set_low().unwrap(),
            }
            control.requests.push(transition);
        }

        cx.schedule
            .poll_button(cx.scheduled + BUTTON_PERIOD.cycles())
            .unwrap();
    }

    #[task(resources = [control], schedule = [heartbeat])]
    fn heartbeat(cx: heartbeat::Context) {
        let control: &mut Control = cx.resources.control;
        control.heartbeat_due = true;

        cx.schedule
            .heartbeat(cx.scheduled + HEARTBEAT_PERIOD.cycles())
            .unwrap();
    }

    extern "C" {
        fn EXTI0();
    }
};
