//! TouchSynth Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ConsoleSynthSink   LogEventSink   DeviceSystemControl         │
//! │  (SynthSink)        (EventSink)    (SystemControl)             │
//! │  Mpr121 (TouchPort) StatusLed (IndicatorPort)                  │
//! │  EspOneShotTimer (OneShotTimer)  ButtonPin (InputPin)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  SynthService · GestureActions · GestureCore           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button ISR ──▶ EdgeLatch ──▶ ButtonBottomHalf (main loop)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use esp_idf_svc::hal::delay::{Delay, FreeRtos};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use log::{error, info, warn};

use touchsynth::adapters::console::ConsoleSynthSink;
use touchsynth::adapters::log_sink::LogEventSink;
use touchsynth::adapters::system::DeviceSystemControl;
use touchsynth::app::dispatch::GestureActions;
use touchsynth::app::ports::{Colour, IndicatorPort, TimeoutNotifier, TouchPort};
use touchsynth::app::service::SynthService;
use touchsynth::config::SystemConfig;
use touchsynth::drivers::button::{ButtonPin, BUTTON_LATCH};
use touchsynth::drivers::mpr121::Mpr121;
use touchsynth::drivers::one_shot::EspOneShotTimer;
use touchsynth::drivers::status_led::StatusLed;
use touchsynth::error::Error;
use touchsynth::gesture::{ButtonBottomHalf, GestureCore};
use touchsynth::pins;

type Service = SynthService<ConsoleSynthSink, StatusLed, LogEventSink>;

/// Touch read failures are logged on the first and then every this many.
const TOUCH_ERROR_LOG_EVERY: u32 = 500;

fn load_config() -> SystemConfig {
    let Some(json) = option_env!("TOUCHSYNTH_CONFIG_JSON") else {
        info!("Config: defaults");
        return SystemConfig::default();
    };
    match SystemConfig::from_json(json) {
        Ok(cfg) => {
            info!("Config: build-time override applied");
            cfg
        }
        Err(e) => {
            warn!("Config: override rejected ({}), using defaults", Error::from(e));
            SystemConfig::default()
        }
    }
}

fn lock_service(service: &Mutex<Service>) -> MutexGuard<'_, Service> {
    service.lock().unwrap_or_else(|poisoned| {
        warn!("synth service lock poisoned, recovering");
        poisoned.into_inner()
    })
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TouchSynth v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();

    // ── 3. GPIO + indicator ───────────────────────────────────
    touchsynth::drivers::hw_init::init_peripherals()?;
    let mut led = StatusLed::new();
    led.show(Colour::Red);

    // Give the synth time to come up before the first command.
    FreeRtos::delay_ms(config.startup_delay_ms);

    // ── 4. Touch controller ───────────────────────────────────
    let peripherals = Peripherals::take().map_err(|_| Error::Init("peripherals already taken"))?;
    info!(
        "mpr121: I2C0 SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::TOUCH_SDA_GPIO,
        pins::TOUCH_SCL_GPIO,
        pins::TOUCH_I2C_HZ
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio18, // pins::TOUCH_SDA_GPIO
        peripherals.pins.gpio19, // pins::TOUCH_SCL_GPIO
        &I2cConfig::new().baudrate(Hertz(pins::TOUCH_I2C_HZ)),
    )
    .map_err(|e| {
        error!("mpr121: I2C driver: {}", e);
        Error::Init("touch I2C bus")
    })?;
    let mut touch = Mpr121::new(i2c, config.touch.i2c_address);
    if let Err(e) = touch.begin(&config.touch) {
        error!("mpr121: init failed: {}", e);
        return Err(Error::from(e).into());
    }

    // ── 5. Synth service ──────────────────────────────────────
    let service = Arc::new(Mutex::new(SynthService::new(
        config.synth,
        ConsoleSynthSink::stdout(),
        led,
        LogEventSink::new(),
    )));
    lock_service(&service).start();

    // ── 6. Gesture core + timer ───────────────────────────────
    let actions = GestureActions::new(
        Arc::clone(&service),
        DeviceSystemControl::new(),
        LogEventSink::new(),
    );
    let core = Arc::new(GestureCore::new(config.gesture, actions));
    let notifier: Arc<dyn TimeoutNotifier> = core.clone();
    let timer = EspOneShotTimer::new(notifier)?;

    let mut button = ButtonBottomHalf::new(
        &BUTTON_LATCH,
        ButtonPin::new(pins::BUTTON_GPIO),
        timer,
        Delay::new_default(),
        config.gesture.debounce(),
    );

    // ── 7. Button interrupt ───────────────────────────────────
    touchsynth::drivers::hw_init::init_isr_service()?;

    info!("System ready. Entering main loop.");

    // ── 8. Main loop ──────────────────────────────────────────
    let poll_ms = config.poll_interval_ms;
    let mut touch_errors: u32 = 0;

    loop {
        button.poll(core.as_ref());

        match touch.read_frame() {
            Ok(frame) => lock_service(&service).handle_frame(&frame, poll_ms),
            Err(e) => {
                if touch_errors % TOUCH_ERROR_LOG_EVERY == 0 {
                    warn!("mpr121: read failed: {} ({} so far)", e, touch_errors + 1);
                }
                touch_errors = touch_errors.wrapping_add(1);
            }
        }

        FreeRtos::delay_ms(poll_ms);
    }
}
