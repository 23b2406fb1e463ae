//! MPR121 12-electrode capacitive touch controller.
//!
//! Generic over any `embedded_hal::i2c::I2c` bus.  [`Mpr121::begin`] soft
//! resets the part, checks that it came back with its reset defaults,
//! programs thresholds and filtering, and starts it in run mode with
//! baseline tracking on all twelve electrodes.  [`TouchPort::read_frame`]
//! then returns touch status, filtered data and baselines in one go.

use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info, warn};

use crate::app::ports::{TouchError, TouchPort};
use crate::config::TouchConfig;
use crate::synth::{ELECTRODE_COUNT, TouchFrame};

// Register map (subset).
const REG_TOUCH_STATUS: u8 = 0x00;
const REG_FILTERED_DATA: u8 = 0x04;
const REG_BASELINE: u8 = 0x1E;
const REG_MHDR: u8 = 0x2B;
const REG_TOUCH_THRESHOLD: u8 = 0x41;
const REG_RELEASE_THRESHOLD: u8 = 0x42;
const REG_DEBOUNCE: u8 = 0x5B;
const REG_CONFIG1: u8 = 0x5C;
const REG_CONFIG2: u8 = 0x5D;
const REG_ECR: u8 = 0x5E;
const REG_SOFT_RESET: u8 = 0x80;

const SOFT_RESET_KEY: u8 = 0x63;
/// CONFIG2 value after reset; anything else means the part is not there
/// or not an MPR121.
const CONFIG2_RESET_VALUE: u8 = 0x24;

/// Baseline tracking on, all twelve electrodes enabled.
const ECR_RUN: u8 = 0xCC;
const ECR_STOP: u8 = 0x00;

/// Over-current flag in the touch status word.
const STATUS_OVCF: u16 = 1 << 15;
const STATUS_TOUCH_MASK: u16 = (1 << ELECTRODE_COUNT) - 1;

/// Rising, falling and touched filter settings, written from MHDR (0x2B).
const FILTER_SETTINGS: [u8; 11] = [
    0x01, 0x01, 0x10, 0x20, // MHDR NHDR NCLR FDLR
    0x01, 0x01, 0x10, 0x20, // MHDF NHDF NCLF FDLF
    0x01, 0x10, 0xFF, // NHDT NCLT FDLT
];
/// Two-sample touch and release debounce.
const DEBOUNCE_SETTING: u8 = 0x11;
/// 6 first-filter samples, 63 uA charge current.
const CONFIG1_SETTING: u8 = 0xFF;
/// 0.5 us charge time, 4 second-filter samples, 1 ms period.
const CONFIG2_SETTING: u8 = 0x30;

pub struct Mpr121<I2C> {
    i2c: I2C,
    address: u8,
    inited: bool,
}

impl<I2C> Mpr121<I2C>
where
    I2C: I2c,
{
    /// Wrap the bus without touching the device.  Reads fail with
    /// [`TouchError::NotInited`] until [`begin`](Self::begin) succeeds.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            inited: false,
        }
    }

    /// Reset and configure the controller.
    pub fn begin(&mut self, cfg: &TouchConfig) -> Result<(), TouchError> {
        self.inited = false;
        self.write(REG_SOFT_RESET, SOFT_RESET_KEY)?;

        if self.read(REG_CONFIG2)? != CONFIG2_RESET_VALUE {
            warn!("mpr121: no reset signature at 0x{:02X}", self.address);
            return Err(TouchError::ReadbackFail);
        }

        // Registers below ECR only accept writes in stop mode.
        self.write(REG_ECR, ECR_STOP)?;

        for electrode in 0..ELECTRODE_COUNT as u8 {
            self.write(REG_TOUCH_THRESHOLD + 2 * electrode, cfg.touch_threshold)?;
            self.write(REG_RELEASE_THRESHOLD + 2 * electrode, cfg.release_threshold)?;
        }
        for (offset, value) in FILTER_SETTINGS.iter().enumerate() {
            self.write(REG_MHDR + offset as u8, *value)?;
        }
        self.write(REG_DEBOUNCE, DEBOUNCE_SETTING)?;
        self.write(REG_CONFIG1, CONFIG1_SETTING)?;
        self.write(REG_CONFIG2, CONFIG2_SETTING)?;

        self.write(REG_ECR, ECR_RUN)?;
        if self.read(REG_ECR)? != ECR_RUN {
            return Err(TouchError::ReadbackFail);
        }

        self.inited = true;
        info!(
            "mpr121: running at 0x{:02X} (touch={} release={})",
            self.address, cfg.touch_threshold, cfg.release_threshold
        );
        Ok(())
    }

    pub fn is_inited(&self) -> bool {
        self.inited
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), TouchError> {
        self.i2c.write(self.address, &[reg, value]).map_err(|e| {
            debug!("mpr121: write 0x{:02X} failed: {:?}", reg, e.kind());
            TouchError::AddressUnknown
        })
    }

    fn read(&mut self, reg: u8) -> Result<u8, TouchError> {
        let mut buf = [0u8; 1];
        self.read_into(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn read_into(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TouchError> {
        self.i2c.write_read(self.address, &[reg], buf).map_err(|e| {
            debug!("mpr121: read 0x{:02X} failed: {:?}", reg, e.kind());
            TouchError::AddressUnknown
        })
    }
}

impl<I2C: I2c> TouchPort for Mpr121<I2C> {
    fn read_frame(&mut self) -> Result<TouchFrame, TouchError> {
        if !self.inited {
            return Err(TouchError::NotInited);
        }

        // Touch status (2 bytes) followed by out-of-range status (2 bytes).
        let mut status = [0u8; 4];
        self.read_into(REG_TOUCH_STATUS, &mut status)?;
        let touch_status = u16::from_le_bytes([status[0], status[1]]);
        let oor_status = u16::from_le_bytes([status[2], status[3]]);
        if touch_status & STATUS_OVCF != 0 {
            return Err(TouchError::OvercurrentFlag);
        }
        if oor_status & STATUS_TOUCH_MASK != 0 {
            return Err(TouchError::OutOfRange);
        }

        let mut raw = [0u8; 2 * ELECTRODE_COUNT];
        self.read_into(REG_FILTERED_DATA, &mut raw)?;
        let mut filtered = [0u16; ELECTRODE_COUNT];
        for (value, pair) in filtered.iter_mut().zip(raw.chunks_exact(2)) {
            *value = u16::from_le_bytes([pair[0], pair[1]]) & 0x03FF;
        }

        let mut base = [0u8; ELECTRODE_COUNT];
        self.read_into(REG_BASELINE, &mut base)?;
        // Baseline registers hold the upper 8 of 10 bits.
        let baseline = base.map(|b| u16::from(b) << 2);

        Ok(TouchFrame {
            touched: touch_status & STATUS_TOUCH_MASK,
            filtered,
            baseline,
        })
    }
}
