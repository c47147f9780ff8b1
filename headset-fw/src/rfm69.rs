//! RFM69HCW transceiver driver (SPI, packet mode).
//!
//! Covers the subset of the chip the headset needs: fixed-frequency FSK
//! packet receive with hardware AES and RadioHead-compatible framing, which
//! is what the body controller transmits. The modem settings mirror that
//! side of the link: 250kbit/s, 250kHz deviation, 0x2D 0xD4 sync word,
//! variable-length packets with CRC.
//!
//! Receive is polled: [`RadioTransport::try_receive`] checks the
//! PayloadReady flag and drains the FIFO when it is up. The 4-byte
//! RadioHead header (to, from, id, flags) is stripped; callers see the bare
//! payload.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use headset_core::config::RadioConfig;
use headset_core::traits::radio::{RadioError, RadioTransport};

/// Expected RegVersion contents for an RFM69.
const VERSION: u8 = 0x24;

/// RadioHead header bytes prepended to every payload (to, from, id, flags).
const HEADER_LEN: usize = 4;

/// FIFO capacity, including the length byte and header.
const FIFO_SIZE: usize = 66;

#[allow(dead_code)]
mod reg {
    pub const FIFO: u8 = 0x00;
    pub const OP_MODE: u8 = 0x01;
    pub const DATA_MODUL: u8 = 0x02;
    pub const BITRATE_MSB: u8 = 0x03;
    pub const BITRATE_LSB: u8 = 0x04;
    pub const FDEV_MSB: u8 = 0x05;
    pub const FDEV_LSB: u8 = 0x06;
    pub const FRF_MSB: u8 = 0x07;
    pub const FRF_MID: u8 = 0x08;
    pub const FRF_LSB: u8 = 0x09;
    pub const VERSION: u8 = 0x10;
    pub const RX_BW: u8 = 0x19;
    pub const IRQ_FLAGS_1: u8 = 0x27;
    pub const IRQ_FLAGS_2: u8 = 0x28;
    pub const RSSI_THRESH: u8 = 0x29;
    pub const PREAMBLE_MSB: u8 = 0x2C;
    pub const PREAMBLE_LSB: u8 = 0x2D;
    pub const SYNC_CONFIG: u8 = 0x2E;
    pub const SYNC_VALUE_1: u8 = 0x2F;
    pub const SYNC_VALUE_2: u8 = 0x30;
    pub const PACKET_CONFIG_1: u8 = 0x37;
    pub const PAYLOAD_LENGTH: u8 = 0x38;
    pub const FIFO_THRESH: u8 = 0x3C;
    pub const PACKET_CONFIG_2: u8 = 0x3D;
    pub const AES_KEY_1: u8 = 0x3E;
    pub const TEST_DAGC: u8 = 0x6F;
}

/// RegOpMode mode field (bits 4:2).
#[allow(dead_code)]
mod mode {
    pub const SLEEP: u8 = 0x00;
    pub const STANDBY: u8 = 0x04;
    pub const RX: u8 = 0x10;
}

/// RegIrqFlags1: mode ready.
const IRQ1_MODE_READY: u8 = 0x80;
/// RegIrqFlags2: a CRC-valid packet is waiting in the FIFO.
const IRQ2_PAYLOAD_READY: u8 = 0x04;

/// RFM69HCW on a shared SPI bus with a dedicated chip-select and reset line.
pub struct Rfm69<SPI, CS, RST> {
    spi: SPI,
    cs: CS,
    rst: RST,
}

impl<SPI, CS, RST> Rfm69<SPI, CS, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
{
    /// Wrap the bus without touching the transceiver. Callers follow with
    /// [`Rfm69::reset`] and either [`Rfm69::probe`] (diagnostics) or
    /// [`Rfm69::init`] (full bring-up).
    pub fn attach(spi: SPI, mut cs: CS, rst: RST) -> Self {
        let _ = cs.set_high();
        Self { spi, cs, rst }
    }

    /// Pulse the hardware reset line (datasheet: >=100us high, 5ms settle).
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), RadioError> {
        self.rst.set_high().map_err(|_| RadioError::Bus)?;
        delay.delay_us(100);
        self.rst.set_low().map_err(|_| RadioError::Bus)?;
        delay.delay_ms(5);
        Ok(())
    }

    /// Version-register presence check. A missing or unresponsive module
    /// reads anything but 0x24.
    pub fn probe(&mut self) -> Result<(), RadioError> {
        if self.read_register(reg::VERSION)? == VERSION {
            Ok(())
        } else {
            Err(RadioError::NotDetected)
        }
    }

    /// Probe the transceiver and configure the link, leaving the chip in
    /// receive mode.
    pub fn init<D: DelayNs>(
        &mut self,
        config: &RadioConfig,
        delay: &mut D,
    ) -> Result<(), RadioError> {
        self.probe()?;
        self.set_mode(mode::STANDBY, delay)?;

        // FSK, packet mode, no shaping
        self.write_register(reg::DATA_MODUL, 0x00)?;
        // 250kbit/s (FXOSC / 0x0080), 250kHz deviation
        self.write_register(reg::BITRATE_MSB, 0x00)?;
        self.write_register(reg::BITRATE_LSB, 0x80)?;
        self.write_register(reg::FDEV_MSB, 0x10)?;
        self.write_register(reg::FDEV_LSB, 0x00)?;
        self.set_frequency(config.frequency_khz)?;
        // 500kHz receiver bandwidth, DC cancellation at the default cutoff
        self.write_register(reg::RX_BW, 0xE0)?;
        self.write_register(reg::RSSI_THRESH, 0xDC)?;

        // 4-byte preamble, then the RadioHead network sync word
        self.write_register(reg::PREAMBLE_MSB, 0x00)?;
        self.write_register(reg::PREAMBLE_LSB, 0x04)?;
        self.write_register(reg::SYNC_CONFIG, 0x88)?;
        self.write_register(reg::SYNC_VALUE_1, 0x2D)?;
        self.write_register(reg::SYNC_VALUE_2, 0xD4)?;

        // variable length, whitening, CRC on, no address filtering
        self.write_register(reg::PACKET_CONFIG_1, 0xD0)?;
        self.write_register(reg::PAYLOAD_LENGTH, FIFO_SIZE as u8)?;
        self.write_register(reg::FIFO_THRESH, 0x8F)?;

        self.set_encryption_key(&config.encryption_key)?;

        // continuous DAGC improves fading margin with AFC off
        self.write_register(reg::TEST_DAGC, 0x30)?;

        self.set_mode(mode::RX, delay)
    }

    /// Program the carrier. Synthesizer steps are FXOSC / 2^19 = 61.035Hz.
    fn set_frequency(&mut self, freq_khz: u32) -> Result<(), RadioError> {
        let frf = ((freq_khz as u64) << 19) / 32_000;
        self.write_register(reg::FRF_MSB, (frf >> 16) as u8)?;
        self.write_register(reg::FRF_MID, (frf >> 8) as u8)?;
        self.write_register(reg::FRF_LSB, frf as u8)
    }

    /// Load the AES key and enable hardware encryption with automatic RX
    /// restart.
    fn set_encryption_key(&mut self, key: &[u8; 16]) -> Result<(), RadioError> {
        for (i, &byte) in key.iter().enumerate() {
            self.write_register(reg::AES_KEY_1 + i as u8, byte)?;
        }
        self.write_register(reg::PACKET_CONFIG_2, 0x03)
    }

    fn set_mode<D: DelayNs>(&mut self, m: u8, delay: &mut D) -> Result<(), RadioError> {
        self.write_register(reg::OP_MODE, m)?;
        for _ in 0..100 {
            if self.read_register(reg::IRQ_FLAGS_1)? & IRQ1_MODE_READY != 0 {
                return Ok(());
            }
            delay.delay_us(100);
        }
        Err(RadioError::Timeout)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), RadioError> {
        self.cs.set_low().map_err(|_| RadioError::Bus)?;
        let result = self.spi.write(&[register | 0x80, value]);
        let _ = self.cs.set_high();
        result.map_err(|_| RadioError::Bus)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, RadioError> {
        self.cs.set_low().map_err(|_| RadioError::Bus)?;
        let mut frame = [register & 0x7F, 0];
        let result = self.spi.transfer_in_place(&mut frame);
        let _ = self.cs.set_high();
        result.map_err(|_| RadioError::Bus)?;
        Ok(frame[1])
    }
}

impl<SPI, CS, RST> RadioTransport for Rfm69<SPI, CS, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
{
    /// One non-blocking poll: drain a pending packet from the FIFO if the
    /// PayloadReady flag is up, else report nothing waiting.
    fn try_receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, RadioError> {
        if self.read_register(reg::IRQ_FLAGS_2)? & IRQ2_PAYLOAD_READY == 0 {
            return Ok(None);
        }

        // burst-read the whole packet in one chip select: length byte,
        // RadioHead header, payload
        self.cs.set_low().map_err(|_| RadioError::Bus)?;
        let packet = (|| -> Result<Option<usize>, RadioError> {
            self.spi
                .write(&[reg::FIFO & 0x7F])
                .map_err(|_| RadioError::Bus)?;

            let mut len = [0u8];
            self.spi.read(&mut len).map_err(|_| RadioError::Bus)?;
            let total = (len[0] as usize).min(FIFO_SIZE - 1);
            if total < HEADER_LEN {
                // runt frame; drain what there is and report nothing
                let mut sink = [0u8; HEADER_LEN];
                self.spi
                    .read(&mut sink[..total])
                    .map_err(|_| RadioError::Bus)?;
                return Ok(None);
            }

            let mut header = [0u8; HEADER_LEN];
            self.spi.read(&mut header).map_err(|_| RadioError::Bus)?;

            let mut payload = [0u8; FIFO_SIZE];
            let payload_len = total - HEADER_LEN;
            self.spi
                .read(&mut payload[..payload_len])
                .map_err(|_| RadioError::Bus)?;

            let copied = payload_len.min(buf.len());
            buf[..copied].copy_from_slice(&payload[..copied]);
            Ok(Some(copied))
        })();
        let _ = self.cs.set_high();

        // AutoRxRestart re-arms the receiver once the FIFO drains
        packet
    }
}
