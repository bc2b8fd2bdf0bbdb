use rtic::Mutex;
use usb_device::bus::UsbBus;
use usb_device::UsbError;
use usbd_serial::SerialPort;

/// Attempts at pushing bytes into a full endpoint before giving up.
const WRITE_ATTEMPTS: u16 = 1_000;

/// Write `bytes` to the CDC port without stalling the caller.
///
/// The port is locked once per chunk so the USB interrupt keeps getting
/// serviced between chunks. Bytes the host does not pick up in time are
/// discarded; returns how many were written.
pub fn write_lossy<M, B>(serial: &mut M, bytes: &[u8]) -> usize
where
    M: Mutex<T = SerialPort<'static, B>>,
    B: UsbBus,
{
    let mut written = 0;
    let mut attempts = WRITE_ATTEMPTS;

    while written < bytes.len() && attempts > 0 {
        match serial.lock(|port| port.write(&bytes[written..])) {
            Ok(count) if count > 0 => written += count,
            Ok(_) | Err(UsbError::WouldBlock) => attempts -= 1,
            Err(_) => break,
        }
    }

    if written < bytes.len() {
        defmt::trace!("serial: discarded {:u32} bytes", (bytes.len() - written) as u32);
    }
    written
}
