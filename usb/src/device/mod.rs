pub mod base;

// libusb covers every platform the chip has a driver to detach from.
pub mod libusb;
