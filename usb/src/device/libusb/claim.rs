use log::{debug, warn};
use rusb::{DeviceHandle, UsbContext};

// The parts of a handle involved in taking interfaces away from the kernel and giving them back.
pub trait InterfaceClaim {
    fn kernel_driver_active(&mut self, interface: u8) -> rusb::Result<bool>;
    fn detach_kernel_driver(&mut self, interface: u8) -> rusb::Result<()>;
    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()>;
    fn release_interface(&mut self, interface: u8) -> rusb::Result<()>;
}

impl<T: UsbContext> InterfaceClaim for DeviceHandle<T> {
    fn kernel_driver_active(&mut self, interface: u8) -> rusb::Result<bool> {
        DeviceHandle::kernel_driver_active(self, interface)
    }

    fn detach_kernel_driver(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::detach_kernel_driver(self, interface)
    }

    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::claim_interface(self, interface)
    }

    fn release_interface(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::release_interface(self, interface)
    }
}

/// Owns a handle along with whichever interfaces were successfully claimed on it. Those (and
/// only those) are released on drop, after which the handle itself is dropped.
pub struct ClaimedInterfaces<H: InterfaceClaim> {
    handle: H,
    claimed: Vec<u8>,
}

impl<H: InterfaceClaim> ClaimedInterfaces<H> {
    /// Detaches any kernel driver and claims each interface, skipping the ones that fail.
    pub fn claim(mut handle: H, interfaces: &[u8]) -> Self {
        let mut claimed = Vec::new();
        for &interface in interfaces {
            match handle.kernel_driver_active(interface) {
                Ok(true) => {
                    if let Err(error) = handle.detach_kernel_driver(interface) {
                        warn!("Unable to detach kernel driver from {}: {}", interface, error);
                    } else {
                        debug!("Detached kernel driver from interface {}", interface);
                    }
                }
                Ok(false) => {}
                Err(error) => debug!("Kernel driver check on {} failed: {}", interface, error),
            }

            match handle.claim_interface(interface) {
                Ok(()) => {
                    debug!("Claimed interface {}", interface);
                    claimed.push(interface);
                }
                // Most CH340s only have interface 0
                Err(rusb::Error::NotFound) => {}
                Err(error) => warn!("Unable to claim interface {}: {}", interface, error),
            }
        }
        Self { handle, claimed }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn claimed(&self) -> &[u8] {
        &self.claimed
    }
}

impl<H: InterfaceClaim> Drop for ClaimedInterfaces<H> {
    fn drop(&mut self) {
        for interface in self.claimed.drain(..) {
            if let Err(error) = self.handle.release_interface(interface) {
                warn!("Unable to release interface {}: {}", interface, error);
            } else {
                debug!("Released interface {}", interface);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Event {
        Detach(u8),
        Claim(u8),
        Release(u8),
    }

    // A handle with a fixed set of interfaces. The event log is shared so it can still be read
    // once the handle has been dropped.
    pub(crate) struct FakeHandle {
        pub present: Vec<u8>,
        pub kernel_owned: Vec<u8>,
        pub busy: Vec<u8>,
        pub events: Rc<RefCell<Vec<Event>>>,
    }

    impl FakeHandle {
        pub fn with_interfaces(present: &[u8]) -> Self {
            Self {
                present: present.to_vec(),
                kernel_owned: Vec::new(),
                busy: Vec::new(),
                events: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl InterfaceClaim for FakeHandle {
        fn kernel_driver_active(&mut self, interface: u8) -> rusb::Result<bool> {
            if !self.present.contains(&interface) {
                return Err(rusb::Error::NotFound);
            }
            Ok(self.kernel_owned.contains(&interface))
        }

        fn detach_kernel_driver(&mut self, interface: u8) -> rusb::Result<()> {
            self.events.borrow_mut().push(Event::Detach(interface));
            Ok(())
        }

        fn claim_interface(&mut self, interface: u8) -> rusb::Result<()> {
            if !self.present.contains(&interface) {
                return Err(rusb::Error::NotFound);
            }
            if self.busy.contains(&interface) {
                return Err(rusb::Error::Busy);
            }
            self.events.borrow_mut().push(Event::Claim(interface));
            Ok(())
        }

        fn release_interface(&mut self, interface: u8) -> rusb::Result<()> {
            self.events.borrow_mut().push(Event::Release(interface));
            Ok(())
        }
    }

    fn releases(events: &[Event]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Release(interface) => Some(*interface),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unclaimed_interfaces_are_never_released() {
        let mut handle = FakeHandle::with_interfaces(&[0, 1]);
        handle.busy = vec![1];
        let events = handle.events.clone();

        let interfaces = ClaimedInterfaces::claim(handle, &[0, 1, 2]);
        assert_eq!(interfaces.claimed(), &[0]);
        drop(interfaces);

        assert_eq!(releases(&events.borrow()), vec![0]);
    }

    #[test]
    fn each_claimed_interface_released_once() {
        let mut handle = FakeHandle::with_interfaces(&[0, 1, 2]);
        handle.kernel_owned = vec![0];
        let events = handle.events.clone();

        let interfaces = ClaimedInterfaces::claim(handle, &[0, 1, 2]);
        assert_eq!(interfaces.claimed(), &[0, 1, 2]);
        assert!(releases(&events.borrow()).is_empty());
        drop(interfaces);

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Detach(0),
                Event::Claim(0),
                Event::Claim(1),
                Event::Claim(2),
                Event::Release(0),
                Event::Release(1),
                Event::Release(2),
            ]
        );
    }
}
