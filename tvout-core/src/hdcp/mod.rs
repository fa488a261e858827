//! HDCP enable/disable hook
//!
//! Only the DDC port registration and HPD arming are handled here; the
//! authentication protocol runs elsewhere.

extern crate alloc;

use alloc::boxed::Box;

use tvout_api::HdcpPort;

pub struct HdcpHook {
    port: Box<dyn HdcpPort>,
    attached: bool,
}

impl HdcpHook {
    pub fn new(port: Box<dyn HdcpPort>) -> Self {
        Self { port, attached: false }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Cable inserted: register the DDC client once and arm detection
    pub fn on_connect(&mut self, hdcp_requested: bool) {
        if !hdcp_requested {
            return;
        }
        if !self.attached {
            match self.port.attach() {
                Ok(()) => self.attached = true,
                Err(err) => log::warn!("[tvout] HDCP port add failed: {}", err),
            }
        }
        self.port.set_hpd_detection(true, hdcp_requested);
    }

    /// Cable removed: unregister the DDC client and disarm detection
    pub fn on_disconnect(&mut self, hdcp_requested: bool) {
        let was_attached = self.attached;
        self.release();
        if hdcp_requested || was_attached {
            self.port.set_hpd_detection(false, hdcp_requested);
        }
    }

    /// Unregister the DDC client if registered
    pub fn release(&mut self) {
        if self.attached {
            self.port.detach();
            self.attached = false;
        }
    }
}
