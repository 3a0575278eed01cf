use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;

/// binary semaphore，只在 GPU queue 操作之间生效，host 不可见
pub struct GfxSemaphore {
    semaphore: vk::Semaphore,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxSemaphore {
    pub fn new(device: Rc<GfxDevice>) -> GfxResult<Self> {
        let semaphore = unsafe {
            device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                .map_err(GfxError::creation("semaphore"))?
        };

        Ok(Self { semaphore, device })
    }
}

// getters
impl GfxSemaphore {
    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for GfxSemaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}
