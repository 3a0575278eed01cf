use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;

/// host 可见的 GPU 完成信号
pub struct GfxFence {
    fence: vk::Fence,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxFence {
    /// # param
    /// * signaled - 是否创建时就 signaled
    pub fn new(device: Rc<GfxDevice>, signaled: bool) -> GfxResult<Self> {
        let fence_flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let fence = unsafe {
            device
                .create_fence(&vk::FenceCreateInfo::default().flags(fence_flags), None)
                .map_err(GfxError::creation("fence"))?
        };

        Ok(Self { fence, device })
    }
}

// getters
impl GfxFence {
    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }
}

// tools
impl GfxFence {
    /// 阻塞等待 fence，无超时
    pub fn wait(&self) -> GfxResult<()> {
        unsafe {
            self.device
                .wait_for_fences(std::slice::from_ref(&self.fence), true, u64::MAX)
                .map_err(GfxError::device_call("vkWaitForFences"))
        }
    }

    /// 恢复为 unsignaled，等待下一次 submit 重新 arm
    pub fn reset(&self) -> GfxResult<()> {
        unsafe {
            self.device
                .reset_fences(std::slice::from_ref(&self.fence))
                .map_err(GfxError::device_call("vkResetFences"))
        }
    }
}

impl Drop for GfxFence {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}
