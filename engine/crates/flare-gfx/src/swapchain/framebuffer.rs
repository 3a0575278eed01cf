use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;

/// 绑定到单个 swapchain image view 的 framebuffer
pub struct GfxFramebuffer {
    handle: vk::Framebuffer,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxFramebuffer {
    pub fn new(
        device: Rc<GfxDevice>,
        render_pass: vk::RenderPass,
        attachment: vk::ImageView,
        extent: vk::Extent2D,
    ) -> GfxResult<Self> {
        let attachments = [attachment];
        let framebuffer_ci = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let handle = unsafe {
            device
                .create_framebuffer(&framebuffer_ci, None)
                .map_err(GfxError::creation("framebuffer"))?
        };

        Ok(Self { handle, device })
    }
}

// getters
impl GfxFramebuffer {
    #[inline]
    pub fn handle(&self) -> vk::Framebuffer {
        self.handle
    }
}

impl Drop for GfxFramebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.handle, None);
        }
    }
}
