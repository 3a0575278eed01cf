use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;

/// graphics family 上的 command pool
///
/// 单线程独占：预录制的逐 image command buffer 和一次性的 upload buffer
/// 都从这里分配，不需要内部加锁。
pub struct GfxCommandPool {
    handle: vk::CommandPool,
    queue_family: u32,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxCommandPool {
    pub fn new(device: Rc<GfxDevice>, queue_family: u32) -> GfxResult<Self> {
        let pool_ci = vk::CommandPoolCreateInfo::default().queue_family_index(queue_family);

        let handle = unsafe {
            device
                .create_command_pool(&pool_ci, None)
                .map_err(GfxError::creation("command pool"))?
        };
        log::info!("created command pool on queue family {}", queue_family);

        Ok(Self {
            handle,
            queue_family,
            device,
        })
    }
}

// getters
impl GfxCommandPool {
    #[inline]
    pub fn handle(&self) -> vk::CommandPool {
        self.handle
    }

    #[inline]
    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }
}

// tools
impl GfxCommandPool {
    /// 分配 primary command buffer，归还由 pool 的销毁兜底
    pub fn alloc_command_buffers(&self, count: u32) -> GfxResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.handle)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        unsafe {
            self.device
                .allocate_command_buffers(&alloc_info)
                .map_err(GfxError::creation("command buffer"))
        }
    }

    /// 录一个一次性 command buffer，提交到 `queue` 并阻塞到 queue 空闲
    ///
    /// 用于 buffer upload 这类小规模拷贝；结束之后 buffer 立即归还给 pool。
    pub fn one_time_exec(
        &self,
        queue: vk::Queue,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer),
    ) -> GfxResult<()> {
        let cmd = self.alloc_command_buffers(1)?[0];

        let result = self.one_time_exec_inner(cmd, queue, record);

        // 无论提交是否成功都归还 command buffer
        unsafe {
            self.device.free_command_buffers(self.handle, &[cmd]);
        }
        result
    }

    fn one_time_exec_inner(
        &self,
        cmd: vk::CommandBuffer,
        queue: vk::Queue,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer),
    ) -> GfxResult<()> {
        let begin_info =
            vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            self.device
                .begin_command_buffer(cmd, &begin_info)
                .map_err(GfxError::device_call("vkBeginCommandBuffer"))?;

            record(&self.device, cmd);

            self.device
                .end_command_buffer(cmd)
                .map_err(GfxError::device_call("vkEndCommandBuffer"))?;

            let cmds = [cmd];
            let submit_info = vk::SubmitInfo::default().command_buffers(&cmds);
            self.device
                .queue_submit(queue, &[submit_info], vk::Fence::null())
                .map_err(GfxError::device_call("vkQueueSubmit"))?;

            self.device
                .queue_wait_idle(queue)
                .map_err(GfxError::device_call("vkQueueWaitIdle"))?;
        }

        Ok(())
    }
}

impl Drop for GfxCommandPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_command_pool(self.handle, None);
        }
    }
}
