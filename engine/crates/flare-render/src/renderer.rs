use std::ffi::CString;
use std::rc::Rc;

use ash::vk;
use flare_gfx::commands::command_pool::GfxCommandPool;
use flare_gfx::error::{GfxError, GfxResult};
use flare_gfx::foundation::debug_messenger::GfxDebugMessenger;
use flare_gfx::foundation::device::GfxDevice;
use flare_gfx::foundation::instance::GfxInstance;
use flare_gfx::foundation::physical_device::GfxPhysicalDevice;
use flare_gfx::pipeline::graphics_pipeline::{GfxPipeline, GfxRenderPass};
use flare_gfx::resources::buffer::GfxBuffer;
use flare_gfx::resources::vertex::ColorVertex2D;
use flare_gfx::swapchain::framebuffer::GfxFramebuffer;
use flare_gfx::swapchain::render_swapchain::GfxSwapchain;
use flare_gfx::swapchain::surface::GfxSurface;

use crate::frame_counter::FrameCounter;
use crate::frame_sync::FrameSync;
use crate::settings::RenderConfig;

/// 持有从 instance 到同步对象的整条 Vulkan 对象链
///
/// 字段按销毁顺序声明：Rust 按声明顺序 drop 字段，先声明的依赖对象先销毁，
/// 被依赖的 instance / device 通过 `Rc` 保证最后释放。
pub struct Renderer {
    frame_counter: FrameCounter,
    frame_sync: FrameSync,

    /// 每个 swapchain image 一个，预录制，SIMULTANEOUS_USE
    command_buffers: Vec<vk::CommandBuffer>,
    command_pool: GfxCommandPool,

    framebuffers: Vec<GfxFramebuffer>,
    pipeline: GfxPipeline,
    render_pass: GfxRenderPass,

    vertex_buffer: GfxBuffer,
    vertex_count: u32,

    swapchain: GfxSwapchain,

    device: Rc<GfxDevice>,
    _physical_device: GfxPhysicalDevice,
    _debug_messenger: Option<GfxDebugMessenger>,
    _surface: Rc<GfxSurface>,
    _instance: Rc<GfxInstance>,
}

// new & init
impl Renderer {
    /// 按依赖顺序构建整条对象链，任何一步失败都返回错误，
    /// 已创建的对象由 Drop 自动回收。
    pub fn new(
        config: &RenderConfig,
        display_handle: raw_window_handle::RawDisplayHandle,
        window_handle: raw_window_handle::RawWindowHandle,
        vertices: &[ColorVertex2D],
    ) -> GfxResult<Self> {
        let app_name = CString::new(config.app_name.as_str())
            .map_err(|_| GfxError::Configuration(format!("app name contains NUL byte: {:?}", config.app_name)))?;

        let instance = Rc::new(GfxInstance::new(&app_name, display_handle, config.enable_validation)?);
        let debug_messenger = if config.enable_validation {
            Some(GfxDebugMessenger::new(instance.clone())?)
        } else {
            None
        };

        let surface = Rc::new(GfxSurface::new(instance.clone(), display_handle, window_handle)?);
        let physical_device = GfxPhysicalDevice::pick(&instance, &surface)?;
        let device = Rc::new(GfxDevice::new(instance.clone(), &physical_device)?);

        let swapchain = GfxSwapchain::new(
            device.clone(),
            &physical_device,
            surface.clone(),
            config.window_extent,
        )?;

        let render_pass = GfxRenderPass::new(device.clone(), swapchain.color_format())?;
        let pipeline = GfxPipeline::new::<ColorVertex2D>(
            device.clone(),
            &render_pass,
            swapchain.extent(),
            &config.vertex_shader_path,
            &config.fragment_shader_path,
        )?;

        let framebuffers = swapchain
            .image_views()
            .iter()
            .map(|view| GfxFramebuffer::new(device.clone(), render_pass.handle(), *view, swapchain.extent()))
            .collect::<GfxResult<Vec<_>>>()?;

        // pick 通过之后 graphics family 一定存在
        let graphics_family = device.queue_families().graphics.expect("physical device pick guarantees graphics family");
        let command_pool = GfxCommandPool::new(device.clone(), graphics_family)?;

        let vertex_buffer = GfxBuffer::new_device_local_with_data(
            device.clone(),
            physical_device.memory_properties(),
            &command_pool,
            bytemuck::cast_slice(vertices),
        )?;
        let vertex_count = vertices.len() as u32;

        let command_buffers = command_pool.alloc_command_buffers(swapchain.image_count() as u32)?;

        let frame_sync = FrameSync::new(&device)?;

        let renderer = Self {
            frame_counter: FrameCounter::new(),
            frame_sync,
            command_buffers,
            command_pool,
            framebuffers,
            pipeline,
            render_pass,
            vertex_buffer,
            vertex_count,
            swapchain,
            device,
            _physical_device: physical_device,
            _debug_messenger: debug_messenger,
            _surface: surface,
            _instance: instance,
        };
        renderer.record_draw_commands()?;

        log::info!("renderer ready: {} swapchain images", renderer.swapchain.image_count());
        Ok(renderer)
    }

    /// 为每个 swapchain image 预录制一次 draw，之后每帧重复提交
    fn record_draw_commands(&self) -> GfxResult<()> {
        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: [0.0, 0.0, 0.0, 1.0],
            },
        }];

        for (image_index, cmd) in self.command_buffers.iter().enumerate() {
            let cmd = *cmd;
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE);

            let render_pass_bi = vk::RenderPassBeginInfo::default()
                .render_pass(self.render_pass.handle())
                .framebuffer(self.framebuffers[image_index].handle())
                .render_area(vk::Rect2D::default().extent(self.swapchain.extent()))
                .clear_values(&clear_values);

            unsafe {
                self.device
                    .begin_command_buffer(cmd, &begin_info)
                    .map_err(GfxError::device_call("vkBeginCommandBuffer"))?;

                self.device.cmd_begin_render_pass(cmd, &render_pass_bi, vk::SubpassContents::INLINE);
                self.device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, self.pipeline.handle());
                self.device.cmd_bind_vertex_buffers(cmd, 0, &[self.vertex_buffer.handle()], &[0]);
                self.device.cmd_draw(cmd, self.vertex_count, 1, 0, 0);
                self.device.cmd_end_render_pass(cmd);

                self.device
                    .end_command_buffer(cmd)
                    .map_err(GfxError::device_call("vkEndCommandBuffer"))?;
            }
        }
        Ok(())
    }
}

// update
impl Renderer {
    /// 一帧：wait fence → acquire → submit → present → advance
    ///
    /// fence 是 CPU 侧唯一的 backpressure，保证 in flight 的帧数不超过 slot 数。
    pub fn draw_frame(&mut self) -> GfxResult<()> {
        let slot = self.frame_sync.slot(self.frame_counter.frame_label());

        slot.in_flight.wait()?;
        slot.in_flight.reset()?;

        let image_index = self.swapchain.acquire_next_image(&slot.image_available)?;

        let wait_semaphores = [slot.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [self.command_buffers[image_index as usize]];
        let signal_semaphores = [slot.render_finished.handle()];
        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .queue_submit(self.device.graphics_queue(), &[submit_info], slot.in_flight.handle())
                .map_err(GfxError::device_call("vkQueueSubmit"))?;
        }

        self.swapchain.present_image(self.device.present_queue(), image_index, &slot.render_finished)?;

        self.frame_counter.next_frame();
        Ok(())
    }
}

// destroy
impl Renderer {
    /// 等 GPU 全部收尾后再让 Drop 链按声明顺序销毁对象
    pub fn destroy(self) -> GfxResult<()> {
        log::info!("renderer shutdown after {} frames", self.frame_counter.frame_id());
        self.device.wait_idle()
    }
}
