use std::path::Path;
use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;
use crate::pipeline::shader::GfxShaderModule;
use crate::resources::vertex::GfxVertexLayout;

/// 单 color attachment 的 render pass
///
/// attachment 在 pass 开始时 clear，结束时转换为 present layout。
pub struct GfxRenderPass {
    handle: vk::RenderPass,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxRenderPass {
    pub fn new(device: Rc<GfxDevice>, color_format: vk::Format) -> GfxResult<Self> {
        let attachments = [vk::AttachmentDescription::default()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];

        let color_refs = [vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)];

        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)];

        // 等待 swapchain image 真正可写后才开始 color output
        let dependencies = [vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

        let render_pass_ci = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let handle = unsafe {
            device
                .create_render_pass(&render_pass_ci, None)
                .map_err(GfxError::creation("render pass"))?
        };

        Ok(Self { handle, device })
    }
}

// getters
impl GfxRenderPass {
    #[inline]
    pub fn handle(&self) -> vk::RenderPass {
        self.handle
    }
}

impl Drop for GfxRenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.handle, None);
        }
    }
}

/// 固定功能全部静态配置的 graphics pipeline
///
/// viewport/scissor 直接由 swapchain extent 决定，没有 dynamic state，
/// 窗口尺寸变化时需要重建整条 pipeline。
pub struct GfxPipeline {
    pipeline: vk::Pipeline,
    pipeline_layout: vk::PipelineLayout,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxPipeline {
    pub fn new<V: GfxVertexLayout>(
        device: Rc<GfxDevice>,
        render_pass: &GfxRenderPass,
        extent: vk::Extent2D,
        vertex_shader_path: &Path,
        fragment_shader_path: &Path,
    ) -> GfxResult<Self> {
        // shader module 只在创建期间需要，离开作用域即销毁
        let vertex_shader = GfxShaderModule::new(device.clone(), vertex_shader_path)?;
        let fragment_shader = GfxShaderModule::new(device.clone(), fragment_shader_path)?;

        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_shader.handle())
                .name(c"main"),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment_shader.handle())
                .name(c"main"),
        ];

        let vertex_bindings = V::vertex_input_bindings();
        let vertex_attributes = V::vertex_input_attributes();
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let viewports = [vk::Viewport::default()
            .x(0.0)
            .y(0.0)
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0)];
        let scissors = [vk::Rect2D::default().extent(extent)];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::CLOCKWISE)
            .depth_bias_enable(false)
            .line_width(1.0);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
            .sample_shading_enable(false);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(false)
            .color_write_mask(vk::ColorComponentFlags::RGBA)];
        let color_blend_state =
            vk::PipelineColorBlendStateCreateInfo::default().attachments(&color_blend_attachments);

        // 没有 descriptor set 和 push constant
        let layout_ci = vk::PipelineLayoutCreateInfo::default();
        let pipeline_layout = unsafe {
            device
                .create_pipeline_layout(&layout_ci, None)
                .map_err(GfxError::creation("pipeline layout"))?
        };

        let pipeline_ci = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .layout(pipeline_layout)
            .render_pass(render_pass.handle())
            .subpass(0);

        let pipeline_result = unsafe {
            device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_ci], None)
        };
        let pipeline = match pipeline_result {
            Ok(pipelines) => pipelines[0],
            Err((_, result)) => {
                unsafe { device.destroy_pipeline_layout(pipeline_layout, None) };
                return Err(GfxError::creation("graphics pipeline")(result));
            }
        };

        Ok(Self {
            pipeline,
            pipeline_layout,
            device,
        })
    }
}

// getters
impl GfxPipeline {
    #[inline]
    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    #[inline]
    pub fn layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }
}

impl Drop for GfxPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
