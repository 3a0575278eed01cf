use std::rc::Rc;

use ash::vk;

use crate::commands::semaphore::GfxSemaphore;
use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;
use crate::foundation::physical_device::GfxPhysicalDevice;
use crate::swapchain::surface::GfxSurface;

/// swapchain 以及与 image 一一对应的 image view
pub struct GfxSwapchain {
    handle: vk::SwapchainKHR,

    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,

    surface_format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,

    device: Rc<GfxDevice>,
    _surface: Rc<GfxSurface>,
}

// new & init
impl GfxSwapchain {
    /// 根据 surface 的 capability 选择 format / present mode / extent 并创建 swapchain
    ///
    /// `window_extent` 只在 surface 不固定 extent 时作为 fallback 使用。
    pub fn new(
        device: Rc<GfxDevice>,
        physical_device: &GfxPhysicalDevice,
        surface: Rc<GfxSurface>,
        window_extent: vk::Extent2D,
    ) -> GfxResult<Self> {
        let capabilities = surface.get_capabilities(physical_device.handle())?;
        let formats = surface.get_formats(physical_device.handle())?;
        let present_modes = surface.get_present_modes(physical_device.handle())?;

        let surface_format = choose_surface_format(&formats);
        let present_mode = choose_present_mode(&present_modes);
        let extent = choose_extent(&capabilities, window_extent);

        // max_image_count == 0 表示不限制 image 数量
        let image_count = if capabilities.max_image_count == 0 {
            capabilities.min_image_count + 1
        } else {
            u32::min(capabilities.max_image_count, capabilities.min_image_count + 1)
        };

        log::info!(
            "create swapchain: format {:?}/{:?}, present mode {:?}, extent {}x{}, image count {}",
            surface_format.format,
            surface_format.color_space,
            present_mode,
            extent.width,
            extent.height,
            image_count,
        );

        // graphics 和 present family 不同时，image 在两个 family 之间共享
        let queue_families = device.queue_families();
        let family_indices = [
            queue_families.graphics.unwrap_or_default(),
            queue_families.present.unwrap_or_default(),
        ];
        let concurrent = family_indices[0] != family_indices[1];

        let mut swapchain_ci = vk::SwapchainCreateInfoKHR::default()
            .surface(surface.handle())
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);
        if concurrent {
            swapchain_ci = swapchain_ci
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&family_indices);
        } else {
            swapchain_ci = swapchain_ci.image_sharing_mode(vk::SharingMode::EXCLUSIVE);
        }

        let handle = unsafe {
            device
                .swapchain_loader()
                .create_swapchain(&swapchain_ci, None)
                .map_err(GfxError::creation("swapchain"))?
        };
        // 从这里开始 handle 归 guard 所有，view 创建失败时由 guard 销毁
        let mut guard = Self {
            handle,
            images: vec![],
            image_views: vec![],
            surface_format,
            extent,
            device: device.clone(),
            _surface: surface,
        };

        guard.images = unsafe {
            device
                .swapchain_loader()
                .get_swapchain_images(handle)
                .map_err(GfxError::device_call("vkGetSwapchainImagesKHR"))?
        };
        // 逐个 push 进 guard，中途失败时已创建的 view 也能被 guard 销毁
        for image in &guard.images {
            let view = Self::create_image_view(&device, *image, surface_format.format)?;
            guard.image_views.push(view);
        }

        log::info!("swapchain has {} images", guard.images.len());
        Ok(guard)
    }

    /// 单 mip、单 layer 的 2D color view，component 全部 identity
    fn create_image_view(device: &GfxDevice, image: vk::Image, format: vk::Format) -> GfxResult<vk::ImageView> {
        let view_ci = vk::ImageViewCreateInfo {
            image,
            view_type: vk::ImageViewType::TYPE_2D,
            format,
            subresource_range: vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
            ..Default::default()
        };

        unsafe {
            device
                .create_image_view(&view_ci, None)
                .map_err(GfxError::creation("swapchain image view"))
        }
    }
}

// getters
impl GfxSwapchain {
    #[inline]
    pub fn color_format(&self) -> vk::Format {
        self.surface_format.format
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }
}

// update
impl GfxSwapchain {
    /// 向 presentation engine 请求下一个可用的 image index
    ///
    /// 返回的 index 和 frame slot 无关，由 presentation engine 决定。
    pub fn acquire_next_image(&self, semaphore: &GfxSemaphore) -> GfxResult<u32> {
        let (image_index, suboptimal) = unsafe {
            self.device
                .swapchain_loader()
                .acquire_next_image(self.handle, u64::MAX, semaphore.handle(), vk::Fence::null())
                .map_err(GfxError::device_call("vkAcquireNextImageKHR"))?
        };
        if suboptimal {
            log::warn!("swapchain acquire image index {} is not optimal", image_index);
        }
        Ok(image_index)
    }

    /// 把 image 归还给 presentation engine，等待 `wait_semaphore` 之后显示
    pub fn present_image(&self, queue: vk::Queue, image_index: u32, wait_semaphore: &GfxSemaphore) -> GfxResult<()> {
        let wait_semaphores = [wait_semaphore.handle()];
        let swapchains = [self.handle];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let suboptimal = unsafe {
            self.device
                .swapchain_loader()
                .queue_present(queue, &present_info)
                .map_err(GfxError::device_call("vkQueuePresentKHR"))?
        };
        if suboptimal {
            log::warn!("swapchain present image index {} is not optimal", image_index);
        }
        Ok(())
    }
}

impl Drop for GfxSwapchain {
    fn drop(&mut self) {
        unsafe {
            for view in &self.image_views {
                self.device.destroy_image_view(*view, None);
            }
            self.device.swapchain_loader().destroy_swapchain(self.handle, None);
        }
    }
}

/// 扫描 (format, color space) 对，优先返回 BGRA8-unorm + sRGB-nonlinear，
/// 不存在时退回到列表中的第一项
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_UNORM && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or(formats[0])
}

/// 优先级：MAILBOX > IMMEDIATE > FIFO
///
/// Vulkan 保证 FIFO 一定可用，作为 fallback；MAILBOX 出现时立刻短路返回
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    let mut best = vk::PresentModeKHR::FIFO;
    for mode in present_modes {
        match *mode {
            vk::PresentModeKHR::MAILBOX => return vk::PresentModeKHR::MAILBOX,
            vk::PresentModeKHR::IMMEDIATE => best = vk::PresentModeKHR::IMMEDIATE,
            _ => {}
        }
    }
    best
}

/// 确定 swapchain 的 extent 尺寸
///
/// 如果 capabilities.current_extent 包含特殊值 0xFFFFFFFF，表示 presentation engine
/// 不固定 extent，可以在 [min, max] 区间内自行指定；否则必须使用 current_extent。
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window_extent: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width == u32::MAX {
        vk::Extent2D {
            width: window_extent
                .width
                .clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
            height: window_extent
                .height
                .clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
        }
    } else {
        capabilities.current_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space }
    }

    #[test]
    fn test_surface_format_prefers_bgra8_srgb() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn test_surface_format_falls_back_to_first() {
        let formats = [format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR)];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn test_present_mode_fifo_only() {
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::FIFO]),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn test_present_mode_prefers_mailbox() {
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX]),
            vk::PresentModeKHR::MAILBOX
        );
        // MAILBOX 在 IMMEDIATE 之后出现时仍然胜出
        assert_eq!(
            choose_present_mode(&[
                vk::PresentModeKHR::FIFO,
                vk::PresentModeKHR::IMMEDIATE,
                vk::PresentModeKHR::MAILBOX,
            ]),
            vk::PresentModeKHR::MAILBOX
        );
    }

    #[test]
    fn test_present_mode_immediate_beats_fifo() {
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE]),
            vk::PresentModeKHR::IMMEDIATE
        );
    }

    fn caps(current: (u32, u32), min: (u32, u32), max: (u32, u32)) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: current.0,
                height: current.1,
            },
            min_image_extent: vk::Extent2D {
                width: min.0,
                height: min.1,
            },
            max_image_extent: vk::Extent2D {
                width: max.0,
                height: max.1,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_extent_uses_window_size_when_unconstrained() {
        let capabilities = caps((u32::MAX, u32::MAX), (400, 300), (1024, 768));
        let extent = choose_extent(&capabilities, vk::Extent2D { width: 800, height: 600 });
        assert_eq!((extent.width, extent.height), (800, 600));
    }

    #[test]
    fn test_extent_clamps_window_size() {
        let capabilities = caps((u32::MAX, u32::MAX), (400, 300), (1024, 768));
        let extent = choose_extent(&capabilities, vk::Extent2D { width: 1200, height: 900 });
        assert_eq!((extent.width, extent.height), (1024, 768));
    }

    #[test]
    fn test_extent_uses_current_when_defined() {
        let capabilities = caps((640, 480), (400, 300), (1024, 768));
        let extent = choose_extent(&capabilities, vk::Extent2D { width: 800, height: 600 });
        assert_eq!((extent.width, extent.height), (640, 480));
    }
}
