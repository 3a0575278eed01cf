use std::rc::Rc;

use ash::vk;

use crate::commands::command_pool::GfxCommandPool;
use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;

/// buffer + 它独占的 device memory
///
/// 没有引用计数：每个 GfxBuffer 只有一个逻辑 owner，销毁绑定在 Drop 上。
pub struct GfxBuffer {
    handle: vk::Buffer,
    memory: vk::DeviceMemory,

    size: vk::DeviceSize,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxBuffer {
    /// create / allocate / bind 三连
    ///
    /// memory type 通过 [`find_memory_type`] 从 requirement 的 type filter 中选出。
    pub fn new(
        device: Rc<GfxDevice>,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> GfxResult<Self> {
        let buffer_ci = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let handle = unsafe {
            device
                .create_buffer(&buffer_ci, None)
                .map_err(GfxError::creation("buffer"))?
        };
        // 从这里开始 handle 归 guard 所有，后续失败时由 Drop 销毁
        let mut guard = Self {
            handle,
            memory: vk::DeviceMemory::null(),
            size,
            device: device.clone(),
        };

        let requirements = unsafe { device.get_buffer_memory_requirements(handle) };
        let memory_type_index = find_memory_type(memory_properties, requirements.memory_type_bits, properties)?;

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);
        guard.memory = unsafe {
            device
                .allocate_memory(&alloc_info, None)
                .map_err(GfxError::creation("buffer memory"))?
        };

        unsafe {
            device
                .bind_buffer_memory(guard.handle, guard.memory, 0)
                .map_err(GfxError::device_call("vkBindBufferMemory"))?;
        }

        Ok(guard)
    }

    /// 临时的 stage buffer：host visible + coherent，作为 transfer 的源
    pub fn new_stage_buffer(
        device: Rc<GfxDevice>,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
    ) -> GfxResult<Self> {
        Self::new(
            device,
            memory_properties,
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
    }

    /// 把 host 数据搬进 device local 的 vertex buffer
    ///
    /// 流程：stage buffer 写入（coherent，不需要显式 flush）→ 一次性的
    /// buffer-to-buffer copy 提交到 graphics queue → 阻塞到 queue 空闲。
    /// stage buffer 在本函数的任何退出路径上都会释放。
    pub fn new_device_local_with_data(
        device: Rc<GfxDevice>,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        command_pool: &GfxCommandPool,
        data: &[u8],
    ) -> GfxResult<Self> {
        let size = data.len() as vk::DeviceSize;

        let stage_buffer = Self::new_stage_buffer(device.clone(), memory_properties, size)?;
        stage_buffer.write_mapped(data)?;

        let dst_buffer = Self::new(
            device.clone(),
            memory_properties,
            size,
            vk::BufferUsageFlags::TRANSFER_DST | vk::BufferUsageFlags::VERTEX_BUFFER,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        command_pool.one_time_exec(device.graphics_queue(), |device, cmd| {
            let copy_region = vk::BufferCopy {
                src_offset: 0,
                dst_offset: 0,
                size,
            };
            unsafe {
                device.cmd_copy_buffer(cmd, stage_buffer.handle, dst_buffer.handle, &[copy_region]);
            }
        })?;

        Ok(dst_buffer)
    }

    /// map / copy / unmap，只对 host visible 的 memory 有效
    fn write_mapped(&self, data: &[u8]) -> GfxResult<()> {
        unsafe {
            let ptr = self
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(GfxError::device_call("vkMapMemory"))?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr as *mut u8, data.len());
            self.device.unmap_memory(self.memory);
        }
        Ok(())
    }
}

// getters
impl GfxBuffer {
    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.handle
    }

    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl Drop for GfxBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.handle, None);
            if self.memory != vk::DeviceMemory::null() {
                self.device.free_memory(self.memory, None);
            }
        }
    }
}

/// 在 type filter 允许的 memory type 中找出第一个 property flags 满足要求的 index
///
/// bit i 置位表示 memory type i 可用；要求 flags 是该 type 的 property 的子集。
pub fn find_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    required: vk::MemoryPropertyFlags,
) -> GfxResult<u32> {
    for i in 0..memory_properties.memory_type_count {
        if type_filter & (1 << i) != 0
            && memory_properties.memory_types[i as usize].property_flags.contains(required)
        {
            return Ok(i);
        }
    }

    Err(GfxError::NoSuitableMemoryType {
        type_filter,
        flags: required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_properties(type_flags: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: type_flags.len() as u32,
            ..Default::default()
        };
        for (i, flags) in type_flags.iter().enumerate() {
            props.memory_types[i].property_flags = *flags;
        }
        props
    }

    #[test]
    fn test_find_memory_type_returns_smallest_index() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        let index = find_memory_type(&props, 0b0110, vk::MemoryPropertyFlags::HOST_VISIBLE).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_find_memory_type_respects_filter() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        // filter 只允许 index 3，但它不是 host visible
        let result = find_memory_type(&props, 0b1000, vk::MemoryPropertyFlags::HOST_VISIBLE);
        assert!(matches!(result, Err(GfxError::NoSuitableMemoryType { .. })));
    }

    #[test]
    fn test_find_memory_type_requires_flag_superset() {
        let props = memory_properties(&[vk::MemoryPropertyFlags::HOST_VISIBLE]);

        let required = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        assert!(find_memory_type(&props, 0b0001, required).is_err());
    }
}
