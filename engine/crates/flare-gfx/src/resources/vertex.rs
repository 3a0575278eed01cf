use std::mem::offset_of;

use ash::vk;

/// 顶点类型向 pipeline 描述自己在 buffer 中的布局
pub trait GfxVertexLayout {
    fn vertex_input_bindings() -> Vec<vk::VertexInputBindingDescription>;
    fn vertex_input_attributes() -> Vec<vk::VertexInputAttributeDescription>;
}

/// 交错排列的 2D position + RGB color 顶点
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex2D {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

impl GfxVertexLayout for ColorVertex2D {
    fn vertex_input_bindings() -> Vec<vk::VertexInputBindingDescription> {
        vec![vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<ColorVertex2D>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    fn vertex_input_attributes() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            // position
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(ColorVertex2D, position) as u32,
            },
            // color
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 1,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(ColorVertex2D, color) as u32,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_interleaved() {
        let bindings = ColorVertex2D::vertex_input_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].stride, 20);

        let attributes = ColorVertex2D::vertex_input_attributes();
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[1].offset, 8);
    }
}
