//! Hand-off of a [`FlattenedBuffer`] to the GPU.
//!
//! The three attribute blocks stay non-interleaved: one vertex buffer holds all
//! of them and each block is bound as its own vertex stream.

use asset::{BlockLayout, FlattenedBuffer};
use corelib::{Attribute, FLOAT_SIZE};

use crate::error::{UploadError, UploadResult};
use wgpu::{
    Buffer, BufferAddress, BufferSlice, BufferUsages, Device, VertexAttribute, VertexBufferLayout,
    VertexStepMode, util::DeviceExt,
};

const POSITION_ATTRS: [VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const TEXCOORD_ATTRS: [VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];
const NORMAL_ATTRS: [VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// Vertex stream layout for one attribute block, tightly packed.
pub fn block_layout(attribute: Attribute) -> VertexBufferLayout<'static> {
    let attributes: &'static [VertexAttribute] = match attribute {
        Attribute::Position => &POSITION_ATTRS,
        Attribute::TexCoord => &TEXCOORD_ATTRS,
        Attribute::Normal => &NORMAL_ATTRS,
    };
    VertexBufferLayout {
        array_stride: (attribute.components() * FLOAT_SIZE) as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes,
    }
}

/// Stream layouts in binding order (slot 0 positions, 1 texcoords, 2 normals).
pub fn vertex_buffer_layouts() -> [VertexBufferLayout<'static>; 3] {
    Attribute::BLOCK_ORDER.map(block_layout)
}

/// Vertex count of `layout` as a draw range bound.
pub fn draw_count(layout: &BlockLayout) -> UploadResult<u32> {
    u32::try_from(layout.vertex_count)
        .map_err(|_| UploadError::TooManyVertices(layout.vertex_count))
}

/// Flattened mesh resident in a GPU vertex buffer.
pub struct GpuMesh {
    pub buffer: Buffer,
    pub layout: BlockLayout,
    vertex_count: u32,
}

impl GpuMesh {
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Slice to bind at the slot matching `attribute.location()`.
    /// Panics on an empty mesh, like any empty wgpu buffer slice.
    pub fn block_slice(&self, attribute: Attribute) -> BufferSlice<'_> {
        let range = self.layout.byte_range(attribute);
        self.buffer.slice(range.start as BufferAddress..range.end as BufferAddress)
    }

    /// Bind all three blocks on a render pass.
    pub fn bind<'p>(&'p self, pass: &mut wgpu::RenderPass<'p>) {
        if self.layout.vertex_count == 0 {
            return;
        }
        for attribute in Attribute::BLOCK_ORDER {
            pass.set_vertex_buffer(attribute.location(), self.block_slice(attribute));
        }
    }
}

/// Upload the whole flattened buffer in one vertex buffer.
pub fn upload_flattened(
    device: &Device,
    label: &str,
    flattened: &FlattenedBuffer,
) -> UploadResult<GpuMesh> {
    let layout = flattened.layout();
    let vertex_count = draw_count(&layout)
        .inspect_err(|err| log::warn!("Refusing to upload '{}': {}", label, err))?;
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(flattened.as_slice()),
        usage: BufferUsages::VERTEX,
    });
    log::info!(
        "Uploaded '{}': {} vertices, {} bytes (texcoords at {}, normals at {})",
        label,
        layout.vertex_count,
        layout.byte_len,
        layout.texcoord_offset,
        layout.normal_offset
    );
    Ok(GpuMesh {
        buffer,
        layout,
        vertex_count,
    })
}
