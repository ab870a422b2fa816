//! Typed uniform buffers.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// A uniform buffer holding exactly one `Content`. Writes that would not
/// change the buffer are skipped.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    last_written: Vec<u8>,
    _content: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    fn label() -> String {
        let type_name = std::any::type_name::<Content>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        format!("{short} Uniform")
    }

    /// Zero-initialised buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        Self::new_with_data(device, &bytemuck::Zeroable::zeroed())
    }

    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let bytes = bytemuck::bytes_of(initial_content);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&Self::label()),
            contents: bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            last_written: bytes.to_vec(),
            _content: PhantomData,
        }
    }

    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let bytes = bytemuck::bytes_of(&content);
        if self.last_written == bytes {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_written.clear();
        self.last_written.extend_from_slice(bytes);
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}
