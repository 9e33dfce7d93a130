/// What a device buffer is bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

impl BufferKind {
    /// Usage flags; every kind is a `write_buffer` destination.
    pub fn usages(self) -> wgpu::BufferUsages {
        let base = match self {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
        };
        base | wgpu::BufferUsages::COPY_DST
    }
}

/// Device-resident copy of a CPU byte region (packed vertices, indices,
/// uniforms).
///
/// Capacity only grows. `upload` reallocates when the data no longer fits;
/// callers holding bind groups over this buffer must rebuild them then.
pub struct GpuBuffer {
    kind: BufferKind,
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
    len: u64,
}

impl GpuBuffer {
    const MIN_CAPACITY: u64 = 256;

    pub fn new(kind: BufferKind, label: &'static str) -> Self {
        Self {
            kind,
            label,
            buffer: None,
            capacity: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The uploaded range, for `set_vertex_buffer`/`set_index_buffer`.
    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        match &self.buffer {
            Some(b) if self.len > 0 => Some(b.slice(..self.len)),
            _ => None,
        }
    }

    /// Copies `bytes` to the device. Returns `true` when the buffer was
    /// (re)created.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> bool {
        self.len = bytes.len() as u64;
        if bytes.is_empty() {
            return false;
        }

        let size = padded_size(bytes.len());
        let reallocated = self.ensure_capacity(device, size);

        let Some(buffer) = self.buffer.as_ref() else { return reallocated };
        if size == self.len {
            queue.write_buffer(buffer, 0, bytes);
        } else {
            // write_buffer sizes must be a multiple of COPY_BUFFER_ALIGNMENT.
            let mut padded = bytes.to_vec();
            padded.resize(size as usize, 0);
            queue.write_buffer(buffer, 0, &padded);
        }
        reallocated
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, required: u64) -> bool {
        if required <= self.capacity && self.buffer.is_some() {
            return false;
        }

        let capacity = grown_capacity(required);
        log::debug!("{}: allocating {capacity} bytes", self.label);

        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: capacity,
            usage: self.kind.usages(),
            mapped_at_creation: false,
        }));
        self.capacity = capacity;
        true
    }
}

#[inline]
fn padded_size(len: usize) -> u64 {
    wgpu::util::align_to(len as u64, wgpu::COPY_BUFFER_ALIGNMENT)
}

#[inline]
fn grown_capacity(required: u64) -> u64 {
    required.next_power_of_two().max(GpuBuffer::MIN_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_pad_to_copy_alignment() {
        assert_eq!(padded_size(12), 12);
        assert_eq!(padded_size(6), 8);
        assert_eq!(padded_size(1), 4);
    }

    #[test]
    fn capacity_grows_in_powers_of_two() {
        assert_eq!(grown_capacity(12), 256);
        assert_eq!(grown_capacity(300), 512);
        assert_eq!(grown_capacity(1024), 1024);
    }

    #[test]
    fn kinds_are_copy_destinations() {
        for kind in [BufferKind::Vertex, BufferKind::Index, BufferKind::Uniform] {
            assert!(kind.usages().contains(wgpu::BufferUsages::COPY_DST));
        }
        assert!(BufferKind::Index.usages().contains(wgpu::BufferUsages::INDEX));
    }

    #[test]
    fn new_buffer_is_empty() {
        let b = GpuBuffer::new(BufferKind::Vertex, "test vbo");
        assert!(b.is_empty());
        assert!(b.buffer().is_none());
        assert!(b.slice().is_none());
    }
}
