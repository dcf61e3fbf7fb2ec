// renderer/context.rs

/// Handle to the device-level graphics state the subsystem draws with. The
/// surrounding editor owns the real swapchain; this type only carries what
/// resource creation and uploads need.
pub struct GraphicsContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub sample_count: u32,
}

impl GraphicsContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        Self {
            device,
            queue,
            color_format,
            depth_format,
            sample_count,
        }
    }

    /// Surfaceless context for headless tooling. Device acquisition failure
    /// is fatal; there is no degraded rendering mode.
    pub fn offscreen() -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .expect("adapter");

        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .expect("device");

        Self::new(
            device,
            queue,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Depth32Float,
            1,
        )
    }

    /// Alignment for dynamic uniform offsets on this device.
    pub fn uniform_alignment(&self) -> u32 {
        self.device.limits().min_uniform_buffer_offset_alignment
    }
}
