// renderer/states.rs
//
// Process-wide catalogue of immutable GPU state: the fixed blend table, the
// four UV-addressing samplers, the bind group layouts shared by every draw,
// and the prebuilt pipeline table. Built exactly once, on the render thread,
// before the first frame; read-only afterwards.

use std::collections::HashMap;
use std::mem;
use std::num::NonZeroU64;

use crate::model::SamplerKind;
use crate::renderer::shaders::{PixelShaderKind, ShaderVariants, VertexShaderKind};
use crate::renderer::uniforms::{CameraUniform, PerDrawUniform, PerPassUniform};
use crate::renderer::{GraphicsContext, ModelVertex, PipelineBuilder};

/// Fixed 7-entry blend table indexed by a pass's blend mode. Entries 2 and 5
/// are identical on purpose: the asset format reserves both slots and they
/// may diverge, so they are kept distinct rather than collapsed.
pub const BLEND_TABLE: [Option<wgpu::BlendState>; 7] = [
    // 0: opaque
    None,
    // 1: opaque with alpha-key (the keying happens in the shader)
    Some(wgpu::BlendState::REPLACE),
    // 2: standard alpha blend
    Some(wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }),
    // 3: multiplicative
    Some(wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Src,
            dst_factor: wgpu::BlendFactor::Dst,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::DstAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }),
    // 4: additive
    Some(wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }),
    // 5: alpha blend, reserved duplicate of 2
    Some(wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }),
    // 6: additive color-swap
    Some(wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Dst,
            dst_factor: wgpu::BlendFactor::Src,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::DstAlpha,
            dst_factor: wgpu::BlendFactor::SrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }),
];

/// Only the opaque modes write depth; everything blended tests but keeps the
/// depth buffer untouched.
pub fn depth_write_for_blend(blend_mode: u8) -> bool {
    blend_mode <= 1
}

/// Everything a pipeline lookup needs. Depth write is not part of the key
/// because it is fully determined by the blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub blend_mode: u8,
    pub two_sided: bool,
    pub vertex: VertexShaderKind,
    pub pixel: PixelShaderKind,
}

pub(crate) struct Samplers {
    wrap_both: wgpu::Sampler,
    wrap_u: wgpu::Sampler,
    wrap_v: wgpu::Sampler,
    clamp_both: wgpu::Sampler,
}

impl Samplers {
    fn new(device: &wgpu::Device) -> Self {
        let make = |label, address_u, address_v| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: address_u,
                address_mode_v: address_v,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                anisotropy_clamp: 16,
                ..Default::default()
            })
        };

        use wgpu::AddressMode::{ClampToEdge, Repeat};
        Self {
            wrap_both: make("SamplerWrapBoth", Repeat, Repeat),
            wrap_u: make("SamplerWrapU", Repeat, ClampToEdge),
            wrap_v: make("SamplerWrapV", ClampToEdge, Repeat),
            clamp_both: make("SamplerClampBoth", ClampToEdge, ClampToEdge),
        }
    }

    pub(crate) fn get(&self, kind: SamplerKind) -> &wgpu::Sampler {
        match kind {
            SamplerKind::WrapBoth => &self.wrap_both,
            SamplerKind::WrapU => &self.wrap_u,
            SamplerKind::WrapV => &self.wrap_v,
            SamplerKind::ClampBoth => &self.clamp_both,
        }
    }
}

pub struct SharedStateRegistry {
    samplers: Samplers,
    pub(crate) camera_layout: wgpu::BindGroupLayout,
    pub(crate) bones_layout: wgpu::BindGroupLayout,
    pub(crate) draw_pass_layout: wgpu::BindGroupLayout,
    pub(crate) texture_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    _fallback_texture: wgpu::Texture,
    fallback_view: wgpu::TextureView,
    default_texture_bind: wgpu::BindGroup,
}

impl SharedStateRegistry {
    /// Builds the full catalogue. Must run once, before any draw; resource
    /// creation failure here is fatal to the rendering subsystem.
    pub fn initialize(gx: &GraphicsContext, variants: &ShaderVariants) -> Self {
        let device = &gx.device;
        let samplers = Samplers::new(device);

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("CameraBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            }],
        });

        let bones_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("BonesBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let draw_pass_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("DrawPassBindLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(
                            mem::size_of::<PerDrawUniform>() as u64
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(
                            mem::size_of::<PerPassUniform>() as u64
                        ),
                    },
                    count: None,
                },
            ],
        });

        let mut texture_entries = Vec::with_capacity(8);
        for stage in 0..4u32 {
            texture_entries.push(wgpu::BindGroupLayoutEntry {
                binding: stage,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        for stage in 0..4u32 {
            texture_entries.push(wgpu::BindGroupLayoutEntry {
                binding: 4 + stage,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("PassTextureBindLayout"),
            entries: &texture_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ModelPipelineLayout"),
            bind_group_layouts: &[
                &camera_layout,
                &bones_layout,
                &draw_pass_layout,
                &texture_layout,
            ],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        for blend_mode in 0..BLEND_TABLE.len() as u8 {
            for &two_sided in &[false, true] {
                for &vertex in &VertexShaderKind::ALL {
                    for &pixel in &PixelShaderKind::ALL {
                        let key = PipelineKey {
                            blend_mode,
                            two_sided,
                            vertex,
                            pixel,
                        };
                        pipelines.insert(
                            key,
                            Self::create_pipeline(gx, &pipeline_layout, variants, key),
                        );
                    }
                }
            }
        }
        log::info!("Built {} model pipeline variants", pipelines.len());

        let (fallback_texture, fallback_view) = Self::create_fallback_texture(gx);
        let default_texture_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("DefaultPassTextureBindGroup"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&fallback_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&fallback_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&fallback_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&fallback_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&samplers.wrap_both),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&samplers.wrap_both),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(&samplers.wrap_both),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::Sampler(&samplers.wrap_both),
                },
            ],
        });

        Self {
            samplers,
            camera_layout,
            bones_layout,
            draw_pass_layout,
            texture_layout,
            pipelines,
            _fallback_texture: fallback_texture,
            fallback_view,
            default_texture_bind,
        }
    }

    fn create_pipeline(
        gx: &GraphicsContext,
        layout: &wgpu::PipelineLayout,
        variants: &ShaderVariants,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        let blend = BLEND_TABLE[key.blend_mode as usize];
        let mut builder = PipelineBuilder::new(&gx.device, layout, variants.module())
            .with_label("ModelPipeline")
            .with_vertex_entry(key.vertex.entry_point())
            .with_fragment_entry(key.pixel.entry_point())
            .with_vertex_buffer(ModelVertex::layout())
            .with_color_target(gx.color_format, blend)
            .with_depth_stencil(
                gx.depth_format,
                depth_write_for_blend(key.blend_mode),
                wgpu::CompareFunction::LessEqual,
            )
            .with_multisample(gx.sample_count);

        if key.two_sided {
            builder = builder.with_no_culling();
        }

        builder.build()
    }

    fn create_fallback_texture(gx: &GraphicsContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("FallbackTexture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // White so multiplicative combiners treat unused stages as neutral.
        gx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255u8, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    pub fn pipeline(&self, key: PipelineKey) -> &wgpu::RenderPipeline {
        self.pipelines.get(&key).expect("missing pipeline variant")
    }

    pub(crate) fn sampler(&self, kind: SamplerKind) -> &wgpu::Sampler {
        self.samplers.get(kind)
    }

    pub(crate) fn fallback_view(&self) -> &wgpu::TextureView {
        &self.fallback_view
    }

    /// Frame-default texture bindings (fallback views, wrap-both samplers).
    pub(crate) fn default_texture_bind(&self) -> &wgpu::BindGroup {
        &self.default_texture_bind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_write_only_for_opaque_modes() {
        for blend_mode in 0..BLEND_TABLE.len() as u8 {
            assert_eq!(depth_write_for_blend(blend_mode), blend_mode <= 1);
        }
    }

    #[test]
    fn blend_slots_two_and_five_are_distinct_but_equal() {
        // Reserved duplicate: same configuration, separate table slots.
        assert_eq!(BLEND_TABLE[2], BLEND_TABLE[5]);
    }

    #[test]
    fn opaque_modes_do_not_blend() {
        assert!(BLEND_TABLE[0].is_none());
        assert_eq!(BLEND_TABLE[1], Some(wgpu::BlendState::REPLACE));
    }

    #[test]
    fn additive_mode_uses_one_as_destination_factor() {
        let additive = BLEND_TABLE[4].unwrap();
        assert_eq!(additive.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(additive.color.dst_factor, wgpu::BlendFactor::One);
    }
}
