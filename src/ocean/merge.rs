//! Texture merger / post-process pass, owner of the foam accumulation state.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::fft::WORKGROUP_SIZE;
use crate::params::{FoamParams, WindParameters};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct MergeParams {
    grid_size: u32,
    texel_size_m: f32,
    choppiness: f32,
    normalization: f32,
    foam_decay: f32,
    foam_threshold: f32,
    foam_gain: f32,
    foam_cap: f32,
}

/// Combines the transformed spatial fields into the displacement, normal and
/// foam textures the renderer samples.
///
/// Foam is the only cross-frame state in the pipeline and lives here as a
/// ping-pong texture pair: each frame reads the previous buffer and writes
/// the next. Callers go through [`TextureMerger::record`] (advance) and
/// [`TextureMerger::reset_foam`]; the storage is never handed out mutably.
pub struct TextureMerger {
    grid_size: u32,
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    foam_textures: [wgpu::Texture; 2],
    foam_views: [wgpu::TextureView; 2],
    bind_groups: Vec<wgpu::BindGroup>,
}

impl TextureMerger {
    pub fn new(
        device: &wgpu::Device,
        grid_size: u32,
        spatial_views: [&wgpu::TextureView; 3],
        displacement_views: [&wgpu::TextureView; 2],
        normal_views: [&wgpu::TextureView; 2],
    ) -> Self {
        let foam_textures = [
            create_foam_texture(device, grid_size, 0),
            create_foam_texture(device, grid_size, 1),
        ];
        let foam_views = [
            foam_textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            foam_textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Merge Bind Group Layout"),
            entries: &[
                sampled_texture_entry(0),
                sampled_texture_entry(1),
                sampled_texture_entry(2),
                sampled_texture_entry(3),
                storage_texture_entry(4),
                storage_texture_entry(5),
                storage_texture_entry(6),
                wgpu::BindGroupLayoutEntry {
                    binding: 7,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Merge Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("merge.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Merge Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Merge Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("merge_surface"),
            compilation_options: Default::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Merge Uniform Buffer"),
            contents: bytemuck::cast_slice(&[MergeParams::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // One bind group per write parity: read last frame's foam, write the
        // other buffer together with this frame's output set
        let bind_groups = (0..2)
            .map(|parity| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Merge Bind Group {}", parity)),
                    layout: &bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(spatial_views[0]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(spatial_views[1]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(spatial_views[2]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::TextureView(
                                &foam_views[1 - parity],
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: wgpu::BindingResource::TextureView(
                                displacement_views[parity],
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 5,
                            resource: wgpu::BindingResource::TextureView(normal_views[parity]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 6,
                            resource: wgpu::BindingResource::TextureView(&foam_views[parity]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 7,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                    ],
                })
            })
            .collect();

        Self {
            grid_size,
            pipeline,
            uniform_buffer,
            foam_textures,
            foam_views,
            bind_groups,
        }
    }

    /// Foam view for the renderer's per-parity surface bind groups
    pub fn foam_view(&self, parity: usize) -> &wgpu::TextureView {
        &self.foam_views[parity]
    }

    /// Record the merge dispatch, advancing foam by `dt_s`.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        parity: usize,
        wind: &WindParameters,
        foam: &FoamParams,
        dt_s: f32,
    ) {
        let n = self.grid_size;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[MergeParams {
                grid_size: n,
                texel_size_m: wind.domain_length_m / n as f32,
                choppiness: wind.choppiness,
                // The butterfly passes are unnormalized; the inverse-transform
                // scaling is applied exactly once, here
                normalization: 1.0 / (n * n) as f32,
                foam_decay: foam.frame_decay(dt_s),
                foam_threshold: foam.jacobian_threshold,
                foam_gain: foam.gain,
                foam_cap: foam.cap,
            }]),
        );

        let workgroups = n.div_ceil(WORKGROUP_SIZE);
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Merge Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_groups[parity], &[]);
        cpass.dispatch_workgroups(workgroups, workgroups, 1);
    }

    /// Clear both foam buffers to zero (new wind epoch).
    pub fn reset_foam(&self, queue: &wgpu::Queue) {
        let n = self.grid_size;
        let zeros = vec![0u8; (n * n * 8) as usize];
        for texture in &self.foam_textures {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &zeros,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(n * 8),
                    rows_per_image: Some(n),
                },
                wgpu::Extent3d {
                    width: n,
                    height: n,
                    depth_or_array_layers: 1,
                },
            );
        }
    }
}

fn create_foam_texture(device: &wgpu::Device, grid_size: u32, index: usize) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("Foam Texture {}", index)),
        size: wgpu::Extent3d {
            width: grid_size,
            height: grid_size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn sampled_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn storage_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: wgpu::TextureFormat::Rgba16Float,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}
