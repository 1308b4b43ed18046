//! Time-dependent spectrum evaluation pass.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::fft::WORKGROUP_SIZE;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct EvolveParams {
    grid_size: u32,
    domain_length_m: f32,
    time_s: f32,
    _pad: u32,
}

/// Rotates the initial spectrum to simulation time `t` and derives the
/// slope and displacement spectra, writing into the FFT input textures.
pub struct SpectrumEvaluator {
    grid_size: u32,
    domain_length_m: f32,
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SpectrumEvaluator {
    pub fn new(
        device: &wgpu::Device,
        grid_size: u32,
        domain_length_m: f32,
        initial_view: &wgpu::TextureView,
        evolved_views: [&wgpu::TextureView; 3],
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Evolve Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                storage_texture_entry(1),
                storage_texture_entry(2),
                storage_texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
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
            label: Some("Evolve Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("evolve.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Evolve Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Evolve Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("evolve_spectrum"),
            compilation_options: Default::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Evolve Uniform Buffer"),
            contents: bytemuck::cast_slice(&[EvolveParams {
                grid_size,
                domain_length_m,
                time_s: 0.0,
                _pad: 0,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Evolve Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(initial_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(evolved_views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(evolved_views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(evolved_views[2]),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            grid_size,
            domain_length_m,
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    /// Record the evaluation dispatch for simulation time `time_s`.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, queue: &wgpu::Queue, time_s: f32) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[EvolveParams {
                grid_size: self.grid_size,
                domain_length_m: self.domain_length_m,
                time_s,
                _pad: 0,
            }]),
        );

        let workgroups = self.grid_size.div_ceil(WORKGROUP_SIZE);
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Evolve Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(workgroups, workgroups, 1);
    }
}

fn storage_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: wgpu::TextureFormat::Rgba32Float,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}
