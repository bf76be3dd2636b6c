use std::mem::offset_of;

use anyhow::{bail, Context};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use gltf::buffer;
use itertools::izip;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: Buffers,
    ) -> anyhow::Result<Model> {
        let mut model = Model {
            name: name.into(),
            primitives: Vec::new(),
        };

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                bail!(
                    "Unsupported primitive mode in {}: {:?}",
                    model.name,
                    primitive.mode()
                );
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<Vec3> = reader
                .read_positions()
                .with_context(|| format!("Primitive without positions in {}", model.name))?
                .map(Vec3::from)
                .collect();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let normals: Vec<Vec3> = match reader.read_normals() {
                Some(normals) => normals.map(Vec3::from).collect(),
                None => compute_vertex_normals(&positions, &indices),
            };

            let tex_coords: Vec<Vec2> = match reader.read_tex_coords(0) {
                Some(tex_coords) => tex_coords.into_f32().map(Vec2::from).collect(),
                None => vec![Vec2::ZERO; positions.len()],
            };

            let vertices = izip!(positions, normals, tex_coords)
                .map(|(position, normal, tex_coords)| Vertex {
                    position,
                    normal,
                    tex_coords,
                })
                .collect::<Vec<Vertex>>();

            model.primitives.push(ModelPrimitive {
                index: primitive.index(),
                vertices,
                indices,
            });
        }

        if model.primitives.is_empty() {
            bail!("Mesh without primitives: {}", model.name);
        }

        Ok(model)
    }

    /// A `width` x `height` quad in the XY plane, facing +Z.
    pub fn plane(name: impl Into<String>, width: f32, height: f32) -> Model {
        let (hw, hh) = (width / 2.0, height / 2.0);

        let corners = [
            (Vec3::new(-hw, hh, 0.0), Vec2::new(0.0, 0.0)),
            (Vec3::new(hw, hh, 0.0), Vec2::new(1.0, 0.0)),
            (Vec3::new(-hw, -hh, 0.0), Vec2::new(0.0, 1.0)),
            (Vec3::new(hw, -hh, 0.0), Vec2::new(1.0, 1.0)),
        ];

        let vertices = corners
            .iter()
            .map(|&(position, tex_coords)| Vertex {
                position,
                normal: Vec3::Z,
                tex_coords,
            })
            .collect();

        Model {
            name: name.into(),
            primitives: vec![ModelPrimitive {
                index: 0,
                vertices,
                indices: vec![0, 2, 1, 2, 3, 1],
            }],
        }
    }
}

/// Area-weighted smooth normals for meshes exported without them.
fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face_normal = (positions[b] - positions[a]).cross(positions[c] - positions[a]);

        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }

    normals
        .into_iter()
        .map(|normal| normal.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

pub const MODEL_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, tex_coords) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_faces_forward() {
        let plane = Model::plane("Plane", 20.0, 20.0);
        let primitive = &plane.primitives[0];

        assert_eq!(primitive.vertices.len(), 4);
        assert_eq!(primitive.indices.len(), 6);

        // Counter-clockwise winding seen from +Z
        for triangle in primitive.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                .map(|i| primitive.vertices[i as usize].position);
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }

    #[test]
    fn plane_extent() {
        let plane = Model::plane("Plane", 20.0, 10.0);
        let max = plane.primitives[0]
            .vertices
            .iter()
            .fold(Vec3::splat(f32::MIN), |acc, v| acc.max(v.position));
        assert_eq!(max, Vec3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn computed_normals_match_winding() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }

    #[test]
    fn degenerate_normals_fall_back() {
        let positions = [Vec3::ZERO, Vec3::ZERO, Vec3::ZERO];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![Vec3::Y; 3]);
    }
}
