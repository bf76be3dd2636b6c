use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;
use std::collections::HashMap;

use crate::model::{Buffers, Model};
use crate::scene_graph::layers::Layers;
use crate::scene_graph::light::Light;
use crate::scene_graph::material::{Material, MaterialId};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
    pub materials: Arena<Material>,
    gltf_mesh_to_model: HashMap<usize, SceneModelId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            materials: Arena::new(),
            gltf_mesh_to_model: HashMap::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Adds `object` as a child of `parent`.
    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let id = self.add_object(object);
        self.set_object_parent(id, Some(parent));
        id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    #[cfg(test)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.alloc(material)
    }

    pub fn get_material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Spawns every node of a glTF scene under a new group object and returns
    /// the group. Meshes start out with `default_material`.
    ///
    /// All meshes are converted before any object is added, so a failed
    /// conversion leaves the scene untouched.
    pub fn spawn_gltf_scene(
        &mut self,
        name: &str,
        buffers: Buffers,
        scene: &gltf::Scene,
        default_material: MaterialId,
    ) -> anyhow::Result<ObjectId> {
        let mut new_models: Vec<(usize, Model)> = Vec::new();

        for node in scene.nodes() {
            self.convert_gltf_meshes(buffers, &node, &mut new_models)?;
        }

        for (mesh_index, model) in new_models {
            let model_id = self.add_model(SceneModel::new(model));
            self.gltf_mesh_to_model.insert(mesh_index, model_id);
        }

        let root = self.add_object(Object3D::new(name));

        for node in scene.nodes() {
            self.spawn_gltf_node(&node, root, default_material);
        }

        Ok(root)
    }

    fn convert_gltf_meshes(
        &self,
        buffers: Buffers,
        node: &gltf::Node,
        new_models: &mut Vec<(usize, Model)>,
    ) -> anyhow::Result<()> {
        if let Some(mesh) = node.mesh() {
            let mesh_index = mesh.index();
            let known = self.gltf_mesh_to_model.contains_key(&mesh_index)
                || new_models.iter().any(|(index, _)| *index == mesh_index);

            if !known {
                let mesh_name = mesh
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{} (Mesh)", gltf_node_name(node)));

                new_models.push((mesh_index, Model::from_gltf(mesh_name, mesh, buffers)?));
            }
        }

        for child in node.children() {
            self.convert_gltf_meshes(buffers, &child, new_models)?;
        }

        Ok(())
    }

    fn spawn_gltf_node(
        &mut self,
        node: &gltf::Node,
        parent: ObjectId,
        default_material: MaterialId,
    ) -> ObjectId {
        let mut object = Object3D::new(gltf_node_name(node));
        let (translation, rotation, scale) = node.transform().decomposed();

        object.transform.set_transform(
            translation.into(),
            Quat::from_array(rotation),
            scale[0], // Assume uniform scale for simplicity
        );

        if let Some(model_id) = node
            .mesh()
            .and_then(|mesh| self.gltf_mesh_to_model.get(&mesh.index()).copied())
        {
            object.model_id = Some(model_id);
            object.material_id = Some(default_material);
        }

        let object_id = self.add_child(parent, object);

        for child in node.children() {
            self.spawn_gltf_node(&child, object_id, default_material);
        }

        object_id
    }

    /// `root` and everything below it, depth first.
    pub fn descendants(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if let Some(object) = self.objects.get(id) {
                result.push(id);
                stack.extend(object.child_ids.iter().rev());
            }
        }

        result
    }

    /// Gives every mesh below `root` the same material and layers.
    pub fn override_meshes(&mut self, root: ObjectId, material: MaterialId, layers: Layers) {
        for id in self.descendants(root) {
            if let Some(object) = self.objects.get_mut(id) {
                if object.is_mesh() {
                    object.material_id = Some(material);
                    object.layers = layers;
                }
            }
        }
    }

    pub fn lights(&self) -> impl Iterator<Item = (&Object3D, &Light)> {
        self.objects
            .iter()
            .filter_map(|(_, object)| object.light.as_ref().map(|light| (object, light)))
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    /// Recursively updates an object's world transform and its children
    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    /// Rewrites a single coordinate of an object's local translation.
    pub fn update_object_translation(
        &mut self,
        object_id: ObjectId,
        f: impl FnOnce(&mut Vec3),
    ) {
        if let Some(mut translation) = self
            .get_object_transform(object_id)
            .map(Transform::translation)
        {
            f(&mut translation);
            self.set_object_translation(object_id, translation);
        }
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn world_matrix(&self, object_id: ObjectId) -> Option<Mat4> {
        self.get_object_transform(object_id)
            .map(|transform| *transform.get_world_matrix())
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

fn gltf_node_name(node: &gltf::Node) -> String {
    node.name().unwrap_or("Unnamed").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::layers::{BACKGROUND_LAYER, GLASS_LAYER};
    use crate::scene_graph::material::{BasicMaterial, PhysicalMaterial};

    #[test]
    fn children_inherit_parent_transform() {
        let mut scene = Scene::new();
        let rig = scene.add_object(Object3D::new("Rig"));
        let camera = scene.add_child(
            rig,
            Object3D::new("Camera").with_translation(Vec3::new(0.0, 3.0, 15.0)),
        );

        scene.set_object_translation(rig, Vec3::new(0.5, -0.25, 0.0));
        scene.late_update();

        let position = scene.get_object_transform(camera).unwrap().world_position();
        assert!((position - Vec3::new(0.5, 2.75, 15.0)).length() < 1e-6);
    }

    #[test]
    fn moving_a_parent_invalidates_children() {
        let mut scene = Scene::new();
        let parent = scene.add_object(Object3D::new("Parent"));
        let child = scene.add_child(parent, Object3D::new("Child").with_translation(Vec3::X));
        scene.late_update();

        scene.set_object_translation(parent, Vec3::Y);
        assert!(scene.get_object_transform(child).unwrap().is_world_dirty());

        scene.late_update();
        assert_eq!(
            scene.get_object_transform(child).unwrap().world_position(),
            Vec3::new(1.0, 1.0, 0.0)
        );
    }

    #[test]
    fn reparenting_updates_child_lists() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object3D::new("A"));
        let b = scene.add_object(Object3D::new("B"));
        let child = scene.add_child(a, Object3D::new("Child"));

        scene.set_object_parent(child, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![child]);
        assert_eq!(scene.get_object(child).unwrap().parent_id, Some(b));
    }

    #[test]
    fn update_translation_touches_one_axis() {
        let mut scene = Scene::new();
        let light = scene
            .add_object(Object3D::new("Light").with_translation(Vec3::new(-5.0, 2.0, 0.0)));

        scene.update_object_translation(light, |t| t.x = 3.0);

        assert_eq!(
            scene.get_object_transform(light).unwrap().translation(),
            Vec3::new(3.0, 2.0, 0.0)
        );
    }

    #[test]
    fn override_meshes_skips_non_meshes() {
        let mut scene = Scene::new();
        let basic = scene.add_material(Material::Basic(BasicMaterial::default()));
        let glass = scene.add_material(Material::Physical(PhysicalMaterial::glass()));
        let model = scene.add_model(SceneModel::new(Model::plane("Quad", 1.0, 1.0)));

        let root = scene.add_object(Object3D::new("Root"));
        let group = scene.add_child(root, Object3D::new("Group"));
        let mesh = scene.add_child(group, Object3D::new("Mesh").with_mesh(model, basic));
        let other = scene.add_object(
            Object3D::new("Other")
                .with_mesh(model, basic)
                .with_layers(Layers::only(BACKGROUND_LAYER)),
        );

        scene.override_meshes(root, glass, Layers::only(GLASS_LAYER));

        let mesh = scene.get_object(mesh).unwrap();
        assert_eq!(mesh.material_id, Some(glass));
        assert_eq!(mesh.layers, Layers::only(GLASS_LAYER));

        let group = scene.get_object(group).unwrap();
        assert_eq!(group.material_id, None);
        assert_eq!(group.layers, Layers::default());

        assert_eq!(scene.get_object(other).unwrap().material_id, Some(basic));
    }

    #[test]
    fn descendants_are_depth_first() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::new("Root"));
        let a = scene.add_child(root, Object3D::new("A"));
        let a1 = scene.add_child(a, Object3D::new("A1"));
        let b = scene.add_child(root, Object3D::new("B"));

        assert_eq!(scene.descendants(root), vec![root, a, a1, b]);
        assert_eq!(scene.get_object_by_name("A1"), Some(a1));
    }

    // One triangle mesh and one line mesh sharing a position accessor.
    const TWO_MESH_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": SCENE_NODES }],
        "nodes": [
            { "name": "Triangle", "mesh": 0 },
            { "name": "Lines", "mesh": 1 }
        ],
        "meshes": [
            { "name": "Triangle", "primitives": [{ "attributes": { "POSITION": 0 } }] },
            { "name": "Lines", "primitives": [{ "attributes": { "POSITION": 0 }, "mode": 1 }] }
        ],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0, 0, 0],
            "max": [1, 1, 0]
        }]
    }"#;

    fn spawn_two_mesh_gltf(scene: &mut Scene, scene_nodes: &str) -> anyhow::Result<ObjectId> {
        let json = TWO_MESH_GLTF.replace("SCENE_NODES", scene_nodes);
        let (document, buffers, _images) = gltf::import_slice(json.as_bytes()).unwrap();
        let gltf_scene = document.default_scene().unwrap();
        let glass = scene.add_material(Material::Physical(PhysicalMaterial::glass()));

        scene.spawn_gltf_scene("Two meshes", &buffers, &gltf_scene, glass)
    }

    #[test]
    fn gltf_meshes_spawn_under_a_root() {
        let mut scene = Scene::new();
        let root = spawn_two_mesh_gltf(&mut scene, "[0]").unwrap();

        let objects = scene.descendants(root);
        assert_eq!(objects.len(), 2);
        assert_eq!(scene.models.len(), 1);

        let triangle = scene.get_object(objects[1]).unwrap();
        assert_eq!(triangle.name, "Triangle");
        assert!(triangle.is_mesh());
    }

    #[test]
    fn failed_gltf_spawn_leaves_scene_untouched() {
        let mut scene = Scene::new();
        let existing = scene.add_object(Object3D::new("Existing"));

        let result = spawn_two_mesh_gltf(&mut scene, "[0, 1]");

        assert!(result.is_err());
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.models.len(), 0);
        assert!(scene.get_object(existing).is_some());
        assert!(scene.gltf_mesh_to_model.is_empty());
    }
}
