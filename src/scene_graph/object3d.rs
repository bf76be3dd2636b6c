use glam::Vec3;
use id_arena::Id;

use crate::scene_graph::layers::Layers;
use crate::scene_graph::light::Light;
use crate::scene_graph::material::MaterialId;
use crate::scene_graph::scene_model::SceneModelId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub layers: Layers,
    pub model_id: Option<SceneModelId>,
    pub material_id: Option<MaterialId>,
    pub light: Option<Light>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.set_translation(translation);
        self
    }

    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_mesh(mut self, model_id: SceneModelId, material_id: MaterialId) -> Self {
        self.model_id = Some(model_id);
        self.material_id = Some(material_id);
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.model_id.is_some()
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            layers: Layers::default(),
            model_id: None,
            material_id: None,
            light: None,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
