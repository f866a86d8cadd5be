use std::rc::Rc;

use super::arena::{ResourceId, SlotArena};
use super::mesh::Mesh;
use crate::Result;
use crate::hal::Api;
use crate::pipeline::{GraphicsPso, RootSignature};

/// Fixed capacities of the resource containers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResourceCapacities {
    pub meshes: usize,
    pub root_signatures: usize,
    pub graphics_psos: usize,
}

impl Default for ResourceCapacities {
    fn default() -> Self {
        Self {
            meshes: 64,
            root_signatures: 16,
            graphics_psos: 16,
        }
    }
}

/// Long-lived owner of GPU resources, addressed by id.
///
/// Handles are shared so render code can hold one for the length of a frame.
/// Pipeline states reference their root signature, so PSOs are released first.
pub struct ResourceManager<A: Api> {
    graphics_psos: SlotArena<Rc<GraphicsPso<A>>>,
    root_signatures: SlotArena<Rc<RootSignature<A>>>,
    meshes: SlotArena<Rc<Mesh<A>>>,
}

impl<A: Api> ResourceManager<A> {
    pub fn new(capacities: ResourceCapacities) -> Self {
        log::debug!(
            "resource manager: {} meshes, {} root signatures, {} graphics PSOs",
            capacities.meshes,
            capacities.root_signatures,
            capacities.graphics_psos
        );
        Self {
            graphics_psos: SlotArena::new("graphics PSOs", capacities.graphics_psos),
            root_signatures: SlotArena::new("root signatures", capacities.root_signatures),
            meshes: SlotArena::new("meshes", capacities.meshes),
        }
    }

    pub fn add_mesh(&mut self, mesh: impl Into<Rc<Mesh<A>>>) -> Result<ResourceId> {
        self.meshes.add(mesh.into())
    }

    pub fn mesh(&self, id: ResourceId) -> Result<Rc<Mesh<A>>> {
        self.meshes.get_cloned(id)
    }

    pub fn remove_mesh(&mut self, id: ResourceId) -> Result<Rc<Mesh<A>>> {
        self.meshes.remove(id)
    }

    pub fn add_root_signature(&mut self, root_signature: impl Into<Rc<RootSignature<A>>>) -> Result<ResourceId> {
        self.root_signatures.add(root_signature.into())
    }

    pub fn root_signature(&self, id: ResourceId) -> Result<Rc<RootSignature<A>>> {
        self.root_signatures.get_cloned(id)
    }

    pub fn remove_root_signature(&mut self, id: ResourceId) -> Result<Rc<RootSignature<A>>> {
        self.root_signatures.remove(id)
    }

    pub fn add_graphics_pso(&mut self, pso: impl Into<Rc<GraphicsPso<A>>>) -> Result<ResourceId> {
        self.graphics_psos.add(pso.into())
    }

    pub fn graphics_pso(&self, id: ResourceId) -> Result<Rc<GraphicsPso<A>>> {
        self.graphics_psos.get_cloned(id)
    }

    pub fn remove_graphics_pso(&mut self, id: ResourceId) -> Result<Rc<GraphicsPso<A>>> {
        self.graphics_psos.remove(id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn root_signature_count(&self) -> usize {
        self.root_signatures.len()
    }

    pub fn graphics_pso_count(&self) -> usize {
        self.graphics_psos.len()
    }

    /// Releases everything, pipelines before the layouts they were built with.
    pub fn clear(&mut self) {
        self.graphics_psos.clear();
        self.root_signatures.clear();
        self.meshes.clear();
    }
}

impl<A: Api> Drop for ResourceManager<A> {
    fn drop(&mut self) {
        self.clear();
        log::debug!("resource manager terminated");
    }
}
