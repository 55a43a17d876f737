//! The scene value: a camera, the object groups it and the shading kernel
//! can target, and the light registry instances refer to by [`LightId`].
//! Scene-description parsing is out of scope here; this is the in-memory
//! value the renderer consumes, built however the embedding application
//! likes.

use std::sync::Arc;

use crate::camera::Camera;
use crate::context::TraceLimits;
use crate::error::RenderError;
use crate::group::ObjectGroup;
use crate::instance::{LightId, TargetGroupId};
use crate::light::Light;

pub struct Scene {
    camera: Option<Camera>,
    groups: Vec<Arc<ObjectGroup>>,
    lights: Vec<Arc<dyn Light>>,
    limits: TraceLimits,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            camera: None,
            groups: Vec::new(),
            lights: Vec::new(),
            limits: TraceLimits::default().clamped(),
        }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn set_limits(&mut self, limits: TraceLimits) {
        self.limits = limits.clamped();
    }

    /// Registers an object group, returning the [`TargetGroupId`] instances
    /// can reference it by (for reflection, refraction, or shadow
    /// targets, or as the scene's primary render target).
    pub fn push_group(&mut self, group: ObjectGroup) -> TargetGroupId {
        let id = TargetGroupId(self.groups.len() as u32);
        self.groups.push(Arc::new(group));
        id
    }

    /// Registers a light, returning the [`LightId`] instances reference it
    /// by in their light list.
    pub fn push_light(&mut self, light: Arc<dyn Light>) -> LightId {
        let id = LightId(self.lights.len() as u32);
        self.lights.push(light);
        id
    }

    /// The scene's primary render target: the first group pushed, by
    /// convention.
    pub fn default_target(&self) -> TargetGroupId {
        TargetGroupId(0)
    }

    pub fn camera(&self) -> Result<&Camera, RenderError> {
        self.camera.as_ref().ok_or(RenderError::NoCamera)
    }

    pub fn limits(&self) -> &TraceLimits {
        &self.limits
    }

    pub fn group(&self, id: TargetGroupId) -> &Arc<ObjectGroup> {
        &self.groups[id.0 as usize]
    }

    pub fn light(&self, id: LightId) -> &Arc<dyn Light> {
        &self.lights[id.0 as usize]
    }

    /// Runs every light's [`Light::preprocess`] once, before the first
    /// trace call.
    pub fn finalize(&self) -> Result<(), RenderError> {
        if self.camera.is_none() {
            return Err(RenderError::NoCamera);
        }
        if self.groups.is_empty() {
            return Err(RenderError::EmptyScene);
        }
        for light in &self.lights {
            light.preprocess();
        }
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Rad, Vector3};

    #[test]
    fn finalize_fails_without_a_camera() {
        let mut scene = Scene::new();
        scene.push_group(ObjectGroup::new(Vec::new()));
        assert!(matches!(scene.finalize(), Err(RenderError::NoCamera)));
    }

    #[test]
    fn finalize_succeeds_with_camera_and_group() {
        let mut scene = Scene::new();
        scene.set_camera(Camera::look_at(
            Point3::new(0.0, 0.0, -5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Rad(1.0),
            1.0,
            0.0,
            1.0,
        ));
        scene.push_group(ObjectGroup::new(Vec::new()));
        assert!(scene.finalize().is_ok());
    }
}
