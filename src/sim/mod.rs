/// Session state and the per-tick step: registry, builder, menu, camera.

pub mod builder;
pub mod camera;
pub mod catalog;
pub mod event;
pub mod menu;
pub mod registry;
pub mod step;
pub mod world;
