#![warn(missing_docs)]

//! Hierarchical scene graph for zflat.
//!
//! A [`Scene`] stores definitions (shared geometry containers) in slotmap
//! arenas. Instances place definitions inside other definitions with a
//! local [`Transform`](zflat_math::Transform); the scene root is itself a
//! definition that is never instanced.
//!
//! Editing operations talk to the scene through the [`SceneHost`] trait:
//! vertex displacement, guide transforms, curve explosion, `make_unique`,
//! and operation bracketing with one undo entry per operation.
//!
//! # Example
//!
//! ```
//! use zflat_math::{Point3, Transform};
//! use zflat_scene::{InstanceKind, Scene};
//!
//! let mut scene = Scene::default();
//! let root = scene.root();
//! let post = scene.add_definition("Post");
//! scene
//!     .add_polyline(post, &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 3.0)], false)
//!     .unwrap();
//! let a = scene.add_instance(root, post, Transform::identity(), InstanceKind::Component).unwrap();
//! scene
//!     .add_instance(root, post, Transform::translation(5.0, 0.0, 0.0), InstanceKind::Component)
//!     .unwrap();
//! assert_eq!(scene.reference_count(post), 2);
//!
//! let copy = scene.make_unique(a).unwrap();
//! assert_ne!(copy, post);
//! ```

pub mod entity;
pub mod error;
pub mod host;
pub mod scene;
pub mod transaction;
pub mod units;

pub use entity::{
    Curve, CurveId, CurveKind, Definition, DefinitionId, Edge, EdgeId, Entity, Face, FaceId,
    Guide, GuideId, GuideKind, Instance, InstanceId, InstanceKind, Vertex, VertexId,
};
pub use error::{Result, SceneError};
pub use host::{Contents, SceneHost};
pub use scene::Scene;
pub use transaction::{Journal, UndoEntry};
pub use units::LengthUnit;
