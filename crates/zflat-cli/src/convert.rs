//! Conversion between scene documents and live scenes.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, bail, Context, Result};
use zflat_ir as ir;
use zflat_math::{Point3, Transform, Vec3};
use zflat_scene::{
    CurveId, CurveKind, DefinitionId, EdgeId, Entity, FaceId, GuideId, GuideKind, InstanceId,
    InstanceKind, LengthUnit, Scene, VertexId,
};

/// A scene built from a document, with its selection resolved.
pub struct Loaded {
    pub scene: Scene,
    pub selection: Vec<Entity>,
}

/// Scene ids of one definition's entities, in document order.
#[derive(Default)]
struct DefinitionIds {
    id: Option<DefinitionId>,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
    curves: Vec<CurveId>,
    guides: Vec<GuideId>,
    instances: Vec<InstanceId>,
}

fn pick<T: Copy>(list: &[T], index: usize, what: &str, definition: &str) -> Result<T> {
    list.get(index).copied().ok_or_else(|| {
        anyhow!(
            "{what} {index} out of range in '{definition}' (it has {})",
            list.len()
        )
    })
}

fn point(p: &[f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

fn curve_kind(kind: ir::CurveKind) -> CurveKind {
    match kind {
        ir::CurveKind::Arc => CurveKind::Arc,
        ir::CurveKind::Circle => CurveKind::Circle,
        ir::CurveKind::Polyline => CurveKind::Polyline,
    }
}

fn instance_kind(kind: ir::InstanceKind) -> InstanceKind {
    match kind {
        ir::InstanceKind::Group => InstanceKind::Group,
        ir::InstanceKind::Component => InstanceKind::Component,
    }
}

/// Build a scene from `doc`.
pub fn scene_from_document(doc: &ir::Document) -> Result<Loaded> {
    if doc.version != ir::FORMAT_VERSION {
        bail!(
            "unsupported document version {} (expected {})",
            doc.version,
            ir::FORMAT_VERSION
        );
    }
    let units = LengthUnit::from_suffix(&doc.units)
        .ok_or_else(|| anyhow!("unknown model unit '{}'", doc.units))?;

    let mut names = HashSet::new();
    for def in &doc.definitions {
        if !names.insert(def.name.as_str()) {
            bail!("definition '{}' appears more than once", def.name);
        }
    }
    if !names.contains(doc.root.as_str()) {
        bail!("root definition '{}' is missing", doc.root);
    }

    let mut scene = Scene::new(units);
    let mut ids: HashMap<&str, DefinitionIds> = HashMap::new();
    for def in &doc.definitions {
        let id = if def.name == doc.root {
            let root = scene.root();
            scene.set_definition_name(root, def.name.clone())?;
            root
        } else {
            scene.add_definition(def.name.clone())
        };
        ids.insert(
            def.name.as_str(),
            DefinitionIds {
                id: Some(id),
                ..Default::default()
            },
        );
    }

    for def in &doc.definitions {
        let entry = ids
            .get_mut(def.name.as_str())
            .ok_or_else(|| anyhow!("definition '{}' vanished", def.name))?;
        fill_geometry(&mut scene, def, entry)
            .with_context(|| format!("in definition '{}'", def.name))?;
    }

    // Instances last: they may place definitions listed later.
    for def in &doc.definitions {
        let parent = definition_id(&ids, &def.name)?;
        let mut placed = Vec::with_capacity(def.instances.len());
        for inst in &def.instances {
            let child = definition_id(&ids, &inst.definition)
                .with_context(|| format!("placed in '{}'", def.name))?;
            let transform = Transform::from_column_slice(&inst.transform);
            placed.push(scene.add_instance(parent, child, transform, instance_kind(inst.kind))?);
        }
        if let Some(entry) = ids.get_mut(def.name.as_str()) {
            entry.instances = placed;
        }
    }

    let selection = doc
        .selection
        .iter()
        .map(|r| resolve(&scene, &ids, r))
        .collect::<Result<Vec<_>>>()?;

    Ok(Loaded { scene, selection })
}

fn definition_id(ids: &HashMap<&str, DefinitionIds>, name: &str) -> Result<DefinitionId> {
    ids.get(name)
        .and_then(|e| e.id)
        .ok_or_else(|| anyhow!("unknown definition '{name}'"))
}

fn fill_geometry(scene: &mut Scene, def: &ir::Definition, entry: &mut DefinitionIds) -> Result<()> {
    let id = entry
        .id
        .ok_or_else(|| anyhow!("definition '{}' was not created", def.name))?;

    let vertices = def
        .vertices
        .iter()
        .map(|p| scene.add_vertex(id, point(p)))
        .collect::<zflat_scene::Result<Vec<VertexId>>>()?;

    for [a, b] in &def.edges {
        let start = pick(&vertices, *a, "vertex", &def.name)?;
        let end = pick(&vertices, *b, "vertex", &def.name)?;
        entry.edges.push(scene.add_edge(id, start, end)?);
    }
    for face in &def.faces {
        let loop_vertices = face
            .iter()
            .map(|i| pick(&vertices, *i, "vertex", &def.name))
            .collect::<Result<Vec<_>>>()?;
        entry.faces.push(scene.add_face(id, &loop_vertices)?);
    }
    for curve in &def.curves {
        let edges = curve
            .edges
            .iter()
            .map(|i| pick(&entry.edges, *i, "edge", &def.name))
            .collect::<Result<Vec<_>>>()?;
        entry
            .curves
            .push(scene.group_curve(id, curve_kind(curve.kind), &edges)?);
    }
    for guide in &def.guides {
        let gid = match guide {
            ir::Guide::Line { anchor, direction } => scene.add_construction_line(
                id,
                point(anchor),
                Vec3::new(direction[0], direction[1], direction[2]),
            )?,
            ir::Guide::Point { position } => scene.add_construction_point(id, point(position))?,
        };
        entry.guides.push(gid);
    }
    Ok(())
}

fn resolve(scene: &Scene, ids: &HashMap<&str, DefinitionIds>, r: &ir::EntityRef) -> Result<Entity> {
    let entry = ids
        .get(r.definition.as_str())
        .ok_or_else(|| anyhow!("selection refers to unknown definition '{}'", r.definition))?;
    let name = r.definition.as_str();
    let entity = match r.kind {
        ir::EntityKind::Edge => Entity::Edge(pick(&entry.edges, r.index, "edge", name)?),
        ir::EntityKind::Face => Entity::Face(pick(&entry.faces, r.index, "face", name)?),
        ir::EntityKind::Curve => Entity::Curve(pick(&entry.curves, r.index, "curve", name)?),
        ir::EntityKind::Instance => {
            Entity::Instance(pick(&entry.instances, r.index, "instance", name)?)
        }
        ir::EntityKind::Guide => {
            let id = pick(&entry.guides, r.index, "guide", name)?;
            match scene.guide(id).map(|g| g.kind) {
                Some(GuideKind::Line { .. }) => Entity::ConstructionLine(id),
                Some(GuideKind::Point { .. }) => Entity::ConstructionPoint(id),
                None => bail!("guide {} of '{name}' is missing", r.index),
            }
        }
    };
    Ok(entity)
}

fn index_of<T: PartialEq>(list: &[T], item: &T) -> Result<usize> {
    list.iter()
        .position(|x| x == item)
        .ok_or_else(|| anyhow!("entity is not listed by its owner"))
}

/// Write `scene` back out as a document, root definition first.
pub fn document_from_scene(scene: &Scene, selection: &[Entity]) -> Result<ir::Document> {
    let root = scene.root();
    let mut order: Vec<DefinitionId> = vec![root];
    order.extend(scene.definitions().map(|(id, _)| id).filter(|id| *id != root));

    let mut definitions = Vec::with_capacity(order.len());
    for id in &order {
        definitions.push(export_definition(scene, *id)?);
    }

    let mut refs = Vec::with_capacity(selection.len());
    for &entity in selection {
        refs.push(export_ref(scene, entity)?);
    }

    Ok(ir::Document {
        version: ir::FORMAT_VERSION.to_string(),
        units: scene.units().suffix().to_string(),
        root: definition_name(scene, root)?,
        definitions,
        selection: refs,
    })
}

fn definition_name(scene: &Scene, id: DefinitionId) -> Result<String> {
    scene
        .definition(id)
        .map(|d| d.name.clone())
        .ok_or_else(|| anyhow!("dangling definition reference"))
}

fn export_definition(scene: &Scene, id: DefinitionId) -> Result<ir::Definition> {
    let def = scene
        .definition(id)
        .ok_or_else(|| anyhow!("dangling definition reference"))?;
    let mut out = ir::Definition::named(def.name.clone());

    let vertex_index: HashMap<VertexId, usize> =
        def.vertices.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let lookup = |v: &VertexId| {
        vertex_index
            .get(v)
            .copied()
            .ok_or_else(|| anyhow!("vertex outside '{}'", def.name))
    };

    for v in &def.vertices {
        let p = scene.vertex_point(*v)?;
        out.vertices.push([p.x, p.y, p.z]);
    }
    for e in &def.edges {
        let [a, b] = scene.edge_vertices(*e)?;
        out.edges.push([lookup(&a)?, lookup(&b)?]);
    }
    for f in &def.faces {
        let face = scene
            .face(*f)
            .ok_or_else(|| anyhow!("dangling face in '{}'", def.name))?;
        out.faces
            .push(face.vertices.iter().map(&lookup).collect::<Result<Vec<_>>>()?);
    }
    for c in &def.curves {
        let curve = scene
            .curve(*c)
            .ok_or_else(|| anyhow!("dangling curve in '{}'", def.name))?;
        let edges = curve
            .edges
            .iter()
            .map(|e| index_of(&def.edges, e))
            .collect::<Result<Vec<_>>>()?;
        let kind = match curve.kind {
            CurveKind::Arc => ir::CurveKind::Arc,
            CurveKind::Circle => ir::CurveKind::Circle,
            CurveKind::Polyline => ir::CurveKind::Polyline,
        };
        out.curves.push(ir::Curve { kind, edges });
    }
    for g in &def.guides {
        let guide = scene
            .guide(*g)
            .ok_or_else(|| anyhow!("dangling guide in '{}'", def.name))?;
        out.guides.push(match guide.kind {
            GuideKind::Line { anchor, direction } => ir::Guide::Line {
                anchor: [anchor.x, anchor.y, anchor.z],
                direction: [direction.x, direction.y, direction.z],
            },
            GuideKind::Point { position } => ir::Guide::Point {
                position: [position.x, position.y, position.z],
            },
        });
    }
    for i in &def.instances {
        let inst = scene
            .instance(*i)
            .ok_or_else(|| anyhow!("dangling instance in '{}'", def.name))?;
        out.instances.push(ir::Instance {
            definition: definition_name(scene, inst.definition)?,
            transform: inst.transform.to_column_array(),
            kind: match inst.kind {
                InstanceKind::Group => ir::InstanceKind::Group,
                InstanceKind::Component => ir::InstanceKind::Component,
            },
        });
    }
    Ok(out)
}

fn export_ref(scene: &Scene, entity: Entity) -> Result<ir::EntityRef> {
    let owner = scene.owner_of(entity)?;
    let def = scene
        .definition(owner)
        .ok_or_else(|| anyhow!("dangling definition reference"))?;
    let (kind, index) = match entity {
        Entity::Edge(id) => (ir::EntityKind::Edge, index_of(&def.edges, &id)?),
        Entity::Face(id) => (ir::EntityKind::Face, index_of(&def.faces, &id)?),
        Entity::Curve(id) => (ir::EntityKind::Curve, index_of(&def.curves, &id)?),
        Entity::Instance(id) => (ir::EntityKind::Instance, index_of(&def.instances, &id)?),
        Entity::ConstructionLine(id) | Entity::ConstructionPoint(id) => {
            (ir::EntityKind::Guide, index_of(&def.guides, &id)?)
        }
    };
    Ok(ir::EntityRef {
        definition: def.name.clone(),
        kind,
        index,
    })
}
