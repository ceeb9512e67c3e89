//! glTF importer tests against small documents written to a temp directory.

use std::path::{Path, PathBuf};


/// Root node list of the single-root rig.
const SINGLE_ROOT: &str = "[0]";

/// Write `rig.gltf` and `rig.bin` into a fresh directory named after `case`.
///
/// The rig has nodes `Armature -> hips -> head` plus a skinned `body` under
/// `Armature`, and an orphan `lamp` node usable as a second scene root.
fn write_rig(case: &str, scene_roots: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ossa-gltf-{}-{case}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("rig.bin"), rig_buffer()).unwrap();
    let path = dir.join("rig.gltf");
    std::fs::write(&path, rig_json(scene_roots)).unwrap();
    path
}

fn push_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn push_u16s(out: &mut Vec<u8>, values: &[u16]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Binary payload, see the buffer views in [`rig_json`] for the offsets.
fn rig_buffer() -> Vec<u8> {
    let mut out = Vec::new();
    // positions @0
    push_f32s(&mut out, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // indices @36, padded to 44
    push_u16s(&mut out, &[0, 1, 2, 0]);
    // joints @44
    push_u16s(&mut out, &[0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0]);
    // weights @68
    push_f32s(
        &mut out,
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0],
    );
    // inverse bind matrices @116
    let identity = crate::math::IDENTITY_MATRIX;
    let mut head = identity;
    head[13] = -1.0;
    push_f32s(&mut out, &identity);
    push_f32s(&mut out, &head);
    // animation times @244
    push_f32s(&mut out, &[0.0, 1.0]);
    // animation translations @252
    push_f32s(&mut out, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert_eq!(out.len(), 276);
    out
}

fn rig_json(scene_roots: &str) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [ {{ "name": "rig", "nodes": {scene_roots} }} ],
  "nodes": [
    {{ "name": "Armature", "children": [1, 3] }},
    {{ "name": "hips", "children": [2] }},
    {{ "name": "head", "translation": [0.0, 1.0, 0.0] }},
    {{ "name": "body", "mesh": 0, "skin": 0 }},
    {{ "name": "lamp" }}
  ],
  "meshes": [
    {{
      "name": "body",
      "primitives": [
        {{
          "attributes": {{ "POSITION": 0, "JOINTS_0": 2, "WEIGHTS_0": 3 }},
          "indices": 1,
          "material": 0
        }}
      ]
    }}
  ],
  "skins": [ {{ "joints": [1, 2], "inverseBindMatrices": 4 }} ],
  "materials": [
    {{ "name": "skin", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }}
  ],
  "textures": [ {{ "source": 0 }} ],
  "images": [ {{ "uri": "textures/skin.png" }} ],
  "animations": [
    {{
      "name": "slide",
      "channels": [ {{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }} ],
      "samplers": [ {{ "input": 5, "output": 6 }} ]
    }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 2, "componentType": 5123, "count": 3, "type": "VEC4" }},
    {{ "bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4" }},
    {{ "bufferView": 4, "componentType": 5126, "count": 2, "type": "MAT4" }},
    {{ "bufferView": 5, "componentType": 5126, "count": 2, "type": "SCALAR",
       "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 6, "componentType": 5126, "count": 2, "type": "VEC3" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }},
    {{ "buffer": 0, "byteOffset": 44, "byteLength": 24 }},
    {{ "buffer": 0, "byteOffset": 68, "byteLength": 48 }},
    {{ "buffer": 0, "byteOffset": 116, "byteLength": 128 }},
    {{ "buffer": 0, "byteOffset": 244, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 252, "byteLength": 24 }}
  ],
  "buffers": [ {{ "uri": "rig.bin", "byteLength": 276 }} ]
}}"#
    )
}

fn node_names(scene: &crate::scene::Scene) -> Vec<&str> {
    scene
        .depth_first()
        .into_iter()
        .map(|id| scene.node(id).name.as_str())
        .collect()
}

fn folder(path: &Path) -> &Path {
    path.parent().unwrap()
}
