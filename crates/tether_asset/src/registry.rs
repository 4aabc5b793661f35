//! Asset registry
//!
//! Maps normalized asset paths to generational [`AssetHandle`]s. Asset
//! handles live in their own numeric space, separate from entities and
//! components.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tether_core::{AssetHandle, AssetType, Handle, HandleAllocator};

use crate::error::AssetError;
use crate::snapshot::{EntitySnapshot, LevelData};

/// Content the registry keeps for an asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetData {
    /// A blueprint, empty until an entity has been captured into it.
    Blueprint(Option<EntitySnapshot>),
    Level(LevelData),
    /// A compiled script; `type_name` selects the behaviour to instantiate.
    Script { type_name: String },
    /// Content owned by another subsystem (meshes, textures, ...).
    Opaque,
}

#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub path: String,
    pub ty: AssetType,
    pub data: AssetData,
}

impl AssetRecord {
    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Forward slashes, no leading `./` or `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Infer an asset type from a file extension.
pub fn asset_type_for_path(path: &str) -> AssetType {
    let extension = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("bpt") => AssetType::Blueprint,
        Some("lvl") => AssetType::Level,
        Some("rs") => AssetType::Script,
        Some("mdl" | "obj" | "gltf" | "glb") => AssetType::Model,
        Some("mesh") => AssetType::Mesh,
        Some("mat") => AssetType::Material,
        Some("wgsl" | "shader") => AssetType::Shader,
        Some("png" | "jpg" | "jpeg") => AssetType::Texture2D,
        Some("tex3d") => AssetType::Texture3D,
        Some("ttf" | "otf") => AssetType::Font,
        Some("tileset") => AssetType::Tileset,
        Some("tilemap") => AssetType::Tilemap,
        _ => AssetType::Invalid,
    }
}

#[derive(Debug, Default)]
pub struct AssetRegistry {
    handles: HandleAllocator,
    records: HashMap<AssetHandle, AssetRecord>,
    by_path: HashMap<String, AssetHandle>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset. Re-registering a path replaces its content and
    /// keeps the existing handle.
    pub fn register(&mut self, path: &str, ty: AssetType, data: AssetData) -> AssetHandle {
        let path = normalize_path(path);

        if let Some(&handle) = self.by_path.get(&path) {
            if let Some(record) = self.records.get_mut(&handle) {
                record.ty = ty;
                record.data = data;
            }
            tracing::debug!(%path, ?ty, "asset replaced");
            return handle;
        }

        let Some(handle) = self.handles.allocate().map(AssetHandle) else {
            tracing::error!(%path, "asset table exhausted");
            return AssetHandle(Handle::SENTINEL);
        };
        self.records.insert(
            handle,
            AssetRecord {
                path: path.clone(),
                ty,
                data,
            },
        );
        tracing::debug!(%path, ?ty, "asset registered");
        self.by_path.insert(path, handle);
        handle
    }

    /// Drop an asset. Its handle becomes stale.
    pub fn unregister(&mut self, path: &str) -> Option<AssetRecord> {
        let handle = self.by_path.remove(&normalize_path(path))?;
        self.handles.release(handle.0);
        self.records.remove(&handle)
    }

    pub fn lookup(&self, path: &str) -> Option<AssetHandle> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    pub fn contains(&self, handle: AssetHandle) -> bool {
        self.handles.is_alive(handle.0)
    }

    pub fn get(&self, handle: AssetHandle) -> Option<&AssetRecord> {
        if !self.contains(handle) {
            return None;
        }
        self.records.get(&handle)
    }

    pub fn get_mut(&mut self, handle: AssetHandle) -> Option<&mut AssetRecord> {
        if !self.contains(handle) {
            return None;
        }
        self.records.get_mut(&handle)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every registered asset, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (AssetHandle, &AssetRecord)> {
        let mut entries: Vec<_> = self.records.iter().map(|(h, r)| (*h, r)).collect();
        entries.sort_by(|a, b| a.1.path.cmp(&b.1.path));
        entries.into_iter()
    }

    /// Register every recognized file under `root`, keyed by its path
    /// relative to `root`. Returns the number of assets registered.
    pub fn load_directory(&mut self, root: impl AsRef<Path>) -> Result<usize, AssetError> {
        let root = root.as_ref();
        let mut files = Vec::new();
        collect_files(root, &mut files)?;
        files.sort();

        let mut count = 0;
        for file in files {
            let relative = match file.strip_prefix(root) {
                Ok(relative) => relative.to_string_lossy().into_owned(),
                Err(_) => continue,
            };
            let path = normalize_path(&relative);
            let ty = asset_type_for_path(&path);
            if ty == AssetType::Invalid {
                tracing::debug!(%path, "skipping unrecognized file");
                continue;
            }

            let data = load_payload(&file, ty)?;
            self.register(&path, ty, data);
            count += 1;
        }

        tracing::info!(root = %root.display(), count, "asset directory loaded");
        Ok(count)
    }

    /// Write a blueprint or level back to `root/<asset path>`.
    pub fn save(&self, handle: AssetHandle, root: impl AsRef<Path>) -> Result<(), AssetError> {
        let record = self
            .get(handle)
            .ok_or_else(|| AssetError::UnknownAsset(format!("{}", handle.0)))?;
        let target = root.as_ref().join(&record.path);

        let json = match &record.data {
            AssetData::Blueprint(snapshot) => serde_json::to_string_pretty(snapshot),
            AssetData::Level(level) => serde_json::to_string_pretty(level),
            _ => {
                return Err(AssetError::NotSerializable {
                    path: record.path.clone(),
                    ty: record.ty,
                })
            }
        }
        .map_err(|source| AssetError::Json {
            path: target.clone(),
            source,
        })?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| AssetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, json).map_err(|source| AssetError::Io {
            path: target.clone(),
            source,
        })
    }
}

fn collect_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<(), AssetError> {
    let entries = fs::read_dir(dir).map_err(|source| AssetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| AssetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn load_payload(file: &Path, ty: AssetType) -> Result<AssetData, AssetError> {
    let read = || {
        fs::read_to_string(file).map_err(|source| AssetError::Io {
            path: file.to_path_buf(),
            source,
        })
    };
    let parse_error = |source| AssetError::Json {
        path: file.to_path_buf(),
        source,
    };

    Ok(match ty {
        AssetType::Blueprint => {
            let text = read()?;
            if text.trim().is_empty() {
                AssetData::Blueprint(None)
            } else {
                AssetData::Blueprint(Some(serde_json::from_str(&text).map_err(parse_error)?))
            }
        }
        AssetType::Level => {
            let text = read()?;
            if text.trim().is_empty() {
                AssetData::Level(LevelData::default())
            } else {
                AssetData::Level(serde_json::from_str(&text).map_err(parse_error)?)
            }
        }
        AssetType::Script => AssetData::Script {
            type_name: file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        },
        _ => AssetData::Opaque,
    })
}
