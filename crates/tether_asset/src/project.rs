//! Script project
//!
//! Keeps the asset registry and the project manifest in step: every script
//! asset created through here gets a compile entry, and deleting the asset
//! drops the entry again.

use std::fs;
use std::path::{Path, PathBuf};

use tether_core::{AssetHandle, AssetType};

use crate::error::AssetError;
use crate::manifest::ProjectManifest;
use crate::registry::{normalize_path, AssetData, AssetRegistry};

#[derive(Debug)]
pub struct ScriptProject {
    root: PathBuf,
    manifest: ProjectManifest,
}

impl ScriptProject {
    /// Open a project rooted at `root` whose manifest lives at
    /// `root/<manifest_name>`.
    pub fn open(root: impl AsRef<Path>, manifest_name: &str) -> Result<Self, AssetError> {
        let root = root.as_ref().to_path_buf();
        let manifest = ProjectManifest::load(root.join(manifest_name))?;
        Ok(Self { root, manifest })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// Write `source` to `root/<path>`, register it as a script asset
    /// running behaviour `type_name`, and list it in the manifest.
    pub fn create_script(
        &mut self,
        registry: &mut AssetRegistry,
        path: &str,
        type_name: &str,
        source: &str,
    ) -> Result<AssetHandle, AssetError> {
        let path = normalize_path(path);
        let file = self.root.join(&path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|source| AssetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&file, source).map_err(|source| AssetError::Io {
            path: file.clone(),
            source,
        })?;

        let handle = registry.register(
            &path,
            AssetType::Script,
            AssetData::Script {
                type_name: type_name.to_string(),
            },
        );

        if self.manifest.add_compile(&path, None)? {
            self.manifest.save()?;
        }
        tracing::info!(%path, type_name, "script created");
        Ok(handle)
    }

    /// Remove a script asset, its source file and its manifest entry.
    /// Returns `false` if no such script was registered.
    pub fn delete_script(&mut self, registry: &mut AssetRegistry, path: &str) -> Result<bool, AssetError> {
        let path = normalize_path(path);
        let is_script = registry
            .lookup(&path)
            .and_then(|handle| registry.get(handle))
            .is_some_and(|record| record.ty == AssetType::Script);
        if !is_script {
            return Ok(false);
        }

        registry.unregister(&path);
        let file = self.root.join(&path);
        if file.exists() {
            fs::remove_file(&file).map_err(|source| AssetError::Io { path: file, source })?;
        }

        if self.manifest.remove_compile(&path)? {
            self.manifest.save()?;
        }
        tracing::info!(%path, "script deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> (tempfile::TempDir, ScriptProject) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Game.proj"),
            "<Project>\n  <ItemGroup>\n    <Compile Include=\"Scripts/Old.rs\" />\n  </ItemGroup>\n</Project>\n",
        )
        .unwrap();
        let project = ScriptProject::open(dir.path(), "Game.proj").unwrap();
        (dir, project)
    }

    #[test]
    fn test_create_script_registers_and_lists() {
        let (dir, mut project) = project();
        let mut registry = AssetRegistry::new();

        let handle = project
            .create_script(&mut registry, "Scripts/Spinner.rs", "spinner", "// spins")
            .unwrap();

        assert_eq!(registry.get(handle).unwrap().ty, AssetType::Script);
        assert!(dir.path().join("Scripts/Spinner.rs").exists());

        let on_disk = ProjectManifest::load(dir.path().join("Game.proj")).unwrap();
        assert!(on_disk.contains("Scripts/Spinner.rs").unwrap());
        assert!(on_disk.contains("Scripts/Old.rs").unwrap());
    }

    #[test]
    fn test_delete_script_unlists() {
        let (dir, mut project) = project();
        let mut registry = AssetRegistry::new();
        let handle = project
            .create_script(&mut registry, "Scripts/Spinner.rs", "spinner", "")
            .unwrap();

        assert!(project.delete_script(&mut registry, "Scripts/Spinner.rs").unwrap());
        assert!(!registry.contains(handle));
        assert!(!dir.path().join("Scripts/Spinner.rs").exists());
        assert!(!project.manifest().contains("Scripts/Spinner.rs").unwrap());

        let on_disk = ProjectManifest::load(dir.path().join("Game.proj")).unwrap();
        assert!(!on_disk.contains("Scripts/Spinner.rs").unwrap());
    }

    #[test]
    fn test_delete_unknown_script() {
        let (_dir, mut project) = project();
        let mut registry = AssetRegistry::new();
        registry.register("m.mdl", AssetType::Model, AssetData::Opaque);

        assert!(!project.delete_script(&mut registry, "Missing.rs").unwrap());
        assert!(!project.delete_script(&mut registry, "m.mdl").unwrap());
        assert_eq!(registry.len(), 1);
    }
}
