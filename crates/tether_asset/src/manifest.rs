//! Project manifest
//!
//! The script project file lists every compiled source as
//! `Project/ItemGroup/Compile[@Include]`, optionally with a `Link` child.
//! Edits stream the document through quick-xml, touching only the entries
//! they change, and saving goes through a temp file plus rename.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to access manifest '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed manifest attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("failed to write manifest: {0}")]
    Write(#[from] std::io::Error),

    #[error("manifest is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("manifest has no file path to save to")]
    NoPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileEntry {
    pub include: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectManifest {
    path: Option<PathBuf>,
    document: String,
}

/// What an edit needs to know about the document before rewriting it.
struct Layout {
    has_project: bool,
    /// Ordinal of the first `Project/ItemGroup` holding compile entries.
    compile_group: Option<usize>,
    entries: Vec<CompileEntry>,
}

const PROJECT: &[u8] = b"Project";
const ITEM_GROUP: &[u8] = b"ItemGroup";
const COMPILE: &[u8] = b"Compile";
const LINK: &[u8] = b"Link";

impl ProjectManifest {
    /// Parse a manifest held in memory. The document is checked for
    /// well-formedness up front.
    pub fn parse(document: impl Into<String>) -> Result<Self, ManifestError> {
        let manifest = Self {
            path: None,
            document: document.into(),
        };
        manifest.layout()?;
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::parse(document)?;
        manifest.path = Some(path.to_path_buf());
        Ok(manifest)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.document
    }

    /// Save back to the file the manifest was loaded from.
    pub fn save(&self) -> Result<(), ManifestError> {
        let path = self.path.as_deref().ok_or(ManifestError::NoPath)?;
        self.save_to(path)
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "manifest".to_string());
        let temp = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&temp, &self.document).map_err(|source| ManifestError::Io {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "manifest saved");
        Ok(())
    }

    pub fn compile_entries(&self) -> Result<Vec<CompileEntry>, ManifestError> {
        Ok(self.layout()?.entries)
    }

    pub fn contains(&self, include: &str) -> Result<bool, ManifestError> {
        Ok(self.layout()?.entries.iter().any(|e| e.include == include))
    }

    /// Add a compile entry. Returns `false` without touching the document
    /// when the entry already exists or there is no `Project` element.
    pub fn add_compile(&mut self, include: &str, link: Option<&str>) -> Result<bool, ManifestError> {
        let layout = self.layout()?;
        if !layout.has_project {
            tracing::debug!(include, "manifest has no Project element, entry not added");
            return Ok(false);
        }
        if layout.entries.iter().any(|e| e.include == include) {
            return Ok(false);
        }

        let output = {
            let mut reader = Reader::from_str(&self.document);
            let mut writer = Writer::new(Vec::new());
            let mut stack: Vec<Vec<u8>> = Vec::new();
            let mut groups_seen = 0usize;
            let mut current_group = None;

            loop {
                let event = reader.read_event()?;
                match &event {
                    Event::Start(e) => {
                        if e.name().as_ref() == ITEM_GROUP && at(&stack, &[PROJECT]) {
                            current_group = Some(groups_seen);
                            groups_seen += 1;
                        }
                        stack.push(e.name().as_ref().to_vec());
                    }
                    Event::End(e) => {
                        stack.pop();
                        let closes_group = e.name().as_ref() == ITEM_GROUP && at(&stack, &[PROJECT]);
                        let closes_project = e.name().as_ref() == PROJECT && stack.is_empty();

                        if closes_group {
                            if layout.compile_group.is_some() && current_group.take() == layout.compile_group {
                                writer.write_event(Event::Text(BytesText::new("  ")))?;
                                write_compile(&mut writer, include, link, "    ")?;
                                writer.write_event(Event::Text(BytesText::new("\n  ")))?;
                            }
                        } else if closes_project && layout.compile_group.is_none() {
                            writer.write_event(Event::Text(BytesText::new("  ")))?;
                            writer.write_event(Event::Start(BytesStart::new("ItemGroup")))?;
                            writer.write_event(Event::Text(BytesText::new("\n    ")))?;
                            write_compile(&mut writer, include, link, "    ")?;
                            writer.write_event(Event::Text(BytesText::new("\n  ")))?;
                            writer.write_event(Event::End(BytesEnd::new("ItemGroup")))?;
                            writer.write_event(Event::Text(BytesText::new("\n")))?;
                        }
                    }
                    Event::Eof => break,
                    _ => {}
                }
                writer.write_event(event)?;
            }
            writer.into_inner()
        };

        self.document = String::from_utf8(output)?;
        tracing::debug!(include, "compile entry added");
        Ok(true)
    }

    /// Remove a compile entry. Returns `false` when there was none.
    pub fn remove_compile(&mut self, include: &str) -> Result<bool, ManifestError> {
        if !self.contains(include)? {
            return Ok(false);
        }

        let output = {
            let mut reader = Reader::from_str(&self.document);
            let mut writer = Writer::new(Vec::new());
            let mut stack: Vec<Vec<u8>> = Vec::new();
            // Whitespace is held back so the indentation before a removed
            // entry goes with it.
            let mut pending_space: Option<Event> = None;
            let mut skip_depth = 0usize;

            loop {
                let event = reader.read_event()?;

                if skip_depth > 0 {
                    match event {
                        Event::Start(_) => skip_depth += 1,
                        Event::End(_) => skip_depth -= 1,
                        Event::Eof => break,
                        _ => {}
                    }
                    continue;
                }

                let whitespace =
                    matches!(&event, Event::Text(t) if t.iter().all(u8::is_ascii_whitespace));
                if whitespace {
                    if let Some(space) = pending_space.replace(event) {
                        writer.write_event(space)?;
                    }
                    continue;
                }

                let removed = match &event {
                    Event::Empty(e) | Event::Start(e) if is_compile(e, &stack) => {
                        include_of(e)?.as_deref() == Some(include)
                    }
                    _ => false,
                };
                if removed {
                    if matches!(event, Event::Start(_)) {
                        skip_depth = 1;
                    }
                    pending_space = None;
                    continue;
                }

                if let Some(space) = pending_space.take() {
                    writer.write_event(space)?;
                }
                match &event {
                    Event::Start(e) => stack.push(e.name().as_ref().to_vec()),
                    Event::End(_) => {
                        stack.pop();
                    }
                    _ => {}
                }
                let done = matches!(event, Event::Eof);
                writer.write_event(event)?;
                if done {
                    break;
                }
            }
            writer.into_inner()
        };

        self.document = String::from_utf8(output)?;
        tracing::debug!(include, "compile entry removed");
        Ok(true)
    }

    fn layout(&self) -> Result<Layout, ManifestError> {
        let mut reader = Reader::from_str(&self.document);
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut layout = Layout {
            has_project: false,
            compile_group: None,
            entries: Vec::new(),
        };
        let mut groups_seen = 0usize;
        let mut current: Option<CompileEntry> = None;
        let mut in_link = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    if name.as_ref() == PROJECT && stack.is_empty() {
                        layout.has_project = true;
                    } else if name.as_ref() == ITEM_GROUP && at(&stack, &[PROJECT]) {
                        groups_seen += 1;
                    } else if is_compile(&e, &stack) {
                        current = include_of(&e)?.map(|include| CompileEntry { include, link: None });
                        if current.is_some() && layout.compile_group.is_none() {
                            layout.compile_group = Some(groups_seen - 1);
                        }
                    } else if name.as_ref() == LINK && current.is_some() {
                        in_link = true;
                    }
                    stack.push(name.as_ref().to_vec());
                }
                Event::Empty(e) => {
                    if is_compile(&e, &stack) {
                        if let Some(include) = include_of(&e)? {
                            if layout.compile_group.is_none() {
                                layout.compile_group = Some(groups_seen - 1);
                            }
                            layout.entries.push(CompileEntry { include, link: None });
                        }
                    }
                }
                Event::Text(t) if in_link => {
                    if let Some(entry) = current.as_mut() {
                        entry.link = Some(t.unescape()?.into_owned());
                    }
                }
                Event::End(e) => {
                    stack.pop();
                    if e.name().as_ref() == LINK {
                        in_link = false;
                    } else if e.name().as_ref() == COMPILE {
                        if let Some(entry) = current.take() {
                            layout.entries.push(entry);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(layout)
    }
}

/// `stack` is exactly the given element path.
fn at(stack: &[Vec<u8>], path: &[&[u8]]) -> bool {
    stack.len() == path.len() && stack.iter().zip(path).all(|(a, b)| a.as_slice() == *b)
}

fn is_compile(element: &BytesStart<'_>, stack: &[Vec<u8>]) -> bool {
    element.name().as_ref() == COMPILE && at(stack, &[PROJECT, ITEM_GROUP])
}

fn include_of(element: &BytesStart<'_>) -> Result<Option<String>, ManifestError> {
    match element.try_get_attribute("Include")? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn write_compile(
    writer: &mut Writer<Vec<u8>>,
    include: &str,
    link: Option<&str>,
    indent: &str,
) -> Result<(), ManifestError> {
    let mut start = BytesStart::new("Compile");
    start.push_attribute(("Include", include));

    match link {
        None => writer.write_event(Event::Empty(start))?,
        Some(link) => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&format!("\n{indent}  "))))?;
            writer.write_event(Event::Start(BytesStart::new("Link")))?;
            writer.write_event(Event::Text(BytesText::new(link)))?;
            writer.write_event(Event::End(BytesEnd::new("Link")))?;
            writer.write_event(Event::Text(BytesText::new(&format!("\n{indent}"))))?;
            writer.write_event(Event::End(BytesEnd::new("Compile")))?;
        }
    }
    Ok(())
}
