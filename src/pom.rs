use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ParseError, PomError};
use crate::models::{ArtifactMetadata, License};

/// Packaging type of an aggregator (parent) descriptor.
pub const AGGREGATOR_PACKAGING: &str = "pom";

const DEFAULT_PACKAGING: &str = "jar";

/// A `<dependency>` declaration as written in the POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
}

/// The `<parent>` reference of a POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// The parts of a project object model the inventory cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: String,
    pub description: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: HashMap<String, String>,
    pub dependencies: Vec<DeclaredDependency>,
    pub managed_dependencies: Vec<DeclaredDependency>,
    pub licenses: Vec<License>,
}

/// A POM read from disk, together with the file it came from.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub path: PathBuf,
    pub last_modified: SystemTime,
    pub pom: Pom,
}

impl Pom {
    /// Parse a POM document using the quick-xml event API.
    ///
    /// Only the project coordinates, parent, properties, direct and managed
    /// dependencies, licenses and description are read. Dependencies declared
    /// inside plugins or profiles are ignored.
    pub fn from_xml(xml: &str) -> Result<Self, PomError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut seen_root = false;
        let mut builder = PomBuilder::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                    if path.is_empty() {
                        if seen_root || name != "project" {
                            return Err(PomError::NotAProject(name));
                        }
                        seen_root = true;
                    }
                    path.push(name);
                    text.clear();
                    builder.open(&segments(&path));
                }
                Ok(Event::Empty(ref e)) => {
                    if path.is_empty() {
                        let name =
                            String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                        if name != "project" {
                            return Err(PomError::NotAProject(name));
                        }
                        seen_root = true;
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let unescaped = e.unescape().map_err(quick_xml::Error::from)?;
                    text.push_str(&unescaped);
                }
                Ok(Event::CData(ref e)) => {
                    text.push_str(&String::from_utf8_lossy(e));
                }
                Ok(Event::End(_)) => {
                    builder.close(&segments(&path), text.trim());
                    text.clear();
                    path.pop();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PomError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(PomError::NotAProject(String::new()));
        }
        if let Some(open) = path.last() {
            return Err(PomError::Truncated(open.clone()));
        }
        builder.finish()
    }

    /// Own group id, falling back to the parent's.
    pub fn effective_group_id(&self) -> &str {
        match (&self.group_id, &self.parent) {
            (Some(group_id), _) => group_id,
            (None, Some(parent)) => &parent.group_id,
            // `finish` guarantees one of the two is present
            (None, None) => "",
        }
    }

    /// Own version, falling back to the parent's.
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.version.as_str()))
            .filter(|v| !v.is_empty())
    }

    pub fn is_aggregator(&self) -> bool {
        self.packaging.eq_ignore_ascii_case(AGGREGATOR_PACKAGING)
    }

    /// The description and licenses, as merged into a dependency during enrichment.
    pub fn metadata(&self) -> ArtifactMetadata {
        ArtifactMetadata {
            description: self.description.clone(),
            licenses: self.licenses.clone(),
        }
    }
}

/// Decode raw descriptor bytes to text, honoring a byte order mark or the
/// `encoding` attribute of the XML declaration. Without either, UTF-8 is assumed.
pub fn decode_document(bytes: &[u8]) -> Result<String, PomError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    // The reader switches its decoder once it has seen the declaration
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Decl(_) | Event::Start(_) | Event::Empty(_) | Event::Eof => break,
            _ => buf.clear(),
        }
    }
    let text = reader
        .decoder()
        .decode(bytes)
        .map_err(|e| PomError::Encoding(e.to_string()))?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Read and parse a descriptor file, recording its last-modified time.
pub fn read_descriptor(path: &Path) -> Result<Descriptor, ParseError> {
    let read_err = |source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    };
    let invalid = |source| ParseError::Invalid {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(read_err)?;
    let last_modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(read_err)?;
    let content = decode_document(&bytes).map_err(invalid)?;
    let pom = Pom::from_xml(&content).map_err(invalid)?;

    Ok(Descriptor {
        path: path.to_path_buf(),
        last_modified,
        pom,
    })
}

fn segments(path: &[String]) -> Vec<&str> {
    path.iter().map(String::as_str).collect()
}

fn non_blank(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[derive(Default)]
struct PendingDependency {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
}

impl PendingDependency {
    fn set(&mut self, field: &str, value: &str) {
        match field {
            "groupId" => self.group_id = non_blank(value),
            "artifactId" => self.artifact_id = non_blank(value),
            "version" => self.version = non_blank(value),
            _ => {}
        }
    }

    fn finish(self) -> Option<DeclaredDependency> {
        Some(DeclaredDependency {
            group_id: self.group_id,
            artifact_id: self.artifact_id?,
            version: self.version,
        })
    }
}

#[derive(Default)]
struct PomBuilder {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    packaging: Option<String>,
    description: Option<String>,
    parent: Option<ParentRef>,
    properties: HashMap<String, String>,
    dependencies: Vec<DeclaredDependency>,
    managed_dependencies: Vec<DeclaredDependency>,
    licenses: Vec<License>,
    pending_dependency: PendingDependency,
    pending_license: License,
}

impl PomBuilder {
    fn open(&mut self, path: &[&str]) {
        match path {
            ["project", "parent"] => {
                self.parent = Some(ParentRef {
                    group_id: String::new(),
                    artifact_id: String::new(),
                    version: String::new(),
                });
            }
            ["project", "dependencies", "dependency"]
            | ["project", "dependencyManagement", "dependencies", "dependency"] => {
                self.pending_dependency = PendingDependency::default();
            }
            ["project", "licenses", "license"] => {
                self.pending_license = License::default();
            }
            _ => {}
        }
    }

    fn close(&mut self, path: &[&str], text: &str) {
        match path {
            ["project", "groupId"] => self.group_id = non_blank(text),
            ["project", "artifactId"] => self.artifact_id = non_blank(text),
            ["project", "version"] => self.version = non_blank(text),
            ["project", "packaging"] => self.packaging = non_blank(text),
            ["project", "description"] => self.description = non_blank(text),
            ["project", "properties", key] => {
                self.properties.insert(key.to_string(), text.to_string());
            }
            ["project", "parent", field] => {
                if let Some(parent) = self.parent.as_mut() {
                    match *field {
                        "groupId" => parent.group_id = text.to_string(),
                        "artifactId" => parent.artifact_id = text.to_string(),
                        "version" => parent.version = text.to_string(),
                        _ => {}
                    }
                }
            }
            ["project", "dependencies", "dependency", field]
            | ["project", "dependencyManagement", "dependencies", "dependency", field] => {
                self.pending_dependency.set(field, text);
            }
            ["project", "dependencies", "dependency"] => {
                if let Some(dep) = std::mem::take(&mut self.pending_dependency).finish() {
                    self.dependencies.push(dep);
                }
            }
            ["project", "dependencyManagement", "dependencies", "dependency"] => {
                if let Some(dep) = std::mem::take(&mut self.pending_dependency).finish() {
                    self.managed_dependencies.push(dep);
                }
            }
            ["project", "licenses", "license", "name"] => {
                self.pending_license.name = non_blank(text);
            }
            ["project", "licenses", "license", "url"] => {
                self.pending_license.url = non_blank(text);
            }
            ["project", "licenses", "license"] => {
                let license = std::mem::take(&mut self.pending_license);
                self.licenses.push(license);
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<Pom, PomError> {
        let artifact_id = self.artifact_id.ok_or(PomError::MissingArtifactId)?;
        let parent_has_group = self
            .parent
            .as_ref()
            .is_some_and(|p| !p.group_id.is_empty());
        if self.group_id.is_none() && !parent_has_group {
            return Err(PomError::MissingGroupId);
        }

        Ok(Pom {
            group_id: self.group_id,
            artifact_id,
            version: self.version,
            packaging: self
                .packaging
                .unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
            description: self.description,
            parent: self.parent,
            properties: self.properties,
            dependencies: self.dependencies,
            managed_dependencies: self.managed_dependencies,
            licenses: self.licenses,
        })
    }
}
