// this_file: crates/labelforge-fontdb/src/source.rs

//! Font sources, fallback chains and their configuration.

use labelforge_core::FontRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One place a face can come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontSource {
    /// A font file at an explicit path
    File(PathBuf),
    /// A font file name looked up in the platform font directories
    SystemFile(String),
    /// A family name looked up in the system font database
    SystemFamily { family: String, bold: bool },
    /// The compiled-in bitmap font
    Builtin,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::File(path) => write!(f, "file {}", path.display()),
            FontSource::SystemFile(name) => write!(f, "system file {name}"),
            FontSource::SystemFamily { family, bold } => {
                write!(f, "system family {family}{}", if *bold { " (bold)" } else { "" })
            }
            FontSource::Builtin => f.write_str("built-in bitmap font"),
        }
    }
}

/// Ordered fallback chain for one role; the first source that loads wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontChain {
    sources: Vec<FontSource>,
}

impl FontChain {
    pub fn new(sources: Vec<FontSource>) -> Self {
        Self { sources }
    }

    /// Primary path, then the same file name in the platform font
    /// directories, then a family lookup, then the bitmap font.
    pub fn standard(
        path: &Path,
        family: Option<&str>,
        bold: bool,
        allow_builtin: bool,
    ) -> Self {
        let mut sources = vec![FontSource::File(path.to_path_buf())];
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            sources.push(FontSource::SystemFile(name.to_string()));
        }
        if let Some(family) = family {
            sources.push(FontSource::SystemFamily {
                family: family.to_string(),
                bold,
            });
        }
        if allow_builtin {
            sources.push(FontSource::Builtin);
        }
        Self { sources }
    }

    pub fn sources(&self) -> &[FontSource] {
        &self.sources
    }
}

/// Font selection for every role, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Bold face used for brand, fields and the static block
    pub primary: PathBuf,
    /// Regular face used for the footer
    pub footer: PathBuf,
    /// Family searched in the system font database after the file lookups
    pub system_family: Option<String>,
    /// Fall back to the compiled-in bitmap font as the last resort
    pub allow_builtin: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("arialbd.ttf"),
            footer: PathBuf::from("arial.ttf"),
            system_family: Some(default_family().to_string()),
            allow_builtin: true,
        }
    }
}

fn default_family() -> &'static str {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        "Arial"
    } else {
        "DejaVu Sans"
    }
}

impl FontConfig {
    /// Only the bitmap font; useful where no font files exist.
    pub fn builtin_only() -> Self {
        Self {
            primary: PathBuf::new(),
            footer: PathBuf::new(),
            system_family: None,
            allow_builtin: true,
        }
    }

    pub fn chain_for(&self, role: FontRole) -> FontChain {
        let (path, bold) = match role {
            FontRole::Footer => (&self.footer, false),
            _ => (&self.primary, true),
        };
        if path.as_os_str().is_empty() {
            let mut sources = Vec::new();
            if let Some(family) = &self.system_family {
                sources.push(FontSource::SystemFamily {
                    family: family.clone(),
                    bold,
                });
            }
            if self.allow_builtin {
                sources.push(FontSource::Builtin);
            }
            return FontChain::new(sources);
        }
        FontChain::standard(path, self.system_family.as_deref(), bold, self.allow_builtin)
    }
}
