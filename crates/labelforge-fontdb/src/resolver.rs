// this_file: crates/labelforge-fontdb/src/resolver.rs

//! Walks fallback chains once at startup.

use crate::face::FontFace;
use crate::source::{FontChain, FontSource};
use fontdb::{Database, Family, Query, Weight};
use labelforge_core::{utils::system_font_dirs, Error, FontRole, Result};
use log::{debug, info, warn};
use owned_ttf_parser::OwnedFace;
use std::path::Path;
use std::sync::Arc;

/// Text an outline face must draw before it may serve `role`.
///
/// The static role only draws right-to-left lines, so a face without Arabic
/// glyphs would print boxes there.
pub fn coverage_sample(role: FontRole) -> Option<&'static str> {
    match role {
        FontRole::Static => Some("\u{0627}\u{0644}\u{0639}\u{0631}\u{0628}\u{064A}\u{0629}"),
        _ => None,
    }
}

/// A face together with the source it came from.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub face: Arc<FontFace>,
    pub source: FontSource,
}

/// Resolves fallback chains; the system database is only scanned when a
/// chain reaches a family lookup.
#[derive(Default)]
pub struct FontResolver {
    database: Option<Database>,
}

impl FontResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// First source in `chain` that yields a usable face.
    pub fn resolve(&mut self, role: FontRole, chain: &FontChain) -> Result<ResolvedFont> {
        for source in chain.sources() {
            match self.load(source) {
                Some(face) if !serves(role, &face) => warn!(
                    target: "labelforge::fonts",
                    "{role}: {source} lacks the glyphs this role draws; skipped"
                ),
                Some(face) => {
                    info!(target: "labelforge::fonts", "{role}: using {source}");
                    return Ok(ResolvedFont {
                        face: Arc::new(face),
                        source: source.clone(),
                    });
                }
                None => debug!(target: "labelforge::fonts", "{role}: {source} unavailable"),
            }
        }

        Err(Error::NoFontAvailable {
            role: role.to_string(),
            tried: chain.sources().iter().map(ToString::to_string).collect(),
        })
    }

    fn load(&mut self, source: &FontSource) -> Option<FontFace> {
        match source {
            FontSource::File(path) => load_file(path),
            FontSource::SystemFile(name) => system_font_dirs().into_iter().find_map(|dir| {
                let expanded = shellexpand::tilde(&dir);
                let candidate = Path::new(expanded.as_ref()).join(name);
                if candidate.is_file() {
                    load_file(&candidate)
                } else {
                    None
                }
            }),
            FontSource::SystemFamily { family, bold } => self.load_family(family, *bold),
            FontSource::Builtin => Some(FontFace::Builtin),
        }
    }

    fn load_family(&mut self, family: &str, bold: bool) -> Option<FontFace> {
        let database = self.database.get_or_insert_with(|| {
            let mut database = Database::new();
            database.load_system_fonts();
            debug!(
                target: "labelforge::fonts",
                "system font database holds {} faces",
                database.len()
            );
            database
        });

        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            ..Query::default()
        };
        let id = database.query(&query)?;
        database
            .with_face_data(id, |data, index| OwnedFace::from_vec(data.to_vec(), index).ok())
            .flatten()
            .map(FontFace::Outline)
    }
}

/// Builtin faces are the last resort and always serve.
fn serves(role: FontRole, face: &FontFace) -> bool {
    face.is_builtin() || coverage_sample(role).map_or(true, |sample| face.covers(sample))
}

fn load_file(path: &Path) -> Option<FontFace> {
    if path.as_os_str().is_empty() {
        return None;
    }
    match std::fs::read(path) {
        Ok(data) => {
            let face = FontFace::from_data(data, 0);
            if face.is_none() {
                debug!(target: "labelforge::fonts", "{} is not a usable font", path.display());
            }
            face
        }
        Err(err) => {
            debug!(target: "labelforge::fonts", "cannot read {}: {err}", path.display());
            None
        }
    }
}
