// this_file: crates/labelforge-fontdb/src/set.rs

//! Per-role fonts shared read-only by every renderer thread.

use crate::face::FontFace;
use crate::resolver::{FontResolver, ResolvedFont};
use crate::source::{FontChain, FontConfig, FontSource};
use labelforge_core::{FontRole, FontSizes, Result, TextMeasure};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct RoleFont {
    face: Arc<FontFace>,
    source: FontSource,
    size: f32,
}

/// Resolved face and pixel size for every [`FontRole`].
#[derive(Debug, Clone)]
pub struct FontSet {
    fonts: Vec<RoleFont>,
}

impl FontSet {
    /// Resolve every role's chain. Roles whose chains are identical share
    /// one face. Fails when any role has no usable source at all.
    pub fn resolve(config: &FontConfig, sizes: &FontSizes) -> Result<Self> {
        let mut resolver = FontResolver::new();
        let mut resolved: Vec<(FontChain, ResolvedFont)> = Vec::new();
        let mut fonts = Vec::with_capacity(FontRole::ALL.len());

        for role in FontRole::ALL {
            let chain = config.chain_for(role);
            let font = match resolved.iter().find(|(known, _)| *known == chain) {
                Some((_, font)) => font.clone(),
                None => {
                    let font = resolver.resolve(role, &chain)?;
                    resolved.push((chain, font.clone()));
                    font
                }
            };
            fonts.push(RoleFont {
                face: font.face,
                source: font.source,
                size: sizes.size(role),
            });
        }

        Ok(Self { fonts })
    }

    /// The bitmap font for every role.
    pub fn builtin(sizes: &FontSizes) -> Self {
        let face = Arc::new(FontFace::Builtin);
        let fonts = FontRole::ALL
            .into_iter()
            .map(|role| RoleFont {
                face: face.clone(),
                source: FontSource::Builtin,
                size: sizes.size(role),
            })
            .collect();
        Self { fonts }
    }

    fn entry(&self, role: FontRole) -> &RoleFont {
        &self.fonts[role.index()]
    }

    pub fn face(&self, role: FontRole) -> &FontFace {
        &self.entry(role).face
    }

    pub fn size(&self, role: FontRole) -> f32 {
        self.entry(role).size
    }

    pub fn source(&self, role: FontRole) -> &FontSource {
        &self.entry(role).source
    }

    /// Distance from the top of a `role` line box to its baseline.
    pub fn ascent(&self, role: FontRole) -> f32 {
        let entry = self.entry(role);
        entry.face.ascent(entry.size)
    }

    /// True when any role ended on the bitmap fallback.
    pub fn uses_builtin(&self) -> bool {
        self.fonts.iter().any(|font| font.face.is_builtin())
    }
}

impl TextMeasure for FontSet {
    fn advance_width(&self, role: FontRole, text: &str) -> f32 {
        let entry = self.entry(role);
        entry.face.advance_width(text, entry.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_only_config_resolves() {
        let sizes = FontSizes::default();
        let set = FontSet::resolve(&FontConfig::builtin_only(), &sizes).unwrap();
        assert!(set.uses_builtin());
        assert_eq!(set.size(FontRole::Footer), 20.0);
        assert_eq!(set.source(FontRole::Brand), &FontSource::Builtin);
    }

    #[test]
    fn test_measure_scales_with_role_size() {
        let set = FontSet::builtin(&FontSizes::default());
        let field = set.advance_width(FontRole::Field, "Model : A1");
        let footer = set.advance_width(FontRole::Footer, "Model : A1");
        assert!(field > footer);
        // 10 cells * 6 units * 34/8 px
        assert!((field - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_builtin_and_no_files_fails() {
        let config = FontConfig {
            primary: "/nonexistent/labelforge-missing-bold.ttf".into(),
            footer: "/nonexistent/labelforge-missing-regular.ttf".into(),
            system_family: None,
            allow_builtin: false,
        };
        let err = FontSet::resolve(&config, &FontSizes::default()).unwrap_err();
        assert!(matches!(err, labelforge_core::Error::NoFontAvailable { .. }));
    }
}
