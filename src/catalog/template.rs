//! Typed predicate and expression templates.
//!
//! Catalog conditions and column expressions are written with `{name}`
//! placeholders (`{L}.chr = {R}.chr`, `{L}.pos {pMinOffset}`). They are
//! tokenized once when the catalog is built, so an unknown placeholder is a
//! catalog error and a missing run-time value is reported while compiling,
//! never as half-substituted SQL. `{{` and `}}` stand for literal braces.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::errors::CatalogError;

lazy_static! {
    static ref TOKEN: Regex =
        Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("template token pattern is valid");
}

/// Named run-time value a template can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    /// Alias the template is instantiated for (left side of a pair)
    Left,
    /// Right side of an alias pair
    Right,
    ZoneSize,
    RegionPositionMargin,
    RegionMatchPercent,
    RegionMatchBases,
    PositionMinOffset,
    PositionMaxOffset,
    GeneTypeId,
    SymbolNamespaceId,
    LdProfileId,
    AmbiguityColumn1,
    AmbiguityColumn2,
    AmbiguityCondition,
    AllowUnvalidatedPositions,
}

impl Placeholder {
    pub const ALL: [Placeholder; 15] = [
        Placeholder::Left,
        Placeholder::Right,
        Placeholder::ZoneSize,
        Placeholder::RegionPositionMargin,
        Placeholder::RegionMatchPercent,
        Placeholder::RegionMatchBases,
        Placeholder::PositionMinOffset,
        Placeholder::PositionMaxOffset,
        Placeholder::GeneTypeId,
        Placeholder::SymbolNamespaceId,
        Placeholder::LdProfileId,
        Placeholder::AmbiguityColumn1,
        Placeholder::AmbiguityColumn2,
        Placeholder::AmbiguityCondition,
        Placeholder::AllowUnvalidatedPositions,
    ];

    /// Name as written between braces.
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Left => "L",
            Placeholder::Right => "R",
            Placeholder::ZoneSize => "zoneSize",
            Placeholder::RegionPositionMargin => "rpMargin",
            Placeholder::RegionMatchPercent => "rmPercent",
            Placeholder::RegionMatchBases => "rmBases",
            Placeholder::PositionMinOffset => "pMinOffset",
            Placeholder::PositionMaxOffset => "pMaxOffset",
            Placeholder::GeneTypeId => "typeID_gene",
            Placeholder::SymbolNamespaceId => "namespaceID_symbol",
            Placeholder::LdProfileId => "ldprofileID",
            Placeholder::AmbiguityColumn1 => "gbColumn1",
            Placeholder::AmbiguityColumn2 => "gbColumn2",
            Placeholder::AmbiguityCondition => "gbCondition",
            Placeholder::AllowUnvalidatedPositions => "allowUSP",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A placeholder was left without a value at render time.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no value for template parameter `{{{0}}}`")]
pub struct MissingParameter(pub Placeholder);

/// Run-time values for every placeholder except the alias markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateParams {
    values: BTreeMap<Placeholder, String>,
}

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, placeholder: Placeholder, value: impl ToString) -> &mut Self {
        self.values.insert(placeholder, value.to_string());
        self
    }

    pub fn with(mut self, placeholder: Placeholder, value: impl ToString) -> Self {
        self.set(placeholder, value);
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Placeholder),
}

/// A parsed template: literal text interleaved with placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, CatalogError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for caps in TOKEN.captures_iter(source) {
            let Some(token) = caps.get(0) else { continue };
            text.push_str(&source[last..token.start()]);
            last = token.end();

            match token.as_str() {
                "{{" => text.push('{'),
                "}}" => text.push('}'),
                "{" | "}" => {
                    return Err(CatalogError::UnbalancedBrace {
                        offset: token.start(),
                        template: source.to_string(),
                    })
                }
                _ => {
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let placeholder = Placeholder::from_name(name).ok_or_else(|| {
                        CatalogError::UnknownPlaceholder {
                            name: name.to_string(),
                            template: source.to_string(),
                        }
                    })?;
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Slot(placeholder));
                }
            }
        }
        text.push_str(&source[last..]);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Template {
            source: source.to_string(),
            segments,
        })
    }

    /// Template text as written in the catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.placeholders().any(|p| p == placeholder)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot(p) => Some(*p),
            Segment::Text(_) => None,
        })
    }

    /// Substitute every placeholder. `left`/`right` fill the alias markers.
    pub fn render(
        &self,
        params: &TemplateParams,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Result<String, MissingParameter> {
        let mut out = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(Placeholder::Left) => {
                    out.push_str(left.ok_or(MissingParameter(Placeholder::Left))?)
                }
                Segment::Slot(Placeholder::Right) => {
                    out.push_str(right.ok_or(MissingParameter(Placeholder::Right))?)
                }
                Segment::Slot(p) => out.push_str(params.get(*p).ok_or(MissingParameter(*p))?),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
