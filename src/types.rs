//!
//! Closed vocabularies shared across the block parser, the tag rule model and
//! the replacement engine: declaration classifications, recognized Javadoc
//! tags, and the placement/overwrite/location policies.

use std::fmt;
use std::str::FromStr;

/// Kind of declaration a block resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Class,
    Interface,
    Enum,
    Method,
    Field,
    /// Only annotation lines precede the end of the block, no header line.
    AnnotationUsage,
    /// No recognizable declaration.
    None,
}

impl ElementType {
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Class => "CLASS",
            ElementType::Interface => "INTERFACE",
            ElementType::Enum => "ENUM",
            ElementType::Method => "METHOD",
            ElementType::Field => "FIELD",
            ElementType::AnnotationUsage => "ANNOTATION_USAGE",
            ElementType::None => "NONE",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CLASS" => Ok(ElementType::Class),
            "INTERFACE" => Ok(ElementType::Interface),
            "ENUM" => Ok(ElementType::Enum),
            "METHOD" => Ok(ElementType::Method),
            "FIELD" => Ok(ElementType::Field),
            "ANNOTATION_USAGE" | "ANNOTATION-USAGE" => Ok(ElementType::AnnotationUsage),
            "NONE" => Ok(ElementType::None),
            _ => Err(format!("unrecognized element type `{s}`")),
        }
    }
}

/// Javadoc tags a rule may manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Author,
    Version,
    Since,
    See,
    Param,
    Return,
    Throws,
    Exception,
    Deprecated,
    Serial,
}

impl TagKind {
    pub fn name(&self) -> &'static str {
        match self {
            TagKind::Author => "author",
            TagKind::Version => "version",
            TagKind::Since => "since",
            TagKind::See => "see",
            TagKind::Param => "param",
            TagKind::Return => "return",
            TagKind::Throws => "throws",
            TagKind::Exception => "exception",
            TagKind::Deprecated => "deprecated",
            TagKind::Serial => "serial",
        }
    }

    /// Whether a rule for this tag may leave the value argument empty.
    /// `@return 戻り値` style rules carry only a description.
    pub fn allows_empty_value(&self) -> bool {
        matches!(self, TagKind::Return | TagKind::Deprecated)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TagKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('@').to_ascii_lowercase().as_str() {
            "author" => Ok(TagKind::Author),
            "version" => Ok(TagKind::Version),
            "since" => Ok(TagKind::Since),
            "see" => Ok(TagKind::See),
            "param" => Ok(TagKind::Param),
            "return" => Ok(TagKind::Return),
            "throws" => Ok(TagKind::Throws),
            "exception" => Ok(TagKind::Exception),
            "deprecated" => Ok(TagKind::Deprecated),
            "serial" => Ok(TagKind::Serial),
            _ => Err(format!("unrecognized tag `{s}`")),
        }
    }
}

/// Where a managed tag is placed inside the comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// Head of the tag section: the first existing tag line, or the line
    /// right after the comment opener when no tags exist yet.
    Beginning,
    /// Last line of the comment body.
    #[default]
    End,
    None,
    Preserve,
}

impl FromStr for InsertPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BEGINNING" => Ok(InsertPosition::Beginning),
            "END" => Ok(InsertPosition::End),
            "NONE" => Ok(InsertPosition::None),
            "PRESERVE" => Ok(InsertPosition::Preserve),
            _ => Err(format!("unrecognized insert position `{s}`")),
        }
    }
}

/// Whether an existing occurrence of a managed tag gets its content replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    Always,
    #[default]
    Never,
    /// For the `version` tag: overwrite iff the configured value compares
    /// lower than the existing one. For every other tag it always overwrites.
    IfLower,
    None,
}

impl FromStr for Overwrite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALWAYS" => Ok(Overwrite::Always),
            "NEVER" => Ok(Overwrite::Never),
            "IF_LOWER" | "IF-LOWER" => Ok(Overwrite::IfLower),
            "NONE" => Ok(Overwrite::None),
            _ => Err(format!("unrecognized overwrite policy `{s}`")),
        }
    }
}

/// Which declaration kinds a rule is allowed to apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationMode {
    /// Any classification is a legal target.
    #[default]
    Compliant,
    /// Only the classifications listed in `target_elements` are legal.
    Manual,
    /// No classification is ever a legal target.
    None,
}

impl FromStr for LocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COMPLIANT" => Ok(LocationMode::Compliant),
            "MANUAL" => Ok(LocationMode::Manual),
            "NONE" => Ok(LocationMode::None),
            _ => Err(format!("unrecognized location mode `{s}`")),
        }
    }
}
