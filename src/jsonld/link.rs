use std::fmt;

use super::OntologyError;

/// Link value marking rows that never reach the document
pub const NOT_ONTOLOGIZE: &str = "NotOntologize";

/// Link value routing a row into the document's `rdfs:comment` object
pub const COMMENT: &str = "Comment";

const SEGMENT_SEPARATOR: char = '-';
const COMMAND_SEPARATOR: char = '|';

/// One parsed segment of an ontology link expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Plain key
    Plain(String),
    /// `rev|name`: address `name` inside the node's `@reverse` container
    Reverse(String),
    /// `type|name`: set the node's `@type` to `name` and stop
    Type(String),
}

impl Step {
    /// Key or type name carried by the step
    pub fn name(&self) -> &str {
        match self {
            Step::Plain(name) | Step::Reverse(name) | Step::Type(name) => name,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Plain(name) => write!(f, "{}", name),
            Step::Reverse(name) => write!(f, "rev|{}", name),
            Step::Type(name) => write!(f, "type|{}", name),
        }
    }
}

/// Parsed `-`-delimited link expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPath {
    steps: Vec<Step>,
}

impl LinkPath {
    /// Parse a link expression such as `hasCase-rev|isPartOf-hasProperty`
    pub fn parse(link: &str) -> Result<Self, OntologyError> {
        let malformed = |segment: &str| OntologyError::MalformedSegment {
            segment: segment.to_string(),
            link: link.to_string(),
        };

        let mut steps = Vec::new();
        for raw in link.trim().split(SEGMENT_SEPARATOR) {
            let parts: Vec<&str> = raw.split(COMMAND_SEPARATOR).collect();
            let step = match parts.as_slice() {
                [name] if !name.is_empty() => Step::Plain(name.to_string()),
                ["rev", name] if !name.is_empty() => Step::Reverse(name.to_string()),
                ["type", name] if !name.is_empty() => Step::Type(name.to_string()),
                _ => return Err(malformed(raw)),
            };
            steps.push(step);
        }
        Ok(Self { steps })
    }

    /// Steps in order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Name of the final step
    pub fn last_name(&self) -> Option<&str> {
        self.steps.last().map(Step::name)
    }
}

impl fmt::Display for LinkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEGMENT_SEPARATOR)?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
