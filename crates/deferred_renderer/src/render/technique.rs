//! Shading techniques
//!
//! A technique names the shader program family a draw uses. Components may
//! carry their own technique name; everything else is drawn with the
//! pipeline's global technique.

use std::fmt;

/// How a technique computes lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingModel {
    /// Writes surface attributes for the lighting pass
    #[default]
    Deferred,
    /// Lights itself while drawing
    Forward,
    /// Outputs its base color unchanged
    Unlit,
}

/// Named shading technique
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Technique {
    name: String,
    shading: ShadingModel,
}

impl Technique {
    /// Create a technique
    pub fn new(name: impl Into<String>, shading: ShadingModel) -> Self {
        Self {
            name: name.into(),
            shading,
        }
    }

    /// Deferred technique with the given name
    pub fn deferred(name: impl Into<String>) -> Self {
        Self::new(name, ShadingModel::Deferred)
    }

    /// Technique name passed to the command context
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shading model
    pub fn shading(&self) -> ShadingModel {
        self.shading
    }
}

impl Default for Technique {
    fn default() -> Self {
        Self::deferred("Deferred")
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.shading)
    }
}

/// Technique name to draw a component with
pub fn resolve<'a>(component: Option<&'a str>, global: &'a Technique) -> &'a str {
    component.unwrap_or_else(|| global.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_override_wins() {
        let global = Technique::default();
        assert_eq!(resolve(Some("Glass"), &global), "Glass");
        assert_eq!(resolve(None, &global), "Deferred");
    }
}
