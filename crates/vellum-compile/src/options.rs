//! Compiler options

/// Options governing one compiler run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Name of the data-row collection field expressions are scoped
    /// under (builds canonical field paths)
    pub relationship: String,
    /// When false, numbered sub-band tags fold into their base band
    pub allow_sub_bands: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            relationship: "lines".to_string(),
            allow_sub_bands: true,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }

    pub fn allow_sub_bands(mut self, allow: bool) -> Self {
        self.allow_sub_bands = allow;
        self
    }
}
