//! Structured tool descriptions with usage guidance.
//!
//! [`ToolSpec`] assembles a tool description from named sections (purpose,
//! when to use, when not to use, examples, output format) plus optional
//! free-form notes appended verbatim, such as the planning instructions
//! carried by `plan_create`.

use crate::ToolDef;

/// A structured tool specification with usage guidance.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Tool name (must be unique within a ToolSet).
    pub name: String,
    /// One-sentence imperative purpose: "Create a step-by-step plan".
    pub purpose: String,
    /// When this tool should be used.
    pub when_to_use: String,
    /// When this tool should NOT be used.
    pub when_not_to_use: String,
    /// JSON Schema for the arguments.
    pub parameters: serde_json::Value,
    /// Usage examples.
    pub examples: Vec<UsageExample>,
    /// Description of the output format.
    pub output_format: String,
    /// Blocks appended after the structured sections, separated by blank lines.
    pub notes: Vec<String>,
}

/// A usage example for a tool.
#[derive(Debug, Clone)]
pub struct UsageExample {
    /// Description of the input/scenario.
    pub input: String,
    /// Expected behavior or output.
    pub output: String,
}

impl ToolSpec {
    /// Create a new ToolSpec builder.
    pub fn builder(name: impl Into<String>) -> ToolSpecBuilder {
        ToolSpecBuilder {
            name: name.into(),
            purpose: None,
            when_to_use: None,
            when_not_to_use: None,
            parameters: None,
            examples: Vec::new(),
            output_format: None,
            notes: Vec::new(),
        }
    }

    /// Render the description string sent to the model.
    pub fn to_description(&self) -> String {
        let mut desc = format!("{}.", self.purpose);
        desc.push_str(&format!("\nWhen to use: {}", self.when_to_use));
        desc.push_str(&format!("\nWhen NOT to use: {}", self.when_not_to_use));

        if !self.examples.is_empty() {
            desc.push_str("\nExamples:");
            for ex in &self.examples {
                desc.push_str(&format!("\n  - Input: {} → {}", ex.input, ex.output));
            }
        }

        if !self.output_format.is_empty() {
            desc.push_str(&format!("\nOutput format: {}", self.output_format));
        }

        for note in &self.notes {
            desc.push_str("\n\n");
            desc.push_str(note.trim_end());
        }

        desc
    }

    /// Convert to a [`ToolDef`] carrying the rendered description.
    pub fn to_tool_def(&self) -> ToolDef {
        ToolDef::new(
            self.name.clone(),
            self.to_description(),
            self.parameters.clone(),
        )
    }
}

/// Builder for constructing a `ToolSpec`. Panics on `build()` if required
/// fields are missing, so an incomplete spec fails at registration time.
pub struct ToolSpecBuilder {
    name: String,
    purpose: Option<String>,
    when_to_use: Option<String>,
    when_not_to_use: Option<String>,
    parameters: Option<serde_json::Value>,
    examples: Vec<UsageExample>,
    output_format: Option<String>,
    notes: Vec<String>,
}

impl ToolSpecBuilder {
    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn when_to_use(mut self, when: impl Into<String>) -> Self {
        self.when_to_use = Some(when.into());
        self
    }

    pub fn when_not_to_use(mut self, when_not: impl Into<String>) -> Self {
        self.when_not_to_use = Some(when_not.into());
        self
    }

    pub fn parameters(mut self, params: serde_json::Value) -> Self {
        self.parameters = Some(params);
        self
    }

    /// Derive JSON Schema parameters from a type implementing `schemars::JsonSchema`.
    pub fn parameters_for<T: schemars::JsonSchema>(self) -> Self {
        self.parameters(crate::json_schema_for::<T>())
    }

    pub fn example(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.examples.push(UsageExample {
            input: input.into(),
            output: output.into(),
        });
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    /// Append a free-form block to the end of the description.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Shortcut for `.build().to_tool_def()`.
    pub fn to_tool_def(self) -> ToolDef {
        self.build().to_tool_def()
    }

    /// Build the `ToolSpec`. Panics if required fields are missing.
    pub fn build(self) -> ToolSpec {
        ToolSpec {
            name: self.name,
            purpose: self.purpose.expect("ToolSpec requires 'purpose'"),
            when_to_use: self.when_to_use.expect("ToolSpec requires 'when_to_use'"),
            when_not_to_use: self
                .when_not_to_use
                .expect("ToolSpec requires 'when_not_to_use'"),
            parameters: self.parameters.expect("ToolSpec requires 'parameters'"),
            examples: self.examples,
            output_format: self.output_format.unwrap_or_else(|| "Plain text".into()),
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_progress() -> ToolSpecBuilder {
        ToolSpec::builder("plan_show_progress")
            .purpose("Show the current plan")
            .when_to_use("Before choosing the next step")
            .when_not_to_use("When no plan exists yet; call plan_create instead")
            .parameters(serde_json::json!({"type": "object", "properties": {}}))
    }

    #[test]
    fn description_has_structured_sections() {
        let spec = show_progress()
            .example("plan_show_progress()", "Numbered steps with [x] / [ ] markers")
            .build();
        let desc = spec.to_description();
        assert!(desc.starts_with("Show the current plan."));
        assert!(desc.contains("\nWhen NOT to use: When no plan exists yet"));
        assert!(desc.contains("  - Input: plan_show_progress() → Numbered steps"));
        assert!(desc.contains("Output format: Plain text"));
    }

    #[test]
    fn notes_are_appended_after_blank_line() {
        let desc = show_progress()
            .note("Extra guidance\n")
            .note("More guidance")
            .build()
            .to_description();
        assert!(desc.ends_with("Plain text\n\nExtra guidance\n\nMore guidance"));
    }

    #[test]
    fn builder_to_tool_def_shortcut() {
        let def = show_progress().to_tool_def();
        assert_eq!(def.function.name, "plan_show_progress");
        assert!(def.function.description.contains("Show the current plan"));
    }

    #[test]
    #[should_panic(expected = "ToolSpec requires 'purpose'")]
    fn builder_panics_on_missing_purpose() {
        ToolSpec::builder("incomplete")
            .when_to_use("test")
            .when_not_to_use("test")
            .parameters(serde_json::json!({}))
            .build();
    }
}
