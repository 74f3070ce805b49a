//! The `skill_load` tool.
//!
//! The tool's description and parameter schema are generated from the
//! registry when the tool is built, so the model sees the list of skills
//! alongside the tool itself.

use super::registry::Skills;
use crate::ToolDef;
use crate::tools::core::{Tool, ToolContext, ToolFuture, parse_tool_args};
use crate::tools::names;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct SkillLoadArgs {
    skill_name: String,
    #[serde(default)]
    artifact_path: Option<String>,
}

/// Loads a skill's `skill.md` or one of its artifacts.
///
/// Holds a snapshot of the registry taken when the tool was built; skills
/// registered later need a fresh [`Skills::toolset`].
#[derive(Debug, Clone)]
pub struct SkillLoad {
    skills: Skills,
}

impl SkillLoad {
    pub fn new(skills: Skills) -> Self {
        Self { skills }
    }
}

/// The `AVAILABLE SKILLS` listing.
fn skills_listing(skills: &Skills) -> String {
    if skills.is_empty() {
        return "  (No skills registered yet)".to_string();
    }
    skills
        .iter()
        .map(|meta| {
            let mut entry = format!(
                "  - name: {}\n    description: {}",
                meta.name, meta.description
            );
            if let Some(license) = &meta.license {
                entry.push_str(&format!("\n    license: {license}"));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The full `skill_load` description.
pub fn skill_load_description(skills: &Skills) -> String {
    format!(
        "\
Load skill documentation and artifacts to help answer user questions.

SKILL SYSTEM:
Skills are curated knowledge resources containing best practices, documentation,
and implementation guides. Use them to provide accurate, contextual assistance.

AVAILABLE SKILLS:
{listing}

USAGE INSTRUCTIONS:
1. When a user asks a question, identify if any registered skill is relevant
2. Load the appropriate skill using skill_load(skill_name=\"<name>\")
3. Read and understand the skill content
4. If necessary and the skill.md references other files (examples, cheatsheets, etc.),
   you can use this same tool again with artifact_path to load those files
5. Use the loaded information to provide a comprehensive answer

PARAMETERS:
- skill_name: The name of the skill to load (required)
- artifact_path: Optional path to a specific file within the skill folder
  - If omitted or empty, loads the main skill.md file

EXAMPLES:
- skill_load(skill_name=\"python-best-practices\")
  # Then if necessary and skill.md mentions \"see examples.py\":
- skill_load(skill_name=\"python-best-practices\", artifact_path=\"examples.py\")

Always load relevant skills BEFORE answering questions that fall within their domain.
If needed for a complete answer, you can load additional referenced files.",
        listing = skills_listing(skills)
    )
}

/// The `skill_load` parameter schema, naming the registered skills.
pub fn skill_load_parameters(skills: &Skills) -> serde_json::Value {
    let mut skill_name_description = "Name of the skill to load".to_string();
    if !skills.is_empty() {
        skill_name_description.push_str(&format!(". Available: {}", skills.names().join(", ")));
    }
    json!({
        "type": "object",
        "properties": {
            "skill_name": {
                "type": "string",
                "description": skill_name_description,
            },
            "artifact_path": {
                "type": ["string", "null"],
                "description": "Optional path to a specific artifact file within the skill folder. \
                    If None or empty, loads skill.md. If skill.md references other files \
                    (e.g., examples.py) and you need them, you can use this same tool again \
                    with artifact_path to load them.",
            },
        },
        "required": ["skill_name"],
        "additionalProperties": false,
    })
}

impl Tool for SkillLoad {
    fn definition(&self) -> ToolDef {
        ToolDef::new(
            names::SKILL_LOAD,
            skill_load_description(&self.skills),
            skill_load_parameters(&self.skills),
        )
    }

    fn execute<'a>(&'a self, _ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a> {
        Box::pin(async move {
            let args: SkillLoadArgs = match parse_tool_args(arguments) {
                Ok(a) => a,
                Err(e) => return Ok(e),
            };
            Ok(self
                .skills
                .load_async(&args.skill_name, args.artifact_path.as_deref())
                .await)
        })
    }
}
