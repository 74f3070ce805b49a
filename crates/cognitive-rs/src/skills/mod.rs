//! Skills: curated markdown documents served to the model on demand.
//!
//! [`Skills`] discovers `skill.md` files under a folder and validates their
//! YAML frontmatter. [`Skills::toolset`] exposes them through a single
//! `skill_load` tool whose description lists every registered skill.

pub mod registry;
pub mod tool;

pub use registry::{SKILL_FILE, SkillError, SkillMetadata, Skills};
pub use tool::SkillLoad;

use crate::tools::core::ToolSet;

impl Skills {
    /// A tool set holding one `skill_load` tool over a snapshot of this
    /// registry.
    pub fn toolset(&self) -> ToolSet {
        ToolSet::new().with(SkillLoad::new(self.clone()))
    }
}
