//! Read-only suggestion tables for the editor: a skill catalog grouped by field
//! and a directory of Korean schools.

pub mod handlers;
pub mod schools;
pub mod skills;

use thiserror::Error;

pub use schools::{find_schools, School, SchoolFilter};
pub use skills::{search_skills, skill_groups, SkillGroup};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown skill category '{0}'")]
    UnknownCategory(String),
}
