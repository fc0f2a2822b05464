pub mod document;
pub mod entries;

pub use document::{
    Language, PersonalField, PersonalInfo, ProficiencyLevel, ResumeDocument, ResumeType, Skill,
    SkillScore,
};
pub use entries::{Collection, CollectionItem, Entry, EntryId, Period};
