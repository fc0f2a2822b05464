pub mod handlers;
pub mod registry;

pub use registry::{
    all_templates, get_template, optional_sections, required_sections, section_order, SectionId,
    TemplateDescriptor, TemplateError,
};
