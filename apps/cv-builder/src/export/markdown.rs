use std::fmt::{self, Write};

use crate::export::compose::{RenderedItem, RenderedResume, SectionBody};

fn write_item(out: &mut impl Write, item: &RenderedItem) -> fmt::Result {
    writeln!(out, "### {}", item.title)?;
    match (item.subtitle.is_empty(), item.dates.is_empty()) {
        (false, false) => {
            writeln!(out, "**{}** | *{}*", item.subtitle, item.dates)?;
        }
        (false, true) => {
            writeln!(out, "**{}**", item.subtitle)?;
        }
        (true, false) => {
            writeln!(out, "*{}*", item.dates)?;
        }
        (true, true) => {}
    }
    out.write_char('\n')?;

    if !item.description.is_empty() {
        writeln!(out, "{}\n", item.description)?;
    }
    if !item.bullets.is_empty() {
        for bullet in &item.bullets {
            writeln!(out, "- {bullet}")?;
        }
        out.write_char('\n')?;
    }
    if !item.details.is_empty() {
        for (label, value) in &item.details {
            writeln!(out, "**{label}:** {value}  ")?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}

fn write_resume(out: &mut impl Write, resume: &RenderedResume) -> fmt::Result {
    let name = if resume.name.is_empty() { "CV" } else { &resume.name };
    writeln!(out, "# {name}\n")?;
    if !resume.job_title.is_empty() {
        writeln!(out, "*{}*\n", resume.job_title)?;
    }

    // Email and phone share the first line; every other contact gets its own.
    let (primary, rest): (Vec<_>, Vec<_>) = resume
        .contact
        .iter()
        .partition(|(label, _)| matches!(*label, "Email" | "Phone"));
    if !primary.is_empty() {
        let line: Vec<String> = primary
            .iter()
            .map(|(label, value)| format!("**{label}:** {value}"))
            .collect();
        writeln!(out, "{}  ", line.join(" | "))?;
    }
    for (label, value) in &rest {
        writeln!(out, "**{label}:** {value}  ")?;
    }
    if !resume.contact.is_empty() {
        out.write_char('\n')?;
    }

    for section in &resume.sections {
        writeln!(out, "## {}\n", section.title)?;
        match &section.body {
            SectionBody::Text(text) => {
                writeln!(out, "{text}\n")?;
            }
            SectionBody::Tags(tags) => {
                writeln!(out, "{}\n", tags.join(", "))?;
            }
            SectionBody::List(lines) => {
                for line in lines {
                    writeln!(out, "- {line}")?;
                }
                out.write_char('\n')?;
            }
            SectionBody::Items(items) => {
                for item in items {
                    write_item(out, item)?;
                }
            }
        }
    }

    Ok(())
}

/// Renders the résumé as CommonMark.
pub fn render(resume: &RenderedResume) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    write_resume(&mut out, resume).ok();
    // Exactly one trailing newline.
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::mutators::{add_entry, set_references};
    use crate::export::compose::compose;
    use crate::export::tests::kim_document;
    use crate::models::entries::{Experience, Period};
    use crate::models::{Entry, ResumeDocument, ResumeType};

    fn markdown_of(doc: &ResumeDocument) -> String {
        render(&compose(doc).unwrap())
    }

    #[test]
    fn test_experience_heading_followed_by_position_line() {
        let doc = add_entry(
            &ResumeDocument::new(ResumeType::CHRONOLOGICAL),
            Entry::new(Experience {
                company: "Acme".into(),
                position: "Engineer".into(),
                period: Period::new("2021-03", "2023-08"),
                ..Default::default()
            }),
        );
        let md = markdown_of(&doc);
        let mut lines = md.lines().skip_while(|l| *l != "## Professional Experience");
        assert_eq!(lines.next(), Some("## Professional Experience"));
        let next = lines.find(|l| !l.trim().is_empty()).unwrap();
        assert!(next.contains("Engineer") && next.contains("Acme"), "got {next:?}");
        assert_eq!(next, "### Engineer at Acme");
        assert!(md.contains("*2021-03 - 2023-08*"));
    }

    #[test]
    fn test_header_and_contact_lines() {
        let md = markdown_of(&kim_document(ResumeType::CHRONOLOGICAL));
        assert!(md.starts_with("# Kim Cheolsu\n\n"));
        assert!(md.contains("**Email:** kim@example.com | **Phone:** 010-1234-5678"));
        assert!(md.contains("**Location:** Seoul, Korea"));
        assert!(md.contains("## Skills\n\nRust\n"));
        assert!(md.contains("## Languages\n\nKorean"));
        assert!(md.ends_with('\n') && !md.ends_with("\n\n"));
    }

    #[test]
    fn test_hidden_sections_not_rendered() {
        let doc = kim_document(ResumeType::ACADEMIC);
        let md = markdown_of(&doc);
        assert!(!md.contains("Professional Experience"));
        assert!(!md.contains("## Skills"));
        assert!(md.contains("## Languages"));
    }

    #[test]
    fn test_references_render_as_list() {
        let doc = set_references(
            &kim_document(ResumeType::ACADEMIC),
            vec!["Prof. Lee, KAIST".into(), "Dr. Park, SNU".into()],
        );
        assert!(markdown_of(&doc).contains("## References\n\n- Prof. Lee, KAIST\n- Dr. Park, SNU"));
    }

    #[test]
    fn test_empty_document_is_just_a_title() {
        assert_eq!(
            markdown_of(&ResumeDocument::new(ResumeType::CASCADE)),
            "# CV\n"
        );
    }
}
