use std::fmt::{self, Write};

use crate::export::compose::{RenderedItem, RenderedResume, SectionBody};

/// Replaces the five HTML-significant characters with entities.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
        body {
            font-family: 'Malgun Gothic', 'Apple SD Gothic Neo', 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
        }
        .header { text-align: center; border-bottom: 2px solid var(--accent); padding-bottom: 20px; margin-bottom: 30px; }
        .name { font-size: 2.5em; color: #1e293b; margin: 0; }
        .job-title { color: var(--accent); font-size: 1.2em; margin: 4px 0; }
        .contact-info { color: #64748b; margin: 10px 0; }
        .section { margin-bottom: 30px; }
        .section-title { font-size: 1.5em; color: var(--accent); border-bottom: 1px solid #e2e8f0; padding-bottom: 5px; margin-bottom: 15px; }
        .item { margin-bottom: 20px; padding: 15px; background-color: #f8fafc; border-radius: 8px; }
        .item-title { font-weight: bold; color: #1e293b; margin-bottom: 5px; }
        .item-subtitle { color: #64748b; font-size: 0.9em; margin-bottom: 10px; }
        .item-detail { font-size: 0.9em; margin: 2px 0; }
        .skills { display: flex; flex-wrap: wrap; gap: 8px; }
        .skill-tag { background-color: var(--accent); color: white; padding: 4px 12px; border-radius: 20px; font-size: 0.9em; }
        @media print {
            body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
        }
        @page { margin: 0.5in; size: A4; }
"#;

fn write_item(out: &mut impl Write, item: &RenderedItem) -> fmt::Result {
    out.write_str("        <div class=\"item\">\n")?;
    writeln!(
        out,
        "            <div class=\"item-title\">{}</div>",
        escape_html(&item.title)
    )?;
    let subtitle: Vec<&str> = [item.subtitle.as_str(), item.dates.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !subtitle.is_empty() {
        writeln!(
            out,
            "            <div class=\"item-subtitle\">{}</div>",
            escape_html(&subtitle.join(" | "))
        )?;
    }
    if !item.description.is_empty() {
        writeln!(out, "            <p>{}</p>", escape_html(&item.description))?;
    }
    if !item.bullets.is_empty() {
        out.write_str("            <ul>\n")?;
        for bullet in &item.bullets {
            writeln!(out, "                <li>{}</li>", escape_html(bullet))?;
        }
        out.write_str("            </ul>\n")?;
    }
    for (label, value) in &item.details {
        writeln!(
            out,
            "            <div class=\"item-detail\"><strong>{label}:</strong> {}</div>",
            escape_html(value)
        )?;
    }
    out.write_str("        </div>\n")
}

fn write_page(out: &mut impl Write, resume: &RenderedResume) -> fmt::Result {
    let name = if resume.name.is_empty() { "CV" } else { &resume.name };
    let name = escape_html(name);

    write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>{name}</title>\n    <style>\n        :root {{ --accent: {}; }}{STYLE}    </style>\n\
         </head>\n<body>\n",
        resume.accent
    )?;

    out.write_str("    <div class=\"header\">\n")?;
    writeln!(out, "        <h1 class=\"name\">{name}</h1>")?;
    if !resume.job_title.is_empty() {
        writeln!(
            out,
            "        <div class=\"job-title\">{}</div>",
            escape_html(&resume.job_title)
        )?;
    }
    if !resume.contact.is_empty() {
        let contact: Vec<String> = resume
            .contact
            .iter()
            .map(|(_, value)| escape_html(value))
            .collect();
        writeln!(
            out,
            "        <div class=\"contact-info\">{}</div>",
            contact.join(" | ")
        )?;
    }
    out.write_str("    </div>\n")?;

    for section in &resume.sections {
        writeln!(
            out,
            "    <div class=\"section\" id=\"{}\">\n        <h2 class=\"section-title\">{}</h2>",
            section.id,
            escape_html(section.title)
        )?;
        match &section.body {
            SectionBody::Text(text) => {
                writeln!(out, "        <p>{}</p>", escape_html(text))?;
            }
            SectionBody::Tags(tags) => {
                out.write_str("        <div class=\"skills\">")?;
                for tag in tags {
                    write!(out, "<span class=\"skill-tag\">{}</span>", escape_html(tag))?;
                }
                out.write_str("</div>\n")?;
            }
            SectionBody::List(lines) => {
                out.write_str("        <ul>\n")?;
                for line in lines {
                    writeln!(out, "            <li>{}</li>", escape_html(line))?;
                }
                out.write_str("        </ul>\n")?;
            }
            SectionBody::Items(items) => {
                for item in items {
                    write_item(out, item)?;
                }
            }
        }
        out.write_str("    </div>\n")?;
    }

    out.write_str("</body>\n</html>\n")
}

/// Renders a self-contained HTML page. All user text is escaped; the accent color
/// is already validated by `compose`.
pub fn render(resume: &RenderedResume) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    write_page(&mut out, resume).ok();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::mutators::{set_header_color, update_personal_info};
    use crate::export::compose::compose;
    use crate::export::tests::kim_document;
    use crate::models::{PersonalField, ResumeType};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_document_structure() {
        let html = render(&compose(&kim_document(ResumeType::CHRONOLOGICAL)).unwrap());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Kim Cheolsu</title>"));
        assert!(html.contains("kim@example.com | 010-1234-5678 | Seoul, Korea"));
        assert!(html.contains("<h2 class=\"section-title\">Professional Experience</h2>"));
        assert!(html.contains("<div class=\"item-title\">Engineer at Acme</div>"));
        assert!(html.contains("<span class=\"skill-tag\">Rust</span>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let doc = update_personal_info(
            &kim_document(ResumeType::CHRONOLOGICAL),
            PersonalField::Summary,
            "<img src=x onerror=alert(1)>",
        );
        let html = render(&compose(&doc).unwrap());
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_header_color_sets_accent() {
        let doc = set_header_color(&kim_document(ResumeType::CASCADE), Some("#10B981"));
        let html = render(&compose(&doc).unwrap());
        assert!(html.contains("--accent: #10b981;"));
    }
}
