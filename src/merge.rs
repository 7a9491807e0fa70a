use crate::enums::EnumFragment;
use crate::extract::{MarkedSection, OpSection, OP_DEF_SEPARATOR};

impl MarkedSection<'_> {
    /// Rebuilds the file with `content` between the opening and `// End`
    /// markers. Text outside the markers is copied as-is.
    pub fn render(&self, content: &str) -> String {
        let marker = self.marker;
        format!(
            "{}{marker}\n\n{content}\n\n// End {marker}{}",
            self.prefix, self.suffix
        )
    }
}

/// Enum fragments sorted by kind name and separated by a blank line.
pub fn merge_enum_section(section: &MarkedSection<'_>, mut fragments: Vec<EnumFragment>) -> String {
    fragments.sort_by(|a, b| a.kind.cmp(&b.kind));
    let body = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    section.render(&body)
}

pub fn merge_opcode_section(section: &MarkedSection<'_>, fragment: &str) -> String {
    section.render(fragment)
}

/// Header, op definitions in the given order, footer.
pub fn merge_op_section(section: &OpSection<'_>, defs: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(defs.len() + 2);
    parts.push(section.header);
    parts.extend(defs.iter().map(String::as_str));
    parts.push(section.footer);
    parts.join(OP_DEF_SEPARATOR)
}
