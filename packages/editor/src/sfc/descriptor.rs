//! Block structure of a single-file component
//!
//! Only top-level tags are blocks. Text between blocks and top-level HTML
//! comments are skipped; `<template>` content may nest further templates.

use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::trace;

const TEMPLATE: &str = "template";
const SCRIPT: &str = "script";
const STYLE: &str = "style";

fn opening_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"^<([A-Za-z][\w-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
        )
        .expect("opening tag pattern is valid")
    })
}

fn attribute() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

fn template_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<(/?)template(?:\s[^>]*?)?(/?)>"#).expect("template tag pattern is valid")
    })
}

/// Value of a tag attribute: a bare flag or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Text(String),
}

impl AttrValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Flag(flag) => *flag,
            AttrValue::Text(text) => !text.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            AttrValue::Flag(_) => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(flag: bool) -> Self {
        AttrValue::Flag(flag)
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        AttrValue::Text(text.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        AttrValue::Text(text)
    }
}

/// Tag attributes in the order they were written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the value of `name` in place, or append it
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn parse(text: &str) -> Self {
        attribute()
            .captures_iter(text)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map_or(AttrValue::Flag(true), |m| AttrValue::from(m.as_str()));
                (caps[1].to_string(), value)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

/// Opening tag text for `kind` with `attrs`
///
/// A truthy `setup` is written first as a bare flag; false flags are left out.
pub fn render_opening_tag(kind: &str, attrs: &Attributes, self_closing: bool) -> String {
    let mut tag = format!("<{}", kind);
    if attrs.get("setup").is_some_and(AttrValue::is_truthy) {
        tag.push_str(" setup");
    }

    for (name, value) in attrs.iter() {
        if name == "setup" {
            continue;
        }
        match value {
            AttrValue::Flag(true) => {
                tag.push(' ');
                tag.push_str(name);
            }
            AttrValue::Flag(false) => {}
            AttrValue::Text(text) if text.contains('"') => {
                tag.push_str(&format!(" {}='{}'", name, text));
            }
            AttrValue::Text(text) => {
                tag.push_str(&format!(" {}=\"{}\"", name, text));
            }
        }
    }

    tag.push_str(if self_closing { " />" } else { ">" });
    tag
}

/// One top-level region of the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Tag name: `template`, `script`, `style` or a custom block name
    pub kind: String,
    pub attrs: Attributes,
    pub content: String,
    /// Range of the opening tag
    pub tag: Range<usize>,
    /// Range of the content between the tags
    pub content_range: Range<usize>,
    pub self_closing: bool,
}

impl Block {
    pub fn lang(&self) -> Option<&str> {
        self.attrs.get("lang").and_then(AttrValue::as_str)
    }

    pub fn is_setup(&self) -> bool {
        self.attrs.get("setup").is_some_and(AttrValue::is_truthy)
    }
}

/// Blocks of a single-file component
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SfcDescriptor {
    pub template: Option<Block>,
    pub script: Option<Block>,
    pub script_setup: Option<Block>,
    pub styles: Vec<Block>,
    pub custom_blocks: Vec<Block>,
}

impl SfcDescriptor {
    pub fn parse(source: &str) -> Self {
        let mut descriptor = SfcDescriptor::default();
        let mut pos = 0;

        while let Some(offset) = source[pos..].find('<') {
            let at = pos + offset;
            let rest = &source[at..];

            if rest.starts_with("<!--") {
                pos = rest
                    .find("-->")
                    .map_or(source.len(), |end| at + end + "-->".len());
                continue;
            }

            let Some(caps) = opening_tag().captures(rest) else {
                pos = at + 1;
                continue;
            };

            let kind = caps[1].to_string();
            let attrs = Attributes::parse(&caps[2]);
            let self_closing = !caps[3].is_empty();
            let tag_end = at + caps[0].len();

            let (content_range, block_end) = if self_closing {
                (tag_end..tag_end, tag_end)
            } else {
                find_close(source, &kind, tag_end)
            };

            let block = Block {
                kind,
                attrs,
                content: source[content_range.clone()].to_string(),
                tag: at..tag_end,
                content_range,
                self_closing,
            };
            descriptor.push(block);
            pos = block_end;
        }

        descriptor
    }

    fn push(&mut self, block: Block) {
        match block.kind.as_str() {
            TEMPLATE if self.template.is_none() => self.template = Some(block),
            SCRIPT if block.is_setup() && self.script_setup.is_none() => {
                self.script_setup = Some(block)
            }
            SCRIPT if !block.is_setup() && self.script.is_none() => self.script = Some(block),
            STYLE => self.styles.push(block),
            TEMPLATE | SCRIPT => {
                trace!(kind = %block.kind, "Ignoring duplicate block");
            }
            _ => self.custom_blocks.push(block),
        }
    }

    /// Blocks of `kind` in document order
    ///
    /// `script` covers both the plain and the `setup` script.
    pub fn blocks(&self, kind: &str) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = match kind {
            TEMPLATE => self.template.iter().collect(),
            SCRIPT => self.script.iter().chain(self.script_setup.iter()).collect(),
            STYLE => self.styles.iter().collect(),
            _ => self
                .custom_blocks
                .iter()
                .filter(|block| block.kind == kind)
                .collect(),
        };
        blocks.sort_by_key(|block| block.tag.start);
        blocks
    }
}

/// Content range and end of the closing tag for a block opened at `from`
fn find_close(source: &str, kind: &str, from: usize) -> (Range<usize>, usize) {
    if kind == TEMPLATE {
        let mut depth = 1;
        for caps in template_tag().captures_iter(&source[from..]) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if !caps[1].is_empty() {
                depth -= 1;
            } else if caps[2].is_empty() {
                depth += 1;
            }
            if depth == 0 {
                return (from..from + whole.start(), from + whole.end());
            }
        }
    } else {
        let closing = format!("</{}", kind);
        let mut search = from;
        while let Some(offset) = source[search..].find(&closing) {
            let start = search + offset;
            let after = &source[start + closing.len()..];
            let trimmed = after.trim_start();
            if trimmed.starts_with('>') {
                let end = source.len() - trimmed.len() + 1;
                return (from..start, end);
            }
            search = start + closing.len();
        }
    }

    trace!(kind, "Unclosed block runs to end of input");
    (from..source.len(), source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"<template>
  <div>
    <template v-if="ok"><span /></template>
  </div>
</template>

<!-- <script>ignored</script> -->
<script setup lang="ts">
const msg = 'hi'
</script>

<style scoped>
.a { color: red }
</style>
<style module='classes' >
.b {}
</style>
<i18n locale=en></i18n>
"#;

    #[test]
    fn test_parse_blocks() {
        let descriptor = SfcDescriptor::parse(COMPONENT);

        let template = descriptor.template.as_ref().unwrap();
        assert!(template.content.contains(r#"<template v-if="ok"><span /></template>"#));
        assert!(template.content.ends_with("</div>\n"));

        assert!(descriptor.script.is_none());
        let setup = descriptor.script_setup.as_ref().unwrap();
        assert!(setup.is_setup());
        assert_eq!(setup.lang(), Some("ts"));
        assert_eq!(setup.content, "\nconst msg = 'hi'\n");

        assert_eq!(descriptor.styles.len(), 2);
        assert_eq!(descriptor.styles[0].attrs.get("scoped"), Some(&AttrValue::Flag(true)));
        assert_eq!(
            descriptor.styles[1].attrs.get("module"),
            Some(&AttrValue::Text("classes".to_string()))
        );

        assert_eq!(descriptor.custom_blocks.len(), 1);
        assert_eq!(descriptor.custom_blocks[0].kind, "i18n");
        assert_eq!(descriptor.custom_blocks[0].attrs.get("locale").and_then(AttrValue::as_str), Some("en"));
    }

    #[test]
    fn test_tag_ranges_point_at_opening_tags() {
        let descriptor = SfcDescriptor::parse(COMPONENT);
        for block in descriptor.styles.iter().chain(descriptor.script_setup.iter()) {
            let tag = &COMPONENT[block.tag.clone()];
            assert!(tag.starts_with(&format!("<{}", block.kind)));
            assert!(tag.ends_with('>'));
        }
    }

    #[test]
    fn test_scripts_in_document_order() {
        let source = "<script setup>\n</script>\n<script lang=\"ts\">\n</script>\n";
        let descriptor = SfcDescriptor::parse(source);
        let scripts = descriptor.blocks("script");
        assert_eq!(scripts.len(), 2);
        assert!(scripts[0].is_setup());
        assert_eq!(scripts[1].lang(), Some("ts"));
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let descriptor = SfcDescriptor::parse("<style>\n.a {}\n");
        assert_eq!(descriptor.styles[0].content, "\n.a {}\n");
    }

    #[test]
    fn test_render_opening_tag() {
        let attrs: Attributes = [
            ("lang", AttrValue::from("ts")),
            ("setup", AttrValue::Flag(true)),
            ("scoped", AttrValue::Flag(false)),
            ("title", AttrValue::from(r#"say "hi""#)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            render_opening_tag("script", &attrs, false),
            r#"<script setup lang="ts" title='say "hi"'>"#
        );
        assert_eq!(render_opening_tag("style", &Attributes::new(), true), "<style />");
    }
}
