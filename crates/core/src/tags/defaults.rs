//! The built-in Amigaguide vocabulary of versions 34, 39 and 40.

use super::OptionType::{self, Any, Color, File, FileNode, Node, Number, Text};
use super::{Scope, TagPool, TagSpec, Version};
use once_cell::sync::Lazy;

/// Pool with every built-in tag, cloned into each new [`TagPool`].
pub static BUILTIN_TAGS: Lazy<TagPool> = Lazy::new(|| {
    let mut pool = TagPool::empty();
    for tag in builtin_tags() {
        pool.add_tag(tag);
    }
    pool
});

/// All built-in tags and link types.
pub fn builtin_tags() -> Vec<TagSpec> {
    use Scope::{Global, Inline};
    use Version::{V34, V39, V40};

    let node = |name: &str, version| TagSpec::new(name, version, Scope::Node);
    let global = |name: &str, version| TagSpec::new(name, version, Global);
    let inline = |name: &str, version| TagSpec::new(name, version, Inline);

    vec![
        // V34
        global("$ver:", V34).unique().with_options(&[OptionType::Some]),
        global("(c)", V34).unique().with_options(&[OptionType::Some]),
        global("author", V34).unique().with_options(&[OptionType::Some]),
        global("database", V34).unique().with_options(&[Any]),
        global("dnode", V34).unique().with_options(&[Any]).obsolete(),
        global("endnode", V34),
        global("font", V34).unique().with_options(&[Text, Number]),
        global("height", V34).unique().with_options(&[Number]).unused(),
        global("help", V34).unique().with_options(&[Node]),
        global("index", V34).unique().with_options(&[Node]),
        global("master", V34).unique().with_options(&[Text]).unused(),
        global("node", V34).with_options(&[OptionType::Some]),
        global("rem", V34).with_options(&[Any]),
        global("remark", V34).with_options(&[Any]),
        global("width", V34).unique().with_options(&[Number]).unused(),
        node("font", V34).unique().with_options(&[Text, Number]),
        node("help", V34).unique().with_options(&[Node]),
        node("index", V34).unique().with_options(&[Node]),
        node("keywords", V34).unique().with_options(&[Any]),
        node("next", V34).unique().with_options(&[Node]),
        node("prev", V34).unique().with_options(&[Node]),
        node("rem", V34).with_options(&[Any]),
        node("remark", V34).with_options(&[Any]),
        node("title", V34).unique().with_options(&[Text]),
        node("toc", V34).unique().with_options(&[Node]),
        inline("bg", V34).with_options(&[Color]),
        inline("fg", V34).with_options(&[Color]),
        TagSpec::link("alink", V34).with_options(&[FileNode, Any]),
        TagSpec::link("close", V34),
        TagSpec::link("link", V34).with_options(&[FileNode, Any]),
        TagSpec::link("rx", V34).with_options(&[Text]),
        TagSpec::link("rxs", V34).with_options(&[File]),
        TagSpec::link("system", V34).with_options(&[Text]),
        TagSpec::link("quit", V34),
        // V39
        global("wordwrap", V39).unique(),
        global("xref", V39).unique().with_options(&[File]),
        node("embed", V39).with_options(&[File]),
        node("proportional", V39).unique(),
        node("wordwrap", V39).unique(),
        inline("b", V39),
        inline("i", V39),
        inline("u", V39),
        inline("ub", V39),
        inline("ui", V39),
        inline("uu", V39),
        TagSpec::link("beep", V39),
        TagSpec::link("guide", V39).with_options(&[File]),
        // V40
        global("macro", V40).with_options(&[Text, Text]),
        global("onclose", V40).unique().with_options(&[File]),
        global("onopen", V40).unique().with_options(&[File]),
        global("smartwrap", V40).unique(),
        global("tab", V40).unique().with_options(&[Number]),
        node("onclose", V40).unique().with_options(&[File]),
        node("onopen", V40).unique().with_options(&[File]),
        node("smartwrap", V40).unique(),
        node("tab", V40).unique().with_options(&[Number]),
        inline("amigaguide", V40),
        inline("apen", V40).with_options(&[Number]),
        inline("body", V40),
        inline("bpen", V40).with_options(&[Number]),
        inline("cleartabs", V40),
        inline("code", V40),
        inline("jcenter", V40),
        inline("jleft", V40),
        inline("jright", V40),
        inline("lindent", V40).with_options(&[Number]),
        inline("line", V40),
        inline("par", V40),
        inline("pard", V40),
        inline("pari", V40).with_options(&[Number]),
        inline("plain", V40),
        inline("settabs", V40).with_options(&[OptionType::Some]),
        inline("tab", V40),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_tags_are_never_inline() {
        assert!(
            builtin_tags()
                .iter()
                .all(|tag| !(tag.unique && tag.scope == Scope::Inline))
        );
    }

    #[test]
    fn builtin_pool_has_every_tag() {
        assert_eq!(BUILTIN_TAGS.len(), builtin_tags().len());
        let dnode = BUILTIN_TAGS.get_tag("dnode", Scope::Global).unwrap();
        assert!(dnode.obsolete);
        assert_eq!(
            BUILTIN_TAGS.get_tag("macro", Scope::Global).unwrap().version,
            Version::V40
        );
    }
}
