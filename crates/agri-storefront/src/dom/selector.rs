//! CSS selector subset for the in-memory document.
//!
//! Supports selector lists (`a, b`), descendant and child combinators, and
//! compounds made of a tag, `#id`, `.class` and `[attr]` / `[attr=value]`.

/// Read access to an element tree.
pub(crate) trait Tree {
    type Id: Copy;

    /// Tag name, or `None` if `id` is not an element.
    fn tag(&self, id: Self::Id) -> Option<&str>;
    fn attr(&self, id: Self::Id, name: &str) -> Option<&str>;
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCond {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCond>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One compound plus its relation to the compound on its left.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    combinator: Option<Combinator>,
    compound: Compound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
    chains: Vec<Vec<Part>>,
}

impl SelectorList {
    pub(crate) fn parse(selector: &str) -> Option<Self> {
        let chains = split_outside(selector, ',')
            .into_iter()
            .map(|group| parse_chain(group.trim()))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { chains })
    }

    pub(crate) fn matches<T: Tree>(&self, tree: &T, id: T::Id) -> bool {
        tree.tag(id).is_some()
            && self
                .chains
                .iter()
                .any(|chain| match_part(tree, chain, chain.len() - 1, id))
    }
}

fn match_part<T: Tree>(tree: &T, chain: &[Part], idx: usize, id: T::Id) -> bool {
    let part = &chain[idx];
    if !compound_matches(tree, &part.compound, id) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match part.combinator {
        Some(Combinator::Child) => tree
            .parent(id)
            .is_some_and(|p| match_part(tree, chain, idx - 1, p)),
        _ => {
            let mut cursor = tree.parent(id);
            while let Some(ancestor) = cursor {
                if match_part(tree, chain, idx - 1, ancestor) {
                    return true;
                }
                cursor = tree.parent(ancestor);
            }
            false
        }
    }
}

fn compound_matches<T: Tree>(tree: &T, compound: &Compound, id: T::Id) -> bool {
    let Some(tag) = tree.tag(id) else {
        return false;
    };
    if let Some(expected) = &compound.tag {
        if !tag.eq_ignore_ascii_case(expected) {
            return false;
        }
    }
    if let Some(expected) = &compound.id {
        if tree.attr(id, "id") != Some(expected.as_str()) {
            return false;
        }
    }
    let classes = tree.attr(id, "class").unwrap_or("");
    if !compound
        .classes
        .iter()
        .all(|c| classes.split_whitespace().any(|have| have == c))
    {
        return false;
    }
    compound.attrs.iter().all(|cond| match cond {
        AttrCond::Exists(name) => tree.attr(id, name).is_some(),
        AttrCond::Equals(name, value) => tree.attr(id, name) == Some(value.as_str()),
    })
}

fn parse_chain(group: &str) -> Option<Vec<Part>> {
    let mut parts = Vec::new();
    let mut pending = None;
    let mut rest = group;

    loop {
        let trimmed = rest.trim_start();
        let had_space = trimmed.len() != rest.len();
        rest = trimmed;
        if rest.is_empty() {
            break;
        }
        if let Some(after) = rest.strip_prefix('>') {
            if parts.is_empty() || pending == Some(Combinator::Child) {
                return None;
            }
            pending = Some(Combinator::Child);
            rest = after;
            continue;
        }
        if had_space && !parts.is_empty() && pending.is_none() {
            pending = Some(Combinator::Descendant);
        }

        let (compound, after) = parse_compound(rest)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part {
            combinator,
            compound,
        });
        rest = after;
    }

    if parts.is_empty() || pending.is_some() {
        return None;
    }
    Some(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(input: &str) -> Option<(&str, &str)> {
    let end = input
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    (end > 0).then(|| (&input[..end], &input[end..]))
}

fn parse_compound(input: &str) -> Option<(Compound, &str)> {
    let mut compound = Compound::default();
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else if let Some((tag, after)) = take_ident(rest) {
        compound.tag = Some(tag.to_ascii_lowercase());
        rest = after;
    }

    loop {
        if let Some(after) = rest.strip_prefix('#') {
            let (id, after) = take_ident(after)?;
            compound.id = Some(id.to_string());
            rest = after;
        } else if let Some(after) = rest.strip_prefix('.') {
            let (class, after) = take_ident(after)?;
            compound.classes.push(class.to_string());
            rest = after;
        } else if let Some(after) = rest.strip_prefix('[') {
            let (cond, after) = parse_attr(after)?;
            compound.attrs.push(cond);
            rest = after;
        } else {
            break;
        }
    }

    if rest.len() == input.len() {
        return None;
    }
    Some((compound, rest))
}

/// Parses after `[` up to and including `]`.
fn parse_attr(input: &str) -> Option<(AttrCond, &str)> {
    let input = input.trim_start();
    let (name, rest) = take_ident(input)?;
    let rest = rest.trim_start();

    if let Some(after) = rest.strip_prefix(']') {
        return Some((AttrCond::Exists(name.to_string()), after));
    }

    let rest = rest.strip_prefix('=')?.trim_start();
    let (value, rest) = match rest.chars().next()? {
        quote @ ('"' | '\'') => parse_quoted(&rest[1..], quote)?,
        _ => {
            let end = rest.find(|c: char| c == ']' || c.is_whitespace())?;
            (rest[..end].to_string(), &rest[end..])
        }
    };
    let rest = rest.trim_start().strip_prefix(']')?;
    Some((AttrCond::Equals(name.to_string(), value), rest))
}

fn parse_quoted(input: &str, quote: char) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            value.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((value, &input[i + c.len_utf8()..]));
        } else {
            value.push(c);
        }
    }
    None
}

/// Split on `sep` outside brackets and quotes.
fn split_outside(input: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                out.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&input[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Flat test tree: (tag, attrs, parent).
    struct Fixture(Vec<(&'static str, HashMap<&'static str, &'static str>, Option<usize>)>);

    impl Tree for Fixture {
        type Id = usize;

        fn tag(&self, id: usize) -> Option<&str> {
            Some(self.0[id].0)
        }

        fn attr(&self, id: usize, name: &str) -> Option<&str> {
            self.0[id].1.get(name).copied()
        }

        fn parent(&self, id: usize) -> Option<usize> {
            self.0[id].2
        }
    }

    fn fixture() -> Fixture {
        Fixture(vec![
            ("div", HashMap::from([("class", "cart-item-row selected")]), None),
            ("span", HashMap::from([("class", "item-total")]), Some(0)),
            (
                "input",
                HashMap::from([("type", "number"), ("data-item-id", "a\"1")]),
                Some(0),
            ),
            ("meta", HashMap::from([("name", "csrf-token")]), None),
        ])
    }

    fn matches(selector: &str, id: usize) -> bool {
        SelectorList::parse(selector)
            .map(|s| s.matches(&fixture(), id))
            .unwrap_or(false)
    }

    // === Compound ===

    #[test]
    fn test_class_compound() {
        assert!(matches(".cart-item-row.selected", 0));
        assert!(matches("div.selected", 0));
        assert!(!matches(".cart-item-row.missing", 0));
    }

    #[test]
    fn test_attr_conditions() {
        assert!(matches("meta[name=csrf-token]", 3));
        assert!(matches("input[type=\"number\"]", 2));
        assert!(matches("input[data-item-id=\"a\\\"1\"]", 2));
        assert!(matches("[data-item-id]", 2));
        assert!(!matches("input[type='text']", 2));
    }

    // === Combinators ===

    #[test]
    fn test_descendant_and_child() {
        assert!(matches(".cart-item-row .item-total", 1));
        assert!(matches(".cart-item-row > span", 1));
        assert!(!matches("meta .item-total", 1));
    }

    #[test]
    fn test_selector_list() {
        assert!(matches(".fade-in, .item-total", 1));
        assert!(matches(".fade-in,meta", 3));
    }

    // === Invalid ===

    #[test]
    fn test_invalid_selectors() {
        assert!(SelectorList::parse("").is_none());
        assert!(SelectorList::parse("> div").is_none());
        assert!(SelectorList::parse("div >").is_none());
        assert!(SelectorList::parse("input[type=").is_none());
        assert!(SelectorList::parse("a,,b").is_none());
    }
}
