//! Markup tree produced from the editor's serialized rich text.
//!
//! The parser here is deliberately forgiving: the markup comes from a
//! rich-text widget and from model output, neither of which is validated, so
//! every input yields a tree and malformed parts are repaired or dropped the
//! way a browser would.

use ecow::EcoString;
use log::trace;
use unscanny::Scanner;

/// The element vocabulary the composer understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `<p>`
    Paragraph,
    /// `<h1>`, `<h2>` or `<h3>`.
    Heading(u8),
    /// `<ul>`
    UnorderedList,
    /// `<ol>`
    OrderedList,
    /// `<li>`
    ListItem,
    /// `<strong>` or `<b>`
    Bold,
    /// `<em>` or `<i>`
    Italic,
    /// `<u>`
    Underline,
    /// Any other element, keeping its lower-cased name.
    Other(EcoString),
}

impl Tag {
    /// Resolves an element name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "p" => Tag::Paragraph,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "strong" | "b" => Tag::Bold,
            "em" | "i" => Tag::Italic,
            "u" => Tag::Underline,
            _ => Tag::Other(name.into()),
        }
    }

    /// The canonical element name.
    pub fn name(&self) -> &str {
        match self {
            Tag::Paragraph => "p",
            Tag::Heading(1) => "h1",
            Tag::Heading(2) => "h2",
            Tag::Heading(_) => "h3",
            Tag::UnorderedList => "ul",
            Tag::OrderedList => "ol",
            Tag::ListItem => "li",
            Tag::Bold => "strong",
            Tag::Italic => "em",
            Tag::Underline => "u",
            Tag::Other(name) => name,
        }
    }

    fn is_list(&self) -> bool {
        matches!(self, Tag::UnorderedList | Tag::OrderedList)
    }

    /// Elements that never have children.
    fn is_void(&self) -> bool {
        matches!(
            self,
            Tag::Other(name) if matches!(
                name.as_str(),
                "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input"
                    | "link" | "meta" | "param" | "source" | "track" | "wbr"
            )
        )
    }

    /// Elements whose body is taken verbatim up to the matching end tag.
    fn is_raw_text(&self) -> bool {
        matches!(
            self,
            Tag::Other(name) if matches!(name.as_str(), "script" | "style" | "textarea" | "title")
        )
    }

    /// Block starts that implicitly end an open paragraph.
    fn closes_paragraph(&self) -> bool {
        match self {
            Tag::Paragraph
            | Tag::Heading(_)
            | Tag::UnorderedList
            | Tag::OrderedList
            | Tag::ListItem => true,
            Tag::Other(name) => matches!(
                name.as_str(),
                "address"
                    | "article"
                    | "aside"
                    | "blockquote"
                    | "div"
                    | "dl"
                    | "fieldset"
                    | "figure"
                    | "footer"
                    | "form"
                    | "h4"
                    | "h5"
                    | "h6"
                    | "header"
                    | "hr"
                    | "main"
                    | "nav"
                    | "pre"
                    | "section"
                    | "table"
            ),
            _ => false,
        }
    }

    /// Containers that stop the search for an open paragraph or list item.
    fn is_scope_boundary(&self) -> bool {
        match self {
            Tag::UnorderedList | Tag::OrderedList | Tag::ListItem => true,
            Tag::Other(name) => matches!(
                name.as_str(),
                "blockquote" | "div" | "figure" | "section" | "article" | "table" | "td" | "th"
            ),
            _ => false,
        }
    }
}

/// An element with its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The element tag.
    pub tag: Tag,
    /// Child nodes in document order.
    pub children: Vec<MarkupNode>,
}

impl Element {
    /// Creates an element without children.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    /// Creates an element with the given children.
    pub fn with_children(tag: Tag, children: Vec<MarkupNode>) -> Self {
        Self { tag, children }
    }

    /// Concatenates the text of all descendants.
    pub fn text_content(&self) -> EcoString {
        let mut out = EcoString::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut EcoString) {
        for child in &self.children {
            match child {
                MarkupNode::Text(text) => out.push_str(text),
                MarkupNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// A text node, with character references already decoded.
    Text(EcoString),
    /// An element node.
    Element(Element),
}

impl MarkupNode {
    /// Creates a text node.
    pub fn text(text: impl Into<EcoString>) -> Self {
        MarkupNode::Text(text.into())
    }

    /// Creates an element node.
    pub fn element(tag: Tag, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(Element::with_children(tag, children))
    }

    /// The children of an element, or nothing for text.
    pub fn children(&self) -> &[MarkupNode] {
        match self {
            MarkupNode::Text(_) => &[],
            MarkupNode::Element(el) => &el.children,
        }
    }

    /// Concatenates the text of this node and all descendants.
    pub fn text_content(&self) -> EcoString {
        match self {
            MarkupNode::Text(text) => text.clone(),
            MarkupNode::Element(el) => el.text_content(),
        }
    }
}

/// The tag of the synthetic root returned by [`parse_fragment`].
pub const FRAGMENT_ROOT: &str = "#fragment";

/// Parses an HTML fragment into a tree rooted at a synthetic
/// [`FRAGMENT_ROOT`] element whose children are the fragment's top-level
/// nodes.
pub fn parse_fragment(input: &str) -> MarkupNode {
    let mut s = Scanner::new(input);
    let mut builder = TreeBuilder::new();

    while !s.done() {
        let text = s.eat_until('<');
        builder.text(text);
        if s.done() {
            break;
        }

        if s.eat_if("<!--") {
            s.eat_until("-->");
            s.eat_if("-->");
            continue;
        }

        if s.eat_if("</") {
            let name = s.eat_while(is_name_char);
            s.eat_until('>');
            s.eat_if('>');
            if !name.is_empty() {
                builder.close(&Tag::from_name(name));
            }
            continue;
        }

        s.eat();
        if s.eat_if('!') || s.eat_if('?') {
            s.eat_until('>');
            s.eat_if('>');
            continue;
        }

        let name = s.eat_while(is_name_char);
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // Not a tag after all, e.g. `a < b`.
            builder.text(&format!("<{name}"));
            continue;
        }

        let tag = Tag::from_name(name);
        let self_closing = skip_attributes(&mut s);
        if self_closing || tag.is_void() {
            builder.leaf(tag);
        } else if tag.is_raw_text() {
            let rest = s.after();
            let end = find_end_tag(rest, tag.name());
            s.jump(s.cursor() + end);
            let body = &rest[..end];
            builder.open(tag);
            builder.raw_text(body);
        } else {
            builder.open(tag);
        }
    }

    MarkupNode::Element(builder.finish())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')
}

/// Skips the attribute list of a start tag, including the closing `>`.
///
/// Returns whether the tag was written as `<name ... />`.
fn skip_attributes(s: &mut Scanner) -> bool {
    loop {
        s.eat_whitespace();
        if s.done() {
            return false;
        }
        if s.eat_if("/>") {
            return true;
        }
        if s.eat_if('>') {
            return false;
        }

        let name = s.eat_until(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'));
        if name.is_empty() {
            s.eat();
            continue;
        }

        s.eat_whitespace();
        if s.eat_if('=') {
            s.eat_whitespace();
            match s.peek() {
                Some(quote @ ('"' | '\'')) => {
                    s.eat();
                    s.eat_until(quote);
                    s.eat();
                }
                _ => {
                    s.eat_until(|c: char| c.is_whitespace() || c == '>');
                }
            }
        }
    }
}

/// Finds the byte offset of `</name` in `rest`, ignoring ASCII case.
fn find_end_tag(rest: &str, name: &str) -> usize {
    let needle = format!("</{name}");
    rest.to_ascii_lowercase().find(&needle).unwrap_or(rest.len())
}

/// Maximum number of open elements, the fragment root included.
///
/// Start tags past this depth are ignored and their content goes to the
/// deepest open element, so every walk over the tree stays shallow.
pub const MAX_DEPTH: usize = 512;

/// Stack of open elements; the bottom entry is the fragment root.
struct TreeBuilder {
    stack: Vec<Element>,
    /// Start tags ignored for exceeding [`MAX_DEPTH`], innermost last.
    ignored: Vec<Tag>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new(Tag::Other(FRAGMENT_ROOT.into()))],
            ignored: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut Element {
        // The root is never popped before `finish`.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let decoded = html_escape::decode_html_entities(text);
        self.push_text(&decoded);
    }

    fn raw_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.push_text(text);
        }
    }

    /// Appends to the trailing text node, if any, so adjacent text stays one
    /// node.
    fn push_text(&mut self, text: &str) {
        let children = &mut self.current().children;
        match children.last_mut() {
            Some(MarkupNode::Text(last)) => last.push_str(text),
            _ => children.push(MarkupNode::text(text)),
        }
    }

    fn leaf(&mut self, tag: Tag) {
        if tag.closes_paragraph() {
            self.close_open_paragraph();
        }
        self.current()
            .children
            .push(MarkupNode::Element(Element::new(tag)));
    }

    fn open(&mut self, tag: Tag) {
        if tag == Tag::ListItem {
            self.close_in_scope(&Tag::ListItem);
        }
        if tag.closes_paragraph() {
            self.close_open_paragraph();
        }
        if matches!(tag, Tag::Heading(_))
            && matches!(self.current().tag, Tag::Heading(_))
            && self.stack.len() > 1
        {
            trace!("markup: nested heading closes the open one");
            self.pop();
        }
        if self.stack.len() >= MAX_DEPTH {
            trace!("markup: ignoring <{}> past the depth limit", tag.name());
            self.ignored.push(tag);
            return;
        }
        self.stack.push(Element::new(tag));
    }

    fn close_open_paragraph(&mut self) {
        self.close_in_scope(&Tag::Paragraph);
    }

    /// Closes the nearest open `tag` unless a container boundary is hit
    /// first.
    fn close_in_scope(&mut self, tag: &Tag) {
        let mut found = None;
        for (idx, el) in self.stack.iter().enumerate().skip(1).rev() {
            if &el.tag == tag {
                found = Some(idx);
                break;
            }
            if el.tag.is_scope_boundary() || (tag == &Tag::ListItem && el.tag.is_list()) {
                break;
            }
        }
        if let Some(idx) = found {
            self.pop_to(idx);
        }
    }

    fn close(&mut self, tag: &Tag) {
        if let Some(idx) = self.ignored.iter().rposition(|ignored| ignored == tag) {
            self.ignored.truncate(idx);
            return;
        }
        let found = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, el)| &el.tag == tag)
            .map(|(idx, _)| idx);
        match found {
            Some(idx) => self.pop_to(idx),
            None => trace!("markup: ignoring stray end tag </{}>", tag.name()),
        }
    }

    /// Pops every element down to and including `idx`.
    fn pop_to(&mut self, idx: usize) {
        self.ignored.clear();
        while self.stack.len() > idx {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(el) = self.stack.pop() {
            self.current().children.push(MarkupNode::Element(el));
        }
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack.pop().unwrap_or_else(|| Element::new(Tag::Other(FRAGMENT_ROOT.into())))
    }
}
