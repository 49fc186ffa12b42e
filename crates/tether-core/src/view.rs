#![forbid(unsafe_code)]

//! View contract and an in-memory element tree.
//!
//! The binding engine only needs two things from a host view:
//!
//! - **Input**: enumerate elements, list each element's attributes as
//!   name/value pairs, and test whether an attribute exists.
//! - **Output**: set an element's text content, and get/set a named attribute
//!   (creating it when missing).
//!
//! [`ViewNode`] captures that contract. Handles are cheap clones and mutate
//! through `&self`, because change notifications hold element handles long
//! after the initial scan.
//!
//! [`Document`] and [`Element`] are the in-memory implementation used by
//! tests and by hosts without a native element tree. An element handle is an
//! `Rc<RefCell<..>>`; cloning it yields another handle to the same node.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The element contract consumed by the indexer and the applier.
pub trait ViewNode: Clone + 'static {
    /// All attributes as `(name, value)` pairs, in document order.
    fn attributes(&self) -> Vec<(String, String)>;

    /// Whether an attribute named `name` exists.
    fn has_attribute(&self, name: &str) -> bool;

    /// Value of the attribute named `name`.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Replace the element's textual content.
    fn set_text(&self, text: &str);

    /// Set the attribute named `name`, creating it when missing.
    fn set_attribute(&self, name: &str, value: &str);
}

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

/// Handle to an in-memory view element.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementData>>,
}

impl Element {
    /// Create a detached element with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementData {
                tag: tag.into(),
                ..ElementData::default()
            })),
        }
    }

    /// Builder: add or replace an attribute.
    #[must_use]
    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value): (String, String) = (name.into(), value.into());
        self.set_attribute(&name, &value);
        self
    }

    /// Builder: set the initial text content.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.inner.borrow_mut().text = text.into();
        self
    }

    /// Builder: append a child element.
    #[must_use]
    pub fn with_child(self, child: Element) -> Self {
        self.append_child(child);
        self
    }

    /// Append a child element.
    pub fn append_child(&self, child: Element) {
        self.inner.borrow_mut().children.push(child);
    }

    /// Tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    /// Current text content.
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// The `id` attribute, if any.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Remove an attribute. Returns the previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut data = self.inner.borrow_mut();
        let pos = data.attributes.iter().position(|(n, _)| n == name)?;
        Some(data.attributes.remove(pos).1)
    }

    /// Direct children.
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    /// All descendants in document (pre-)order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack: Vec<Element> = self.children().into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            stack.extend(el.children().into_iter().rev());
            out.push(el);
        }
        out
    }

    /// Whether two handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ViewNode for Element {
    fn attributes(&self) -> Vec<(String, String)> {
        self.inner.borrow().attributes.clone()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.inner
            .borrow()
            .attributes
            .iter()
            .any(|(n, _)| n == name)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_text(&self, text: &str) {
        let mut data = self.inner.borrow_mut();
        // Text replaces the element's body, children included.
        data.children.clear();
        data.text.clear();
        data.text.push_str(text);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut data = self.inner.borrow_mut();
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                v.clear();
                v.push_str(value);
            }
            None => data.attributes.push((name.to_owned(), value.to_owned())),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("text", &data.text)
            .field("children", &data.children.len())
            .finish()
    }
}

/// An in-memory document with a single body element.
#[derive(Clone, Debug)]
pub struct Document {
    body: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Element::new("body"),
        }
    }

    /// Create a document whose body holds `children`.
    #[must_use]
    pub fn with_body(children: impl IntoIterator<Item = Element>) -> Self {
        let doc = Self::new();
        for child in children {
            doc.body.append_child(child);
        }
        doc
    }

    /// The body element.
    #[must_use]
    pub fn body(&self) -> &Element {
        &self.body
    }

    /// All elements within the body, in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<Element> {
        self.body.descendants()
    }

    /// First element within the body whose `id` attribute equals `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        self.elements()
            .into_iter()
            .find(|el| el.id().as_deref() == Some(id))
    }
}
