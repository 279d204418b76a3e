//! Property path tokenizer.
//!
//! Splits compound property expressions such as `orders[0].items[2].sku` into their head
//! segment and the remaining path. The first `.` ends the head; within the head, `[` starts
//! an index that runs up to the closing `]`. There is no escaping.
//!
//! # Examples
//!
//! ```rust
//! use propscope::reflection::PropertyTokenizer;
//!
//! let path = PropertyTokenizer::new("orders[0].items[2].sku");
//! assert_eq!(path.name(), "orders");
//! assert_eq!(path.index(), Some("0"));
//! assert_eq!(path.indexed_name(), "orders[0]");
//! assert_eq!(path.children(), Some("items[2].sku"));
//!
//! let names: Vec<&str> = path.segments().map(|segment| segment.name()).collect();
//! assert_eq!(names, ["orders", "items", "sku"]);
//! ```

/// The head segment of a property path, borrowing from the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyTokenizer<'a> {
    name: &'a str,
    indexed_name: &'a str,
    index: Option<&'a str>,
    children: Option<&'a str>,
}

impl<'a> PropertyTokenizer<'a> {
    /// Tokenize the head of `fullname`
    ///
    /// ## Arguments
    /// * 'fullname' - A property path like `a.b[1].c`
    pub fn new(fullname: &'a str) -> Self {
        let (head, children) = match fullname.split_once('.') {
            Some((head, children)) => (head, Some(children)),
            None => (fullname, None),
        };

        let (name, index) = match head.split_once('[') {
            Some((name, rest)) => {
                let index = rest.rfind(']').map_or(rest, |end| &rest[..end]);
                (name, Some(index))
            }
            None => (head, None),
        };

        PropertyTokenizer {
            name,
            indexed_name: head,
            index,
            children,
        }
    }

    /// Name of the head segment without index
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Index of the head segment, the text between the first `[` and the last `]`
    pub fn index(&self) -> Option<&'a str> {
        self.index
    }

    /// The head segment including its index, e.g. `a[1]`
    pub fn indexed_name(&self) -> &'a str {
        self.indexed_name
    }

    /// Everything after the first `.`
    pub fn children(&self) -> Option<&'a str> {
        self.children
    }

    /// Whether further segments follow the head
    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// The tokenizer of the remaining path
    pub fn next_segment(&self) -> Option<PropertyTokenizer<'a>> {
        self.children.map(PropertyTokenizer::new)
    }

    /// All segments, starting with this one. Can be called any number of times.
    pub fn segments(&self) -> Segments<'a> {
        Segments {
            current: Some(*self),
        }
    }
}

/// Iterator over the segments of a property path, see [`PropertyTokenizer::segments`]
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    current: Option<PropertyTokenizer<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = PropertyTokenizer<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        self.current = current.next_segment();
        Some(current)
    }
}

impl<'a> IntoIterator for PropertyTokenizer<'a> {
    type Item = PropertyTokenizer<'a>;
    type IntoIter = Segments<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments()
    }
}
