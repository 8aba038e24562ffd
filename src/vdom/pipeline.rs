//! Transform trait and the pipeline that chains transforms over a document.
//!
//! ```ignore
//! let doc = Pipeline::new(doc)
//!     .pipe(TwitterCardTransform)
//!     .pipe(GithubCardTransform)
//!     .inspect_if(verbose, |doc| dump(doc))
//!     .pipe(ImageCaptionTransform)
//!     .into_inner();
//! ```

use super::Document;

/// A whole-document rewrite pass.
pub trait Transform {
    fn transform(self, doc: Document) -> Document;
}

/// Owns a document while transforms run over it.
pub struct Pipeline {
    doc: Document,
}

impl Pipeline {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    #[must_use]
    pub fn pipe<T: Transform>(self, transform: T) -> Self {
        Self {
            doc: transform.transform(self.doc),
        }
    }

    /// Run `f` against the current state when `cond` holds.
    #[must_use]
    pub fn inspect_if(self, cond: bool, f: impl FnOnce(&Document)) -> Self {
        if cond {
            f(&self.doc);
        }
        self
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::{Element, Node, PageSeed};

    struct Append(&'static str);

    impl Transform for Append {
        fn transform(self, mut doc: Document) -> Document {
            doc.root.children.push(Node::text(self.0));
            doc
        }
    }

    #[test]
    fn test_pipe_runs_in_order() {
        let doc = Document::new(Element::new("article"), PageSeed::default());
        let mut seen = 0;
        let doc = Pipeline::new(doc)
            .pipe(Append("a"))
            .inspect_if(true, |doc| seen = doc.root.children.len())
            .pipe(Append("b"))
            .inspect_if(false, |_| unreachable!())
            .into_inner();
        assert_eq!(seen, 1);
        assert_eq!(doc.root.text_content(), "ab");
    }
}
