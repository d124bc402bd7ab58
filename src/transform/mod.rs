//! Mutation builder
//!
//! A `Transaction` queues edits against a working copy of a document. Each
//! queued step is applied to the working copy right away, so later lookups
//! see its effect, and its position map is recorded so positions computed
//! against the original document can be mapped forward. The command layer
//! swaps the working copy in once the whole command has succeeded.
//!
//! ## Modules
//!
//! - `mapping`: Position maps for steps and step sequences
//! - `step`: The replace and set-attributes edits

pub mod mapping;
pub mod step;

pub use mapping::{MapRange, Mapping, StepMap};
pub use step::Step;

use crate::models::{Attrs, Document, Node, Selection};
use serde_json::Value;
use thiserror::Error;

/// Failures while applying a step
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("position {0} is outside the document")]
    OutOfRange(usize),

    #[error("no node starts at position {0}")]
    NoNodeAt(usize),

    #[error("range {from}..{to} does not start and end on sibling boundaries")]
    UnalignedReplace { from: usize, to: usize },

    #[error("invalid content: {0}")]
    InvalidContent(String),
}

/// Ordered queue of edits plus the document they produce
#[derive(Clone, Debug)]
pub struct Transaction {
    doc: Document,
    steps: Vec<Step>,
    mapping: Mapping,
    selection: Option<Selection>,
}

impl Transaction {
    /// Start a transaction on a copy of `doc`
    pub fn new(doc: &Document) -> Self {
        Self {
            doc: doc.clone(),
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
        }
    }

    /// The document with every queued step applied
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Selection requested by the command that built this transaction
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    /// Apply `step` to the working copy and queue it
    pub fn step(&mut self, step: Step) -> Result<&mut Self, TransformError> {
        step.apply(self.doc.root_mut())?;
        self.mapping.push(step.get_map());
        self.steps.push(step);
        Ok(self)
    }

    pub fn insert(&mut self, pos: usize, node: Node) -> Result<&mut Self, TransformError> {
        self.insert_all(pos, vec![node])
    }

    pub fn insert_all(
        &mut self,
        pos: usize,
        nodes: Vec<Node>,
    ) -> Result<&mut Self, TransformError> {
        self.replace_with(pos, pos, nodes)
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, TransformError> {
        self.replace_with(from, to, Vec::new())
    }

    pub fn replace_with(
        &mut self,
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    ) -> Result<&mut Self, TransformError> {
        self.step(Step::Replace { from, to, nodes })
    }

    /// Replace the attribute bag of the node at `pos`
    pub fn set_node_attrs(
        &mut self,
        pos: usize,
        attrs: Attrs,
    ) -> Result<&mut Self, TransformError> {
        self.step(Step::SetAttrs { pos, attrs })
    }

    /// Set a single attribute on the node at `pos`, keeping the others
    pub fn set_node_attr(
        &mut self,
        pos: usize,
        key: &str,
        value: Value,
    ) -> Result<&mut Self, TransformError> {
        let mut attrs = self
            .doc
            .node_at(pos)
            .ok_or(TransformError::NoNodeAt(pos))?
            .attrs
            .clone();
        attrs.insert(key.to_string(), value);
        self.set_node_attrs(pos, attrs)
    }

    pub fn into_doc(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{cell, doc, paragraph, row, table};
    use crate::models::attr;

    #[test]
    fn test_chained_steps_and_mapping() {
        let original = Document::new(doc(vec![
            paragraph("x"),
            table(vec![row(vec![cell("a")])]),
        ]));
        // table at 3, cell at 5
        let mut tr = Transaction::new(&original);
        tr.insert(0, paragraph("new")).unwrap();

        let cell_pos = tr.mapping().map(5);
        assert_eq!(cell_pos, 10);
        tr.set_node_attr(cell_pos, attr::BORDER, Value::from("1px solid"))
            .unwrap();

        assert_eq!(tr.steps().len(), 2);
        assert_eq!(
            tr.doc().node_at(10).and_then(|n| n.attr_str(attr::BORDER)),
            Some("1px solid")
        );
        // original untouched
        assert_eq!(original.node_at(5).and_then(|n| n.attr_str(attr::BORDER)), None);
    }

    #[test]
    fn test_failed_step_is_not_queued() {
        let original = Document::new(doc(vec![paragraph("abc")]));
        let mut tr = Transaction::new(&original);
        assert!(tr.delete(1, 3).is_err());
        assert!(!tr.doc_changed());
        assert_eq!(tr.doc(), &original);
    }
}
