//! Atomic document edits

use super::mapping::StepMap;
use super::TransformError;
use crate::models::{Attrs, Node};
use serde::{Deserialize, Serialize};

/// A single edit to the document tree
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "stepType", rename_all = "camelCase")]
pub enum Step {
    /// Replace the sibling nodes between `from` and `to` with `nodes`.
    /// Insertion when `from == to`, deletion when `nodes` is empty.
    Replace {
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },

    /// Replace the attribute bag of the node starting at `pos`
    SetAttrs { pos: usize, attrs: Attrs },
}

impl Step {
    /// Apply this step to the root node in place.
    ///
    /// On error the tree is left untouched.
    pub fn apply(&self, root: &mut Node) -> Result<(), TransformError> {
        match self {
            Step::Replace { from, to, nodes } => {
                let (from, to) = (*from, *to);
                if from > to || to > root.content_size() {
                    return Err(TransformError::OutOfRange(from.max(to)));
                }
                if nodes.iter().any(|n| n.kind == crate::models::NodeKind::Doc) {
                    return Err(TransformError::InvalidContent(
                        "doc node cannot be nested".to_string(),
                    ));
                }
                if replace_range(root, from, to, nodes.clone()) {
                    Ok(())
                } else {
                    Err(TransformError::UnalignedReplace { from, to })
                }
            }
            Step::SetAttrs { pos, attrs } => {
                let node = root
                    .node_at_mut(*pos)
                    .ok_or(TransformError::NoNodeAt(*pos))?;
                if node.is_text() {
                    return Err(TransformError::InvalidContent(format!(
                        "text node at {} has no attributes",
                        pos
                    )));
                }
                node.attrs = attrs.clone();
                Ok(())
            }
        }
    }

    /// Position map describing how this step shifts positions
    pub fn get_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, nodes } => {
                let new_size = nodes.iter().map(Node::node_size).sum();
                StepMap::new(*from, to - from, new_size)
            }
            Step::SetAttrs { .. } => StepMap::empty(),
        }
    }
}

/// Splice `nodes` between sibling boundaries `from` and `to`, both relative
/// to `node`'s content start. Returns false when the range does not start
/// and end on boundaries of the same parent.
fn replace_range(node: &mut Node, from: usize, to: usize, nodes: Vec<Node>) -> bool {
    let mut offset = 0;
    let mut from_index = node.content.len();
    for i in 0..node.content.len() {
        if from == offset {
            from_index = i;
            break;
        }
        let end = offset + node.content[i].node_size();
        if from < end {
            // `from` lies inside child i; the whole range must stay inside it
            let child = &mut node.content[i];
            if child.is_text() || to >= end {
                return false;
            }
            return replace_range(child, from - offset - 1, to - offset - 1, nodes);
        }
        offset = end;
    }
    if from_index == node.content.len() && from != offset {
        return false;
    }

    let mut end = from;
    let mut to_index = from_index;
    while end < to {
        match node.content.get(to_index) {
            Some(child) => end += child.node_size(),
            None => return false,
        }
        to_index += 1;
    }
    if end != to {
        return false;
    }

    node.content.splice(from_index..to_index, nodes);
    true
}
