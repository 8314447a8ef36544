use crate::xml::arena::XmlDocument;
use crate::xml::node::XmlNodeData;
use indextree::NodeId;

/// Depth-first walk below `node` (the node itself included) that does not
/// enter, or yield, any node for which `prune` is true.
pub fn descendants_pruned<'a, F>(
    doc: &'a XmlDocument,
    node: NodeId,
    prune: F,
) -> impl Iterator<Item = NodeId> + 'a
where
    F: Fn(&XmlNodeData) -> bool + 'a,
{
    let mut stack = vec![node];
    std::iter::from_fn(move || {
        while let Some(current) = stack.pop() {
            let Some(data) = doc.get(current) else { continue };
            if prune(data) {
                continue;
            }
            let first_len = stack.len();
            stack.extend(doc.children(current));
            stack[first_len..].reverse();
            return Some(current);
        }
        None
    })
}
