use crate::model::Mutation;
use crate::types::NodeId;

/// View model of a node action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionView {
    pub label: &'static str,
    pub node: NodeId,
}

/// Removes a node from the tree.
pub trait RemoveAction {
    fn render(&self, node: NodeId) -> ActionView;

    fn on_click(&self, node: NodeId) -> Mutation {
        Mutation::Remove { id: node }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveRuleButton;

impl RemoveAction for RemoveRuleButton {
    fn render(&self, node: NodeId) -> ActionView {
        ActionView {
            label: "Remove rule",
            node,
        }
    }
}
