use std::fmt;

use super::operator::kind_of;
use super::value::RuleValue;

/// Session-scoped handle to a node of the rule tree.
///
/// Ids are assigned by the session when a node enters the tree. They identify
/// nodes for mutations and validation results but take no part in equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Boolean operator joining the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
        }
    }
}

/// A single `field operator value` condition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) id: NodeId,
    pub field: String,
    pub operator: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: RuleValue,
}

impl Rule {
    /// Create a rule. The value is coerced to the shape the operator expects.
    #[must_use]
    pub fn new(field: &str, operator: &str, value: impl Into<RuleValue>) -> Self {
        Self {
            id: NodeId::default(),
            field: field.to_owned(),
            operator: operator.to_owned(),
            value: value.into().coerce(kind_of(operator)),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.operator == other.operator && self.value == other.value
    }
}

/// A child of a group: either a rule or a nested group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Node {
    Group(RuleGroup),
    Rule(Rule),
}

impl Node {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Node::Rule(r) => r.id,
            Node::Group(g) => g.id,
        }
    }
}

impl From<Rule> for Node {
    fn from(r: Rule) -> Self {
        Node::Rule(r)
    }
}

impl From<RuleGroup> for Node {
    fn from(g: RuleGroup) -> Self {
        Node::Group(g)
    }
}

/// A combinator over an ordered list of rules and nested groups, optionally
/// negated.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleGroup {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) id: NodeId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub combinator: Combinator,
    #[cfg_attr(feature = "serde", serde(default))]
    pub not: bool,
    pub rules: Vec<Node>,
}

impl PartialEq for RuleGroup {
    fn eq(&self, other: &Self) -> bool {
        self.combinator == other.combinator && self.not == other.not && self.rules == other.rules
    }
}

impl RuleGroup {
    #[must_use]
    pub fn new(combinator: Combinator) -> Self {
        Self {
            combinator,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn and() -> Self {
        Self::new(Combinator::And)
    }

    #[must_use]
    pub fn or() -> Self {
        Self::new(Combinator::Or)
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.not = true;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(Node::Rule(rule));
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: RuleGroup) -> Self {
        self.rules.push(Node::Group(group));
        self
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Depth-first search for a node by id, including `self`.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        if self.id == id {
            return Some(NodeRef::Group(self));
        }
        for child in &self.rules {
            match child {
                Node::Rule(r) if r.id == id => return Some(NodeRef::Rule(r)),
                Node::Rule(_) => {}
                Node::Group(g) => {
                    if let Some(found) = g.find(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    #[must_use]
    pub fn rule(&self, id: NodeId) -> Option<&Rule> {
        match self.find(id)? {
            NodeRef::Rule(r) => Some(r),
            NodeRef::Group(_) => None,
        }
    }

    #[must_use]
    pub fn group(&self, id: NodeId) -> Option<&RuleGroup> {
        match self.find(id)? {
            NodeRef::Group(g) => Some(g),
            NodeRef::Rule(_) => None,
        }
    }

    pub(crate) fn rule_mut(&mut self, id: NodeId) -> Option<&mut Rule> {
        for child in &mut self.rules {
            match child {
                Node::Rule(r) if r.id == id => return Some(r),
                Node::Rule(_) => {}
                Node::Group(g) => {
                    if let Some(found) = g.rule_mut(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub(crate) fn group_mut(&mut self, id: NodeId) -> Option<&mut RuleGroup> {
        if self.id == id {
            return Some(self);
        }
        for child in &mut self.rules {
            if let Node::Group(g) = child {
                if let Some(found) = g.group_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Detach the node with `id` from whichever group holds it.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        if let Some(pos) = self.rules.iter().position(|n| n.id() == id) {
            return Some(self.rules.remove(pos));
        }
        self.rules.iter_mut().find_map(|child| match child {
            Node::Group(g) => g.remove(id),
            Node::Rule(_) => None,
        })
    }

    /// Every rule in the tree, depth-first.
    #[must_use]
    pub fn rules_iter(&self) -> Vec<&Rule> {
        let mut out = Vec::new();
        collect_rules(self, &mut out);
        out
    }

    /// Number of nodes in the tree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .rules
            .iter()
            .map(|n| match n {
                Node::Rule(_) => 1,
                Node::Group(g) => g.node_count(),
            })
            .sum::<usize>()
    }
}

fn collect_rules<'a>(group: &'a RuleGroup, out: &mut Vec<&'a Rule>) {
    for child in &group.rules {
        match child {
            Node::Rule(r) => out.push(r),
            Node::Group(g) => collect_rules(g, out),
        }
    }
}

/// Borrowed view of a node found by id.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Rule(&'a Rule),
    Group(&'a RuleGroup),
}
