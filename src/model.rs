use tracing::debug;

use crate::types::{
    kind_of, Combinator, FieldCatalog, Node, NodeId, NodeRef, Rule, RuleGroup, RuleValue,
    TreeError,
};

/// A single change to the rule tree.
///
/// Editors translate user intents into mutations; the session applies them
/// one at a time and notifies its listener once per applied mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddRule { parent: NodeId },
    AddGroup { parent: NodeId },
    /// Append an existing group, e.g. one parsed from pasted text. Its nodes
    /// are renumbered on insertion.
    InsertGroup { parent: NodeId, group: RuleGroup },
    Remove { id: NodeId },
    SetField { rule: NodeId, field: String },
    SetOperator { rule: NodeId, operator: String },
    SetValue { rule: NodeId, value: RuleValue },
    SetCombinator { group: NodeId, combinator: Combinator },
    SetNot { group: NodeId, not: bool },
}

impl Mutation {
    /// The rule whose meaning this mutation changes, if any. A pending text
    /// commit for that rule is no longer applicable afterwards.
    #[must_use]
    pub fn retargets(&self) -> Option<NodeId> {
        match self {
            Mutation::SetField { rule, .. } | Mutation::SetOperator { rule, .. } => Some(*rule),
            Mutation::Remove { id } => Some(*id),
            _ => None,
        }
    }
}

/// The rule tree together with the id allocator for its nodes.
#[derive(Debug, Clone)]
pub struct QueryTree {
    root: RuleGroup,
    next_id: u64,
}

impl Default for QueryTree {
    fn default() -> Self {
        Self::new(RuleGroup::and())
    }
}

impl QueryTree {
    /// Take ownership of `root`, assigning fresh ids to every node.
    #[must_use]
    pub fn new(root: RuleGroup) -> Self {
        let mut tree = Self {
            root: RuleGroup::and(),
            next_id: 0,
        };
        tree.replace(root);
        tree
    }

    #[must_use]
    pub fn root(&self) -> &RuleGroup {
        &self.root
    }

    /// Install a new root, renumbering all of its nodes and coercing every
    /// rule value to the shape its operator expects.
    pub fn replace(&mut self, mut root: RuleGroup) {
        self.number_group(&mut root);
        self.root = root;
    }

    fn fresh_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn number_group(&mut self, group: &mut RuleGroup) {
        group.id = self.fresh_id();
        for child in &mut group.rules {
            match child {
                Node::Rule(r) => {
                    r.id = self.fresh_id();
                    r.value = std::mem::take(&mut r.value).coerce(kind_of(&r.operator));
                }
                Node::Group(g) => self.number_group(g),
            }
        }
    }

    /// Apply one mutation. Returns the id of the created node for additions.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] when the mutation addresses a missing node, the
    /// wrong kind of node, or a field/operator the catalog does not allow. The
    /// tree is unchanged on error.
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        catalog: &FieldCatalog,
        default_field: Option<&str>,
    ) -> Result<Option<NodeId>, TreeError> {
        debug!(?mutation, "applying mutation");
        match mutation {
            Mutation::AddRule { parent } => {
                self.require_group(*parent)?;
                let mut rule = new_rule(catalog, default_field)?;
                rule.id = self.fresh_id();
                let id = rule.id;
                self.group_mut(*parent)?.rules.push(Node::Rule(rule));
                Ok(Some(id))
            }
            Mutation::AddGroup { parent } => {
                self.require_group(*parent)?;
                let mut group = RuleGroup::and();
                group.id = self.fresh_id();
                let id = group.id;
                self.group_mut(*parent)?.rules.push(Node::Group(group));
                Ok(Some(id))
            }
            Mutation::InsertGroup { parent, group } => {
                self.require_group(*parent)?;
                let mut group = group.clone();
                self.number_group(&mut group);
                let id = group.id;
                self.group_mut(*parent)?.rules.push(Node::Group(group));
                Ok(Some(id))
            }
            Mutation::Remove { id } => {
                if *id == self.root.id {
                    return Err(TreeError::CannotRemoveRoot);
                }
                self.root
                    .remove(*id)
                    .map(|_| None)
                    .ok_or(TreeError::UnknownNode { id: *id })
            }
            Mutation::SetField { rule, field } => {
                let target = catalog.get(field).ok_or_else(|| TreeError::UnknownField {
                    field: field.clone(),
                })?;
                let operator = catalog
                    .default_operator(target)
                    .map(|op| op.name.clone())
                    .unwrap_or_default();
                let r = self.rule_mut(*rule)?;
                r.field = target.name.clone();
                r.value = RuleValue::empty_for(kind_of(&operator));
                r.operator = operator;
                Ok(None)
            }
            Mutation::SetOperator { rule, operator } => {
                let current = self.rule_mut(*rule)?;
                let field =
                    catalog
                        .get(&current.field)
                        .ok_or_else(|| TreeError::UnknownField {
                            field: current.field.clone(),
                        })?;
                if !catalog.is_legal(field, operator) {
                    return Err(TreeError::UnsupportedOperator {
                        field: field.name.clone(),
                        operator: operator.clone(),
                    });
                }
                let value = std::mem::take(&mut current.value);
                current.value = value.coerce(kind_of(operator));
                current.operator = operator.clone();
                Ok(None)
            }
            Mutation::SetValue { rule, value } => {
                let r = self.rule_mut(*rule)?;
                r.value = value.clone().coerce(kind_of(&r.operator));
                Ok(None)
            }
            Mutation::SetCombinator { group, combinator } => {
                self.group_mut(*group)?.combinator = *combinator;
                Ok(None)
            }
            Mutation::SetNot { group, not } => {
                self.group_mut(*group)?.not = *not;
                Ok(None)
            }
        }
    }

    fn require_group(&self, id: NodeId) -> Result<(), TreeError> {
        match self.root.find(id) {
            Some(NodeRef::Group(_)) => Ok(()),
            Some(NodeRef::Rule(_)) => Err(TreeError::NotAGroup { id }),
            None => Err(TreeError::UnknownNode { id }),
        }
    }

    fn group_mut(&mut self, id: NodeId) -> Result<&mut RuleGroup, TreeError> {
        if self.root.find(id).is_none() {
            return Err(TreeError::UnknownNode { id });
        }
        self.root.group_mut(id).ok_or(TreeError::NotAGroup { id })
    }

    fn rule_mut(&mut self, id: NodeId) -> Result<&mut Rule, TreeError> {
        if self.root.find(id).is_none() {
            return Err(TreeError::UnknownNode { id });
        }
        self.root.rule_mut(id).ok_or(TreeError::NotARule { id })
    }
}

/// A rule for the configured default field, or the first catalog field when
/// no default is configured or it is unknown.
fn new_rule(catalog: &FieldCatalog, default_field: Option<&str>) -> Result<Rule, TreeError> {
    let field = default_field
        .and_then(|name| catalog.get(name))
        .or_else(|| catalog.first())
        .ok_or(TreeError::NoFields)?;
    let operator = catalog
        .default_operator(field)
        .map(|op| op.name.as_str())
        .unwrap_or_default();
    Ok(Rule::new(
        &field.name,
        operator,
        RuleValue::empty_for(kind_of(operator)),
    ))
}
