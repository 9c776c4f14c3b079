//! Per-rule editing controls.
//!
//! A rule is edited through four roles: field selector, operator selector,
//! value editor and remove action. Each role is a trait; [`ControlElements`]
//! bundles one implementation of each and is what the session invokes when it
//! renders a rule. Controls are headless: they produce view models and turn
//! user intents into [`Mutation`]s, and never touch the tree themselves.

mod field;
mod operator;
mod remove;
mod value;

use std::fmt;

pub use field::{FieldSelector, GroupedFieldSelector};
pub use operator::{ListOperatorSelector, OperatorSelector};
pub use remove::{ActionView, RemoveAction, RemoveRuleButton};
pub use value::{toggle, ValueEditor, ValueView, ValueWidget};

use crate::model::Mutation;
use crate::types::{Field, FieldCatalog, NodeId, Rule, ValidationResult};

/// Color scheme of the embedding application, passed in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Style class for the multi-value picker under this scheme.
    #[must_use]
    pub fn multi_select_class(self) -> &'static str {
        match self {
            ColorScheme::Light => "multi-select",
            ColorScheme::Dark => "multi-select-dark",
        }
    }
}

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_owned(),
            label: label.to_owned(),
        }
    }
}

/// A titled block of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub group: String,
    pub items: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOptions {
    Flat(Vec<SelectOption>),
    Grouped(Vec<OptionGroup>),
}

impl SelectOptions {
    /// All options in display order, ignoring grouping.
    #[must_use]
    pub fn flatten(&self) -> Vec<&SelectOption> {
        match self {
            SelectOptions::Flat(items) => items.iter().collect(),
            SelectOptions::Grouped(groups) => groups.iter().flat_map(|g| g.items.iter()).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.flatten().iter().any(|o| o.value == value)
    }
}

/// View model of a single-choice select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectView {
    pub options: SelectOptions,
    pub value: Option<String>,
    pub searchable: bool,
    pub allow_deselect: bool,
}

/// Everything a control needs to know about the rule it edits.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub rule: &'a Rule,
    pub catalog: &'a FieldCatalog,
    pub validation: Option<&'a ValidationResult>,
    /// Uncommitted text typed into the value editor, if any.
    pub draft: Option<&'a str>,
    pub scheme: ColorScheme,
}

impl<'a> RuleContext<'a> {
    #[must_use]
    pub fn field(&self) -> Option<&'a Field> {
        self.catalog.get(&self.rule.field)
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.validation.is_some_and(|v| !v.is_valid())
    }
}

/// The rendered controls of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleView {
    pub id: NodeId,
    pub field: SelectView,
    pub operator: SelectView,
    pub value: ValueView,
    pub remove: ActionView,
    pub invalid: bool,
}

/// The set of controls used to render and edit rules.
pub struct ControlElements {
    pub field_selector: Box<dyn FieldSelector>,
    pub operator_selector: Box<dyn OperatorSelector>,
    pub value_editor: Box<dyn ValueEditor>,
    pub remove_action: Box<dyn RemoveAction>,
}

impl Default for ControlElements {
    fn default() -> Self {
        Self::with_group_order(Vec::new())
    }
}

impl fmt::Debug for ControlElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlElements").finish_non_exhaustive()
    }
}

impl ControlElements {
    /// The standard controls, with field groups ranked by `group_order`.
    #[must_use]
    pub fn with_group_order(group_order: Vec<String>) -> Self {
        Self {
            field_selector: Box::new(GroupedFieldSelector::new(group_order)),
            operator_selector: Box::new(ListOperatorSelector),
            value_editor: Box::new(ValueWidget),
            remove_action: Box::new(RemoveRuleButton),
        }
    }

    #[must_use]
    pub fn render_rule(&self, ctx: &RuleContext<'_>) -> RuleView {
        RuleView {
            id: ctx.rule.id(),
            field: self.field_selector.render(ctx),
            operator: self.operator_selector.render(ctx),
            value: self.value_editor.render(ctx),
            remove: self.remove_action.render(ctx.rule.id()),
            invalid: ctx.is_invalid(),
        }
    }

    /// Route a field selection through the field selector.
    #[must_use]
    pub fn select_field(&self, ctx: &RuleContext<'_>, selection: Option<&str>) -> Option<Mutation> {
        self.field_selector.on_change(ctx, selection)
    }

    #[must_use]
    pub fn select_operator(
        &self,
        ctx: &RuleContext<'_>,
        selection: Option<&str>,
    ) -> Option<Mutation> {
        self.operator_selector.on_change(ctx, selection)
    }

    #[must_use]
    pub fn select_values(&self, ctx: &RuleContext<'_>, selected: &[String]) -> Option<Mutation> {
        self.value_editor.on_select(ctx, selected)
    }

    #[must_use]
    pub fn remove(&self, id: NodeId) -> Mutation {
        self.remove_action.on_click(id)
    }
}
