use crate::model::Mutation;
use crate::types::{dedup, kind_of, OperatorKind, RuleValue};

use super::{RuleContext, SelectOption};

/// What the value editor shows for a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueView {
    /// The operator takes no value.
    Disabled,
    /// Free-text input.
    Text { value: String, invalid: bool },
    /// Multi-value picker for membership operators.
    MultiSelect {
        options: Vec<SelectOption>,
        selected: Vec<SelectOption>,
        invalid: bool,
        class: &'static str,
    },
}

/// Edits the value of a rule.
///
/// Free-text edits do not go through the editor: they are debounced by the
/// session and committed as [`Mutation::SetValue`] once typing pauses.
pub trait ValueEditor {
    fn render(&self, ctx: &RuleContext<'_>) -> ValueView;

    /// A new selection in the multi-value picker. Commits immediately.
    fn on_select(&self, ctx: &RuleContext<'_>, selected: &[String]) -> Option<Mutation>;
}

/// The standard value editor, switching widget by operator kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueWidget;

impl ValueWidget {
    /// Options for the multi-value picker: the field's declared values, then
    /// any current values outside that list, without repeats.
    #[must_use]
    pub fn membership_options(ctx: &RuleContext<'_>) -> Vec<SelectOption> {
        let mut options: Vec<SelectOption> = ctx
            .field()
            .map(|field| {
                field
                    .value_options
                    .iter()
                    .map(|v| SelectOption::new(&v.name, &v.label))
                    .collect()
            })
            .unwrap_or_default();
        for value in ctx.rule.value.as_list().unwrap_or_default() {
            if !options.iter().any(|o| &o.value == value) {
                options.push(SelectOption::new(value, value));
            }
        }
        let mut seen: Vec<String> = Vec::with_capacity(options.len());
        options.retain(|o| {
            if seen.contains(&o.value) {
                false
            } else {
                seen.push(o.value.clone());
                true
            }
        });
        options
    }
}

impl ValueEditor for ValueWidget {
    fn render(&self, ctx: &RuleContext<'_>) -> ValueView {
        let invalid = ctx.is_invalid();
        match kind_of(&ctx.rule.operator) {
            OperatorKind::NoOperand => ValueView::Disabled,
            OperatorKind::Scalar => {
                let value = ctx
                    .draft
                    .map(str::to_owned)
                    .or_else(|| ctx.rule.value.as_scalar().map(str::to_owned))
                    .unwrap_or_default();
                ValueView::Text { value, invalid }
            }
            OperatorKind::Membership => {
                let options = Self::membership_options(ctx);
                let selected = ctx
                    .rule
                    .value
                    .as_list()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|v| options.iter().find(|o| &o.value == v).cloned())
                    .collect();
                ValueView::MultiSelect {
                    options,
                    selected,
                    invalid,
                    class: ctx.scheme.multi_select_class(),
                }
            }
        }
    }

    fn on_select(&self, ctx: &RuleContext<'_>, selected: &[String]) -> Option<Mutation> {
        if kind_of(&ctx.rule.operator) != OperatorKind::Membership {
            return None;
        }
        Some(Mutation::SetValue {
            rule: ctx.rule.id(),
            value: RuleValue::List(dedup(selected.to_vec())),
        })
    }
}

/// Selection after the user toggles one entry of the picker.
#[must_use]
pub fn toggle(current: &[String], value: &str) -> Vec<String> {
    if current.iter().any(|v| v == value) {
        current.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut next = current.to_vec();
        next.push(value.to_owned());
        next
    }
}
