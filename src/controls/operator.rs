use crate::model::Mutation;

use super::{RuleContext, SelectOption, SelectOptions, SelectView};

/// Chooses the operator of a rule.
pub trait OperatorSelector {
    fn render(&self, ctx: &RuleContext<'_>) -> SelectView;

    fn on_change(&self, ctx: &RuleContext<'_>, selection: Option<&str>) -> Option<Mutation>;
}

/// Flat select over the operators legal for the rule's field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOperatorSelector;

fn options(ctx: &RuleContext<'_>) -> Vec<SelectOption> {
    ctx.field()
        .map(|field| {
            ctx.catalog
                .operators_for(field)
                .iter()
                .map(|op| SelectOption::new(&op.name, &op.label))
                .collect()
        })
        .unwrap_or_default()
}

impl OperatorSelector for ListOperatorSelector {
    fn render(&self, ctx: &RuleContext<'_>) -> SelectView {
        SelectView {
            options: SelectOptions::Flat(options(ctx)),
            value: Some(ctx.rule.operator.clone()),
            searchable: false,
            allow_deselect: false,
        }
    }

    fn on_change(&self, ctx: &RuleContext<'_>, selection: Option<&str>) -> Option<Mutation> {
        let name = selection.filter(|s| !s.is_empty())?;
        if name == ctx.rule.operator || !options(ctx).iter().any(|o| o.value == name) {
            return None;
        }
        Some(Mutation::SetOperator {
            rule: ctx.rule.id(),
            operator: name.to_owned(),
        })
    }
}
