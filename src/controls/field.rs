use crate::model::Mutation;

use super::{OptionGroup, RuleContext, SelectOption, SelectOptions, SelectView};

/// Chooses the field a rule filters on.
pub trait FieldSelector {
    fn render(&self, ctx: &RuleContext<'_>) -> SelectView;

    /// Translate a selection into a mutation. `None` means the selection is
    /// ignored.
    fn on_change(&self, ctx: &RuleContext<'_>, selection: Option<&str>) -> Option<Mutation>;
}

/// Searchable select listing the catalog's fields grouped by category.
///
/// Groups are ordered by their position in `group_order`; groups it does not
/// name come last, in order of first appearance in the catalog.
#[derive(Debug, Clone, Default)]
pub struct GroupedFieldSelector {
    group_order: Vec<String>,
}

impl GroupedFieldSelector {
    #[must_use]
    pub fn new(group_order: Vec<String>) -> Self {
        Self { group_order }
    }

    fn rank(&self, group: &str) -> usize {
        self.group_order
            .iter()
            .position(|g| g == group)
            .unwrap_or(self.group_order.len())
    }

    /// The catalog's fields grouped and ordered for display.
    #[must_use]
    pub fn grouped_options(&self, ctx: &RuleContext<'_>) -> Vec<OptionGroup> {
        let mut groups: Vec<OptionGroup> = Vec::new();
        for field in ctx.catalog.iter() {
            let option = SelectOption::new(&field.name, &field.label);
            match groups.iter_mut().find(|g| g.group == field.group) {
                Some(g) => g.items.push(option),
                None => groups.push(OptionGroup {
                    group: field.group.clone(),
                    items: vec![option],
                }),
            }
        }
        groups.sort_by_key(|g| self.rank(&g.group));
        groups
    }
}

impl FieldSelector for GroupedFieldSelector {
    fn render(&self, ctx: &RuleContext<'_>) -> SelectView {
        SelectView {
            options: SelectOptions::Grouped(self.grouped_options(ctx)),
            value: Some(ctx.rule.field.clone()),
            searchable: true,
            allow_deselect: false,
        }
    }

    fn on_change(&self, ctx: &RuleContext<'_>, selection: Option<&str>) -> Option<Mutation> {
        let name = selection.filter(|s| !s.is_empty())?;
        if name == ctx.rule.field {
            return None;
        }
        let field = ctx.catalog.get(name)?;
        Some(Mutation::SetField {
            rule: ctx.rule.id(),
            field: field.name.clone(),
        })
    }
}
