use std::collections::HashSet;

use crate::types::{
    kind_of, FieldCatalog, Node, OperatorKind, Rule, RuleGroup, RuleValue, Validation,
    ValidationReason, ValidationResult,
};

/// Validate every rule of `tree` against the field catalog.
///
/// Rules on fields named in `exempt` are always valid. The walk is
/// depth-first and the whole tree is validated on every call.
#[must_use]
pub fn validate(tree: &RuleGroup, catalog: &FieldCatalog, exempt: &HashSet<String>) -> Validation {
    let mut out = Validation::default();
    walk(tree, catalog, exempt, &mut out);
    out
}

fn walk(group: &RuleGroup, catalog: &FieldCatalog, exempt: &HashSet<String>, out: &mut Validation) {
    for child in &group.rules {
        match child {
            Node::Rule(rule) => out.insert(rule.id(), validate_rule(rule, catalog, exempt)),
            Node::Group(g) => walk(g, catalog, exempt, out),
        }
    }
}

/// Validate a single rule.
#[must_use]
pub fn validate_rule(
    rule: &Rule,
    catalog: &FieldCatalog,
    exempt: &HashSet<String>,
) -> ValidationResult {
    if exempt.contains(&rule.field) {
        return ValidationResult::valid();
    }
    let Some(field) = catalog.get(&rule.field) else {
        return ValidationResult::invalid(ValidationReason::UnknownField {
            field: rule.field.clone(),
        });
    };
    if !catalog.is_legal(field, &rule.operator) {
        return ValidationResult::invalid(ValidationReason::UnsupportedOperator {
            field: rule.field.clone(),
            operator: rule.operator.clone(),
        });
    }
    match (kind_of(&rule.operator), &rule.value) {
        (OperatorKind::NoOperand, _) => ValidationResult::valid(),
        (OperatorKind::Membership, RuleValue::List(items)) if items.is_empty() => {
            ValidationResult::invalid(ValidationReason::EmptySelection)
        }
        (OperatorKind::Membership, RuleValue::List(_)) => ValidationResult::valid(),
        (OperatorKind::Membership, RuleValue::Scalar(_)) => {
            ValidationResult::invalid(ValidationReason::ShapeMismatch {
                operator: rule.operator.clone(),
                expected: "a list of values",
            })
        }
        (OperatorKind::Scalar, RuleValue::Scalar(s)) if s.is_empty() && !field.allow_empty_value => {
            ValidationResult::invalid(ValidationReason::EmptyValue)
        }
        (OperatorKind::Scalar, RuleValue::Scalar(_)) => ValidationResult::valid(),
        (OperatorKind::Scalar, RuleValue::List(_)) => {
            ValidationResult::invalid(ValidationReason::ShapeMismatch {
                operator: rule.operator.clone(),
                expected: "a single value",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QueryTree;
    use crate::types::{Field, Operator};

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            Field::new("cos_provider", "Provider", "billing"),
            Field::new("note", "Note", "tags").allow_empty(),
            Field::new("region", "Region", "usage").with_operators([Operator::new("=", "=")]),
        ])
    }

    fn check(rule: Rule) -> ValidationResult {
        validate_rule(&rule, &catalog(), &HashSet::new())
    }

    #[test]
    fn unknown_field() {
        let r = check(Rule::new("nope", "=", "x"));
        assert!(!r.is_valid());
        assert_eq!(
            r.reasons(),
            &[ValidationReason::UnknownField {
                field: "nope".into()
            }]
        );
    }

    #[test]
    fn unsupported_operator() {
        let r = check(Rule::new("region", "contains", "x"));
        assert!(matches!(
            r.reasons(),
            [ValidationReason::UnsupportedOperator { operator, .. }] if operator == "contains"
        ));
    }

    #[test]
    fn no_operand_always_valid() {
        assert!(check(Rule::new("cos_provider", "null", "")).is_valid());
        assert!(check(Rule::new("cos_provider", "notNull", "")).is_valid());
    }

    #[test]
    fn membership_requires_selection() {
        let r = check(Rule::new("cos_provider", "in", RuleValue::List(Vec::new())));
        assert_eq!(r.reasons(), &[ValidationReason::EmptySelection]);
        assert!(check(Rule::new("cos_provider", "notIn", ["aws"])).is_valid());
    }

    #[test]
    fn shape_mismatch_is_invalid() {
        let mut rule = Rule::new("cos_provider", "in", ["aws"]);
        rule.value = RuleValue::from("aws");
        assert!(matches!(
            check(rule).reasons(),
            [ValidationReason::ShapeMismatch { .. }]
        ));

        let mut rule = Rule::new("cos_provider", "=", "aws");
        rule.value = RuleValue::from(["aws"]);
        assert!(!check(rule).is_valid());
    }

    #[test]
    fn scalar_requires_text_unless_field_allows_empty() {
        assert_eq!(
            check(Rule::new("cos_provider", "=", "")).reasons(),
            &[ValidationReason::EmptyValue]
        );
        assert!(check(Rule::new("note", "=", "")).is_valid());
        assert!(check(Rule::new("cos_provider", "=", "aws")).is_valid());
    }

    #[test]
    fn exempt_fields_skip_all_checks() {
        let exempt: HashSet<String> = ["nope".to_owned()].into_iter().collect();
        let r = validate_rule(&Rule::new("nope", "bogus", ""), &catalog(), &exempt);
        assert!(r.is_valid());
    }

    #[test]
    fn validates_nested_rules() {
        let tree = QueryTree::new(
            RuleGroup::and()
                .with_rule(Rule::new("cos_provider", "=", "aws"))
                .with_group(
                    RuleGroup::or()
                        .with_rule(Rule::new("region", "=", "eu"))
                        .with_rule(Rule::new("ghost", "=", "x")),
                ),
        );
        let v = validate(tree.root(), &catalog(), &HashSet::new());
        assert_eq!(v.len(), 3);
        assert!(!v.is_valid());
        assert_eq!(v.invalid_ids().len(), 1);
        let ghost = tree
            .root()
            .rules_iter()
            .into_iter()
            .find(|r| r.field == "ghost")
            .map(Rule::id)
            .unwrap();
        assert_eq!(v.invalid_ids(), vec![ghost]);
    }

    #[test]
    fn empty_tree_is_valid() {
        let v = validate(&RuleGroup::and(), &catalog(), &HashSet::new());
        assert!(v.is_empty());
        assert!(v.is_valid());
    }
}
