#![allow(dead_code)]

use filtree::{
    kind_of, Combinator, Field, FieldCatalog, Node, OperatorKind, Rule, RuleGroup, RuleValue,
    ValueOption,
};
use proptest::prelude::*;

// --- Fixed field schema ---
// cos_provider : billing, membership by default, values {aws, gcp, azure}
// service      : usage, free text
// region       : usage, values {eu, us, ap}
// cost center  : billing, free text (name needs quoting in text form)

pub const PROVIDERS: &[&str] = &["aws", "gcp", "azure"];
pub const REGIONS: &[&str] = &["eu", "us", "ap"];

pub const STANDARD_OPERATORS: &[&str] = &[
    "=",
    "!=",
    "<",
    ">",
    "<=",
    ">=",
    "contains",
    "beginsWith",
    "endsWith",
    "doesNotContain",
    "doesNotBeginWith",
    "doesNotEndWith",
    "null",
    "notNull",
    "in",
    "notIn",
];

/// Operators outside the standard list, including names that need quoting.
const CUSTOM_OPERATORS: &[&str] = &["isAfter", "custom-op", "is", "=="];

pub fn catalog() -> FieldCatalog {
    FieldCatalog::new(vec![
        Field::new("cos_provider", "Provider", "billing")
            .with_default_operator("in")
            .with_values(PROVIDERS.iter().map(|p| ValueOption::new(p, &p.to_uppercase()))),
        Field::new("service", "Service", "usage"),
        Field::new("region", "Region", "usage")
            .with_values(REGIONS.iter().map(|r| ValueOption::new(r, r))),
        Field::new("cost center", "Cost center", "billing"),
    ])
}

/// Free text, biased towards characters the text form has to escape.
pub fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(&["aws", "", "ec2", "-12.5", "true", "a b"][..]).prop_map(String::from),
        "[a-z\"\\\\`\n\t (),\\[\\]]{0,8}",
        "\\PC{0,8}",
    ]
}

/// Field names, including keywords and names that are not identifiers.
pub fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(&["cos_provider", "service", "tags.team", "and", "NOT", "is", "true_x"][..])
            .prop_map(String::from),
        "[a-zA-Z_][a-zA-Z0-9_.]{0,6}",
        "\\PC{0,6}",
    ]
}

pub fn arb_operator() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(STANDARD_OPERATORS).prop_map(String::from),
        1 => prop::sample::select(CUSTOM_OPERATORS).prop_map(String::from),
    ]
}

/// A rule whose value already has the shape its operator requires.
pub fn arb_rule() -> impl Strategy<Value = Rule> {
    (
        arb_name(),
        arb_operator(),
        arb_text(),
        prop::collection::vec(arb_text(), 0..4),
    )
        .prop_map(|(field, op, text, list)| {
            let value = match kind_of(&op) {
                OperatorKind::Membership => RuleValue::List(list),
                _ => RuleValue::Scalar(text),
            };
            Rule::new(&field, &op, value)
        })
}

pub fn arb_combinator() -> impl Strategy<Value = Combinator> {
    prop_oneof![Just(Combinator::And), Just(Combinator::Or)]
}

fn group(combinator: Combinator, not: bool, rules: Vec<Node>) -> RuleGroup {
    let mut g = RuleGroup::new(combinator);
    g.not = not;
    g.rules = rules;
    g
}

/// An arbitrary tree: empty groups, single-child groups, negations and
/// nesting up to a few levels deep.
pub fn arb_tree() -> impl Strategy<Value = RuleGroup> {
    let node = arb_rule()
        .prop_map(Node::Rule)
        .prop_recursive(4, 32, 4, |inner| {
            (arb_combinator(), any::<bool>(), prop::collection::vec(inner, 0..4))
                .prop_map(|(c, not, rules)| Node::Group(group(c, not, rules)))
        });
    (
        arb_combinator(),
        any::<bool>(),
        prop::collection::vec(node, 0..5),
    )
        .prop_map(|(c, not, rules)| group(c, not, rules))
}

/// A rule over the fixed schema that the validator accepts.
pub fn arb_valid_rule() -> impl Strategy<Value = Rule> {
    prop_oneof![
        (
            prop::sample::select(&["in", "notIn"][..]),
            prop::sample::subsequence(PROVIDERS, 1..=PROVIDERS.len()),
        )
            .prop_map(|(op, values)| Rule::new("cos_provider", op, values.as_slice())),
        (
            prop::sample::select(&["=", "contains", "beginsWith", "doesNotEndWith"][..]),
            "[a-z0-9]{1,6}",
        )
            .prop_map(|(op, v)| Rule::new("service", op, v.as_str())),
        prop::sample::select(&["null", "notNull"][..])
            .prop_map(|op| Rule::new("cost center", op, "")),
    ]
}

/// A tree over the fixed schema in which every rule is valid.
pub fn arb_valid_tree() -> impl Strategy<Value = RuleGroup> {
    let node = arb_valid_rule()
        .prop_map(Node::Rule)
        .prop_recursive(3, 16, 3, |inner| {
            (arb_combinator(), any::<bool>(), prop::collection::vec(inner, 0..3))
                .prop_map(|(c, not, rules)| Node::Group(group(c, not, rules)))
        });
    (arb_combinator(), prop::collection::vec(node, 0..4))
        .prop_map(|(c, rules)| group(c, false, rules))
}

/// One user action on a membership picker.
#[derive(Debug, Clone)]
pub enum PickerAction {
    Toggle(String),
    Replace(Vec<String>),
}

pub fn arb_picker_actions() -> impl Strategy<Value = Vec<PickerAction>> {
    let value = prop_oneof![
        prop::sample::select(PROVIDERS).prop_map(String::from),
        "[a-c]{1,2}",
    ];
    let action = prop_oneof![
        3 => value.clone().prop_map(PickerAction::Toggle),
        1 => prop::collection::vec(value, 0..6).prop_map(PickerAction::Replace),
    ];
    prop::collection::vec(action, 1..20)
}
