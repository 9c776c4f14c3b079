use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::controls::{ColorScheme, ControlElements, RuleContext, RuleView};
use crate::debounce::{Debouncer, PendingCommit, DEFAULT_DEBOUNCE};
use crate::error::FiltreeError;
use crate::model::{Mutation, QueryTree};
use crate::parse::{parse, ParseError};
use crate::sync::{BuilderMode, ModeSync, TextOutcome};
use crate::types::{
    kind_of, Combinator, Field, FieldCatalog, NodeId, NodeRef, Operator, OperatorKind, Rule,
    RuleGroup, RuleValue, TreeError, Validation,
};
use crate::validate::validate;

type Callback = dyn Fn(Option<&RuleGroup>);

/// The upward change notification.
///
/// Receives the tree after every applied change, or `None` when text typed
/// into the textual editor failed to parse. A session captures its listener
/// once, at build time; clones share identity.
#[derive(Clone)]
pub struct ChangeListener(Rc<Callback>);

impl ChangeListener {
    pub fn new(f: impl Fn(Option<&RuleGroup>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Whether both handles refer to the same callback.
    #[must_use]
    pub fn same_as(&self, other: &ChangeListener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn notify(&self, tree: Option<&RuleGroup>) {
        (self.0)(tree);
    }
}

impl Default for ChangeListener {
    fn default() -> Self {
        Self::new(|_| {})
    }
}

impl fmt::Debug for ChangeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChangeListener")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Builder for [`Session`].
///
/// ```
/// use filtree::{Field, SessionBuilder};
///
/// let mut session = SessionBuilder::new()
///     .fields(vec![Field::new("cos_provider", "Provider", "billing")])
///     .default_field("cos_provider")
///     .build();
/// let root = session.tree().id();
/// session.add_rule(root).unwrap();
/// assert_eq!(session.tree().rules.len(), 1);
/// ```
pub struct SessionBuilder {
    fields: Vec<Field>,
    operators: Option<Vec<Operator>>,
    default_query: Option<RuleGroup>,
    default_field: Option<String>,
    group_order: Vec<String>,
    exempt: HashSet<String>,
    debounce: Duration,
    controls: Option<ControlElements>,
    listener: Option<ChangeListener>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            operators: None,
            default_query: None,
            default_field: None,
            group_order: Vec::new(),
            exempt: HashSet::new(),
            debounce: DEFAULT_DEBOUNCE,
            controls: None,
            listener: None,
        }
    }

    /// The fields rules can refer to, in display order.
    #[must_use]
    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Operators offered for fields that do not declare their own.
    #[must_use]
    pub fn operators(mut self, operators: Vec<Operator>) -> Self {
        self.operators = Some(operators);
        self
    }

    /// The tree the session starts from. Defaults to an empty `AND` group.
    #[must_use]
    pub fn default_query(mut self, query: RuleGroup) -> Self {
        self.default_query = Some(query);
        self
    }

    /// Field used for newly added rules.
    #[must_use]
    pub fn default_field(mut self, name: &str) -> Self {
        self.default_field = Some(name.to_owned());
        self
    }

    /// Ranking of field groups in the field selector.
    #[must_use]
    pub fn group_order<S: Into<String>>(mut self, order: impl IntoIterator<Item = S>) -> Self {
        self.group_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Fields whose rules are never reported invalid.
    #[must_use]
    pub fn exempt_fields<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exempt = names.into_iter().map(Into::into).collect();
        self
    }

    /// Quiet interval before typed values are committed.
    #[must_use]
    pub fn debounce(mut self, interval: Duration) -> Self {
        self.debounce = interval;
        self
    }

    /// Replace the standard editing controls. Overrides `group_order`.
    #[must_use]
    pub fn controls(mut self, controls: ControlElements) -> Self {
        self.controls = Some(controls);
        self
    }

    #[must_use]
    pub fn on_change(mut self, listener: ChangeListener) -> Self {
        self.listener = Some(listener);
        self
    }

    #[must_use]
    pub fn build(self) -> Session {
        let catalog = match self.operators {
            Some(ops) => FieldCatalog::with_operators(self.fields, ops),
            None => FieldCatalog::new(self.fields),
        };
        let tree = QueryTree::new(self.default_query.unwrap_or_default());
        let validation = validate(tree.root(), &catalog, &self.exempt);
        debug!(
            fields = catalog.len(),
            rules = tree.root().rules_iter().len(),
            "session built"
        );
        Session {
            tree,
            catalog,
            default_field: self.default_field,
            exempt: self.exempt,
            validation,
            controls: self
                .controls
                .unwrap_or_else(|| ControlElements::with_group_order(self.group_order)),
            debouncer: Debouncer::new(self.debounce),
            sync: ModeSync::default(),
            listener: self.listener.unwrap_or_default(),
        }
    }
}

/// One filter-editing session.
///
/// Owns the rule tree and everything derived from it. Every successful change
/// revalidates the tree and notifies the listener exactly once.
#[derive(Debug)]
pub struct Session {
    tree: QueryTree,
    catalog: FieldCatalog,
    default_field: Option<String>,
    exempt: HashSet<String>,
    validation: Validation,
    controls: ControlElements,
    debouncer: Debouncer,
    sync: ModeSync,
    listener: ChangeListener,
}

impl Session {
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    #[must_use]
    pub fn tree(&self) -> &RuleGroup {
        self.tree.root()
    }

    #[must_use]
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Whether every rule in the tree is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    #[must_use]
    pub fn listener(&self) -> &ChangeListener {
        &self.listener
    }

    // -- Mutations ----------------------------------------------------------

    /// Apply one mutation, revalidate and notify.
    ///
    /// Returns the id of the created node for additions.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the mutation cannot be applied. Nothing is
    /// changed or notified in that case.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Option<NodeId>, TreeError> {
        let created = self
            .tree
            .apply(&mutation, &self.catalog, self.default_field.as_deref())?;
        if let Some(id) = mutation.retargets() {
            self.debouncer.cancel(id);
        }
        self.changed();
        Ok(created)
    }

    fn changed(&mut self) {
        self.validation = validate(self.tree.root(), &self.catalog, &self.exempt);
        self.sync.refresh(self.tree.root());
        self.listener.notify(Some(self.tree.root()));
    }

    /// Append a rule for the default field to `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is not a group of this tree or the catalog is empty.
    pub fn add_rule(&mut self, parent: NodeId) -> Result<NodeId, TreeError> {
        self.apply(Mutation::AddRule { parent })?
            .ok_or(TreeError::UnknownNode { id: parent })
    }

    /// Append an empty `AND` group to `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is not a group of this tree.
    pub fn add_group(&mut self, parent: NodeId) -> Result<NodeId, TreeError> {
        self.apply(Mutation::AddGroup { parent })?
            .ok_or(TreeError::UnknownNode { id: parent })
    }

    /// # Errors
    ///
    /// Fails for the root and for unknown nodes.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.apply(Mutation::Remove { id }).map(drop)
    }

    /// # Errors
    ///
    /// Fails for unknown rules and fields.
    pub fn set_field(&mut self, rule: NodeId, field: &str) -> Result<(), TreeError> {
        self.apply(Mutation::SetField {
            rule,
            field: field.to_owned(),
        })
        .map(drop)
    }

    /// # Errors
    ///
    /// Fails for unknown rules and operators the rule's field does not allow.
    pub fn set_operator(&mut self, rule: NodeId, operator: &str) -> Result<(), TreeError> {
        self.apply(Mutation::SetOperator {
            rule,
            operator: operator.to_owned(),
        })
        .map(drop)
    }

    /// # Errors
    ///
    /// Fails for unknown rules.
    pub fn set_value(&mut self, rule: NodeId, value: impl Into<RuleValue>) -> Result<(), TreeError> {
        self.apply(Mutation::SetValue {
            rule,
            value: value.into(),
        })
        .map(drop)
    }

    /// # Errors
    ///
    /// Fails for unknown groups.
    pub fn set_combinator(&mut self, group: NodeId, combinator: Combinator) -> Result<(), TreeError> {
        self.apply(Mutation::SetCombinator { group, combinator })
            .map(drop)
    }

    /// # Errors
    ///
    /// Fails for unknown groups.
    pub fn set_not(&mut self, group: NodeId, not: bool) -> Result<(), TreeError> {
        self.apply(Mutation::SetNot { group, not }).map(drop)
    }

    /// Parse `text` as an expression and append it to `parent` as a new
    /// group. Works in either mode.
    ///
    /// # Errors
    ///
    /// [`FiltreeError::Parse`] if the text is malformed, [`FiltreeError::Tree`]
    /// if `parent` is not a group of this tree. Nothing changes on error.
    pub fn paste_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, FiltreeError> {
        let group = parse(text)?;
        let id = self
            .apply(Mutation::InsertGroup { parent, group })?
            .ok_or(TreeError::UnknownNode { id: parent })?;
        Ok(id)
    }

    // -- Debounced text input ----------------------------------------------

    /// A keystroke in the free-text value editor of `rule`.
    ///
    /// The draft is visible through [`Session::draft`] immediately and
    /// committed by the first [`Session::tick`] after the quiet interval.
    /// Input for rules whose operator takes no free-text value is ignored.
    ///
    /// # Errors
    ///
    /// Fails if `rule` is not a rule of this tree.
    pub fn type_value(&mut self, rule: NodeId, text: &str, now: Instant) -> Result<(), TreeError> {
        let r = self.find_rule(rule)?;
        if kind_of(&r.operator) != OperatorKind::Scalar {
            trace!(%rule, operator = %r.operator, "text input ignored");
            return Ok(());
        }
        let (field, operator) = (r.field.clone(), r.operator.clone());
        self.debouncer.input(rule, &field, &operator, text, now);
        Ok(())
    }

    /// Uncommitted text for `rule`.
    #[must_use]
    pub fn draft(&self, rule: NodeId) -> Option<&str> {
        self.debouncer.draft(rule)
    }

    /// Earliest time at which [`Session::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// Commit every draft whose quiet interval has elapsed by `now`.
    ///
    /// Drafts whose rule was removed, or whose field or operator changed since
    /// typing, are dropped. Returns the number of commits applied.
    pub fn tick(&mut self, now: Instant) -> usize {
        let due = self.debouncer.due(now);
        self.commit(due)
    }

    fn commit(&mut self, pending: Vec<PendingCommit>) -> usize {
        let mut applied = 0;
        for p in pending {
            let current = match self.tree.root().find(p.rule) {
                Some(NodeRef::Rule(r)) => r,
                _ => {
                    trace!(rule = %p.rule, "stale commit dropped: rule gone");
                    continue;
                }
            };
            if current.field != p.field || current.operator != p.operator {
                trace!(rule = %p.rule, "stale commit dropped: rule retargeted");
                continue;
            }
            let mutation = Mutation::SetValue {
                rule: p.rule,
                value: RuleValue::Scalar(p.draft),
            };
            if self.apply(mutation).is_ok() {
                applied += 1;
            }
        }
        applied
    }

    // -- Mode synchronization ----------------------------------------------

    #[must_use]
    pub fn mode(&self) -> BuilderMode {
        self.sync.mode()
    }

    /// Text shown by the textual editor.
    #[must_use]
    pub fn text(&self) -> &str {
        self.sync.text()
    }

    /// Whether the textual editor holds text that does not parse.
    #[must_use]
    pub fn query_error(&self) -> bool {
        self.sync.query_error()
    }

    /// Switch editing surface.
    ///
    /// Entering textual mode commits pending drafts first, so the text
    /// reflects everything typed so far.
    ///
    /// # Errors
    ///
    /// Leaving textual mode with text that does not parse returns the
    /// [`ParseError`]; the session stays in textual mode with its tree intact.
    pub fn set_mode(&mut self, target: BuilderMode) -> Result<(), ParseError> {
        if target == BuilderMode::Textual && self.sync.mode() == BuilderMode::Structured {
            let pending = self.debouncer.drain();
            self.commit(pending);
        }
        if self.sync.set_mode(target, &mut self.tree)? {
            self.changed();
        }
        Ok(())
    }

    /// Flip between structured and textual mode.
    ///
    /// # Errors
    ///
    /// See [`Session::set_mode`].
    pub fn toggle_mode(&mut self) -> Result<(), ParseError> {
        self.set_mode(self.sync.mode().toggled())
    }

    /// Text reported by the textual editor.
    pub fn edit_text(&mut self, text: &str) -> TextOutcome {
        let outcome = self.sync.edit_text(text, &mut self.tree);
        match &outcome {
            TextOutcome::Applied => {
                self.debouncer.clear();
                self.validation = validate(self.tree.root(), &self.catalog, &self.exempt);
                self.listener.notify(Some(self.tree.root()));
            }
            TextOutcome::Rejected(_) => self.listener.notify(None),
            TextOutcome::Inactive | TextOutcome::Echo | TextOutcome::Unchanged => {}
        }
        outcome
    }

    // -- Controls -----------------------------------------------------------

    fn find_rule(&self, id: NodeId) -> Result<&Rule, TreeError> {
        match self.tree.root().find(id) {
            Some(NodeRef::Rule(r)) => Ok(r),
            Some(NodeRef::Group(_)) => Err(TreeError::NotARule { id }),
            None => Err(TreeError::UnknownNode { id }),
        }
    }

    fn context(&self, id: NodeId, scheme: ColorScheme) -> Result<RuleContext<'_>, TreeError> {
        Ok(RuleContext {
            rule: self.find_rule(id)?,
            catalog: &self.catalog,
            validation: self.validation.get(id),
            draft: self.debouncer.draft(id),
            scheme,
        })
    }

    /// View model of the controls for `rule`.
    ///
    /// # Errors
    ///
    /// Fails if `rule` is not a rule of this tree.
    pub fn rule_view(&self, rule: NodeId, scheme: ColorScheme) -> Result<RuleView, TreeError> {
        let ctx = self.context(rule, scheme)?;
        Ok(self.controls.render_rule(&ctx))
    }

    /// A selection made in the field selector of `rule`. Returns whether it
    /// changed the tree.
    ///
    /// # Errors
    ///
    /// Fails if `rule` is not a rule of this tree.
    pub fn select_field(&mut self, rule: NodeId, selection: Option<&str>) -> Result<bool, TreeError> {
        let ctx = self.context(rule, ColorScheme::default())?;
        let mutation = self.controls.select_field(&ctx, selection);
        self.apply_intent(mutation)
    }

    /// A selection made in the operator selector of `rule`.
    ///
    /// # Errors
    ///
    /// Fails if `rule` is not a rule of this tree.
    pub fn select_operator(
        &mut self,
        rule: NodeId,
        selection: Option<&str>,
    ) -> Result<bool, TreeError> {
        let ctx = self.context(rule, ColorScheme::default())?;
        let mutation = self.controls.select_operator(&ctx, selection);
        self.apply_intent(mutation)
    }

    /// The new selection of the multi-value picker of `rule`.
    ///
    /// # Errors
    ///
    /// Fails if `rule` is not a rule of this tree.
    pub fn select_values(&mut self, rule: NodeId, selected: &[String]) -> Result<bool, TreeError> {
        let ctx = self.context(rule, ColorScheme::default())?;
        let mutation = self.controls.select_values(&ctx, selected);
        self.apply_intent(mutation)
    }

    /// The remove action of `id` was clicked.
    ///
    /// # Errors
    ///
    /// Fails for the root and for unknown nodes.
    pub fn click_remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        let mutation = self.controls.remove(id);
        self.apply(mutation).map(drop)
    }

    fn apply_intent(&mut self, mutation: Option<Mutation>) -> Result<bool, TreeError> {
        match mutation {
            Some(m) => self.apply(m).map(|_| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::controls::ValueView;
    use crate::types::{Node, ValueOption};

    fn fields() -> Vec<Field> {
        vec![
            Field::new("service", "Service", "usage"),
            Field::new("cos_provider", "Provider", "billing")
                .with_default_operator("in")
                .with_values([
                    ValueOption::new("aws", "AWS"),
                    ValueOption::new("gcp", "Google Cloud"),
                ]),
        ]
    }

    type Log = Rc<RefCell<Vec<Option<RuleGroup>>>>;

    fn recording() -> (ChangeListener, Log) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let listener = ChangeListener::new(move |tree| sink.borrow_mut().push(tree.cloned()));
        (listener, log)
    }

    fn session() -> (Session, Log) {
        let (listener, log) = recording();
        let session = SessionBuilder::new()
            .fields(fields())
            .on_change(listener)
            .build();
        (session, log)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn default_field_rule() {
        let mut session = SessionBuilder::new()
            .fields(vec![Field::new("cos_provider", "Provider", "billing")])
            .default_field("cos_provider")
            .build();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        let rule = session.tree().rule(id).unwrap();
        assert_eq!(session.tree().rules.len(), 1);
        assert_eq!(rule.field, "cos_provider");
        assert_eq!(rule.operator, "=");
    }

    #[test]
    fn each_mutation_notifies_once() {
        let (mut session, log) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        session.set_value(id, "ec2").unwrap();
        assert_eq!(log.borrow().len(), 2);
        assert!(session.is_valid());
    }

    #[test]
    fn failed_mutation_does_not_notify() {
        let (mut session, log) = session();
        let root = session.tree().id();
        assert_eq!(session.remove_node(root), Err(TreeError::CannotRemoveRoot));
        assert!(session.set_field(NodeId(77), "service").is_err());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn new_rule_is_invalid_until_filled() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        assert!(!session.is_valid());
        assert_eq!(session.validation().invalid_ids(), vec![id]);
        session.set_value(id, "ec2").unwrap();
        assert!(session.is_valid());
    }

    #[test]
    fn exempt_fields_are_always_valid() {
        let mut session = SessionBuilder::new()
            .fields(fields())
            .exempt_fields(["service"])
            .build();
        let root = session.tree().id();
        session.add_rule(root).unwrap();
        assert!(session.is_valid());
    }

    #[test]
    fn keystrokes_commit_once_with_last_value() {
        let (mut session, log) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        log.borrow_mut().clear();

        let t0 = Instant::now();
        for (i, text) in ["e", "ec", "ec2"].iter().enumerate() {
            session.type_value(id, text, t0 + ms(100 * i as u64)).unwrap();
        }
        assert_eq!(session.draft(id), Some("ec2"));
        assert_eq!(session.tick(t0 + ms(500)), 0);
        assert_eq!(session.tick(t0 + ms(800)), 1);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(session.tree().rule(id).unwrap().value, RuleValue::from("ec2"));
        assert_eq!(session.draft(id), None);
    }

    #[test]
    fn draft_shows_in_view() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        session.type_value(id, "ec", Instant::now()).unwrap();
        let view = session.rule_view(id, ColorScheme::Light).unwrap();
        assert_eq!(
            view.value,
            ValueView::Text {
                value: "ec".into(),
                invalid: true
            }
        );
    }

    #[test]
    fn field_change_discards_pending_commit() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        let t0 = Instant::now();
        session.type_value(id, "ec2", t0).unwrap();
        session.set_field(id, "cos_provider").unwrap();
        assert_eq!(session.tick(t0 + ms(1000)), 0);
        assert_eq!(session.tree().rule(id).unwrap().value, RuleValue::List(Vec::new()));
    }

    #[test]
    fn removed_rule_discards_pending_commit() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let group = session.add_group(root).unwrap();
        let id = session.add_rule(group).unwrap();
        let t0 = Instant::now();
        session.type_value(id, "ec2", t0).unwrap();
        session.remove_node(group).unwrap();
        assert_eq!(session.tick(t0 + ms(1000)), 0);
    }

    #[test]
    fn membership_text_input_is_ignored() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        session.set_field(id, "cos_provider").unwrap();
        session.type_value(id, "aws", Instant::now()).unwrap();
        assert_eq!(session.draft(id), None);
    }

    #[test]
    fn select_values_dedups_and_commits() {
        let (mut session, log) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        session.set_field(id, "cos_provider").unwrap();
        log.borrow_mut().clear();
        let picked = ["gcp", "custom", "gcp"].map(String::from);
        assert!(session.select_values(id, &picked).unwrap());
        assert_eq!(
            session.tree().rule(id).unwrap().value,
            RuleValue::from(["gcp", "custom"])
        );
        assert_eq!(log.borrow().len(), 1);

        match session.rule_view(id, ColorScheme::Dark).unwrap().value {
            ValueView::MultiSelect { options, class, .. } => {
                let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                assert_eq!(values, vec!["aws", "gcp", "custom"]);
                assert_eq!(class, "multi-select-dark");
            }
            other => panic!("expected MultiSelect, got {other:?}"),
        }
    }

    #[test]
    fn empty_field_selection_is_ignored() {
        let (mut session, log) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        log.borrow_mut().clear();
        assert!(!session.select_field(id, None).unwrap());
        assert!(!session.select_field(id, Some("")).unwrap());
        assert!(session.select_field(id, Some("cos_provider")).unwrap());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn select_operator_and_remove() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        assert!(session.select_operator(id, Some("null")).unwrap());
        assert!(session.is_valid());
        session.click_remove(id).unwrap();
        assert!(session.tree().is_empty());
        assert_eq!(
            session.rule_view(id, ColorScheme::Light).unwrap_err(),
            TreeError::UnknownNode { id }
        );
    }

    #[test]
    fn parse_failure_keeps_tree_and_emits_sentinel() {
        let (listener, log) = recording();
        let mut session = SessionBuilder::new()
            .fields(fields())
            .default_query(RuleGroup::and().with_rule(Rule::new("service", "=", "ec2")))
            .on_change(listener)
            .build();
        let before = session.tree().clone();
        session.set_mode(BuilderMode::Textual).unwrap();
        assert_eq!(session.text(), r#"service == "ec2""#);

        let outcome = session.edit_text("field1 ==");
        assert!(matches!(outcome, TextOutcome::Rejected(_)));
        assert!(session.query_error());
        assert_eq!(session.tree(), &before);
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].is_none());

        assert!(session.set_mode(BuilderMode::Structured).is_err());
        assert_eq!(session.mode(), BuilderMode::Textual);
    }

    #[test]
    fn accepted_text_replaces_tree() {
        let (mut session, log) = session();
        session.set_mode(BuilderMode::Textual).unwrap();
        let outcome = session.edit_text(r#"NOT (cos_provider in ["aws"])"#);
        assert_eq!(outcome, TextOutcome::Applied);
        assert!(session.tree().not);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(session.edit_text(r#"NOT (cos_provider in ["aws"])"#), TextOutcome::Echo);
        assert_eq!(log.borrow().len(), 1);

        session.set_mode(BuilderMode::Structured).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert!(matches!(&session.tree().rules[..], [Node::Rule(r)] if r.operator == "in"));
    }

    #[test]
    fn entering_textual_mode_flushes_drafts() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let id = session.add_rule(root).unwrap();
        session.type_value(id, "ec2", Instant::now()).unwrap();
        session.toggle_mode().unwrap();
        assert_eq!(session.text(), r#"service == "ec2""#);
        assert_eq!(session.draft(id), None);
    }

    #[test]
    fn structural_edits_refresh_text() {
        let (mut session, _) = session();
        session.set_mode(BuilderMode::Textual).unwrap();
        assert_eq!(session.text(), "true");
        let root = session.tree().id();
        session.set_combinator(root, Combinator::Or).unwrap();
        assert_eq!(session.text(), "false");
    }

    #[test]
    fn listener_identity_is_stable() {
        let (listener, _) = recording();
        let mut session = SessionBuilder::new()
            .fields(fields())
            .on_change(listener.clone())
            .build();
        assert!(session.listener().same_as(&listener));
        let root = session.tree().id();
        session.add_rule(root).unwrap();
        session.toggle_mode().unwrap();
        session.toggle_mode().unwrap();
        assert!(session.listener().same_as(&listener));
        assert!(!session.listener().same_as(&ChangeListener::default()));
    }

    #[test]
    fn set_not_on_nested_group() {
        let (mut session, _) = session();
        let root = session.tree().id();
        let group = session.add_group(root).unwrap();
        session.set_not(group, true).unwrap();
        assert!(session.tree().group(group).unwrap().not);
    }

    #[test]
    fn default_query_values_are_normalized() {
        let mut dup = Rule::new("cos_provider", "in", RuleValue::List(Vec::new()));
        dup.value = RuleValue::List(vec!["aws".into(), "aws".into()]);
        let mut scalar = Rule::new("cos_provider", "in", RuleValue::List(Vec::new()));
        scalar.value = RuleValue::Scalar("gcp".into());
        let (listener, log) = recording();
        let mut session = SessionBuilder::new()
            .fields(fields())
            .default_query(RuleGroup::and().with_rule(dup).with_rule(scalar))
            .on_change(listener)
            .build();

        let values: Vec<RuleValue> = session
            .tree()
            .rules_iter()
            .iter()
            .map(|r| r.value.clone())
            .collect();
        assert_eq!(values, vec![RuleValue::from(["aws"]), RuleValue::from(["gcp"])]);

        let before = session.tree().clone();
        let ids: Vec<NodeId> = session.tree().rules.iter().map(Node::id).collect();
        session.toggle_mode().unwrap();
        session.toggle_mode().unwrap();
        assert_eq!(session.tree(), &before);
        let after: Vec<NodeId> = session.tree().rules.iter().map(Node::id).collect();
        assert_eq!(ids, after);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn paste_text_appends_group() {
        let (mut session, log) = session();
        let root = session.tree().id();
        let id = session
            .paste_text(root, r#"service == "ec2" OR cos_provider in ["aws"]"#)
            .unwrap();
        let group = session.tree().group(id).unwrap();
        assert_eq!(group.combinator, Combinator::Or);
        assert_eq!(group.rules.len(), 2);
        assert!(session.is_valid());
        assert_eq!(log.borrow().len(), 1);

        let err = session.paste_text(root, "service ==").unwrap_err();
        assert!(matches!(err, FiltreeError::Parse(_)));
        let rule = session.add_rule(root).unwrap();
        assert_eq!(
            session.paste_text(rule, r#"service == "s3""#),
            Err(FiltreeError::Tree(TreeError::NotAGroup { id: rule }))
        );
        assert_eq!(session.tree().rules.len(), 2);
        assert_eq!(log.borrow().len(), 2);
    }
}
