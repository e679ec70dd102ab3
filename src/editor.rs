//! Functional edits of the condition tree.
//!
//! Every operation takes the current root by reference and returns a fresh
//! root, so the caller can swap it in wholesale and recompile.

use crate::ast::{FieldDescriptor, FieldType, FilterCondition, Group, Leaf, LogicalOperator, Operator};
use crate::formatter::{format_value, is_formatted, list_items};
use crate::operators::{operators_for, retain_operator};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("operator {operator} is not allowed for {field} ({field_type:?})")]
    OperatorNotAllowed {
        field: String,
        field_type: FieldType,
        operator: Operator,
    },

    #[error("a value is required for {0}")]
    EmptyValue(String),

    #[error("no condition with id {0}")]
    NodeNotFound(String),

    #[error("{0} is not a group")]
    NotAGroup(String),

    #[error("{0} is first in its list and cannot take a join operator")]
    LeadingJoin(String),

    #[error("id {0} is already used in this tree")]
    DuplicateId(String),

    #[error("value {value} of {id} is not a formatted literal")]
    MalformedValue { id: String, value: String },
}

pub type Result<T> = std::result::Result<T, EditorError>;

/// Edits condition trees for one object, validating against its fields.
#[derive(Debug, Clone)]
pub struct ConditionEditor {
    fields: Vec<FieldDescriptor>,
    next_id: u64,
}

impl ConditionEditor {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields, next_id: 1 }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Legal operators for `field`, or the full set when the field is unknown.
    pub fn operators_for_field(&self, field: &str) -> &'static [Operator] {
        operators_for(self.field(field).map(|f| f.field_type))
    }

    /// Append a condition to the root list.
    pub fn add_leaf(
        &mut self,
        root: &[FilterCondition],
        field: &str,
        operator: Operator,
        raw_value: &str,
        join: LogicalOperator,
    ) -> Result<Vec<FilterCondition>> {
        let leaf = self.build_leaf(field, operator, raw_value)?;
        Ok(append(root, leaf, join))
    }

    /// Append a condition to the children of group `group_id`.
    pub fn add_leaf_in(
        &mut self,
        root: &[FilterCondition],
        group_id: &str,
        field: &str,
        operator: Operator,
        raw_value: &str,
        join: LogicalOperator,
    ) -> Result<Vec<FilterCondition>> {
        let children = group_children(root, group_id)?;
        let leaf = self.build_leaf(field, operator, raw_value)?;
        let children = append(children, leaf, join);
        self.set_children(root, group_id, children)
    }

    /// Append an empty group to the root list.
    pub fn add_group(&mut self, root: &[FilterCondition], join: LogicalOperator) -> Vec<FilterCondition> {
        let id = self.next_id("g");
        tracing::debug!(%id, "adding group");
        let group = FilterCondition::Group(Group {
            id,
            conditions: Vec::new(),
            logical_operator: None,
        });
        append(root, group, join)
    }

    /// Remove the node `id` wherever it sits in the tree.
    pub fn remove_node(&self, root: &[FilterCondition], id: &str) -> Result<Vec<FilterCondition>> {
        let mut found = false;
        let updated = remove_from(root, id, &mut found);
        if !found {
            return Err(EditorError::NodeNotFound(id.to_string()));
        }
        tracing::debug!(id, "removed condition");
        Ok(updated)
    }

    /// Replace the children of group `group_id`.
    ///
    /// The new children are checked like editor-built nodes: known fields,
    /// legal operators, formatted values and ids unused elsewhere in the tree.
    /// Ids of the children being replaced may be reused.
    pub fn set_children(
        &mut self,
        root: &[FilterCondition],
        group_id: &str,
        children: Vec<FilterCondition>,
    ) -> Result<Vec<FilterCondition>> {
        // Validate before rebuilding so errors leave nothing half-done.
        let replaced = collect_ids(group_children(root, group_id)?);
        let mut taken: HashSet<String> = collect_ids(root)
            .into_iter()
            .filter(|id| !replaced.contains(id))
            .collect();
        let children = self.check_nodes(children, &mut taken)?;
        let mut children = Some(children);
        let updated = map_tree(root, &mut |node| match node {
            FilterCondition::Group(group) if group.id == group_id => {
                if let Some(children) = children.take() {
                    group.conditions = normalize_joins(children);
                }
            }
            _ => {}
        });
        Ok(updated)
    }

    /// Change how node `id` joins to its preceding sibling.
    pub fn set_join_operator(
        &self,
        root: &[FilterCondition],
        id: &str,
        op: LogicalOperator,
    ) -> Result<Vec<FilterCondition>> {
        match position_of(root, id) {
            None => Err(EditorError::NodeNotFound(id.to_string())),
            Some(0) => Err(EditorError::LeadingJoin(id.to_string())),
            Some(_) => Ok(map_tree(root, &mut |node| {
                if node.id() == id {
                    node.set_logical_operator(Some(op));
                }
            })),
        }
    }

    fn build_leaf(&mut self, field: &str, operator: Operator, raw_value: &str) -> Result<FilterCondition> {
        let descriptor = self
            .field(field)
            .ok_or_else(|| EditorError::UnknownField(field.to_string()))?;
        let field_type = descriptor.field_type;
        let name = descriptor.name.clone();

        let operator = retain_operator(Some(field_type), Some(operator)).ok_or_else(|| {
            EditorError::OperatorNotAllowed {
                field: name.clone(),
                field_type,
                operator,
            }
        })?;

        let blank_list = operator.takes_list() && list_items(raw_value).next().is_none();
        if raw_value.trim().is_empty() || blank_list {
            return Err(EditorError::EmptyValue(name));
        }

        let value = format_value(field_type, operator, raw_value);
        let id = self.next_id("c");
        tracing::debug!(%id, field = %name, %operator, %value, "adding condition");
        Ok(FilterCondition::Leaf(Leaf {
            id,
            field: name,
            operator,
            value,
            logical_operator: None,
        }))
    }

    fn check_nodes(&mut self, list: Vec<FilterCondition>, taken: &mut HashSet<String>) -> Result<Vec<FilterCondition>> {
        list.into_iter().map(|node| self.check_node(node, taken)).collect()
    }

    fn check_node(&mut self, node: FilterCondition, taken: &mut HashSet<String>) -> Result<FilterCondition> {
        if !taken.insert(node.id().to_string()) {
            return Err(EditorError::DuplicateId(node.id().to_string()));
        }
        self.reserve_id(node.id());

        match node {
            FilterCondition::Leaf(mut leaf) => {
                let descriptor = self
                    .field(&leaf.field)
                    .ok_or_else(|| EditorError::UnknownField(leaf.field.clone()))?;
                let field_type = descriptor.field_type;
                leaf.field = descriptor.name.clone();

                if retain_operator(Some(field_type), Some(leaf.operator)).is_none() {
                    return Err(EditorError::OperatorNotAllowed {
                        field: leaf.field,
                        field_type,
                        operator: leaf.operator,
                    });
                }
                if leaf.value.trim().is_empty() {
                    return Err(EditorError::EmptyValue(leaf.field));
                }
                if !is_formatted(field_type, leaf.operator, &leaf.value) {
                    return Err(EditorError::MalformedValue {
                        id: leaf.id,
                        value: leaf.value,
                    });
                }
                Ok(FilterCondition::Leaf(leaf))
            }
            FilterCondition::Group(mut group) => {
                let conditions = std::mem::take(&mut group.conditions);
                group.conditions = normalize_joins(self.check_nodes(conditions, taken)?);
                Ok(FilterCondition::Group(group))
            }
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    /// Keep generated ids clear of a caller-supplied `c<n>`/`g<n>` id.
    fn reserve_id(&mut self, id: &str) {
        let n = id
            .strip_prefix('c')
            .or_else(|| id.strip_prefix('g'))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(n) = n {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
    }
}

fn append(list: &[FilterCondition], mut node: FilterCondition, join: LogicalOperator) -> Vec<FilterCondition> {
    let join = if list.is_empty() { None } else { Some(join) };
    node.set_logical_operator(join);
    let mut out = list.to_vec();
    out.push(node);
    out
}

/// First node of a list never joins; later nodes always do.
fn normalize_joins(mut list: Vec<FilterCondition>) -> Vec<FilterCondition> {
    for (i, node) in list.iter_mut().enumerate() {
        if i == 0 {
            node.set_logical_operator(None);
        } else if node.logical_operator().is_none() {
            node.set_logical_operator(Some(LogicalOperator::And));
        }
    }
    list
}

fn remove_from(list: &[FilterCondition], id: &str, found: &mut bool) -> Vec<FilterCondition> {
    let mut kept = Vec::with_capacity(list.len());
    for node in list {
        if node.id() == id {
            *found = true;
            continue;
        }
        kept.push(match node {
            FilterCondition::Group(group) => FilterCondition::Group(Group {
                id: group.id.clone(),
                conditions: remove_from(&group.conditions, id, found),
                logical_operator: group.logical_operator,
            }),
            leaf => leaf.clone(),
        });
    }
    normalize_joins(kept)
}

/// Copy the tree, applying `f` to every node (parents before children).
fn map_tree<F>(list: &[FilterCondition], f: &mut F) -> Vec<FilterCondition>
where
    F: FnMut(&mut FilterCondition),
{
    list.iter()
        .map(|node| {
            let mut node = node.clone();
            f(&mut node);
            if let FilterCondition::Group(group) = &mut node {
                group.conditions = map_tree(&group.conditions, f);
            }
            node
        })
        .collect()
}

fn collect_ids(list: &[FilterCondition]) -> HashSet<String> {
    fn walk(list: &[FilterCondition], ids: &mut HashSet<String>) {
        for node in list {
            ids.insert(node.id().to_string());
            if let FilterCondition::Group(group) = node {
                walk(&group.conditions, ids);
            }
        }
    }

    let mut ids = HashSet::new();
    walk(list, &mut ids);
    ids
}

fn find<'a>(list: &'a [FilterCondition], id: &str) -> Option<&'a FilterCondition> {
    list.iter().find_map(|node| {
        if node.id() == id {
            return Some(node);
        }
        match node {
            FilterCondition::Group(group) => find(&group.conditions, id),
            FilterCondition::Leaf(_) => None,
        }
    })
}

/// Index of `id` within its own sibling list.
fn position_of(list: &[FilterCondition], id: &str) -> Option<usize> {
    list.iter().enumerate().find_map(|(i, node)| {
        if node.id() == id {
            return Some(i);
        }
        match node {
            FilterCondition::Group(group) => position_of(&group.conditions, id),
            FilterCondition::Leaf(_) => None,
        }
    })
}

fn group_children<'a>(root: &'a [FilterCondition], group_id: &str) -> Result<&'a [FilterCondition]> {
    match find(root, group_id) {
        Some(FilterCondition::Group(group)) => Ok(&group.conditions),
        Some(FilterCondition::Leaf(_)) => Err(EditorError::NotAGroup(group_id.to_string())),
        None => Err(EditorError::NodeNotFound(group_id.to_string())),
    }
}
