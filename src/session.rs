//! Applies parsed commands to a query canvas.

use crate::ast::FilterCondition;
use crate::canvas::{CanvasError, QueryCanvas};
use crate::config::ObjectCatalog;
use crate::editor::{ConditionEditor, EditorError};
use crate::parser::{parse_command, Command, ParseError};
use crate::soql_compiler::SoqlCompiler;
use std::fmt::Write;
use thiserror::Error;

pub const HELP: &str = "\
objects                                  list catalog objects
object <Name>                            select an object (resets the canvas)
fields                                   list fields and their operators
select <f1>, <f2>, ...                   set the field list
where <field> <op> <value>               add a condition
and|or|not <field> <op> <value>          add a condition with that join
group [and|or|not]                       add an empty group
into <groupId> [and|or|not] <field> <op> <value>
join <id> and|or|not                     change a join operator
remove <id>                              remove a condition or group
order <field> [asc|desc], ... | none     set ORDER BY
limit <n> | none                         set LIMIT (1-2000)
clear                                    remove all conditions
show                                     print the query
tree                                     print the condition tree as JSON
save <name>                              print a saved-query record
help | quit";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("unknown object: {0}")]
    UnknownObject(String),

    #[error("no object selected; use `object <Name>` first")]
    NoObjectSelected,

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What the shell should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Canvas plus the editor bound to its object's fields.
struct Workspace {
    canvas: QueryCanvas,
    editor: ConditionEditor,
}

pub struct Session {
    catalog: ObjectCatalog,
    compiler: SoqlCompiler,
    workspace: Option<Workspace>,
}

impl Session {
    pub fn new(catalog: ObjectCatalog, compiler: SoqlCompiler) -> Self {
        Self {
            catalog,
            compiler,
            workspace: None,
        }
    }

    pub fn canvas(&self) -> Option<&QueryCanvas> {
        self.workspace.as_ref().map(|ws| &ws.canvas)
    }

    /// Parse and apply one line of input.
    pub fn execute(&mut self, line: &str) -> Result<Reply, SessionError> {
        let command = parse_command(line)?;
        tracing::debug!(?command, "executing");
        self.apply(command)
    }

    pub fn apply(&mut self, command: Command) -> Result<Reply, SessionError> {
        let text = match command {
            Command::Objects => self.catalog.object_names().join("\n"),
            Command::Object(name) => return self.select_object(&name),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
            Command::Fields => describe_fields(&workspace(&mut self.workspace)?.editor),
            Command::Select(fields) => {
                let ws = workspace(&mut self.workspace)?;
                for field in &fields {
                    check_field(&ws.editor, field)?;
                }
                ws.canvas.set_fields(fields);
                self.compiler.compile(&ws.canvas).soql
            }
            Command::Add { join, condition } => {
                let ws = workspace(&mut self.workspace)?;
                let updated = ws.editor.add_leaf(
                    ws.canvas.conditions(),
                    &condition.field,
                    condition.operator,
                    &condition.raw_value,
                    join,
                )?;
                replace_tree(ws, updated)
            }
            Command::Group(join) => {
                let ws = workspace(&mut self.workspace)?;
                let updated = ws.editor.add_group(ws.canvas.conditions(), join);
                replace_tree(ws, updated)
            }
            Command::Into {
                group_id,
                join,
                condition,
            } => {
                let ws = workspace(&mut self.workspace)?;
                let updated = ws.editor.add_leaf_in(
                    ws.canvas.conditions(),
                    &group_id,
                    &condition.field,
                    condition.operator,
                    &condition.raw_value,
                    join,
                )?;
                replace_tree(ws, updated)
            }
            Command::Join { id, join } => {
                let ws = workspace(&mut self.workspace)?;
                let updated = ws.editor.set_join_operator(ws.canvas.conditions(), &id, join)?;
                replace_tree(ws, updated)
            }
            Command::Remove(id) => {
                let ws = workspace(&mut self.workspace)?;
                let updated = ws.editor.remove_node(ws.canvas.conditions(), &id)?;
                replace_tree(ws, updated)
            }
            Command::Order(entries) => {
                let ws = workspace(&mut self.workspace)?;
                for entry in &entries {
                    check_field(&ws.editor, &entry.field)?;
                }
                ws.canvas.clear_order();
                for entry in entries {
                    ws.canvas.add_order(&entry.field, entry.direction);
                }
                self.compiler.compile(&ws.canvas).soql
            }
            Command::Limit(limit) => {
                let ws = workspace(&mut self.workspace)?;
                ws.canvas.set_limit(limit)?;
                self.compiler.compile(&ws.canvas).soql
            }
            Command::Clear => replace_tree(workspace(&mut self.workspace)?, Vec::new()),
            Command::Show => self.compiler.compile(&workspace(&mut self.workspace)?.canvas).soql,
            Command::Tree => serde_json::to_string_pretty(workspace(&mut self.workspace)?.canvas.conditions())?,
            Command::Save(name) => {
                let ws = workspace(&mut self.workspace)?;
                let saved = ws.canvas.to_saved_query(&self.compiler, &name, None);
                serde_json::to_string_pretty(&saved)?
            }
        };

        Ok(Reply::Text(text))
    }

    fn select_object(&mut self, name: &str) -> Result<Reply, SessionError> {
        let (canonical, fields) = self
            .catalog
            .fields_of(name)
            .ok_or_else(|| SessionError::UnknownObject(name.to_string()))?;

        let editor = ConditionEditor::new(fields.to_vec());
        let canvas = match self.workspace.take() {
            Some(mut ws) => {
                ws.canvas.select_object(canonical);
                ws.canvas
            }
            None => QueryCanvas::new(canonical),
        };
        let reply = format!("{} ({} fields)", canonical, fields.len());
        tracing::info!(object = canonical, "object selected");
        self.workspace = Some(Workspace { canvas, editor });
        Ok(Reply::Text(reply))
    }
}

fn workspace(slot: &mut Option<Workspace>) -> Result<&mut Workspace, SessionError> {
    slot.as_mut().ok_or(SessionError::NoObjectSelected)
}

/// Reject fields the selected object does not have.
fn check_field(editor: &ConditionEditor, field: &str) -> Result<(), SessionError> {
    // Relationship paths (Account.Name) live on other objects.
    if field.contains('.') || editor.field(field).is_some() {
        return Ok(());
    }
    Err(EditorError::UnknownField(field.to_string()).into())
}

fn replace_tree(ws: &mut Workspace, updated: Vec<FilterCondition>) -> String {
    ws.canvas.set_conditions(updated);
    outline(ws.canvas.conditions())
}

fn describe_fields(editor: &ConditionEditor) -> String {
    let mut out = String::new();
    for field in editor.fields() {
        let ops: Vec<&str> = editor
            .operators_for_field(&field.name)
            .iter()
            .map(|op| op.as_str())
            .collect();
        let _ = writeln!(
            out,
            "{:<24} {:<14} {}",
            field.name,
            format!("{:?}", field.field_type).to_lowercase(),
            ops.join(" ")
        );
    }
    out.trim_end().to_string()
}

/// One line per node: id, join and content, indented by depth.
pub fn outline(conditions: &[FilterCondition]) -> String {
    fn walk(conditions: &[FilterCondition], depth: usize, out: &mut String) {
        for node in conditions {
            let join = node
                .logical_operator()
                .map(|op| format!("{} ", op))
                .unwrap_or_default();
            let indent = "  ".repeat(depth);
            match node {
                FilterCondition::Leaf(leaf) => {
                    let _ = writeln!(
                        out,
                        "{}{:<4} {}{} {} {}",
                        indent, leaf.id, join, leaf.field, leaf.operator, leaf.value
                    );
                }
                FilterCondition::Group(group) => {
                    let _ = writeln!(out, "{}{:<4} {}group", indent, group.id, join);
                    walk(&group.conditions, depth + 1, out);
                }
            }
        }
    }

    if conditions.is_empty() {
        return "(no conditions)".to_string();
    }
    let mut out = String::new();
    walk(conditions, 0, &mut out);
    out.trim_end().to_string()
}
