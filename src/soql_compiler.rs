//! SOQL compiler that turns a condition tree and a query canvas into query text.

use crate::ast::{FilterCondition, LogicalOperator};
use crate::canvas::QueryCanvas;

/// Configuration for SOQL rendering
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Join used when a non-leading node carries no logical operator
    pub default_join: LogicalOperator,
    /// Text placed between SELECT, FROM, WHERE, ORDER BY and LIMIT
    pub clause_separator: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_join: LogicalOperator::And,
            clause_separator: "\n".to_string(),
        }
    }
}

/// A repair the compiler made to an imperfect tree
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A group with no (non-empty) children produced no output
    EmptyGroupElided { id: String },
    /// A leaf without field or value was left out
    IncompleteLeafSkipped { id: String },
    /// A non-leading node had no logical operator; the default join was used
    MissingJoinDefaulted { id: String },
    /// The first emitted node of a list carried a logical operator that was not printed
    LeadingJoinDropped { id: String },
}

/// Result of SOQL compilation with the repairs applied along the way
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub soql: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// SOQL Compiler that renders canvases and condition trees
#[derive(Debug, Clone, Default)]
pub struct SoqlCompiler {
    config: CompilerConfig,
}

impl SoqlCompiler {
    pub fn new() -> Self {
        Self {
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Render the full statement held by `canvas`.
    pub fn compile(&self, canvas: &QueryCanvas) -> CompileResult {
        let mut diagnostics = Vec::new();
        let mut clauses = Vec::with_capacity(5);

        let fields = if canvas.fields().is_empty() {
            "Id".to_string()
        } else {
            canvas.fields().join(", ")
        };
        clauses.push(format!("SELECT {}", fields));
        clauses.push(format!("FROM {}", canvas.object()));

        let where_clause = self.compile_list(canvas.conditions(), &mut diagnostics);
        if !where_clause.is_empty() {
            clauses.push(format!("WHERE {}", where_clause));
        }

        if !canvas.order_by().is_empty() {
            let order = canvas
                .order_by()
                .iter()
                .map(|o| format!("{} {}", o.field, o.direction))
                .collect::<Vec<_>>()
                .join(", ");
            clauses.push(format!("ORDER BY {}", order));
        }

        if let Some(limit) = canvas.limit() {
            clauses.push(format!("LIMIT {}", limit));
        }

        CompileResult {
            soql: clauses.join(&self.config.clause_separator),
            diagnostics,
        }
    }

    /// Compile a condition list into WHERE-clause text (without the `WHERE` keyword).
    pub fn compile_conditions(&self, conditions: &[FilterCondition]) -> CompileResult {
        let mut diagnostics = Vec::new();
        let soql = self.compile_list(conditions, &mut diagnostics);
        CompileResult { soql, diagnostics }
    }

    /// Fold one sibling list. A join is printed only once something has been
    /// emitted in this list, so elided groups never leave an operator behind.
    fn compile_list(&self, conditions: &[FilterCondition], diagnostics: &mut Vec<Diagnostic>) -> String {
        let mut out = String::new();

        for condition in conditions {
            let Some(segment) = self.compile_node(condition, diagnostics) else {
                continue;
            };

            if out.is_empty() {
                if condition.logical_operator().is_some() {
                    tracing::debug!(id = condition.id(), "dropping join on leading condition");
                    diagnostics.push(Diagnostic::LeadingJoinDropped {
                        id: condition.id().to_string(),
                    });
                }
            } else {
                let join = match condition.logical_operator() {
                    Some(op) => op,
                    None => {
                        tracing::debug!(id = condition.id(), "defaulting missing join");
                        diagnostics.push(Diagnostic::MissingJoinDefaulted {
                            id: condition.id().to_string(),
                        });
                        self.config.default_join
                    }
                };
                out.push(' ');
                out.push_str(join.as_str());
                out.push(' ');
            }
            out.push_str(&segment);
        }

        out
    }

    fn compile_node(&self, condition: &FilterCondition, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
        match condition {
            FilterCondition::Leaf(leaf) => {
                if leaf.field.trim().is_empty() || leaf.value.trim().is_empty() {
                    tracing::debug!(id = %leaf.id, "skipping incomplete condition");
                    diagnostics.push(Diagnostic::IncompleteLeafSkipped { id: leaf.id.clone() });
                    return None;
                }
                Some(format!("{} {} {}", leaf.field, leaf.operator, leaf.value))
            }
            FilterCondition::Group(group) => {
                let inner = self.compile_list(&group.conditions, diagnostics);
                if inner.is_empty() {
                    tracing::debug!(id = %group.id, "eliding empty group");
                    diagnostics.push(Diagnostic::EmptyGroupElided { id: group.id.clone() });
                    None
                } else {
                    Some(format!("({})", inner))
                }
            }
        }
    }
}

/// Compile a condition list with the default configuration.
pub fn compile_where(conditions: &[FilterCondition]) -> String {
    SoqlCompiler::new().compile_conditions(conditions).soql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn leaf(id: &str, field: &str, operator: Operator, value: &str, join: Option<LogicalOperator>) -> FilterCondition {
        FilterCondition::Leaf(Leaf {
            id: id.to_string(),
            field: field.to_string(),
            operator,
            value: value.to_string(),
            logical_operator: join,
        })
    }

    fn group(id: &str, conditions: Vec<FilterCondition>, join: Option<LogicalOperator>) -> FilterCondition {
        FilterCondition::Group(Group {
            id: id.to_string(),
            conditions,
            logical_operator: join,
        })
    }

    #[test]
    fn test_empty_list_compiles_to_nothing() {
        assert_eq!(compile_where(&[]), "");
    }

    #[test]
    fn test_single_leaf() {
        let tree = vec![leaf("c1", "Name", Operator::Eq, "'Acme'", None)];
        assert_eq!(compile_where(&tree), "Name = 'Acme'");
    }

    #[test]
    fn test_two_leaves_joined_with_or() {
        let tree = vec![
            leaf("c1", "Name", Operator::Eq, "'Acme'", None),
            leaf("c2", "AnnualRevenue", Operator::Gt, "1000", Some(LogicalOperator::Or)),
        ];
        assert_eq!(compile_where(&tree), "Name = 'Acme' OR AnnualRevenue > 1000");
    }

    #[test]
    fn test_group_is_parenthesised() {
        let tree = vec![group(
            "g1",
            vec![leaf("c1", "Industry", Operator::Eq, "'Tech'", None)],
            None,
        )];
        assert_eq!(compile_where(&tree), "(Industry = 'Tech')");
    }

    #[test]
    fn test_nested_groups() {
        let tree = vec![
            leaf("c1", "Name", Operator::Like, "'Acme%'", None),
            group(
                "g2",
                vec![
                    leaf("c3", "Industry", Operator::In, "('Tech', 'Retail')", None),
                    group(
                        "g4",
                        vec![
                            leaf("c5", "IsDeleted", Operator::Eq, "false", None),
                            leaf("c6", "NumberOfEmployees", Operator::Gte, "50", Some(LogicalOperator::And)),
                        ],
                        Some(LogicalOperator::Or),
                    ),
                ],
                Some(LogicalOperator::And),
            ),
        ];
        assert_eq!(
            compile_where(&tree),
            "Name LIKE 'Acme%' AND (Industry IN ('Tech', 'Retail') OR (IsDeleted = false AND NumberOfEmployees >= 50))"
        );
    }

    #[test]
    fn test_empty_middle_group_is_elided() {
        let tree = vec![
            leaf("c1", "Name", Operator::Eq, "'Acme'", None),
            group("g2", vec![], Some(LogicalOperator::And)),
            leaf("c3", "Type", Operator::Eq, "'Customer'", Some(LogicalOperator::Or)),
        ];
        assert_eq!(compile_where(&tree), "Name = 'Acme' OR Type = 'Customer'");
    }

    #[test]
    fn test_empty_leading_group_drops_next_join() {
        let compiler = SoqlCompiler::new();
        let tree = vec![
            group("g1", vec![], None),
            leaf("c2", "Type", Operator::Eq, "'Customer'", Some(LogicalOperator::Or)),
        ];
        let result = compiler.compile_conditions(&tree);
        assert_eq!(result.soql, "Type = 'Customer'");
        assert_eq!(
            result.diagnostics,
            vec![
                Diagnostic::EmptyGroupElided { id: "g1".to_string() },
                Diagnostic::LeadingJoinDropped { id: "c2".to_string() },
            ]
        );
    }

    #[test]
    fn test_group_of_empty_groups_is_elided() {
        let tree = vec![group("g1", vec![group("g2", vec![], None)], None)];
        assert_eq!(compile_where(&tree), "");
    }

    #[test]
    fn test_missing_join_defaults_to_configured_operator() {
        let tree = vec![
            leaf("c1", "Name", Operator::Eq, "'A'", None),
            leaf("c2", "Name", Operator::Eq, "'B'", None),
        ];
        let result = SoqlCompiler::new().compile_conditions(&tree);
        assert_eq!(result.soql, "Name = 'A' AND Name = 'B'");
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::MissingJoinDefaulted { id: "c2".to_string() }]
        );

        let or_compiler = SoqlCompiler::with_config(CompilerConfig {
            default_join: LogicalOperator::Or,
            ..Default::default()
        });
        assert_eq!(
            or_compiler.compile_conditions(&tree).soql,
            "Name = 'A' OR Name = 'B'"
        );
    }

    #[test]
    fn test_not_join_is_a_prefix() {
        let tree = vec![
            leaf("c1", "Name", Operator::Eq, "'A'", None),
            leaf("c2", "Type", Operator::Eq, "'B'", Some(LogicalOperator::Not)),
        ];
        assert_eq!(compile_where(&tree), "Name = 'A' NOT Type = 'B'");
    }

    #[test]
    fn test_incomplete_leaf_is_skipped() {
        let tree = vec![
            leaf("c1", "", Operator::Eq, "'A'", None),
            leaf("c2", "Type", Operator::Eq, "'B'", Some(LogicalOperator::And)),
        ];
        let result = SoqlCompiler::new().compile_conditions(&tree);
        assert_eq!(result.soql, "Type = 'B'");
        assert_eq!(result.diagnostics[0], Diagnostic::IncompleteLeafSkipped { id: "c1".to_string() });
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let tree = vec![
            leaf("c1", "Name", Operator::Eq, "'Acme'", None),
            group("g2", vec![leaf("c3", "Type", Operator::NotEq, "'Partner'", None)], Some(LogicalOperator::Or)),
        ];
        assert_eq!(compile_where(&tree), compile_where(&tree));
    }

    #[test]
    fn test_full_canvas_rendering() {
        let mut canvas = QueryCanvas::new("Opportunity");
        canvas.set_fields(vec!["Id".to_string(), "Name".to_string(), "Amount".to_string()]);
        canvas.set_conditions(vec![
            leaf("c1", "StageName", Operator::NotIn, "('Closed Lost')", None),
            leaf("c2", "CloseDate", Operator::Eq, "THIS_QUARTER", Some(LogicalOperator::And)),
        ]);
        canvas.add_order("Amount", SortDirection::Desc);
        canvas.add_order("Name", SortDirection::Asc);
        canvas.set_limit(Some(25)).unwrap();

        let result = SoqlCompiler::new().compile(&canvas);
        assert_eq!(
            result.soql,
            "SELECT Id, Name, Amount\n\
             FROM Opportunity\n\
             WHERE StageName NOT IN ('Closed Lost') AND CloseDate = THIS_QUARTER\n\
             ORDER BY Amount DESC, Name ASC\n\
             LIMIT 25"
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_bare_canvas_selects_id() {
        let compiler = SoqlCompiler::with_config(CompilerConfig {
            clause_separator: " ".to_string(),
            ..Default::default()
        });
        let canvas = QueryCanvas::new("Account");
        assert_eq!(compiler.compile(&canvas).soql, "SELECT Id FROM Account");
    }
}
