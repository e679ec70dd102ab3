use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use soql_canvas::ast::{FieldType, FilterCondition, LogicalOperator, Operator};
use soql_canvas::config::ObjectCatalog;
use soql_canvas::editor::ConditionEditor;
use soql_canvas::formatter::format_value;
use soql_canvas::session::Session;
use soql_canvas::soql_compiler::SoqlCompiler;
use std::hint::black_box;

// 创建带示例字段的编辑器
fn create_editor() -> ConditionEditor {
    let catalog = ObjectCatalog::sample();
    let (_, fields) = catalog.fields_of("Account").expect("示例目录包含 Account");
    ConditionEditor::new(fields.to_vec())
}

// 构建一棵指定宽度、每层带一个嵌套分组的条件树
fn build_tree(width: usize, depth: usize) -> Vec<FilterCondition> {
    let mut editor = create_editor();
    let mut root = Vec::new();
    let mut group_id: Option<String> = None;

    for level in 0..depth {
        for i in 0..width {
            let join = if i % 2 == 0 { LogicalOperator::And } else { LogicalOperator::Or };
            let value = format!("Acme {}-{}", level, i);
            root = match &group_id {
                None => editor.add_leaf(&root, "Name", Operator::Eq, &value, join),
                Some(id) => editor.add_leaf_in(&root, id, "Name", Operator::Eq, &value, join),
            }
            .expect("构建条件应该成功");
        }
        let before: Vec<String> = root.iter().map(|n| n.id().to_string()).collect();
        root = editor.add_group(&root, LogicalOperator::And);
        group_id = root
            .iter()
            .map(|n| n.id().to_string())
            .find(|id| !before.contains(id));
    }
    root
}

// 基准测试：值格式化性能
fn benchmark_formatter(c: &mut Criterion) {
    let test_cases = vec![
        ("string", FieldType::String, Operator::Eq, "O'Brien & Sons"),
        ("picklist_in", FieldType::Picklist, Operator::In, "Hot, Warm, Cold, Frozen, Tepid"),
        ("boolean", FieldType::Boolean, Operator::Eq, "TRUE"),
        ("date", FieldType::Date, Operator::Gt, "LAST_N_DAYS:30"),
    ];

    let mut group = c.benchmark_group("formatter_performance");

    for (name, field_type, operator, raw) in test_cases {
        group.bench_with_input(BenchmarkId::new("format_value", name), &raw, |b, &raw| {
            b.iter(|| black_box(format_value(field_type, operator, black_box(raw))))
        });
    }

    group.finish();
}

// 基准测试：WHERE 子句编译性能
fn benchmark_compiler(c: &mut Criterion) {
    let test_cases = vec![
        ("flat_5", build_tree(5, 1)),
        ("flat_50", build_tree(50, 1)),
        ("nested_10x5", build_tree(10, 5)),
    ];

    let compiler = SoqlCompiler::new();
    let mut group = c.benchmark_group("soql_compiler_performance");

    for (name, tree) in test_cases {
        group.bench_with_input(BenchmarkId::new("compile_conditions", name), &tree, |b, tree| {
            b.iter(|| black_box(compiler.compile_conditions(black_box(tree))))
        });
    }

    group.finish();
}

// 基准测试：完整的命令处理流程
fn benchmark_end_to_end(c: &mut Criterion) {
    let script = [
        "object Account",
        "select Id, Name, AnnualRevenue",
        "where Name like Acme%",
        "group or",
        "into g2 Industry in Technology, Retail, Energy",
        "into g2 and AnnualRevenue >= 1000000",
        "order AnnualRevenue desc",
        "limit 200",
        "show",
    ];

    c.bench_function("end_to_end_session", |b| {
        b.iter(|| {
            let mut session = Session::new(ObjectCatalog::sample(), SoqlCompiler::new());
            for line in script {
                black_box(session.execute(black_box(line)).expect("命令应该成功"));
            }
        })
    });
}

criterion_group!(benches, benchmark_formatter, benchmark_compiler, benchmark_end_to_end);
criterion_main!(benches);
