use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use soql_canvas::config::ObjectCatalog;
use soql_canvas::session::{Reply, Session};
use soql_canvas::soql_compiler::SoqlCompiler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CATALOG: &str = "soql_objects.json";

/// 加载对象目录，优先使用JSON配置，失败时使用内置示例目录
fn load_catalog() -> ObjectCatalog {
    let path = std::env::var("SOQL_CANVAS_CATALOG").unwrap_or_else(|_| DEFAULT_CATALOG.to_string());
    match ObjectCatalog::from_json_file(&path) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("{}，使用内置示例目录", e);
            ObjectCatalog::sample()
        }
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soql_canvas=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;

    println!("--- SOQL Query Canvas ---");
    println!("输入 `help` 查看命令, `quit` 退出\n");

    let mut session = Session::new(load_catalog(), SoqlCompiler::new());
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("soql> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match session.execute(line) {
                    Ok(Reply::Text(text)) => println!("{}", text),
                    Ok(Reply::Quit) => break,
                    Err(e) => println!("✗ {}", e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
