use clap::Parser;
use folio_press::adapters::server::{self, AppState};
use folio_press::adapters::{export, storage};
use folio_press::config::cli::{CheckArgs, Cli, Command, ExportArgs, RenderArgs, ServeArgs};
use folio_press::config::{AppConfig, LogFormat, DEFAULT_TEMPLATE_PATTERN};
use folio_press::core::injector::BindingOutcome;
use folio_press::domain::model::non_empty;
use folio_press::domain::ports::TemplateSource;
use folio_press::utils::error::{ErrorSeverity, Result};
use folio_press::utils::{logger, validation};
use folio_press::utils::validation::Validate;
use folio_press::{PortfolioRecord, TemplateInjector, TemplateLibrary};
use std::path::Path;
use std::sync::Arc;

const FALLBACK_TEMPLATE: &str = "template01";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // serve 依設定檔初始化日誌
    if !matches!(cli.command, Command::Serve(_)) {
        logger::init_cli_logger(cli.verbose);
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證參數
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Render(args) => render(args).await,
        Command::Check(args) => check(args).await,
        Command::Export(args) => export_bundle(args).await,
        Command::Serve(args) => serve(args, cli.verbose).await,
    };

    if let Err(e) = result {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ folio failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,      // 找不到模板或紀錄
            ErrorSeverity::Medium => 2,   // 上游錯誤，可重試
            ErrorSeverity::High => 1,     // 模板或設定錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

fn library(root: &Path) -> Result<TemplateLibrary> {
    let pattern = validation::compile_pattern("templates.id_pattern", DEFAULT_TEMPLATE_PATTERN)?;
    Ok(TemplateLibrary::new(root, pattern))
}

/// 命令列指定 > 紀錄中的 templateId > 預設模板
fn template_id_for(explicit: &Option<String>, record: &PortfolioRecord) -> String {
    non_empty(explicit)
        .or_else(|| non_empty(&record.template_id))
        .unwrap_or(FALLBACK_TEMPLATE)
        .to_string()
}

async fn render(args: &RenderArgs) -> Result<()> {
    let record = storage::read_record_file(&args.record).await?;
    let template_id = template_id_for(&args.template, &record);
    tracing::info!("🚀 Rendering {} with {}", args.record.display(), template_id);

    let template = library(&args.templates)?.load(&template_id).await?;
    let markup = TemplateInjector::new().render(&record, &template)?;

    match &args.output {
        Some(output) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(output, markup.as_str()).await?;
            tracing::info!("✅ Render completed successfully!");
            tracing::info!("📁 Output saved to: {}", output.display());
        }
        None => println!("{}", markup.as_str()),
    }
    Ok(())
}

async fn check(args: &CheckArgs) -> Result<()> {
    let record = match &args.record {
        Some(path) => storage::read_record_file(path).await?,
        None => PortfolioRecord::default(),
    };
    let template = library(&args.templates)?.load(&args.template).await?;
    let (_, report) = TemplateInjector::new().render_with_report(&record, &template)?;

    println!("📋 Template {}", report.template_id);
    for binding in &report.bindings {
        let status = match &binding.outcome {
            BindingOutcome::Bound { strategy, elements } => {
                format!("✅ bound via strategy #{} ({} element(s))", strategy, elements)
            }
            BindingOutcome::Placeholder { strategy, elements } => {
                format!("🖼️  placeholder via strategy #{} ({} element(s))", strategy, elements)
            }
            BindingOutcome::Hidden { strategy, elements } => {
                format!("🙈 hidden via strategy #{} ({} element(s))", strategy, elements)
            }
            BindingOutcome::Rendered { strategy, items } => {
                format!("✅ rendered via strategy #{} ({} item(s))", strategy, items)
            }
            BindingOutcome::Removed => "🗑️  removed (empty collection)".to_string(),
            BindingOutcome::Skipped => "⚠️  no insertion point".to_string(),
        };
        println!("  {:<20} {}", binding.name, status);
    }

    let skipped = report.skipped().count();
    println!(
        "{} binding(s), {} without an insertion point",
        report.bindings.len(),
        skipped
    );
    Ok(())
}

async fn export_bundle(args: &ExportArgs) -> Result<()> {
    let record = storage::read_record_file(&args.record).await?;
    let template_id = template_id_for(&args.template, &record);
    let template = library(&args.templates)?.load(&template_id).await?;
    let markup = TemplateInjector::new().render(&record, &template)?;

    export::write_bundle(&args.output, &markup, &record).await?;
    println!("✅ Export completed successfully!");
    println!("📁 Output saved to: {}", args.output.display());
    Ok(())
}

async fn serve(args: &ServeArgs, verbose: bool) -> Result<()> {
    let mut config = if args.config.exists() {
        AppConfig::from_file(&args.config)?
    } else {
        eprintln!(
            "💡 {} not found, using default configuration",
            args.config.display()
        );
        AppConfig::default()
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    match (config.logging.format, verbose) {
        (LogFormat::Json, _) => logger::init_json_logger(&config.logging.level),
        (LogFormat::Compact, true) => logger::init_cli_logger(true),
        (LogFormat::Compact, false) => logger::init_server_logger(&config.logging.level),
    }
    tracing::info!("Starting folio server");

    let client = config.http_client()?;
    let records = config.build_record_store(client)?;
    let templates = config.template_library()?;
    let state = Arc::new(AppState::new(
        records,
        templates,
        config.templates.default_template.clone(),
    ));

    let app = server::router(state, config.server.cors);
    let listener = server::bind(&format!("{}:{}", config.server.bind, config.server.port)).await?;
    server::serve(listener, app).await
}
