use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use rc_core::domain::{
    layout_rows, project, FieldId, FieldSpec, FormRow, FormSession, RefereeToken,
    ReferenceBackend, ReferenceSubmission, RequestId, ResponseValue, StageDisplay, Template,
};
use rc_gateway::bootstrap;
use rc_gateway::config::AppConfig;
use rc_gateway::mock::MockGateway;

#[derive(Parser)]
#[command(name = "rc-ops", about = "QA and ops tooling for the reference-check gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the configuration file and exit.
    CheckConfig,
    /// Lint a template file (a template object or a bare structureJSON array).
    LintTemplate {
        file: PathBuf,
        /// Also print the paired two-column layout rows.
        #[arg(long)]
        preview: bool,
    },
    /// Show the lifecycle progress of one request.
    Status { request_id: String },
    /// Print a request's audit trail.
    Audit { request_id: String },
    /// Drive the full lifecycle against the in-memory mock backend.
    Smoke,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::CheckConfig => check_config(&cli.config),
        Command::LintTemplate { file, preview } => lint_template(&file, preview),
        Command::Status { request_id } => {
            let backend = connect(&cli.config)?;
            show_status(backend.as_ref(), &RequestId::new(request_id)).await
        }
        Command::Audit { request_id } => {
            let backend = connect(&cli.config)?;
            show_audit(backend.as_ref(), &RequestId::new(request_id)).await
        }
        Command::Smoke => smoke().await,
    }
}

fn connect(config_path: &Path) -> anyhow::Result<Arc<dyn ReferenceBackend>> {
    let config = AppConfig::from_file(config_path)
        .with_context(|| format!("reading config {}", config_path.display()))?;
    let runtime = bootstrap::into_runtime(config)?;
    bootstrap::init_tracing(&runtime);
    bootstrap::build_backend(&runtime)
}

// ---------------------------------------------------------------------------
// check-config
// ---------------------------------------------------------------------------

fn check_config(path: &Path) -> anyhow::Result<()> {
    let config = AppConfig::from_file(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    bootstrap::into_runtime(config)?;
    println!("{} {}", "Config valid:".green(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// lint-template
// ---------------------------------------------------------------------------

fn lint_template(path: &Path, preview: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading template {}", path.display()))?;

    // Builder exports are full template objects; older QA fixtures are bare
    // structureJSON arrays. Accept both.
    let template = match serde_json::from_str::<Template>(&content) {
        Ok(template) => template,
        Err(_) => {
            let fields: Vec<FieldSpec> = serde_json::from_str(&content)
                .context("file is neither a template object nor a field array")?;
            Template::new("tpl-file", path.display().to_string(), fields)
        }
    };

    if let Err(err) = template.validate() {
        eprintln!("{} {err}", "Invalid template:".red());
        std::process::exit(1);
    }

    if template.is_empty() {
        println!(
            "{}",
            "Template is valid but has no fields; it will render nothing.".yellow()
        );
        return Ok(());
    }

    println!(
        "{} {} ({} fields)",
        "Template valid:".green(),
        template.name,
        template.fields.len()
    );
    for field in &template.fields {
        let required = if field.required { "required" } else { "optional" };
        let conditional = match &field.conditional {
            Some(cond) => format!("  [when {} = {}]", cond.field, cond.equals),
            None => String::new(),
        };
        println!(
            "  {:<20} {:<10} {}{}",
            field.id.to_string(),
            format!("{:?}", field.field_type).to_lowercase(),
            required,
            conditional.dimmed()
        );
    }

    if preview {
        println!();
        for row in layout_rows(&template.fields) {
            match row {
                FormRow::Full(id) => println!("  | {id:<38} |"),
                FormRow::Half(left, Some(right)) => {
                    println!("  | {:<18} | {:<17} |", left.to_string(), right.to_string());
                }
                FormRow::Half(left, None) => {
                    println!("  | {:<18} | {:<17} |", left.to_string(), "");
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// status / audit
// ---------------------------------------------------------------------------

async fn show_status(backend: &dyn ReferenceBackend, request_id: &RequestId) -> anyhow::Result<()> {
    let requests = backend
        .get_my_requests()
        .await?;
    let request = requests
        .iter()
        .find(|r| &r.request_id == request_id)
        .ok_or_else(|| anyhow!("no request with id {request_id}"))?;

    println!(
        "{} — referee {} for candidate {}",
        request.request_id.to_string().bold(),
        request.referee_name,
        request.candidate_name
    );
    print_progress(&request.status, request.archived);

    if let Some(url) = &request.pdf_url {
        println!("sealed PDF: {url}");
    }
    Ok(())
}

fn print_progress(status: &str, archived: bool) {
    let projection = project(status, archived);
    let bar: Vec<String> = projection
        .stages()
        .map(|(stage, display)| match display {
            StageDisplay::Completed => format!("[x] {}", stage.label()).green().to_string(),
            StageDisplay::Active => format!("[*] {}", stage.label()).yellow().bold().to_string(),
            StageDisplay::Pending => format!("[ ] {}", stage.label()).dimmed().to_string(),
        })
        .collect();
    println!("{}", bar.join("  "));
    if archived {
        println!("{}", "(archived)".dimmed());
    }
}

async fn show_audit(backend: &dyn ReferenceBackend, request_id: &RequestId) -> anyhow::Result<()> {
    let events = backend
        .get_audit_trail(request_id)
        .await?;

    if events.is_empty() {
        println!("no audit events for {request_id}");
        return Ok(());
    }

    for event in events {
        let details = event.details.map(|d| format!(" — {d}")).unwrap_or_default();
        println!(
            "{}  {:<20} {}{}",
            event.timestamp.to_rfc3339().dimmed(),
            event.action,
            event.actor,
            details
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// smoke — end-to-end lifecycle against the mock backend
// ---------------------------------------------------------------------------

async fn smoke() -> anyhow::Result<()> {
    let backend = MockGateway::with_sample_data();
    let token = RefereeToken::new("tok-001");

    let view = backend
        .validate_referee_token(&token)
        .await?;
    println!(
        "{} request {} for candidate {}",
        "token valid:".green(),
        view.request_id,
        view.candidate_name
    );

    backend
        .authorize_consent(&token)
        .await?;
    println!("{}", "consent authorized".green());

    // Fill the form the way the referee portal would: through a session,
    // with the validator gating the submit.
    let template = Template::new("tpl-smoke", "Smoke run", view.fields.clone());
    let mut session = FormSession::new(template);
    session.set_response(
        &FieldId::new("q_relationship"),
        ResponseValue::text("Line manager"),
    );
    session.set_response(&FieldId::new("q_duration"), ResponseValue::text("3 years"));
    session.set_response(&FieldId::new("q_performance"), ResponseValue::Rating(4));
    session.set_response(&FieldId::new("q_rehire"), ResponseValue::Bool(true));
    let sig = FieldId::new("sig");
    session.set_signature_name(&sig, "Jane Doe");
    session.set_signature_ink(&sig, "data:image/png;base64,iVBORw0KGgo=");

    let responses = match session.submit() {
        Ok(responses) => responses,
        Err(blocked) => {
            for (id, message) in blocked.report.iter() {
                eprintln!("{} {id}: {message}", "validation:".red());
            }
            bail!("smoke form failed validation");
        }
    };
    backend
        .submit_reference(&ReferenceSubmission::form(token.clone(), responses))
        .await?;
    println!("{}", "reference submitted".green());

    let receipt = backend
        .seal_request(&view.request_id)
        .await?;
    println!(
        "{} {}",
        "sealed:".green(),
        receipt.pdf_url.as_deref().unwrap_or("(no PDF url)")
    );

    let requests = backend.get_my_requests().await?;
    if let Some(request) = requests.iter().find(|r| r.request_id == view.request_id) {
        print_progress(&request.status, request.archived);
    }

    show_audit(&backend, &view.request_id).await
}
