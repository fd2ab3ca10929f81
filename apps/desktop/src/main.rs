use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, run_load, run_submission, ClassifierBackend, HttpClassifierClient, Level,
    LevelState, LoadRequest, SelectionController,
};
use flowchart::{DisplayList, FlowchartRenderer, RenderSummary};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Query the classification service without the desktop form")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    /// Per-request timeout; 0 disables it
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the phases offered for a project type
    Phases {
        #[arg(long)]
        project_type: String,
    },
    /// List the documents offered for a project type and phase
    Documents {
        #[arg(long)]
        project_type: String,
        #[arg(long)]
        project_phase: String,
    },
    /// Walk the full selection and print the result with its flowchart
    Classify {
        #[arg(long)]
        project_type: String,
        #[arg(long)]
        project_phase: String,
        #[arg(long)]
        document: String,
        #[arg(long)]
        amount: String,
        /// Surface width the flowchart is centered on
        #[arg(long, default_value_t = 600.0)]
        width: f32,
    },
}

struct ClassifyArgs<'a> {
    project_type: &'a str,
    project_phase: &'a str,
    document: &'a str,
    amount: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings()
        .context("failed to load classifier settings")?
        .with_cli_overrides(args.server_url, args.request_timeout_secs)?;
    let client = HttpClassifierClient::new(&settings)?;
    tracing::debug!(server_url = client.server_url(), "classifier client ready");

    match args.command {
        Command::Phases { project_type } => {
            for phase in client.load_phases(&project_type).await? {
                println!("{phase}");
            }
        }
        Command::Documents {
            project_type,
            project_phase,
        } => {
            for document in client
                .load_documents(&project_type, &project_phase)
                .await?
            {
                println!("{document}");
            }
        }
        Command::Classify {
            project_type,
            project_phase,
            document,
            amount,
            width,
        } => {
            let selection = ClassifyArgs {
                project_type: &project_type,
                project_phase: &project_phase,
                document: &document,
                amount: &amount,
            };
            let mut renderer = FlowchartRenderer::new(DisplayList::new(width));
            let (label, summary) =
                classify(&client, settings.project_types, &selection, &mut renderer).await?;

            println!("result: {label}");
            println!(
                "flowchart: {} boxes, {} connectors, height {}",
                summary.boxes, summary.connectors, summary.height
            );
            for op in renderer.surface().ops() {
                println!("  {op}");
            }
        }
    }

    Ok(())
}

async fn load_level(
    backend: &dyn ClassifierBackend,
    controller: &mut SelectionController,
    request: Option<LoadRequest>,
) -> Result<()> {
    let Some(request) = request else {
        return Ok(());
    };
    let level = request.ticket().level;
    let response = run_load(backend, request).await;
    match level {
        Level::ProjectPhase => controller.apply_phases(response.ticket, response.result),
        Level::DocumentName => controller.apply_documents(response.ticket, response.result),
        Level::ProjectType => false,
    };
    if let LevelState::Error { placeholder } = controller.level(level) {
        bail!("{level} options unavailable: {placeholder}");
    }
    Ok(())
}

/// Drives the selection levels in order, then submits and renders the reply.
async fn classify(
    backend: &dyn ClassifierBackend,
    project_types: Vec<String>,
    args: &ClassifyArgs<'_>,
    renderer: &mut FlowchartRenderer<DisplayList>,
) -> Result<(String, RenderSummary)> {
    let mut controller = SelectionController::new(project_types);

    let request = controller.change_project_type(args.project_type)?;
    load_level(backend, &mut controller, request).await?;
    let request = controller.change_project_phase(args.project_phase)?;
    load_level(backend, &mut controller, request).await?;
    controller.change_document_name(args.document)?;
    controller.set_amount(args.amount);

    let submission = controller.submit()?;
    let (ticket, result) = run_submission(backend, submission).await;
    let outcome = controller
        .apply_classification(ticket, result)
        .context("classification reply was superseded")?;
    let summary = renderer.render(outcome.steps.as_ref());
    if let Some(err) = outcome.error {
        tracing::warn!("{err}");
    }
    Ok((outcome.result_label, summary))
}
