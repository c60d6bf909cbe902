//! CLI wiring for the deal memo pipeline: text extraction → structured
//! extraction → merge → render. Stands at the ingestion/renderer boundary;
//! everything interesting lives in the library crates.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dealmemo_ai::{BackendConfig, FieldExtractor};
use dealmemo_core::{merge, ExtractionResult, FieldSchema, ManualFields};
use dealmemo_extract::{normalize_documents, RawDocument};
use dealmemo_render::{suggested_filename, MemoTemplate, DEFAULT_TEMPLATE_PATH};

#[derive(Parser)]
#[command(
    name = "dealmemo",
    version,
    about = "Turn SOWs and contracts into structured deal memos"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaVariant {
    DealTerms,
    ContactInfo,
}

impl SchemaVariant {
    fn schema(self) -> FieldSchema {
        match self {
            Self::DealTerms => FieldSchema::deal_terms(),
            Self::ContactInfo => FieldSchema::contact_info(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Extract structured fields from uploaded documents
    Extract {
        /// Statement of work document (.pdf or .docx)
        #[arg(long)]
        sow: Option<PathBuf>,

        /// Contract or quote document (.pdf or .docx)
        #[arg(long)]
        contract: Option<PathBuf>,

        /// Field schema variant to extract against
        #[arg(long, value_enum, default_value = "deal-terms")]
        schema: SchemaVariant,

        /// Reasoning backend base URL
        #[arg(
            long,
            env = "DEALMEMO_LLM_BASE_URL",
            default_value = "https://api.openai.com/v1"
        )]
        base_url: String,

        /// Reasoning backend API key
        #[arg(long, env = "DEALMEMO_LLM_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Model to extract with
        #[arg(long, env = "DEALMEMO_LLM_MODEL", default_value = "gpt-4o")]
        model: String,
    },

    /// Generate a deal memo .docx from extracted and manual fields
    Generate {
        /// Extraction result JSON, as produced by `extract`
        #[arg(long)]
        extracted: PathBuf,

        /// Manual fields JSON (deal_owner, department, budget_code, ...)
        #[arg(long)]
        manual: Option<PathBuf>,

        /// Field schema variant the extraction used
        #[arg(long, value_enum, default_value = "deal-terms")]
        schema: SchemaVariant,

        /// Template .docx with {{field}} placeholders
        #[arg(long, env = "DEAL_MEMO_TEMPLATE_PATH", default_value = DEFAULT_TEMPLATE_PATH)]
        template: PathBuf,

        /// Output path for the rendered memo
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            sow,
            contract,
            schema,
            base_url,
            api_key,
            model,
        } => {
            let config = BackendConfig::new(base_url, api_key, model);
            run_extract(sow, contract, schema.schema(), config).await
        }
        Command::Generate {
            extracted,
            manual,
            schema,
            template,
            output,
        } => run_generate(extracted, manual, schema.schema(), template, output),
    }
}

async fn run_extract(
    sow: Option<PathBuf>,
    contract: Option<PathBuf>,
    schema: FieldSchema,
    config: BackendConfig,
) -> anyhow::Result<()> {
    let mut documents = Vec::new();
    for (label, path) in [("sow", sow), ("contract", contract)] {
        if let Some(path) = path {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            documents.push(RawDocument::new(label, filename, bytes));
        }
    }
    anyhow::ensure!(
        !documents.is_empty(),
        "no documents supplied; pass --sow and/or --contract"
    );

    let text = normalize_documents(&documents)?;
    anyhow::ensure!(
        !text.trim().is_empty(),
        "no text could be extracted from the supplied documents"
    );

    let extractor = FieldExtractor::new(config)?;
    let result = extractor.extract_fields(&schema, &text).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_generate(
    extracted: PathBuf,
    manual: Option<PathBuf>,
    schema: FieldSchema,
    template: PathBuf,
    output: PathBuf,
) -> anyhow::Result<()> {
    let extracted: ExtractionResult = serde_json::from_str(
        &std::fs::read_to_string(&extracted)
            .with_context(|| format!("reading {}", extracted.display()))?,
    )
    .context("parsing extraction result JSON")?;

    let manual: ManualFields = match manual {
        Some(path) => serde_json::from_str(
            &std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?,
        )
        .context("parsing manual fields JSON")?,
        None => ManualFields::default(),
    };

    let record = merge(&schema, &extracted.fields, &manual.to_map())?;

    let template = MemoTemplate::open(&template)?;
    let bytes = template.render(&record)?;

    std::fs::write(&output, &bytes)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(
        path = %output.display(),
        suggested = %suggested_filename(&record),
        "deal memo written"
    );
    Ok(())
}
