mod render;

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, AppContext, CsvUpload, EditField, EmployeeGateway, EmployeeListView,
    HttpEmployeeGateway, MutationOutcome,
};
use shared::{
    domain::EmployeeId,
    query::{self, QueryState, SortKey},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse and maintain the employee directory")]
struct Cli {
    /// Backend base URL; overrides hrboard.toml and API_URL.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Shared query string to start from, e.g. `minSalary=0&maxSalary=4000`.
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    min_salary: Option<f64>,
    #[arg(long)]
    max_salary: Option<f64>,
    #[arg(long)]
    offset: Option<u64>,
    #[arg(long)]
    limit: Option<u32>,
    /// `+field` or `-field`, one of id, login, name, salary.
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,
}

impl QueryArgs {
    fn resolve(&self) -> Result<QueryState> {
        let mut state = match &self.query {
            Some(raw) => query::decode(raw).context("invalid --query")?,
            None => QueryState::default(),
        };
        if let Some(v) = self.min_salary {
            state.min_salary = v;
        }
        if let Some(v) = self.max_salary {
            state.max_salary = v;
        }
        if let Some(v) = self.offset {
            state.offset = v;
        }
        if let Some(v) = self.limit {
            state.limit = v;
        }
        if let Some(raw) = &self.sort {
            let key = SortKey::parse(raw).with_context(|| format!("unknown sort key {raw}"))?;
            state = state.with_sort(key);
        }
        state.validate()?;
        Ok(state)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of employees.
    List {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Upload a CSV file of new employees.
    Upload { path: PathBuf },
    /// Delete employees by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Edit one employee on the selected page.
    Edit {
        id: String,
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        salary: Option<String>,
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    let ctx = AppContext::from_settings(&settings);
    let gateway: Arc<dyn EmployeeGateway> = Arc::new(
        HttpEmployeeGateway::from_settings(&settings).context("failed to build HTTP client")?,
    );
    info!(api_url = %settings.api_url, color_mode = ?ctx.color_mode, "admin client starting");

    let (view, outcome) = match cli.command {
        Command::List { query } => {
            let view = EmployeeListView::with_query(gateway, &settings, query.resolve()?);
            view.mount().await.context("failed to load employees")?;
            (view, None)
        }
        Command::Upload { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "employees.csv".to_string());

            let view = EmployeeListView::new(gateway, &settings);
            view.mount().await.context("failed to load employees")?;
            view.open_upload().await?;
            view.attach_csv(CsvUpload::new(filename, bytes)).await?;
            let outcome = view.confirm_dialog().await?;
            (view, Some(outcome))
        }
        Command::Delete { ids, yes } => {
            let view = EmployeeListView::new(gateway, &settings);
            view.mount().await.context("failed to load employees")?;
            view.select_rows(ids.into_iter().map(EmployeeId::new).collect())
                .await;
            view.request_delete_selected().await?;

            if !yes && !confirm_prompt(&ctx, &view).await? {
                view.cancel_dialog().await?;
                println!("nothing deleted");
                return Ok(());
            }
            let outcome = view.confirm_dialog().await?;
            (view, Some(outcome))
        }
        Command::Edit {
            id,
            login,
            name,
            salary,
            query,
        } => {
            let view = EmployeeListView::with_query(gateway, &settings, query.resolve()?);
            view.mount().await.context("failed to load employees")?;
            let id = EmployeeId::new(id);
            view.open_edit(&id)
                .await
                .with_context(|| format!("pass --query selecting the page that shows {id}"))?;
            for (field, value) in [
                (EditField::Login, login),
                (EditField::Name, name),
                (EditField::Salary, salary),
            ] {
                if let Some(value) = value {
                    view.edit_field(field, &value).await?;
                }
            }
            let outcome = view.confirm_dialog().await?;
            (view, Some(outcome))
        }
    };

    if let Some(dialog) = view.dialog_view().await {
        render::print_dialog(&ctx, &dialog);
        view.acknowledge().await?;
        println!();
    }
    let snapshot = view.snapshot().await;
    render::print_grid(&ctx, &snapshot.page, &snapshot.query);
    println!();
    println!("share: ?{}", view.encoded_query().await);

    if let Some(MutationOutcome {
        kind,
        succeeded: false,
    }) = outcome
    {
        bail!("{} request was not accepted by the server", kind.as_str());
    }
    Ok(())
}

/// Shows the open confirmation dialog and reads a yes/no answer from stdin.
async fn confirm_prompt(ctx: &AppContext, view: &EmployeeListView) -> Result<bool> {
    if let Some(dialog) = view.dialog_view().await {
        render::print_dialog(ctx, &dialog);
    }
    print!("> ");
    std::io::stdout().flush()?;
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await??;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
