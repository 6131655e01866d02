use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use models::user::{LoginForm, RegisterForm};
use models::{Id, Item, ItemDraft, PersonOrigin, Task, TaskDraft};
use service::navigation::LoggingNavigator;
use service::resources::Resource;
use service::{ApiClient, Dashboard, ResourceCollection, Tab};
use tracing::debug;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Event dashboard client: sign in and manage event tasks, items and people")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Prefill this email next time
        #[arg(long)]
        remember: bool,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
        /// Agree to the terms and conditions
        #[arg(long)]
        agree: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your events
    Events,
    /// Manage tasks of an event
    Tasks {
        #[command(flatten)]
        scope: Scope,
        #[command(subcommand)]
        action: Option<TaskAction>,
    },
    /// Manage the items of an event
    Items {
        #[command(flatten)]
        scope: Scope,
        #[command(subcommand)]
        action: Option<ItemAction>,
    },
    /// List event participants
    People {
        #[command(flatten)]
        scope: Scope,
    },
    /// Print client metrics in Prometheus text format
    Metrics,
}

#[derive(Args)]
struct Scope {
    /// Event id; defaults to your first event
    #[arg(long)]
    project: Option<Id>,
}

#[derive(Subcommand)]
enum TaskAction {
    List,
    Add {
        #[arg(long)]
        description: String,
        #[arg(long)]
        owner: String,
    },
    Edit {
        id: Id,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Flip completion
    Toggle { id: Id },
    Delete {
        id: Id,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        owner: String,
    },
    Edit {
        id: Id,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Flip completion
    Toggle { id: Id },
    Delete {
        id: Id,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn stdin_confirm(assume_yes: bool) -> impl Fn(&str) -> bool {
    move |prompt: &str| {
        if assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        io::stdin().read_line(&mut line).is_ok() && matches!(line.trim(), "y" | "Y" | "yes")
    }
}

fn task_line(t: &Task) -> String {
    format!("#{:<5} [{}] {} (owner: {})", t.id, t.status.as_str(), t.description, t.owner)
}

fn item_line(i: &Item) -> String {
    format!(
        "#{:<5} [{}] {} x{} @ {:.2} (owner: {})",
        i.id,
        i.status.as_str(),
        i.name,
        i.quantity,
        i.price,
        i.owner
    )
}

/// Mount the dashboard on `project` (or the default one) with `tab` active.
async fn open(client: &ApiClient, project: Option<Id>, tab: Tab) -> anyhow::Result<Dashboard> {
    let mut dash = Dashboard::mount(client.clone()).await?;
    if let Some(banner) = dash.banner() {
        anyhow::bail!("{banner}");
    }
    if dash.no_projects() {
        anyhow::bail!("You are not part of any event yet");
    }
    if let Some(id) = project {
        dash.select_project(id).await?;
    }
    dash.set_tab(tab).await?;
    Ok(dash)
}

fn check_loaded<R: Resource>(c: &ResourceCollection<R>) -> anyhow::Result<()> {
    match c.banner() {
        Some(banner) => anyhow::bail!("{banner}"),
        None => Ok(()),
    }
}

async fn toggle<R: Resource>(c: &mut ResourceCollection<R>, id: Id) -> anyhow::Result<R::Status> {
    Ok(c.toggle_status(id).await?)
}

async fn delete<R: Resource>(
    c: &mut ResourceCollection<R>,
    id: Id,
    yes: bool,
) -> anyhow::Result<()> {
    if c.remove(id, &stdin_confirm(yes)).await? {
        println!("Deleted {} {id}", R::SINGULAR);
    } else {
        println!("Cancelled");
    }
    Ok(())
}

async fn run_tasks(client: &ApiClient, scope: Scope, action: TaskAction) -> anyhow::Result<()> {
    let mut dash = open(client, scope.project, Tab::Tasks).await?;
    let tasks = dash.tasks_mut().ok_or_else(|| anyhow::anyhow!("tasks tab not mounted"))?;
    check_loaded(tasks)?;
    match action {
        TaskAction::List => {
            for t in tasks.entries() {
                println!("{}", task_line(t));
            }
        }
        TaskAction::Add { description, owner } => {
            let created = tasks.create(&TaskDraft { description, owner }).await?;
            println!("{}", task_line(&created));
        }
        TaskAction::Edit { id, description, owner } => {
            let draft = tasks.start_editing(id)?;
            if let Some(d) = description {
                draft.description = d;
            }
            if let Some(o) = owner {
                draft.owner = o;
            }
            let saved = tasks.save_edit().await?;
            println!("{}", task_line(&saved));
        }
        TaskAction::Toggle { id } => {
            let status = toggle(tasks, id).await?;
            println!("Task {id} is now {}", status.as_str());
        }
        TaskAction::Delete { id, yes } => delete(tasks, id, yes).await?,
    }
    Ok(())
}

async fn run_items(client: &ApiClient, scope: Scope, action: ItemAction) -> anyhow::Result<()> {
    let mut dash = open(client, scope.project, Tab::Items).await?;
    let items = dash.items_mut().ok_or_else(|| anyhow::anyhow!("items tab not mounted"))?;
    check_loaded(items)?;
    match action {
        ItemAction::List => {
            for i in items.entries() {
                println!("{}", item_line(i));
            }
        }
        ItemAction::Add { name, quantity, price, owner } => {
            let created = items.create(&ItemDraft { name, quantity, price, owner }).await?;
            println!("{}", item_line(&created));
        }
        ItemAction::Edit { id, name, quantity, price, owner } => {
            let draft = items.start_editing(id)?;
            if let Some(v) = name {
                draft.name = v;
            }
            if let Some(v) = quantity {
                draft.quantity = v;
            }
            if let Some(v) = price {
                draft.price = v;
            }
            if let Some(v) = owner {
                draft.owner = v;
            }
            let saved = items.save_edit().await?;
            println!("{}", item_line(&saved));
        }
        ItemAction::Toggle { id } => {
            let status = toggle(items, id).await?;
            println!("Item {id} is now {}", status.as_str());
        }
        ItemAction::Delete { id, yes } => delete(items, id, yes).await?,
    }
    Ok(())
}

async fn run_people(client: &ApiClient, scope: Scope) -> anyhow::Result<()> {
    let mut dash = open(client, scope.project, Tab::People).await?;
    let people = dash.people_mut().ok_or_else(|| anyhow::anyhow!("people tab not mounted"))?;
    if let Some(banner) = people.banner() {
        anyhow::bail!("{banner}");
    }
    for p in people.people() {
        let origin = match p.origin {
            PersonOrigin::Backend => "",
            PersonOrigin::Local => " (local)",
        };
        println!("#{:<5} {} <{}> {}{origin}", p.id, p.name, p.email, p.role);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let cfg = configs::AppConfig::load_and_validate()?;
    common::utils::logging::init_logging(cfg.logging.json);
    debug!(base_url = %cfg.api.base_url, "config loaded");

    if let Command::Metrics = cli.command {
        print!("{}", service::metrics::encode_metrics().map_err(anyhow::Error::msg)?);
        return Ok(());
    }

    let client = service::runtime::connect(&cfg, Arc::new(LoggingNavigator)).await?;
    let session = client.session().clone();

    match cli.command {
        Command::Login { email, password, remember } => {
            let form = LoginForm { email, password, remember_me: remember };
            let user = session.login_with(&form).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Register { username, email, password, confirm_password, agree } => {
            let form = RegisterForm {
                username,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                agreed_to_terms: agree,
            };
            let user = session.register_with(&form).await?;
            println!("Welcome, {}", user.name);
        }
        Command::Logout => {
            session.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match session.user() {
            Some(user) if session.is_authenticated() => println!("{} <{}>", user.name, user.email),
            _ => println!("Not signed in"),
        },
        Command::Events => {
            let dash = Dashboard::mount(client.clone()).await?;
            if let Some(banner) = dash.banner() {
                anyhow::bail!("{banner}");
            }
            if dash.no_projects() {
                println!("No events yet");
            }
            for p in dash.projects() {
                println!("#{:<5} {}", p.id, p.title);
            }
        }
        Command::Tasks { scope, action } => {
            run_tasks(&client, scope, action.unwrap_or(TaskAction::List)).await?
        }
        Command::Items { scope, action } => {
            run_items(&client, scope, action.unwrap_or(ItemAction::List)).await?
        }
        Command::People { scope } => run_people(&client, scope).await?,
        Command::Metrics => {}
    }

    if let Ok(text) = service::metrics::encode_metrics() {
        debug!(bytes = text.len(), "metrics snapshot");
    }
    Ok(())
}
