// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Laundry Admin CLI
//!
//! Operator console for the laundry back office: sign in, inspect and
//! update orders, browse customers, the service catalog and payments.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use laundry_admin::{
    config::Config,
    guard::{self, GuardDecision, Route},
    models::{OrderFilters, OrderStatus, PageRequest},
    services::{CatalogService, OrderService, PaymentService, UserService},
    telemetry::{init_logging, LogFormat},
    time_utils::format_utc_rfc3339,
    SessionManager,
};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "laundry-admin", about = "Laundry back-office admin console")]
struct Cli {
    /// Backend base URL (overrides API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LAUNDRY_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Request a password-reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Dashboard order and payment statistics
    Stats,
    Orders(OrdersCommand),
    Users(UsersCommand),
    Services(ServicesCommand),
    Payments(PaymentsCommand),
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

impl PageArgs {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page).with_limit(self.limit)
    }
}

#[derive(Args, Debug)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrdersSubcommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    SetStatus {
        id: String,
        status: OrderStatus,
        #[arg(long, default_value = "")]
        note: String,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long, default_value = "")]
        search: String,
    },
    Show {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ServicesCommand {
    #[command(subcommand)]
    command: ServicesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ServicesSubcommand {
    List,
    Show { id: String },
}

#[derive(Args, Debug)]
struct PaymentsCommand {
    #[command(subcommand)]
    command: PaymentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PaymentsSubcommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: String,
    },
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::from_env());

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let session = SessionManager::from_config(&config).context("Failed to configure API client")?;
    let session_state = session.boot().await;
    tracing::debug!(
        authenticated = session_state.is_authenticated,
        admin = session_state.is_admin,
        "Session resolved"
    );

    match cli.command {
        Command::Login { email, password } => {
            let Some(password) = password else {
                bail!("Password required (--password or LAUNDRY_ADMIN_PASSWORD)");
            };
            let user = session.login(&email, &password).await.map_err(|e| anyhow::anyhow!(e.message()))?;
            println!("Signed in as {} <{}> ({:?})", user.full_name, user.email, user.role);
            if !user.is_admin() {
                eprintln!("Warning: this account is not an admin; the dashboard will deny access.");
            }
        }
        Command::Logout => {
            session.logout();
            println!("Signed out");
        }
        Command::Whoami => match session.current_user() {
            Some(user) => {
                println!("{}", serde_json::to_string_pretty(&user)?);
                if let Some(expires_at) = session.expires_at() {
                    println!("Session expires {}", format_utc_rfc3339(expires_at));
                }
            }
            None => bail!("Not signed in"),
        },
        Command::ResetPassword { email } => {
            let message = session
                .reset_password(&email)
                .await
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            println!("{}", message);
        }
        Command::Stats => {
            require(&session, &Route::Dashboard)?;
            let orders = OrderService::new(session.clone()).dashboard_stats().await?;
            let payments = PaymentService::new(session.clone()).stats().await?;
            print_json(&serde_json::json!({ "orders": orders, "payments": payments }))?;
        }
        Command::Orders(cmd) => {
            let orders = OrderService::new(session.clone());
            match cmd.command {
                OrdersSubcommand::List {
                    page,
                    status,
                    search,
                } => {
                    require(&session, &Route::Orders)?;
                    let filters = OrderFilters { status, search };
                    print_json(&orders.list_admin(page.request(), &filters).await?)?;
                }
                OrdersSubcommand::Show { id } => {
                    require(&session, &Route::OrderDetails(id.clone()))?;
                    print_json(&orders.get(&id).await?)?;
                }
                OrdersSubcommand::SetStatus { id, status, note } => {
                    require(&session, &Route::OrderDetails(id.clone()))?;
                    orders.update_status(&id, status, &note).await?;
                    println!("Order {} status updated to {}", id, status.label());
                }
            }
        }
        Command::Users(cmd) => {
            let users = UserService::new(session.clone());
            match cmd.command {
                UsersSubcommand::List { page, search } => {
                    require(&session, &Route::Users)?;
                    print_json(&users.list(page.request(), &search).await?)?;
                }
                UsersSubcommand::Show { id } => {
                    require(&session, &Route::UserDetails(id.clone()))?;
                    print_json(&users.get(&id).await?)?;
                }
            }
        }
        Command::Services(cmd) => {
            require(&session, &Route::Services)?;
            let catalog = CatalogService::new(session.clone());
            match cmd.command {
                ServicesSubcommand::List => print_json(&catalog.list().await?)?,
                ServicesSubcommand::Show { id } => print_json(&catalog.get(&id).await?)?,
            }
        }
        Command::Payments(cmd) => {
            let payments = PaymentService::new(session.clone());
            match cmd.command {
                PaymentsSubcommand::List { page } => {
                    require(&session, &Route::Payments)?;
                    print_json(&payments.list(page.request(), &[]).await?)?;
                }
                PaymentsSubcommand::Show { id } => {
                    require(&session, &Route::PaymentDetails(id.clone()))?;
                    print_json(&payments.get(&id).await?)?;
                }
                PaymentsSubcommand::Stats => {
                    require(&session, &Route::Payments)?;
                    print_json(&payments.stats().await?)?;
                }
            }
        }
    }

    Ok(())
}

/// Apply the route guard before touching a protected endpoint.
fn require(session: &SessionManager, route: &Route) -> anyhow::Result<()> {
    match guard::admit(route, &session.snapshot()) {
        GuardDecision::Render => Ok(()),
        GuardDecision::RedirectToLogin => {
            bail!("Not signed in; run `laundry-admin login --email <email>` first")
        }
        GuardDecision::AccessDenied => {
            bail!("Access denied: you don't have permission to access the admin dashboard")
        }
        GuardDecision::Loading => bail!("Session is still being validated"),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
