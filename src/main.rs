use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rentdesk::config::{ConfigError, ConsoleConfig};
use rentdesk::login::{self, Captcha, FormError, LoginForm};
use rentdesk::net::{ApiError, BackendClient, CustomerUpdate, NewCustomer, PaymentMode};
use rentdesk::route::{GateDecision, Route};
use rentdesk::session::{FileStore, SessionManager, SystemClock};
use rentdesk::views::bills::{DEFAULT_PER_PAGE, PER_PAGE_CHOICES};
use rentdesk::views::{
    BillQuery, BillRow, CustomerFormError, DashboardStats, Report, greeting, invoice_file_name, load_rows, paginate,
    sort_by_name, validate_new, validate_update,
};
use time::{OffsetDateTime, UtcOffset};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOGIN_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.display_message())]
    Api(#[from] ApiError),
    #[error("{0}")]
    Form(#[from] FormError),
    #[error("{0}")]
    CustomerForm(#[from] CustomerFormError),
    #[error("not signed in; redirected to {0}")]
    Redirected(Route),
    #[error("credential refresh failed; signed out")]
    RefreshFailed,
    #[error("bill {0} not found")]
    BillNotFound(String),
    #[error("rows per page must be 5, 10, 20 or 50")]
    PerPage,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "rentdesk", about = "Rental billing console")]
struct Cli {
    /// Backend base URL. Overrides `RENTDESK_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Directory holding the persisted session. Overrides `RENTDESK_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show who is signed in and when the session ends.
    Status,
    Login(LoginArgs),
    Logout,
    /// Swap the current token for a fresh one.
    Refresh,
    /// Show what a path would render for the current session.
    Route {
        path: String,
    },
    /// Print session changes until signed out.
    Watch,
    Dashboard,
    Report,
    Customers(CustomersCommand),
    Bills(BillsCommand),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "RENTDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct CustomersCommand {
    #[command(subcommand)]
    command: CustomersSubcommand,
}

#[derive(Subcommand, Debug)]
enum CustomersSubcommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },
    Update {
        customer_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Args, Debug)]
struct BillsCommand {
    #[command(subcommand)]
    command: BillsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BillsSubcommand {
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        month: String,
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Mark a bill paid.
    Pay {
        bill_id: String,
        #[arg(long)]
        mode: PaymentMode,
    },
    /// Send a payment request to the bill's customer.
    Request {
        bill_id: String,
    },
    Amount {
        bill_id: String,
        amount: f64,
    },
    /// Download the invoice PDF.
    Invoice {
        bill_id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Everything a command needs: the session, the backend client, and the
/// local UTC offset used for greetings.
struct Console {
    session: SessionManager,
    client: BackendClient,
    local_offset: UtcOffset,
}

// Single-threaded so the local offset can be read from the environment.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env()?.with_overrides(cli.api_url, cli.state_dir);
    info!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "console: starting");

    let client = BackendClient::new(&config.api_url, config.http_timeouts())?;
    let session = SessionManager::with_options(
        Arc::new(FileStore::new(config.state_dir.clone())),
        Arc::new(client.clone()),
        Arc::new(SystemClock),
        config.watchdog_lead(),
    );
    session.restore();

    let console = Console { session, client, local_offset };
    match cli.command {
        Command::Status => console.status(),
        Command::Login(args) => console.login(args).await,
        Command::Logout => {
            console.session.logout();
            println!("signed out");
            Ok(())
        }
        Command::Refresh => console.refresh().await,
        Command::Route { path } => {
            console.route(&path);
            Ok(())
        }
        Command::Watch => console.watch().await,
        Command::Dashboard => console.dashboard().await,
        Command::Report => console.report().await,
        Command::Customers(customers) => console.customers(customers.command).await,
        Command::Bills(bills) => console.bills(bills.command).await,
    }
}

impl Console {
    fn local_hour(&self) -> u8 {
        OffsetDateTime::now_utc().to_offset(self.local_offset).hour()
    }

    // -------------------------------------------------------------------------
    // session commands
    // -------------------------------------------------------------------------

    fn status(&self) -> Result<(), CliError> {
        let snapshot = self.session.snapshot();
        if !snapshot.authenticated {
            println!("not signed in");
            return Ok(());
        }
        let identity = snapshot.identity.unwrap_or_default();
        println!("{}", greeting(self.local_hour(), Some(&identity)));
        println!("  name:   {}", identity.display_name());
        println!("  email:  {}", identity.display_email());
        println!("  avatar: {}", identity.display_avatar());
        if let Some(credential) = snapshot.credential {
            println!("  expires at {}", credential.expires_at());
        }
        Ok(())
    }

    async fn login(&self, args: LoginArgs) -> Result<(), CliError> {
        if let GateDecision::Redirect(target) = self.session.gate(Route::Login.path()) {
            println!("already signed in; see {target}");
            return Ok(());
        }
        let password = match args.password {
            Some(password) => password,
            None => prompt("password: ")?,
        };

        let mut captcha = Captcha::generate();
        let mut attempt = 1;
        loop {
            println!("captcha: {}", captcha.code());
            let form = LoginForm {
                email: args.email.clone(),
                password: password.clone(),
                captcha_answer: prompt("enter the captcha: ")?,
            };
            match login::submit(&self.session, &form, &mut captcha).await {
                Ok(()) => break,
                Err(FormError::CaptchaMismatch) if attempt < LOGIN_ATTEMPTS => {
                    println!("{}", FormError::CaptchaMismatch);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        let identity = self.session.identity();
        println!("{}", greeting(self.local_hour(), identity.as_ref()));
        Ok(())
    }

    async fn refresh(&self) -> Result<(), CliError> {
        self.token_for(Route::Home)?;
        if !self.session.refresh_credential().await {
            return Err(CliError::RefreshFailed);
        }
        if let Some(credential) = self.session.snapshot().credential {
            println!("refreshed; expires at {}", credential.expires_at());
        }
        Ok(())
    }

    fn route(&self, path: &str) {
        match self.session.gate(path) {
            GateDecision::Render(route) => println!("render {route}"),
            GateDecision::Redirect(route) => println!("redirect {route}"),
        }
    }

    async fn watch(&self) -> Result<(), CliError> {
        let mut changes = self.session.subscribe();
        if !self.session.is_authenticated() {
            println!("not signed in");
            return Ok(());
        }
        if let Some(deadline) = self.session.watchdog_deadline() {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            println!("session ends in {}s", remaining.as_secs());
        }
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = changes.borrow_and_update().clone();
                    if !snapshot.authenticated {
                        println!("signed out");
                        break;
                    }
                    println!("session updated");
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // data screens
    // -------------------------------------------------------------------------

    async fn dashboard(&self) -> Result<(), CliError> {
        let token = self.token_for(Route::Home)?;
        let (customers, bills) =
            tokio::try_join!(self.client.list_customers(&token), self.client.list_bills(&token)).map_err(|e| self.rejected(e))?;
        let stats = DashboardStats::compute(&customers, &bills);
        println!("{}", greeting(self.local_hour(), self.session.identity().as_ref()));
        println!("Total Customers  {}", stats.customers);
        println!("Pending Bills    {}", stats.pending_bills);
        println!("Revenue          {:.2}", stats.revenue);
        Ok(())
    }

    async fn report(&self) -> Result<(), CliError> {
        let token = self.token_for(Route::Reports)?;
        let (customers, bills) =
            tokio::try_join!(self.client.list_customers(&token), self.client.list_bills(&token)).map_err(|e| self.rejected(e))?;
        let report = Report::compute(&customers, &bills);
        println!("Total Revenue     {:.2}", report.total_revenue);
        println!("Total Expenses    {:.2}", report.total_expenses);
        println!("Active Customers  {}", report.active_customers);
        println!("\nRevenue by month");
        for bucket in &report.revenue_by_month {
            println!("  {:<4} {:>12.2} {:>10.2}", bucket.month, bucket.revenue, bucket.expenses);
        }
        println!("\nNew customers by month");
        for bucket in &report.customer_growth {
            println!("  {:<4} {:>6}", bucket.month, bucket.customers);
        }
        Ok(())
    }

    async fn customers(&self, command: CustomersSubcommand) -> Result<(), CliError> {
        let token = self.token_for(Route::Customers)?;
        match command {
            CustomersSubcommand::List => {
                let mut customers = self.client.list_customers(&token).await.map_err(|e| self.rejected(e))?;
                sort_by_name(&mut customers);
                for c in &customers {
                    println!(
                        "{:<10} {:<24} {:<28} {:<14} {}",
                        c.customer_id.as_deref().unwrap_or("-"),
                        c.name,
                        c.email.as_deref().unwrap_or("-"),
                        c.phone.as_deref().unwrap_or("-"),
                        c.status.as_deref().unwrap_or("-"),
                    );
                }
                Ok(())
            }
            CustomersSubcommand::Add { name, email, phone, address } => {
                let customer = validate_new(NewCustomer { name, email, phone, address })?;
                let created = self.client.create_customer(&token, &customer).await.map_err(|e| self.rejected(e))?;
                println!("created {} ({})", created.name, created.customer_id.as_deref().unwrap_or("-"));
                Ok(())
            }
            CustomersSubcommand::Update { customer_id, name, email, phone, address, status } => {
                let update = validate_update(CustomerUpdate { name, email, phone, address, status })?;
                self.client
                    .update_customer(&token, &customer_id, &update)
                    .await
                    .map_err(|e| self.rejected(e))?;
                println!("updated {customer_id}");
                Ok(())
            }
        }
    }

    async fn bills(&self, command: BillsSubcommand) -> Result<(), CliError> {
        let token = self.token_for(Route::Bills)?;
        match command {
            BillsSubcommand::List { name, month, status, page, per_page } => {
                if !PER_PAGE_CHOICES.contains(&per_page) {
                    return Err(CliError::PerPage);
                }
                let rows = load_rows(&self.client, &token).await.map_err(|e| self.rejected(e))?;
                let query = BillQuery { name, month, status };
                let shown: Vec<BillRow> = query.apply(&rows).into_iter().cloned().collect();
                let page = paginate(&shown, page, per_page);
                for row in &page.items {
                    println!(
                        "{:<10} {:<24} {:<10} {:>10.2} {:<8} {}",
                        row.bill.bill_id,
                        row.customer_name().unwrap_or("-"),
                        row.bill.month,
                        row.bill.amount,
                        row.bill.status,
                        row.mode_label(),
                    );
                }
                println!("Page {} of {}", page.number, page.total_pages);
                if page.has_previous() {
                    println!("  previous: --page {}", page.number - 1);
                }
                if page.has_next() {
                    println!("  next: --page {}", page.number + 1);
                }
                Ok(())
            }
            BillsSubcommand::Pay { bill_id, mode } => {
                self.client
                    .create_payment(&token, &bill_id, mode)
                    .await
                    .map_err(|e| self.rejected(e))?;
                println!("bill {bill_id} marked paid ({mode})");
                Ok(())
            }
            BillsSubcommand::Request { bill_id } => {
                let row = self.find_row(&token, &bill_id).await?;
                self.client
                    .send_payment_request(&token, &bill_id)
                    .await
                    .map_err(|e| self.rejected(e))?;
                println!("Payment request sent to {}", row.customer_name().unwrap_or("customer"));
                Ok(())
            }
            BillsSubcommand::Amount { bill_id, amount } => {
                self.client
                    .update_bill_amount(&token, &bill_id, amount)
                    .await
                    .map_err(|e| self.rejected(e))?;
                println!("bill {bill_id} amount set to {amount:.2}");
                Ok(())
            }
            BillsSubcommand::Invoice { bill_id, out } => {
                let row = self.find_row(&token, &bill_id).await?;
                let bytes = self.client.download_invoice(&token, &bill_id).await.map_err(|e| self.rejected(e))?;
                let path = out.unwrap_or_else(|| {
                    PathBuf::from(invoice_file_name(row.customer_name().unwrap_or("customer"), &bill_id))
                });
                std::fs::write(&path, bytes)?;
                println!("saved {}", path.display());
                Ok(())
            }
        }
    }

    // -------------------------------------------------------------------------
    // helpers
    // -------------------------------------------------------------------------

    /// Pass the route gate for `route` and hand back the bearer token.
    fn token_for(&self, route: Route) -> Result<String, CliError> {
        match self.session.gate(route.path()) {
            GateDecision::Render(_) => self.session.bearer_token().ok_or(CliError::Redirected(Route::Login)),
            GateDecision::Redirect(target) => Err(CliError::Redirected(target)),
        }
    }

    /// A `401` means the backend no longer honours the session.
    fn rejected(&self, err: ApiError) -> CliError {
        if matches!(err, ApiError::Unauthorized { .. }) {
            warn!(error = %err, "console: backend rejected the session, signing out");
            self.session.logout();
        }
        CliError::Api(err)
    }

    async fn find_row(&self, token: &str, bill_id: &str) -> Result<BillRow, CliError> {
        let rows = load_rows(&self.client, token).await.map_err(|e| self.rejected(e))?;
        rows.into_iter()
            .find(|row| row.bill.bill_id == bill_id)
            .ok_or_else(|| CliError::BillNotFound(bill_id.to_owned()))
    }
}

fn prompt(label: &str) -> Result<String, CliError> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
