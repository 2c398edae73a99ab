//! Nivasity CLI - storefront account, cart, and order tools.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (session is persisted to .nivasity/session.json)
//! nv-cli auth login -e ada@unilag.edu.ng -p 'secret'
//!
//! # Browse materials
//! nv-cli materials list --search "csc 201"
//!
//! # Build a cart and check out at the hosted gateway
//! nv-cli cart add 5 --quantity 2
//! nv-cli cart checkout
//! nv-cli orders verify NIV-REF-1
//!
//! # Support tickets
//! nv-cli tickets open -s "Wrong material" -m "I got GST instead of CSC"
//! ```
//!
//! # Environment Variables
//!
//! - `NIVASITY_API_URL` - Backend base URL (default: production)
//! - `NIVASITY_SESSION_FILE` - Session file path (default: .nivasity/session.json)
//! - `NIVASITY_CART_FILE` - Cart file path (default: .nivasity/cart.json)

#![cfg_attr(not(test), forbid(unsafe_code))]
// User-facing output goes to stdout by design in this binary
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

use nivasity_core::{DepartmentId, MaterialId, OrderId, SchoolId, TicketId};

#[derive(Parser)]
#[command(name = "nv-cli")]
#[command(author, version, about = "Nivasity storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign-in, registration, and session management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse the materials store
    Materials {
        #[command(subcommand)]
        action: MaterialsAction,
    },
    /// Manage the local cart and check out
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Order history and payment verification
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Support tickets
    Tickets {
        #[command(subcommand)]
        action: TicketsAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Register a new account (an OTP is emailed to you)
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        password: String,
        /// School ID
        #[arg(long)]
        school: i64,
        /// Department ID
        #[arg(long)]
        department: i64,
        /// Admission (matriculation) number
        #[arg(long)]
        admission: String,
    },
    /// Verify the emailed one-time code and complete registration
    VerifyOtp {
        #[arg(short, long)]
        email: String,
        /// The one-time code from the email
        code: String,
    },
    /// Re-send the one-time code
    ResendOtp {
        #[arg(short, long)]
        email: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in profile
    Whoami,
}

#[derive(Subcommand)]
enum MaterialsAction {
    /// List materials
    List {
        /// Filter by school ID
        #[arg(long)]
        school: Option<i64>,
        /// Filter by department ID
        #[arg(long)]
        department: Option<i64>,
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one material
    Show {
        /// Material ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a material to the cart
    Add {
        /// Material ID
        id: i64,
        /// Number of copies
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a material from the cart
    Remove {
        /// Material ID
        id: i64,
    },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
    /// Push the cart to the backend and adopt the reconciled copy
    Sync,
    /// Open a hosted checkout session for the cart
    Checkout,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order with its items
    Show {
        /// Order ID
        id: i64,
    },
    /// Look up a payment by gateway reference
    Verify {
        /// Gateway reference from checkout
        reference: String,
    },
}

#[derive(Subcommand)]
enum TicketsAction {
    /// List your tickets
    List,
    /// Open a new ticket
    Open {
        /// Subject line
        #[arg(short, long)]
        subject: String,
        /// First message
        #[arg(short, long)]
        message: String,
    },
    /// Show a ticket's messages
    Show {
        /// Ticket ID
        id: i64,
    },
    /// Reply to a ticket
    Reply {
        /// Ticket ID
        id: i64,
        /// Reply text
        #[arg(short, long)]
        message: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&email, password).await?;
            }
            AuthAction::Register {
                first_name,
                last_name,
                email,
                phone,
                password,
                school,
                department,
                admission,
            } => {
                commands::auth::register(commands::auth::RegisterArgs {
                    first_name,
                    last_name,
                    email,
                    phone,
                    password,
                    school: SchoolId::new(school),
                    department: DepartmentId::new(department),
                    admission,
                })
                .await?;
            }
            AuthAction::VerifyOtp { email, code } => {
                commands::auth::verify_otp(&email, &code).await?;
            }
            AuthAction::ResendOtp { email } => {
                commands::auth::resend_otp(&email).await?;
            }
            AuthAction::Logout => commands::auth::logout().await?,
            AuthAction::Whoami => commands::auth::whoami().await?,
        },
        Commands::Materials { action } => match action {
            MaterialsAction::List {
                school,
                department,
                search,
                page,
            } => {
                commands::materials::list(
                    school.map(SchoolId::new),
                    department.map(DepartmentId::new),
                    search,
                    page,
                )
                .await?;
            }
            MaterialsAction::Show { id } => {
                commands::materials::show(MaterialId::new(id)).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Add { id, quantity } => {
                commands::cart::add(MaterialId::new(id), quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(MaterialId::new(id))?,
            CartAction::Show => commands::cart::show()?,
            CartAction::Clear => commands::cart::clear()?,
            CartAction::Sync => commands::cart::sync().await?,
            CartAction::Checkout => commands::cart::checkout().await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list().await?,
            OrdersAction::Show { id } => commands::orders::show(OrderId::new(id)).await?,
            OrdersAction::Verify { reference } => {
                commands::orders::verify(&reference).await?;
            }
        },
        Commands::Tickets { action } => match action {
            TicketsAction::List => commands::tickets::list().await?,
            TicketsAction::Open { subject, message } => {
                commands::tickets::open(&subject, &message).await?;
            }
            TicketsAction::Show { id } => {
                commands::tickets::show(TicketId::new(id)).await?;
            }
            TicketsAction::Reply { id, message } => {
                commands::tickets::reply(TicketId::new(id), &message).await?;
            }
        },
    }
    Ok(())
}
