//! `qr-order` command line.
//!
//! Drives the same flows as the mobile client against a live backend: sign in, scan a
//! table code, fill the cart, check out, watch orders and serve them.

use clap::{Parser, Subcommand};
use qr_order::backend::{Backend, HttpBackend};
use qr_order::checkout::checkout;
use qr_order::config::load_settings;
use qr_order::lifecycle::{poll_once, setup_tracing, OrderPoller, OrderScope, OrderSystem};
use qr_order::auth::Role;
use qr_order::model::{Cart, CartCreate, MenuItemDraft, Order};
use qr_order::qr::{handle_scan, remember_location, QrOutcome};
use qr_order::storage::{FileStore, LocalStore, Session};
use qr_order::{admin, auth, feedback};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Instrument};

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "qr-order", version, about = "QR-menu restaurant ordering")]
struct Cli {
    /// Settings file; defaults to ./qr-order.toml
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account; sign in afterwards with `login`
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Register a restaurant admin instead of a customer
        #[arg(long)]
        admin: bool,
    },
    /// Forget the stored session
    Logout,
    /// Handle the contents of a scanned table QR code
    Scan {
        data: String,
        /// Table document id; read from the link when omitted
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        restaurant: Option<String>,
    },
    /// List a restaurant's menu
    Menu {
        #[arg(long)]
        restaurant: Option<String>,
    },
    #[command(subcommand)]
    Cart(CartCommand),
    /// Place the order for the current cart
    Checkout {
        /// Reference returned by the payment provider
        #[arg(long)]
        payment: String,
    },
    /// Show active orders: the kitchen's when signed in as admin, otherwise your own
    Orders {
        /// Keep polling and print every update
        #[arg(long)]
        watch: bool,
    },
    /// Mark an order served
    Serve { document_id: String },
    /// Edit your restaurant's menu
    #[command(subcommand)]
    MenuItem(MenuItemCommand),
    /// Create your restaurant's tables and their QR links
    Tables,
    /// Rate your latest served order, or dismiss the prompt
    Feedback {
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long, default_value = "")]
        comment: String,
        #[arg(long)]
        dismiss: bool,
    },
}

#[derive(clap::Args, Debug)]
struct MenuItemForm {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Minutes
    #[arg(long, default_value = "")]
    prep_time: String,
}

impl From<MenuItemForm> for MenuItemDraft {
    fn from(form: MenuItemForm) -> Self {
        MenuItemDraft {
            name: form.name,
            price: form.price,
            category: form.category,
            description: form.description,
            prep_time: form.prep_time,
        }
    }
}

#[derive(Subcommand, Debug)]
enum MenuItemCommand {
    Add(MenuItemForm),
    Edit {
        document_id: String,
        #[command(flatten)]
        form: MenuItemForm,
    },
    Delete { document_id: String },
}

#[derive(Subcommand, Debug)]
enum CartCommand {
    Show,
    /// Add one unit of a menu item
    Add {
        #[arg(long)]
        item: u64,
    },
    /// Set a line's quantity; 0 removes it
    Update {
        #[arg(long)]
        item: u64,
        #[arg(long, allow_hyphen_values = true)]
        quantity: i64,
    },
    Remove {
        #[arg(long)]
        item: u64,
    },
    Clear,
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:>4}  {:<24} {:>3} x {:>8.2} = {:>8.2}",
            line.item_id,
            line.name,
            line.quantity,
            line.unit_price,
            line.subtotal()
        );
    }
    println!("Total ({} items): {:.2}", cart.item_count(), cart.total());
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No active orders");
    }
    for order in orders {
        println!(
            "{:<24} {:<10} {:>3}%  total {:.2}  placed {}",
            order.document_id,
            order.status,
            order.progress_percent,
            order.total_price,
            order.created_at.format("%H:%M")
        );
    }
}

async fn order_scope(session: &Session) -> Result<OrderScope, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(restaurant) = session.restaurant().await? {
        return Ok(OrderScope::Restaurant {
            document_id: restaurant.document_id,
        });
    }
    match session.user().await? {
        Some(user) => Ok(OrderScope::Customer { user_id: user.id }),
        None => Err("Not signed in; run `qr-order login` first".into()),
    }
}

async fn run(cli: Cli) -> CliResult {
    let settings = load_settings(cli.config.as_deref());
    let store: Arc<dyn LocalStore> = Arc::new(FileStore::open(&settings.storage_path).await?);
    let session = Session::new(store.clone());
    let backend = HttpBackend::new(&settings.base_url).with_token(session.token().await?);
    let system = OrderSystem::new(store, settings.status_policy());

    match cli.command {
        Command::Login { email, password } => {
            let signed_in = auth::login(&backend, &session, &email, &password).await?;
            println!("Signed in as user {}", signed_in.user.id);
            if let Some(url) = signed_in.pending_menu_url {
                println!("Opening menu scanned before login: {url}");
                for item in backend.fetch_menu_from_link(&url).await? {
                    println!("{:>4}  {:<24} {:>8.2}", item.id, item.name, item.price);
                }
            }
        }
        Command::Signup {
            username,
            email,
            password,
            admin,
        } => {
            let role = if admin { Role::Admin } else { Role::Customer };
            auth::signup(&backend, &username, &email, &password, role).await?;
            println!("{} account created; sign in with `qr-order login`", role.as_str());
        }
        Command::Logout => {
            session.sign_out().await?;
            println!("Signed out");
        }
        Command::Scan {
            data,
            table,
            restaurant,
        } => {
            match (&restaurant, &table) {
                (Some(restaurant), Some(table)) => {
                    session.set_dining_location(restaurant, table).await?;
                }
                _ => {
                    if let Some((_, table)) = remember_location(&backend, &session, &data).await? {
                        println!("Ordering for table {table}");
                    }
                }
            }
            match handle_scan(&session, &data).await? {
                QrOutcome::OpenMenu(url) => {
                    for item in backend.fetch_menu_from_link(&url).await? {
                        println!("{:>4}  {:<24} {:>8.2}", item.id, item.name, item.price);
                    }
                }
                QrOutcome::LoginRequired => {
                    println!("Login required; the menu opens after `qr-order login`")
                }
            }
        }
        Command::Menu { restaurant } => {
            let restaurant = match restaurant {
                Some(r) => r,
                None => session
                    .dining_location()
                    .await?
                    .0
                    .ok_or("No restaurant selected; pass --restaurant or scan a table code")?,
            };
            for item in backend.fetch_menu(&restaurant).await? {
                println!(
                    "{:>4}  {:<24} {:>8.2}  {} min",
                    item.id,
                    item.name,
                    item.price,
                    item.prep_time_minutes.unwrap_or(qr_order::model::DEFAULT_PREP_MINUTES)
                );
            }
        }
        Command::Cart(command) => {
            let carts = &system.cart_client;
            let cart = carts.open(CartCreate::default()).await?;
            let updated = match command {
                CartCommand::Show => carts.cart(&cart).await?,
                CartCommand::Add { item } => {
                    let restaurant = session
                        .dining_location()
                        .await?
                        .0
                        .ok_or("No restaurant selected; scan a table code first")?;
                    let menu_item = backend
                        .fetch_menu(&restaurant)
                        .await?
                        .into_iter()
                        .find(|m| m.id == item)
                        .ok_or_else(|| format!("Item {item} is not on the menu"))?;
                    carts.add_to_cart(&cart, menu_item).await?
                }
                CartCommand::Update { item, quantity } => {
                    carts.update_quantity(&cart, item, quantity).await?
                }
                CartCommand::Remove { item } => carts.remove_from_cart(&cart, item).await?,
                CartCommand::Clear => carts.clear_cart(&cart).await?,
            };
            print_cart(&updated);
        }
        Command::Checkout { payment } => {
            let cart = system.cart_client.open(CartCreate::default()).await?;
            let receipt = checkout(&backend, &system.cart_client, &cart, &session, &payment).await?;
            println!(
                "Order {} placed: {} items, total {:.2}",
                receipt.order_document_id, receipt.items_created, receipt.total_price
            );
            if !receipt.skipped_item_ids.is_empty() {
                println!("Not linked to the menu: {:?}", receipt.skipped_item_ids);
            }
        }
        Command::Orders { watch } => {
            let scope = order_scope(&session).await?;
            if watch {
                let poller = OrderPoller::spawn(
                    Arc::new(backend.clone()),
                    system.order_client.clone(),
                    scope,
                    settings.poll_interval,
                );
                let mut updates = poller.subscribe();
                loop {
                    tokio::select! {
                        changed = updates.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let view = updates.borrow_and_update().clone();
                            if let Some(error) = &view.last_error {
                                eprintln!("Refresh failed: {error}");
                            }
                            print_orders(&view.orders);
                        }
                        _ = tokio::signal::ctrl_c() => break,
                    }
                }
                poller.stop();
            } else {
                let orders = poll_once(&backend, &system.order_client, &scope, chrono::Utc::now()).await?;
                print_orders(&orders);
            }
        }
        Command::Serve { document_id } => {
            admin::serve_order(&backend, &system.order_client, &document_id).await?;
            println!("Order {document_id} served");
        }
        Command::MenuItem(command) => {
            let restaurant = session
                .restaurant()
                .await?
                .ok_or("No restaurant profile; sign in as a restaurant admin")?;
            match command {
                MenuItemCommand::Add(form) => {
                    let draft: MenuItemDraft = form.into();
                    let item =
                        admin::save_menu_item(&backend, &restaurant.document_id, None, &draft).await?;
                    println!("Created {} ({})", item.name, item.document_id.unwrap_or_default());
                }
                MenuItemCommand::Edit { document_id, form } => {
                    let item = admin::save_menu_item(
                        &backend,
                        &restaurant.document_id,
                        Some(&document_id),
                        &MenuItemDraft::from(form),
                    )
                    .await?;
                    println!("Updated {}", item.name);
                }
                MenuItemCommand::Delete { document_id } => {
                    admin::delete_menu_item(&backend, &document_id).await?;
                    println!("Deleted {document_id}");
                }
            }
        }
        Command::Tables => {
            let restaurant = session
                .restaurant()
                .await?
                .ok_or("No restaurant profile; sign in as a restaurant admin")?;
            let provisioned =
                admin::provision_tables(&backend, backend.base_url(), &restaurant.document_id).await?;
            if !provisioned.regenerated {
                println!("Tables already exist");
            }
            for table in &provisioned.tables {
                println!(
                    "{:>3}  {}",
                    table.table_number,
                    table.qr_code_url.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Feedback {
            rating,
            comment,
            dismiss,
        } => {
            let user = session.user().await?.ok_or("Not signed in")?;
            let Some(order) = feedback::pending_feedback(&backend, &session, user.id).await? else {
                println!("Nothing to rate");
                return system.shutdown().await.map_err(Into::into);
            };
            match (rating, dismiss) {
                (_, true) => {
                    feedback::dismiss(&session, &order.document_id).await?;
                    println!("Prompt dismissed");
                }
                (Some(rating), false) => {
                    feedback::submit_feedback(&backend, &session, user.id, &order, rating, &comment)
                        .await?;
                    println!("Thanks for your feedback!");
                }
                (None, false) => println!("Order {} is waiting for your rating", order.document_id),
            }
        }
    }

    system.shutdown().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_tracing();
    let cli = Cli::parse();

    let span = tracing::info_span!("cli");
    match run(cli).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            info!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
