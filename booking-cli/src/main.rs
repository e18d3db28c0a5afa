//! Booking CLI
//!
//! Command-line interface for the appointment payment API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use booking_client::BookingClient;
use booking_types::{AppointmentId, DoctorId, UserId, VerifyPaymentRequest};
use razorpay_gateway::signature::sign_payment;

#[derive(Parser)]
#[command(name = "booking")]
#[command(author, version, about = "Appointment payment API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the booking API
    #[arg(
        long,
        env = "BOOKING_API_URL",
        default_value = "http://localhost:4000"
    )]
    api_url: String,

    /// User JWT, sent in the `token` header
    #[arg(long, env = "BOOKING_TOKEN")]
    token: Option<String>,

    /// Admin JWT, sent in the `atoken` header
    #[arg(long, env = "BOOKING_ADMIN_TOKEN")]
    admin_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Create a payment order
    Order {
        /// Fee in rupees
        #[arg(long)]
        amount: f64,
    },
    /// Submit a checkout result for verification
    Verify {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        signature: String,
        /// Defaults to the user the token belongs to
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        doctor_id: Option<String>,
    },
    /// Compute a checkout signature locally
    Sign {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Appointment operations
    Appointment {
        #[command(subcommand)]
        action: AppointmentCommands,
    },
    /// Free slots for a doctor over the next week
    Slots {
        /// Doctor id
        doc_id: String,
    },
    /// List the verified payment ledger (admin)
    Payments,
}

#[derive(Subcommand)]
enum AppointmentCommands {
    /// Book a slot
    Book {
        #[arg(long)]
        doctor: String,
        /// Day key, e.g. 20_10_2026
        #[arg(long)]
        date: String,
        /// Time label, e.g. "10:30 AM"
        #[arg(long)]
        time: String,
    },
    /// List your appointments
    List,
    /// Cancel an appointment
    Cancel {
        /// Appointment ID (UUID)
        id: String,
    },
    /// Flag an appointment as paid
    MarkPaid {
        /// Appointment ID (UUID)
        id: String,
    },
}

fn parse_appointment_id(s: &str) -> Result<AppointmentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid appointment ID: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = BookingClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }
    if let Some(token) = cli.admin_token {
        client = client.with_admin_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Order { amount } => {
            let created = client.create_order(amount).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }

        Commands::Verify {
            order_id,
            payment_id,
            signature,
            user_id,
            doctor_id,
        } => {
            let req = VerifyPaymentRequest {
                order_id: Some(order_id),
                payment_id: Some(payment_id),
                signature: Some(signature),
                user_id: user_id.map(UserId::new),
                doctor_id: doctor_id.map(DoctorId::new),
            };
            let outcome = client.verify_payment(&req).await?;
            println!("✓ {}", outcome.message);
        }

        Commands::Sign {
            order_id,
            payment_id,
            secret,
        } => {
            println!("{}", sign_payment(&order_id, &payment_id, &secret));
        }

        Commands::Appointment { action } => match action {
            AppointmentCommands::Book { doctor, date, time } => {
                let outcome = client.book_appointment(&doctor, &date, &time).await?;
                println!("✓ {}", outcome.message);
            }
            AppointmentCommands::List => {
                let appointments = client.list_appointments().await?;
                println!("{}", serde_json::to_string_pretty(&appointments)?);
            }
            AppointmentCommands::Cancel { id } => {
                let outcome = client.cancel_appointment(parse_appointment_id(&id)?).await?;
                println!("✓ {}", outcome.message);
            }
            AppointmentCommands::MarkPaid { id } => {
                let outcome = client.mark_paid(parse_appointment_id(&id)?).await?;
                println!("✓ {}", outcome.message);
            }
        },

        Commands::Slots { doc_id } => {
            let days = client.doctor_slots(&doc_id).await?;
            for day in &days {
                let Some(first) = day.first() else {
                    continue;
                };
                let times: Vec<&str> = day.iter().map(|s| s.time.as_str()).collect();
                println!("{}: {}", first.datetime.date(), times.join(", "));
            }
        }

        Commands::Payments => {
            let payments = client.list_payments().await?;
            println!("{}", serde_json::to_string_pretty(&payments)?);
        }
    }

    Ok(())
}
