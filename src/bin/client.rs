use std::env;

use clap::{Args, Parser, Subcommand};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

/// Front desk helper for the LuxeStay server
#[derive(Parser, Debug)]
#[command(name = "luxestay")]
#[command(about = "client cli used by hotel staff to interact with the server", version, long_about = None
)]
struct Cli {
    #[arg(long, help = "Server base url", default_value = "http://localhost:8080")]
    host: String,
    #[arg(long, help = "Session token, falls back to LUXESTAY_TOKEN")]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// sign in and print a session token
    #[command(arg_required_else_help = true)]
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// room related ops
    #[command(arg_required_else_help = true)]
    Rooms(RoomArgs),
    /// move a booking along, e.g. `booking bk_1 checked_out`
    #[command(arg_required_else_help = true)]
    Booking { id: String, status: String },
    /// record a payment against an invoice
    #[command(arg_required_else_help = true)]
    Pay {
        invoice: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "Credit Card")]
        method: String,
    },
    /// housekeeping tasks, optionally filtered by status
    Tasks {
        #[arg(long)]
        status: Option<String>,
    },
    /// occupancy grid for one month
    Calendar {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
}

#[derive(Debug, Args)]
struct RoomArgs {
    #[command(subcommand)]
    command: RoomCmds,
}

#[derive(Debug, Subcommand)]
enum RoomCmds {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        floor: Option<u32>,
    },
    #[command(arg_required_else_help = true)]
    Status { id: String, status: String },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
}

struct Api {
    client: Client,
    host: String,
    token: Option<String>,
}

impl Api {
    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.host.trim_end_matches('/'), path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Option<Value>, anyhow::Error> {
        let res = self.authed(req).send().await?;
        let status = res.status();
        let body = res.json::<Envelope>().await?;
        match (status, body.success) {
            (StatusCode::OK | StatusCode::CREATED, true) => Ok(body.data),
            (StatusCode::UNAUTHORIZED, _) => {
                println!("not signed in, run `luxestay login` and export LUXESTAY_TOKEN");
                Ok(None)
            }
            (status, _) => {
                println!("request failed ({}): {}", status, body.error.unwrap_or_default());
                Ok(None)
            }
        }
    }
}

fn print_calendar(calendar: &Value) {
    let Some(rows) = calendar["rows"].as_array() else {
        return;
    };
    for row in rows {
        let cells: String = row["cells"]
            .as_array()
            .map(|cells| {
                cells
                    .iter()
                    .map(|c| if c["bookingId"].is_string() { '#' } else { '.' })
                    .collect()
            })
            .unwrap_or_default();
        println!("{:>5} {}", row["roomNumber"].as_str().unwrap_or("?"), cells);
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let api = Api {
        client: Client::new(),
        host: args.host,
        token: args.token.or_else(|| env::var("LUXESTAY_TOKEN").ok()),
    };

    match args.command {
        Commands::Login { email, password } => {
            let req = api
                .client
                .post(api.url("auth/sign-in"))
                .json(&json!({ "email": email, "password": password }));
            if let Some(session) = api.send(req).await? {
                println!("{}", session["token"].as_str().unwrap_or_default());
            }
        }
        Commands::Rooms(rooms) => match rooms.command {
            RoomCmds::List { status, floor } => {
                let mut query = vec![];
                if let Some(status) = status {
                    query.push(("status", status));
                }
                if let Some(floor) = floor {
                    query.push(("floor", floor.to_string()));
                }
                let req = api.client.get(api.url("admin/rooms")).query(&query);
                if let Some(list) = api.send(req).await? {
                    for room in list["rooms"].as_array().into_iter().flatten() {
                        println!(
                            "{:>5}  {:<12} {:<20} {}",
                            room["roomNumber"].as_str().unwrap_or_default(),
                            room["status"].as_str().unwrap_or_default(),
                            room["roomTypeName"].as_str().unwrap_or_default(),
                            room["price"],
                        );
                    }
                    println!("occupancy {}%", list["stats"]["occupancyRate"]);
                }
            }
            RoomCmds::Status { id, status } => {
                let req = api
                    .client
                    .patch(api.url(&format!("admin/rooms/{id}/status")))
                    .json(&json!({ "status": status }));
                if api.send(req).await?.is_some() {
                    println!("room {} is now {}", id, status);
                }
            }
        },
        Commands::Booking { id, status } => {
            let req = api
                .client
                .patch(api.url(&format!("admin/bookings/{id}/status")))
                .json(&json!({ "status": status }));
            if let Some(booking) = api.send(req).await? {
                println!(
                    "booking {} is now {}",
                    booking["bookingNumber"].as_str().unwrap_or(&id),
                    status
                );
            }
        }
        Commands::Pay {
            invoice,
            amount,
            method,
        } => {
            let req = api
                .client
                .post(api.url(&format!("admin/invoices/{invoice}/payments")))
                .json(&json!({ "amount": amount, "method": method }));
            if let Some(invoice) = api.send(req).await? {
                println!(
                    "invoice {} is {}, balance {}",
                    invoice["id"].as_str().unwrap_or_default(),
                    invoice["status"].as_str().unwrap_or_default(),
                    invoice["balance"],
                );
            }
        }
        Commands::Tasks { status } => {
            let req = api
                .client
                .get(api.url("admin/housekeeping"))
                .query(&[("status", status.unwrap_or_default())]);
            if let Some(tasks) = api.send(req).await? {
                for task in tasks.as_array().into_iter().flatten() {
                    println!(
                        "{:>5}  {:<12} {:<14} {}",
                        task["roomNumber"].as_str().unwrap_or_default(),
                        task["status"].as_str().unwrap_or_default(),
                        task["taskType"].as_str().unwrap_or_default(),
                        task["assignedTo"].as_str().unwrap_or_default(),
                    );
                }
            }
        }
        Commands::Calendar { year, month } => {
            let mut query = vec![];
            if let (Some(year), Some(month)) = (year, month) {
                query.push(("year", year.to_string()));
                query.push(("month", month.to_string()));
            }
            let req = api.client.get(api.url("admin/availability")).query(&query);
            if let Some(calendar) = api.send(req).await? {
                print_calendar(&calendar);
            }
        }
    };
    Ok(())
}
