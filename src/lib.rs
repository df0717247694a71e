//! Receipt derivation and printable receipts for a physiotherapy and pilates practice
//!
//! This crate turns receipt form input into persisted [`Receipt`] records (totals, membership
//! dates, status and description derivation), reverses those records back into edit forms, and
//! produces a single-page A4 PDF of a receipt using a connection to headless chrome(ium).
//!
//! # Example
//!
//! ```rust
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use receipt_pdf::{PracticeIdentity, ReceiptBuilder, ReceiptStatus, ReceiptType, document};
//!
//! let receipt = ReceiptBuilder::default()
//!     .receipt_type(ReceiptType::Physiotherapy)
//!     .receipt_number("RCP-00001")
//!     .status(ReceiptStatus::Issued)
//!     .client_name("Asha Patel")
//!     .client_phone("98799 73439")
//!     .issue_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
//!     .amount(BigDecimal::from(1800))
//!     .build()
//!     .unwrap();
//! let printed = document::render(&receipt, &PracticeIdentity::default());
//! assert_eq!(printed.pages().len(), 1);
//! assert_eq!(document::share_filename(&receipt), "asha_patel_receipt_RCP-00001.pdf");
//! ```

pub mod client;
pub mod currency;
pub mod description;
pub mod document;
pub mod error;
pub mod filter;
pub mod form;
pub mod membership;
pub mod numbering;
pub mod practice;
pub mod pricing;
pub mod receipt;
pub mod service;
pub mod share;
pub mod stats;
pub mod status;
pub mod store;
pub mod template_env;
pub mod words;

use std::{
    net::TcpListener,
    process::{Child, Command, Stdio},
    thread,
    time::Duration,
};

use base64::{Engine, engine::general_purpose};
pub use client::{Client, ClientBuilder, ClientBuilderError};
pub use document::ReceiptDocument;
pub use error::Error;
pub use filter::ReceiptFilter;
pub use form::ReceiptForm;
pub use practice::{PracticeIdentity, PracticeIdentityBuilder, PracticeIdentityBuilderError};
pub use receipt::{
    MembershipType, PaymentMethod, Receipt, ReceiptBuilder, ReceiptBuilderError, ReceiptStatus,
    ReceiptType,
};
pub use service::ReceiptService;
pub use stats::{DashboardStats, ReceiptStats};
pub use store::{ClientStore, MemoryStore, ReceiptStore, SequenceSource};

use error::AddContext;
use fantoccini::{
    ClientBuilder as WebDriverBuilder,
    wd::{PrintConfigurationBuilder, PrintMargins, PrintSize},
};
use serde_json::Map;
use tracing::{error, info, warn};

use crate::template_env::{render_template, setup_template_env};

/// WebDriver address used when none is configured.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Starts ChromeDriver as a child process on `port`
///
/// # Returns
/// - [`Child`] if ChromeDriver successfully starts and the port is available
///
/// # Errors
/// - [`crate::Error`] if the chromedriver binary is not in the path, or if `port` is not
/// available, or if the chromedriver process fails to start for any other reason
pub fn start_chromedriver(port: u16) -> Result<Child, crate::Error> {
    if is_port_in_use(port) {
        return Err(crate::Error::from(format!("Port {port} is already in use"))
            .add_context("starting chromedriver"));
    }

    let mut child = Command::new("chromedriver")
        .arg(format!("--port={port}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(crate::Error::from)
        .add_context("spawning chromedriver")?;

    for _ in 0..100 {
        if is_port_in_use(port) {
            info!(port, "chromedriver listening");
            return Ok(child);
        }

        if child
            .try_wait()
            .map_err(crate::Error::from)
            .add_context("starting chromedriver")?
            .is_some()
        {
            return Err(
                crate::Error::from(String::from("Chromedriver has stopped unexpectedly"))
                    .add_context("starting chromedriver"),
            );
        }

        thread::sleep(Duration::from_millis(10));
    }

    if !is_port_in_use(port) {
        child
            .kill()
            .map_err(crate::Error::from)
            .add_context("stopping chromedriver")?;
        return Err(
            crate::Error::from(format!("Chromedriver failed to bind to port {port}"))
                .add_context("starting chromedriver"),
        );
    }

    Ok(child)
}

/// Check if a given port is currently in use
///
/// # Arguments
/// - `port` The port number to check
///
/// # Returns
/// - `true` if the TCP port is currently on use on the localhost
/// - `false` if the TCP port is not being used on localhost
fn is_port_in_use(port: u16) -> bool {
    TcpListener::bind(format!("localhost:{port}")).is_err()
}

async fn connect_to_client(
    webdriver_url: &str,
) -> Result<fantoccini::Client, fantoccini::error::NewSessionError> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        serde_json::json!({
            "args": ["--headless"]
        }),
    );
    WebDriverBuilder::native()
        .capabilities(caps)
        .connect(webdriver_url)
        .await
}

async fn print_html(client: &fantoccini::Client, html: &str) -> Result<Vec<u8>, crate::Error> {
    let encoded = general_purpose::STANDARD.encode(html.as_bytes());
    let data_url = format!("data:text/html;base64,{encoded}");
    client
        .goto(&data_url)
        .await
        .map_err(crate::Error::from)
        .add_context("navigating to address")
        .add_context("printing pdf")?;
    client
        .print(
            PrintConfigurationBuilder::default()
                .margins(PrintMargins {
                    top: 0.0,
                    left: 0.0,
                    right: 0.0,
                    bottom: 0.0,
                })
                .size(PrintSize::A4)
                .build()
                .map_err(crate::Error::from)
                .add_context("configuring printer")
                .add_context("printing pdf")?,
        )
        .await
        .map_err(crate::Error::from)
        .add_context("printing pdf")
}

async fn print_document(
    document: &ReceiptDocument,
    webdriver_url: &str,
) -> Result<Vec<u8>, crate::Error> {
    let template_env = setup_template_env()
        .map_err(crate::Error::from)
        .add_context("setting up templating environment")?;
    let render = render_template(&template_env, document)
        .map_err(crate::Error::from)
        .add_context("rendering html template")?;
    let client = connect_to_client(webdriver_url)
        .await
        .map_err(crate::Error::from)
        .add_context("connecting to client")?;
    let printed = print_html(&client, &render).await;
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close browser session");
    }
    printed
}

/// Generate a single-page PDF byte array from a [`Receipt`]
///
/// The receipt is laid out on A4, every page after the first is dropped, the remaining page is
/// rendered to HTML, and a headless browser at `webdriver_url` prints it as a PDF.
///
/// # Arguments
///
/// - `receipt`: Reference to the [`Receipt`] to render and print.
/// - `practice`: The practice identity printed in the header and signature.
/// - `webdriver_url`: Address of a running chromedriver, usually [`DEFAULT_WEBDRIVER_URL`].
///
/// # Returns
///
/// - The byte array representing the PDF if successful
///
/// # Errors
///
/// Returns `Err(crate::Error)` if any step fails:
/// - setting up the templating environment
/// - rendering the HTML template
/// - connecting to the headless browser
/// - navigating the browser to the generated data URL
/// - configuring the print job or printing to PDF
///
/// Nothing is returned on failure, so no partial artifact can be written.
pub async fn generate_pdf(
    receipt: &Receipt,
    practice: &PracticeIdentity,
    webdriver_url: &str,
) -> Result<Vec<u8>, crate::Error> {
    let document = document::render(receipt, practice);
    let result = print_document(&document, webdriver_url).await;
    match &result {
        Ok(pdf) => info!(
            number = receipt.receipt_number(),
            bytes = pdf.len(),
            "receipt pdf generated"
        ),
        Err(e) => error!(
            number = receipt.receipt_number(),
            error = %e,
            "receipt pdf generation failed"
        ),
    }
    result.add_context("generating pdf")
}
