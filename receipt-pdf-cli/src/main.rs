use std::{io::Write, process::Child};

use clap::Parser;
use receipt_pdf::{
    PracticeIdentity, Receipt,
    document::{download_filename, share_filename},
    error::AddContext,
    generate_pdf, share, start_chromedriver,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

mod cli;

fn kill_chrome(chrome_process: &mut Option<Child>) -> Result<(), receipt_pdf::Error> {
    if let Some(process) = chrome_process {
        process
            .kill()
            .map_err(receipt_pdf::Error::from)
            .add_context("killing chromedriver process from cli")?;
    }
    Ok(())
}

async fn write_receipt_pdf(
    receipt: &Receipt,
    practice: &PracticeIdentity,
    cli: &Cli,
) -> Result<(), receipt_pdf::Error> {
    let data = generate_pdf(receipt, practice, &cli.webdriver)
        .await
        .add_context("generating pdf data from receipt")
        .add_context(&format!("receipt number: {}", receipt.receipt_number()))?;
    if cli.share {
        let link = share::receipt_link(receipt, practice);
        // stdout carries the pdf itself when there is no output directory
        if cli.out.is_some() {
            println!("{link}");
        } else {
            info!(number = receipt.receipt_number(), %link, "share link");
        }
    }
    match &cli.out {
        Some(out) => {
            let filename = if cli.share {
                share_filename(receipt)
            } else {
                download_filename(receipt)
            };
            let path = out.join(filename);
            if std::fs::write(&path, &data).is_err() {
                warn!(
                    number = receipt.receipt_number(),
                    path = %path.to_string_lossy(),
                    "failed to write receipt pdf, falling back to stdout"
                );
                write_receipt_pdf_to_stdout(&data)
            } else {
                info!(path = %path.to_string_lossy(), "receipt pdf written");
                Ok(())
            }
        }
        None => write_receipt_pdf_to_stdout(&data),
    }
}

fn write_receipt_pdf_to_stdout(data: &[u8]) -> Result<(), receipt_pdf::Error> {
    std::io::stdout()
        .write_all(data)
        .map_err(receipt_pdf::Error::from)
        .add_context("writing receipt pdf to stdout")?;
    std::io::stdout()
        .flush()
        .map_err(receipt_pdf::Error::from)
        .add_context("flushing stdout")
        .add_context("printing to stdout")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), receipt_pdf::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut chrome_process = if cli.manages_chromedriver() {
        Some(start_chromedriver(4444).add_context("starting chromedriver in cli")?)
    } else {
        None
    };
    let practice = cli.get_practice();
    let receipts = cli
        .get_receipts()
        .or_else(|e| {
            kill_chrome(&mut chrome_process)?;
            Err(e)
        })
        .add_context("deserializing receipts from cli")?;
    for receipt in receipts {
        if let Err(e) = write_receipt_pdf(&receipt, &practice, &cli).await {
            kill_chrome(&mut chrome_process)?;
            return Err(e);
        }
    }
    kill_chrome(&mut chrome_process)?;
    Ok(())
}
