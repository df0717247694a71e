use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::Parser;
use receipt_pdf::{DEFAULT_WEBDRIVER_URL, PracticeIdentity, Receipt, error::AddContext};

fn read_until_eof() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

#[derive(Debug, Parser)]
#[command(version, about = "Print receipts as single-page A4 PDFs")]
pub struct Cli {
    /// Path to the JSON file with an array of receipts to print
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Path to the directory where PDF outputs should be saved
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Path to the JSON file with the practice identity
    #[arg(short, long, env = "RECEIPT_PDF_PRACTICE")]
    pub practice: Option<PathBuf>,

    /// Name PDFs for sharing with the client and print a WhatsApp link for each receipt
    #[arg(short, long)]
    pub share: bool,

    /// WebDriver to print with. A local chromedriver is started when this is left at the default
    #[arg(long, default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver: String,
}

impl Cli {
    pub fn get_receipts(&self) -> Result<Vec<Receipt>, receipt_pdf::Error> {
        let raw = match &self.data {
            Some(path) => fs::read_to_string(path)
                .map_err(receipt_pdf::Error::from)
                .add_context(&format!(
                    "reading receipt data from file '{}'",
                    path.to_string_lossy()
                ))?,
            None => read_until_eof()
                .map_err(receipt_pdf::Error::from)
                .add_context("reading receipt data from stdin")?,
        };

        serde_json::from_str(&raw)
            .map_err(receipt_pdf::Error::from)
            .add_context("parsing receipt JSON")
    }

    pub fn get_practice(&self) -> PracticeIdentity {
        PracticeIdentity::load_or_default(self.practice.as_deref())
    }

    /// `true` when the CLI has to run its own chromedriver.
    pub fn manages_chromedriver(&self) -> bool {
        self.webdriver == DEFAULT_WEBDRIVER_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_local_webdriver() {
        let cli = Cli::parse_from(["receipt-pdf-cli", "--data", "receipts.json"]);
        assert_eq!(cli.data, Some(PathBuf::from("receipts.json")));
        assert!(!cli.share);
        assert!(cli.manages_chromedriver());

        let remote = Cli::parse_from([
            "receipt-pdf-cli",
            "--share",
            "--webdriver",
            "http://selenium:4444",
        ]);
        assert!(remote.share);
        assert!(!remote.manages_chromedriver());
    }
}
