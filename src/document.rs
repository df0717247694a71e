//! Fixed-layout receipt document.
//!
//! A receipt is laid out as a sequence of [`Line`]s of known height which are stacked onto A4
//! pages. Content that does not fit moves to the next page, splitting a section if necessary.
//! The printed artifact only ever carries the first page: [`ReceiptDocument::enforce_single_page`]
//! drops every later page instead of shrinking or reflowing the content, so anything that
//! overflowed is lost from the PDF.

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    currency::format_inr,
    membership::period_text,
    practice::PracticeIdentity,
    receipt::{Receipt, ReceiptStatus, ReceiptType},
    status::{self, StatusView},
    words::amount_in_words,
};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const PAGE_MARGIN_MM: f32 = 10.0;
const CONTENT_HEIGHT_MM: f32 = PAGE_HEIGHT_MM - 2.0 * PAGE_MARGIN_MM;

/// Characters that fit on a full-width line of body text
const TEXT_COLUMNS: usize = 100;
/// Characters that fit in the description column of a table
const CELL_COLUMNS: usize = 40;

const SERVICES: &str = "PHYSIOTHERAPY CLINIC AND PILATES STUDIO";

const COMMON_TERMS: [&str; 4] = [
    "Membership rates can be revised by the management.",
    "No membership is refundable.",
    "This receipt is valid for the services mentioned above only.",
    "Please carry this receipt for all future reference and appointments.",
];
const BUFFER_TERM: &str = "A buffer period of 7 days will be acceptable from the end date.";
const CONTACT_TERM: &str = "For any queries, please contact us at the provided contact information.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    ClientDetails,
    InvoiceDetails,
    Service,
    Payment,
    AmountInWords,
    CollectedBy,
    Terms,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Title,
    Subtitle,
    Heading,
    Field,
    Text,
    TableHeader,
    TableRow,
    Small,
    Gap,
}

impl LineKind {
    /// Vertical space the line takes on the page.
    pub fn height_mm(&self) -> f32 {
        match self {
            LineKind::Title => 9.0,
            LineKind::Subtitle => 5.0,
            LineKind::Heading => 7.0,
            LineKind::Field | LineKind::Text => 5.0,
            LineKind::TableHeader => 8.0,
            LineKind::TableRow => 6.0,
            LineKind::Small => 4.5,
            LineKind::Gap => 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub section: Section,
    pub kind: LineKind,
    pub height_mm: f32,
    pub cells: Vec<String>,
}

impl Line {
    fn new(section: Section, kind: LineKind, cells: Vec<String>) -> Line {
        Line {
            section,
            kind,
            height_mm: kind.height_mm(),
            cells,
        }
    }

    fn text(section: Section, kind: LineKind, text: impl Into<String>) -> Line {
        Line::new(section, kind, vec![text.into()])
    }

    fn field(section: Section, label: &str, value: impl Into<String>) -> Line {
        Line::new(section, LineKind::Field, vec![label.to_string(), value.into()])
    }

    fn gap(section: Section) -> Line {
        Line::new(section, LineKind::Gap, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<Line>,
}

impl Page {
    pub fn used_mm(&self) -> f32 {
        self.lines.iter().map(|l| l.height_mm).sum()
    }

    /// Every cell on the page joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .flat_map(|l| l.cells.iter())
            .filter(|c| !c.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Wrap `text` at word boundaries into lines of at most `width` characters. Words longer than a
/// line are split. Explicit line breaks are kept. Always yields at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let pieces = paragraph.split_whitespace().flat_map(|word| {
            let chars: Vec<char> = word.chars().collect();
            chars
                .chunks(width)
                .map(|c| c.iter().collect::<String>())
                .collect::<Vec<_>>()
        });
        for piece in pieces {
            let len = current.chars().count();
            if len == 0 {
                current = piece;
            } else if len + 1 + piece.chars().count() <= width {
                current.push(' ');
                current.push_str(&piece);
            } else {
                lines.push(std::mem::replace(&mut current, piece));
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Text of the service line on the document and in the payment table.
pub fn service_description(receipt: &Receipt) -> String {
    if let Some(description) = receipt.description().filter(|d| !d.is_empty()) {
        return description.to_string();
    }
    match (receipt.receipt_type(), receipt.membership_type()) {
        (ReceiptType::Physiotherapy, _) => String::from("Physiotherapy Treatment Session"),
        (ReceiptType::Pilates, Some(cadence)) => {
            let name = cadence.as_str();
            let mut chars = name.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            };
            format!("{capitalized} ({})", period_text(cadence))
        }
        (ReceiptType::Pilates, None) => String::from("Pilates Session"),
    }
}

/// The terms printed on a receipt of `receipt_type`, numbered.
pub fn terms(receipt_type: ReceiptType) -> Vec<String> {
    let mut clauses: Vec<&str> = COMMON_TERMS.to_vec();
    if receipt_type == ReceiptType::Physiotherapy {
        clauses.push(BUFFER_TERM);
    }
    clauses.push(CONTACT_TERM);
    clauses
        .iter()
        .enumerate()
        .map(|(i, clause)| format!("{}. {clause}", i + 1))
        .collect()
}

/// Table rows for one logical row whose `wrap_column` cell may span several lines.
fn table_rows(section: Section, cells: Vec<String>, wrap_column: usize) -> Vec<Line> {
    let wrapped = cells
        .get(wrap_column)
        .map(|c| wrap_text(c, CELL_COLUMNS))
        .unwrap_or_default();
    let mut rows = Vec::with_capacity(wrapped.len().max(1));
    for (i, text) in wrapped.into_iter().enumerate() {
        let row = if i == 0 {
            let mut first = cells.clone();
            first[wrap_column] = text;
            first
        } else {
            let mut continuation = vec![String::new(); cells.len()];
            continuation[wrap_column] = text;
            continuation
        };
        rows.push(Line::new(section, LineKind::TableRow, row));
    }
    rows
}

fn header(practice: &PracticeIdentity) -> Vec<Line> {
    let s = Section::Header;
    let mut lines = vec![
        Line::text(s, LineKind::Title, practice.practice_name.clone()),
        Line::text(s, LineKind::Subtitle, SERVICES),
    ];
    lines.extend(
        wrap_text(&practice.full_address(), TEXT_COLUMNS)
            .into_iter()
            .map(|l| Line::text(s, LineKind::Small, l)),
    );
    lines.push(Line::text(s, LineKind::Field, practice.practitioner_name.clone()));
    lines.extend(
        wrap_text(&practice.credentials, TEXT_COLUMNS)
            .into_iter()
            .map(|l| Line::text(s, LineKind::Small, l)),
    );
    lines.push(Line::text(s, LineKind::Small, practice.phone.clone()));
    if !practice.email.is_empty() {
        lines.push(Line::text(s, LineKind::Small, practice.email.clone()));
    }
    if !practice.registration_number.is_empty() {
        lines.push(Line::text(
            s,
            LineKind::Small,
            format!("Reg No. {}", practice.registration_number),
        ));
    }
    lines.push(Line::gap(s));
    lines
}

fn client_details(receipt: &Receipt) -> Vec<Line> {
    let s = Section::ClientDetails;
    let mut lines = vec![
        Line::text(s, LineKind::Heading, "Client Details"),
        Line::field(s, "Name:", receipt.client_name()),
    ];
    let address = receipt
        .client_address()
        .filter(|a| !a.is_empty())
        .unwrap_or("N/A");
    for (i, part) in wrap_text(address, TEXT_COLUMNS).into_iter().enumerate() {
        lines.push(Line::field(s, if i == 0 { "Address:" } else { "" }, part));
    }
    lines.push(Line::field(s, "Phone:", receipt.client_phone()));
    lines
}

fn invoice_details(receipt: &Receipt, status_label: &str) -> Vec<Line> {
    let s = Section::InvoiceDetails;
    vec![
        Line::text(s, LineKind::Heading, "Invoice Details"),
        Line::field(s, "Invoice Number:", receipt.receipt_number()),
        Line::field(
            s,
            "Invoice Date:",
            receipt.issue_date().format("%d/%m/%Y").to_string(),
        ),
        Line::field(
            s,
            "Invoice Time:",
            receipt.created_at().format("%I:%M %P").to_string(),
        ),
        Line::field(s, "Payment Status:", status_label),
        Line::gap(s),
    ]
}

fn service_table(receipt: &Receipt, service: &str) -> Vec<Line> {
    let s = Section::Service;
    let start = receipt.membership_start_date();
    let end = receipt.membership_end_date();

    let mut header = vec!["Qty".to_string(), "Description".to_string()];
    let mut row = vec!["1".to_string(), service.to_string()];
    if let Some(start) = start {
        header.push("Start Date".to_string());
        row.push(start.format("%d/%m/%Y").to_string());
    }
    if let Some(end) = end {
        header.push("End Date".to_string());
        row.push(end.format("%d/%m/%Y").to_string());
    }
    header.extend(["Amount", "Discount", "Total"].map(String::from));

    let discount = if receipt.amount() > receipt.total_amount() {
        format!("-{}", format_inr(&receipt.discount_implied()))
    } else {
        format_inr(&BigDecimal::from(0))
    };
    row.push(format_inr(receipt.amount()));
    row.push(discount);
    row.push(format_inr(receipt.total_amount()));

    let mut lines = vec![Line::new(s, LineKind::TableHeader, header)];
    lines.extend(table_rows(s, row, 1));
    if let Some(notes) = receipt.notes().filter(|n| !n.is_empty()) {
        let width = lines[0].cells.len();
        for text in wrap_text(notes, CELL_COLUMNS) {
            let mut continuation = vec![String::new(); width];
            continuation[1] = text;
            lines.push(Line::new(s, LineKind::TableRow, continuation));
        }
    }
    lines.push(Line::gap(s));
    lines
}

fn payment_table(receipt: &Receipt, service: &str) -> Vec<Line> {
    let s = Section::Payment;
    let total = format_inr(receipt.total_amount());
    let paid = if receipt.status() == ReceiptStatus::Issued {
        total.clone()
    } else {
        format_inr(&BigDecimal::from(0))
    };
    let mut lines = vec![
        Line::text(s, LineKind::Heading, "Payment Details"),
        Line::new(
            s,
            LineKind::TableHeader,
            ["Receipt No.", "Service", "Mode of Payment", "Total Amount"]
                .map(String::from)
                .to_vec(),
        ),
    ];
    lines.extend(table_rows(
        s,
        vec![
            receipt.receipt_number().to_string(),
            service.to_string(),
            receipt.payment_method().document_label().to_string(),
            total.clone(),
        ],
        1,
    ));
    lines.push(Line::new(s, LineKind::TableRow, vec!["Total".to_string(), total]));
    lines.push(Line::new(s, LineKind::TableRow, vec!["Paid".to_string(), paid]));
    lines.push(Line::gap(s));
    lines
}

fn amount_words(receipt: &Receipt) -> Vec<Line> {
    let s = Section::AmountInWords;
    let mut lines: Vec<Line> = wrap_text(&amount_in_words(receipt.total_amount()), TEXT_COLUMNS)
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            Line::field(s, if i == 0 { "Total Amount In Words:" } else { "" }, text)
        })
        .collect();
    lines.push(Line::gap(s));
    lines
}

fn collected_by(practice: &PracticeIdentity) -> Vec<Line> {
    let s = Section::CollectedBy;
    let mut lines = vec![
        Line::text(s, LineKind::Text, "Collected by:"),
        Line::text(s, LineKind::Field, practice.practitioner_name.clone()),
    ];
    lines.extend(
        wrap_text(&practice.credentials, TEXT_COLUMNS)
            .into_iter()
            .map(|l| Line::text(s, LineKind::Small, l)),
    );
    if !practice.registration_number.is_empty() {
        lines.push(Line::text(
            s,
            LineKind::Small,
            format!("Reg. No: {}", practice.registration_number),
        ));
    }
    lines.push(Line::gap(s));
    lines
}

fn terms_block(receipt_type: ReceiptType) -> Vec<Line> {
    let s = Section::Terms;
    let mut lines = vec![Line::text(s, LineKind::Heading, "Terms & Conditions:")];
    for clause in terms(receipt_type) {
        lines.extend(
            wrap_text(&clause, TEXT_COLUMNS)
                .into_iter()
                .map(|l| Line::text(s, LineKind::Small, l)),
        );
    }
    lines.push(Line::gap(s));
    lines
}

fn footer(practice: &PracticeIdentity) -> Vec<Line> {
    let s = Section::Footer;
    vec![
        Line::text(
            s,
            LineKind::Small,
            format!(
                "Thank you for choosing {} for your wellness journey!",
                practice.practice_name
            ),
        ),
        Line::text(
            s,
            LineKind::Small,
            "This is a computer-generated receipt and does not require a physical signature.",
        ),
    ]
}

/// Stack lines onto pages of the printable height. A gap never starts a page.
fn paginate(lines: Vec<Line>) -> Vec<Page> {
    let mut pages = vec![Page {
        number: 1,
        lines: Vec::new(),
    }];
    let mut used = 0.0;
    for line in lines {
        if used + line.height_mm > CONTENT_HEIGHT_MM && used > 0.0 {
            pages.push(Page {
                number: pages.len() + 1,
                lines: Vec::new(),
            });
            used = 0.0;
        }
        if used == 0.0 && line.kind == LineKind::Gap {
            continue;
        }
        used += line.height_mm;
        if let Some(page) = pages.last_mut() {
            page.lines.push(line);
        }
    }
    pages
}

/// A laid-out receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptDocument {
    receipt_number: String,
    receipt_type: ReceiptType,
    pages: Vec<Page>,
}

impl ReceiptDocument {
    /// Lay out every section of `receipt` across as many pages as the content needs.
    pub fn layout(receipt: &Receipt, practice: &PracticeIdentity) -> ReceiptDocument {
        let status_label = status::reverse(receipt.status(), StatusView::Document);
        let service = service_description(receipt);

        let mut lines = header(practice);
        lines.extend(client_details(receipt));
        lines.extend(invoice_details(receipt, status_label));
        lines.extend(service_table(receipt, &service));
        lines.extend(payment_table(receipt, &service));
        lines.extend(amount_words(receipt));
        lines.extend(collected_by(practice));
        lines.extend(terms_block(receipt.receipt_type()));
        lines.extend(footer(practice));

        let pages = paginate(lines);
        debug!(
            number = receipt.receipt_number(),
            pages = pages.len(),
            "laid out receipt document"
        );
        ReceiptDocument {
            receipt_number: receipt.receipt_number().to_string(),
            receipt_type: receipt.receipt_type(),
            pages,
        }
    }

    /// Drop every page after the first. Overflowing content is not reflowed.
    pub fn enforce_single_page(mut self) -> ReceiptDocument {
        if self.pages.len() > 1 {
            warn!(
                number = %self.receipt_number,
                dropped = self.pages.len() - 1,
                "receipt overflowed one page, dropping the rest"
            );
            self.pages.truncate(1);
        }
        self
    }

    pub fn receipt_number(&self) -> &str {
        &self.receipt_number
    }

    pub fn receipt_type(&self) -> ReceiptType {
        self.receipt_type
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }
}

/// Lay out `receipt` and keep only its first page, as printed.
pub fn render(receipt: &Receipt, practice: &PracticeIdentity) -> ReceiptDocument {
    ReceiptDocument::layout(receipt, practice).enforce_single_page()
}

/// Filename offered when the PDF is downloaded, e.g. `Receipt_RCP-00001.pdf`.
pub fn download_filename(receipt: &Receipt) -> String {
    format!("Receipt_{}.pdf", receipt.receipt_number())
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lowercase a client name and reduce it to `[a-z0-9_]` for use in a filename.
///
/// The name is trimmed before anything is stripped, so whitespace left next to a stripped
/// character survives as an underscore: `"Ravi ."` becomes `ravi_`.
pub fn normalize_client_name(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    WHITESPACE_RUN.replace_all(&kept, "_").into_owned()
}

/// Filename used when the PDF is shared with the client, e.g.
/// `asha_patel_receipt_RCP-00001.pdf`.
pub fn share_filename(receipt: &Receipt) -> String {
    format!(
        "{}_receipt_{}.pdf",
        normalize_client_name(receipt.client_name()),
        receipt.receipt_number()
    )
}
