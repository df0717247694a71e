use minijinja::context;

use crate::document::{PAGE_HEIGHT_MM, PAGE_MARGIN_MM, PAGE_WIDTH_MM, ReceiptDocument};

const RECEIPT_TEMPLATE: &str = include_str!("../templates/receipt.html");

pub fn setup_template_env() -> Result<minijinja::Environment<'static>, minijinja::Error> {
    let mut env = minijinja::Environment::new();
    env.add_template("receipt.html", RECEIPT_TEMPLATE)?;
    Ok(env)
}

/// Render the pages of `document` to HTML. Each page is a fixed A4 sheet that hides anything
/// overflowing it.
pub fn render_template(
    env: &minijinja::Environment<'static>,
    document: &ReceiptDocument,
) -> Result<String, minijinja::Error> {
    let template = env.get_template("receipt.html")?;
    template.render(context! {
        pages => document.pages(),
        receipt_number => document.receipt_number(),
        page_width_mm => PAGE_WIDTH_MM,
        page_height_mm => PAGE_HEIGHT_MM,
        page_margin_mm => PAGE_MARGIN_MM,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::{ReceiptDocument, render},
        practice::PracticeIdentity,
        receipt::tests::sample_receipt,
    };

    #[test]
    fn renders_one_sheet_per_page() {
        let env = setup_template_env().unwrap();
        let document = render(&sample_receipt(), &PracticeIdentity::default());
        let html = render_template(&env, &document).unwrap();
        assert_eq!(html.matches("class=\"sheet\"").count(), 1);
        assert!(html.contains("<title>Receipt RCP-00001</title>"));
        assert!(html.contains("Asha Patel"));
        assert!(html.contains("Rs. 1,800.00"));
    }

    #[test]
    fn last_sheet_does_not_force_a_blank_page() {
        let env = setup_template_env().unwrap();
        let document = render(&sample_receipt(), &PracticeIdentity::default());
        let html = render_template(&env, &document).unwrap();
        assert!(html.contains(".sheet:last-child { page-break-after: auto; }"));
        assert!(html.contains("mm - 0.5mm);"));
        assert!(html.contains("break-inside: avoid;"));
        let after_sheet = &html[html.rfind("</div>").unwrap() + "</div>".len()..];
        let after_sheet: String = after_sheet.split_whitespace().collect();
        assert_eq!(after_sheet, "</body></html>");
    }

    #[test]
    fn text_is_escaped() {
        let mut practice = PracticeIdentity::default();
        practice.practice_name = String::from("<b>Core</b>");
        let env = setup_template_env().unwrap();
        let document = ReceiptDocument::layout(&sample_receipt(), &practice);
        let html = render_template(&env, &document).unwrap();
        assert!(!html.contains("<b>Core</b>"));
        assert!(html.contains("&lt;b&gt;Core"));
    }
}
