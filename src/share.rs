//! WhatsApp sharing of a generated receipt.

use crate::{
    currency::format_grouped,
    practice::PracticeIdentity,
    receipt::Receipt,
    status::{self, StatusView},
};

/// Reduce a phone number to the digits WhatsApp expects, assuming an Indian number.
///
/// Non-digits are dropped, a leading trunk `0` becomes the `91` country code, and a bare
/// ten-digit mobile number is prefixed with `91`.
pub fn normalize_phone(phone: &str) -> String {
    let mut digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix('0') {
        digits = format!("91{rest}");
    }
    if digits.len() == 10 {
        digits = format!("91{digits}");
    }
    digits
}

/// The message sent alongside a shared receipt.
pub fn share_message(receipt: &Receipt, practice: &PracticeIdentity) -> String {
    format!(
        "Hello {name},\n\
         \n\
         Your receipt from {practice} has been generated.\n\
         \n\
         📄 Receipt Details:\n\
         • Receipt No: {number}\n\
         • Date: {date}\n\
         • Amount: ₹{amount}\n\
         • Status: {status}\n\
         \n\
         Please find the PDF receipt attached.\n\
         \n\
         Thank you for choosing {practice}!\n\
         \n\
         Best regards,\n\
         {practitioner}",
        name = receipt.client_name(),
        practice = practice.practice_name,
        number = receipt.receipt_number(),
        date = receipt.issue_date().format("%d/%m/%Y"),
        amount = format_grouped(receipt.total_amount()),
        status = status::reverse(receipt.status(), StatusView::Document),
        practitioner = practice.practitioner_name,
    )
}

/// `https://wa.me/{phone}?text={message}` deep link opening a chat with `phone`.
///
/// The message is percent-encoded with every character outside `A-Z a-z 0-9 - _ . ~` escaped.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        normalize_phone(phone),
        urlencoding::encode(message)
    )
}

/// Deep link sharing `receipt` with its client.
pub fn receipt_link(receipt: &Receipt, practice: &PracticeIdentity) -> String {
    whatsapp_link(receipt.client_phone(), &share_message(receipt, practice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::tests::sample_receipt;

    #[test]
    fn phone_numbers_gain_the_country_code() {
        assert_eq!(normalize_phone("98799 73439"), "919879973439");
        assert_eq!(normalize_phone("09879973439"), "919879973439");
        assert_eq!(normalize_phone("+91 98799-73439"), "919879973439");
        assert_eq!(normalize_phone("12345"), "12345");
    }

    #[test]
    fn message_lists_the_receipt_details() {
        let message = share_message(&sample_receipt(), &PracticeIdentity::default());
        assert!(message.starts_with("Hello Asha Patel,\n\nYour receipt from CORE EDUCATE"));
        assert!(message.contains("• Receipt No: RCP-00001\n"));
        assert!(message.contains("• Date: 15/01/2026\n"));
        assert!(message.contains("• Amount: ₹1,800\n"));
        assert!(message.contains("• Status: Paid\n"));
        assert!(message.ends_with("Best regards,\nDr. Khushali Choksi"));
    }

    #[test]
    fn link_encodes_the_message() {
        let link = whatsapp_link("98799 73439", "Hi there, ₹1,800!");
        assert_eq!(
            link,
            "https://wa.me/919879973439?text=Hi%20there%2C%20%E2%82%B91%2C800%21"
        );
        let receipt_link = receipt_link(&sample_receipt(), &PracticeIdentity::default());
        assert!(receipt_link.starts_with("https://wa.me/919879973439?text=Hello%20Asha%20Patel%2C%0A%0A"));
    }
}
