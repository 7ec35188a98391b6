//! Sample invoice configurations for testing and demonstration.

use crate::compose::{InvoiceDetails, LineItems};
use crate::engine::{InvoiceConfig, DEFAULT_LOGO_WIDTH};
use crate::style::Color;

/// The reference sales invoice: ten identical cover pages followed by the
/// customer/salesman detail header.
pub fn sample_invoice() -> InvoiceConfig {
    InvoiceConfig {
        file_name: "sales-invoice".to_string(),
        right_header: "OEC Computers Australia\n/ LEVEL 1 - 168 WALKER STREET".to_string(),
        title: "SALES INVOICE".to_string(),
        repeat_count: 10,
        details: InvoiceDetails {
            customer: "C20000 - Maxi Teq:".to_string(),
            invoice_number: "366".to_string(),
            invoice_date: "2/11/2017".to_string(),
            salesman: "Salesman 2 -".to_string(),
            phone: "0868603494".to_string(),
            tax_id: "79 933 596 217".to_string(),
        },
        logo: Some("logo_for_pdf.png".to_string()),
        logo_width: DEFAULT_LOGO_WIDTH,
        ..InvoiceConfig::default()
    }
}

/// A screening schedule long enough to span several pages, with caption and
/// column-header rows repeated on each.
pub fn sample_line_items(rows: usize) -> LineItems {
    LineItems {
        caption: "Day".to_string(),
        columns: [
            "Location",
            "Time",
            "Run Length",
            "Title",
            "Year",
            "Directors",
            "Countries",
        ]
        .map(String::from)
        .to_vec(),
        widths: vec![2.0, 1.0, 2.0, 5.0, 1.0, 3.0, 2.0],
        rows: (0..rows)
            .map(|i| {
                vec![
                    "1:1".to_string(),
                    "2h00".to_string(),
                    "600".to_string(),
                    format!("Feature {}", i + 1),
                    "2017".to_string(),
                    "Day".to_string(),
                    "Day".to_string(),
                ]
            })
            .collect(),
        banding: Some(Color::rgb(0.93, 0.93, 0.93)),
    }
}

/// [`sample_invoice`] with a line-items section appended.
pub fn sample_invoice_with_items(rows: usize) -> InvoiceConfig {
    InvoiceConfig {
        line_items: Some(sample_line_items(rows)),
        ..sample_invoice()
    }
}
