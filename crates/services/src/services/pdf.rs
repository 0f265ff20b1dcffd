//! PDF rendering of invoices and quotes.

use db::models::{
    client::Client,
    company::Company,
    invoice::InvoiceWithItems,
    quote::QuoteWithItems,
};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_H: f32 = 22.0;

const BODY_SIZE: f32 = 10.0;
const HEADER_SIZE: f32 = 11.0;
const TITLE_SIZE: f32 = 20.0;

/// Render an invoice as PDF bytes.
pub fn render_invoice(
    company: Option<&Company>,
    client: &Client,
    invoice: &InvoiceWithItems,
) -> Vec<u8> {
    let rows: Vec<[String; 4]> = invoice
        .items
        .iter()
        .map(|item| {
            [
                item.description.clone(),
                format_quantity(item.quantity),
                format_money(item.unit_price),
                format_money(item.amount),
            ]
        })
        .collect();

    let spec = DocumentSpec {
        title: "INVOICE",
        number: &invoice.number,
        date_lines: vec![
            format!("Issue date: {}", invoice.issue_date.format("%Y-%m-%d")),
            format!("Due date: {}", invoice.due_date.format("%Y-%m-%d")),
        ],
        rows,
        totals: TotalsBlock {
            subtotal: invoice.subtotal,
            tax_rate: invoice.tax_rate,
            tax_amount: invoice.tax_amount,
            total: invoice.total,
        },
        notes: invoice.notes.as_deref(),
    };

    DocumentWriter::new().render(company, client, &spec)
}

/// Render a quote as PDF bytes.
pub fn render_quote(
    company: Option<&Company>,
    client: &Client,
    quote: &QuoteWithItems,
) -> Vec<u8> {
    let rows: Vec<[String; 4]> = quote
        .items
        .iter()
        .map(|item| {
            [
                item.description.clone(),
                format_quantity(item.quantity),
                format_money(item.unit_price),
                format_money(item.amount),
            ]
        })
        .collect();

    let spec = DocumentSpec {
        title: "QUOTE",
        number: &quote.number,
        date_lines: vec![
            format!("Issue date: {}", quote.issue_date.format("%Y-%m-%d")),
            format!("Valid until: {}", quote.valid_until.format("%Y-%m-%d")),
        ],
        rows,
        totals: TotalsBlock {
            subtotal: quote.subtotal,
            tax_rate: quote.tax_rate,
            tax_amount: quote.tax_amount,
            total: quote.total,
        },
        notes: quote.notes.as_deref(),
    };

    DocumentWriter::new().render(company, client, &spec)
}

struct DocumentSpec<'a> {
    title: &'a str,
    number: &'a str,
    date_lines: Vec<String>,
    rows: Vec<[String; 4]>,
    totals: TotalsBlock,
    notes: Option<&'a str>,
}

struct TotalsBlock {
    subtotal: f64,
    tax_rate: f64,
    tax_amount: f64,
    total: f64,
}

fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Low-level page/object bookkeeping for a billing document.
struct DocumentWriter {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    bold_font_id: Ref,
    page_refs: Vec<Ref>,
    current_content_id: Option<Ref>,
    next_id: i32,
}

impl DocumentWriter {
    fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            bold_font_id,
            page_refs: Vec::new(),
            current_content_id: None,
            next_id: 5,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Content {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
            .contents(content_id);

        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(Name(b"F1"), self.font_id);
            fonts.pair(Name(b"F2"), self.bold_font_id);
        }

        self.current_content_id = Some(content_id);

        Content::new()
    }

    fn finalize_page(&mut self, content: Content) {
        if let Some(id) = self.current_content_id.take() {
            self.pdf.stream(id, &content.finish());
        }
    }

    fn draw_text(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        self.draw_text_with(content, b"F1", x, y, size, text);
    }

    fn draw_bold(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        self.draw_text_with(content, b"F2", x, y, size, text);
    }

    fn draw_text_with(
        &self,
        content: &mut Content,
        font: &[u8],
        x: f32,
        y: f32,
        size: f32,
        text: &str,
    ) {
        content.begin_text();
        content.set_font(Name(font), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(text.as_bytes()));
        content.end_text();
    }

    fn draw_row_borders(&self, content: &mut Content, y: f32, col_widths: &[f32]) {
        let mut x = MARGIN;
        content.save_state();
        content.set_stroke_rgb(0.65, 0.65, 0.65);
        for &w in col_widths {
            content.rect(x, y, w, ROW_H);
            content.stroke();
            x += w;
        }
        content.restore_state();
    }

    fn draw_item_row(
        &self,
        content: &mut Content,
        y: f32,
        col_widths: &[f32],
        row: &[String; 4],
        bold: bool,
    ) {
        let mut x = MARGIN;
        for (i, cell) in row.iter().enumerate() {
            if bold {
                self.draw_bold(content, x + 4.0, y + 7.0, HEADER_SIZE, cell);
            } else {
                self.draw_text(content, x + 4.0, y + 7.0, BODY_SIZE, cell);
            }
            x += col_widths[i];
        }
        self.draw_row_borders(content, y, col_widths);
    }

    fn render(
        mut self,
        company: Option<&Company>,
        client: &Client,
        spec: &DocumentSpec<'_>,
    ) -> Vec<u8> {
        let usable = PAGE_W - 2.0 * MARGIN;
        // Description takes whatever the three numeric columns leave over.
        let col_widths = [usable - 210.0, 60.0, 75.0, 75.0];
        let header_row = [
            "Description".to_string(),
            "Qty".to_string(),
            "Unit price".to_string(),
            "Amount".to_string(),
        ];

        let mut content = self.new_page();
        let mut y = self.draw_document_header(&mut content, company, client, spec);

        self.draw_item_row(&mut content, y, &col_widths, &header_row, true);
        y -= ROW_H;

        for row in &spec.rows {
            if y - ROW_H < MARGIN + 120.0 {
                // Continue the table on a fresh page.
                self.finalize_page(content);
                content = self.new_page();
                y = PAGE_H - MARGIN - ROW_H;
                self.draw_item_row(&mut content, y, &col_widths, &header_row, true);
                y -= ROW_H;
            }
            self.draw_item_row(&mut content, y, &col_widths, row, false);
            y -= ROW_H;
        }

        y -= 10.0;
        y = self.draw_totals(&mut content, y, &spec.totals);

        if let Some(notes) = spec.notes.filter(|n| !n.trim().is_empty()) {
            y -= 20.0;
            self.draw_bold(&mut content, MARGIN, y, BODY_SIZE, "Notes");
            y -= 14.0;
            self.draw_text(&mut content, MARGIN, y, BODY_SIZE, notes.trim());
        }

        if let Some(company) = company {
            self.draw_footer(&mut content, company);
        }

        self.finalize_page(content);

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
        drop(pages);

        self.pdf.finish()
    }

    /// Company block, title/number, client block and dates. Returns the y
    /// position where the items table starts.
    fn draw_document_header(
        &self,
        content: &mut Content,
        company: Option<&Company>,
        client: &Client,
        spec: &DocumentSpec<'_>,
    ) -> f32 {
        let top = PAGE_H - MARGIN;

        let mut y = top;
        if let Some(company) = company {
            self.draw_bold(content, MARGIN, y, HEADER_SIZE + 2.0, &company.name);
            y -= 14.0;
            for line in [
                company.address.as_deref(),
                company.city.as_deref(),
                company.email.as_deref(),
                company.phone.as_deref(),
            ]
            .into_iter()
            .flatten()
            {
                self.draw_text(content, MARGIN, y, BODY_SIZE, line);
                y -= 12.0;
            }
        }

        self.draw_bold(content, PAGE_W - MARGIN - 150.0, top, TITLE_SIZE, spec.title);
        self.draw_text(
            content,
            PAGE_W - MARGIN - 150.0,
            top - 18.0,
            HEADER_SIZE,
            spec.number,
        );
        let mut date_y = top - 36.0;
        for line in &spec.date_lines {
            self.draw_text(content, PAGE_W - MARGIN - 150.0, date_y, BODY_SIZE, line);
            date_y -= 12.0;
        }

        let mut client_y = (y - 30.0).min(top - 90.0);
        self.draw_bold(content, MARGIN, client_y, BODY_SIZE, "Billed to");
        client_y -= 14.0;
        self.draw_text(content, MARGIN, client_y, BODY_SIZE, &client.name);
        client_y -= 12.0;
        for line in [
            client.address.as_deref(),
            client.city.as_deref(),
            Some(client.email.as_str()),
        ]
        .into_iter()
        .flatten()
        {
            self.draw_text(content, MARGIN, client_y, BODY_SIZE, line);
            client_y -= 12.0;
        }

        client_y - 30.0
    }

    fn draw_totals(&self, content: &mut Content, y: f32, totals: &TotalsBlock) -> f32 {
        let label_x = PAGE_W - MARGIN - 210.0;
        let value_x = PAGE_W - MARGIN - 75.0;
        let mut y = y;

        self.draw_text(content, label_x, y, BODY_SIZE, "Subtotal");
        self.draw_text(content, value_x, y, BODY_SIZE, &format_money(totals.subtotal));
        y -= 14.0;

        self.draw_text(
            content,
            label_x,
            y,
            BODY_SIZE,
            &format!("Tax ({:.1}%)", totals.tax_rate),
        );
        self.draw_text(content, value_x, y, BODY_SIZE, &format_money(totals.tax_amount));
        y -= 16.0;

        self.draw_bold(content, label_x, y, HEADER_SIZE, "Total");
        self.draw_bold(content, value_x, y, HEADER_SIZE, &format_money(totals.total));
        y
    }

    fn draw_footer(&self, content: &mut Content, company: &Company) {
        let mut parts = Vec::new();
        if let Some(siret) = company.siret.as_deref() {
            parts.push(format!("SIRET {siret}"));
        }
        if let Some(vat) = company.vat_number.as_deref() {
            parts.push(format!("VAT {vat}"));
        }
        if let Some(iban) = company.iban.as_deref() {
            parts.push(format!("IBAN {iban}"));
        }
        if parts.is_empty() {
            return;
        }
        self.draw_text(content, MARGIN, MARGIN - 20.0, 8.0, &parts.join("  -  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.5), "1234.50");
        assert_eq!(format_money(0.0), "0.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.5), "2.50");
    }
}
