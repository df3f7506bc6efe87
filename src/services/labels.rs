//! A5 delivery note ("Bon de Livraison") rendering.
//!
//! One PDF per order: shop header, order reference and date, recipient and
//! contact blocks, shipping mode, signature lines. Coordinates are in
//! millimetres from the bottom-left corner of the page.

use crate::orders::view::CustomerInfo;
use chrono::Local;
use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};
use thiserror::Error;

const PAGE_WIDTH_MM: f32 = 148.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 15.0;

pub type LabelResult<T> = Result<T, LabelError>;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Failed to render shipping label: {message}")]
    Render { message: String },
}

impl From<LabelError> for crate::error::AppError {
    fn from(err: LabelError) -> Self {
        crate::error::AppError::upstream("Shipping label", err.to_string())
    }
}

impl From<printpdf::Error> for LabelError {
    fn from(err: printpdf::Error) -> Self {
        LabelError::Render {
            message: err.to_string(),
        }
    }
}

/// Render the delivery note for one order, dated today.
pub fn render_delivery_note(info: &CustomerInfo) -> LabelResult<Vec<u8>> {
    let date = Local::now().format("%d/%m/%Y").to_string();
    render_delivery_note_dated(info, &date)
}

/// Same as [`render_delivery_note`] with the printed date injected.
pub fn render_delivery_note_dated(info: &CustomerInfo, date: &str) -> LabelResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Bon de Livraison - {}", info.reference),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "label",
    );

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let layer = doc.get_page(page).get_layer(layer);

    // Header.
    let mut y = PAGE_HEIGHT_MM - 20.0;
    layer.use_text("L'Avenue 120", 20.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 10.0;
    layer.use_text("BON DE LIVRAISON", 14.0, Mm(MARGIN_MM), Mm(y), &bold);

    y -= 12.0;
    layer.use_text(
        format!("Référence : {}", info.reference),
        11.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );
    y -= 6.0;
    layer.use_text(
        format!("Date : {}", date),
        11.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );

    y -= 6.0;
    draw_rule(&layer, y);

    // Recipient block.
    y -= 10.0;
    layer.use_text("DESTINATAIRE", 12.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 7.0;
    layer.use_text(
        format!("{} {}", info.first_name, info.last_name),
        11.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );
    y -= 6.0;
    layer.use_text(&info.address, 11.0, Mm(MARGIN_MM), Mm(y), &regular);
    y -= 6.0;
    layer.use_text(
        format!("{} {}", info.postal_code, info.city),
        11.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );

    // Contact block.
    y -= 12.0;
    layer.use_text("CONTACT", 12.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 7.0;
    layer.use_text(
        format!("Email : {}", info.email),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );
    y -= 6.0;
    layer.use_text(
        format!("Téléphone : {}", info.phone),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );
    y -= 6.0;
    layer.use_text(
        format!("Pseudo TikTok : {}", info.tiktok_pseudo),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &regular,
    );

    // Shipping mode.
    y -= 12.0;
    layer.use_text("LIVRAISON", 12.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 7.0;
    layer.use_text(info.shipping_label(), 11.0, Mm(MARGIN_MM), Mm(y), &regular);

    // Signature lines.
    y -= 20.0;
    layer.use_text("Signature expéditeur :", 10.0, Mm(MARGIN_MM), Mm(y), &regular);
    layer.use_text("Signature destinataire :", 10.0, Mm(80.0), Mm(y), &regular);
    y -= 12.0;
    draw_line(&layer, MARGIN_MM, 60.0, y);
    draw_line(&layer, 80.0, PAGE_WIDTH_MM - MARGIN_MM, y);

    // Footer.
    layer.use_text(
        "L'Avenue 120 - Parfums de Luxe",
        8.0,
        Mm(MARGIN_MM),
        Mm(12.0),
        &regular,
    );

    doc.save_to_bytes().map_err(Into::into)
}

fn draw_rule(layer: &printpdf::PdfLayerReference, y: f32) {
    draw_line(layer, MARGIN_MM, PAGE_WIDTH_MM - MARGIN_MM, y);
}

fn draw_line(layer: &printpdf::PdfLayerReference, x_start: f32, x_end: f32, y: f32) {
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x_start), Mm(y)), false),
            (Point::new(Mm(x_end), Mm(y)), false),
        ],
        is_closed: false,
    });
}
