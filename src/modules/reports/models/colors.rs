// Shared color policy for the two export renderers.
//
// Both the document and the spreadsheet renderer must agree exactly on the
// status backgrounds and the overdue highlight, so the palette lives here
// and nowhere else.

use crate::modules::requests::models::RequestStatus;

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Six-digit uppercase hex without a leading `#`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Packed 0xRRGGBB value for the spreadsheet writer
    pub fn packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Unit-range channels for the document writer
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

pub const IN_PROGRESS: Rgb = Rgb::new(0xFE, 0xF3, 0xC7);
pub const PENDING_PRESALES: Rgb = Rgb::new(0xE5, 0xE7, 0xEB);
pub const PENDING_REVIEW: Rgb = Rgb::new(0xE9, 0xD5, 0xFF);
pub const PENDING_APPROVAL: Rgb = Rgb::new(0xFE, 0xD7, 0xAA);
pub const CLOSED: Rgb = Rgb::new(0xDC, 0xFC, 0xE7);
pub const DEFAULT: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

/// Highlight applied to the duration cell of overdue rows
pub const OVERDUE_HIGHLIGHT: Rgb = Rgb::new(0xFE, 0xCA, 0xCA);

/// Row background for a status; statuses outside the pipeline stay white
pub fn status_color(status: &RequestStatus) -> Rgb {
    match status {
        RequestStatus::InProgress => IN_PROGRESS,
        RequestStatus::PendingPresales => PENDING_PRESALES,
        RequestStatus::PendingReview => PENDING_REVIEW,
        RequestStatus::PendingApproval => PENDING_APPROVAL,
        RequestStatus::Closed => CLOSED,
        RequestStatus::Other(_) => DEFAULT,
    }
}

/// The color-guide rows every export ends with
pub fn legend() -> [(&'static str, Rgb); 6] {
    [
        ("Closed Request", CLOSED),
        ("Pending with Presales", PENDING_PRESALES),
        ("Pending review", PENDING_REVIEW),
        ("Pending approval", PENDING_APPROVAL),
        ("In Progress", IN_PROGRESS),
        ("Overdue (Duration)", OVERDUE_HIGHLIGHT),
    ]
}
