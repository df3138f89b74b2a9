//! To maintain a theme of colors, I will add colors here as constants so
//! the output does not look bad at any point.
//!
//! - FERRUM_RED: Main Color
//! - FERRUM_GREY: Rejected rows and other secondary output

use colored::Color;

pub(crate) const FERRUM_RED: Color = Color::TrueColor {
    r: 255,
    g: 87,
    b: 87,
};

pub(crate) const FERRUM_GREY: Color = Color::TrueColor {
    r: 150,
    g: 150,
    b: 150,
};
