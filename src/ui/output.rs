use crate::ui::{Icons, theme};
use owo_colors::OwoColorize;

/// Row created
pub fn added(label: &str) {
    println!("{} {}", Icons::NEW, label.style(theme().created));
}

/// Row changed
pub fn updated(label: &str) {
    println!("{} {}", Icons::MOD, label.style(theme().changed));
}

/// Row or tree removed
pub fn deleted(label: &str) {
    println!("{} {}", Icons::DEL, label.style(theme().removed));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().created));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().removed));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(theme().label), value);
}

/// Placeholder line for an empty listing
pub fn empty(text: &str) {
    println!("{}", text.style(theme().placeholder));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().heading));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label), value);
}
