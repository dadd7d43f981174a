use anstyle::{AnsiColor, Color, Style};

pub const HEADER: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Cyan)))
    .bold();

pub const USAGE: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Cyan)))
    .bold();

pub const LITERAL: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));

pub const PLACEHOLDER: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::White)))
    .dimmed();

pub fn get_clap_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(HEADER)
        .usage(USAGE)
        .literal(LITERAL)
        .placeholder(PLACEHOLDER)
}
