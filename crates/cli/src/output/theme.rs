use colored::{ColoredString, Colorize};

const LABEL_WIDTH: usize = 16;

/// How a field value should read at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Bad,
}

impl Tone {
    pub fn from_ok(ok: bool) -> Self {
        if ok {
            Self::Good
        } else {
            Self::Bad
        }
    }

    fn paint(self, value: &str) -> ColoredString {
        match self {
            Self::Plain => value.normal(),
            Self::Good => value.green(),
            Self::Bad => value.red(),
        }
    }
}

pub fn print_title(title: &str) {
    println!();
    println!("  {}", title.bright_cyan().bold());
    println!("  {}", "═".repeat(title.chars().count()).cyan());
}

pub fn print_section(title: &str) {
    println!();
    println!("  {}", title.bold());
}

pub fn print_field(label: &str, value: &str) {
    print_field_toned(label, value, Tone::Plain);
}

pub fn print_field_toned(label: &str, value: &str, tone: Tone) {
    println!(
        "    {} {}",
        format!("{label:<LABEL_WIDTH$}").dimmed(),
        tone.paint(value)
    );
}
