use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles keyed by what a message reports, not by color.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Created rows and completed commands
    pub created: Style,
    /// Changed rows
    pub changed: Style,
    /// Removed rows and failures
    pub removed: Style,
    pub heading: Style,
    pub label: Style,
    /// Empty listings
    pub placeholder: Style,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        if !colored {
            let none = Style::new();
            return Self {
                created: none,
                changed: none,
                removed: none,
                heading: none,
                label: none,
                placeholder: none,
            };
        }
        Self {
            created: Style::new().green().bold(),
            changed: Style::new().yellow(),
            removed: Style::new().red().bold(),
            heading: Style::new().cyan().bold(),
            label: Style::new().dimmed(),
            placeholder: Style::new().bright_black().italic(),
        }
    }

    /// Honors `NO_COLOR`/`CLICOLOR` and stays plain when stdout is piped.
    fn detect() -> Self {
        Self::new(console::Term::stdout().is_term() && console::colors_enabled())
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_adds_no_escapes() {
        let theme = Theme::new(false);
        let text = format!("{}", "Added asset #1".style(theme.created));
        assert_eq!(text, "Added asset #1");
    }

    #[test]
    fn test_colored_theme_styles_roles() {
        let theme = Theme::new(true);
        let text = format!("{}", "Deleted".style(theme.removed));
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("Deleted"));
    }
}
