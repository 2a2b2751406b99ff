/// A notification derived from one newly discovered feed entry.
///
/// Ephemeral: produced once per new entry per round, consumed by the
/// dispatch pass, never persisted.
#[derive(Debug, Clone)]
pub struct Message {
    /// Resolved display name of the source feed.
    pub feed_name: String,
    pub title: String,
    pub link: String,
    /// Tag-stripped entry summary with one trailing newline, or empty when
    /// text display is disabled for the feed.
    pub show_text: String,
    /// Render the bare text instead of the markdown template.
    pub only_text: bool,
}

impl Message {
    /// Markdown rendering shared by the providers that support it.
    pub fn markdown(&self) -> String {
        if self.only_text {
            self.show_text.trim_end().to_string()
        } else {
            format!(
                "【{}】 [{}]({})\n\n{}",
                self.feed_name, self.title, self.link, self.show_text
            )
        }
    }

    /// Plain-text rendering for providers without a markdown mode.
    pub fn plain(&self) -> String {
        if self.only_text {
            self.show_text.trim_end().to_string()
        } else {
            format!(
                "【{}】 {}\n{}{}",
                self.feed_name, self.title, self.show_text, self.link
            )
        }
    }
}
