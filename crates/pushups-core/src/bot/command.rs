/// A recognized bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `add <amount>`; the raw argument text, if any.
    Add(Option<String>),
    Progress,
    Calendar,
}

impl Command {
    /// Parse a message text such as `/add 40` or `/add@pushups_bot 40`.
    ///
    /// Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);

        match name.to_ascii_lowercase().as_str() {
            "start" | "help" => Some(Command::Start),
            "add" => Some(Command::Add(
                (!args.is_empty()).then(|| args.to_string()),
            )),
            "progress" => Some(Command::Progress),
            "calendar" => Some(Command::Calendar),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Add(_) => "add",
            Command::Progress => "progress",
            Command::Calendar => "calendar",
        }
    }
}
