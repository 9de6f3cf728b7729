pub const DEFAULT_PORT: u16 = 8000;
pub const GAME_LIVES: u32 = 8;
pub const ERROR_PREFIX: &str = "error > ";

/// A single request line split into its command word and arguments.
///
/// The first whitespace-separated token is the command and the rest are
/// arguments. There is no quoting, so names and words can never contain
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: String,
    pub args: Vec<String>,
}

impl Request {
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let command = tokens.next().unwrap_or_default();

        Self {
            command,
            args: tokens.collect(),
        }
    }

    pub fn args(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

/// Strips the line terminator and surrounding whitespace from a received line.
pub fn clean_line(line: &str) -> &str {
    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_and_args() {
        let request = Request::parse("guess g1 a");
        assert_eq!(request.command, "guess");
        assert_eq!(request.args, vec!["g1".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let request = Request::parse("  create\tg1   hangman  ");
        assert_eq!(request.command, "create");
        assert_eq!(request.args(), vec!["g1", "hangman"]);
    }

    #[test]
    fn test_parse_command_without_args() {
        let request = Request::parse("list");
        assert_eq!(request.command, "list");
        assert!(request.args.is_empty());
    }

    #[test]
    fn test_parse_blank_line() {
        let request = Request::parse("   ");
        assert_eq!(request.command, "");
        assert!(request.args.is_empty());
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("join g1\r\n"), "join g1");
        assert_eq!(clean_line("\n"), "");
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_PORT, 8000);
        assert_eq!(GAME_LIVES, 8);
        assert!(ERROR_PREFIX.starts_with("error"));
    }
}
